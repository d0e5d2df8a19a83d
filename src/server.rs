//! MCP server over newline-delimited JSON on stdin/stdout.
//!
//! Every request line is handled on its own Tokio task, so a slow local-file
//! pipeline never holds up a `ping` or a second OCR call. Responses are
//! funnelled through one writer task, which keeps each JSON line intact on
//! stdout. Logs go to stderr; stdout carries nothing but protocol frames.

use crate::error::McpOcrError;
use crate::protocol::{
    error_codes, methods, JsonRpcRequest, JsonRpcResponse, ToolCallParams, PROTOCOL_VERSION,
    SERVER_NAME,
};
use crate::tools::ToolDispatcher;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct McpServer {
    dispatcher: ToolDispatcher,
}

impl McpServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run the server on the process's stdin and stdout until stdin closes.
    pub async fn run(&self) -> Result<(), McpOcrError> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve requests read from `reader`, writing responses to `writer`.
    ///
    /// Returns once `reader` reaches EOF and every in-flight request has been
    /// answered.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), McpOcrError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        info!("{} ready, waiting for requests on stdin", SERVER_NAME);

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                info!("stdin closed (EOF), shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!("Received: {}", trimmed);

            let server = self.clone();
            let request = trimmed.to_string();
            let tx = tx.clone();
            tokio::spawn(async move {
                let Some(response) = server.handle_line(&request).await else {
                    return;
                };
                match serde_json::to_string(&response) {
                    Ok(json) => {
                        let _ = tx.send(json);
                    }
                    Err(e) => error!("Failed to serialise response: {}", e),
                }
            });
        }

        // The writer stops once the last in-flight task drops its sender.
        drop(tx);
        writer_task
            .await
            .map_err(|e| McpOcrError::Io(std::io::Error::other(e)))??;
        Ok(())
    }

    /// Handle one raw line. Returns None for notifications.
    pub async fn handle_line(&self, input: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(input) {
            Ok(r) => r,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };
        self.handle_request(request).await
    }

    /// Route a parsed request to its MCP method.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                "Invalid JSON-RPC version",
            ));
        }

        if request.is_notification() {
            debug!("Notification '{}' handled, no response", request.method);
            return None;
        }
        let id = request.id;

        let response = match request.method.as_str() {
            methods::INITIALIZE => {
                JsonRpcResponse::success(id, initialize_result(request.params.as_ref()))
            }
            methods::PING => JsonRpcResponse::success(id, json!({})),
            methods::TOOLS_LIST => {
                JsonRpcResponse::success(id, json!({ "tools": self.dispatcher.definitions() }))
            }
            methods::TOOLS_CALL => self.tools_call(id, request.params).await,
            m if m.starts_with(methods::NOTIFICATION_PREFIX) => return None,
            other => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ),
        };
        Some(response)
    }

    async fn tools_call(
        &self,
        id: Option<crate::protocol::JsonRpcId>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid tools/call params: {}", e),
                )
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing tools/call params",
                )
            }
        };

        match self
            .dispatcher
            .call(&params.name, params.arguments.as_ref())
            .await
        {
            Ok(response) => JsonRpcResponse::success(id, json!(response)),
            Err(e) => {
                warn!("Rejected tools/call: {}", e);
                JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, e.to_string())
            }
        }
    }
}

fn initialize_result(params: Option<&Value>) -> Value {
    let protocol_version = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);
    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<String>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(json) = rx.recv().await {
        debug!("Sending: {}", json);
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MistralClient;
    use crate::config::OcrConfig;

    fn server() -> McpServer {
        let config = OcrConfig::builder()
            .base_url("http://127.0.0.1:9/v1")
            .build()
            .unwrap();
        McpServer::new(ToolDispatcher::new(MistralClient::new(config).unwrap()))
    }

    #[tokio::test]
    async fn initialize_echoes_requested_version() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "Mistral OCR MCP");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn parse_error() {
        let resp = server().handle_line("{not json").await.unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn wrong_version_is_invalid_request() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn unknown_method() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":"x","method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn tools_list_has_both_tools() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 2);
        assert!(tools[0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn tools_call_without_params() {
        let resp = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"tools/call"}"#)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
    }
}

//! CLI binary for mistral-ocr-mcp.
//!
//! By default runs the MCP server on stdio. The `ocr` subcommand runs a single
//! pipeline and prints what a host would have received, which is handy for
//! checking a key or a document without wiring up an MCP client.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mistral_ocr_mcp::config::{API_KEY_ENV, DEFAULT_BASE_URL};
use mistral_ocr_mcp::{
    run_ocr, McpServer, MistralClient, OcrConfig, OcrRequest, ToolDispatcher,
};
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run as an MCP server (what MCP hosts launch)
  mistral-ocr-mcp

  # One-shot OCR of a local PDF
  mistral-ocr-mcp ocr ./invoice.pdf

  # One-shot OCR of a public PDF
  mistral-ocr-mcp ocr https://arxiv.org/pdf/1706.03762

MCP HOST CONFIGURATION:
  {
    "mcpServers": {
      "mistral-ocr": {
        "command": "mistral-ocr-mcp",
        "env": { "MISTRAL_API_KEY": "..." }
      }
    }
  }

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY       Mistral API key (bearer credential)
  MISTRAL_BASE_URL      Override the API root (default: https://api.mistral.ai/v1)
  MISTRAL_OCR_TIMEOUT   Per-request timeout in seconds (default: none)
  RUST_LOG              Log filter; logs always go to stderr
"#;

/// Mistral OCR exposed as MCP tools over stdio.
#[derive(Parser, Debug)]
#[command(
    name = "mistral-ocr-mcp",
    version,
    about = "Mistral OCR exposed as MCP tools over stdio",
    long_about = "MCP server exposing two tools, ocr_for_local_pdf and ocr_for_pdf_url, \
backed by the Mistral OCR API. Local files are uploaded, exchanged for a 24-hour signed URL \
and then submitted for OCR; public URLs are submitted directly.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Mistral API key.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Mistral API root URL.
    #[arg(long, env = "MISTRAL_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Per-request timeout in seconds. Unset means no timeout.
    #[arg(long, env = "MISTRAL_OCR_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MISTRAL_OCR_VERBOSE", global = true)]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, env = "MISTRAL_OCR_QUIET", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the MCP tools on stdin/stdout (default).
    Serve,

    /// Run OCR once and print the tool output.
    Ocr {
        /// Local PDF path or HTTP/HTTPS URL.
        input: String,

        /// Force the input to be treated as a local path even if it looks like a URL.
        #[arg(long)]
        local: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // stdout is the protocol channel, so logs must go to stderr.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let config = build_config(&cli)?;
    if config.api_key.is_none() {
        warn!(
            "{} is not set; every Mistral API call will be rejected as unauthorized",
            API_KEY_ENV
        );
    }
    let client = MistralClient::new(config).context("Failed to create Mistral client")?;

    match cli.command {
        None | Some(Command::Serve) => {
            info!("Starting MCP server ({})", env!("CARGO_PKG_VERSION"));
            McpServer::new(ToolDispatcher::new(client))
                .run()
                .await
                .context("MCP server stopped with an error")?;
        }
        Some(Command::Ocr { input, local }) => {
            let request = parse_input(&input, local);
            let outcome = run_ocr(&client, &request).await;
            println!("{}", outcome.render());
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Map CLI args to `OcrConfig`.
fn build_config(cli: &Cli) -> Result<OcrConfig> {
    let mut builder = OcrConfig::builder().base_url(&cli.base_url);
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    builder.build().context("Invalid configuration")
}

/// Decide which pipeline a one-shot input goes through.
fn parse_input(input: &str, force_local: bool) -> OcrRequest {
    let looks_like_url = input.starts_with("http://") || input.starts_with("https://");
    if looks_like_url && !force_local {
        OcrRequest::Url {
            document_url: input.to_string(),
        }
    } else {
        OcrRequest::LocalFile {
            path: PathBuf::from(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn input_routing() {
        assert!(matches!(
            parse_input("https://example.com/a.pdf", false),
            OcrRequest::Url { .. }
        ));
        assert!(matches!(
            parse_input("/tmp/a.pdf", false),
            OcrRequest::LocalFile { .. }
        ));
        assert!(matches!(
            parse_input("https://example.com/a.pdf", true),
            OcrRequest::LocalFile { .. }
        ));
    }
}

//! Worked example exercising [`mcp_client::Client`].
//!
//! ```bash
//! cargo run -p mcp-client --bin mcp-client-cli -- cat
//! ```
//!
//! Any arguments after the first are forwarded to the spawned program. The
//! CLI connects, performs the initialize handshake, and prints a
//! `tools/list` result as pretty JSON. It is a worked example, not part of
//! the protocol core (see spec §1's scope note).

use std::ffi::OsString;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use mcp_client::Client;
use mcp_transport::StdioClientTransport;
use mcp_transport::StdioServerParameters;
use mcp_types::ClientCapabilities;
use mcp_types::Implementation;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let default_level = "info";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let mut args: Vec<OsString> = std::env::args_os().skip(1).collect();
    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        eprintln!("Usage: mcp-client-cli <program> [args..]\n\nExample: mcp-client-cli cat");
        std::process::exit(1);
    }

    let command = args.remove(0);
    let client = Client::new(
        Implementation {
            name: "mcp-client-cli".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: Some("MCP Client CLI".to_string()),
            user_agent: None,
        },
        ClientCapabilities::default(),
    );

    let transport = StdioClientTransport::new(StdioServerParameters {
        command: command.clone(),
        args,
        ..Default::default()
    });

    let init = client
        .connect(Box::new(transport), Some(Duration::from_secs(10)))
        .await
        .with_context(|| format!("failed to connect to {command:?}"))?;
    eprintln!("initialize response: {init:?}");

    let tools = client
        .list_tools(None)
        .await
        .context("tools/list request failed")?;
    println!("{}", serde_json::to_string_pretty(&tools)?);

    client.close().await.context("failed to close client")?;
    Ok(())
}

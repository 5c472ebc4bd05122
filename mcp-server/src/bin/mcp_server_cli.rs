//! Worked example exposing [`mcp_server::Server`] over stdio.
//!
//! ```bash
//! cargo run -p mcp-server --bin mcp-server-cli
//! ```
//!
//! Registers a `tools/list` handler returning an empty list so the process
//! is a minimally conforming server, then serves the current process's
//! stdin/stdout until the peer closes. It is a worked example, not part of
//! the protocol core (see spec §1's scope note).

use anyhow::Context;
use anyhow::Result;
use mcp_server::Server;
use mcp_types::Implementation;
use mcp_types::ListToolsRequest;
use mcp_types::ListToolsResult;
use mcp_types::ServerCapabilities;
use mcp_types::ServerCapabilitiesTools;
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

    let server = Server::new(
        Implementation {
            name: "mcp-server-cli".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: Some("MCP Server CLI".to_string()),
            user_agent: None,
        },
        ServerCapabilities {
            tools: Some(ServerCapabilitiesTools { list_changed: Some(false) }),
            ..Default::default()
        },
        None,
    );

    server
        .set_request_handler::<ListToolsRequest, _, _>(|_params| async {
            Ok(ListToolsResult { tools: Vec::new(), next_cursor: None })
        })
        .context("registering the tools/list handler")?;

    server.serve_stdio().await.context("server loop failed")?;
    Ok(())
}

use async_trait::async_trait;
use mcp_types::JSONRPCMessage;
use tokio::io::AsyncWriteExt;
use tokio::io::Stdout;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::Transport;
use crate::TransportEvent;
use crate::error::TransportError;
use crate::framing::read_loop;

const CHANNEL_CAPACITY: usize = 128;

/// The server-side counterpart of [`crate::StdioClientTransport`]: frames
/// messages over the *current* process's stdin/stdout rather than a spawned
/// child's.
pub struct StdioServerTransport {
    started: bool,
    stdout: Option<Stdout>,
}

impl StdioServerTransport {
    pub fn new() -> Self {
        Self {
            started: false,
            stdout: None,
        }
    }
}

impl Default for StdioServerTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for StdioServerTransport {
    async fn start(&mut self) -> Result<mpsc::Receiver<TransportEvent>, TransportError> {
        if self.started {
            return Err(TransportError::AlreadyStarted);
        }

        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (started_tx, started_rx) = oneshot::channel();

        tokio::spawn(read_loop(tokio::io::stdin(), event_tx, started_tx));

        started_rx.await.map_err(|_| TransportError::Closed)?;
        self.started = true;
        self.stdout = Some(tokio::io::stdout());
        Ok(event_rx)
    }

    async fn send_message(&mut self, message: &JSONRPCMessage) -> Result<(), TransportError> {
        let stdout = self.stdout.as_mut().ok_or(TransportError::NotStarted)?;
        let json = serde_json::to_string(message).map_err(TransportError::Encode)?;
        stdout.write_all(json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stdout = None;
        Ok(())
    }
}

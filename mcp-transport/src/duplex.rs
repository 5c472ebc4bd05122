use async_trait::async_trait;
use mcp_types::JSONRPCMessage;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::transport::Transport;
use crate::transport::TransportEvent;

/// An in-process, in-memory transport pair.
///
/// Two peers in the same process (a test harness wiring a [`mcp_client`]
/// `Client` directly to a [`mcp_server`] `Server`, say) need a `Transport`
/// that isn't a subprocess or the real stdio streams. `pair()` hands back
/// two ends wired directly to each other's message channel, skipping
/// encode/decode entirely since there is no byte stream in between.
pub struct DuplexTransport {
    outgoing: mpsc::Sender<JSONRPCMessage>,
    incoming: Option<mpsc::Receiver<JSONRPCMessage>>,
    closed: bool,
}

impl DuplexTransport {
    /// Builds two ends already wired to each other. Messages sent on one
    /// end arrive as `TransportEvent::Message` on the other.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_a) = mpsc::channel(64);
        let (tx_b, rx_b) = mpsc::channel(64);
        let a = Self { outgoing: tx_a, incoming: Some(rx_b), closed: false };
        let b = Self { outgoing: tx_b, incoming: Some(rx_a), closed: false };
        (a, b)
    }
}

#[async_trait]
impl Transport for DuplexTransport {
    async fn start(&mut self) -> Result<mpsc::Receiver<TransportEvent>, TransportError> {
        let mut incoming = self.incoming.take().ok_or(TransportError::AlreadyStarted)?;
        let (events_tx, events_rx) = mpsc::channel(64);
        tokio::spawn(async move {
            while let Some(message) = incoming.recv().await {
                if events_tx.send(TransportEvent::Message(message)).await.is_err() {
                    break;
                }
            }
            let _ = events_tx.send(TransportEvent::Closed).await;
        });
        Ok(events_rx)
    }

    async fn send_message(&mut self, message: &JSONRPCMessage) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.outgoing.send(message.clone()).await.map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed = true;
        Ok(())
    }
}

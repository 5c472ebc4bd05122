//! The byte-reading loop shared by both stdio transports: read whatever is
//! available, hand it to a [`ReadBuffer`], and emit one [`TransportEvent`]
//! per complete line it yields.

use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tracing::debug;

use crate::ReadBuffer;
use crate::TransportEvent;

const READ_CHUNK: usize = 8 * 1024;

/// Drives `reader` to completion, decoding framed messages through a
/// [`ReadBuffer`] and forwarding them on `event_tx`. Fires `started_tx` once
/// the loop is polling, satisfying the TransportStarted-before-first-use
/// ordering both transports need.
pub(crate) async fn read_loop<R>(
    mut reader: R,
    event_tx: mpsc::Sender<TransportEvent>,
    started_tx: oneshot::Sender<()>,
) where
    R: AsyncRead + Unpin,
{
    let mut buffer = ReadBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    let _ = started_tx.send(());

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => {
                let _ = event_tx.send(TransportEvent::Closed).await;
                break;
            }
            Ok(n) => {
                buffer.append(&chunk[..n]);
                loop {
                    match buffer.read_message() {
                        Ok(Some(message)) => {
                            debug!(?message, "<- message");
                            if event_tx.send(TransportEvent::Message(message)).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => break,
                        Err(err) => {
                            if event_tx.send(TransportEvent::DecodeError(err)).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
            Err(_) => {
                let _ = event_tx.send(TransportEvent::Closed).await;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn decodes_messages_split_across_reads() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let (started_tx, started_rx) = oneshot::channel();

        let handle = tokio::spawn(read_loop(reader, event_tx, started_tx));
        started_rx.await.expect("loop signals started");

        use tokio::io::AsyncWriteExt;
        writer.write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"meth").await.unwrap();
        writer.write_all(b"od\":\"ping\"}\n").await.unwrap();
        let first = event_rx.recv().await.expect("first event");
        assert!(matches!(first, TransportEvent::Message(_)));

        drop(writer);
        let second = event_rx.recv().await.expect("second event");
        assert!(matches!(second, TransportEvent::Closed));

        handle.await.expect("read_loop task did not panic");
    }

    #[tokio::test]
    async fn a_decode_error_does_not_stop_the_loop() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let (started_tx, started_rx) = oneshot::channel();

        tokio::spawn(read_loop(reader, event_tx, started_tx));
        started_rx.await.expect("loop signals started");

        use tokio::io::AsyncWriteExt;
        writer
            .write_all(b"not json\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n")
            .await
            .unwrap();

        let first = event_rx.recv().await.expect("decode error event");
        assert!(matches!(first, TransportEvent::DecodeError(_)));
        let second = event_rx.recv().await.expect("message event");
        assert!(matches!(second, TransportEvent::Message(_)));
    }
}

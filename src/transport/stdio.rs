//! Newline-delimited JSON transport over stdin/stdout
//!
//! One inbound message per stdin line, one outbound message per stdout
//! line. Stands in for the externally-provided delivery channel when the
//! agent runs as a subprocess of an orchestrator.

use crate::transport::{InboundMessage, OutboundMessage, Transport};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::Mutex;
use tracing::warn;

/// Wire frame for one stdio message
#[derive(Debug, Serialize, Deserialize)]
struct Frame {
    #[serde(default)]
    sender: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    performative: String,
    #[serde(default)]
    ontology: String,
    body: String,
}

/// Stdio transport errors
#[derive(Debug, Error)]
pub enum StdioTransportError {
    #[error("stdin closed")]
    Closed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unencodable frame: {0}")]
    Frame(#[from] serde_json::Error),
}

/// Transport reading frames from a byte stream and writing replies to
/// another, stdin/stdout by default
pub struct StdioTransport<R = tokio::io::Stdin, W = tokio::io::Stdout> {
    lines: Mutex<Lines<BufReader<R>>>,
    out: Mutex<W>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self::from_parts(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Send + Unpin,
    W: AsyncWrite + Send + Unpin,
{
    pub fn from_parts(reader: R, writer: W) -> Self {
        Self {
            lines: Mutex::new(BufReader::new(reader).lines()),
            out: Mutex::new(writer),
        }
    }
}

#[async_trait::async_trait]
impl<R, W> Transport for StdioTransport<R, W>
where
    R: AsyncRead + Send + Unpin,
    W: AsyncWrite + Send + Unpin,
{
    type Error = StdioTransportError;

    async fn recv(&self, wait: Duration) -> Result<Option<InboundMessage>, Self::Error> {
        let mut lines = self.lines.lock().await;
        let deadline = tokio::time::Instant::now() + wait;

        // An unreadable line is a bad frame, not a broken channel: log it
        // and keep reading until the wait elapses. Err is reserved for
        // genuine closure and I/O failure.
        loop {
            let line = match tokio::time::timeout_at(deadline, lines.next_line()).await {
                Err(_) => return Ok(None), // idle re-poll
                Ok(Ok(None)) => return Err(StdioTransportError::Closed),
                Ok(Ok(Some(line))) => line,
                Ok(Err(e)) => return Err(e.into()),
            };

            match serde_json::from_str::<Frame>(&line) {
                Ok(frame) => {
                    return Ok(Some(InboundMessage {
                        sender: frame.sender,
                        performative: frame.performative,
                        ontology: frame.ontology,
                        body: frame.body,
                    }))
                }
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable frame");
                }
            }
        }
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), Self::Error> {
        let frame = Frame {
            sender: String::new(),
            to: message.to.clone(),
            performative: message.performative.as_str().to_string(),
            ontology: message.ontology.clone(),
            body: message.body.clone(),
        };

        let mut line = serde_json::to_string(&frame)?;
        line.push('\n');

        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::Performative;
    use std::io::Cursor;

    fn reader_transport(input: &str) -> StdioTransport<Cursor<Vec<u8>>, Vec<u8>> {
        StdioTransport::from_parts(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_frame_roundtrip() {
        let json = r#"{"sender":"orchestrator@host","performative":"request","ontology":"finance-task","body":"{}"}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();

        assert_eq!(frame.sender, "orchestrator@host");
        assert_eq!(frame.performative, "request");
        assert_eq!(frame.ontology, "finance-task");
        assert_eq!(frame.body, "{}");
    }

    #[test]
    fn test_frame_missing_metadata_defaults() {
        let json = r#"{"performative":"request","body":"payload"}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();

        assert_eq!(frame.sender, "");
        assert_eq!(frame.ontology, "");
    }

    #[tokio::test]
    async fn test_recv_reads_one_frame_per_line() {
        let transport = reader_transport(
            "{\"sender\":\"a@host\",\"performative\":\"request\",\"ontology\":\"finance-task\",\"body\":\"{}\"}\n",
        );

        let message = transport
            .recv(Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.sender, "a@host");
        assert_eq!(message.body, "{}");
    }

    #[tokio::test]
    async fn test_recv_skips_unreadable_frame_and_continues() {
        let transport = reader_transport(
            "this is not a frame\n{\"performative\":\"request\",\"ontology\":\"finance-task\",\"body\":\"{}\"}\n",
        );

        // The garbage line is logged and skipped, not a channel failure
        let message = transport
            .recv(Duration::from_secs(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.performative, "request");
        assert_eq!(message.body, "{}");
    }

    #[tokio::test]
    async fn test_recv_reports_closed_at_eof() {
        let transport = reader_transport("");
        let result = transport.recv(Duration::from_secs(1)).await;
        assert!(matches!(result, Err(StdioTransportError::Closed)));
    }

    #[tokio::test]
    async fn test_recv_after_only_garbage_reports_closed() {
        let transport = reader_transport("garbage\n");
        let result = transport.recv(Duration::from_secs(1)).await;
        assert!(matches!(result, Err(StdioTransportError::Closed)));
    }

    #[tokio::test]
    async fn test_send_writes_one_line_frame() {
        let transport = reader_transport("");

        transport
            .send(&OutboundMessage {
                to: "orchestrator@host".to_string(),
                performative: Performative::Inform,
                ontology: "finance-task".to_string(),
                body: "{\"status\":\"success\"}".to_string(),
            })
            .await
            .unwrap();

        let written = transport.out.lock().await.clone();
        let line = String::from_utf8(written).unwrap();
        assert!(line.ends_with('\n'));

        let frame: Frame = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(frame.to, "orchestrator@host");
        assert_eq!(frame.performative, "inform");
        assert_eq!(frame.body, "{\"status\":\"success\"}");
    }
}

//! Connection handling for Igni channels
//!
//! Wraps an open stream and transmits one encoded message per write.
//! Nothing is acknowledged by the servers: a successful send only means the
//! bytes were handed to the transport, not that the command was applied.

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::{CodecError, WireMessage};

/// Connection errors
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] CodecError),

    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("Connection closed")]
    Closed,
}

pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Connection statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Messages sent
    pub messages_sent: u64,
    /// Messages received
    pub messages_received: u64,
    /// Bytes sent
    pub bytes_sent: u64,
    /// Bytes received
    pub bytes_received: u64,
}

/// An open channel to an Igni service
///
/// Every send takes `&mut self`, so a connection has exactly one writer at a
/// time. Share it between tasks only behind a lock.
#[derive(Debug)]
pub struct Connection<S> {
    /// The underlying stream
    stream: S,
    /// Write buffer, reused for every message
    write_buf: BytesMut,
    /// Read buffer
    read_buf: BytesMut,
    /// Statistics
    stats: ConnectionStats,
}

impl<S> Connection<S> {
    /// Create a new connection from an established stream
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            write_buf: BytesMut::with_capacity(512),
            read_buf: BytesMut::with_capacity(4096),
            stats: ConnectionStats::default(),
        }
    }

    /// Get connection statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: AsyncWrite + Unpin> Connection<S> {
    /// Send a message
    ///
    /// The whole message goes out in a single write call. A write that
    /// accepts fewer bytes is reported as [`ConnectionError::ShortWrite`];
    /// there is no retry.
    pub async fn send<M: WireMessage>(&mut self, message: &M) -> ConnectionResult<()> {
        self.write_buf.clear();
        message.encode(&mut self.write_buf);
        let expected = self.write_buf.len();

        let written = self.stream.write(&self.write_buf).await?;
        if written < expected {
            tracing::warn!(
                "Short write of {}: {} of {} bytes",
                message.name(),
                written,
                expected
            );
            return Err(ConnectionError::ShortWrite { written, expected });
        }
        self.stream.flush().await?;

        self.stats.messages_sent += 1;
        self.stats.bytes_sent += expected as u64;

        tracing::debug!("Sent {} ({} bytes)", message.name(), expected);
        Ok(())
    }
}

impl<S: AsyncRead + Unpin> Connection<S> {
    /// Receive a message (returns None on a clean close)
    ///
    /// Undecodable input is reported once and skipped; the next call resumes
    /// with the bytes that follow it.
    pub async fn recv<M: WireMessage>(&mut self) -> ConnectionResult<Option<M>> {
        loop {
            // Try to decode a message from the buffer
            let decoded = M::decode(&mut self.read_buf).map_err(|e| {
                tracing::warn!("Skipping undecodable input: {}", e);
                e
            })?;
            if let Some(message) = decoded {
                self.stats.messages_received += 1;
                tracing::debug!("Received {}", message.name());
                return Ok(Some(message));
            }

            // Read more data
            let mut buf = [0u8; 4096];
            let n = self.stream.read(&mut buf).await?;

            if n == 0 {
                if self.read_buf.is_empty() {
                    return Ok(None); // Clean close
                } else {
                    return Err(ConnectionError::Closed);
                }
            }

            self.read_buf.extend_from_slice(&buf[..n]);
            self.stats.bytes_received += n as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::{HitCommand, HitEvent};
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_send_writes_one_message() {
        let command = HitCommand::HitboxCreate { hitbox_id: 5 };
        let mock = Builder::new().write(&command.to_bytes()).build();

        let mut conn = Connection::new(mock);
        conn.send(&command).await.unwrap();

        assert_eq!(conn.stats().messages_sent, 1);
        assert_eq!(conn.stats().bytes_sent, 5);
    }

    #[tokio::test]
    async fn test_send_reports_short_write() {
        let command = HitCommand::HitboxDelete { hitbox_id: 5 };
        let bytes = command.to_bytes();
        let mock = Builder::new()
            .write(&bytes[..2])
            .write_error(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            .build();

        let mut conn = Connection::new(mock);
        let err = conn.send(&command).await.unwrap_err();

        assert!(matches!(
            err,
            ConnectionError::ShortWrite { written: 2, expected: 5 }
        ));
        assert_eq!(conn.stats().messages_sent, 0);
    }

    #[tokio::test]
    async fn test_send_reports_transport_error() {
        let mock = Builder::new()
            .write_error(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            .build();

        let mut conn = Connection::new(mock);
        let err = conn
            .send(&HitCommand::HitboxCreate { hitbox_id: 1 })
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectionError::Io(_)));
    }

    #[tokio::test]
    async fn test_recv_split_and_coalesced_reads() {
        let trigger = HitEvent::HitboxTrigger { hitbox_id: 1 }.to_bytes();
        let release = HitEvent::HitboxRelease { hitbox_id: 2 }.to_bytes();

        let mut coalesced = trigger[3..].to_vec();
        coalesced.extend_from_slice(&release);

        let mock = Builder::new().read(&trigger[..3]).read(&coalesced).build();
        let mut conn = Connection::new(mock);

        let first: Option<HitEvent> = conn.recv().await.unwrap();
        let second: Option<HitEvent> = conn.recv().await.unwrap();
        let end: Option<HitEvent> = conn.recv().await.unwrap();

        assert_eq!(first, Some(HitEvent::HitboxTrigger { hitbox_id: 1 }));
        assert_eq!(second, Some(HitEvent::HitboxRelease { hitbox_id: 2 }));
        assert_eq!(end, None);
        assert_eq!(conn.stats().messages_received, 2);
        assert_eq!(conn.stats().bytes_received, 10);
    }

    #[tokio::test]
    async fn test_recv_truncated_message_is_closed() {
        let trigger = HitEvent::HitboxTrigger { hitbox_id: 1 }.to_bytes();
        let mock = Builder::new().read(&trigger[..2]).build();
        let mut conn = Connection::new(mock);

        let result: ConnectionResult<Option<HitEvent>> = conn.recv().await;
        assert!(matches!(result, Err(ConnectionError::Closed)));
    }

    #[tokio::test]
    async fn test_recv_resumes_after_unknown_event_code() {
        let mut input = vec![9u8, 0, 0, 0, 0];
        input.extend_from_slice(&HitEvent::HitboxTrigger { hitbox_id: 6 }.to_bytes());
        let mock = Builder::new().read(&input).build();
        let mut conn = Connection::new(mock);

        let first: ConnectionResult<Option<HitEvent>> = conn.recv().await;
        assert!(matches!(
            first,
            Err(ConnectionError::Protocol(CodecError::UnknownEventCode(9)))
        ));

        // The unknown event's payload is skipped a byte at a time
        for _ in 0..4 {
            let result: ConnectionResult<Option<HitEvent>> = conn.recv().await;
            assert!(matches!(
                result,
                Err(ConnectionError::Protocol(CodecError::NullOpcode))
            ));
        }

        let event: Option<HitEvent> = conn.recv().await.unwrap();
        assert_eq!(event, Some(HitEvent::HitboxTrigger { hitbox_id: 6 }));

        let end: Option<HitEvent> = conn.recv().await.unwrap();
        assert_eq!(end, None);
        assert_eq!(conn.stats().messages_received, 1);
    }
}

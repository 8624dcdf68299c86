//! Hit channel client
//!
//! The hit client does not establish its connection: the application hands
//! it a stream it opened itself, since hit detection and rendering are
//! independent services.

use tokio::io::{AsyncRead, AsyncWrite};

use super::{HitCommand, HitEvent, HIT_VERSION};
use crate::network::{ClientResult, Connection, ConnectionStats};
use crate::types::{ElementId, Transform};

/// Sends hitbox commands over an open stream
///
/// Commands are one-way: success means the bytes were written, not that
/// the server applied them.
#[derive(Debug)]
pub struct HitClient<S> {
    conn: Connection<S>,
}

impl<S> HitClient<S> {
    /// Wrap an already-open stream
    pub fn new(stream: S) -> Self {
        Self {
            conn: Connection::new(stream),
        }
    }

    pub fn stats(&self) -> &ConnectionStats {
        self.conn.stats()
    }

    pub fn into_inner(self) -> S {
        self.conn.into_inner()
    }
}

impl<S: AsyncWrite + Unpin> HitClient<S> {
    /// Send any hit command
    pub async fn send(&mut self, command: &HitCommand) -> ClientResult<()> {
        self.conn.send(command).await?;
        Ok(())
    }

    /// Declare this client's protocol major version
    pub async fn configure(&mut self) -> ClientResult<()> {
        self.send(&HitCommand::Configure {
            major_version: HIT_VERSION,
        })
        .await
    }

    /// Add a hitbox to the scene
    pub async fn hitbox_create(&mut self, id: ElementId) -> ClientResult<()> {
        self.send(&HitCommand::HitboxCreate { hitbox_id: id }).await
    }

    /// Set hitbox location, rotation and dimensions (`transform.scale`)
    pub async fn hitbox_transform(&mut self, id: ElementId, transform: Transform) -> ClientResult<()> {
        self.send(&HitCommand::HitboxTransform {
            hitbox_id: id,
            transform,
        })
        .await
    }

    /// Remove a hitbox from the scene
    pub async fn hitbox_delete(&mut self, id: ElementId) -> ClientResult<()> {
        self.send(&HitCommand::HitboxDelete { hitbox_id: id }).await
    }
}

impl<S: AsyncRead + Unpin> HitClient<S> {
    /// Wait for the next collision event (None once the server closes)
    pub async fn recv_event(&mut self) -> ClientResult<Option<HitEvent>> {
        Ok(self.conn.recv().await?)
    }
}

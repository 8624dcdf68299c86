//! Hit module - Hitbox collision detection channel
//!
//! One element kind (hitbox) with a create / transform / delete lifecycle,
//! and two server events signalling that a hitbox entered or left a
//! collision.

mod client;
mod command;

pub use client::*;
pub use command::*;

use crate::config::HitConfig;
use crate::network::ClientResult;

/// Major version of the hit protocol
pub const HIT_VERSION: u8 = 0;

/// Open a stream to the configured hit server
///
/// No Configure command is sent; call [`HitClient::configure`] if the
/// server expects one.
#[cfg(unix)]
pub async fn connect(config: &HitConfig) -> ClientResult<HitClient<tokio::net::UnixStream>> {
    let path = config.server_address()?;
    let stream = crate::network::connect_unix(path).await?;
    Ok(HitClient::new(stream))
}

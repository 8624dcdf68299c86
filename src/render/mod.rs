//! Render module - Scene graph channel
//!
//! Meshes, point lights and textures each follow a create, modify, delete
//! lifecycle keyed by a caller-chosen id; the viewpoint is a singleton.
//! The client does not track lifecycles: a transform for an id that was
//! never created is still a well-formed command.

mod client;
mod command;

pub use client::*;
pub use command::*;

/// Major version of the render protocol
pub const RENDER_VERSION: u8 = 0;

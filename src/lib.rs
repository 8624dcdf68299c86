//! Igni - client library for the Igni render and hit services
//!
//! Two independent channels share one wire format:
//! - **Render**: meshes, point lights, textures and the viewpoint
//! - **Hit**: hitboxes and their collision events
//!
//! Each operation serializes one packed command and writes it to the
//! connection in a single write. Commands are fire-and-forget; the servers
//! send no acknowledgement.
//!
//! ## Example
//!
//! ```ignore
//! use igni::{config::RenderConfig, render::RenderClient, types::Vec3};
//!
//! let mut render = RenderClient::open(&RenderConfig::from_env()).await?;
//! render.mesh_create(1, "assets/cube.mesh").await?;
//! render.point_light_create(1).await?;
//! render.point_light_set_colour(1, Vec3::rgb(1.0, 0.9, 0.8)).await?;
//! ```

pub mod config;
pub mod hit;
pub mod network;
pub mod protocol;
pub mod render;
pub mod types;

pub use config::{Config, ConfigError, HitConfig, RenderConfig};
pub use hit::{HitClient, HitCommand, HitEvent};
pub use network::{ClientError, ClientResult};
pub use render::{RenderClient, RenderCommand, Shader, TextureTarget};
pub use types::{ElementId, Transform, Vec3, ViewTransform, NULL_ELEMENT};

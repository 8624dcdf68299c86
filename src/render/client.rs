//! Render channel client
//!
//! Every method builds one command, writes it with a single write call and
//! returns. The server never acknowledges: `Ok(())` means the bytes were
//! handed to the transport, not that the scene changed.

use std::path::Path;
use tokio::io::AsyncWrite;

use super::{RenderCommand, Shader, TextureTarget, RENDER_VERSION};
use crate::config::RenderConfig;
use crate::network::{ClientResult, Connection, ConnectionStats};
use crate::protocol::ResourcePath;
use crate::types::{ElementId, Transform, Vec3, ViewTransform};

/// Sends scene-graph commands to a render server
#[derive(Debug)]
pub struct RenderClient<S> {
    conn: Connection<S>,
}

#[cfg(unix)]
impl RenderClient<tokio::net::UnixStream> {
    /// Open a new render connection
    ///
    /// Fails with a configuration error, before touching the network, if no
    /// server address is configured. A failed connect is reported, never
    /// retried. Once connected the client announces its protocol version.
    pub async fn open(config: &RenderConfig) -> ClientResult<Self> {
        let path = config.server_address()?;
        let stream = crate::network::connect_unix(path).await?;
        Self::handshake(stream).await
    }
}

impl<S> RenderClient<S> {
    /// Wrap a stream without sending anything
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

impl<S: AsyncWrite + Unpin> RenderClient<S> {
    /// Wrap an open stream and send the Configure command
    pub async fn handshake(stream: S) -> ClientResult<Self> {
        let mut client = Self::new(stream);
        client.configure().await?;
        tracing::info!("Render connection configured (protocol v{})", RENDER_VERSION);
        Ok(client)
    }

    /// Send any render command
    pub async fn send(&mut self, command: &RenderCommand) -> ClientResult<()> {
        self.conn.send(command).await?;
        Ok(())
    }

    /// Declare this client's protocol major version
    pub async fn configure(&mut self) -> ClientResult<()> {
        self.send(&RenderCommand::Configure {
            major_version: RENDER_VERSION,
        })
        .await
    }

    /// Load a mesh from file
    ///
    /// `path` may be relative; it is canonicalized first and nothing is sent
    /// if that fails.
    pub async fn mesh_create(&mut self, id: ElementId, path: impl AsRef<Path>) -> ClientResult<()> {
        let path = resolve(path.as_ref()).await?;
        self.send(&RenderCommand::MeshCreate { mesh_id: id, path })
            .await
    }

    /// Set the shading mode applied to a mesh
    pub async fn mesh_set_shader(&mut self, id: ElementId, shader: Shader) -> ClientResult<()> {
        self.send(&RenderCommand::MeshSetShader {
            mesh_id: id,
            shader,
        })
        .await
    }

    /// Apply a texture to one of the mesh's shading slots
    pub async fn mesh_bind_texture(
        &mut self,
        mesh_id: ElementId,
        texture_id: ElementId,
        target: TextureTarget,
    ) -> ClientResult<()> {
        self.send(&RenderCommand::MeshBindTexture {
            mesh_id,
            texture_id,
            target,
        })
        .await
    }

    /// Replace mesh location, rotation and scale
    pub async fn mesh_transform(&mut self, id: ElementId, transform: Transform) -> ClientResult<()> {
        self.send(&RenderCommand::MeshTransform {
            mesh_id: id,
            transform,
        })
        .await
    }

    pub async fn mesh_delete(&mut self, id: ElementId) -> ClientResult<()> {
        self.send(&RenderCommand::MeshDelete { mesh_id: id }).await
    }

    pub async fn point_light_create(&mut self, id: ElementId) -> ClientResult<()> {
        self.send(&RenderCommand::PointLightCreate { light_id: id })
            .await
    }

    /// Move a point light
    pub async fn point_light_transform(&mut self, id: ElementId, location: Vec3) -> ClientResult<()> {
        self.send(&RenderCommand::PointLightTransform {
            light_id: id,
            location,
        })
        .await
    }

    /// Set point light colour
    pub async fn point_light_set_colour(&mut self, id: ElementId, colour: Vec3) -> ClientResult<()> {
        self.send(&RenderCommand::PointLightSetColour {
            light_id: id,
            colour,
        })
        .await
    }

    pub async fn point_light_delete(&mut self, id: ElementId) -> ClientResult<()> {
        self.send(&RenderCommand::PointLightDelete { light_id: id })
            .await
    }

    /// Load an image texture; same path rules as [`Self::mesh_create`]
    pub async fn texture_create(&mut self, id: ElementId, path: impl AsRef<Path>) -> ClientResult<()> {
        let path = resolve(path.as_ref()).await?;
        self.send(&RenderCommand::TextureCreate {
            texture_id: id,
            path,
        })
        .await
    }

    pub async fn texture_delete(&mut self, id: ElementId) -> ClientResult<()> {
        self.send(&RenderCommand::TextureDelete { texture_id: id })
            .await
    }

    /// Set viewpoint location and look target; `fov` is in radians
    pub async fn viewpoint_transform(&mut self, view: ViewTransform, fov: f32) -> ClientResult<()> {
        self.send(&RenderCommand::ViewpointTransform { view, fov })
            .await
    }
}

async fn resolve(path: &Path) -> ClientResult<ResourcePath> {
    match ResourcePath::resolve(path).await {
        Ok(resolved) => Ok(resolved),
        Err(e) => {
            tracing::warn!("Not sending command: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::network::{ClientError, ConnectionError};
    use crate::protocol::{Decoder, PathError, WireMessage};
    use crate::render::RenderOpcode;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_handshake_sends_configure_first() {
        let client = RenderClient::handshake(Vec::new()).await.unwrap();
        let written = client.into_inner();
        assert_eq!(written, vec![RenderOpcode::Configure as u8, 0]);
    }

    #[tokio::test]
    async fn test_mesh_create_sends_canonical_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("scenes")).unwrap();
        let file = dir.path().join("scenes").join("hero.mesh");
        std::fs::write(&file, b"mesh").unwrap();

        let relative_style = dir.path().join("scenes").join("..").join("scenes").join("hero.mesh");
        let canonical = std::fs::canonicalize(&file).unwrap();
        let canonical = canonical.to_str().unwrap();

        let mut client = RenderClient::new(Vec::new());
        client.mesh_create(7, &relative_style).await.unwrap();
        let written = client.into_inner();

        let mut expected = vec![RenderOpcode::MeshCreate as u8];
        expected.extend_from_slice(&7u32.to_ne_bytes());
        expected.push(canonical.len() as u8);
        expected.extend_from_slice(canonical.as_bytes());
        assert_eq!(written, expected);
    }

    #[tokio::test]
    async fn test_mesh_create_missing_path_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();

        let mut client = RenderClient::new(Vec::new());
        let err = client
            .mesh_create(7, dir.path().join("missing.mesh"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Path(PathError::Resolve { .. })));
        assert_eq!(client.stats().messages_sent, 0);
        assert!(client.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_texture_create_rejects_long_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut deep = dir.path().to_path_buf();
        for _ in 0..5 {
            deep.push("t".repeat(60));
        }
        std::fs::create_dir_all(&deep).unwrap();
        let file = deep.join("albedo.png");
        std::fs::write(&file, b"png").unwrap();

        let mut client = RenderClient::new(Vec::new());
        let err = client.texture_create(2, &file).await.unwrap_err();

        assert!(matches!(err, ClientError::Path(PathError::TooLong { .. })));
        assert!(client.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_point_light_set_colour_bytes() {
        let expected = RenderCommand::PointLightSetColour {
            light_id: 3,
            colour: Vec3::rgb(1.0, 0.5, 0.0),
        }
        .to_bytes();
        let mock = Builder::new().write(&expected).build();

        let mut client = RenderClient::new(mock);
        client
            .point_light_set_colour(3, Vec3::rgb(1.0, 0.5, 0.0))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mesh_transform_before_create_is_still_sent() {
        let tf = Transform::from_location(Vec3::new(2.0, 0.0, 1.0));
        let expected = RenderCommand::MeshTransform {
            mesh_id: 42,
            transform: tf,
        }
        .to_bytes();
        let mock = Builder::new().write(&expected).build();

        let mut client = RenderClient::new(mock);
        client.mesh_transform(42, tf).await.unwrap();
        assert_eq!(client.stats().messages_sent, 1);
        assert_eq!(client.stats().bytes_sent, 1 + 4 + Transform::WIRE_SIZE as u64);
    }

    #[tokio::test]
    async fn test_scene_session_decodes_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = dir.path().join("cube.mesh");
        let texture = dir.path().join("cube.png");
        std::fs::write(&mesh, b"mesh").unwrap();
        std::fs::write(&texture, b"png").unwrap();

        let view = ViewTransform::new(Vec3::new(0.0, 1.0, 5.0), Vec3::ZERO);
        let tf = Transform::from_location(Vec3::new(0.0, 0.0, -2.0));

        let mut client = RenderClient::handshake(Vec::new()).await.unwrap();
        client.texture_create(1, &texture).await.unwrap();
        client.mesh_create(1, &mesh).await.unwrap();
        client.mesh_set_shader(1, Shader::Shadeless).await.unwrap();
        client.mesh_bind_texture(1, 1, TextureTarget::Diffuse).await.unwrap();
        client.mesh_transform(1, tf).await.unwrap();
        client.point_light_create(2).await.unwrap();
        client.point_light_transform(2, Vec3::new(1.0, 3.0, 0.0)).await.unwrap();
        client.viewpoint_transform(view, 1.047).await.unwrap();
        client.point_light_delete(2).await.unwrap();
        client.mesh_delete(1).await.unwrap();
        client.texture_delete(1).await.unwrap();
        assert_eq!(client.stats().messages_sent, 12);

        let decoded = Decoder::<RenderCommand>::decode_all(&client.into_inner()).unwrap();
        let opcodes: Vec<RenderOpcode> = decoded.iter().map(|c| c.opcode()).collect();
        assert_eq!(
            opcodes,
            vec![
                RenderOpcode::Configure,
                RenderOpcode::TextureCreate,
                RenderOpcode::MeshCreate,
                RenderOpcode::MeshSetShader,
                RenderOpcode::MeshBindTexture,
                RenderOpcode::MeshTransform,
                RenderOpcode::PointLightCreate,
                RenderOpcode::PointLightTransform,
                RenderOpcode::ViewpointTransform,
                RenderOpcode::PointLightDelete,
                RenderOpcode::MeshDelete,
                RenderOpcode::TextureDelete,
            ]
        );
        assert_eq!(
            decoded[5],
            RenderCommand::MeshTransform { mesh_id: 1, transform: tf }
        );
        assert_eq!(decoded[8], RenderCommand::ViewpointTransform { view, fov: 1.047 });
    }

    #[tokio::test]
    async fn test_open_without_address_fails_before_io() {
        let err = RenderClient::<tokio::net::UnixStream>::open(&RenderConfig::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::Config(ConfigError::MissingRenderServer)));
    }

    #[tokio::test]
    async fn test_open_unreachable_server() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::new(dir.path().join("no-server.sock"));

        let err = RenderClient::<tokio::net::UnixStream>::open(&config).await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(ConnectionError::Io(_))));
    }

    #[tokio::test]
    async fn test_open_sends_configure_to_server() {
        use tokio::io::AsyncReadExt;

        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("render.sock");
        let listener = tokio::net::UnixListener::bind(&socket).unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            stream.read_to_end(&mut received).await.unwrap();
            received
        });

        let mut client = RenderClient::<tokio::net::UnixStream>::open(&RenderConfig::new(&socket)).await.unwrap();
        client.mesh_delete(5).await.unwrap();
        drop(client);

        let received = server.await.unwrap();
        let decoded = Decoder::<RenderCommand>::decode_all(&received).unwrap();
        assert_eq!(
            decoded,
            vec![
                RenderCommand::Configure { major_version: RENDER_VERSION },
                RenderCommand::MeshDelete { mesh_id: 5 },
            ]
        );
    }
}

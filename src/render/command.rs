//! Render channel message definitions
//!
//! Defines the opcodes and payload layouts of every render command.

use bytes::{Buf, BufMut, BytesMut};

use crate::protocol::{
    path_payload_len, split_message, CodecError, CodecResult, ResourcePath, WireMessage,
};
use crate::types::{get_transform, get_vec3, put_transform, put_vec3, ElementId, Transform, Vec3, ViewTransform};

/// Render command opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RenderOpcode {
    Nul = 0,
    Configure = 1,

    MeshCreate = 2,
    MeshSetShader = 3,
    MeshBindTexture = 4,
    MeshTransform = 5,
    MeshDelete = 6,

    PointLightCreate = 7,
    PointLightTransform = 8,
    PointLightSetColour = 9,
    PointLightDelete = 10,

    TextureCreate = 11,
    TextureDelete = 12,

    ViewpointTransform = 13,
}

impl RenderOpcode {
    /// Payload size of fixed-layout commands; `None` for path-bearing ones
    pub fn fixed_payload_len(self) -> Option<usize> {
        let len = match self {
            RenderOpcode::Nul => 0,
            RenderOpcode::Configure => 1,
            RenderOpcode::MeshCreate | RenderOpcode::TextureCreate => return None,
            RenderOpcode::MeshSetShader => 4 + 1,
            RenderOpcode::MeshBindTexture => 4 + 4 + 1,
            RenderOpcode::MeshTransform => 4 + Transform::WIRE_SIZE,
            RenderOpcode::MeshDelete
            | RenderOpcode::PointLightCreate
            | RenderOpcode::PointLightDelete
            | RenderOpcode::TextureDelete => 4,
            RenderOpcode::PointLightTransform | RenderOpcode::PointLightSetColour => {
                4 + Vec3::WIRE_SIZE
            }
            RenderOpcode::ViewpointTransform => ViewTransform::WIRE_SIZE + 4,
        };
        Some(len)
    }
}

impl TryFrom<u8> for RenderOpcode {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => RenderOpcode::Nul,
            1 => RenderOpcode::Configure,
            2 => RenderOpcode::MeshCreate,
            3 => RenderOpcode::MeshSetShader,
            4 => RenderOpcode::MeshBindTexture,
            5 => RenderOpcode::MeshTransform,
            6 => RenderOpcode::MeshDelete,
            7 => RenderOpcode::PointLightCreate,
            8 => RenderOpcode::PointLightTransform,
            9 => RenderOpcode::PointLightSetColour,
            10 => RenderOpcode::PointLightDelete,
            11 => RenderOpcode::TextureCreate,
            12 => RenderOpcode::TextureDelete,
            13 => RenderOpcode::ViewpointTransform,
            other => return Err(CodecError::UnknownOpcode(other)),
        })
    }
}

/// Shading mode applied to a mesh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Shader {
    #[default]
    Shadeless = 0,
}

impl TryFrom<u8> for Shader {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Shader::Shadeless),
            value => Err(CodecError::InvalidValue { field: "shader", value }),
        }
    }
}

/// Shading slot a texture is bound to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TextureTarget {
    #[default]
    Diffuse = 0,
}

impl TextureTarget {
    /// Number of texture targets
    pub const COUNT: u8 = 1;
}

impl TryFrom<u8> for TextureTarget {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TextureTarget::Diffuse),
            value => Err(CodecError::InvalidValue { field: "texture target", value }),
        }
    }
}

/// All render channel commands
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Declare the client's protocol major version
    Configure {
        major_version: u8,
    },

    /// Load a mesh from file
    MeshCreate {
        mesh_id: ElementId,
        path: ResourcePath,
    },

    /// Set the shading mode of a mesh
    MeshSetShader {
        mesh_id: ElementId,
        shader: Shader,
    },

    /// Bind a texture to one of the mesh's shading slots
    MeshBindTexture {
        mesh_id: ElementId,
        texture_id: ElementId,
        target: TextureTarget,
    },

    /// Replace mesh location, rotation and scale
    MeshTransform {
        mesh_id: ElementId,
        transform: Transform,
    },

    MeshDelete {
        mesh_id: ElementId,
    },

    PointLightCreate {
        light_id: ElementId,
    },

    /// Move a point light
    PointLightTransform {
        light_id: ElementId,
        location: Vec3,
    },

    /// Set point light colour (r, g, b)
    PointLightSetColour {
        light_id: ElementId,
        colour: Vec3,
    },

    PointLightDelete {
        light_id: ElementId,
    },

    /// Load an image texture from file
    TextureCreate {
        texture_id: ElementId,
        path: ResourcePath,
    },

    TextureDelete {
        texture_id: ElementId,
    },

    /// Place the viewpoint; there is one per connection, so no id
    ViewpointTransform {
        view: ViewTransform,
        /// Field of view in radians
        fov: f32,
    },
}

impl RenderCommand {
    pub fn opcode(&self) -> RenderOpcode {
        match self {
            RenderCommand::Configure { .. } => RenderOpcode::Configure,
            RenderCommand::MeshCreate { .. } => RenderOpcode::MeshCreate,
            RenderCommand::MeshSetShader { .. } => RenderOpcode::MeshSetShader,
            RenderCommand::MeshBindTexture { .. } => RenderOpcode::MeshBindTexture,
            RenderCommand::MeshTransform { .. } => RenderOpcode::MeshTransform,
            RenderCommand::MeshDelete { .. } => RenderOpcode::MeshDelete,
            RenderCommand::PointLightCreate { .. } => RenderOpcode::PointLightCreate,
            RenderCommand::PointLightTransform { .. } => RenderOpcode::PointLightTransform,
            RenderCommand::PointLightSetColour { .. } => RenderOpcode::PointLightSetColour,
            RenderCommand::PointLightDelete { .. } => RenderOpcode::PointLightDelete,
            RenderCommand::TextureCreate { .. } => RenderOpcode::TextureCreate,
            RenderCommand::TextureDelete { .. } => RenderOpcode::TextureDelete,
            RenderCommand::ViewpointTransform { .. } => RenderOpcode::ViewpointTransform,
        }
    }

    fn payload_len(&self) -> usize {
        match self {
            RenderCommand::MeshCreate { path, .. } | RenderCommand::TextureCreate { path, .. } => {
                4 + path.encoded_len()
            }
            other => other.opcode().fixed_payload_len().unwrap_or(0),
        }
    }

    fn decode_payload(opcode: RenderOpcode, buf: &mut impl Buf) -> CodecResult<Self> {
        let command = match opcode {
            RenderOpcode::Nul => return Err(CodecError::NullOpcode),
            RenderOpcode::Configure => RenderCommand::Configure {
                major_version: buf.get_u8(),
            },
            RenderOpcode::MeshCreate => {
                let mesh_id = buf.get_u32_ne();
                RenderCommand::MeshCreate {
                    mesh_id,
                    path: ResourcePath::decode(buf),
                }
            }
            RenderOpcode::MeshSetShader => {
                let mesh_id = buf.get_u32_ne();
                RenderCommand::MeshSetShader {
                    mesh_id,
                    shader: Shader::try_from(buf.get_u8())?,
                }
            }
            RenderOpcode::MeshBindTexture => {
                let mesh_id = buf.get_u32_ne();
                let texture_id = buf.get_u32_ne();
                RenderCommand::MeshBindTexture {
                    mesh_id,
                    texture_id,
                    target: TextureTarget::try_from(buf.get_u8())?,
                }
            }
            RenderOpcode::MeshTransform => {
                let mesh_id = buf.get_u32_ne();
                RenderCommand::MeshTransform {
                    mesh_id,
                    transform: get_transform(buf),
                }
            }
            RenderOpcode::MeshDelete => RenderCommand::MeshDelete {
                mesh_id: buf.get_u32_ne(),
            },
            RenderOpcode::PointLightCreate => RenderCommand::PointLightCreate {
                light_id: buf.get_u32_ne(),
            },
            RenderOpcode::PointLightTransform => {
                let light_id = buf.get_u32_ne();
                RenderCommand::PointLightTransform {
                    light_id,
                    location: get_vec3(buf),
                }
            }
            RenderOpcode::PointLightSetColour => {
                let light_id = buf.get_u32_ne();
                RenderCommand::PointLightSetColour {
                    light_id,
                    colour: get_vec3(buf),
                }
            }
            RenderOpcode::PointLightDelete => RenderCommand::PointLightDelete {
                light_id: buf.get_u32_ne(),
            },
            RenderOpcode::TextureCreate => {
                let texture_id = buf.get_u32_ne();
                RenderCommand::TextureCreate {
                    texture_id,
                    path: ResourcePath::decode(buf),
                }
            }
            RenderOpcode::TextureDelete => RenderCommand::TextureDelete {
                texture_id: buf.get_u32_ne(),
            },
            RenderOpcode::ViewpointTransform => {
                let location = get_vec3(buf);
                let look_at = get_vec3(buf);
                RenderCommand::ViewpointTransform {
                    view: ViewTransform::new(location, look_at),
                    fov: buf.get_f32_ne(),
                }
            }
        };
        Ok(command)
    }
}

impl WireMessage for RenderCommand {
    fn code(&self) -> u8 {
        self.opcode() as u8
    }

    fn name(&self) -> &'static str {
        match self {
            RenderCommand::Configure { .. } => "Configure",
            RenderCommand::MeshCreate { .. } => "MeshCreate",
            RenderCommand::MeshSetShader { .. } => "MeshSetShader",
            RenderCommand::MeshBindTexture { .. } => "MeshBindTexture",
            RenderCommand::MeshTransform { .. } => "MeshTransform",
            RenderCommand::MeshDelete { .. } => "MeshDelete",
            RenderCommand::PointLightCreate { .. } => "PointLightCreate",
            RenderCommand::PointLightTransform { .. } => "PointLightTransform",
            RenderCommand::PointLightSetColour { .. } => "PointLightSetColour",
            RenderCommand::PointLightDelete { .. } => "PointLightDelete",
            RenderCommand::TextureCreate { .. } => "TextureCreate",
            RenderCommand::TextureDelete { .. } => "TextureDelete",
            RenderCommand::ViewpointTransform { .. } => "ViewpointTransform",
        }
    }

    fn encoded_len(&self) -> usize {
        1 + self.payload_len()
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_u8(self.code());

        match self {
            RenderCommand::Configure { major_version } => {
                buf.put_u8(*major_version);
            }
            RenderCommand::MeshCreate { mesh_id, path } => {
                buf.put_u32_ne(*mesh_id);
                path.encode(buf);
            }
            RenderCommand::MeshSetShader { mesh_id, shader } => {
                buf.put_u32_ne(*mesh_id);
                buf.put_u8(*shader as u8);
            }
            RenderCommand::MeshBindTexture {
                mesh_id,
                texture_id,
                target,
            } => {
                buf.put_u32_ne(*mesh_id);
                buf.put_u32_ne(*texture_id);
                buf.put_u8(*target as u8);
            }
            RenderCommand::MeshTransform { mesh_id, transform } => {
                buf.put_u32_ne(*mesh_id);
                put_transform(buf, transform);
            }
            RenderCommand::MeshDelete { mesh_id } => {
                buf.put_u32_ne(*mesh_id);
            }
            RenderCommand::PointLightCreate { light_id }
            | RenderCommand::PointLightDelete { light_id } => {
                buf.put_u32_ne(*light_id);
            }
            RenderCommand::PointLightTransform {
                light_id,
                location: v,
            }
            | RenderCommand::PointLightSetColour {
                light_id,
                colour: v,
            } => {
                buf.put_u32_ne(*light_id);
                put_vec3(buf, v);
            }
            RenderCommand::TextureCreate { texture_id, path } => {
                buf.put_u32_ne(*texture_id);
                path.encode(buf);
            }
            RenderCommand::TextureDelete { texture_id } => {
                buf.put_u32_ne(*texture_id);
            }
            RenderCommand::ViewpointTransform { view, fov } => {
                put_vec3(buf, &view.location);
                put_vec3(buf, &view.look_at);
                buf.put_f32_ne(*fov);
            }
        }
    }

    fn decode(buf: &mut BytesMut) -> CodecResult<Option<Self>> {
        let message = split_message(buf, |code, payload| {
            let opcode = RenderOpcode::try_from(code)?;
            Ok(match opcode.fixed_payload_len() {
                Some(len) => Some(len),
                None => path_payload_len(payload, 4),
            })
        })?;

        let Some(mut message) = message else {
            return Ok(None);
        };
        let opcode = RenderOpcode::try_from(message.get_u8())?;
        Self::decode_payload(opcode, &mut message).map(Some)
    }
}

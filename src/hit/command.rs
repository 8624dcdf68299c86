//! Hit channel message definitions
//!
//! Commands flow client to server; events flow server to client.

use bytes::{Buf, BufMut, BytesMut};

use crate::protocol::{split_message, CodecError, CodecResult, WireMessage};
use crate::types::{get_transform, put_transform, ElementId, Transform};

/// Hit command opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HitOpcode {
    Nul = 0,
    Configure = 1,

    HitboxCreate = 2,
    HitboxTransform = 3,
    HitboxDelete = 4,
}

impl HitOpcode {
    pub fn payload_len(self) -> usize {
        match self {
            HitOpcode::Nul => 0,
            HitOpcode::Configure => 1,
            HitOpcode::HitboxCreate | HitOpcode::HitboxDelete => 4,
            HitOpcode::HitboxTransform => 4 + Transform::WIRE_SIZE,
        }
    }
}

impl TryFrom<u8> for HitOpcode {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => HitOpcode::Nul,
            1 => HitOpcode::Configure,
            2 => HitOpcode::HitboxCreate,
            3 => HitOpcode::HitboxTransform,
            4 => HitOpcode::HitboxDelete,
            other => return Err(CodecError::UnknownOpcode(other)),
        })
    }
}

/// Hit event codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HitEventCode {
    Nul = 0,

    HitboxTrigger = 1,
    HitboxRelease = 2,
}

impl TryFrom<u8> for HitEventCode {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => HitEventCode::Nul,
            1 => HitEventCode::HitboxTrigger,
            2 => HitEventCode::HitboxRelease,
            other => return Err(CodecError::UnknownEventCode(other)),
        })
    }
}

/// All hit channel commands
#[derive(Debug, Clone, PartialEq)]
pub enum HitCommand {
    /// Declare the client's protocol major version
    Configure { major_version: u8 },

    /// Add a hitbox to the scene
    HitboxCreate { hitbox_id: ElementId },

    /// Set hitbox location, rotation and dimensions
    ///
    /// The transform's scale holds width, height and depth.
    HitboxTransform {
        hitbox_id: ElementId,
        transform: Transform,
    },

    /// Remove a hitbox from the scene
    HitboxDelete { hitbox_id: ElementId },
}

impl HitCommand {
    pub fn opcode(&self) -> HitOpcode {
        match self {
            HitCommand::Configure { .. } => HitOpcode::Configure,
            HitCommand::HitboxCreate { .. } => HitOpcode::HitboxCreate,
            HitCommand::HitboxTransform { .. } => HitOpcode::HitboxTransform,
            HitCommand::HitboxDelete { .. } => HitOpcode::HitboxDelete,
        }
    }
}

impl WireMessage for HitCommand {
    fn code(&self) -> u8 {
        self.opcode() as u8
    }

    fn name(&self) -> &'static str {
        match self {
            HitCommand::Configure { .. } => "Configure",
            HitCommand::HitboxCreate { .. } => "HitboxCreate",
            HitCommand::HitboxTransform { .. } => "HitboxTransform",
            HitCommand::HitboxDelete { .. } => "HitboxDelete",
        }
    }

    fn encoded_len(&self) -> usize {
        1 + self.opcode().payload_len()
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_u8(self.code());

        match self {
            HitCommand::Configure { major_version } => buf.put_u8(*major_version),
            HitCommand::HitboxCreate { hitbox_id } | HitCommand::HitboxDelete { hitbox_id } => {
                buf.put_u32_ne(*hitbox_id)
            }
            HitCommand::HitboxTransform {
                hitbox_id,
                transform,
            } => {
                buf.put_u32_ne(*hitbox_id);
                put_transform(buf, transform);
            }
        }
    }

    fn decode(buf: &mut BytesMut) -> CodecResult<Option<Self>> {
        let message = split_message(buf, |code, _| {
            Ok(Some(HitOpcode::try_from(code)?.payload_len()))
        })?;
        let Some(mut message) = message else {
            return Ok(None);
        };

        let command = match HitOpcode::try_from(message.get_u8())? {
            HitOpcode::Nul => return Err(CodecError::NullOpcode),
            HitOpcode::Configure => HitCommand::Configure {
                major_version: message.get_u8(),
            },
            HitOpcode::HitboxCreate => HitCommand::HitboxCreate {
                hitbox_id: message.get_u32_ne(),
            },
            HitOpcode::HitboxTransform => {
                let hitbox_id = message.get_u32_ne();
                HitCommand::HitboxTransform {
                    hitbox_id,
                    transform: get_transform(&mut message),
                }
            }
            HitOpcode::HitboxDelete => HitCommand::HitboxDelete {
                hitbox_id: message.get_u32_ne(),
            },
        };
        Ok(Some(command))
    }
}

/// Events reported by the hit server
///
/// Only the named hitbox is reported, not the hitbox it collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitEvent {
    /// Hitbox intersects another hitbox after a transformation
    HitboxTrigger { hitbox_id: ElementId },

    /// Hitbox no longer intersects a hitbox that previously intersected it
    HitboxRelease { hitbox_id: ElementId },
}

impl HitEvent {
    pub fn event_code(&self) -> HitEventCode {
        match self {
            HitEvent::HitboxTrigger { .. } => HitEventCode::HitboxTrigger,
            HitEvent::HitboxRelease { .. } => HitEventCode::HitboxRelease,
        }
    }

    pub fn hitbox_id(&self) -> ElementId {
        match self {
            HitEvent::HitboxTrigger { hitbox_id } | HitEvent::HitboxRelease { hitbox_id } => {
                *hitbox_id
            }
        }
    }
}

impl WireMessage for HitEvent {
    fn code(&self) -> u8 {
        self.event_code() as u8
    }

    fn name(&self) -> &'static str {
        match self {
            HitEvent::HitboxTrigger { .. } => "HitboxTrigger",
            HitEvent::HitboxRelease { .. } => "HitboxRelease",
        }
    }

    fn encoded_len(&self) -> usize {
        1 + 4
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_u8(self.code());
        buf.put_u32_ne(self.hitbox_id());
    }

    fn decode(buf: &mut BytesMut) -> CodecResult<Option<Self>> {
        let message = split_message(buf, |code, _| {
            HitEventCode::try_from(code)?;
            Ok(Some(4))
        })?;
        let Some(mut message) = message else {
            return Ok(None);
        };

        let code = HitEventCode::try_from(message.get_u8())?;
        let hitbox_id = message.get_u32_ne();
        let event = match code {
            HitEventCode::Nul => return Err(CodecError::NullOpcode),
            HitEventCode::HitboxTrigger => HitEvent::HitboxTrigger { hitbox_id },
            HitEventCode::HitboxRelease => HitEvent::HitboxRelease { hitbox_id },
        };
        Ok(Some(event))
    }
}

//! Protocol module - Wire format shared by the render and hit channels
//!
//! Every message is a single opcode byte followed by a packed payload:
//! - 1 byte opcode (0 is the reserved null opcode)
//! - fixed-layout payload, fields in declaration order
//! - native byte order, no padding, no length prefix, no checksum
//!
//! Path-bearing payloads end with a 1 byte length followed by that many
//! bytes of a canonical absolute path (no terminator).
//!
//! One message is written with one write call. The payload size of every
//! opcode is known (or carried by the path length byte), so a reader can
//! also split a stream in which several writes were coalesced.

mod codec;
mod path;

pub use codec::*;
pub use path::*;

/// Opcode / event code reserved as "null" on both channels
pub const NULL_CODE: u8 = 0;

/// Maximum number of path bytes a single length byte can describe
pub const MAX_PATH_LEN: usize = u8::MAX as usize;

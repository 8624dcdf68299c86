//! Protocol codec for encoding/decoding messages
//!
//! Each channel implements [`WireMessage`] for its command (and event) types;
//! [`Decoder`] turns a byte stream back into messages.

use bytes::{Buf, BytesMut};
use std::marker::PhantomData;
use thiserror::Error;

use super::NULL_CODE;

/// Codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Null opcode received")]
    NullOpcode,

    #[error("Unknown opcode: {0}")]
    UnknownOpcode(u8),

    #[error("Unknown event code: {0}")]
    UnknownEventCode(u8),

    #[error("Invalid {field} value: {value}")]
    InvalidValue { field: &'static str, value: u8 },

    #[error("Trailing bytes after message: {0}")]
    TrailingBytes(usize),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// A message with a fixed, byte-exact wire representation
///
/// The wire form is `[code] ++ payload`. Encoding cannot fail: every
/// constructor of a path-bearing payload already enforces the path limit.
pub trait WireMessage: Sized {
    /// Opcode (or event code) byte
    fn code(&self) -> u8;

    /// Human-readable message name, used in logs
    fn name(&self) -> &'static str;

    /// Total encoded size, code byte included
    fn encoded_len(&self) -> usize;

    /// Append the encoded message to `buf`
    fn encode(&self, buf: &mut BytesMut);

    /// Decode one message from the front of `buf`
    ///
    /// Returns `Ok(None)` without consuming anything if `buf` does not yet
    /// hold a complete message. An error always consumes at least the
    /// offending code byte, so decoding can carry on after it.
    fn decode(buf: &mut BytesMut) -> CodecResult<Option<Self>>;

    /// Encode into a fresh buffer
    fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf
    }
}

/// Length of a payload made of `prefix` fixed bytes followed by a path
/// length byte and the path itself
///
/// `payload` starts right after the code byte. Returns `None` while the
/// length byte has not arrived yet.
pub(crate) fn path_payload_len(payload: &[u8], prefix: usize) -> Option<usize> {
    payload
        .get(prefix)
        .map(|&path_len| prefix + 1 + path_len as usize)
}

/// Split a complete message off the front of `buf`
///
/// `payload_len` maps the code byte (and whatever payload bytes are already
/// buffered) to the payload size, or `None` if that size is not yet known.
/// A null or unknown code byte is dropped before the error is returned.
pub(crate) fn split_message<F>(buf: &mut BytesMut, payload_len: F) -> CodecResult<Option<BytesMut>>
where
    F: FnOnce(u8, &[u8]) -> CodecResult<Option<usize>>,
{
    let Some(&code) = buf.first() else {
        return Ok(None);
    };
    if code == NULL_CODE {
        buf.advance(1);
        return Err(CodecError::NullOpcode);
    }

    let len = match payload_len(code, &buf[1..]) {
        Ok(Some(len)) => len,
        Ok(None) => return Ok(None),
        Err(e) => {
            buf.advance(1);
            return Err(e);
        }
    };
    if buf.len() < 1 + len {
        return Ok(None);
    }

    Ok(Some(buf.split_to(1 + len)))
}

/// Decodes a stream of messages of one channel
pub struct Decoder<M> {
    buf: BytesMut,
    _message: PhantomData<M>,
}

impl<M: WireMessage> Decoder<M> {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(4096),
            _message: PhantomData,
        }
    }

    /// Append received bytes
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Attempt to decode the next message
    /// Returns Ok(None) if more data is needed
    pub fn decode(&mut self) -> CodecResult<Option<M>> {
        M::decode(&mut self.buf)
    }

    /// Number of buffered bytes not yet decoded
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Decode every message in `data`, which must end on a message boundary
    pub fn decode_all(data: &[u8]) -> CodecResult<Vec<M>> {
        let mut decoder = Self::new();
        decoder.extend(data);

        let mut messages = Vec::new();
        while let Some(message) = decoder.decode()? {
            messages.push(message);
        }

        if decoder.pending() > 0 {
            return Err(CodecError::TrailingBytes(decoder.pending()));
        }
        Ok(messages)
    }
}

impl<M: WireMessage> Default for Decoder<M> {
    fn default() -> Self {
        Self::new()
    }
}

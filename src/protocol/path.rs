//! Filesystem paths carried by mesh and texture creation commands

use bytes::{Buf, BufMut, BytesMut};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::MAX_PATH_LEN;

/// Path resolution errors
#[derive(Error, Debug)]
pub enum PathError {
    #[error("Cannot resolve path {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Canonical path is {len} bytes (max: 255)")]
    TooLong { len: usize },
}

/// A canonical absolute path short enough for the 1 byte length prefix
///
/// Encoded as `path_len:u8 ++ path_bytes`, without a terminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    bytes: Vec<u8>,
}

impl ResourcePath {
    /// Canonicalize `path` (resolving `.`, `..` and symlinks)
    ///
    /// Fails if the path does not exist or its canonical form does not fit
    /// in 255 bytes. Long paths are rejected, never truncated.
    pub async fn resolve(path: impl AsRef<Path>) -> Result<Self, PathError> {
        let path = path.as_ref();
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|source| PathError::Resolve {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_bytes(path_bytes(&canonical))
    }

    /// Wrap raw path bytes, as received off the wire
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PathError> {
        if bytes.len() > MAX_PATH_LEN {
            return Err(PathError::TooLong { len: bytes.len() });
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Size on the wire, length byte included
    pub fn encoded_len(&self) -> usize {
        1 + self.bytes.len()
    }

    pub fn to_path_buf(&self) -> PathBuf {
        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStrExt;
            PathBuf::from(std::ffi::OsStr::from_bytes(&self.bytes))
        }

        #[cfg(not(unix))]
        {
            PathBuf::from(String::from_utf8_lossy(&self.bytes).into_owned())
        }
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.bytes.len() as u8);
        buf.put_slice(&self.bytes);
    }

    /// Read `len:u8 ++ bytes`; the caller has checked that all of it is buffered
    ///
    /// A one byte length can never exceed the limit.
    pub(crate) fn decode(buf: &mut impl Buf) -> Self {
        let len = buf.get_u8() as usize;
        Self {
            bytes: buf.copy_to_bytes(len).to_vec(),
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

fn path_bytes(path: &Path) -> Vec<u8> {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    }

    #[cfg(not(unix))]
    {
        path.to_string_lossy().into_owned().into_bytes()
    }
}

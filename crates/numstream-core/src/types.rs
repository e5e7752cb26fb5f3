//! Strong type definitions for numstream.
//!
//! Client identities are newtypes so they cannot be confused with other
//! byte buffers travelling through the server.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::CoreError;
use crate::limits::CLIENT_ID_LEN;

/// A 16-byte client identity.
///
/// Supplied by the caller and never minted by the server. The same identity
/// presented on a later connection resumes the stream it started.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub [u8; CLIENT_ID_LEN]);

impl ClientId {
    /// Create a new ClientId from raw bytes.
    pub const fn from_bytes(bytes: [u8; CLIENT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; CLIENT_ID_LEN] {
        &self.0
    }

    /// Generate a random (UUID v4) identity.
    pub fn random() -> Self {
        Self(*Uuid::new_v4().as_bytes())
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// View this identity as a UUID.
    pub fn as_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }

    /// The all-zero identity.
    pub const NIL: Self = Self([0u8; CLIENT_ID_LEN]);
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.as_uuid())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_uuid())
    }
}

impl AsRef<[u8]> for ClientId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; CLIENT_ID_LEN]> for ClientId {
    fn from(bytes: [u8; CLIENT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Uuid> for ClientId {
    fn from(uuid: Uuid) -> Self {
        Self(*uuid.as_bytes())
    }
}

impl TryFrom<&[u8]> for ClientId {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; CLIENT_ID_LEN] = slice
            .try_into()
            .map_err(|_| CoreError::InvalidClientId { len: slice.len() })?;
        Ok(Self(arr))
    }
}

impl FromStr for ClientId {
    type Err = CoreError;

    /// Parse the hyphenated UUID form, e.g. `67e55044-10b1-426f-9247-bb680e5fe0c8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(s).map_err(|e| CoreError::InvalidUuid(e.to_string()))?;
        Ok(uuid.into())
    }
}

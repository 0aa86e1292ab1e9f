//! Person identifiers.
//!
//! Identifiers travel as 24 hexadecimal characters (12 bytes). The first four
//! bytes hold the creation time in seconds, big-endian, so identifiers sort
//! roughly by age; the remaining eight are random.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::Error;

/// Number of raw bytes in a [`PersonId`].
pub const ID_BYTES: usize = 12;

/// Unique, immutable identifier of a person record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId([u8; ID_BYTES]);

impl PersonId {
    /// Creates a fresh identifier stamped with the current time.
    pub fn generate() -> Self {
        let mut bytes = [0u8; ID_BYTES];
        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        Self(bytes)
    }

    /// Parses the external string form.
    ///
    /// Accepts exactly 24 hex characters in either case; surrounding
    /// whitespace is rejected.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        if raw.len() != ID_BYTES * 2 {
            return Err(Error::InvalidIdentifier(raw.to_string()));
        }

        let mut bytes = [0u8; ID_BYTES];
        hex::decode_to_slice(raw, &mut bytes)
            .map_err(|_| Error::InvalidIdentifier(raw.to_string()))?;
        Ok(Self(bytes))
    }

    /// Builds an identifier from raw bytes.
    pub const fn from_bytes(bytes: [u8; ID_BYTES]) -> Self {
        Self(bytes)
    }

    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; ID_BYTES] {
        &self.0
    }

    /// Lowercase hex form, as stored and returned over the wire.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PersonId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PersonId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PersonId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Length of a raw ed25519 public key.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// A base58 encoded account address, as reported by the identity provider.
///
/// The string is kept as received. It is only decoded when raw bytes are needed, so an
/// address that does not decode still round-trips to the presentation layer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicAddress(String);

impl PublicAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Decode the address into its canonical 32 byte representation.
    pub fn to_bytes(&self) -> Result<[u8; PUBLIC_KEY_LENGTH], DecodeError> {
        let bytes = bs58::decode(&self.0).into_vec()?;
        let len = bytes.len();
        bytes.try_into().map_err(|_| DecodeError::Length(len))
    }
}

impl fmt::Display for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PublicAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PublicAddress {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for PublicAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

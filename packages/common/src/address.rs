//! Universal 32-byte Address
//!
//! Token, recipient and program addresses travel between chains as 32 bytes.
//! Narrower native addresses (20-byte EVM / TRON accounts) are left-padded
//! with zeros so that the raw address occupies the trailing bytes:
//!
//! ```text
//! | Zero padding (32 - n bytes) | Raw address (n bytes) |
//! ```
//!
//! Solana addresses are natively 32 bytes and are rendered in base58.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

pub const ADDRESS_LEN: usize = 32;

#[derive(
    Serialize,
    Deserialize,
    JsonSchema,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
pub struct Address32(pub [u8; ADDRESS_LEN]);

impl Address32 {
    pub const ZERO: Address32 = Address32([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse an exactly 32-byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let array: [u8; ADDRESS_LEN] =
            bytes.try_into().map_err(|_| CodecError::InvalidAddress {
                reason: format!("expected {} bytes, got {}", ADDRESS_LEN, bytes.len()),
            })?;
        Ok(Self(array))
    }

    /// Left-pad a native address of up to 32 bytes
    pub fn from_slice_padded(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() > ADDRESS_LEN {
            return Err(CodecError::InvalidAddress {
                reason: format!("address of {} bytes exceeds {}", bytes.len(), ADDRESS_LEN),
            });
        }

        let mut result = [0u8; ADDRESS_LEN];
        let start = ADDRESS_LEN - bytes.len();
        result[start..].copy_from_slice(bytes);
        Ok(Self(result))
    }

    /// Parse a hex string (with or without 0x prefix). Shorter addresses,
    /// e.g. 20-byte EVM accounts, are left-padded.
    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| CodecError::InvalidAddress {
            reason: format!("invalid hex: {}", e),
        })?;
        Self::from_slice_padded(&bytes)
    }

    /// Parse a base58 string (Solana account encoding)
    pub fn from_base58(s: &str) -> Result<Self, CodecError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| CodecError::InvalidAddress {
                reason: format!("invalid base58: {}", e),
            })?;
        Self::from_slice(&bytes)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl From<[u8; ADDRESS_LEN]> for Address32 {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

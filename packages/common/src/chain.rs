//! Chain Identifier Codec
//!
//! A network is identified by a one-byte chain type and a 64-bit chain id.
//! The canonical key used in account seeds and message headers is:
//!
//! ```text
//! | Chain Type (1 byte) | Chain ID (8 bytes, big-endian) |
//! ```
//!
//! Ranges of either field are policy decisions of the registry, not of the codec.

use std::fmt;

use cosmwasm_schema::cw_serde;

use crate::error::CodecError;

// ============================================================================
// Chain Type Constants
// ============================================================================

/// Ethereum and other EVM networks
pub const CHAIN_TYPE_ETHEREUM: u8 = 0;

/// TRON
pub const CHAIN_TYPE_TRON: u8 = 1;

/// Solana (the local chain of the bridge core)
pub const CHAIN_TYPE_SOLANA: u8 = 2;

/// Length of an encoded chain identifier
pub const CHAIN_KEY_LEN: usize = 9;

// ============================================================================
// Chain Identifier
// ============================================================================

#[cw_serde]
#[derive(Copy, Eq, Hash, PartialOrd, Ord)]
pub struct ChainIdentifier {
    pub chain_type: u8,
    pub chain_id: u64,
}

impl ChainIdentifier {
    pub const fn new(chain_type: u8, chain_id: u64) -> Self {
        Self {
            chain_type,
            chain_id,
        }
    }

    /// Canonical 9-byte key
    pub fn encode(&self) -> [u8; CHAIN_KEY_LEN] {
        let mut key = [0u8; CHAIN_KEY_LEN];
        key[0] = self.chain_type;
        key[1..].copy_from_slice(&self.chain_id.to_be_bytes());
        key
    }

    /// Inverse of [`ChainIdentifier::encode`]. Any input that is not exactly
    /// 9 bytes long is rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != CHAIN_KEY_LEN {
            return Err(CodecError::MalformedChainId { got: bytes.len() });
        }

        let mut id = [0u8; 8];
        id.copy_from_slice(&bytes[1..]);

        Ok(Self {
            chain_type: bytes[0],
            chain_id: u64::from_be_bytes(id),
        })
    }

    /// Human-readable name of the chain type, if it is a known one
    pub fn chain_type_name(&self) -> Option<&'static str> {
        match self.chain_type {
            CHAIN_TYPE_ETHEREUM => Some("ethereum"),
            CHAIN_TYPE_TRON => Some("tron"),
            CHAIN_TYPE_SOLANA => Some("solana"),
            _ => None,
        }
    }
}

impl fmt::Display for ChainIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chain_type_name() {
            Some(name) => write!(f, "{}:{}", name, self.chain_id),
            None => write!(f, "type{}:{}", self.chain_type, self.chain_id),
        }
    }
}

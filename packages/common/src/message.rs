//! Bridge Message Wire Layout
//!
//! An outgoing bridge message is the concatenation of a fixed-size header and
//! a token-transfer body. The relay signs and forwards exactly these bytes.
//!
//! # Header (107 bytes)
//! - Byte 0:        message type
//! - Bytes 1-8:     nonce (u64, big-endian)
//! - Bytes 9-17:    source chain key (9 bytes)
//! - Bytes 18-49:   source program address
//! - Bytes 50-58:   destination chain key (9 bytes)
//! - Bytes 59-90:   destination executor address
//! - Bytes 91-106:  uploaded gas fee (u128, big-endian)
//!
//! # Body (112 bytes)
//! - Bytes 0-31:    source token mint
//! - Bytes 32-47:   amount (u128, big-endian)
//! - Bytes 48-79:   sender
//! - Bytes 80-111:  recipient

use cosmwasm_schema::cw_serde;

use crate::address::{Address32, ADDRESS_LEN};
use crate::chain::{ChainIdentifier, CHAIN_KEY_LEN};
use crate::error::CodecError;

pub const MESSAGE_HEADER_LEN: usize = 1 + 8 + CHAIN_KEY_LEN + ADDRESS_LEN + CHAIN_KEY_LEN + ADDRESS_LEN + 16;

pub const MESSAGE_BODY_LEN: usize = ADDRESS_LEN + 16 + ADDRESS_LEN + ADDRESS_LEN;

/// Message type for token transfers
pub const MESSAGE_TYPE_TOKEN_TRANSFER: u8 = 0;

#[cw_serde]
#[derive(Copy, Eq)]
pub struct MessageHeader {
    pub mtype: u8,
    pub nonce: u64,
    pub from_chain: ChainIdentifier,
    pub from_addr: Address32,
    pub to_chain: ChainIdentifier,
    pub to_addr: Address32,
    pub upload_gas_fee: u128,
}

impl MessageHeader {
    pub fn to_be_bytes(&self) -> [u8; MESSAGE_HEADER_LEN] {
        let mut out = [0u8; MESSAGE_HEADER_LEN];
        let mut offset = 0;

        out[offset] = self.mtype;
        offset += 1;
        out[offset..offset + 8].copy_from_slice(&self.nonce.to_be_bytes());
        offset += 8;
        out[offset..offset + CHAIN_KEY_LEN].copy_from_slice(&self.from_chain.encode());
        offset += CHAIN_KEY_LEN;
        out[offset..offset + ADDRESS_LEN].copy_from_slice(self.from_addr.as_bytes());
        offset += ADDRESS_LEN;
        out[offset..offset + CHAIN_KEY_LEN].copy_from_slice(&self.to_chain.encode());
        offset += CHAIN_KEY_LEN;
        out[offset..offset + ADDRESS_LEN].copy_from_slice(self.to_addr.as_bytes());
        offset += ADDRESS_LEN;
        out[offset..].copy_from_slice(&self.upload_gas_fee.to_be_bytes());

        out
    }
}

#[cw_serde]
#[derive(Copy, Eq)]
pub struct MessageBody {
    pub source_token: Address32,
    pub all_amount: u128,
    pub from_who: Address32,
    pub to_who: Address32,
}

impl MessageBody {
    pub fn to_be_bytes(&self) -> [u8; MESSAGE_BODY_LEN] {
        let mut out = [0u8; MESSAGE_BODY_LEN];
        out[0..32].copy_from_slice(self.source_token.as_bytes());
        out[32..48].copy_from_slice(&self.all_amount.to_be_bytes());
        out[48..80].copy_from_slice(self.from_who.as_bytes());
        out[80..112].copy_from_slice(self.to_who.as_bytes());
        out
    }

    /// Parse a body received from another chain. Trailing bytes beyond the
    /// fixed layout are ignored, a short buffer is rejected.
    pub fn from_be_bytes(buffer: &[u8]) -> Result<Self, CodecError> {
        if buffer.len() < MESSAGE_BODY_LEN {
            return Err(CodecError::InvalidMessage {
                reason: format!(
                    "body too short: expected {} bytes, got {}",
                    MESSAGE_BODY_LEN,
                    buffer.len()
                ),
            });
        }

        let mut amount = [0u8; 16];
        amount.copy_from_slice(&buffer[32..48]);

        Ok(Self {
            source_token: Address32::from_slice(&buffer[0..32])?,
            all_amount: u128::from_be_bytes(amount),
            from_who: Address32::from_slice(&buffer[48..80])?,
            to_who: Address32::from_slice(&buffer[80..112])?,
        })
    }
}

//! Bridge Common - Shared Codecs for the Token Bridge
//!
//! This package provides the byte-exact encodings that every party of the
//! bridge (source-chain core, relay, destination-chain executor) must agree on:
//!
//! - **Chain identifiers** - 9-byte `| chain_type | chain_id (BE) |` keys
//! - **Addresses** - 32-byte universal addresses, left zero-padded
//! - **Messages** - header/body byte layouts of an emitted bridge message

pub mod address;
pub mod chain;
pub mod error;
pub mod message;

pub use address::Address32;
pub use chain::{
    ChainIdentifier, CHAIN_KEY_LEN, CHAIN_TYPE_ETHEREUM, CHAIN_TYPE_SOLANA, CHAIN_TYPE_TRON,
};
pub use error::CodecError;
pub use message::{
    MessageBody, MessageHeader, MESSAGE_BODY_LEN, MESSAGE_HEADER_LEN, MESSAGE_TYPE_TOKEN_TRANSFER,
};

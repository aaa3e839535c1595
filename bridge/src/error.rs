//! Error types for the token bridge core
//!
//! Every failure aborts the enclosing transaction; none of these are retried
//! or downgraded by the core.

use bridge_common::CodecError;
use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BridgeError {
    #[error("{0}")]
    Std(#[from] StdError),

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: only {role} can perform this action")]
    Unauthorized { role: &'static str },

    // ========================================================================
    // Initialization Errors
    // ========================================================================

    #[error("Bridge is already initialized")]
    AlreadyInitialized,

    #[error("Bridge is not initialized")]
    NotInitialized,

    #[error("Invalid settings: {reason}")]
    InvalidSettings { reason: String },

    // ========================================================================
    // Codec & Derivation Errors
    // ========================================================================

    #[error("Malformed chain id: expected 9 bytes, got {got}")]
    MalformedChainId { got: usize },

    #[error("Invalid seed: {reason}")]
    InvalidSeed { reason: String },

    #[error("No valid bump seed found for program address")]
    DerivationOverflow,

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Invalid message: {reason}")]
    InvalidMessage { reason: String },

    // ========================================================================
    // Relation Errors
    // ========================================================================

    #[error("Chain relation not found: {chain}")]
    UnknownChainRelation { chain: String },

    #[error("Chain is inactive: {chain}")]
    ChainInactive { chain: String },

    #[error("Token relation not found: {token} on {chain}")]
    UnknownTokenRelation { chain: String, token: String },

    #[error("Token mint mismatch: relation expects {expected}, got {got}")]
    TokenMintMismatch { expected: String, got: String },

    #[error("Custody pool not found for mint {mint}")]
    UnknownPool { mint: String },

    #[error("Relation still backs {outstanding} locked tokens of mint {mint}")]
    RelationInUse { mint: String, outstanding: u64 },

    // ========================================================================
    // Amount & Funds Errors
    // ========================================================================

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Amount overflow")]
    AmountOverflow,

    #[error("Custody transfer failed: {reason}")]
    CustodyTransferFailed { reason: String },

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },

    #[error("Insufficient pool liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u64, available: u64 },

    // ========================================================================
    // Liquidity Provider Errors
    // ========================================================================

    #[error("Invalid pool fee rate {rate}: must not exceed 1000000")]
    InvalidFeeRate { rate: u64 },

    #[error("Liquidity position not found for {provider}")]
    UnknownLiquidityPosition { provider: String },
}

impl From<CodecError> for BridgeError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::MalformedChainId { got } => BridgeError::MalformedChainId { got },
            CodecError::InvalidAddress { reason } => BridgeError::InvalidAddress { reason },
            CodecError::InvalidMessage { reason } => BridgeError::InvalidMessage { reason },
        }
    }
}

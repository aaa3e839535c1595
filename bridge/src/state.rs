//! State definitions for the token bridge core
//!
//! Every record is stored in a typed table keyed by the address of the
//! derived account that holds it. See [`crate::derivation`] for the seeds of
//! each account.

use bridge_common::{Address32, ChainIdentifier};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;
use cw_storage_plus::Map;

use crate::derivation::AccountHandle;

pub const CONTRACT_NAME: &str = "token-bridge";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Configuration
// ============================================================================

/// Bridge program configuration
#[cw_serde]
pub struct BridgeConfig {
    /// Address allowed to manage relations and release custody
    pub admin: Address32,
    pub bump: u8,
}

/// Message program configuration
#[cw_serde]
pub struct CoreConfig {
    /// Address allowed to withdraw fees and change the bridge fee
    pub super_admin: Address32,
    /// Flat fee in native units charged on every proposal
    pub bridge_fee: u64,
    pub bump: u8,
}

/// Owner of every custody pool
#[cw_serde]
pub struct BridgeAuthority {
    pub bump: u8,
}

// ============================================================================
// Relations
// ============================================================================

/// Destination chain registration
#[cw_serde]
pub struct ChainRelation {
    pub chain: ChainIdentifier,
    /// Contract on the destination chain that executes proposals
    pub executor: Address32,
    /// Token the destination charges its execution fee in
    pub fee_token: Address32,
    pub active: bool,
}

/// Mapping of a foreign token to a local mint
#[cw_serde]
pub struct TokenRelation {
    pub chain: ChainIdentifier,
    pub foreign_token: Address32,
    pub foreign_decimals: u8,
    pub local_mint: Address32,
    pub local_decimals: u8,
    /// Custody pool of the local mint
    pub pool: AccountHandle,
}

// ============================================================================
// Custody & Fees
// ============================================================================

/// Custody pool for one local mint
#[cw_serde]
pub struct Pool {
    pub mint: Address32,
    /// Bridge authority that owns the pooled tokens
    pub authority: Address32,
    /// Tokens currently held: locked custody, provided liquidity and
    /// unclaimed LP fees
    pub balance: u64,
    pub total_locked: u64,
    /// Gross amount released, LP fees included
    pub total_released: u64,
    /// Principal provided by liquidity providers
    pub liquidity: u64,
    /// LP fee taken from each release, in millionths
    pub fee_rate: u64,
    /// LP fees accrued per unit of liquidity, scaled by 2^32
    pub acc_ratio: Uint128,
    /// LP fees credited to providers over the pool's lifetime
    pub total_earns: u64,
}

/// Liquidity position of one provider in one pool
#[cw_serde]
pub struct Lp {
    pub mint: Address32,
    pub provider: Address32,
    /// Principal currently provided
    pub amount: u64,
    /// Rewards withdrawn so far
    pub earns: u64,
    /// Share of `acc_ratio` already accounted for
    pub debt: u64,
    /// Rewards settled on partial removal, not yet withdrawn
    pub remaining: u64,
}

/// Per-destination outbound counter
#[cw_serde]
pub struct ToChainNonce {
    pub chain: ChainIdentifier,
    /// Next nonce to issue
    pub next_nonce: u64,
}

/// Native-token fee vault
#[cw_serde]
pub struct FeeVault {
    pub balance: u64,
    pub total_collected: u64,
    pub total_withdrawn: u64,
}

// ============================================================================
// Storage
// ============================================================================

pub const BRIDGE_CONFIG: Map<&[u8], BridgeConfig> = Map::new("bridge_config");

pub const BRIDGE_AUTHORITY: Map<&[u8], BridgeAuthority> = Map::new("bridge_authority");

pub const CORE_CONFIG: Map<&[u8], CoreConfig> = Map::new("core_config");

pub const CHAIN_RELATIONS: Map<&[u8], ChainRelation> = Map::new("chain_relations");

pub const TOKEN_RELATIONS: Map<&[u8], TokenRelation> = Map::new("token_relations");

pub const POOLS: Map<&[u8], Pool> = Map::new("pools");

pub const LPS: Map<&[u8], Lp> = Map::new("lps");

pub const TO_CHAIN_NONCES: Map<&[u8], ToChainNonce> = Map::new("to_chain_nonces");

pub const FEE_VAULTS: Map<&[u8], FeeVault> = Map::new("fee_vaults");

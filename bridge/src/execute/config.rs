//! Configuration handlers for relations and the bridge fee.

use bridge_common::{Address32, ChainIdentifier};
use cosmwasm_std::{Response, Storage};
use tracing::debug;

use super::admin::{ensure_admin, ensure_super_admin};
use crate::accounts::{BridgeEnv, ChainRelationAccounts, PoolAccounts, TokenRelationAccounts};
use crate::error::BridgeError;
use crate::msg::MessageInfo;
use crate::pool;
use crate::relation::{self, ChainRelationUpdate};
use crate::state::{TokenRelation, CORE_CONFIG};

// ============================================================================
// Chain Relations
// ============================================================================

/// Register a destination chain, or update its executor, fee token or
/// active flag.
pub fn execute_set_chain_relation(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    accounts: &ChainRelationAccounts,
    chain: ChainIdentifier,
    update: ChainRelationUpdate,
) -> Result<Response, BridgeError> {
    ensure_admin(storage, &accounts.bridge_config, &info.sender)?;

    let relation =
        relation::set_chain_relation(storage, &accounts.chain_relation, &chain, update)?;

    Ok(Response::new()
        .add_attribute("method", "set_chain_relation")
        .add_attribute("chain", chain.to_string())
        .add_attribute("executor", relation.executor.to_hex())
        .add_attribute("fee_token", relation.fee_token.to_hex())
        .add_attribute("active", relation.active.to_string()))
}

// ============================================================================
// Token Relations
// ============================================================================

/// Map a foreign token to a local mint. The custody pool of the mint is
/// created on first use.
#[allow(clippy::too_many_arguments)]
pub fn execute_set_token_relation(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    accounts: &TokenRelationAccounts,
    chain: ChainIdentifier,
    foreign_token: Address32,
    foreign_decimals: u8,
    local_mint: Address32,
    local_decimals: u8,
) -> Result<Response, BridgeError> {
    ensure_admin(storage, &accounts.bridge_config, &info.sender)?;

    let pool_created = pool::ensure_pool(
        storage,
        &accounts.pool,
        &local_mint,
        &accounts.bridge_authority.address,
    )?;

    let relation = TokenRelation {
        chain,
        foreign_token,
        foreign_decimals,
        local_mint,
        local_decimals,
        pool: accounts.pool,
    };
    relation::set_token_relation(storage, &accounts.token_relation, &relation)?;
    debug!(chain = %chain, token = %foreign_token.to_hex(), mint = %local_mint, "token relation staged");

    Ok(Response::new()
        .add_attribute("method", "set_token_relation")
        .add_attribute("chain", chain.to_string())
        .add_attribute("foreign_token", foreign_token.to_hex())
        .add_attribute("local_mint", local_mint.to_string())
        .add_attribute("pool", accounts.pool.address.to_string())
        .add_attribute("pool_created", pool_created.to_string()))
}

/// Unmap a foreign token. Locked custody is released through the relation,
/// so removal waits until the mint's pool has none outstanding.
pub fn execute_remove_token_relation(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    accounts: &TokenRelationAccounts,
    chain: ChainIdentifier,
    foreign_token: Address32,
    local_mint: Address32,
) -> Result<Response, BridgeError> {
    ensure_admin(storage, &accounts.bridge_config, &info.sender)?;

    let existing =
        relation::resolve_token(storage, &accounts.token_relation, &chain, &foreign_token)?;
    if existing.local_mint != local_mint {
        return Err(BridgeError::TokenMintMismatch {
            expected: existing.local_mint.to_string(),
            got: local_mint.to_string(),
        });
    }
    let outstanding = pool::outstanding(storage, &accounts.pool, &local_mint)?;
    if outstanding > 0 {
        return Err(BridgeError::RelationInUse {
            mint: local_mint.to_string(),
            outstanding,
        });
    }

    let removed =
        relation::remove_token_relation(storage, &accounts.token_relation, &chain, &foreign_token)?;

    Ok(Response::new()
        .add_attribute("method", "remove_token_relation")
        .add_attribute("chain", chain.to_string())
        .add_attribute("foreign_token", foreign_token.to_hex())
        .add_attribute("local_mint", removed.local_mint.to_string()))
}

// ============================================================================
// Pool Fee
// ============================================================================

pub fn execute_set_pool_fee_rate(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    accounts: &PoolAccounts,
    mint: Address32,
    fee_rate: u64,
) -> Result<Response, BridgeError> {
    ensure_admin(storage, &accounts.bridge_config, &info.sender)?;

    let old_rate = pool::set_fee_rate(storage, &accounts.pool, &mint, fee_rate)?;

    Ok(Response::new()
        .add_attribute("method", "set_pool_fee_rate")
        .add_attribute("mint", mint.to_string())
        .add_attribute("old_fee_rate", old_rate.to_string())
        .add_attribute("fee_rate", fee_rate.to_string()))
}

// ============================================================================
// Bridge Fee
// ============================================================================

/// Set the flat fee charged on every proposal.
pub fn execute_set_bridge_fee(
    storage: &mut dyn Storage,
    env: &BridgeEnv,
    info: &MessageInfo,
    bridge_fee: u64,
) -> Result<Response, BridgeError> {
    let mut config = ensure_super_admin(storage, &env.core_config, &info.sender)?;
    let old_fee = config.bridge_fee;

    config.bridge_fee = bridge_fee;
    CORE_CONFIG.save(storage, env.core_config.key(), &config)?;

    Ok(Response::new()
        .add_attribute("method", "set_bridge_fee")
        .add_attribute("old_bridge_fee", old_fee.to_string())
        .add_attribute("bridge_fee", bridge_fee.to_string()))
}

//! Query handlers for the token bridge.
//!
//! This module contains all query message handlers for retrieving committed
//! state. Each handler derives the accounts it reads from the query input.

use bridge_common::{Address32, ChainIdentifier};
use cosmwasm_std::{StdError, StdResult, Storage};

use crate::accounts::BridgeEnv;
use crate::derivation::AccountHandle;
use crate::error::BridgeError;
use crate::msg::{
    AccountsResponse, ChainRelationResponse, ConfigResponse, FeeVaultResponse, LpResponse,
    NonceResponse, PoolResponse, TokenRelationResponse, TokenRelationsResponse,
};
use crate::nonce;
use crate::pool;
use crate::relation;
use crate::state::{
    TokenRelation, BRIDGE_CONFIG, CHAIN_RELATIONS, CORE_CONFIG, FEE_VAULTS, LPS, POOLS,
};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

fn std_err(err: BridgeError) -> StdError {
    StdError::generic_err(err.to_string())
}

// ============================================================================
// Core Queries
// ============================================================================

pub fn query_config(storage: &dyn Storage, env: &BridgeEnv) -> StdResult<ConfigResponse> {
    let config = BRIDGE_CONFIG.load(storage, env.bridge_config.key())?;
    let core = CORE_CONFIG.load(storage, env.core_config.key())?;

    Ok(ConfigResponse {
        admin: config.admin,
        super_admin: core.super_admin,
        bridge_fee: core.bridge_fee,
        local_chain: env.local_chain,
        native_mint: env.native_mint,
        bridge_config: env.bridge_config,
        core_config: env.core_config,
    })
}

pub fn query_fee_vault(storage: &dyn Storage, env: &BridgeEnv) -> StdResult<FeeVaultResponse> {
    let vault = FEE_VAULTS.load(storage, env.fee_vault.key())?;
    Ok(FeeVaultResponse {
        balance: vault.balance,
        total_collected: vault.total_collected,
        total_withdrawn: vault.total_withdrawn,
        account: env.fee_vault,
    })
}

pub fn query_current_nonce(
    storage: &dyn Storage,
    env: &BridgeEnv,
    chain: ChainIdentifier,
) -> StdResult<NonceResponse> {
    let account = env.programs.to_chain_nonce(&chain).map_err(std_err)?;
    Ok(NonceResponse {
        nonce: nonce::current_nonce(storage, &account)?,
    })
}

// ============================================================================
// Relation Queries
// ============================================================================

pub fn query_chain_relation(
    storage: &dyn Storage,
    env: &BridgeEnv,
    chain: ChainIdentifier,
) -> StdResult<ChainRelationResponse> {
    let account = env.programs.chain_relation(&chain).map_err(std_err)?;
    let relation = CHAIN_RELATIONS
        .may_load(storage, account.key())?
        .ok_or_else(|| StdError::not_found(format!("chain relation {}", chain)))?;

    Ok(ChainRelationResponse {
        chain: relation.chain,
        executor: relation.executor,
        fee_token: relation.fee_token,
        active: relation.active,
        account,
    })
}

fn token_relation_response(account: Address32, relation: TokenRelation) -> TokenRelationResponse {
    TokenRelationResponse {
        chain: relation.chain,
        foreign_token: relation.foreign_token,
        foreign_decimals: relation.foreign_decimals,
        local_mint: relation.local_mint,
        local_decimals: relation.local_decimals,
        pool: relation.pool,
        account,
    }
}

pub fn query_token_relation(
    storage: &dyn Storage,
    env: &BridgeEnv,
    chain: ChainIdentifier,
    foreign_token: Address32,
) -> StdResult<TokenRelationResponse> {
    let account = env
        .programs
        .token_relation(&chain, &foreign_token)
        .map_err(std_err)?;
    let relation = relation::resolve_token(storage, &account, &chain, &foreign_token)
        .map_err(|e| StdError::not_found(e.to_string()))?;

    Ok(token_relation_response(account.address, relation))
}

pub fn query_token_relations(
    storage: &dyn Storage,
    start_after: Option<Address32>,
    limit: Option<u32>,
) -> StdResult<TokenRelationsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let relations = relation::list_token_relations(storage, start_after.as_ref(), limit)?
        .into_iter()
        .map(|(account, relation)| token_relation_response(account, relation))
        .collect();

    Ok(TokenRelationsResponse { relations })
}

// ============================================================================
// Custody Queries
// ============================================================================

pub fn query_pool(
    storage: &dyn Storage,
    env: &BridgeEnv,
    mint: Address32,
) -> StdResult<PoolResponse> {
    let account = env.programs.pool(&mint).map_err(std_err)?;
    let pool = POOLS
        .may_load(storage, account.key())?
        .ok_or_else(|| StdError::not_found(format!("pool for mint {}", mint)))?;

    Ok(PoolResponse {
        mint: pool.mint,
        authority: pool.authority,
        balance: pool.balance,
        total_locked: pool.total_locked,
        total_released: pool.total_released,
        liquidity: pool.liquidity,
        fee_rate: pool.fee_rate,
        total_earns: pool.total_earns,
        account,
    })
}

pub fn query_lp(
    storage: &dyn Storage,
    env: &BridgeEnv,
    mint: Address32,
    provider: Address32,
) -> StdResult<LpResponse> {
    let pool_account = env.programs.pool(&mint).map_err(std_err)?;
    let account = env
        .programs
        .lp(&pool_account, &provider)
        .map_err(std_err)?;

    let pool = POOLS
        .may_load(storage, pool_account.key())?
        .ok_or_else(|| StdError::not_found(format!("pool for mint {}", mint)))?;
    let lp = LPS
        .may_load(storage, account.key())?
        .ok_or_else(|| StdError::not_found(format!("liquidity of {}", provider)))?;

    Ok(LpResponse {
        mint: lp.mint,
        provider: lp.provider,
        amount: lp.amount,
        earns: lp.earns,
        pending_reward: pool::pending_reward(&lp, &pool).map_err(std_err)?,
        account,
    })
}

/// Derive every account a proposal for this chain, token and mint touches.
/// Needs no state.
pub fn query_accounts(
    env: &BridgeEnv,
    chain: ChainIdentifier,
    foreign_token: Address32,
    mint: Address32,
) -> StdResult<AccountsResponse> {
    let derive = |result: Result<AccountHandle, BridgeError>| result.map_err(std_err);

    Ok(AccountsResponse {
        bridge_config: env.bridge_config,
        bridge_authority: env.bridge_authority,
        core_config: env.core_config,
        fee_vault: env.fee_vault,
        chain_relation: derive(env.programs.chain_relation(&chain))?,
        token_relation: derive(env.programs.token_relation(&chain, &foreign_token))?,
        to_chain_nonce: derive(env.programs.to_chain_nonce(&chain))?,
        pool: derive(env.programs.pool(&mint))?,
    })
}

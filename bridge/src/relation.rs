//! Chain and token relation registry
//!
//! A chain relation marks a destination as known and records whether it
//! currently accepts proposals. A token relation maps a foreign token on a
//! destination to the local mint whose custody pool backs it. Relations are
//! only ever created by an admin.

use bridge_common::{Address32, ChainIdentifier};
use cosmwasm_std::{Order, StdResult, Storage};
use cw_storage_plus::Bound;

use crate::derivation::AccountHandle;
use crate::error::BridgeError;
use crate::state::{ChainRelation, TokenRelation, CHAIN_RELATIONS, TOKEN_RELATIONS};

// ============================================================================
// Chain Relations
// ============================================================================

fn load_chain(
    storage: &dyn Storage,
    account: &AccountHandle,
    chain: &ChainIdentifier,
) -> Result<ChainRelation, BridgeError> {
    CHAIN_RELATIONS
        .may_load(storage, account.key())?
        .ok_or_else(|| BridgeError::UnknownChainRelation {
            chain: chain.to_string(),
        })
}

/// Whether the destination accepts proposals. Unknown chains are an error,
/// not an inactive chain.
pub fn is_chain_active(
    storage: &dyn Storage,
    account: &AccountHandle,
    chain: &ChainIdentifier,
) -> Result<bool, BridgeError> {
    Ok(load_chain(storage, account, chain)?.active)
}

/// Resolve a chain relation that must be active.
pub fn active_chain(
    storage: &dyn Storage,
    account: &AccountHandle,
    chain: &ChainIdentifier,
) -> Result<ChainRelation, BridgeError> {
    let relation = load_chain(storage, account, chain)?;
    if !relation.active {
        return Err(BridgeError::ChainInactive {
            chain: chain.to_string(),
        });
    }
    Ok(relation)
}

/// Fields of a chain relation to change. Unset fields keep their current
/// value, or the default for a new relation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChainRelationUpdate {
    pub executor: Option<Address32>,
    pub fee_token: Option<Address32>,
    pub active: Option<bool>,
}

/// Create or update a chain relation. New relations are active unless told
/// otherwise; a new relation without an executor or fee token uses the zero
/// address.
pub fn set_chain_relation(
    storage: &mut dyn Storage,
    account: &AccountHandle,
    chain: &ChainIdentifier,
    update: ChainRelationUpdate,
) -> StdResult<ChainRelation> {
    let relation = match CHAIN_RELATIONS.may_load(storage, account.key())? {
        Some(existing) => ChainRelation {
            chain: existing.chain,
            executor: update.executor.unwrap_or(existing.executor),
            fee_token: update.fee_token.unwrap_or(existing.fee_token),
            active: update.active.unwrap_or(existing.active),
        },
        None => ChainRelation {
            chain: *chain,
            executor: update.executor.unwrap_or(Address32::ZERO),
            fee_token: update.fee_token.unwrap_or(Address32::ZERO),
            active: update.active.unwrap_or(true),
        },
    };

    CHAIN_RELATIONS.save(storage, account.key(), &relation)?;
    Ok(relation)
}

// ============================================================================
// Token Relations
// ============================================================================

/// Resolve the local side of a foreign token.
pub fn resolve_token(
    storage: &dyn Storage,
    account: &AccountHandle,
    chain: &ChainIdentifier,
    foreign_token: &Address32,
) -> Result<TokenRelation, BridgeError> {
    TOKEN_RELATIONS
        .may_load(storage, account.key())?
        .ok_or_else(|| BridgeError::UnknownTokenRelation {
            chain: chain.to_string(),
            token: foreign_token.to_hex(),
        })
}

pub fn set_token_relation(
    storage: &mut dyn Storage,
    account: &AccountHandle,
    relation: &TokenRelation,
) -> StdResult<()> {
    TOKEN_RELATIONS.save(storage, account.key(), relation)
}

/// Delete a token relation. The custody pool of its mint is left untouched;
/// callers must make sure no locked custody still depends on the relation.
pub fn remove_token_relation(
    storage: &mut dyn Storage,
    account: &AccountHandle,
    chain: &ChainIdentifier,
    foreign_token: &Address32,
) -> Result<TokenRelation, BridgeError> {
    let relation = resolve_token(storage, account, chain, foreign_token)?;
    TOKEN_RELATIONS.remove(storage, account.key());
    Ok(relation)
}

/// Page through token relations ordered by relation account address.
pub fn list_token_relations(
    storage: &dyn Storage,
    start_after: Option<&Address32>,
    limit: usize,
) -> StdResult<Vec<(Address32, TokenRelation)>> {
    let start = start_after.map(|address| Bound::exclusive(address.as_ref()));

    TOKEN_RELATIONS
        .range(storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (key, relation) = item?;
            let address = Address32::from_slice(&key)
                .map_err(|e| cosmwasm_std::StdError::generic_err(e.to_string()))?;
            Ok((address, relation))
        })
        .collect()
}

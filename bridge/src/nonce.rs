//! Per-destination nonce registry
//!
//! Nonces for a destination start at 0 and increase by one per issued
//! proposal, with no gaps. Each destination has its own counter account.

use bridge_common::ChainIdentifier;
use cosmwasm_std::{StdResult, Storage};

use crate::derivation::AccountHandle;
use crate::error::BridgeError;
use crate::state::{ToChainNonce, TO_CHAIN_NONCES};

/// Issue the next nonce for `chain` and advance the counter.
pub fn next_nonce(
    storage: &mut dyn Storage,
    account: &AccountHandle,
    chain: &ChainIdentifier,
) -> Result<u64, BridgeError> {
    let mut counter = TO_CHAIN_NONCES
        .may_load(storage, account.key())?
        .unwrap_or(ToChainNonce {
            chain: *chain,
            next_nonce: 0,
        });

    let issued = counter.next_nonce;
    counter.next_nonce = issued
        .checked_add(1)
        .ok_or(BridgeError::AmountOverflow)?;
    TO_CHAIN_NONCES.save(storage, account.key(), &counter)?;

    Ok(issued)
}

/// Next nonce that will be issued, without consuming it.
pub fn current_nonce(storage: &dyn Storage, account: &AccountHandle) -> StdResult<u64> {
    Ok(TO_CHAIN_NONCES
        .may_load(storage, account.key())?
        .map(|counter| counter.next_nonce)
        .unwrap_or(0))
}

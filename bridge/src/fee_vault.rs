//! Fee Vault Module
//!
//! Native-token fees collected by bridge proposals accumulate in a single
//! vault account owned by the message program.
//!
//! ## Fee Structure
//!
//! | Component  | Source                           |
//! |------------|----------------------------------|
//! | Gas fee    | Chosen by the sender per proposal |
//! | Bridge fee | Flat, set by the super admin      |
//!
//! Both components are paid in the native mint and credited to the vault.
//! Only the super admin can withdraw.

use bridge_common::Address32;
use cosmwasm_std::{StdResult, Storage};

use crate::derivation::AccountHandle;
use crate::error::BridgeError;
use crate::state::{CoreConfig, FeeVault, FEE_VAULTS};

/// Total native fee owed by a proposal
pub fn total_fee(config: &CoreConfig, gas_fee: u64) -> Result<u64, BridgeError> {
    gas_fee
        .checked_add(config.bridge_fee)
        .ok_or(BridgeError::AmountOverflow)
}

/// Create an empty vault
pub fn open(storage: &mut dyn Storage, vault: &AccountHandle) -> StdResult<()> {
    FEE_VAULTS.save(
        storage,
        vault.key(),
        &FeeVault {
            balance: 0,
            total_collected: 0,
            total_withdrawn: 0,
        },
    )
}

fn load(storage: &dyn Storage, vault: &AccountHandle) -> Result<FeeVault, BridgeError> {
    FEE_VAULTS
        .may_load(storage, vault.key())?
        .ok_or(BridgeError::NotInitialized)
}

/// Add collected fees. Returns the new balance.
pub fn credit(
    storage: &mut dyn Storage,
    vault: &AccountHandle,
    amount: u64,
) -> Result<u64, BridgeError> {
    let mut record = load(storage, vault)?;
    record.balance = record
        .balance
        .checked_add(amount)
        .ok_or(BridgeError::AmountOverflow)?;
    record.total_collected = record.total_collected.saturating_add(amount);
    FEE_VAULTS.save(storage, vault.key(), &record)?;
    Ok(record.balance)
}

/// Take `amount` out of the vault for the super admin. Returns the new balance.
pub fn withdraw(
    storage: &mut dyn Storage,
    vault: &AccountHandle,
    config: &CoreConfig,
    caller: &Address32,
    amount: u64,
) -> Result<u64, BridgeError> {
    if *caller != config.super_admin {
        return Err(BridgeError::Unauthorized {
            role: "super admin",
        });
    }

    let mut record = load(storage, vault)?;
    if amount > record.balance {
        return Err(BridgeError::InsufficientFunds {
            requested: amount,
            available: record.balance,
        });
    }

    record.balance -= amount;
    record.total_withdrawn = record.total_withdrawn.saturating_add(amount);
    FEE_VAULTS.save(storage, vault.key(), &record)?;
    Ok(record.balance)
}

/// Current vault balance
pub fn balance(storage: &dyn Storage, vault: &AccountHandle) -> Result<u64, BridgeError> {
    Ok(load(storage, vault)?.balance)
}

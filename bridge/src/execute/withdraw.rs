//! Handlers that move value out of the bridge: fee withdrawal and custody
//! release after a transfer settles on the other side.

use bridge_common::{Address32, ChainIdentifier};
use cosmwasm_std::{Response, Storage, Uint128};

use super::admin::{ensure_admin, load_core_config};
use crate::accounts::{BridgeEnv, TokenRelationAccounts};
use crate::error::BridgeError;
use crate::fee_vault;
use crate::msg::MessageInfo;
use crate::pool;
use crate::relation;

// ============================================================================
// Fee Withdrawal
// ============================================================================

pub fn execute_withdraw_fee(
    storage: &mut dyn Storage,
    env: &BridgeEnv,
    info: &MessageInfo,
    amount: u64,
) -> Result<Response, BridgeError> {
    let config = load_core_config(storage, &env.core_config)?;
    let remaining = fee_vault::withdraw(storage, &env.fee_vault, &config, &info.sender, amount)?;

    Ok(Response::new()
        .add_attribute("method", "withdraw_fee")
        .add_attribute("recipient", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_attribute("remaining", remaining.to_string()))
}

// ============================================================================
// Custody Release
// ============================================================================

/// Release custody for a settled transfer. `amount` is denominated in the
/// foreign token and converted with the relation decimals. The pool's LP fee
/// is kept back from the payout.
#[allow(clippy::too_many_arguments)]
pub fn execute_release_custody(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    accounts: &TokenRelationAccounts,
    chain: ChainIdentifier,
    foreign_token: Address32,
    local_mint: Address32,
    recipient: Address32,
    amount: Uint128,
) -> Result<Response, BridgeError> {
    ensure_admin(storage, &accounts.bridge_config, &info.sender)?;

    let relation =
        relation::resolve_token(storage, &accounts.token_relation, &chain, &foreign_token)?;
    if relation.local_mint != local_mint {
        return Err(BridgeError::TokenMintMismatch {
            expected: relation.local_mint.to_string(),
            got: local_mint.to_string(),
        });
    }

    let local_amount =
        pool::convert_decimals(amount, relation.foreign_decimals, relation.local_decimals)?;
    if local_amount == 0 {
        return Err(BridgeError::ZeroAmount);
    }
    let released = pool::release(storage, &accounts.pool, &local_mint, local_amount)?;

    Ok(Response::new()
        .add_attribute("method", "release_custody")
        .add_attribute("src_chain", chain.to_string())
        .add_attribute("local_mint", local_mint.to_string())
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("foreign_amount", amount.to_string())
        .add_attribute("amount", local_amount.to_string())
        .add_attribute("payout", released.payout.to_string())
        .add_attribute("lp_fee", released.lp_fee.to_string())
        .add_attribute("pool_balance", released.balance.to_string()))
}

//! Liquidity provider handlers.
//!
//! Providers deposit tokens of a mint into its custody pool and earn the LP
//! fee kept from every release, in proportion to what they provide.

use bridge_common::Address32;
use cosmwasm_std::{Response, Storage};

use crate::accounts::LiquidityAccounts;
use crate::error::BridgeError;
use crate::msg::MessageInfo;
use crate::pool;

pub fn execute_add_liquidity(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    accounts: &LiquidityAccounts,
    mint: Address32,
    amount: u64,
) -> Result<Response, BridgeError> {
    pool::verify_attached_funds(&info.funds, &[(mint, amount)])?;
    let position = pool::add_liquidity(
        storage,
        &accounts.pool,
        &accounts.lp,
        &mint,
        &info.sender,
        amount,
    )?;

    Ok(Response::new()
        .add_attribute("method", "add_liquidity")
        .add_attribute("mint", mint.to_string())
        .add_attribute("provider", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_attribute("position", position.amount.to_string()))
}

pub fn execute_remove_liquidity(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    accounts: &LiquidityAccounts,
    mint: Address32,
    amount: u64,
) -> Result<Response, BridgeError> {
    let position = pool::remove_liquidity(
        storage,
        &accounts.pool,
        &accounts.lp,
        &mint,
        &info.sender,
        amount,
    )?;

    Ok(Response::new()
        .add_attribute("method", "remove_liquidity")
        .add_attribute("mint", mint.to_string())
        .add_attribute("provider", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_attribute("position", position.amount.to_string()))
}

pub fn execute_withdraw_lp_reward(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    accounts: &LiquidityAccounts,
    mint: Address32,
    amount: u64,
) -> Result<Response, BridgeError> {
    let remaining = pool::withdraw_reward(
        storage,
        &accounts.pool,
        &accounts.lp,
        &mint,
        &info.sender,
        amount,
    )?;

    Ok(Response::new()
        .add_attribute("method", "withdraw_lp_reward")
        .add_attribute("mint", mint.to_string())
        .add_attribute("provider", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_attribute("remaining_reward", remaining.to_string()))
}

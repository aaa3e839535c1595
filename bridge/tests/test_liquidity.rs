//! Integration tests for liquidity provision and the pool fee rate.

mod common;

use bridge_common::Address32;
use cosmwasm_std::Uint128;

use common::*;
use token_bridge::msg::{ExecuteMsg, LpResponse, MessageInfo, PoolResponse, QueryMsg};
use token_bridge::{Bridge, BridgeError};

const PROVIDER: Address32 = Address32::new([0xa1; 32]);

/// 2^30, so fee shares divide without rounding
const LIQUIDITY: u64 = 1 << 30;

fn pool(bridge: &Bridge) -> PoolResponse {
    query(bridge, QueryMsg::Pool { mint: MINT })
}

fn lp(bridge: &Bridge, provider: Address32) -> LpResponse {
    query(
        bridge,
        QueryMsg::Lp {
            mint: MINT,
            provider,
        },
    )
}

fn add_liquidity(bridge: &Bridge, provider: Address32, amount: u64) {
    bridge
        .execute(
            &MessageInfo::new(provider).with_funds(MINT, amount),
            ExecuteMsg::AddLiquidity { mint: MINT, amount },
        )
        .unwrap();
}

/// Release one 9-decimal token (1e18 at 18 decimals) to `RECIPIENT`
fn release_one_token(bridge: &Bridge) {
    bridge
        .execute(
            &admin(),
            ExecuteMsg::ReleaseCustody {
                chain: EDS,
                foreign_token: FOREIGN_TOKEN,
                local_mint: MINT,
                recipient: RECIPIENT,
                amount: Uint128::new(1_000_000_000_000_000_000),
            },
        )
        .unwrap();
}

// ============================================================================
// Provision
// ============================================================================

#[test]
fn test_add_liquidity() {
    let bridge = setup();
    add_liquidity(&bridge, PROVIDER, LIQUIDITY);

    let pool = pool(&bridge);
    assert_eq!(pool.balance, LIQUIDITY);
    assert_eq!(pool.liquidity, LIQUIDITY);
    assert_eq!(pool.total_locked, 0);

    let position = lp(&bridge, PROVIDER);
    assert_eq!(position.provider, PROVIDER);
    assert_eq!(position.amount, LIQUIDITY);
    assert_eq!(position.pending_reward, 0);
    assert_eq!(
        position.account,
        bridge
            .env()
            .programs
            .lp(&pool.account, &PROVIDER)
            .unwrap()
    );
}

#[test]
fn test_add_liquidity_requires_attached_funds() {
    let bridge = setup();
    let err = bridge
        .execute(
            &MessageInfo::new(PROVIDER).with_funds(MINT, LIQUIDITY - 1),
            ExecuteMsg::AddLiquidity {
                mint: MINT,
                amount: LIQUIDITY,
            },
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::CustodyTransferFailed { .. }));
    assert_eq!(pool(&bridge).balance, 0);
    assert!(bridge
        .query(QueryMsg::Lp {
            mint: MINT,
            provider: PROVIDER,
        })
        .is_err());
}

#[test]
fn test_add_liquidity_without_pool() {
    let bridge = setup_empty();
    let err = bridge
        .execute(
            &MessageInfo::new(PROVIDER).with_funds(MINT, LIQUIDITY),
            ExecuteMsg::AddLiquidity {
                mint: MINT,
                amount: LIQUIDITY,
            },
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::UnknownPool { .. }));
}

#[test]
fn test_remove_liquidity_without_position() {
    let bridge = setup();
    add_liquidity(&bridge, PROVIDER, LIQUIDITY);

    let err = bridge
        .execute(
            &MessageInfo::new(STRANGER),
            ExecuteMsg::RemoveLiquidity {
                mint: MINT,
                amount: 1,
            },
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::UnknownLiquidityPosition { .. }));
}

// ============================================================================
// LP Fee
// ============================================================================

#[test]
fn test_release_fee_goes_to_providers() {
    let bridge = setup();
    add_liquidity(&bridge, PROVIDER, LIQUIDITY);

    // Liquidity pays the release before any custody is locked
    release_one_token(&bridge);

    let pool = pool(&bridge);
    assert_eq!(pool.balance, LIQUIDITY - 997_000_000);
    assert_eq!(pool.total_earns, 3_000_000);
    assert_eq!(lp(&bridge, PROVIDER).pending_reward, 3_000_000);

    let res = bridge
        .execute(
            &MessageInfo::new(PROVIDER),
            ExecuteMsg::WithdrawLpReward {
                mint: MINT,
                amount: 3_000_000,
            },
        )
        .unwrap();
    assert!(res
        .attributes
        .iter()
        .any(|attr| attr.key == "remaining_reward" && attr.value == "0"));

    let position = lp(&bridge, PROVIDER);
    assert_eq!(position.earns, 3_000_000);
    assert_eq!(position.pending_reward, 0);
}

#[test]
fn test_withdraw_more_than_earned() {
    let bridge = setup();
    add_liquidity(&bridge, PROVIDER, LIQUIDITY);
    release_one_token(&bridge);

    let err = bridge
        .execute(
            &MessageInfo::new(PROVIDER),
            ExecuteMsg::WithdrawLpReward {
                mint: MINT,
                amount: 3_000_001,
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::InsufficientFunds {
            requested: 3_000_001,
            available: 3_000_000
        }
    );
}

#[test]
fn test_remove_liquidity_limited_by_pool_balance() {
    let bridge = setup();
    add_liquidity(&bridge, PROVIDER, LIQUIDITY);
    release_one_token(&bridge);

    let balance = pool(&bridge).balance;
    let err = bridge
        .execute(
            &MessageInfo::new(PROVIDER),
            ExecuteMsg::RemoveLiquidity {
                mint: MINT,
                amount: LIQUIDITY,
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::InsufficientLiquidity {
            requested: LIQUIDITY,
            available: balance
        }
    );

    let removed = 1 << 26;
    bridge
        .execute(
            &MessageInfo::new(PROVIDER),
            ExecuteMsg::RemoveLiquidity {
                mint: MINT,
                amount: removed,
            },
        )
        .unwrap();

    let pool = pool(&bridge);
    assert_eq!(pool.balance, balance - removed);
    assert_eq!(pool.liquidity, LIQUIDITY - removed);
    // The reward earned by the removed part stays with the position
    let position = lp(&bridge, PROVIDER);
    assert_eq!(position.amount, LIQUIDITY - removed);
    assert_eq!(position.pending_reward, 3_000_000);
}

// ============================================================================
// Pool Fee Rate
// ============================================================================

#[test]
fn test_set_pool_fee_rate() {
    let bridge = setup();
    let res = bridge
        .execute(
            &admin(),
            ExecuteMsg::SetPoolFeeRate {
                mint: MINT,
                fee_rate: 10_000,
            },
        )
        .unwrap();
    assert!(res
        .attributes
        .iter()
        .any(|attr| attr.key == "old_fee_rate" && attr.value == "3000"));
    assert_eq!(pool(&bridge).fee_rate, 10_000);
}

#[test]
fn test_set_pool_fee_rate_unauthorized() {
    let bridge = setup();
    let err = bridge
        .execute(
            &MessageInfo::new(STRANGER),
            ExecuteMsg::SetPoolFeeRate {
                mint: MINT,
                fee_rate: 0,
            },
        )
        .unwrap_err();
    assert_eq!(err, BridgeError::Unauthorized { role: "admin" });
    assert_eq!(pool(&bridge).fee_rate, 3_000);
}

#[test]
fn test_set_pool_fee_rate_above_one() {
    let bridge = setup();
    let err = bridge
        .execute(
            &admin(),
            ExecuteMsg::SetPoolFeeRate {
                mint: MINT,
                fee_rate: 1_000_001,
            },
        )
        .unwrap_err();
    assert_eq!(err, BridgeError::InvalidFeeRate { rate: 1_000_001 });
}

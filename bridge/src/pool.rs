//! Custody pools
//!
//! One pool per local mint holds the tokens locked by outgoing proposals
//! until the destination side settles and custody is released. Pools are
//! owned by the bridge authority account.
//!
//! Token movement itself belongs to the host ledger. A caller attaches funds
//! to the call and the pool accepts them only if they match the amounts the
//! operation debits, mint for mint.
//!
//! ## Liquidity Providers
//!
//! Anyone can add liquidity to a pool, which lets releases be paid before
//! custody for them is locked on this side. Every release keeps
//! `fee_rate / 1_000_000` of the amount in the pool as an LP fee. The fee is
//! spread over the provided liquidity through an accumulated ratio:
//!
//! ```text
//! acc_ratio += lp_fee * 2^32 / liquidity
//! reward(lp) = lp.amount * acc_ratio / 2^32 - lp.debt + lp.remaining
//! ```
//!
//! A fee taken while no liquidity is provided stays in the pool unassigned.

use std::collections::BTreeMap;

use bridge_common::Address32;
use cosmwasm_std::{StdResult, Storage, Uint128};
use tracing::debug;

use crate::derivation::AccountHandle;
use crate::error::BridgeError;
use crate::msg::Funds;
use crate::state::{Lp, Pool, LPS, POOLS};

/// LP fee rate of a new pool, in millionths (0.3%)
pub const DEFAULT_POOL_FEE_RATE: u64 = 3_000;

pub const FEE_RATE_DENOMINATOR: u64 = 1_000_000;

const SCALING_FACTOR: u128 = 1 << 32;

// ============================================================================
// Custody
// ============================================================================

/// Create the pool for `mint` if it does not exist yet. Returns whether it
/// was created.
pub fn ensure_pool(
    storage: &mut dyn Storage,
    pool: &AccountHandle,
    mint: &Address32,
    authority: &Address32,
) -> StdResult<bool> {
    if POOLS.has(storage, pool.key()) {
        return Ok(false);
    }

    POOLS.save(
        storage,
        pool.key(),
        &Pool {
            mint: *mint,
            authority: *authority,
            balance: 0,
            total_locked: 0,
            total_released: 0,
            liquidity: 0,
            fee_rate: DEFAULT_POOL_FEE_RATE,
            acc_ratio: Uint128::zero(),
            total_earns: 0,
        },
    )?;
    debug!(mint = %mint, pool = %pool.address, "custody pool created");
    Ok(true)
}

fn load(storage: &dyn Storage, pool: &AccountHandle, mint: &Address32) -> Result<Pool, BridgeError> {
    let record = POOLS
        .may_load(storage, pool.key())?
        .ok_or_else(|| BridgeError::UnknownPool {
            mint: mint.to_string(),
        })?;
    if record.mint != *mint {
        return Err(BridgeError::TokenMintMismatch {
            expected: record.mint.to_string(),
            got: mint.to_string(),
        });
    }
    Ok(record)
}

/// Credit `amount` into custody. Returns the new pool balance.
pub fn lock(
    storage: &mut dyn Storage,
    pool: &AccountHandle,
    mint: &Address32,
    amount: u64,
) -> Result<u64, BridgeError> {
    let mut record = load(storage, pool, mint)?;
    record.balance = record
        .balance
        .checked_add(amount)
        .ok_or(BridgeError::AmountOverflow)?;
    record.total_locked = record.total_locked.saturating_add(amount);
    POOLS.save(storage, pool.key(), &record)?;
    Ok(record.balance)
}

/// Outcome of a custody release
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Release {
    /// Paid out to the recipient
    pub payout: u64,
    /// Kept in the pool for liquidity providers
    pub lp_fee: u64,
    /// Pool balance afterwards
    pub balance: u64,
}

/// Release `amount` from custody, keeping the LP fee in the pool.
pub fn release(
    storage: &mut dyn Storage,
    pool: &AccountHandle,
    mint: &Address32,
    amount: u64,
) -> Result<Release, BridgeError> {
    let mut record = load(storage, pool, mint)?;
    let lp_fee = fee_share(amount, record.fee_rate);
    let payout = amount - lp_fee;
    if payout > record.balance {
        return Err(BridgeError::InsufficientLiquidity {
            requested: payout,
            available: record.balance,
        });
    }

    record.balance -= payout;
    record.total_released = record.total_released.saturating_add(amount);
    distribute_fee(&mut record, lp_fee)?;
    POOLS.save(storage, pool.key(), &record)?;

    Ok(Release {
        payout,
        lp_fee,
        balance: record.balance,
    })
}

/// Custody locked by proposals and not yet released.
pub fn outstanding(
    storage: &dyn Storage,
    pool: &AccountHandle,
    mint: &Address32,
) -> Result<u64, BridgeError> {
    match POOLS.may_load(storage, pool.key())? {
        Some(record) if record.mint == *mint => {
            Ok(record.total_locked.saturating_sub(record.total_released))
        }
        _ => Ok(0),
    }
}

/// Set the LP fee rate in millionths. Returns the previous rate.
pub fn set_fee_rate(
    storage: &mut dyn Storage,
    pool: &AccountHandle,
    mint: &Address32,
    fee_rate: u64,
) -> Result<u64, BridgeError> {
    if fee_rate > FEE_RATE_DENOMINATOR {
        return Err(BridgeError::InvalidFeeRate { rate: fee_rate });
    }

    let mut record = load(storage, pool, mint)?;
    let old_rate = record.fee_rate;
    record.fee_rate = fee_rate;
    POOLS.save(storage, pool.key(), &record)?;
    Ok(old_rate)
}

fn fee_share(amount: u64, fee_rate: u64) -> u64 {
    // fee_rate <= FEE_RATE_DENOMINATOR, so the share never exceeds amount
    (u128::from(amount) * u128::from(fee_rate) / u128::from(FEE_RATE_DENOMINATOR)) as u64
}

fn distribute_fee(record: &mut Pool, lp_fee: u64) -> Result<(), BridgeError> {
    if lp_fee == 0 || record.liquidity == 0 {
        return Ok(());
    }

    let increment = u128::from(lp_fee) * SCALING_FACTOR / u128::from(record.liquidity);
    record.acc_ratio = record
        .acc_ratio
        .checked_add(Uint128::new(increment))
        .map_err(|_| BridgeError::AmountOverflow)?;
    record.total_earns = record.total_earns.saturating_add(lp_fee);
    Ok(())
}

// ============================================================================
// Liquidity Providers
// ============================================================================

/// Accrued share of `acc_ratio` for `amount` of liquidity
fn accrued(amount: u64, acc_ratio: Uint128) -> Result<u64, BridgeError> {
    let scaled = u128::from(amount)
        .checked_mul(acc_ratio.u128())
        .ok_or(BridgeError::AmountOverflow)?;
    u64::try_from(scaled / SCALING_FACTOR).map_err(|_| BridgeError::AmountOverflow)
}

/// Rewards a position can withdraw right now.
pub fn pending_reward(lp: &Lp, pool: &Pool) -> Result<u64, BridgeError> {
    accrued(lp.amount, pool.acc_ratio)?
        .saturating_sub(lp.debt)
        .checked_add(lp.remaining)
        .ok_or(BridgeError::AmountOverflow)
}

fn load_lp(
    storage: &dyn Storage,
    lp: &AccountHandle,
    provider: &Address32,
) -> Result<Lp, BridgeError> {
    LPS.may_load(storage, lp.key())?
        .ok_or_else(|| BridgeError::UnknownLiquidityPosition {
            provider: provider.to_string(),
        })
}

/// Add `amount` of liquidity for `provider`, opening the position if needed.
pub fn add_liquidity(
    storage: &mut dyn Storage,
    pool: &AccountHandle,
    lp: &AccountHandle,
    mint: &Address32,
    provider: &Address32,
    amount: u64,
) -> Result<Lp, BridgeError> {
    if amount == 0 {
        return Err(BridgeError::ZeroAmount);
    }

    let mut record = load(storage, pool, mint)?;
    let mut position = LPS.may_load(storage, lp.key())?.unwrap_or(Lp {
        mint: *mint,
        provider: *provider,
        amount: 0,
        earns: 0,
        debt: 0,
        remaining: 0,
    });

    position.amount = position
        .amount
        .checked_add(amount)
        .ok_or(BridgeError::AmountOverflow)?;
    position.debt = position
        .debt
        .checked_add(accrued(amount, record.acc_ratio)?)
        .ok_or(BridgeError::AmountOverflow)?;

    record.balance = record
        .balance
        .checked_add(amount)
        .ok_or(BridgeError::AmountOverflow)?;
    record.liquidity = record
        .liquidity
        .checked_add(amount)
        .ok_or(BridgeError::AmountOverflow)?;

    POOLS.save(storage, pool.key(), &record)?;
    LPS.save(storage, lp.key(), &position)?;
    Ok(position)
}

/// Take `amount` of principal back out. Rewards earned by the removed part
/// are kept in the position.
pub fn remove_liquidity(
    storage: &mut dyn Storage,
    pool: &AccountHandle,
    lp: &AccountHandle,
    mint: &Address32,
    provider: &Address32,
    amount: u64,
) -> Result<Lp, BridgeError> {
    if amount == 0 {
        return Err(BridgeError::ZeroAmount);
    }

    let mut record = load(storage, pool, mint)?;
    let mut position = load_lp(storage, lp, provider)?;
    if amount > position.amount {
        return Err(BridgeError::InsufficientFunds {
            requested: amount,
            available: position.amount,
        });
    }
    if amount > record.balance {
        return Err(BridgeError::InsufficientLiquidity {
            requested: amount,
            available: record.balance,
        });
    }

    let earned = accrued(amount, record.acc_ratio)?;
    let part_debt = (u128::from(position.debt) * u128::from(amount)
        / u128::from(position.amount)) as u64;
    position.remaining = position
        .remaining
        .checked_add(earned.saturating_sub(part_debt))
        .ok_or(BridgeError::AmountOverflow)?;
    position.debt -= part_debt;
    position.amount -= amount;

    record.balance -= amount;
    record.liquidity = record.liquidity.saturating_sub(amount);

    POOLS.save(storage, pool.key(), &record)?;
    LPS.save(storage, lp.key(), &position)?;
    Ok(position)
}

/// Withdraw `amount` of earned LP fees. Returns the reward left afterwards.
pub fn withdraw_reward(
    storage: &mut dyn Storage,
    pool: &AccountHandle,
    lp: &AccountHandle,
    mint: &Address32,
    provider: &Address32,
    amount: u64,
) -> Result<u64, BridgeError> {
    if amount == 0 {
        return Err(BridgeError::ZeroAmount);
    }

    let mut record = load(storage, pool, mint)?;
    let mut position = load_lp(storage, lp, provider)?;
    let reward = pending_reward(&position, &record)?;
    if amount > reward {
        return Err(BridgeError::InsufficientFunds {
            requested: amount,
            available: reward,
        });
    }
    if amount > record.balance {
        return Err(BridgeError::InsufficientLiquidity {
            requested: amount,
            available: record.balance,
        });
    }

    record.balance -= amount;
    position.earns = position.earns.saturating_add(amount);
    position.debt = accrued(position.amount, record.acc_ratio)?;
    position.remaining = reward - amount;

    POOLS.save(storage, pool.key(), &record)?;
    LPS.save(storage, lp.key(), &position)?;
    Ok(position.remaining)
}

// ============================================================================
// Attached Funds
// ============================================================================

/// Check that the funds attached to a call are exactly `expected`. Entries
/// for the same mint are summed on both sides and zero amounts are ignored.
pub fn verify_attached_funds(
    attached: &[Funds],
    expected: &[(Address32, u64)],
) -> Result<(), BridgeError> {
    let attached = sum_by_mint(attached.iter().map(|f| (f.mint, f.amount)))?;
    let expected = sum_by_mint(expected.iter().copied())?;

    if attached != expected {
        return Err(BridgeError::CustodyTransferFailed {
            reason: format!(
                "attached {} does not match required {}",
                describe(&attached),
                describe(&expected)
            ),
        });
    }
    Ok(())
}

fn sum_by_mint(
    entries: impl Iterator<Item = (Address32, u64)>,
) -> Result<BTreeMap<Address32, u64>, BridgeError> {
    let mut totals = BTreeMap::new();
    for (mint, amount) in entries.filter(|(_, amount)| *amount > 0) {
        let total: &mut u64 = totals.entry(mint).or_default();
        *total = total
            .checked_add(amount)
            .ok_or(BridgeError::CustodyTransferFailed {
                reason: "attached amount overflows".to_string(),
            })?;
    }
    Ok(totals)
}

fn describe(totals: &BTreeMap<Address32, u64>) -> String {
    if totals.is_empty() {
        return "nothing".to_string();
    }
    totals
        .iter()
        .map(|(mint, amount)| format!("{}:{}", mint, amount))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert an amount between decimal precisions, rounding down.
pub fn convert_decimals(
    amount: Uint128,
    from_decimals: u8,
    to_decimals: u8,
) -> Result<u64, BridgeError> {
    let converted = if from_decimals >= to_decimals {
        let factor = pow10(from_decimals - to_decimals)?;
        amount.checked_div(factor).map_err(|_| BridgeError::AmountOverflow)?
    } else {
        let factor = pow10(to_decimals - from_decimals)?;
        amount.checked_mul(factor).map_err(|_| BridgeError::AmountOverflow)?
    };

    u64::try_from(converted.u128()).map_err(|_| BridgeError::AmountOverflow)
}

fn pow10(exponent: u8) -> Result<Uint128, BridgeError> {
    10u128
        .checked_pow(u32::from(exponent))
        .map(Uint128::new)
        .ok_or(BridgeError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::MemoryStorage;

    const MINT: Address32 = Address32::new([5; 32]);
    const NATIVE: Address32 = Address32::new([6; 32]);

    fn pool() -> AccountHandle {
        AccountHandle {
            address: Address32::new([7; 32]),
            bump: 252,
        }
    }

    fn funds(mint: Address32, amount: u64) -> Funds {
        Funds { mint, amount }
    }

    #[test]
    fn test_lock_then_release() {
        let mut storage = MemoryStorage::new();
        assert!(ensure_pool(&mut storage, &pool(), &MINT, &Address32::ZERO).unwrap());
        assert!(!ensure_pool(&mut storage, &pool(), &MINT, &Address32::ZERO).unwrap());

        assert_eq!(lock(&mut storage, &pool(), &MINT, 500).unwrap(), 500);
        // 0.3% of 200 rounds down to nothing
        let released = release(&mut storage, &pool(), &MINT, 200).unwrap();
        assert_eq!(released.payout, 200);
        assert_eq!(released.balance, 300);

        let record = POOLS.load(&storage, pool().key()).unwrap();
        assert_eq!(record.total_locked, 500);
        assert_eq!(record.total_released, 200);
    }

    #[test]
    fn test_release_beyond_balance() {
        let mut storage = MemoryStorage::new();
        ensure_pool(&mut storage, &pool(), &MINT, &Address32::ZERO).unwrap();
        lock(&mut storage, &pool(), &MINT, 10).unwrap();

        assert_eq!(
            release(&mut storage, &pool(), &MINT, 11),
            Err(BridgeError::InsufficientLiquidity {
                requested: 11,
                available: 10
            })
        );
    }

    #[test]
    fn test_lock_into_missing_pool() {
        let mut storage = MemoryStorage::new();
        let err = lock(&mut storage, &pool(), &MINT, 1).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownPool { .. }));
    }

    #[test]
    fn test_attached_funds_must_match_exactly() {
        let expected = [(MINT, 100), (NATIVE, 20)];

        assert!(verify_attached_funds(&[funds(MINT, 100), funds(NATIVE, 20)], &expected).is_ok());
        // Split entries for one mint are summed
        assert!(verify_attached_funds(
            &[funds(NATIVE, 5), funds(MINT, 100), funds(NATIVE, 15)],
            &expected
        )
        .is_ok());

        for attached in [
            vec![funds(MINT, 100)],
            vec![funds(MINT, 99), funds(NATIVE, 20)],
            vec![funds(MINT, 100), funds(NATIVE, 21)],
            vec![funds(MINT, 100), funds(NATIVE, 20), funds(Address32::new([1; 32]), 1)],
        ] {
            let err = verify_attached_funds(&attached, &expected).unwrap_err();
            assert!(matches!(err, BridgeError::CustodyTransferFailed { .. }));
        }
    }

    #[test]
    fn test_native_mint_proposal_sums_amount_and_fee() {
        // Bridging the native token itself: amount and fee share one mint
        let expected = [(NATIVE, 100), (NATIVE, 20)];
        assert!(verify_attached_funds(&[funds(NATIVE, 120)], &expected).is_ok());
    }

    #[test]
    fn test_convert_decimals() {
        // 18-decimal foreign token into a 9-decimal mint
        assert_eq!(
            convert_decimals(Uint128::new(5_000_000_000_000_000_000), 18, 9).unwrap(),
            5_000_000_000
        );
        assert_eq!(convert_decimals(Uint128::new(5), 6, 9).unwrap(), 5_000);
        assert_eq!(convert_decimals(Uint128::new(123), 9, 9).unwrap(), 123);
        assert_eq!(
            convert_decimals(Uint128::MAX, 9, 9),
            Err(BridgeError::AmountOverflow)
        );
    }

    fn lp(byte: u8) -> AccountHandle {
        AccountHandle {
            address: Address32::new([byte; 32]),
            bump: 250,
        }
    }

    fn provider(byte: u8) -> Address32 {
        Address32::new([byte; 32])
    }

    /// Pool at a 1% fee with 1024 and 3072 provided by two LPs
    fn pool_with_providers(storage: &mut MemoryStorage) {
        ensure_pool(storage, &pool(), &MINT, &Address32::ZERO).unwrap();
        set_fee_rate(storage, &pool(), &MINT, 10_000).unwrap();
        add_liquidity(storage, &pool(), &lp(0xa1), &MINT, &provider(0xa1), 1024).unwrap();
        add_liquidity(storage, &pool(), &lp(0xb2), &MINT, &provider(0xb2), 3072).unwrap();
    }

    fn reward(storage: &MemoryStorage, byte: u8) -> u64 {
        let record = POOLS.load(storage, pool().key()).unwrap();
        let position = LPS.load(storage, lp(byte).key()).unwrap();
        pending_reward(&position, &record).unwrap()
    }

    #[test]
    fn test_release_keeps_lp_fee() {
        let mut storage = MemoryStorage::new();
        pool_with_providers(&mut storage);
        lock(&mut storage, &pool(), &MINT, 409_600).unwrap();

        let released = release(&mut storage, &pool(), &MINT, 409_600).unwrap();
        assert_eq!(released.lp_fee, 4_096);
        assert_eq!(released.payout, 405_504);
        assert_eq!(released.balance, 8_192);

        let record = POOLS.load(&storage, pool().key()).unwrap();
        assert_eq!(record.total_earns, 4_096);
        assert_eq!(outstanding(&storage, &pool(), &MINT).unwrap(), 0);
    }

    #[test]
    fn test_lp_fee_split_by_share() {
        let mut storage = MemoryStorage::new();
        pool_with_providers(&mut storage);
        lock(&mut storage, &pool(), &MINT, 409_600).unwrap();
        release(&mut storage, &pool(), &MINT, 409_600).unwrap();

        assert_eq!(reward(&storage, 0xa1), 1_024);
        assert_eq!(reward(&storage, 0xb2), 3_072);

        // A late provider earns nothing from fees taken before it joined
        add_liquidity(&mut storage, &pool(), &lp(0xc3), &MINT, &provider(0xc3), 1_024).unwrap();
        assert_eq!(reward(&storage, 0xc3), 0);
    }

    #[test]
    fn test_withdraw_reward_and_remove_liquidity() {
        let mut storage = MemoryStorage::new();
        pool_with_providers(&mut storage);
        lock(&mut storage, &pool(), &MINT, 409_600).unwrap();
        release(&mut storage, &pool(), &MINT, 409_600).unwrap();

        let left = withdraw_reward(&mut storage, &pool(), &lp(0xa1), &MINT, &provider(0xa1), 1_024)
            .unwrap();
        assert_eq!(left, 0);
        assert_eq!(reward(&storage, 0xa1), 0);

        // Removing principal settles its rewards into the position
        let position =
            remove_liquidity(&mut storage, &pool(), &lp(0xb2), &MINT, &provider(0xb2), 3_072)
                .unwrap();
        assert_eq!(position.amount, 0);
        assert_eq!(position.remaining, 3_072);

        withdraw_reward(&mut storage, &pool(), &lp(0xb2), &MINT, &provider(0xb2), 3_072).unwrap();

        let record = POOLS.load(&storage, pool().key()).unwrap();
        assert_eq!(record.liquidity, 1_024);
        assert_eq!(record.balance, 1_024);
    }

    #[test]
    fn test_withdraw_more_than_reward() {
        let mut storage = MemoryStorage::new();
        pool_with_providers(&mut storage);

        let err = withdraw_reward(&mut storage, &pool(), &lp(0xa1), &MINT, &provider(0xa1), 1)
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::InsufficientFunds {
                requested: 1,
                available: 0
            }
        );
    }

    #[test]
    fn test_remove_more_than_provided() {
        let mut storage = MemoryStorage::new();
        pool_with_providers(&mut storage);

        let err = remove_liquidity(&mut storage, &pool(), &lp(0xa1), &MINT, &provider(0xa1), 1_025)
            .unwrap_err();
        assert!(matches!(err, BridgeError::InsufficientFunds { .. }));

        let err = remove_liquidity(&mut storage, &pool(), &lp(0xdd), &MINT, &provider(0xdd), 1)
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnknownLiquidityPosition { .. }));
    }

    #[test]
    fn test_fee_rate_bounds() {
        let mut storage = MemoryStorage::new();
        ensure_pool(&mut storage, &pool(), &MINT, &Address32::ZERO).unwrap();

        assert_eq!(
            set_fee_rate(&mut storage, &pool(), &MINT, FEE_RATE_DENOMINATOR).unwrap(),
            DEFAULT_POOL_FEE_RATE
        );
        assert_eq!(
            set_fee_rate(&mut storage, &pool(), &MINT, FEE_RATE_DENOMINATOR + 1),
            Err(BridgeError::InvalidFeeRate { rate: 1_000_001 })
        );
    }

    #[test]
    fn test_outstanding_tracks_unreleased_custody() {
        let mut storage = MemoryStorage::new();
        ensure_pool(&mut storage, &pool(), &MINT, &Address32::ZERO).unwrap();
        set_fee_rate(&mut storage, &pool(), &MINT, 0).unwrap();
        lock(&mut storage, &pool(), &MINT, 500).unwrap();
        release(&mut storage, &pool(), &MINT, 200).unwrap();

        assert_eq!(outstanding(&storage, &pool(), &MINT).unwrap(), 300);
    }
}

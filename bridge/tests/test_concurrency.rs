//! Concurrent proposals against one bridge.
//!
//! Every proposal writes the shared fee vault, so proposals run one at a
//! time whatever their destination. Each destination keeps its own nonce
//! account and must receive a gapless, duplicate-free nonce sequence.

mod common;

use std::thread;

use bridge_common::ChainIdentifier;

use common::*;
use token_bridge::msg::{FeeVaultResponse, NonceResponse, PoolResponse, QueryMsg};
use token_bridge::Bridge;

const THREADS: u64 = 8;
const PER_THREAD: u64 = 25;

fn propose_many(bridge: &Bridge, chain: ChainIdentifier, count: u64) -> Vec<u64> {
    let info = funded(bridge, USER, AMOUNT, GAS_FEE);
    (0..count)
        .map(|_| {
            bridge
                .bridge_proposal(&info, request(chain, AMOUNT, GAS_FEE))
                .unwrap()
                .nonce
        })
        .collect()
}

#[test]
fn test_parallel_proposals_get_unique_nonces() {
    let bridge = setup();

    let mut nonces: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| s.spawn(|| propose_many(&bridge, EDS, PER_THREAD)))
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });
    nonces.sort_unstable();

    let total = THREADS * PER_THREAD;
    assert_eq!(nonces, (0..total).collect::<Vec<_>>());

    let nonce: NonceResponse = query(&bridge, QueryMsg::CurrentNonce { chain: EDS });
    assert_eq!(nonce.nonce, total);

    let pool: PoolResponse = query(&bridge, QueryMsg::Pool { mint: MINT });
    assert_eq!(pool.balance, AMOUNT * total);

    let vault: FeeVaultResponse = query(&bridge, QueryMsg::FeeVault {});
    assert_eq!(vault.balance, GAS_FEE * total);
}

#[test]
fn test_destinations_keep_separate_sequences() {
    let bridge = setup();
    register_chain(&bridge, TRON);
    register_token(&bridge, TRON, FOREIGN_TOKEN, MINT);

    let (eds, tron) = thread::scope(|s| {
        let eds = s.spawn(|| propose_many(&bridge, EDS, PER_THREAD));
        let tron = s.spawn(|| propose_many(&bridge, TRON, PER_THREAD));
        (eds.join().unwrap(), tron.join().unwrap())
    });

    // Each thread is the only writer of its destination, so order is preserved
    assert_eq!(eds, (0..PER_THREAD).collect::<Vec<_>>());
    assert_eq!(tron, (0..PER_THREAD).collect::<Vec<_>>());

    let pool: PoolResponse = query(&bridge, QueryMsg::Pool { mint: MINT });
    assert_eq!(pool.balance, AMOUNT * PER_THREAD * 2);
}

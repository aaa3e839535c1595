//! Shared setup for the bridge integration tests.

#![allow(dead_code)]

use bridge_common::{Address32, ChainIdentifier, CHAIN_TYPE_ETHEREUM, CHAIN_TYPE_TRON};
use cosmwasm_std::from_json;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use token_bridge::msg::{ExecuteMsg, InstantiateMsg, MessageInfo, QueryMsg};
use token_bridge::{Bridge, ProposalRequest, Settings};

pub const ADMIN: Address32 = Address32::new([0xad; 32]);
pub const USER: Address32 = Address32::new([0x05; 32]);
pub const STRANGER: Address32 = Address32::new([0x66; 32]);

/// Local mint bridged in most tests
pub const MINT: Address32 = Address32::new([0x11; 32]);

/// Destination chain used by the deployment scripts
pub const EDS: ChainIdentifier = ChainIdentifier::new(CHAIN_TYPE_ETHEREUM, 221);
pub const TRON: ChainIdentifier = ChainIdentifier::new(CHAIN_TYPE_TRON, 728126428);

pub const FOREIGN_TOKEN: Address32 = Address32::new([0xf0; 32]);
pub const EXECUTOR: Address32 = Address32::new([0xe0; 32]);
pub const RECIPIENT: Address32 = Address32::new([0x0c; 32]);

pub const AMOUNT: u64 = 5_000_000_000;
pub const GAS_FEE: u64 = 1_000_000_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn admin() -> MessageInfo {
    MessageInfo::new(ADMIN)
}

/// A bridge that is initialized but has no relations.
pub fn setup_empty() -> Bridge {
    init_tracing();
    let bridge = Bridge::new(&Settings::default()).unwrap();
    let bump = bridge.env().bridge_config.bump;
    bridge
        .instantiate(
            &admin(),
            InstantiateMsg {
                bump,
                super_admin: None,
                bridge_fee: None,
            },
        )
        .unwrap();
    bridge
}

/// A bridge with EDS registered and `FOREIGN_TOKEN` mapped to `MINT`.
pub fn setup() -> Bridge {
    let bridge = setup_empty();
    register_chain(&bridge, EDS);
    register_token(&bridge, EDS, FOREIGN_TOKEN, MINT);
    bridge
}

pub fn register_chain(bridge: &Bridge, chain: ChainIdentifier) {
    bridge
        .execute(
            &admin(),
            ExecuteMsg::SetChainRelation {
                chain,
                executor: Some(EXECUTOR),
                fee_token: None,
                active: None,
            },
        )
        .unwrap();
}

pub fn register_token(
    bridge: &Bridge,
    chain: ChainIdentifier,
    foreign_token: Address32,
    local_mint: Address32,
) {
    bridge
        .execute(
            &admin(),
            ExecuteMsg::SetTokenRelation {
                chain,
                foreign_token,
                foreign_decimals: 18,
                local_mint,
                local_decimals: 9,
            },
        )
        .unwrap();
}

pub fn native_mint(bridge: &Bridge) -> Address32 {
    bridge.env().native_mint
}

/// Caller info with exactly the funds a proposal of `amount` and `fee` needs
pub fn funded(bridge: &Bridge, sender: Address32, amount: u64, fee: u64) -> MessageInfo {
    MessageInfo::new(sender)
        .with_funds(MINT, amount)
        .with_funds(native_mint(bridge), fee)
}

pub fn request(to_chain: ChainIdentifier, amount: u64, gas_fee: u64) -> ProposalRequest {
    ProposalRequest {
        to_chain,
        to_token: FOREIGN_TOKEN,
        to_who: RECIPIENT,
        token_mint: MINT,
        all_amount: amount,
        upload_gas_fee: gas_fee,
    }
}

pub fn query<T: DeserializeOwned>(bridge: &Bridge, msg: QueryMsg) -> T {
    from_json(bridge.query(msg).unwrap()).unwrap()
}

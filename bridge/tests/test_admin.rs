//! Integration tests for initialization, role transfer and fee withdrawal.

mod common;

use common::*;
use token_bridge::msg::{ConfigResponse, ExecuteMsg, FeeVaultResponse, InstantiateMsg, QueryMsg};
use token_bridge::{Bridge, BridgeError, Settings};

fn config(bridge: &Bridge) -> ConfigResponse {
    query(bridge, QueryMsg::Config {})
}

fn vault(bridge: &Bridge) -> FeeVaultResponse {
    query(bridge, QueryMsg::FeeVault {})
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_initialize_sets_roles() {
    let bridge = setup_empty();
    let config = config(&bridge);

    assert_eq!(config.admin, ADMIN);
    assert_eq!(config.super_admin, ADMIN);
    assert_eq!(config.bridge_fee, 0);
    assert_eq!(config.bridge_config, bridge.env().bridge_config);
    assert_eq!(vault(&bridge).balance, 0);
}

#[test]
fn test_initialize_with_separate_super_admin() {
    init_tracing();
    let bridge = Bridge::new(&Settings::default()).unwrap();
    let bump = bridge.env().bridge_config.bump;

    bridge
        .instantiate(
            &admin(),
            InstantiateMsg {
                bump,
                super_admin: Some(STRANGER),
                bridge_fee: Some(42),
            },
        )
        .unwrap();

    let config = config(&bridge);
    assert_eq!(config.admin, ADMIN);
    assert_eq!(config.super_admin, STRANGER);
    assert_eq!(config.bridge_fee, 42);
}

#[test]
fn test_initialize_twice() {
    let bridge = setup_empty();
    let bump = bridge.env().bridge_config.bump;

    let err = bridge
        .instantiate(
            &token_bridge::msg::MessageInfo::new(STRANGER),
            InstantiateMsg {
                bump,
                super_admin: None,
                bridge_fee: None,
            },
        )
        .unwrap_err();
    assert_eq!(err, BridgeError::AlreadyInitialized);
    assert_eq!(config(&bridge).admin, ADMIN);
}

#[test]
fn test_initialize_wrong_bump() {
    init_tracing();
    let bridge = Bridge::new(&Settings::default()).unwrap();
    let bump = bridge.env().bridge_config.bump.wrapping_add(1);

    let err = bridge
        .instantiate(
            &admin(),
            InstantiateMsg {
                bump,
                super_admin: None,
                bridge_fee: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidSeed { .. }));

    // Nothing was written, so a correct retry succeeds
    assert!(bridge.query(QueryMsg::Config {}).is_err());
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
}

#[test]
fn test_admin_call_before_initialize() {
    init_tracing();
    let bridge = Bridge::new(&Settings::default()).unwrap();

    let err = bridge
        .execute(&admin(), ExecuteMsg::ChangeAdmin { new_admin: STRANGER })
        .unwrap_err();
    assert_eq!(err, BridgeError::NotInitialized);
}

#[test]
fn test_new_rejects_shared_program_id() {
    let defaults = Settings::default();
    let settings = Settings {
        message_program_id: defaults.bridge_program_id.clone(),
        ..defaults
    };

    match Bridge::new(&settings) {
        Err(BridgeError::InvalidSettings { reason }) => assert!(reason.contains("must differ")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("bridge built from invalid settings"),
    }
}

#[test]
fn test_new_rejects_malformed_native_mint() {
    let settings = Settings {
        native_mint: "not-base58-0OIl".to_string(),
        ..Settings::default()
    };
    assert!(matches!(
        Bridge::new(&settings),
        Err(BridgeError::InvalidSettings { .. })
    ));
}

// ============================================================================
// Role Transfer
// ============================================================================

#[test]
fn test_change_admin_unauthorized() {
    let bridge = setup_empty();
    let stranger = token_bridge::msg::MessageInfo::new(STRANGER);

    let err = bridge
        .execute(&stranger, ExecuteMsg::ChangeAdmin { new_admin: STRANGER })
        .unwrap_err();
    assert_eq!(err, BridgeError::Unauthorized { role: "admin" });
    assert_eq!(config(&bridge).admin, ADMIN);
}

#[test]
fn test_change_admin_hands_over() {
    let bridge = setup_empty();
    bridge
        .execute(&admin(), ExecuteMsg::ChangeAdmin { new_admin: STRANGER })
        .unwrap();
    assert_eq!(config(&bridge).admin, STRANGER);

    // The previous admin lost its rights
    let err = bridge
        .execute(&admin(), ExecuteMsg::ChangeAdmin { new_admin: ADMIN })
        .unwrap_err();
    assert!(matches!(err, BridgeError::Unauthorized { .. }));

    // The super admin role is independent
    assert_eq!(config(&bridge).super_admin, ADMIN);
}

#[test]
fn test_change_super_admin() {
    let bridge = setup_empty();
    let stranger = token_bridge::msg::MessageInfo::new(STRANGER);

    let err = bridge
        .execute(
            &stranger,
            ExecuteMsg::ChangeSuperAdmin {
                new_super_admin: STRANGER,
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::Unauthorized {
            role: "super admin"
        }
    );

    bridge
        .execute(
            &admin(),
            ExecuteMsg::ChangeSuperAdmin {
                new_super_admin: STRANGER,
            },
        )
        .unwrap();
    assert_eq!(config(&bridge).super_admin, STRANGER);

    // Setting the fee now needs the new super admin
    let err = bridge
        .execute(&admin(), ExecuteMsg::SetBridgeFee { bridge_fee: 1 })
        .unwrap_err();
    assert!(matches!(err, BridgeError::Unauthorized { .. }));
    bridge
        .execute(&stranger, ExecuteMsg::SetBridgeFee { bridge_fee: 1 })
        .unwrap();
    assert_eq!(config(&bridge).bridge_fee, 1);
}

// ============================================================================
// Fee Withdrawal
// ============================================================================

/// Bridge whose fee vault holds two proposals' worth of gas fees
fn setup_with_fees() -> Bridge {
    let bridge = setup();
    let info = funded(&bridge, USER, AMOUNT, GAS_FEE);
    for _ in 0..2 {
        bridge
            .bridge_proposal(&info, request(EDS, AMOUNT, GAS_FEE))
            .unwrap();
    }
    bridge
}

#[test]
fn test_withdraw_fee_debits_vault() {
    let bridge = setup_with_fees();

    let res = bridge
        .execute(&admin(), ExecuteMsg::WithdrawFee { amount: 1_500_000_000 })
        .unwrap();
    assert!(res
        .attributes
        .iter()
        .any(|attr| attr.key == "remaining" && attr.value == "500000000"));

    let vault = vault(&bridge);
    assert_eq!(vault.balance, 500_000_000);
    assert_eq!(vault.total_collected, 2_000_000_000);
    assert_eq!(vault.total_withdrawn, 1_500_000_000);
}

#[test]
fn test_withdraw_fee_over_balance() {
    let bridge = setup_with_fees();

    let err = bridge
        .execute(&admin(), ExecuteMsg::WithdrawFee { amount: 2_000_000_001 })
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::InsufficientFunds {
            requested: 2_000_000_001,
            available: 2_000_000_000
        }
    );
    assert_eq!(vault(&bridge).balance, 2_000_000_000);
}

#[test]
fn test_withdraw_fee_unauthorized() {
    let bridge = setup_with_fees();
    let stranger = token_bridge::msg::MessageInfo::new(STRANGER);

    let err = bridge
        .execute(&stranger, ExecuteMsg::WithdrawFee { amount: 1 })
        .unwrap_err();
    assert!(matches!(err, BridgeError::Unauthorized { .. }));
    assert_eq!(vault(&bridge).balance, 2_000_000_000);
}

#[test]
fn test_withdraw_whole_balance() {
    let bridge = setup_with_fees();

    bridge
        .execute(&admin(), ExecuteMsg::WithdrawFee { amount: 2_000_000_000 })
        .unwrap();
    assert_eq!(vault(&bridge).balance, 0);
}

//! Admin operations handlers.
//!
//! This module handles:
//! - One-time initialization of configs, bridge authority and fee vault
//! - Admin and super admin replacement
//! - Role checks shared by the other handlers

use bridge_common::Address32;
use cosmwasm_std::{Response, Storage};
use tracing::{debug, warn};

use crate::accounts::BridgeEnv;
use crate::derivation::AccountHandle;
use crate::error::BridgeError;
use crate::fee_vault;
use crate::msg::{InstantiateMsg, MessageInfo};
use crate::state::{
    BridgeAuthority, BridgeConfig, CoreConfig, BRIDGE_AUTHORITY, BRIDGE_CONFIG, CONTRACT_NAME,
    CONTRACT_VERSION, CORE_CONFIG,
};

// ============================================================================
// Role Checks
// ============================================================================

pub(crate) fn load_bridge_config(
    storage: &dyn Storage,
    account: &AccountHandle,
) -> Result<BridgeConfig, BridgeError> {
    BRIDGE_CONFIG
        .may_load(storage, account.key())?
        .ok_or(BridgeError::NotInitialized)
}

pub(crate) fn load_core_config(
    storage: &dyn Storage,
    account: &AccountHandle,
) -> Result<CoreConfig, BridgeError> {
    CORE_CONFIG
        .may_load(storage, account.key())?
        .ok_or(BridgeError::NotInitialized)
}

/// Load the bridge config, failing unless `caller` is the admin.
pub(crate) fn ensure_admin(
    storage: &dyn Storage,
    account: &AccountHandle,
    caller: &Address32,
) -> Result<BridgeConfig, BridgeError> {
    let config = load_bridge_config(storage, account)?;
    if *caller != config.admin {
        warn!(caller = %caller, "rejected admin call");
        return Err(BridgeError::Unauthorized { role: "admin" });
    }
    Ok(config)
}

/// Load the core config, failing unless `caller` is the super admin.
pub(crate) fn ensure_super_admin(
    storage: &dyn Storage,
    account: &AccountHandle,
    caller: &Address32,
) -> Result<CoreConfig, BridgeError> {
    let config = load_core_config(storage, account)?;
    if *caller != config.super_admin {
        warn!(caller = %caller, "rejected super admin call");
        return Err(BridgeError::Unauthorized {
            role: "super admin",
        });
    }
    Ok(config)
}

// ============================================================================
// Initialize
// ============================================================================

/// Create both configs, the bridge authority and an empty fee vault. The
/// caller becomes admin.
pub fn execute_initialize(
    storage: &mut dyn Storage,
    env: &BridgeEnv,
    info: &MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, BridgeError> {
    if BRIDGE_CONFIG.has(storage, env.bridge_config.key()) {
        return Err(BridgeError::AlreadyInitialized);
    }
    if msg.bump != env.bridge_config.bump {
        return Err(BridgeError::InvalidSeed {
            reason: format!(
                "config bump {} does not match derived bump {}",
                msg.bump, env.bridge_config.bump
            ),
        });
    }

    let config = BridgeConfig {
        admin: info.sender,
        bump: msg.bump,
    };
    BRIDGE_CONFIG.save(storage, env.bridge_config.key(), &config)?;

    let core = CoreConfig {
        super_admin: msg.super_admin.unwrap_or(info.sender),
        bridge_fee: msg.bridge_fee.unwrap_or(env.default_bridge_fee),
        bump: env.core_config.bump,
    };
    CORE_CONFIG.save(storage, env.core_config.key(), &core)?;

    BRIDGE_AUTHORITY.save(
        storage,
        env.bridge_authority.key(),
        &BridgeAuthority {
            bump: env.bridge_authority.bump,
        },
    )?;
    fee_vault::open(storage, &env.fee_vault)?;
    debug!(admin = %config.admin, super_admin = %core.super_admin, "configs staged");

    Ok(Response::new()
        .add_attribute("method", "initialize")
        .add_attribute("contract_name", CONTRACT_NAME)
        .add_attribute("contract_version", CONTRACT_VERSION)
        .add_attribute("config", env.bridge_config.address.to_string())
        .add_attribute("admin", config.admin.to_string())
        .add_attribute("super_admin", core.super_admin.to_string())
        .add_attribute("bridge_fee", core.bridge_fee.to_string()))
}

// ============================================================================
// Role Transfer
// ============================================================================

/// Replace the admin. Only the current admin may do this.
pub fn execute_change_admin(
    storage: &mut dyn Storage,
    env: &BridgeEnv,
    info: &MessageInfo,
    new_admin: Address32,
) -> Result<Response, BridgeError> {
    let mut config = ensure_admin(storage, &env.bridge_config, &info.sender)?;
    let old_admin = config.admin;

    config.admin = new_admin;
    BRIDGE_CONFIG.save(storage, env.bridge_config.key(), &config)?;

    Ok(Response::new()
        .add_attribute("method", "change_admin")
        .add_attribute("old_admin", old_admin.to_string())
        .add_attribute("new_admin", new_admin.to_string()))
}

/// Replace the super admin. Only the current super admin may do this.
pub fn execute_change_super_admin(
    storage: &mut dyn Storage,
    env: &BridgeEnv,
    info: &MessageInfo,
    new_super_admin: Address32,
) -> Result<Response, BridgeError> {
    let mut config = ensure_super_admin(storage, &env.core_config, &info.sender)?;
    let old_super_admin = config.super_admin;

    config.super_admin = new_super_admin;
    CORE_CONFIG.save(storage, env.core_config.key(), &config)?;

    Ok(Response::new()
        .add_attribute("method", "change_super_admin")
        .add_attribute("old_super_admin", old_super_admin.to_string())
        .add_attribute("new_super_admin", new_super_admin.to_string()))
}

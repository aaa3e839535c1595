//! Accounts touched by each operation
//!
//! Every operation resolves the accounts it needs before it runs, and the
//! ledger locks exactly that set. Singleton accounts are derived once when
//! the bridge starts; per-chain and per-token accounts are derived per call.

use bridge_common::{Address32, ChainIdentifier};

use crate::derivation::{AccountHandle, ProgramIds};
use crate::error::BridgeError;
use crate::ledger::AccessSet;

/// Deployment identity of a running bridge
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeEnv {
    pub programs: ProgramIds,
    pub local_chain: ChainIdentifier,
    /// Mint in which gas and bridge fees are paid
    pub native_mint: Address32,
    pub default_bridge_fee: u64,
    pub bridge_config: AccountHandle,
    pub bridge_authority: AccountHandle,
    pub core_config: AccountHandle,
    pub fee_vault: AccountHandle,
}

impl BridgeEnv {
    pub fn new(
        programs: ProgramIds,
        local_chain: ChainIdentifier,
        native_mint: Address32,
        default_bridge_fee: u64,
    ) -> Result<Self, BridgeError> {
        Ok(Self {
            bridge_config: programs.bridge_config()?,
            bridge_authority: programs.bridge_authority()?,
            core_config: programs.core_config()?,
            fee_vault: programs.fee_vault()?,
            programs,
            local_chain,
            native_mint,
            default_bridge_fee,
        })
    }

    /// Accounts written by `initialize`
    pub fn initialize_access(&self) -> AccessSet {
        AccessSet::new()
            .write(&self.bridge_config)
            .write(&self.bridge_authority)
            .write(&self.core_config)
            .write(&self.fee_vault)
    }

    pub fn bridge_config_access(&self) -> AccessSet {
        AccessSet::new().write(&self.bridge_config)
    }

    pub fn core_config_access(&self) -> AccessSet {
        AccessSet::new().write(&self.core_config)
    }

    pub fn withdraw_fee_access(&self) -> AccessSet {
        AccessSet::new()
            .read(&self.core_config)
            .write(&self.fee_vault)
    }
}

// ============================================================================
// Bridge Proposal
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalAccounts {
    pub bridge_config: AccountHandle,
    pub core_config: AccountHandle,
    pub chain_relation: AccountHandle,
    pub token_relation: AccountHandle,
    pub pool: AccountHandle,
    pub to_chain_nonce: AccountHandle,
    pub fee_vault: AccountHandle,
}

impl ProposalAccounts {
    pub fn resolve(
        env: &BridgeEnv,
        to_chain: &ChainIdentifier,
        to_token: &Address32,
        token_mint: &Address32,
    ) -> Result<Self, BridgeError> {
        Ok(Self {
            bridge_config: env.bridge_config,
            core_config: env.core_config,
            chain_relation: env.programs.chain_relation(to_chain)?,
            token_relation: env.programs.token_relation(to_chain, to_token)?,
            pool: env.programs.pool(token_mint)?,
            to_chain_nonce: env.programs.to_chain_nonce(to_chain)?,
            fee_vault: env.fee_vault,
        })
    }

    /// Config and relations are only read. The pool, nonce and vault are
    /// written.
    pub fn access(&self) -> AccessSet {
        AccessSet::new()
            .read(&self.bridge_config)
            .read(&self.core_config)
            .read(&self.chain_relation)
            .read(&self.token_relation)
            .write(&self.pool)
            .write(&self.to_chain_nonce)
            .write(&self.fee_vault)
    }
}

// ============================================================================
// Relations
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainRelationAccounts {
    pub bridge_config: AccountHandle,
    pub chain_relation: AccountHandle,
}

impl ChainRelationAccounts {
    pub fn resolve(env: &BridgeEnv, chain: &ChainIdentifier) -> Result<Self, BridgeError> {
        Ok(Self {
            bridge_config: env.bridge_config,
            chain_relation: env.programs.chain_relation(chain)?,
        })
    }

    pub fn access(&self) -> AccessSet {
        AccessSet::new()
            .read(&self.bridge_config)
            .write(&self.chain_relation)
    }
}

/// Accounts of a token relation and the custody pool of its local mint.
/// Shared by relation updates, removal and custody release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRelationAccounts {
    pub bridge_config: AccountHandle,
    pub bridge_authority: AccountHandle,
    pub token_relation: AccountHandle,
    pub pool: AccountHandle,
}

impl TokenRelationAccounts {
    pub fn resolve(
        env: &BridgeEnv,
        chain: &ChainIdentifier,
        foreign_token: &Address32,
        local_mint: &Address32,
    ) -> Result<Self, BridgeError> {
        Ok(Self {
            bridge_config: env.bridge_config,
            bridge_authority: env.bridge_authority,
            token_relation: env.programs.token_relation(chain, foreign_token)?,
            pool: env.programs.pool(local_mint)?,
        })
    }

    pub fn set_access(&self) -> AccessSet {
        AccessSet::new()
            .read(&self.bridge_config)
            .read(&self.bridge_authority)
            .write(&self.token_relation)
            .write(&self.pool)
    }

    /// Removal only reads the pool to check for outstanding custody.
    pub fn remove_access(&self) -> AccessSet {
        AccessSet::new()
            .read(&self.bridge_config)
            .write(&self.token_relation)
            .read(&self.pool)
    }

    pub fn release_access(&self) -> AccessSet {
        AccessSet::new()
            .read(&self.bridge_config)
            .read(&self.token_relation)
            .write(&self.pool)
    }
}

// ============================================================================
// Custody Pools
// ============================================================================

/// Accounts for admin changes to a pool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolAccounts {
    pub bridge_config: AccountHandle,
    pub pool: AccountHandle,
}

impl PoolAccounts {
    pub fn resolve(env: &BridgeEnv, mint: &Address32) -> Result<Self, BridgeError> {
        Ok(Self {
            bridge_config: env.bridge_config,
            pool: env.programs.pool(mint)?,
        })
    }

    pub fn access(&self) -> AccessSet {
        AccessSet::new()
            .read(&self.bridge_config)
            .write(&self.pool)
    }
}

/// A provider's position in the pool of one mint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiquidityAccounts {
    pub pool: AccountHandle,
    pub lp: AccountHandle,
}

impl LiquidityAccounts {
    pub fn resolve(
        env: &BridgeEnv,
        mint: &Address32,
        provider: &Address32,
    ) -> Result<Self, BridgeError> {
        let pool = env.programs.pool(mint)?;
        Ok(Self {
            lp: env.programs.lp(&pool, provider)?,
            pool,
        })
    }

    pub fn access(&self) -> AccessSet {
        AccessSet::new().write(&self.pool).write(&self.lp)
    }
}

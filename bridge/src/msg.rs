//! Message types for the token bridge core
//!
//! This module defines all messages for instantiation, execution, and queries,
//! plus the bridge proposal emitted for the relay.

use bridge_common::{
    Address32, ChainIdentifier, MessageBody, MessageHeader, MESSAGE_TYPE_TOKEN_TRANSFER,
};
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Uint128;

use crate::derivation::AccountHandle;
use crate::hash::{compute_proposal_id, encode_message};

// ============================================================================
// Call Context
// ============================================================================

/// Tokens attached to a call
#[cw_serde]
#[derive(Copy, Eq)]
pub struct Funds {
    pub mint: Address32,
    pub amount: u64,
}

/// Caller identity and attached funds of a call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageInfo {
    pub sender: Address32,
    pub funds: Vec<Funds>,
}

impl MessageInfo {
    pub fn new(sender: Address32) -> Self {
        Self {
            sender,
            funds: vec![],
        }
    }

    pub fn with_funds(mut self, mint: Address32, amount: u64) -> Self {
        self.funds.push(Funds { mint, amount });
        self
    }
}

// ============================================================================
// Instantiate
// ============================================================================

/// Instantiate message. The caller becomes admin and, unless another
/// identity is given, super admin.
#[cw_serde]
pub struct InstantiateMsg {
    /// Bump of the bridge config account, must match the derived one
    pub bump: u8,
    pub super_admin: Option<Address32>,
    /// Flat fee per proposal; the configured default when omitted
    pub bridge_fee: Option<u64>,
}

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Outgoing Transfers
    // ========================================================================
    /// Lock tokens for transfer to another chain. Attached funds must be
    /// exactly `all_amount` of `token_mint` plus the gas and bridge fees in
    /// the native mint.
    BridgeProposal {
        to_chain: ChainIdentifier,
        /// Token on the destination chain
        to_token: Address32,
        /// Recipient on the destination chain
        to_who: Address32,
        /// Local mint being bridged
        token_mint: Address32,
        all_amount: u64,
        upload_gas_fee: u64,
    },

    // ========================================================================
    // Relations (admin)
    // ========================================================================
    /// Register a destination chain or update it
    SetChainRelation {
        chain: ChainIdentifier,
        executor: Option<Address32>,
        /// Token the destination charges its execution fee in
        fee_token: Option<Address32>,
        active: Option<bool>,
    },

    /// Map a foreign token to a local mint, creating its custody pool
    SetTokenRelation {
        chain: ChainIdentifier,
        foreign_token: Address32,
        foreign_decimals: u8,
        local_mint: Address32,
        local_decimals: u8,
    },

    /// Unmap a foreign token. Refused while its pool holds locked custody.
    RemoveTokenRelation {
        chain: ChainIdentifier,
        foreign_token: Address32,
        local_mint: Address32,
    },

    // ========================================================================
    // Custody & Fees
    // ========================================================================
    /// Release custody after settlement. `amount` is in foreign units.
    ReleaseCustody {
        chain: ChainIdentifier,
        foreign_token: Address32,
        local_mint: Address32,
        recipient: Address32,
        amount: Uint128,
    },

    /// Withdraw collected fees (super admin)
    WithdrawFee { amount: u64 },

    /// Set the flat per-proposal fee (super admin)
    SetBridgeFee { bridge_fee: u64 },

    // ========================================================================
    // Liquidity
    // ========================================================================
    /// Set the LP fee taken from releases, in millionths (admin)
    SetPoolFeeRate { mint: Address32, fee_rate: u64 },

    /// Provide liquidity. Attached funds must be exactly `amount` of `mint`.
    AddLiquidity { mint: Address32, amount: u64 },

    RemoveLiquidity { mint: Address32, amount: u64 },

    /// Withdraw earned LP fees
    WithdrawLpReward { mint: Address32, amount: u64 },

    // ========================================================================
    // Admin
    // ========================================================================
    ChangeAdmin { new_admin: Address32 },

    ChangeSuperAdmin { new_super_admin: Address32 },
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Admins and fees
    #[returns(ConfigResponse)]
    Config {},

    #[returns(ChainRelationResponse)]
    ChainRelation { chain: ChainIdentifier },

    #[returns(TokenRelationResponse)]
    TokenRelation {
        chain: ChainIdentifier,
        foreign_token: Address32,
    },

    /// Paginated, ordered by relation account address
    #[returns(TokenRelationsResponse)]
    TokenRelations {
        start_after: Option<Address32>,
        limit: Option<u32>,
    },

    #[returns(PoolResponse)]
    Pool { mint: Address32 },

    /// Liquidity position of a provider
    #[returns(LpResponse)]
    Lp { mint: Address32, provider: Address32 },

    /// Next nonce that will be issued for a destination
    #[returns(NonceResponse)]
    CurrentNonce { chain: ChainIdentifier },

    #[returns(FeeVaultResponse)]
    FeeVault {},

    /// Derived accounts for a chain, foreign token and local mint
    #[returns(AccountsResponse)]
    Accounts {
        chain: ChainIdentifier,
        foreign_token: Address32,
        mint: Address32,
    },
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Address32,
    pub super_admin: Address32,
    pub bridge_fee: u64,
    pub local_chain: ChainIdentifier,
    pub native_mint: Address32,
    pub bridge_config: AccountHandle,
    pub core_config: AccountHandle,
}

#[cw_serde]
pub struct ChainRelationResponse {
    pub chain: ChainIdentifier,
    pub executor: Address32,
    pub fee_token: Address32,
    pub active: bool,
    pub account: AccountHandle,
}

#[cw_serde]
pub struct TokenRelationResponse {
    pub chain: ChainIdentifier,
    pub foreign_token: Address32,
    pub foreign_decimals: u8,
    pub local_mint: Address32,
    pub local_decimals: u8,
    pub pool: AccountHandle,
    pub account: Address32,
}

#[cw_serde]
pub struct TokenRelationsResponse {
    pub relations: Vec<TokenRelationResponse>,
}

#[cw_serde]
pub struct PoolResponse {
    pub mint: Address32,
    pub authority: Address32,
    pub balance: u64,
    pub total_locked: u64,
    pub total_released: u64,
    pub liquidity: u64,
    pub fee_rate: u64,
    pub total_earns: u64,
    pub account: AccountHandle,
}

#[cw_serde]
pub struct LpResponse {
    pub mint: Address32,
    pub provider: Address32,
    pub amount: u64,
    pub earns: u64,
    /// Rewards withdrawable now
    pub pending_reward: u64,
    pub account: AccountHandle,
}

#[cw_serde]
pub struct NonceResponse {
    pub nonce: u64,
}

#[cw_serde]
pub struct FeeVaultResponse {
    pub balance: u64,
    pub total_collected: u64,
    pub total_withdrawn: u64,
    pub account: AccountHandle,
}

#[cw_serde]
pub struct AccountsResponse {
    pub bridge_config: AccountHandle,
    pub bridge_authority: AccountHandle,
    pub core_config: AccountHandle,
    pub fee_vault: AccountHandle,
    pub chain_relation: AccountHandle,
    pub token_relation: AccountHandle,
    pub to_chain_nonce: AccountHandle,
    pub pool: AccountHandle,
}

// ============================================================================
// Bridge Proposal
// ============================================================================

/// Outgoing transfer emitted for the relay. Immutable once emitted.
#[cw_serde]
#[derive(Eq)]
pub struct BridgeProposal {
    /// keccak256 of the header and body wire bytes
    pub id: [u8; 32],
    pub nonce: u64,
    pub source_chain: ChainIdentifier,
    /// Program that sent the message
    pub source_program: Address32,
    pub destination_chain: ChainIdentifier,
    pub destination_token: Address32,
    /// Contract on the destination chain that executes the transfer
    pub executor: Address32,
    pub recipient: Address32,
    pub source_token_mint: Address32,
    pub sender: Address32,
    pub amount: u64,
    pub gas_fee: u64,
    pub bridge_fee: u64,
}

impl BridgeProposal {
    pub fn header(&self) -> MessageHeader {
        MessageHeader {
            mtype: MESSAGE_TYPE_TOKEN_TRANSFER,
            nonce: self.nonce,
            from_chain: self.source_chain,
            from_addr: self.source_program,
            to_chain: self.destination_chain,
            to_addr: self.executor,
            upload_gas_fee: u128::from(self.gas_fee),
        }
    }

    /// The body names the source mint; the destination executor maps it
    /// back through its own relation table keyed by the source chain.
    pub fn body(&self) -> MessageBody {
        MessageBody {
            source_token: self.source_token_mint,
            all_amount: u128::from(self.amount),
            from_who: self.sender,
            to_who: self.recipient,
        }
    }

    pub fn to_wire_bytes(&self) -> Vec<u8> {
        encode_message(&self.header(), &self.body())
    }

    /// Fill in `id` from the current contents.
    pub fn seal(mut self) -> Self {
        self.id = compute_proposal_id(&self.header(), &self.body());
        self
    }

    pub fn id_hex(&self) -> String {
        crate::hash::bytes32_to_hex(&self.id)
    }
}

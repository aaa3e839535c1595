//! Token Bridge Core - Outgoing Cross-Chain Transfers
//!
//! Locks tokens on the local chain and emits a bridge proposal that an
//! external relay carries to the destination chain.
//!
//! # Outgoing Flow
//! 1. Admin registers the destination chain and maps the foreign token to a
//!    local mint, which creates the mint's custody pool
//! 2. Sender submits a proposal with the tokens and native fees attached
//! 3. Tokens go into custody, fees into the fee vault, and the destination's
//!    next nonce is taken
//! 4. The relay forwards the proposal's wire bytes to the destination
//! 5. After settlement, admin releases custody, keeping the pool's LP fee
//!    for its liquidity providers
//!
//! # State
//! Every record lives at a program-derived account address. Operations run
//! as all-or-nothing transactions that lock only the accounts they touch.
//! Every proposal writes the fee vault, so proposals serialize with each
//! other. Operations on disjoint accounts, such as chain relation updates,
//! run alongside them.

pub mod accounts;
pub mod contract;
pub mod derivation;
pub mod error;
mod execute;
pub mod fee_vault;
pub mod hash;
pub mod ledger;
pub mod msg;
pub mod nonce;
pub mod pool;
mod query;
pub mod relation;
pub mod settings;
pub mod state;

pub use crate::contract::Bridge;
pub use crate::error::BridgeError;
pub use crate::execute::ProposalRequest;
pub use crate::hash::{compute_proposal_id, keccak256};
pub use crate::settings::Settings;

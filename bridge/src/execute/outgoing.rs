//! Outgoing transfer handler.
//!
//! A bridge proposal locks tokens into the custody pool of their mint,
//! collects the native fees and takes the next nonce of the destination.
//! Every write is staged, so a proposal that fails at any step leaves no
//! trace, its nonce included.

use bridge_common::{Address32, ChainIdentifier};
use cosmwasm_std::{to_json_binary, Response, StdResult, Storage};
use tracing::debug;

use super::admin::{load_bridge_config, load_core_config};
use crate::accounts::{BridgeEnv, ProposalAccounts};
use crate::error::BridgeError;
use crate::fee_vault;
use crate::msg::{BridgeProposal, MessageInfo};
use crate::nonce;
use crate::pool;
use crate::relation;

/// Caller-supplied fields of a proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProposalRequest {
    pub to_chain: ChainIdentifier,
    pub to_token: Address32,
    pub to_who: Address32,
    pub token_mint: Address32,
    pub all_amount: u64,
    pub upload_gas_fee: u64,
}

pub fn execute_bridge_proposal(
    storage: &mut dyn Storage,
    env: &BridgeEnv,
    info: &MessageInfo,
    accounts: &ProposalAccounts,
    request: &ProposalRequest,
) -> Result<BridgeProposal, BridgeError> {
    load_bridge_config(storage, &accounts.bridge_config)?;
    let core = load_core_config(storage, &accounts.core_config)?;

    // Destination must be known and accepting
    let chain_relation =
        relation::active_chain(storage, &accounts.chain_relation, &request.to_chain)?;

    let token_relation = relation::resolve_token(
        storage,
        &accounts.token_relation,
        &request.to_chain,
        &request.to_token,
    )?;
    if token_relation.local_mint != request.token_mint {
        return Err(BridgeError::TokenMintMismatch {
            expected: token_relation.local_mint.to_string(),
            got: request.token_mint.to_string(),
        });
    }

    if request.all_amount == 0 {
        return Err(BridgeError::ZeroAmount);
    }
    let fee = fee_vault::total_fee(&core, request.upload_gas_fee)?;
    request
        .all_amount
        .checked_add(fee)
        .ok_or(BridgeError::AmountOverflow)?;

    pool::verify_attached_funds(
        &info.funds,
        &[
            (request.token_mint, request.all_amount),
            (env.native_mint, fee),
        ],
    )?;
    let pool_balance = pool::lock(
        storage,
        &accounts.pool,
        &request.token_mint,
        request.all_amount,
    )?;
    let vault_balance = fee_vault::credit(storage, &accounts.fee_vault, fee)?;
    debug!(pool_balance, vault_balance, "custody and fees staged");

    let nonce = nonce::next_nonce(storage, &accounts.to_chain_nonce, &request.to_chain)?;

    Ok(BridgeProposal {
        id: [0u8; 32],
        nonce,
        source_chain: env.local_chain,
        source_program: env.programs.bridge,
        destination_chain: request.to_chain,
        destination_token: request.to_token,
        executor: chain_relation.executor,
        recipient: request.to_who,
        source_token_mint: request.token_mint,
        sender: info.sender,
        amount: request.all_amount,
        gas_fee: request.upload_gas_fee,
        bridge_fee: core.bridge_fee,
    }
    .seal())
}

/// Response carrying the proposal as data for the relay.
pub fn proposal_response(proposal: &BridgeProposal) -> StdResult<Response> {
    Ok(Response::new()
        .add_attribute("method", "bridge_proposal")
        .add_attribute("proposal_id", proposal.id_hex())
        .add_attribute("nonce", proposal.nonce.to_string())
        .add_attribute("sender", proposal.sender.to_string())
        .add_attribute("recipient", proposal.recipient.to_hex())
        .add_attribute("dest_chain", proposal.destination_chain.to_string())
        .add_attribute("token_mint", proposal.source_token_mint.to_string())
        .add_attribute("amount", proposal.amount.to_string())
        .add_attribute("gas_fee", proposal.gas_fee.to_string())
        .add_attribute("bridge_fee", proposal.bridge_fee.to_string())
        .set_data(to_json_binary(proposal)?))
}

//! Token Bridge - Entry Points
//!
//! [`Bridge`] owns the account ledger and routes messages to handlers. Each
//! execute message resolves its accounts, then runs its handler as one
//! ledger transaction over exactly those accounts.
//! The implementation is modularized into:
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers

use cosmwasm_std::{to_json_binary, Binary, Response, StdResult};
use tracing::{info, instrument};

use crate::accounts::{
    BridgeEnv, ChainRelationAccounts, LiquidityAccounts, PoolAccounts, ProposalAccounts,
    TokenRelationAccounts,
};
use crate::error::BridgeError;
use crate::execute::{
    execute_add_liquidity, execute_bridge_proposal, execute_change_admin,
    execute_change_super_admin, execute_initialize, execute_release_custody,
    execute_remove_liquidity, execute_remove_token_relation, execute_set_bridge_fee,
    execute_set_chain_relation, execute_set_pool_fee_rate, execute_set_token_relation,
    execute_withdraw_fee, execute_withdraw_lp_reward, proposal_response, ProposalRequest,
};
use crate::ledger::Ledger;
use crate::msg::{BridgeProposal, ExecuteMsg, InstantiateMsg, MessageInfo, QueryMsg};
use crate::query::{
    query_accounts, query_chain_relation, query_config, query_current_nonce, query_fee_vault,
    query_lp, query_pool, query_token_relation, query_token_relations,
};
use crate::relation::ChainRelationUpdate;
use crate::settings::Settings;

pub struct Bridge {
    env: BridgeEnv,
    ledger: Ledger,
}

impl Bridge {
    /// Validate the settings and derive the singleton accounts.
    pub fn new(settings: &Settings) -> Result<Self, BridgeError> {
        settings
            .validate()
            .map_err(|err| BridgeError::InvalidSettings {
                reason: format!("{:#}", err),
            })?;
        let env = BridgeEnv::new(
            settings.program_ids()?,
            settings.local_chain(),
            settings.native_mint()?,
            settings.default_bridge_fee,
        )?;
        Ok(Self::with_env(env))
    }

    pub fn with_env(env: BridgeEnv) -> Self {
        Self {
            env,
            ledger: Ledger::new(),
        }
    }

    pub fn env(&self) -> &BridgeEnv {
        &self.env
    }

    // ========================================================================
    // Instantiate
    // ========================================================================

    #[instrument(skip_all, fields(caller = %info.sender))]
    pub fn instantiate(
        &self,
        info: &MessageInfo,
        msg: InstantiateMsg,
    ) -> Result<Response, BridgeError> {
        let env = &self.env;
        let res = self
            .ledger
            .transact(&env.initialize_access(), |storage| {
                execute_initialize(storage, env, info, msg)
            })?;

        info!(config = %env.bridge_config.address, "bridge initialized");
        Ok(res)
    }

    // ========================================================================
    // Execute
    // ========================================================================

    /// Submit a bridge proposal and return the emitted record.
    #[instrument(skip_all, fields(caller = %info.sender, to_chain = %request.to_chain))]
    pub fn bridge_proposal(
        &self,
        info: &MessageInfo,
        request: ProposalRequest,
    ) -> Result<BridgeProposal, BridgeError> {
        let env = &self.env;
        let accounts =
            ProposalAccounts::resolve(env, &request.to_chain, &request.to_token, &request.token_mint)?;

        let proposal = self.ledger.transact(&accounts.access(), |storage| {
            execute_bridge_proposal(storage, env, info, &accounts, &request)
        })?;

        info!(
            nonce = proposal.nonce,
            amount = proposal.amount,
            id = %proposal.id_hex(),
            "bridge proposal emitted"
        );
        Ok(proposal)
    }

    #[instrument(skip_all, fields(caller = %info.sender))]
    pub fn execute(&self, info: &MessageInfo, msg: ExecuteMsg) -> Result<Response, BridgeError> {
        let env = &self.env;
        let ledger = &self.ledger;

        let res = match msg {
            // Outgoing transfers
            ExecuteMsg::BridgeProposal {
                to_chain,
                to_token,
                to_who,
                token_mint,
                all_amount,
                upload_gas_fee,
            } => {
                let proposal = self.bridge_proposal(
                    info,
                    ProposalRequest {
                        to_chain,
                        to_token,
                        to_who,
                        token_mint,
                        all_amount,
                        upload_gas_fee,
                    },
                )?;
                return Ok(proposal_response(&proposal)?);
            }

            // Relations
            ExecuteMsg::SetChainRelation {
                chain,
                executor,
                fee_token,
                active,
            } => {
                let accounts = ChainRelationAccounts::resolve(env, &chain)?;
                let update = ChainRelationUpdate {
                    executor,
                    fee_token,
                    active,
                };
                ledger.transact(&accounts.access(), |storage| {
                    execute_set_chain_relation(storage, info, &accounts, chain, update)
                })?
            }
            ExecuteMsg::SetTokenRelation {
                chain,
                foreign_token,
                foreign_decimals,
                local_mint,
                local_decimals,
            } => {
                let accounts =
                    TokenRelationAccounts::resolve(env, &chain, &foreign_token, &local_mint)?;
                ledger.transact(&accounts.set_access(), |storage| {
                    execute_set_token_relation(
                        storage,
                        info,
                        &accounts,
                        chain,
                        foreign_token,
                        foreign_decimals,
                        local_mint,
                        local_decimals,
                    )
                })?
            }
            ExecuteMsg::RemoveTokenRelation {
                chain,
                foreign_token,
                local_mint,
            } => {
                let accounts =
                    TokenRelationAccounts::resolve(env, &chain, &foreign_token, &local_mint)?;
                ledger.transact(&accounts.remove_access(), |storage| {
                    execute_remove_token_relation(
                        storage,
                        info,
                        &accounts,
                        chain,
                        foreign_token,
                        local_mint,
                    )
                })?
            }

            // Custody & fees
            ExecuteMsg::ReleaseCustody {
                chain,
                foreign_token,
                local_mint,
                recipient,
                amount,
            } => {
                let accounts =
                    TokenRelationAccounts::resolve(env, &chain, &foreign_token, &local_mint)?;
                ledger.transact(&accounts.release_access(), |storage| {
                    execute_release_custody(
                        storage,
                        info,
                        &accounts,
                        chain,
                        foreign_token,
                        local_mint,
                        recipient,
                        amount,
                    )
                })?
            }
            ExecuteMsg::WithdrawFee { amount } => {
                ledger.transact(&env.withdraw_fee_access(), |storage| {
                    execute_withdraw_fee(storage, env, info, amount)
                })?
            }
            ExecuteMsg::SetBridgeFee { bridge_fee } => {
                ledger.transact(&env.core_config_access(), |storage| {
                    execute_set_bridge_fee(storage, env, info, bridge_fee)
                })?
            }

            // Liquidity
            ExecuteMsg::SetPoolFeeRate { mint, fee_rate } => {
                let accounts = PoolAccounts::resolve(env, &mint)?;
                ledger.transact(&accounts.access(), |storage| {
                    execute_set_pool_fee_rate(storage, info, &accounts, mint, fee_rate)
                })?
            }
            ExecuteMsg::AddLiquidity { mint, amount } => {
                let accounts = LiquidityAccounts::resolve(env, &mint, &info.sender)?;
                ledger.transact(&accounts.access(), |storage| {
                    execute_add_liquidity(storage, info, &accounts, mint, amount)
                })?
            }
            ExecuteMsg::RemoveLiquidity { mint, amount } => {
                let accounts = LiquidityAccounts::resolve(env, &mint, &info.sender)?;
                ledger.transact(&accounts.access(), |storage| {
                    execute_remove_liquidity(storage, info, &accounts, mint, amount)
                })?
            }
            ExecuteMsg::WithdrawLpReward { mint, amount } => {
                let accounts = LiquidityAccounts::resolve(env, &mint, &info.sender)?;
                ledger.transact(&accounts.access(), |storage| {
                    execute_withdraw_lp_reward(storage, info, &accounts, mint, amount)
                })?
            }

            // Admin
            ExecuteMsg::ChangeAdmin { new_admin } => {
                ledger.transact(&env.bridge_config_access(), |storage| {
                    execute_change_admin(storage, env, info, new_admin)
                })?
            }
            ExecuteMsg::ChangeSuperAdmin { new_super_admin } => {
                ledger.transact(&env.core_config_access(), |storage| {
                    execute_change_super_admin(storage, env, info, new_super_admin)
                })?
            }
        };

        info!(method = method_of(&res), "execute committed");
        Ok(res)
    }

    // ========================================================================
    // Query
    // ========================================================================

    pub fn query(&self, msg: QueryMsg) -> StdResult<Binary> {
        let env = &self.env;
        self.ledger.read(|storage| match msg {
            QueryMsg::Config {} => to_json_binary(&query_config(storage, env)?),
            QueryMsg::ChainRelation { chain } => {
                to_json_binary(&query_chain_relation(storage, env, chain)?)
            }
            QueryMsg::TokenRelation {
                chain,
                foreign_token,
            } => to_json_binary(&query_token_relation(storage, env, chain, foreign_token)?),
            QueryMsg::TokenRelations { start_after, limit } => {
                to_json_binary(&query_token_relations(storage, start_after, limit)?)
            }
            QueryMsg::Pool { mint } => to_json_binary(&query_pool(storage, env, mint)?),
            QueryMsg::Lp { mint, provider } => {
                to_json_binary(&query_lp(storage, env, mint, provider)?)
            }
            QueryMsg::CurrentNonce { chain } => {
                to_json_binary(&query_current_nonce(storage, env, chain)?)
            }
            QueryMsg::FeeVault {} => to_json_binary(&query_fee_vault(storage, env)?),
            QueryMsg::Accounts {
                chain,
                foreign_token,
                mint,
            } => to_json_binary(&query_accounts(env, chain, foreign_token, mint)?),
        })
    }
}

fn method_of(res: &Response) -> &str {
    res.attributes
        .iter()
        .find(|attr| attr.key == "method")
        .map(|attr| attr.value.as_str())
        .unwrap_or_default()
}

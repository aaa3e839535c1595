//! Program-derived account addresses
//!
//! Every bridge record lives at an address derived from a list of seeds and
//! the program that owns it. Derivation matches the Solana runtime bit for bit:
//!
//! ```text
//! candidate = sha256(seed_0 || ... || seed_n || bump || program_id || "ProgramDerivedAddress")
//! ```
//!
//! A candidate that decompresses to a point on the ed25519 curve could have a
//! private key, so it is rejected and the next bump (255 counting down) is
//! tried. The first off-curve candidate wins.
//!
//! # Account Namespaces
//!
//! | Account          | Owner   | Seeds                         |
//! |------------------|---------|-------------------------------|
//! | bridge config    | bridge  | `"global"`                    |
//! | bridge authority | bridge  | `"bridge"`                    |
//! | custody pool     | bridge  | `mint, "pool"`                |
//! | liquidity (LP)   | bridge  | `pool, provider, "lp"`        |
//! | chain relation   | bridge  | `chain_key, "chain_relation"` |
//! | token relation   | bridge  | `chain_key, foreign_token`    |
//! | core config      | message | `"global"`                    |
//! | to-chain nonce   | message | `chain_key, "toNonce"`        |
//! | fee vault        | message | `"vaultFee"`                  |

use bridge_common::{Address32, ChainIdentifier};
use cosmwasm_schema::cw_serde;
use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha256};

use crate::error::BridgeError;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length of a single seed
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, the bump included
pub const MAX_SEEDS: usize = 16;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

pub const CONFIG_SEED: &[u8] = b"global";
pub const BRIDGE_AUTHORITY_SEED: &[u8] = b"bridge";
pub const POOL_SEED: &[u8] = b"pool";
pub const LP_SEED: &[u8] = b"lp";
pub const CHAIN_RELATION_SEED: &[u8] = b"chain_relation";
pub const TO_NONCE_SEED: &[u8] = b"toNonce";
pub const FEE_VAULT_SEED: &[u8] = b"vaultFee";

// ============================================================================
// Account Handle
// ============================================================================

/// A derived account address together with the bump that produced it.
#[cw_serde]
#[derive(Copy, Eq, Hash)]
pub struct AccountHandle {
    pub address: Address32,
    pub bump: u8,
}

impl AccountHandle {
    /// Storage key of the record held by this account
    pub fn key(&self) -> &[u8] {
        self.address.as_ref()
    }
}

// ============================================================================
// Derivation Primitives
// ============================================================================

fn validate_seeds(seeds: &[&[u8]], max_seeds: usize) -> Result<(), BridgeError> {
    if seeds.len() > max_seeds {
        return Err(BridgeError::InvalidSeed {
            reason: format!("{} seeds exceed the maximum of {}", seeds.len(), max_seeds),
        });
    }
    if let Some(seed) = seeds.iter().find(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(BridgeError::InvalidSeed {
            reason: format!("seed of {} bytes exceeds {}", seed.len(), MAX_SEED_LEN),
        });
    }
    Ok(())
}

fn is_on_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

/// Hash seeds into a candidate, returning `None` when it lies on the curve.
fn hash_candidate(seeds: &[&[u8]], program_id: &Address32) -> Option<Address32> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();
    if is_on_curve(&hash) {
        None
    } else {
        Some(Address32::new(hash))
    }
}

/// Derive an address from seeds that already include the bump.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Address32,
) -> Result<Address32, BridgeError> {
    validate_seeds(seeds, MAX_SEEDS)?;
    hash_candidate(seeds, program_id).ok_or_else(|| BridgeError::InvalidSeed {
        reason: "derived address lies on the ed25519 curve".to_string(),
    })
}

/// Search bumps from 255 down to 1 for the first off-curve address.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address32,
) -> Result<AccountHandle, BridgeError> {
    validate_seeds(seeds, MAX_SEEDS - 1)?;

    let mut bump_seed = [u8::MAX];
    for _ in 0..u8::MAX {
        let mut with_bump: Vec<&[u8]> = seeds.to_vec();
        with_bump.push(&bump_seed);

        if let Some(address) = hash_candidate(&with_bump, program_id) {
            return Ok(AccountHandle {
                address,
                bump: bump_seed[0],
            });
        }
        bump_seed[0] -= 1;
    }

    Err(BridgeError::DerivationOverflow)
}

/// Derive an account in a tagged namespace. The tag is appended after the
/// variable seeds, so singleton accounts are derived from the tag alone.
pub fn derive(
    owner: &Address32,
    tag: &[u8],
    seeds: &[&[u8]],
) -> Result<AccountHandle, BridgeError> {
    if tag.is_empty() {
        return Err(BridgeError::InvalidSeed {
            reason: "namespace tag must not be empty".to_string(),
        });
    }

    let mut all: Vec<&[u8]> = seeds.to_vec();
    all.push(tag);
    derive_untagged(owner, &all)
}

/// Derive an account from seeds alone. Used by namespaces that carry no tag.
pub fn derive_untagged(owner: &Address32, seeds: &[&[u8]]) -> Result<AccountHandle, BridgeError> {
    if seeds.iter().any(|seed| seed.is_empty()) {
        return Err(BridgeError::InvalidSeed {
            reason: "seeds must not be empty".to_string(),
        });
    }
    find_program_address(seeds, owner)
}

// ============================================================================
// Account Resolver
// ============================================================================

/// Identities of the two programs that own bridge accounts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramIds {
    /// Owns configuration, relations and custody pools
    pub bridge: Address32,
    /// Owns the core config, nonces and the fee vault
    pub message: Address32,
}

impl ProgramIds {
    pub fn bridge_config(&self) -> Result<AccountHandle, BridgeError> {
        derive(&self.bridge, CONFIG_SEED, &[])
    }

    pub fn bridge_authority(&self) -> Result<AccountHandle, BridgeError> {
        derive(&self.bridge, BRIDGE_AUTHORITY_SEED, &[])
    }

    pub fn pool(&self, mint: &Address32) -> Result<AccountHandle, BridgeError> {
        derive(&self.bridge, POOL_SEED, &[mint.as_ref()])
    }

    /// Liquidity position of `provider` in a custody pool
    pub fn lp(
        &self,
        pool: &AccountHandle,
        provider: &Address32,
    ) -> Result<AccountHandle, BridgeError> {
        derive(&self.bridge, LP_SEED, &[pool.address.as_ref(), provider.as_ref()])
    }

    pub fn chain_relation(&self, chain: &ChainIdentifier) -> Result<AccountHandle, BridgeError> {
        derive(&self.bridge, CHAIN_RELATION_SEED, &[&chain.encode()])
    }

    pub fn token_relation(
        &self,
        chain: &ChainIdentifier,
        foreign_token: &Address32,
    ) -> Result<AccountHandle, BridgeError> {
        derive_untagged(&self.bridge, &[&chain.encode(), foreign_token.as_ref()])
    }

    pub fn core_config(&self) -> Result<AccountHandle, BridgeError> {
        derive(&self.message, CONFIG_SEED, &[])
    }

    pub fn to_chain_nonce(&self, chain: &ChainIdentifier) -> Result<AccountHandle, BridgeError> {
        derive(&self.message, TO_NONCE_SEED, &[&chain.encode()])
    }

    pub fn fee_vault(&self) -> Result<AccountHandle, BridgeError> {
        derive(&self.message, FEE_VAULT_SEED, &[])
    }
}

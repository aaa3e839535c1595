//! Deployment settings
//!
//! Settings are read from environment variables, after loading an optional
//! `.env` file. Every field has a default matching the devnet deployment, so
//! only the values that differ need to be set:
//!
//! | Variable             | Default                                        |
//! |----------------------|------------------------------------------------|
//! | `BRIDGE_PROGRAM_ID`  | `DwZPNgo4Qtxw2PcbSVgs16kVzynhBLHMF1iz9Js1efY5` |
//! | `MESSAGE_PROGRAM_ID` | `5Dwsb6syuTtb6LEBw8CdbBdZS4Pfd8jWjiS3nmYRY6KP` |
//! | `NATIVE_MINT`        | `So11111111111111111111111111111111111111112`  |
//! | `LOCAL_CHAIN_TYPE`   | `2` (solana)                                   |
//! | `LOCAL_CHAIN_ID`     | `101`                                          |
//! | `DEFAULT_BRIDGE_FEE` | `0`                                            |

use std::env;
use std::path::Path;

use bridge_common::{Address32, ChainIdentifier, CodecError, CHAIN_TYPE_SOLANA};
use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use tracing::debug;

use crate::derivation::ProgramIds;

fn default_bridge_program_id() -> String {
    "DwZPNgo4Qtxw2PcbSVgs16kVzynhBLHMF1iz9Js1efY5".to_string()
}

fn default_message_program_id() -> String {
    "5Dwsb6syuTtb6LEBw8CdbBdZS4Pfd8jWjiS3nmYRY6KP".to_string()
}

fn default_native_mint() -> String {
    "So11111111111111111111111111111111111111112".to_string()
}

fn default_local_chain_type() -> u8 {
    CHAIN_TYPE_SOLANA
}

fn default_local_chain_id() -> u64 {
    101
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Owner of configs, relations and pools (base58)
    #[serde(default = "default_bridge_program_id")]
    pub bridge_program_id: String,
    /// Owner of the core config, nonces and fee vault (base58)
    #[serde(default = "default_message_program_id")]
    pub message_program_id: String,
    /// Mint in which fees are paid (base58)
    #[serde(default = "default_native_mint")]
    pub native_mint: String,
    #[serde(default = "default_local_chain_type")]
    pub local_chain_type: u8,
    #[serde(default = "default_local_chain_id")]
    pub local_chain_id: u64,
    /// Bridge fee used when initialization does not set one
    #[serde(default)]
    pub default_bridge_fee: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bridge_program_id: default_bridge_program_id(),
            message_program_id: default_message_program_id(),
            native_mint: default_native_mint(),
            local_chain_type: default_local_chain_type(),
            local_chain_id: default_local_chain_id(),
            default_bridge_fee: 0,
        }
    }
}

impl Settings {
    /// Load from `.env` in the working directory if present, then the
    /// environment.
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env")
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
            debug!(path, "loaded env file");
        }
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build settings from a variable lookup, falling back to defaults for
    /// unset variables.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let settings = Self {
            bridge_program_id: var("BRIDGE_PROGRAM_ID").unwrap_or(defaults.bridge_program_id),
            message_program_id: var("MESSAGE_PROGRAM_ID").unwrap_or(defaults.message_program_id),
            native_mint: var("NATIVE_MINT").unwrap_or(defaults.native_mint),
            local_chain_type: match var("LOCAL_CHAIN_TYPE") {
                Some(v) => v.parse().wrap_err("LOCAL_CHAIN_TYPE must be a valid u8")?,
                None => defaults.local_chain_type,
            },
            local_chain_id: match var("LOCAL_CHAIN_ID") {
                Some(v) => v.parse().wrap_err("LOCAL_CHAIN_ID must be a valid u64")?,
                None => defaults.local_chain_id,
            },
            default_bridge_fee: match var("DEFAULT_BRIDGE_FEE") {
                Some(v) => v.parse().wrap_err("DEFAULT_BRIDGE_FEE must be a valid u64")?,
                None => defaults.default_bridge_fee,
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        let programs = self
            .program_ids()
            .wrap_err("program ids must be base58 encoded 32-byte addresses")?;
        if programs.bridge == programs.message {
            return Err(eyre!("bridge and message program ids must differ"));
        }

        self.native_mint()
            .wrap_err("native_mint must be a base58 encoded 32-byte address")?;
        Ok(())
    }

    pub fn program_ids(&self) -> std::result::Result<ProgramIds, CodecError> {
        Ok(ProgramIds {
            bridge: Address32::from_base58(&self.bridge_program_id)?,
            message: Address32::from_base58(&self.message_program_id)?,
        })
    }

    pub fn native_mint(&self) -> std::result::Result<Address32, CodecError> {
        Address32::from_base58(&self.native_mint)
    }

    pub fn local_chain(&self) -> ChainIdentifier {
        ChainIdentifier::new(self.local_chain_type, self.local_chain_id)
    }
}

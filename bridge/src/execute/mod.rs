//! Execute handlers for the token bridge.
//!
//! This module contains all execute message handlers, organized by category:
//! - `outgoing` - Bridge proposals
//! - `config` - Chain relations, token relations, pool and bridge fees
//! - `liquidity` - Liquidity provision and LP rewards
//! - `withdraw` - Fee withdrawal and custody release
//! - `admin` - Initialization and role transfer

mod admin;
mod config;
mod liquidity;
mod outgoing;
mod withdraw;

pub use admin::*;
pub use config::*;
pub use liquidity::*;
pub use outgoing::*;
pub use withdraw::*;

//! Custodial Bank Contract
//!
//! This crate implements a capped custodial ledger holding two asset classes:
//! the platform's native unit and one token held through an external custody
//! contract. Deposits are admitted against a global value cap, withdrawals
//! against a per-call limit, with the token valued through an untrusted price
//! feed that is revalidated on every use.
//!
//! # Modules
//! - `errors`: Error taxonomy for entry points and collaborators
//! - `events`: Records appended by committed operations
//! - `config`: Deployment parameters
//! - `security`: Reentrancy guard and owner access control
//! - `ledger`: Balance table, totals and counters
//! - `oracle`: Price feed adapter and conversion into the common unit
//! - `custody`: External transfer interfaces
//! - `bank`: Entry points, cap enforcement and withdrawal limits
//!
//! # Version
//! v0.1.0

pub mod errors;
pub mod events;
pub mod config;
pub mod security;
pub mod ledger;
pub mod oracle;
pub mod custody;
pub mod bank;

pub use bank::{Bank, CallContext};
pub use config::BankConfig;
pub use errors::{BankError, OracleError, TransferError};

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";

//! Types library for the custodial bank ledger
//!
//! This library provides the shared vocabulary used by the contract layer,
//! keeping identities and amounts consistent between the ledger, its
//! external collaborators, and emitted events.
//!
//! # Version
//! v1.0.0
//!
//! # Modules
//! - `ids`: Account and contract addresses
//! - `asset`: Asset identity (native unit or custody token)
//! - `numeric`: Integer base-unit amounts

// Public modules
pub mod ids;
pub mod asset;
pub mod numeric;

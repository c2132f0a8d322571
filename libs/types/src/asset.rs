//! Asset identity
//!
//! The ledger holds exactly two asset classes: the platform's native unit,
//! held directly by the contract, and one fungible token held through an
//! external custody contract.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::Address;

/// Identity of an asset held by the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "address", rename_all = "snake_case")]
pub enum AssetId {
    /// Platform's built-in value-transfer unit
    Native,
    /// Token held via the custody contract at this address
    Token(Address),
}

impl AssetId {
    pub fn is_native(&self) -> bool {
        matches!(self, AssetId::Native)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Native => write!(f, "native"),
            AssetId::Token(address) => write!(f, "token:{}", address),
        }
    }
}

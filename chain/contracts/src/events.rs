//! Contract events
//!
//! Events are immutable records appended by committed operations.
//! A call that rolls back leaves no event behind.

use bank_types::asset::AssetId;
use bank_types::ids::Address;
use bank_types::numeric::Amount;
use serde::{Deserialize, Serialize};

/// Deposit admitted into the vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSuccess {
    pub account: Address,
    pub asset: AssetId,
    pub amount: Amount,
}

/// Withdrawal debited from the vault and paid out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawSuccess {
    pub account: Address,
    pub asset: AssetId,
    pub amount: Amount,
}

/// Administrative owner changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous_owner: Address,
    pub new_owner: Address,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    DepositSuccess(DepositSuccess),
    WithdrawSuccess(WithdrawSuccess),
    OwnershipTransferred(OwnershipTransferred),
}

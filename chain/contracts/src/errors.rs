//! Contract-specific error types
//!
//! Every entry point reports failure synchronously through `BankError`.
//! A returned error always means the call was rolled back in full.

use bank_types::asset::AssetId;
use bank_types::ids::Address;
use bank_types::numeric::Amount;
use thiserror::Error;

/// Errors surfaced by bank entry points
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankError {
    #[error("Constructor precondition failed: bank cap {bank_cap} is below max single withdraw {max_single_withdraw}")]
    ConstructorPrecondition {
        bank_cap: Amount,
        max_single_withdraw: Amount,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Bank cap reached: {sender} depositing {asset} would bring total to {attempted_total}, cap {cap}")]
    BankCapReached {
        sender: Address,
        asset: AssetId,
        attempted_total: Amount,
        cap: Amount,
    },

    #[error("Withdraw limit exceeded: {sender} requested {requested} of {asset}, limit {limit}")]
    WithdrawLimitExceeded {
        sender: Address,
        asset: AssetId,
        requested: Amount,
        limit: Amount,
    },

    #[error("Insufficient funds for {user} in {asset}: available {available}, requested {requested}")]
    InsufficientFunds {
        user: Address,
        asset: AssetId,
        available: Amount,
        requested: Amount,
    },

    #[error("Transfer of {amount} {asset} to {to} failed: {source}")]
    TransferFailed {
        to: Address,
        asset: AssetId,
        amount: Amount,
        source: TransferError,
    },

    #[error("Oracle response stale: updated at {updated_at}, now {now}, max age {max_age_secs}s")]
    OracleStale {
        updated_at: i64,
        now: i64,
        max_age_secs: i64,
    },

    #[error("Oracle response incoherent: {reason}")]
    OracleIncoherent { reason: String },

    #[error("Reentrancy blocked")]
    ReentrancyBlocked,

    #[error("Unauthorized: {caller}")]
    Unauthorized { caller: Address },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Errors reported by the price feed collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Price sample stale: updated at {updated_at}, now {now}, max age {max_age_secs}s")]
    Stale {
        updated_at: i64,
        now: i64,
        max_age_secs: i64,
    },

    #[error("Price sample incoherent: {reason}")]
    Incoherent { reason: String },

    #[error("Price feed unavailable: {reason}")]
    Unavailable { reason: String },
}

impl From<OracleError> for BankError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Stale {
                updated_at,
                now,
                max_age_secs,
            } => BankError::OracleStale {
                updated_at,
                now,
                max_age_secs,
            },
            OracleError::Incoherent { reason } => BankError::OracleIncoherent { reason },
            OracleError::Unavailable { reason } => BankError::OracleIncoherent {
                reason: format!("feed unavailable: {}", reason),
            },
        }
    }
}

/// Failure reported by an external value transfer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("Recipient rejected transfer: {reason}")]
    Rejected { reason: String },

    #[error("Custody refused transfer: {reason}")]
    CustodyRefused { reason: String },

    #[error("Nested call failed: {0}")]
    Nested(Box<BankError>),
}

impl From<BankError> for TransferError {
    fn from(err: BankError) -> Self {
        TransferError::Nested(Box::new(err))
    }
}

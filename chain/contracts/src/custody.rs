//! External value-transfer collaborators
//!
//! Both traits describe code the bank does not control. Any of their
//! methods may fail, and a native receiver may call back into the bank
//! while a payout is in flight.

use bank_types::ids::Address;
use bank_types::numeric::Amount;

use crate::bank::Bank;
use crate::errors::TransferError;

/// Custody contract of the token asset.
pub trait TokenCustody {
    /// Address of the custody contract; doubles as the token's asset id
    fn address(&self) -> Address;

    /// Pull `amount` from `from` into `to`, spending an allowance `from` granted to `to`.
    fn transfer_from(&mut self, from: Address, to: Address, amount: Amount)
        -> Result<(), TransferError>;

    /// Move `amount` held by `from` to `to`.
    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), TransferError>;
}

/// Account code run when the bank pays native units to a caller.
///
/// The receiver is handed the bank itself, so it can attempt nested calls.
pub trait NativeReceiver {
    fn receive(&mut self, bank: &mut Bank, amount: Amount) -> Result<(), TransferError>;
}

/// Account without code: accepts every payout and never calls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainAccount;

impl NativeReceiver for PlainAccount {
    fn receive(&mut self, _bank: &mut Bank, _amount: Amount) -> Result<(), TransferError> {
        Ok(())
    }
}

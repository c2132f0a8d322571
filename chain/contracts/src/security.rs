//! Shared security primitives for the bank
//!
//! Provides the reentrancy guard wrapped around every state-mutating entry
//! point and the owner-based access checks for privileged reads.

use bank_types::ids::Address;

use crate::errors::BankError;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// An entry point acquires the guard before executing state-changing
/// logic and releases it on every exit path. Any nested acquire fails.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    locked: bool,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self { locked: false }
    }

    /// Acquire the guard, failing with `ReentrancyBlocked` if already held.
    pub fn acquire(&mut self) -> Result<(), BankError> {
        if self.locked {
            return Err(BankError::ReentrancyBlocked);
        }
        self.locked = true;
        Ok(())
    }

    /// Release the guard.
    pub fn release(&mut self) {
        self.locked = false;
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Owner-based access control.
///
/// A single owner may read any account's balance and the operation
/// counters. Any account may read its own balance.
#[derive(Debug, Clone)]
pub struct AccessControl {
    owner: Address,
}

impl AccessControl {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        self.owner == *caller
    }

    /// Fail unless `caller` is the owner.
    pub fn require_owner(&self, caller: &Address) -> Result<(), BankError> {
        if !self.is_owner(caller) {
            return Err(BankError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Fail unless `caller` is `account` itself or the owner.
    pub fn require_self_or_owner(
        &self,
        caller: &Address,
        account: &Address,
    ) -> Result<(), BankError> {
        if caller != account && !self.is_owner(caller) {
            return Err(BankError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`. Returns the previous owner.
    pub fn transfer_owner(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, BankError> {
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(BankError::InvalidConfig {
                reason: "new owner must not be the zero address".to_string(),
            });
        }
        let previous = std::mem::replace(&mut self.owner, new_owner);
        Ok(previous)
    }

    pub fn owner(&self) -> Address {
        self.owner
    }
}

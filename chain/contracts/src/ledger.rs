//! Ledger Core — per-user, per-asset balances and aggregate counters
//!
//! The only place balances, totals and operation counters change. Every
//! mutation is computed with checked arithmetic before anything is written,
//! so a failed call leaves the ledger untouched.

use bank_types::asset::AssetId;
use bank_types::ids::Address;
use bank_types::numeric::{checked_credit, checked_debit, Amount};
use std::collections::HashMap;

use crate::errors::BankError;

/// Balance table plus per-asset totals and lifetime operation counters.
///
/// Invariant: for every asset, `total_of(asset)` equals the sum of all
/// balances held in that asset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    /// Balances: (asset, owner) -> amount
    balances: HashMap<(AssetId, Address), Amount>,
    /// Totals: asset -> sum of balances
    totals: HashMap<AssetId, Amount>,
    deposit_count: u64,
    withdraw_count: u64,
}

/// Saved ledger state touched by one operation on one (user, asset) pair.
///
/// Restoring a checkpoint puts back exactly what was there before,
/// including the absence of an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerCheckpoint {
    user: Address,
    asset: AssetId,
    balance: Option<Amount>,
    total: Option<Amount>,
    deposit_count: u64,
    withdraw_count: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Mutations ─────────────────────────

    /// Credit `amount` of `asset` to `user`. Returns the new balance.
    pub fn record_deposit(
        &mut self,
        user: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<Amount, BankError> {
        let new_balance =
            checked_credit(self.balance_of(&user, &asset), amount).ok_or(BankError::Overflow)?;
        let new_total = checked_credit(self.total_of(&asset), amount).ok_or(BankError::Overflow)?;
        let new_count = self.deposit_count.checked_add(1).ok_or(BankError::Overflow)?;

        self.balances.insert((asset, user), new_balance);
        self.totals.insert(asset, new_total);
        self.deposit_count = new_count;
        Ok(new_balance)
    }

    /// Debit `amount` of `asset` from `user`. Returns the new balance.
    ///
    /// Fails with `InsufficientFunds` when the balance does not cover the
    /// amount; the ledger is not modified in that case.
    pub fn record_withdraw(
        &mut self,
        user: Address,
        asset: AssetId,
        amount: Amount,
    ) -> Result<Amount, BankError> {
        let available = self.balance_of(&user, &asset);
        let new_balance =
            checked_debit(available, amount).ok_or(BankError::InsufficientFunds {
                user,
                asset,
                available,
                requested: amount,
            })?;
        // Totals cover every balance, so this only fails on a broken invariant.
        let new_total = checked_debit(self.total_of(&asset), amount).ok_or(BankError::Overflow)?;
        let new_count = self.withdraw_count.checked_add(1).ok_or(BankError::Overflow)?;

        self.balances.insert((asset, user), new_balance);
        self.totals.insert(asset, new_total);
        self.withdraw_count = new_count;
        Ok(new_balance)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Balance of `user` in `asset`; zero if never deposited.
    pub fn balance_of(&self, user: &Address, asset: &AssetId) -> Amount {
        self.balances.get(&(*asset, *user)).copied().unwrap_or(0)
    }

    /// Sum of all balances in `asset`.
    pub fn total_of(&self, asset: &AssetId) -> Amount {
        self.totals.get(asset).copied().unwrap_or(0)
    }

    pub fn deposit_count(&self) -> u64 {
        self.deposit_count
    }

    pub fn withdraw_count(&self) -> u64 {
        self.withdraw_count
    }

    // ───────────────────────── Rollback ─────────────────────────

    /// Capture the state a single operation on (`user`, `asset`) may touch.
    pub fn checkpoint(&self, user: Address, asset: AssetId) -> LedgerCheckpoint {
        LedgerCheckpoint {
            user,
            asset,
            balance: self.balances.get(&(asset, user)).copied(),
            total: self.totals.get(&asset).copied(),
            deposit_count: self.deposit_count,
            withdraw_count: self.withdraw_count,
        }
    }

    /// Put back the state captured by `checkpoint`.
    pub fn restore(&mut self, checkpoint: LedgerCheckpoint) {
        let key = (checkpoint.asset, checkpoint.user);
        match checkpoint.balance {
            Some(balance) => self.balances.insert(key, balance),
            None => self.balances.remove(&key),
        };
        match checkpoint.total {
            Some(total) => self.totals.insert(checkpoint.asset, total),
            None => self.totals.remove(&checkpoint.asset),
        };
        self.deposit_count = checkpoint.deposit_count;
        self.withdraw_count = checkpoint.withdraw_count;
    }
}

//! Integer amounts in asset base units
//!
//! Balances never go negative and never wrap: every mutation goes through
//! the checked helpers below, which surface overflow/underflow as `None`.

/// Amount in the smallest indivisible unit of an asset
pub type Amount = u128;

/// Add two amounts, `None` on overflow
pub fn checked_credit(balance: Amount, amount: Amount) -> Option<Amount> {
    balance.checked_add(amount)
}

/// Subtract `amount` from `balance`, `None` on underflow
pub fn checked_debit(balance: Amount, amount: Amount) -> Option<Amount> {
    balance.checked_sub(amount)
}

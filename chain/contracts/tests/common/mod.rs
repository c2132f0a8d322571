//! Deterministic collaborators for bank integration tests.
#![allow(dead_code)]

use bank_contracts::custody::{NativeReceiver, TokenCustody};
use bank_contracts::errors::{BankError, OracleError, TransferError};
use bank_contracts::events::ContractEvent;
use bank_contracts::oracle::{PriceFeed, PriceSample};
use bank_contracts::{Bank, BankConfig, CallContext};
use bank_types::ids::Address;
use bank_types::numeric::Amount;
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub const NOW: i64 = 1_700_000_000;
pub const ONE_HOUR: i64 = 3600;

pub fn owner() -> Address {
    Address::repeat_byte(0x01)
}

pub fn alice() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn bob() -> Address {
    Address::repeat_byte(0xb0)
}

pub fn attacker() -> Address {
    Address::repeat_byte(0xee)
}

pub fn bank_address() -> Address {
    Address::repeat_byte(0xba)
}

pub fn token_address() -> Address {
    Address::repeat_byte(0x70)
}

pub fn feed_address() -> Address {
    Address::repeat_byte(0xfe)
}

pub fn ctx(sender: Address) -> CallContext {
    CallContext::new(sender, NOW)
}

// ───────────────────────── Price feed ─────────────────────────

/// Shared handle to steer the feed after it has been moved into the bank.
#[derive(Clone)]
pub struct FeedHandle {
    sample: Rc<RefCell<Result<PriceSample, OracleError>>>,
}

impl FeedHandle {
    pub fn set_rate(&self, rate: Decimal) {
        self.set_sample(rate, NOW);
    }

    pub fn set_sample(&self, rate: Decimal, updated_at: i64) {
        *self.sample.borrow_mut() = Ok(PriceSample {
            round_id: 10,
            answer: rate,
            started_at: updated_at,
            updated_at,
            answered_in_round: 10,
        });
    }

    pub fn set_raw(&self, sample: PriceSample) {
        *self.sample.borrow_mut() = Ok(sample);
    }

    pub fn go_down(&self) {
        *self.sample.borrow_mut() = Err(OracleError::Unavailable {
            reason: "feed paused".to_string(),
        });
    }
}

pub struct MockFeed {
    sample: Rc<RefCell<Result<PriceSample, OracleError>>>,
}

impl MockFeed {
    pub fn new(rate: Decimal) -> (Self, FeedHandle) {
        let handle = FeedHandle {
            sample: Rc::new(RefCell::new(Err(OracleError::Unavailable {
                reason: "unset".to_string(),
            }))),
        };
        handle.set_rate(rate);
        (
            Self {
                sample: handle.sample.clone(),
            },
            handle,
        )
    }
}

impl PriceFeed for MockFeed {
    fn address(&self) -> Address {
        feed_address()
    }

    fn latest_sample(&self) -> Result<PriceSample, OracleError> {
        self.sample.borrow().clone()
    }
}

// ───────────────────────── Token custody ─────────────────────────

#[derive(Default)]
pub struct TokenState {
    pub balances: HashMap<Address, Amount>,
    pub allowances: HashMap<(Address, Address), Amount>,
    pub refuse_all: bool,
}

/// Shared handle onto the token's state.
#[derive(Clone, Default)]
pub struct TokenHandle {
    state: Rc<RefCell<TokenState>>,
}

impl TokenHandle {
    pub fn mint(&self, to: Address, amount: Amount) {
        *self.state.borrow_mut().balances.entry(to).or_insert(0) += amount;
    }

    pub fn approve(&self, holder: Address, spender: Address, amount: Amount) {
        self.state
            .borrow_mut()
            .allowances
            .insert((holder, spender), amount);
    }

    pub fn balance(&self, who: Address) -> Amount {
        self.state.borrow().balances.get(&who).copied().unwrap_or(0)
    }

    pub fn refuse_all(&self, refuse: bool) {
        self.state.borrow_mut().refuse_all = refuse;
    }
}

pub struct MockToken {
    state: Rc<RefCell<TokenState>>,
}

impl MockToken {
    pub fn new() -> (Self, TokenHandle) {
        let handle = TokenHandle::default();
        (
            Self {
                state: handle.state.clone(),
            },
            handle,
        )
    }

    fn move_balance(
        state: &mut TokenState,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let held = state.balances.get(&from).copied().unwrap_or(0);
        if held < amount {
            return Err(TransferError::CustodyRefused {
                reason: format!("{} holds {}, needs {}", from, held, amount),
            });
        }
        state.balances.insert(from, held - amount);
        *state.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }
}

impl TokenCustody for MockToken {
    fn address(&self) -> Address {
        token_address()
    }

    fn transfer_from(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut state = self.state.borrow_mut();
        if state.refuse_all {
            return Err(TransferError::CustodyRefused {
                reason: "token frozen".to_string(),
            });
        }
        let allowance = state.allowances.get(&(from, to)).copied().unwrap_or(0);
        if allowance < amount {
            return Err(TransferError::CustodyRefused {
                reason: format!("allowance {} below {}", allowance, amount),
            });
        }
        Self::move_balance(&mut state, from, to, amount)?;
        state.allowances.insert((from, to), allowance - amount);
        Ok(())
    }

    fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.state.borrow_mut();
        if state.refuse_all {
            return Err(TransferError::CustodyRefused {
                reason: "token frozen".to_string(),
            });
        }
        Self::move_balance(&mut state, from, to, amount)
    }
}

// ───────────────────────── Native receivers ─────────────────────────

/// Receiver that credits an external wallet balance.
#[derive(Default)]
pub struct Wallet {
    pub received: Amount,
}

impl NativeReceiver for Wallet {
    fn receive(&mut self, _bank: &mut Bank, amount: Amount) -> Result<(), TransferError> {
        self.received += amount;
        Ok(())
    }
}

/// Receiver whose code always reverts.
pub struct RevertingReceiver;

impl NativeReceiver for RevertingReceiver {
    fn receive(&mut self, _bank: &mut Bank, _amount: Amount) -> Result<(), TransferError> {
        Err(TransferError::Rejected {
            reason: "receiver reverts".to_string(),
        })
    }
}

/// Receiver that re-enters `withdraw_native` while being paid.
pub struct ReentrantReceiver {
    pub sender: Address,
    pub amount: Amount,
    /// Propagate the nested failure, reverting the outer payout
    pub propagate: bool,
    pub nested_results: Vec<Result<(), BankError>>,
    /// Balance visible to the receiver during the payout
    pub observed_balance: Option<Amount>,
    pub received: Amount,
}

impl ReentrantReceiver {
    pub fn new(sender: Address, amount: Amount, propagate: bool) -> Self {
        Self {
            sender,
            amount,
            propagate,
            nested_results: Vec::new(),
            observed_balance: None,
            received: 0,
        }
    }
}

impl NativeReceiver for ReentrantReceiver {
    fn receive(&mut self, bank: &mut Bank, amount: Amount) -> Result<(), TransferError> {
        let ctx = CallContext::new(self.sender, NOW);
        self.observed_balance = bank
            .my_balance(&ctx, &bank_types::asset::AssetId::Native)
            .ok();

        let nested = bank.withdraw_native(ctx, self.amount, &mut Wallet::default());
        self.nested_results.push(nested.clone());
        if self.propagate {
            nested?;
        }
        self.received += amount;
        Ok(())
    }
}

/// Receiver that tries to sneak in a deposit during the payout.
pub struct DepositingReceiver {
    pub sender: Address,
    pub nested: Option<Result<(), BankError>>,
}

impl NativeReceiver for DepositingReceiver {
    fn receive(&mut self, bank: &mut Bank, _amount: Amount) -> Result<(), TransferError> {
        self.nested = Some(bank.deposit_native(CallContext::new(self.sender, NOW).with_value(1)));
        Ok(())
    }
}

/// Receiver that drains the event log mid-payout and then reverts.
#[derive(Default)]
pub struct DrainingReceiver {
    pub drained: Option<Result<Vec<ContractEvent>, BankError>>,
}

impl NativeReceiver for DrainingReceiver {
    fn receive(&mut self, bank: &mut Bank, _amount: Amount) -> Result<(), TransferError> {
        self.drained = Some(bank.drain_events());
        Err(TransferError::Rejected {
            reason: "receiver reverts after draining".to_string(),
        })
    }
}

// ───────────────────────── Harness ─────────────────────────

pub struct Harness {
    pub bank: Bank,
    pub feed: FeedHandle,
    pub token: TokenHandle,
}

impl Harness {
    pub fn new(bank_cap: Amount, max_single_withdraw: Amount, rate: Decimal) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let (feed, feed_handle) = MockFeed::new(rate);
        let (token, token_handle) = MockToken::new();
        let config = BankConfig::new(
            bank_cap,
            max_single_withdraw,
            owner(),
            token_address(),
            feed_address(),
        );
        let bank = Bank::new(bank_address(), config, Box::new(feed), Box::new(token))
            .expect("valid test config");
        Self {
            bank,
            feed: feed_handle,
            token: token_handle,
        }
    }

    /// Cap 300, limit 100, token at 2 native units.
    pub fn standard() -> Self {
        Self::new(300, 100, Decimal::new(2, 0))
    }

    /// Give `user` tokens and approve the bank to pull them.
    pub fn fund_tokens(&self, user: Address, amount: Amount) {
        self.token.mint(user, amount);
        self.token.approve(user, bank_address(), amount);
    }

    pub fn deposit_native(&mut self, user: Address, amount: Amount) -> Result<(), BankError> {
        self.bank.deposit_native(ctx(user).with_value(amount))
    }

    pub fn withdraw_native(&mut self, user: Address, amount: Amount) -> Result<(), BankError> {
        self.bank.withdraw_native(ctx(user), amount, &mut Wallet::default())
    }

    pub fn native_balance(&self, user: Address) -> Amount {
        self.bank
            .balance_of(&owner(), &user, &bank_types::asset::AssetId::Native)
            .expect("owner may read any balance")
    }

    pub fn token_balance(&self, user: Address) -> Amount {
        self.bank
            .balance_of(&owner(), &user, &self.bank.token_asset())
            .expect("owner may read any balance")
    }

    pub fn counts(&self) -> (u64, u64) {
        (
            self.bank.deposit_count(&owner()).expect("owner"),
            self.bank.withdraw_count(&owner()).expect("owner"),
        )
    }
}

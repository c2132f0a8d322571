//! Bank — guarded entry points over the ledger
//!
//! Every state-changing entry point runs inside the reentrancy guard and
//! follows the same order: validate, mutate the ledger, record the event,
//! then perform the external transfer. A failed transfer restores the
//! ledger checkpoint and drops the event, so the call leaves no trace.
//!
//! Value comparisons use the native unit as the common unit. Native amounts
//! convert at identity; token amounts convert through a rate fetched from
//! the price feed within the same call.

use bank_types::asset::AssetId;
use bank_types::ids::Address;
use bank_types::numeric::Amount;
use tracing::{info, warn};

use crate::config::BankConfig;
use crate::custody::{NativeReceiver, TokenCustody};
use crate::errors::BankError;
use crate::events::{ContractEvent, DepositSuccess, OwnershipTransferred, WithdrawSuccess};
use crate::ledger::{Ledger, LedgerCheckpoint};
use crate::oracle::{OracleAdapter, PriceFeed, Rate};
use crate::security::{AccessControl, ReentrancyGuard};

/// Caller-supplied execution context for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Address making the call
    pub sender: Address,
    /// Native units attached to the call
    pub value: Amount,
    /// Block time, unix seconds
    pub now: i64,
}

impl CallContext {
    pub fn new(sender: Address, now: i64) -> Self {
        Self {
            sender,
            value: 0,
            now,
        }
    }

    /// Attach native value to the call.
    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }
}

/// Capped custodial bank holding the native asset and one token.
pub struct Bank {
    address: Address,
    config: BankConfig,
    ledger: Ledger,
    oracle: OracleAdapter,
    token: Box<dyn TokenCustody>,
    reentrancy_guard: ReentrancyGuard,
    access_control: AccessControl,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl Bank {
    /// Deploy a bank at `address`.
    ///
    /// Fails with `ConstructorPrecondition` if the cap is below the single
    /// withdrawal limit, and with `InvalidConfig` if the supplied feed or
    /// custody contract is not the one named in `config`.
    pub fn new(
        address: Address,
        config: BankConfig,
        price_feed: Box<dyn PriceFeed>,
        token: Box<dyn TokenCustody>,
    ) -> Result<Self, BankError> {
        config.validate()?;

        if price_feed.address() != config.price_feed {
            return Err(BankError::InvalidConfig {
                reason: format!(
                    "price feed at {} does not match configured {}",
                    price_feed.address(),
                    config.price_feed
                ),
            });
        }
        if token.address() != config.token {
            return Err(BankError::InvalidConfig {
                reason: format!(
                    "token custody at {} does not match configured {}",
                    token.address(),
                    config.token
                ),
            });
        }

        info!(
            bank = %address,
            bank_cap = %config.bank_cap,
            max_single_withdraw = %config.max_single_withdraw,
            owner = %config.owner,
            token = %config.token,
            "Bank deployed"
        );

        Ok(Self {
            address,
            ledger: Ledger::new(),
            oracle: OracleAdapter::new(price_feed, config.max_oracle_age_secs),
            token,
            reentrancy_guard: ReentrancyGuard::new(),
            access_control: AccessControl::new(config.owner),
            events: Vec::new(),
            config,
        })
    }

    // ───────────────────────── Deposits ─────────────────────────

    /// Deposit the native value attached to the call.
    pub fn deposit_native(&mut self, ctx: CallContext) -> Result<(), BankError> {
        self.guarded("deposit_native", ctx.sender, |bank| {
            let amount = ctx.value;
            if amount == 0 {
                return Err(BankError::InvalidAmount);
            }
            let asset = AssetId::Native;
            let rate = bank.rate_for(&asset, ctx.now)?;
            bank.enforce_cap(ctx.sender, asset, amount, rate.as_ref())?;

            bank.ledger.record_deposit(ctx.sender, asset, amount)?;
            bank.emit(ContractEvent::DepositSuccess(DepositSuccess {
                account: ctx.sender,
                asset,
                amount,
            }));
            info!(account = %ctx.sender, %asset, amount = %amount, "Deposit accepted");
            Ok(())
        })
    }

    /// Pull `amount` of the token from the caller into custody.
    pub fn deposit_token(&mut self, ctx: CallContext, amount: Amount) -> Result<(), BankError> {
        self.guarded("deposit_token", ctx.sender, |bank| {
            Self::reject_attached_value(&ctx)?;
            if amount == 0 {
                return Err(BankError::InvalidAmount);
            }
            let asset = bank.token_asset();
            let rate = bank.rate_for(&asset, ctx.now)?;
            bank.enforce_cap(ctx.sender, asset, amount, rate.as_ref())?;

            let (checkpoint, events_len) = bank.begin(ctx.sender, asset);
            bank.ledger.record_deposit(ctx.sender, asset, amount)?;
            bank.emit(ContractEvent::DepositSuccess(DepositSuccess {
                account: ctx.sender,
                asset,
                amount,
            }));

            let bank_address = bank.address;
            if let Err(source) = bank.token.transfer_from(ctx.sender, bank_address, amount) {
                bank.rollback(checkpoint, events_len);
                return Err(BankError::TransferFailed {
                    to: bank_address,
                    asset,
                    amount,
                    source,
                });
            }
            info!(account = %ctx.sender, %asset, amount = %amount, "Deposit accepted");
            Ok(())
        })
    }

    // ───────────────────────── Withdrawals ─────────────────────────

    /// Withdraw `amount` native units, paid to the caller through `receiver`.
    ///
    /// The receiver runs after the ledger is debited and while the guard is
    /// still held; if it fails, the debit is undone.
    pub fn withdraw_native(
        &mut self,
        ctx: CallContext,
        amount: Amount,
        receiver: &mut dyn NativeReceiver,
    ) -> Result<(), BankError> {
        self.guarded("withdraw_native", ctx.sender, move |bank| {
            Self::reject_attached_value(&ctx)?;
            if amount == 0 {
                return Err(BankError::InvalidAmount);
            }
            let asset = AssetId::Native;
            bank.enforce_limit(ctx.sender, asset, amount, None)?;

            let (checkpoint, events_len) = bank.begin(ctx.sender, asset);
            bank.ledger.record_withdraw(ctx.sender, asset, amount)?;
            bank.emit(ContractEvent::WithdrawSuccess(WithdrawSuccess {
                account: ctx.sender,
                asset,
                amount,
            }));

            if let Err(source) = receiver.receive(bank, amount) {
                bank.rollback(checkpoint, events_len);
                return Err(BankError::TransferFailed {
                    to: ctx.sender,
                    asset,
                    amount,
                    source,
                });
            }
            info!(account = %ctx.sender, %asset, amount = %amount, "Withdrawal paid");
            Ok(())
        })
    }

    /// Withdraw `amount` of the token from custody to the caller.
    pub fn withdraw_token(&mut self, ctx: CallContext, amount: Amount) -> Result<(), BankError> {
        self.guarded("withdraw_token", ctx.sender, |bank| {
            Self::reject_attached_value(&ctx)?;
            if amount == 0 {
                return Err(BankError::InvalidAmount);
            }
            let asset = bank.token_asset();
            let rate = bank.rate_for(&asset, ctx.now)?;
            bank.enforce_limit(ctx.sender, asset, amount, rate.as_ref())?;

            let (checkpoint, events_len) = bank.begin(ctx.sender, asset);
            bank.ledger.record_withdraw(ctx.sender, asset, amount)?;
            bank.emit(ContractEvent::WithdrawSuccess(WithdrawSuccess {
                account: ctx.sender,
                asset,
                amount,
            }));

            let bank_address = bank.address;
            if let Err(source) = bank.token.transfer(bank_address, ctx.sender, amount) {
                bank.rollback(checkpoint, events_len);
                return Err(BankError::TransferFailed {
                    to: ctx.sender,
                    asset,
                    amount,
                    source,
                });
            }
            info!(account = %ctx.sender, %asset, amount = %amount, "Withdrawal paid");
            Ok(())
        })
    }

    // ───────────────────────── Administration ─────────────────────────

    /// Hand the owner role to `new_owner`. Owner-only.
    pub fn transfer_ownership(
        &mut self,
        ctx: CallContext,
        new_owner: Address,
    ) -> Result<(), BankError> {
        self.guarded("transfer_ownership", ctx.sender, |bank| {
            Self::reject_attached_value(&ctx)?;
            let previous_owner = bank.access_control.transfer_owner(&ctx.sender, new_owner)?;
            bank.emit(ContractEvent::OwnershipTransferred(OwnershipTransferred {
                previous_owner,
                new_owner,
            }));
            info!(previous = %previous_owner, new = %new_owner, "Ownership transferred");
            Ok(())
        })
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Balance of `user` in `asset`. Readable by `user` or the owner.
    pub fn balance_of(
        &self,
        caller: &Address,
        user: &Address,
        asset: &AssetId,
    ) -> Result<Amount, BankError> {
        self.access_control.require_self_or_owner(caller, user)?;
        Ok(self.ledger.balance_of(user, asset))
    }

    /// Caller's own balance in `asset`.
    pub fn my_balance(&self, ctx: &CallContext, asset: &AssetId) -> Result<Amount, BankError> {
        self.balance_of(&ctx.sender, &ctx.sender, asset)
    }

    /// Number of committed deposits. Owner-only.
    pub fn deposit_count(&self, caller: &Address) -> Result<u64, BankError> {
        self.access_control.require_owner(caller)?;
        Ok(self.ledger.deposit_count())
    }

    /// Number of committed withdrawals. Owner-only.
    pub fn withdraw_count(&self, caller: &Address) -> Result<u64, BankError> {
        self.access_control.require_owner(caller)?;
        Ok(self.ledger.withdraw_count())
    }

    pub fn total_native(&self) -> Amount {
        self.ledger.total_of(&AssetId::Native)
    }

    pub fn total_token(&self) -> Amount {
        self.ledger.total_of(&self.token_asset())
    }

    /// Aggregate holdings in the common unit at the current oracle rate.
    ///
    /// The feed is only consulted while token holdings are non-zero.
    pub fn total_common_value(&self, now: i64) -> Result<Amount, BankError> {
        let rate = self.rate_for(&AssetId::Native, now)?;
        self.holdings_value(rate.as_ref())
    }

    pub fn token_asset(&self) -> AssetId {
        AssetId::Token(self.config.token)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.access_control.owner()
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    /// Whether a guarded call is currently executing.
    pub fn is_locked(&self) -> bool {
        self.reentrancy_guard.is_locked()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    ///
    /// Not available while a guarded call is executing, since its events
    /// may still be rolled back.
    pub fn drain_events(&mut self) -> Result<Vec<ContractEvent>, BankError> {
        if self.reentrancy_guard.is_locked() {
            return Err(BankError::ReentrancyBlocked);
        }
        Ok(std::mem::take(&mut self.events))
    }

    // ───────────────────────── Cap & Limit ─────────────────────────

    /// Reject a deposit that would push holdings past the cap.
    fn enforce_cap(
        &self,
        sender: Address,
        asset: AssetId,
        amount: Amount,
        rate: Option<&Rate>,
    ) -> Result<(), BankError> {
        let incoming = self.value_in_common(&asset, amount, rate)?;
        let attempted_total = self
            .holdings_value(rate)?
            .checked_add(incoming)
            .ok_or(BankError::Overflow)?;

        if attempted_total > self.config.bank_cap {
            return Err(BankError::BankCapReached {
                sender,
                asset,
                attempted_total,
                cap: self.config.bank_cap,
            });
        }
        Ok(())
    }

    /// Reject a withdrawal worth more than the single-call limit.
    fn enforce_limit(
        &self,
        sender: Address,
        asset: AssetId,
        amount: Amount,
        rate: Option<&Rate>,
    ) -> Result<(), BankError> {
        let requested = self.value_in_common(&asset, amount, rate)?;
        if requested > self.config.max_single_withdraw {
            return Err(BankError::WithdrawLimitExceeded {
                sender,
                asset,
                requested,
                limit: self.config.max_single_withdraw,
            });
        }
        Ok(())
    }

    /// Fresh rate if valuing `asset` against current holdings needs one.
    fn rate_for(&self, asset: &AssetId, now: i64) -> Result<Option<Rate>, BankError> {
        if asset.is_native() && self.total_token() == 0 {
            return Ok(None);
        }
        self.oracle.current_rate(now).map(Some)
    }

    fn value_in_common(
        &self,
        asset: &AssetId,
        amount: Amount,
        rate: Option<&Rate>,
    ) -> Result<Amount, BankError> {
        match (asset, rate) {
            (AssetId::Native, _) => Ok(amount),
            (AssetId::Token(_), Some(rate)) => rate.to_common(amount),
            (AssetId::Token(_), None) if amount == 0 => Ok(0),
            (AssetId::Token(_), None) => Err(BankError::OracleIncoherent {
                reason: "no rate available to value token holdings".to_string(),
            }),
        }
    }

    fn holdings_value(&self, rate: Option<&Rate>) -> Result<Amount, BankError> {
        let token_value = self.value_in_common(&self.token_asset(), self.total_token(), rate)?;
        self.total_native()
            .checked_add(token_value)
            .ok_or(BankError::Overflow)
    }

    // ───────────────────────── Internal Guards ─────────────────────────

    /// Run `body` with the reentrancy guard held, releasing it on every path.
    fn guarded<T>(
        &mut self,
        name: &'static str,
        sender: Address,
        body: impl FnOnce(&mut Self) -> Result<T, BankError>,
    ) -> Result<T, BankError> {
        if let Err(err) = self.reentrancy_guard.acquire() {
            warn!(op = name, caller = %sender, "Nested call blocked");
            return Err(err);
        }
        let result = body(self);
        self.reentrancy_guard.release();

        if let Err(err) = &result {
            warn!(op = name, caller = %sender, error = %err, "Call rejected");
        }
        result
    }

    fn reject_attached_value(ctx: &CallContext) -> Result<(), BankError> {
        if ctx.value != 0 {
            return Err(BankError::InvalidAmount);
        }
        Ok(())
    }

    fn begin(&self, user: Address, asset: AssetId) -> (LedgerCheckpoint, usize) {
        (self.ledger.checkpoint(user, asset), self.events.len())
    }

    fn rollback(&mut self, checkpoint: LedgerCheckpoint, events_len: usize) {
        self.ledger.restore(checkpoint);
        self.events.truncate(events_len);
    }

    fn emit(&mut self, event: ContractEvent) {
        self.events.push(event);
    }
}

impl std::fmt::Debug for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bank")
            .field("address", &self.address)
            .field("config", &self.config)
            .field("ledger", &self.ledger)
            .field("oracle", &self.oracle)
            .field("token", &self.token.address())
            .field("locked", &self.reentrancy_guard.is_locked())
            .field("events", &self.events.len())
            .finish()
    }
}

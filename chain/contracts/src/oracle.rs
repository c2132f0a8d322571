//! Price Oracle Adapter
//!
//! Wraps an untrusted external price feed quoting the token asset in native
//! units. Every call fetches a fresh sample and revalidates it; rates are
//! never cached across calls.

use bank_types::ids::Address;
use bank_types::numeric::Amount;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{BankError, OracleError};

/// Raw round data reported by a price feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    pub round_id: u64,
    /// Native units per token unit
    pub answer: Decimal,
    pub started_at: i64,
    /// Unix seconds when the answer was last updated
    pub updated_at: i64,
    pub answered_in_round: u64,
}

/// External read-only price source.
pub trait PriceFeed {
    /// Address the feed is deployed at
    fn address(&self) -> Address;

    /// Most recent round reported by the feed
    fn latest_sample(&self) -> Result<PriceSample, OracleError>;
}

/// A validated conversion rate, usable only within the call that fetched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    value: Decimal,
    observed_at: i64,
}

impl Rate {
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn observed_at(&self) -> i64 {
        self.observed_at
    }

    /// Convert a token amount into native units, rounding up.
    ///
    /// Decimal arithmetic carries a 96-bit mantissa, so an amount or a
    /// product above `Decimal::MAX` (about 7.9e28) fails with `Overflow`
    /// rather than being compared against the cap or limit.
    pub fn to_common(&self, amount: Amount) -> Result<Amount, BankError> {
        let amount = Decimal::from_u128(amount).ok_or(BankError::Overflow)?;
        amount
            .checked_mul(self.value)
            .map(|value| value.ceil())
            .and_then(|value| value.to_u128())
            .ok_or(BankError::Overflow)
    }
}

/// Check a raw sample against coherence and staleness rules.
pub fn validate_sample(
    sample: &PriceSample,
    now: i64,
    max_age_secs: i64,
) -> Result<Rate, OracleError> {
    if sample.answer <= Decimal::ZERO {
        return Err(OracleError::Incoherent {
            reason: format!("non-positive answer {}", sample.answer),
        });
    }
    if sample.updated_at <= 0 {
        return Err(OracleError::Incoherent {
            reason: "round never updated".to_string(),
        });
    }
    if sample.updated_at > now {
        return Err(OracleError::Incoherent {
            reason: format!("updated_at {} is in the future (now {})", sample.updated_at, now),
        });
    }
    if sample.answered_in_round < sample.round_id {
        return Err(OracleError::Incoherent {
            reason: format!(
                "answer carried over from round {} into round {}",
                sample.answered_in_round, sample.round_id
            ),
        });
    }
    if now - sample.updated_at > max_age_secs {
        return Err(OracleError::Stale {
            updated_at: sample.updated_at,
            now,
            max_age_secs,
        });
    }
    Ok(Rate {
        value: sample.answer,
        observed_at: sample.updated_at,
    })
}

/// Adapter owning the feed handle and the staleness threshold.
pub struct OracleAdapter {
    feed: Box<dyn PriceFeed>,
    max_age_secs: i64,
}

impl OracleAdapter {
    pub fn new(feed: Box<dyn PriceFeed>, max_age_secs: i64) -> Self {
        Self { feed, max_age_secs }
    }

    /// Fetch and validate a fresh rate.
    pub fn current_rate(&self, now: i64) -> Result<Rate, BankError> {
        let sample = self.feed.latest_sample()?;
        debug!(
            round_id = sample.round_id,
            answer = %sample.answer,
            updated_at = sample.updated_at,
            "Price sample fetched"
        );
        validate_sample(&sample, now, self.max_age_secs).map_err(|err| {
            warn!(error = %err, feed = %self.feed.address(), "Price sample rejected");
            BankError::from(err)
        })
    }
}

impl std::fmt::Debug for OracleAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleAdapter")
            .field("feed", &self.feed.address())
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

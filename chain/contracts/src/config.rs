//! Deployment configuration
//!
//! All fields are fixed at construction. Only the owner may later change,
//! through the bank's ownership transfer entry point.

use bank_types::ids::Address;
use bank_types::numeric::Amount;
use serde::{Deserialize, Serialize};

use crate::errors::BankError;

/// Default maximum age of an oracle sample, in seconds (one hour)
pub const DEFAULT_MAX_ORACLE_AGE_SECS: i64 = 3600;

fn default_max_oracle_age_secs() -> i64 {
    DEFAULT_MAX_ORACLE_AGE_SECS
}

/// Bank deployment parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    /// Maximum aggregate value held, in native (common) units
    pub bank_cap: Amount,
    /// Maximum value of a single withdrawal, in native units
    pub max_single_withdraw: Amount,
    /// Administrative address
    pub owner: Address,
    /// Custody contract of the token asset
    pub token: Address,
    /// Price feed quoting the token in native units
    pub price_feed: Address,
    /// Staleness threshold for price samples
    #[serde(default = "default_max_oracle_age_secs")]
    pub max_oracle_age_secs: i64,
}

impl BankConfig {
    /// Create a config with the default oracle staleness threshold.
    pub fn new(
        bank_cap: Amount,
        max_single_withdraw: Amount,
        owner: Address,
        token: Address,
        price_feed: Address,
    ) -> Self {
        Self {
            bank_cap,
            max_single_withdraw,
            owner,
            token,
            price_feed,
            max_oracle_age_secs: DEFAULT_MAX_ORACLE_AGE_SECS,
        }
    }

    /// Parse and validate a JSON deployment document.
    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let config: BankConfig =
            serde_json::from_str(json).map_err(|e| BankError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check construction preconditions.
    pub fn validate(&self) -> Result<(), BankError> {
        if self.bank_cap < self.max_single_withdraw {
            return Err(BankError::ConstructorPrecondition {
                bank_cap: self.bank_cap,
                max_single_withdraw: self.max_single_withdraw,
            });
        }
        if self.max_oracle_age_secs <= 0 {
            return Err(BankError::InvalidConfig {
                reason: format!(
                    "max_oracle_age_secs must be positive, got {}",
                    self.max_oracle_age_secs
                ),
            });
        }
        Ok(())
    }
}

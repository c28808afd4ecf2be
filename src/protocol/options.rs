//! Purpose: Protocol-level defaults and the shared argument checks of every request.
//! Exports: `TransactionOptions`, `QueryOptions`, `KeySource`, default constants, limits.
//! Role: Factories fill these in when callers omit them.
//! Invariants: Validation runs in constructors, so a built request is always well formed.
use std::time::Duration;

use crate::config::Operator;
use crate::core::amount::Hbar;
use crate::core::error::{ApiResult, Error};
use crate::core::key::PublicKey;

pub const DEFAULT_MAX_TRANSACTION_FEE: Hbar = Hbar::new(10);
pub const DEFAULT_VALID_DURATION: Duration = Duration::from_secs(120);
pub const MAX_VALID_DURATION: Duration = Duration::from_secs(180);
pub const DEFAULT_MAX_QUERY_PAYMENT: Hbar = Hbar::new(1);

pub const MAX_MEMO_BYTES: usize = 100;
pub const MAX_TOKEN_NAME_BYTES: usize = 100;
pub const MAX_TOKEN_SYMBOL_BYTES: usize = 100;
pub const MAX_TOPIC_MESSAGE_BYTES: usize = 1024;
pub const MAX_FILE_CREATE_BYTES: usize = 2048;
pub const MAX_FILE_APPEND_BYTES: usize = 4096;
pub const MAX_NFT_METADATA_BYTES: usize = 100;

/// Fee ceiling, validity window and transaction memo of one write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionOptions {
    max_fee: Hbar,
    valid_duration: Duration,
    memo: Option<String>,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_fee: DEFAULT_MAX_TRANSACTION_FEE,
            valid_duration: DEFAULT_VALID_DURATION,
            memo: None,
        }
    }
}

impl TransactionOptions {
    pub fn new(max_fee: Hbar, valid_duration: Duration, memo: Option<String>) -> ApiResult<Self> {
        if max_fee.is_negative() || max_fee == Hbar::ZERO {
            return Err(Error::invalid_argument(format!(
                "max fee must be positive, got {max_fee}"
            )));
        }
        if valid_duration.is_zero() || valid_duration > MAX_VALID_DURATION {
            return Err(Error::invalid_argument(format!(
                "valid duration must be between 1s and {}s",
                MAX_VALID_DURATION.as_secs()
            )));
        }
        if let Some(memo) = &memo {
            check_memo(memo, "transaction memo")?;
        }
        Ok(Self {
            max_fee,
            valid_duration,
            memo,
        })
    }

    pub fn with_max_fee(self, max_fee: Hbar) -> ApiResult<Self> {
        Self::new(max_fee, self.valid_duration, self.memo)
    }

    pub fn with_valid_duration(self, valid_duration: Duration) -> ApiResult<Self> {
        Self::new(self.max_fee, valid_duration, self.memo)
    }

    pub fn with_memo(self, memo: impl Into<String>) -> ApiResult<Self> {
        Self::new(self.max_fee, self.valid_duration, Some(memo.into()))
    }

    pub fn max_fee(&self) -> Hbar {
        self.max_fee
    }

    pub fn valid_duration(&self) -> Duration {
        self.valid_duration
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }
}

/// Payment ceiling for paid queries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QueryOptions {
    max_payment: Hbar,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_payment: DEFAULT_MAX_QUERY_PAYMENT,
        }
    }
}

impl QueryOptions {
    pub fn new(max_payment: Hbar) -> ApiResult<Self> {
        if max_payment.is_negative() {
            return Err(Error::invalid_argument(format!(
                "max query payment must not be negative, got {max_payment}"
            )));
        }
        Ok(Self { max_payment })
    }

    pub fn max_payment(&self) -> Hbar {
        self.max_payment
    }
}

/// Where a request's key comes from when it is executed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum KeySource {
    #[default]
    None,
    /// The executing client's operator public key.
    Operator,
    Key(PublicKey),
}

impl KeySource {
    pub fn resolve(&self, operator: &Operator) -> Option<PublicKey> {
        match self {
            KeySource::None => None,
            KeySource::Operator => Some(operator.public_key.clone()),
            KeySource::Key(key) => Some(key.clone()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, KeySource::None)
    }
}

impl From<PublicKey> for KeySource {
    fn from(key: PublicKey) -> Self {
        KeySource::Key(key)
    }
}

impl From<Option<PublicKey>> for KeySource {
    fn from(key: Option<PublicKey>) -> Self {
        key.map_or(KeySource::None, KeySource::Key)
    }
}

pub(crate) fn check_memo(memo: &str, label: &str) -> ApiResult<()> {
    check_max_len(memo.len(), MAX_MEMO_BYTES, label)
}

pub(crate) fn check_max_len(len: usize, max: usize, label: &str) -> ApiResult<()> {
    if len > max {
        return Err(Error::invalid_argument(format!(
            "{label} is {len} bytes, limit is {max}"
        )));
    }
    Ok(())
}

pub(crate) fn check_not_empty(len: usize, label: &str) -> ApiResult<()> {
    if len == 0 {
        return Err(Error::invalid_argument(format!("{label} must not be empty")));
    }
    Ok(())
}

pub(crate) fn check_positive(value: i64, label: &str) -> ApiResult<()> {
    if value <= 0 {
        return Err(Error::invalid_argument(format!(
            "{label} must be positive, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn check_non_negative(amount: Hbar, label: &str) -> ApiResult<()> {
    if amount.is_negative() {
        return Err(Error::invalid_argument(format!(
            "{label} must not be negative, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn defaults_match_protocol_defaults() {
        let options = TransactionOptions::default();
        assert_eq!(options.max_fee(), Hbar::new(10));
        assert_eq!(options.valid_duration(), Duration::from_secs(120));
        assert_eq!(options.memo(), None);
        assert_eq!(QueryOptions::default().max_payment(), Hbar::new(1));
    }

    #[test]
    fn overrides_are_validated() {
        let err = TransactionOptions::default()
            .with_valid_duration(Duration::from_secs(600))
            .expect_err("too long");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = TransactionOptions::default()
            .with_memo("m".repeat(101))
            .expect_err("memo");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let options = TransactionOptions::default()
            .with_max_fee(Hbar::new(2))
            .expect("fee");
        assert_eq!(options.max_fee(), Hbar::new(2));
        assert_eq!(options.valid_duration(), DEFAULT_VALID_DURATION);
    }
}

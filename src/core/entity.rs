//! Purpose: Ledger identifiers and consensus timestamps.
//! Exports: `EntityId`, typed ids (`AccountId`, `TokenId`, `TopicId`, `ContractId`, `FileId`),
//! `TransactionId`, `parse_timestamp`, `format_timestamp`.
//! Role: Shared by domain values, mirror paths and protocol requests.
//! Invariants: Entity ids render as `shard.realm.num`; parse failures are invalid-argument errors.
//! Invariants: Timestamps round-trip through `seconds.nanos` with nanosecond precision.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::core::error::{ApiResult, Error};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntityId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    fn parse(input: &str, label: &str) -> ApiResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_argument(format!("{label} must not be empty")));
        }
        let mut parts = trimmed.split('.');
        let mut next = || -> ApiResult<u64> {
            let part = parts.next().ok_or_else(|| {
                Error::invalid_argument(format!("{label} '{trimmed}' is not in shard.realm.num form"))
            })?;
            part.parse::<u64>().map_err(|err| {
                Error::invalid_argument(format!("{label} '{trimmed}' has a non-numeric component"))
                    .with_source(err)
            })
        };
        let id = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(Error::invalid_argument(format!(
                "{label} '{trimmed}' has too many components"
            )));
        }
        Ok(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(EntityId);

        impl $name {
            pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
                Self(EntityId::new(shard, realm, num))
            }

            pub const fn from_num(num: u64) -> Self {
                Self::new(0, 0, num)
            }

            pub fn entity(&self) -> EntityId {
                self.0
            }

            pub fn num(&self) -> u64 {
                self.0.num
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                EntityId::parse(input, $label).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(AccountId, "account id");
entity_id!(TokenId, "token id");
entity_id!(TopicId, "topic id");
entity_id!(ContractId, "contract id");
entity_id!(FileId, "file id");

/// Identifies one transaction: the paying account plus the start of its validity window.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TransactionId {
    pub account_id: AccountId,
    pub valid_start: OffsetDateTime,
}

impl TransactionId {
    pub fn new(account_id: AccountId, valid_start: OffsetDateTime) -> Self {
        Self {
            account_id,
            valid_start,
        }
    }

    /// Mirror node form, `0.0.2-1700000000-000000001`.
    pub fn to_mirror_string(&self) -> String {
        format!(
            "{}-{}-{:09}",
            self.account_id,
            self.valid_start.unix_timestamp(),
            self.valid_start.nanosecond()
        )
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.account_id,
            format_timestamp(self.valid_start)
        )
    }
}

impl FromStr for TransactionId {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (account, seconds, nanos) = if let Some((account, start)) = trimmed.split_once('@') {
            let (seconds, nanos) = start.split_once('.').unwrap_or((start, "0"));
            (account, seconds, nanos)
        } else {
            let mut parts = trimmed.splitn(3, '-');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(account), Some(seconds), Some(nanos)) => (account, seconds, nanos),
                _ => {
                    return Err(Error::invalid_argument(format!(
                        "transaction id '{trimmed}' is malformed"
                    )));
                }
            }
        };
        let account_id = account.parse::<AccountId>()?;
        let valid_start = timestamp_from_parts(seconds, nanos).map_err(|err| {
            Error::invalid_argument(format!("transaction id '{trimmed}' has a bad valid start"))
                .with_source(err)
        })?;
        Ok(Self::new(account_id, valid_start))
    }
}

/// Parses a consensus timestamp in `seconds.nanos` form.
pub fn parse_timestamp(input: &str) -> ApiResult<OffsetDateTime> {
    let trimmed = input.trim();
    let (seconds, nanos) = trimmed.split_once('.').unwrap_or((trimmed, "0"));
    timestamp_from_parts(seconds, nanos)
}

pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    format!("{}.{:09}", timestamp.unix_timestamp(), timestamp.nanosecond())
}

fn timestamp_from_parts(seconds: &str, nanos: &str) -> ApiResult<OffsetDateTime> {
    let seconds = seconds.parse::<i64>().map_err(|err| {
        Error::invalid_argument(format!("timestamp seconds '{seconds}' are not numeric"))
            .with_source(err)
    })?;
    if nanos.is_empty() || nanos.len() > 9 || !nanos.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_argument(format!(
            "timestamp nanos '{nanos}' must be 1 to 9 digits"
        )));
    }
    // "5" after the dot means half a second, so pad on the right.
    let padded = format!("{nanos:0<9}");
    let nanos = padded.parse::<i128>().map_err(|err| {
        Error::invalid_argument("timestamp nanos are not numeric").with_source(err)
    })?;
    let total = i128::from(seconds) * 1_000_000_000 + nanos;
    OffsetDateTime::from_unix_timestamp_nanos(total).map_err(|err| {
        Error::invalid_argument("timestamp is out of range").with_source(err)
    })
}

#[cfg(test)]
mod tests {
    use super::{AccountId, TopicId, TransactionId, format_timestamp, parse_timestamp};
    use crate::core::error::ErrorKind;

    #[test]
    fn entity_id_parses_and_renders() {
        let id: AccountId = "0.0.100".parse().expect("id");
        assert_eq!(id, AccountId::from_num(100));
        assert_eq!(id.to_string(), "0.0.100");
    }

    #[test]
    fn entity_id_rejects_bad_forms() {
        for input in ["", "0.0", "0.0.x", "0.0.1.2", "-1.0.0"] {
            let err = input.parse::<TopicId>().expect_err(input);
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{input}");
        }
    }

    #[test]
    fn transaction_id_accepts_both_forms() {
        let protocol: TransactionId = "0.0.2@1700000000.000000001".parse().expect("protocol");
        let mirror: TransactionId = "0.0.2-1700000000-000000001".parse().expect("mirror");
        assert_eq!(protocol, mirror);
        assert_eq!(protocol.to_string(), "0.0.2@1700000000.000000001");
        assert_eq!(mirror.to_mirror_string(), "0.0.2-1700000000-000000001");
    }

    #[test]
    fn timestamp_pads_short_fraction() {
        let ts = parse_timestamp("1700000000.5").expect("ts");
        assert_eq!(ts.nanosecond(), 500_000_000);
        assert_eq!(format_timestamp(ts), "1700000000.500000000");
    }

    #[test]
    fn timestamp_without_fraction_is_whole_seconds() {
        let ts = parse_timestamp("42").expect("ts");
        assert_eq!(ts.unix_timestamp(), 42);
        assert_eq!(ts.nanosecond(), 0);
    }
}

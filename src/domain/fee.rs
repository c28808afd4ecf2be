//! Purpose: Custom fee descriptions attached to tokens.
//! Exports: `FixedFee`, `FractionalFee`, `RoyaltyFee`, `CustomFee`.
//! Role: Validated leaf values composed into `TokenInfo`.
//! Invariants: Amounts, numerators and denominators are never negative.
//! Invariants: Construction is the only way to obtain a fee; fields are read through accessors.
use time::OffsetDateTime;

use crate::core::entity::{AccountId, TokenId};
use crate::core::error::{ApiResult, Error};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FixedFee {
    amount: i64,
    collector_account_id: Option<AccountId>,
    denominating_token_id: Option<TokenId>,
    all_collectors_are_exempt: bool,
}

impl FixedFee {
    pub fn new(
        amount: i64,
        collector_account_id: Option<AccountId>,
        denominating_token_id: Option<TokenId>,
        all_collectors_are_exempt: bool,
    ) -> ApiResult<Self> {
        ensure_non_negative("fixed fee amount", amount)?;
        Ok(Self {
            amount,
            collector_account_id,
            denominating_token_id,
            all_collectors_are_exempt,
        })
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn collector_account_id(&self) -> Option<AccountId> {
        self.collector_account_id
    }

    /// `None` means the fee is charged in hbar.
    pub fn denominating_token_id(&self) -> Option<TokenId> {
        self.denominating_token_id
    }

    pub fn all_collectors_are_exempt(&self) -> bool {
        self.all_collectors_are_exempt
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FractionalFee {
    numerator: i64,
    denominator: i64,
    minimum: i64,
    maximum: Option<i64>,
    net_of_transfers: bool,
    collector_account_id: Option<AccountId>,
    denominating_token_id: Option<TokenId>,
    all_collectors_are_exempt: bool,
}

impl FractionalFee {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        numerator: i64,
        denominator: i64,
        minimum: i64,
        maximum: Option<i64>,
        net_of_transfers: bool,
        collector_account_id: Option<AccountId>,
        denominating_token_id: Option<TokenId>,
        all_collectors_are_exempt: bool,
    ) -> ApiResult<Self> {
        ensure_non_negative("fractional fee numerator", numerator)?;
        ensure_non_negative("fractional fee denominator", denominator)?;
        ensure_non_negative("fractional fee minimum", minimum)?;
        if let Some(maximum) = maximum {
            ensure_non_negative("fractional fee maximum", maximum)?;
            if maximum != 0 && maximum < minimum {
                return Err(Error::invalid_argument(
                    "fractional fee maximum must not be below the minimum",
                ));
            }
        }
        Ok(Self {
            numerator,
            denominator,
            minimum,
            maximum,
            net_of_transfers,
            collector_account_id,
            denominating_token_id,
            all_collectors_are_exempt,
        })
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn minimum(&self) -> i64 {
        self.minimum
    }

    pub fn maximum(&self) -> Option<i64> {
        self.maximum
    }

    pub fn net_of_transfers(&self) -> bool {
        self.net_of_transfers
    }

    pub fn collector_account_id(&self) -> Option<AccountId> {
        self.collector_account_id
    }

    pub fn denominating_token_id(&self) -> Option<TokenId> {
        self.denominating_token_id
    }

    pub fn all_collectors_are_exempt(&self) -> bool {
        self.all_collectors_are_exempt
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoyaltyFee {
    numerator: i64,
    denominator: i64,
    fallback_fee: Option<FixedFee>,
    collector_account_id: Option<AccountId>,
    all_collectors_are_exempt: bool,
}

impl RoyaltyFee {
    pub fn new(
        numerator: i64,
        denominator: i64,
        fallback_fee: Option<FixedFee>,
        collector_account_id: Option<AccountId>,
        all_collectors_are_exempt: bool,
    ) -> ApiResult<Self> {
        ensure_non_negative("royalty fee numerator", numerator)?;
        ensure_non_negative("royalty fee denominator", denominator)?;
        Ok(Self {
            numerator,
            denominator,
            fallback_fee,
            collector_account_id,
            all_collectors_are_exempt,
        })
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn fallback_fee(&self) -> Option<&FixedFee> {
        self.fallback_fee.as_ref()
    }

    pub fn collector_account_id(&self) -> Option<AccountId> {
        self.collector_account_id
    }

    pub fn all_collectors_are_exempt(&self) -> bool {
        self.all_collectors_are_exempt
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CustomFee {
    pub fixed_fees: Vec<FixedFee>,
    pub fractional_fees: Vec<FractionalFee>,
    pub royalty_fees: Vec<RoyaltyFee>,
    pub created_timestamp: Option<OffsetDateTime>,
}

impl CustomFee {
    pub fn is_empty(&self) -> bool {
        self.fixed_fees.is_empty() && self.fractional_fees.is_empty() && self.royalty_fees.is_empty()
    }
}

fn ensure_non_negative(label: &str, value: i64) -> ApiResult<()> {
    if value < 0 {
        return Err(Error::invalid_argument(format!(
            "{label} must not be negative (got {value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FixedFee, FractionalFee, RoyaltyFee};
    use crate::core::entity::AccountId;
    use crate::core::error::ErrorKind;

    #[test]
    fn negative_numerator_or_denominator_is_rejected() {
        let err = FractionalFee::new(-1, 10, 0, None, false, None, None, false).expect_err("num");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = FractionalFee::new(1, -10, 0, None, false, None, None, false).expect_err("den");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = RoyaltyFee::new(1, -2, None, None, false).expect_err("royalty");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = RoyaltyFee::new(-1, 2, None, None, false).expect_err("royalty");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn maximum_below_minimum_is_rejected() {
        let err = FractionalFee::new(1, 10, 5, Some(2), false, None, None, false).expect_err("max");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn royalty_keeps_fallback() {
        let fallback = FixedFee::new(25, Some(AccountId::from_num(98)), None, false).expect("fixed");
        let fee = RoyaltyFee::new(1, 20, Some(fallback.clone()), None, true).expect("royalty");
        assert_eq!(fee.fallback_fee(), Some(&fallback));
        assert!(fee.all_collectors_are_exempt());
    }
}

//! Purpose: Token, balance and NFT values read from the mirror node.
//! Exports: `TokenType`, `SupplyType`, `Token`, `TokenInfo`, `Balance`, `Nft`.
//! Role: Leaf values; `TokenInfo` composes the token's `CustomFee`.
//! Invariants: Supplies and balances are raw integer units; `decimals` says how to scale them.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use time::OffsetDateTime;

use crate::core::entity::{AccountId, TokenId};
use crate::core::error::{ApiResult, Error};
use crate::core::key::PublicKey;
use crate::domain::fee::CustomFee;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TokenType {
    FungibleCommon,
    NonFungibleUnique,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::FungibleCommon => "FUNGIBLE_COMMON",
            TokenType::NonFungibleUnique => "NON_FUNGIBLE_UNIQUE",
        }
    }
}

impl FromStr for TokenType {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "FUNGIBLE_COMMON" => Ok(TokenType::FungibleCommon),
            "NON_FUNGIBLE_UNIQUE" => Ok(TokenType::NonFungibleUnique),
            other => Err(Error::invalid_argument(format!("unknown token type '{other}'"))),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SupplyType {
    Infinite,
    Finite,
}

impl FromStr for SupplyType {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "INFINITE" => Ok(SupplyType::Infinite),
            "FINITE" => Ok(SupplyType::Finite),
            other => Err(Error::invalid_argument(format!("unknown supply type '{other}'"))),
        }
    }
}

/// Summary row from token listings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub token_id: TokenId,
    pub token_type: TokenType,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub admin_key: Option<PublicKey>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenInfo {
    pub token_id: TokenId,
    pub token_type: TokenType,
    pub name: String,
    pub symbol: String,
    pub memo: String,
    pub decimals: u32,
    pub initial_supply: i64,
    pub total_supply: i64,
    pub max_supply: i64,
    pub supply_type: SupplyType,
    pub treasury_account_id: AccountId,
    pub auto_renew_account: Option<AccountId>,
    pub auto_renew_period: Option<Duration>,
    pub deleted: bool,
    pub freeze_default: bool,
    pub paused: bool,
    pub admin_key: Option<PublicKey>,
    pub supply_key: Option<PublicKey>,
    pub kyc_key: Option<PublicKey>,
    pub freeze_key: Option<PublicKey>,
    pub wipe_key: Option<PublicKey>,
    pub fee_schedule_key: Option<PublicKey>,
    pub pause_key: Option<PublicKey>,
    pub custom_fees: CustomFee,
    pub created_timestamp: Option<OffsetDateTime>,
    pub modified_timestamp: Option<OffsetDateTime>,
    pub expiry_timestamp: Option<OffsetDateTime>,
}

/// One account's holding of one token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Balance {
    account_id: AccountId,
    balance: i64,
    decimals: u32,
}

impl Balance {
    pub fn new(account_id: AccountId, balance: i64, decimals: u32) -> ApiResult<Self> {
        if balance < 0 {
            return Err(Error::invalid_argument(format!(
                "balance for {account_id} must not be negative"
            )));
        }
        Ok(Self {
            account_id,
            balance,
            decimals,
        })
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Nft {
    pub token_id: TokenId,
    pub serial_number: i64,
    pub account_id: Option<AccountId>,
    pub spender: Option<AccountId>,
    pub metadata: Vec<u8>,
    pub deleted: bool,
    pub created_timestamp: Option<OffsetDateTime>,
    pub modified_timestamp: Option<OffsetDateTime>,
}

#[cfg(test)]
mod tests {
    use super::{Balance, SupplyType, TokenType};
    use crate::core::entity::AccountId;
    use crate::core::error::ErrorKind;

    #[test]
    fn token_type_names_match_mirror() {
        let parsed: TokenType = "NON_FUNGIBLE_UNIQUE".parse().expect("type");
        assert_eq!(parsed, TokenType::NonFungibleUnique);
        assert_eq!(TokenType::FungibleCommon.to_string(), "FUNGIBLE_COMMON");
        assert!("SEMI_FUNGIBLE".parse::<TokenType>().is_err());
        assert_eq!("FINITE".parse::<SupplyType>().expect("supply"), SupplyType::Finite);
    }

    #[test]
    fn negative_balance_is_rejected() {
        let err = Balance::new(AccountId::from_num(5), -1, 0).expect_err("neg");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}

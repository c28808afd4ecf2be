//! Purpose: Token service operations.
//! Exports: Token create/associate/dissociate/mint/burn/transfer requests and results.
//! Role: Factories default treasury, admin and supply keys to the operator.
//! Invariants: Non-fungible tokens have zero decimals and zero initial supply.
//! Invariants: A finite supply has a positive maximum no lower than the initial supply.
//! Invariants: Mint, burn and transfer amounts are positive; NFT metadata is at most 100 bytes.
use std::collections::BTreeSet;

use bytes::Bytes;

use crate::config::Operator;
use crate::core::entity::{AccountId, TokenId, TransactionId};
use crate::core::error::{ApiResult, Error};
use crate::core::status::Status;
use crate::domain::{CustomFee, SupplyType, TokenType};
use crate::protocol::network::{TokenDefinition, TokenMovement, TransactionBody};
use crate::protocol::options::{
    KeySource, MAX_NFT_METADATA_BYTES, MAX_TOKEN_NAME_BYTES, MAX_TOKEN_SYMBOL_BYTES,
    TransactionOptions, check_max_len, check_memo, check_not_empty,
};
use crate::protocol::request::{Operation, OperationKind, Outcome, Request, required};

/// Most decimals a fungible token may declare.
pub const MAX_TOKEN_DECIMALS: u32 = 18;

fn check_amount(amount: u64, label: &str) -> ApiResult<()> {
    if amount == 0 {
        return Err(Error::invalid_argument(format!("{label} must be positive")));
    }
    if i64::try_from(amount).is_err() {
        return Err(Error::invalid_argument(format!("{label} {amount} is out of range")));
    }
    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenCreateRequest {
    name: String,
    symbol: String,
    token_type: TokenType,
    decimals: u32,
    initial_supply: u64,
    supply_type: SupplyType,
    max_supply: u64,
    treasury_account_id: Option<AccountId>,
    admin_key: KeySource,
    supply_key: KeySource,
    freeze_default: bool,
    memo: Option<String>,
    custom_fees: CustomFee,
    options: TransactionOptions,
}

impl TokenCreateRequest {
    /// An infinite-supply fungible token held by the operator treasury.
    pub fn fungible(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u32,
        initial_supply: u64,
    ) -> ApiResult<Self> {
        if decimals > MAX_TOKEN_DECIMALS {
            return Err(Error::invalid_argument(format!(
                "decimals must be at most {MAX_TOKEN_DECIMALS}, got {decimals}"
            )));
        }
        Self::build(
            name.into(),
            symbol.into(),
            TokenType::FungibleCommon,
            decimals,
            initial_supply,
            SupplyType::Infinite,
            0,
        )
    }

    pub fn fungible_finite(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u32,
        initial_supply: u64,
        max_supply: u64,
    ) -> ApiResult<Self> {
        let request = Self::fungible(name, symbol, decimals, initial_supply)?;
        request.into_finite(max_supply)
    }

    /// An NFT collection; serials are minted later with the operator supply key.
    pub fn non_fungible(name: impl Into<String>, symbol: impl Into<String>) -> ApiResult<Self> {
        Self::build(
            name.into(),
            symbol.into(),
            TokenType::NonFungibleUnique,
            0,
            0,
            SupplyType::Infinite,
            0,
        )
    }

    pub fn non_fungible_finite(
        name: impl Into<String>,
        symbol: impl Into<String>,
        max_supply: u64,
    ) -> ApiResult<Self> {
        Self::non_fungible(name, symbol)?.into_finite(max_supply)
    }

    fn build(
        name: String,
        symbol: String,
        token_type: TokenType,
        decimals: u32,
        initial_supply: u64,
        supply_type: SupplyType,
        max_supply: u64,
    ) -> ApiResult<Self> {
        check_not_empty(name.trim().len(), "token name")?;
        check_max_len(name.len(), MAX_TOKEN_NAME_BYTES, "token name")?;
        check_not_empty(symbol.trim().len(), "token symbol")?;
        check_max_len(symbol.len(), MAX_TOKEN_SYMBOL_BYTES, "token symbol")?;
        if i64::try_from(initial_supply).is_err() {
            return Err(Error::invalid_argument(format!(
                "initial supply {initial_supply} is out of range"
            )));
        }
        Ok(Self {
            name,
            symbol,
            token_type,
            decimals,
            initial_supply,
            supply_type,
            max_supply,
            treasury_account_id: None,
            admin_key: KeySource::Operator,
            supply_key: KeySource::Operator,
            freeze_default: false,
            memo: None,
            custom_fees: CustomFee::default(),
            options: TransactionOptions::default(),
        })
    }

    fn into_finite(mut self, max_supply: u64) -> ApiResult<Self> {
        check_amount(max_supply, "max supply")?;
        if self.initial_supply > max_supply {
            return Err(Error::invalid_argument(format!(
                "initial supply {} exceeds max supply {max_supply}",
                self.initial_supply
            )));
        }
        self.supply_type = SupplyType::Finite;
        self.max_supply = max_supply;
        Ok(self)
    }

    pub fn with_treasury(mut self, treasury_account_id: AccountId) -> Self {
        self.treasury_account_id = Some(treasury_account_id);
        self
    }

    pub fn with_admin_key(mut self, admin_key: impl Into<KeySource>) -> Self {
        self.admin_key = admin_key.into();
        self
    }

    /// Without a supply key the supply is fixed at creation.
    pub fn with_supply_key(mut self, supply_key: impl Into<KeySource>) -> ApiResult<Self> {
        let supply_key = supply_key.into();
        if supply_key.is_none() && self.token_type == TokenType::NonFungibleUnique {
            return Err(Error::invalid_argument(
                "a non-fungible token needs a supply key to mint serials",
            ));
        }
        self.supply_key = supply_key;
        Ok(self)
    }

    pub fn with_freeze_default(mut self, freeze_default: bool) -> Self {
        self.freeze_default = freeze_default;
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> ApiResult<Self> {
        let memo = memo.into();
        check_memo(&memo, "token memo")?;
        self.memo = Some(memo);
        Ok(self)
    }

    /// Fractional fees apply only to fungible tokens, royalty fees only to NFTs.
    pub fn with_custom_fees(mut self, custom_fees: CustomFee) -> ApiResult<Self> {
        match self.token_type {
            TokenType::FungibleCommon if !custom_fees.royalty_fees.is_empty() => {
                return Err(Error::invalid_argument(
                    "royalty fees apply only to non-fungible tokens",
                ));
            }
            TokenType::NonFungibleUnique if !custom_fees.fractional_fees.is_empty() => {
                return Err(Error::invalid_argument(
                    "fractional fees apply only to fungible tokens",
                ));
            }
            _ => {}
        }
        self.custom_fees = custom_fees;
        Ok(self)
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn supply_type(&self) -> SupplyType {
        self.supply_type
    }

    pub fn admin_key(&self) -> &KeySource {
        &self.admin_key
    }

    pub fn supply_key(&self) -> &KeySource {
        &self.supply_key
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenCreateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub token_id: TokenId,
}

impl Request for TokenCreateRequest {
    type Output = TokenCreateResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TokenCreate
    }

    fn operation(&self, operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::TokenCreate(TokenDefinition {
                name: self.name.clone(),
                symbol: self.symbol.clone(),
                token_type: self.token_type,
                decimals: self.decimals,
                initial_supply: self.initial_supply,
                supply_type: self.supply_type,
                max_supply: self.max_supply,
                treasury_account_id: self.treasury_account_id.unwrap_or(operator.account_id),
                admin_key: self.admin_key.resolve(operator),
                supply_key: self.supply_key.resolve(operator),
                freeze_default: self.freeze_default,
                memo: self.memo.clone(),
                custom_fees: self.custom_fees.clone(),
            }),
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::TokenCreate;
        let receipt = outcome.into_receipt(kind)?;
        Ok(TokenCreateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            token_id: required(receipt.token_id, &receipt, kind, "token id")?,
        })
    }
}

fn check_token_list(token_ids: &[TokenId]) -> ApiResult<()> {
    check_not_empty(token_ids.len(), "token list")?;
    let mut seen = BTreeSet::new();
    for token_id in token_ids {
        if !seen.insert(token_id) {
            return Err(Error::invalid_argument(format!(
                "token {token_id} is listed twice"
            )));
        }
    }
    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenAssociateRequest {
    account_id: Option<AccountId>,
    token_ids: Vec<TokenId>,
    options: TransactionOptions,
}

impl TokenAssociateRequest {
    /// Associates `token_id` with the operator account.
    pub fn of(token_id: TokenId) -> Self {
        Self {
            account_id: None,
            token_ids: vec![token_id],
            options: TransactionOptions::default(),
        }
    }

    pub fn of_account(account_id: AccountId, token_id: TokenId) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::of(token_id)
        }
    }

    pub fn of_tokens(account_id: AccountId, token_ids: Vec<TokenId>) -> ApiResult<Self> {
        check_token_list(&token_ids)?;
        Ok(Self {
            account_id: Some(account_id),
            token_ids,
            options: TransactionOptions::default(),
        })
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenAssociateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

impl Request for TokenAssociateRequest {
    type Output = TokenAssociateResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TokenAssociate
    }

    fn operation(&self, operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::TokenAssociate {
                account_id: self.account_id.unwrap_or(operator.account_id),
                token_ids: self.token_ids.clone(),
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let receipt = outcome.into_receipt(OperationKind::TokenAssociate)?;
        Ok(TokenAssociateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenDissociateRequest {
    account_id: Option<AccountId>,
    token_ids: Vec<TokenId>,
    options: TransactionOptions,
}

impl TokenDissociateRequest {
    /// Dissociates `token_id` from the operator account.
    pub fn of(token_id: TokenId) -> Self {
        Self {
            account_id: None,
            token_ids: vec![token_id],
            options: TransactionOptions::default(),
        }
    }

    pub fn of_account(account_id: AccountId, token_id: TokenId) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::of(token_id)
        }
    }

    pub fn of_tokens(account_id: AccountId, token_ids: Vec<TokenId>) -> ApiResult<Self> {
        check_token_list(&token_ids)?;
        Ok(Self {
            account_id: Some(account_id),
            token_ids,
            options: TransactionOptions::default(),
        })
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenDissociateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

impl Request for TokenDissociateRequest {
    type Output = TokenDissociateResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TokenDissociate
    }

    fn operation(&self, operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::TokenDissociate {
                account_id: self.account_id.unwrap_or(operator.account_id),
                token_ids: self.token_ids.clone(),
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let receipt = outcome.into_receipt(OperationKind::TokenDissociate)?;
        Ok(TokenDissociateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenMintRequest {
    token_id: TokenId,
    amount: u64,
    metadata: Vec<Bytes>,
    options: TransactionOptions,
}

impl TokenMintRequest {
    pub fn fungible(token_id: TokenId, amount: u64) -> ApiResult<Self> {
        check_amount(amount, "mint amount")?;
        Ok(Self {
            token_id,
            amount,
            metadata: Vec::new(),
            options: TransactionOptions::default(),
        })
    }

    /// One serial per metadata entry.
    pub fn nft(token_id: TokenId, metadata: Vec<Bytes>) -> ApiResult<Self> {
        check_not_empty(metadata.len(), "NFT metadata list")?;
        for entry in &metadata {
            check_max_len(entry.len(), MAX_NFT_METADATA_BYTES, "NFT metadata")?;
        }
        Ok(Self {
            token_id,
            amount: 0,
            metadata,
            options: TransactionOptions::default(),
        })
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenMintResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub total_supply: u64,
    /// Serials of newly minted NFTs; empty for fungible mints.
    pub serial_numbers: Vec<i64>,
}

impl Request for TokenMintRequest {
    type Output = TokenMintResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TokenMint
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::TokenMint {
                token_id: self.token_id,
                amount: self.amount,
                metadata: self.metadata.clone(),
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::TokenMint;
        let receipt = outcome.into_receipt(kind)?;
        Ok(TokenMintResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            total_supply: required(receipt.total_supply, &receipt, kind, "total supply")?,
            serial_numbers: receipt.serial_numbers,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenBurnRequest {
    token_id: TokenId,
    amount: u64,
    serial_numbers: Vec<i64>,
    options: TransactionOptions,
}

impl TokenBurnRequest {
    /// Burns from the treasury account.
    pub fn fungible(token_id: TokenId, amount: u64) -> ApiResult<Self> {
        check_amount(amount, "burn amount")?;
        Ok(Self {
            token_id,
            amount,
            serial_numbers: Vec::new(),
            options: TransactionOptions::default(),
        })
    }

    pub fn nft(token_id: TokenId, serial_numbers: Vec<i64>) -> ApiResult<Self> {
        check_not_empty(serial_numbers.len(), "serial number list")?;
        if let Some(serial) = serial_numbers.iter().find(|serial| **serial <= 0) {
            return Err(Error::invalid_argument(format!(
                "serial number must be positive, got {serial}"
            )));
        }
        Ok(Self {
            token_id,
            amount: 0,
            serial_numbers,
            options: TransactionOptions::default(),
        })
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenBurnResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub total_supply: u64,
}

impl Request for TokenBurnRequest {
    type Output = TokenBurnResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TokenBurn
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::TokenBurn {
                token_id: self.token_id,
                amount: self.amount,
                serial_numbers: self.serial_numbers.clone(),
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::TokenBurn;
        let receipt = outcome.into_receipt(kind)?;
        Ok(TokenBurnResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            total_supply: required(receipt.total_supply, &receipt, kind, "total supply")?,
        })
    }
}

/// Moves fungible units or one NFT between two accounts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenTransferRequest {
    token_id: TokenId,
    sender: Option<AccountId>,
    receiver: AccountId,
    movement: TokenMovement,
    options: TransactionOptions,
}

impl TokenTransferRequest {
    /// Sends from the operator account.
    pub fn fungible(token_id: TokenId, receiver: AccountId, amount: u64) -> ApiResult<Self> {
        check_amount(amount, "transfer amount")?;
        Ok(Self {
            token_id,
            sender: None,
            receiver,
            movement: TokenMovement::Fungible { amount },
            options: TransactionOptions::default(),
        })
    }

    pub fn fungible_from(
        token_id: TokenId,
        sender: AccountId,
        receiver: AccountId,
        amount: u64,
    ) -> ApiResult<Self> {
        check_distinct(sender, receiver)?;
        let mut request = Self::fungible(token_id, receiver, amount)?;
        request.sender = Some(sender);
        Ok(request)
    }

    /// Sends from the operator account.
    pub fn nft(token_id: TokenId, serial_number: i64, receiver: AccountId) -> ApiResult<Self> {
        if serial_number <= 0 {
            return Err(Error::invalid_argument(format!(
                "serial number must be positive, got {serial_number}"
            )));
        }
        Ok(Self {
            token_id,
            sender: None,
            receiver,
            movement: TokenMovement::Nft { serial_number },
            options: TransactionOptions::default(),
        })
    }

    pub fn nft_from(
        token_id: TokenId,
        serial_number: i64,
        sender: AccountId,
        receiver: AccountId,
    ) -> ApiResult<Self> {
        check_distinct(sender, receiver)?;
        let mut request = Self::nft(token_id, serial_number, receiver)?;
        request.sender = Some(sender);
        Ok(request)
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

fn check_distinct(sender: AccountId, receiver: AccountId) -> ApiResult<()> {
    if sender == receiver {
        return Err(Error::invalid_argument(format!(
            "sender and receiver are both {sender}"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenTransferResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

impl Request for TokenTransferRequest {
    type Output = TokenTransferResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TokenTransfer
    }

    fn operation(&self, operator: &Operator) -> ApiResult<Operation> {
        let sender = self.sender.unwrap_or(operator.account_id);
        check_distinct(sender, self.receiver)?;
        Ok(Operation::Transaction {
            body: TransactionBody::TokenTransfer {
                token_id: self.token_id,
                sender,
                receiver: self.receiver,
                movement: self.movement,
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let receipt = outcome.into_receipt(OperationKind::TokenTransfer)?;
        Ok(TokenTransferResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

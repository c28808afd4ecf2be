// Account create, delete and balance operations.
use crate::config::Operator;
use crate::core::amount::Hbar;
use crate::core::entity::{AccountId, TokenId, TransactionId};
use crate::core::error::{ApiResult, Error};
use crate::core::key::PublicKey;
use crate::core::status::Status;
use crate::domain::AccountTokenBalance;
use crate::protocol::network::{LedgerQuery, QueryResponse, TransactionBody};
use crate::protocol::options::{QueryOptions, TransactionOptions, check_memo, check_non_negative};
use crate::protocol::request::{
    Operation, OperationKind, Outcome, Request, required, unexpected_response,
};

/// Upper bound the network accepts for automatic token associations.
pub const MAX_AUTOMATIC_TOKEN_ASSOCIATIONS: i32 = 5000;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountCreateRequest {
    key: PublicKey,
    initial_balance: Hbar,
    memo: Option<String>,
    max_automatic_token_associations: i32,
    options: TransactionOptions,
}

impl AccountCreateRequest {
    pub fn of(key: PublicKey) -> Self {
        Self {
            key,
            initial_balance: Hbar::ZERO,
            memo: None,
            max_automatic_token_associations: 0,
            options: TransactionOptions::default(),
        }
    }

    pub fn of_balance(key: PublicKey, initial_balance: Hbar) -> ApiResult<Self> {
        check_non_negative(initial_balance, "initial balance")?;
        Ok(Self {
            initial_balance,
            ..Self::of(key)
        })
    }

    pub fn of_balance_and_memo(
        key: PublicKey,
        initial_balance: Hbar,
        memo: impl Into<String>,
    ) -> ApiResult<Self> {
        let memo = memo.into();
        check_memo(&memo, "account memo")?;
        let mut request = Self::of_balance(key, initial_balance)?;
        request.memo = Some(memo);
        Ok(request)
    }

    pub fn with_max_automatic_token_associations(mut self, max: i32) -> ApiResult<Self> {
        if !(0..=MAX_AUTOMATIC_TOKEN_ASSOCIATIONS).contains(&max) {
            return Err(Error::invalid_argument(format!(
                "automatic token associations must be within 0..={MAX_AUTOMATIC_TOKEN_ASSOCIATIONS}, got {max}"
            )));
        }
        self.max_automatic_token_associations = max;
        Ok(self)
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn initial_balance(&self) -> Hbar {
        self.initial_balance
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountCreateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub account_id: AccountId,
}

impl Request for AccountCreateRequest {
    type Output = AccountCreateResult;

    fn kind(&self) -> OperationKind {
        OperationKind::AccountCreate
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::AccountCreate {
                key: self.key.clone(),
                initial_balance: self.initial_balance,
                memo: self.memo.clone(),
                max_automatic_token_associations: self.max_automatic_token_associations,
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::AccountCreate;
        let receipt = outcome.into_receipt(kind)?;
        Ok(AccountCreateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            account_id: required(receipt.account_id, &receipt, kind, "account id")?,
        })
    }
}

/// Deletes an account and moves its remaining hbar to `transfer_account_id`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountDeleteRequest {
    account_id: AccountId,
    transfer_account_id: Option<AccountId>,
    options: TransactionOptions,
}

impl AccountDeleteRequest {
    /// Remaining balance goes to the operator account.
    pub fn of(account_id: AccountId) -> Self {
        Self {
            account_id,
            transfer_account_id: None,
            options: TransactionOptions::default(),
        }
    }

    pub fn of_transfer(account_id: AccountId, transfer_account_id: AccountId) -> ApiResult<Self> {
        if account_id == transfer_account_id {
            return Err(Error::invalid_argument(format!(
                "account {account_id} cannot receive its own remaining balance"
            )));
        }
        Ok(Self {
            transfer_account_id: Some(transfer_account_id),
            ..Self::of(account_id)
        })
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountDeleteResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

impl Request for AccountDeleteRequest {
    type Output = AccountDeleteResult;

    fn kind(&self) -> OperationKind {
        OperationKind::AccountDelete
    }

    fn operation(&self, operator: &Operator) -> ApiResult<Operation> {
        let transfer_account_id = self.transfer_account_id.unwrap_or(operator.account_id);
        if transfer_account_id == self.account_id {
            return Err(Error::invalid_argument(format!(
                "account {} cannot receive its own remaining balance",
                self.account_id
            )));
        }
        Ok(Operation::Transaction {
            body: TransactionBody::AccountDelete {
                account_id: self.account_id,
                transfer_account_id,
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let receipt = outcome.into_receipt(OperationKind::AccountDelete)?;
        Ok(AccountDeleteResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountBalanceRequest {
    account_id: Option<AccountId>,
    options: QueryOptions,
}

impl AccountBalanceRequest {
    /// The operator account's balance.
    pub fn of_operator() -> Self {
        Self {
            account_id: None,
            options: QueryOptions::default(),
        }
    }

    pub fn of(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            options: QueryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountBalanceResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub hbars: Hbar,
    pub tokens: Vec<AccountTokenBalance>,
}

impl AccountBalanceResult {
    pub fn token_balance(&self, token_id: TokenId) -> Option<i64> {
        self.tokens
            .iter()
            .find(|entry| entry.token_id == token_id)
            .map(|entry| entry.balance)
    }
}

impl Request for AccountBalanceRequest {
    type Output = AccountBalanceResult;

    fn kind(&self) -> OperationKind {
        OperationKind::AccountBalance
    }

    fn operation(&self, operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Query {
            query: LedgerQuery::AccountBalance {
                account_id: self.account_id.unwrap_or(operator.account_id),
            },
            options: self.options,
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::AccountBalance;
        match outcome.into_response(kind)? {
            (transaction_id, QueryResponse::AccountBalance { hbars, tokens }) => {
                Ok(AccountBalanceResult {
                    transaction_id,
                    status: Status::Ok,
                    hbars,
                    tokens,
                })
            }
            (_, other) => Err(unexpected_response(kind, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::key::{KeyAlgorithm, PrivateKey};

    fn key() -> PublicKey {
        PublicKey::from_bytes(KeyAlgorithm::Ed25519, &[4; 32]).expect("key")
    }

    fn operator() -> Operator {
        Operator::new(
            AccountId::from_num(2),
            PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[1; 32]).expect("private"),
            key(),
        )
        .expect("operator")
    }

    #[test]
    fn negative_initial_balance_is_rejected() {
        let err = AccountCreateRequest::of_balance(key(), Hbar::from_tinybars(-1))
            .expect_err("negative");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let request = AccountCreateRequest::of(key());
        assert_eq!(request.initial_balance(), Hbar::ZERO);
        assert_eq!(request.memo(), None);
    }

    #[test]
    fn delete_defaults_transfer_target_to_operator() {
        let request = AccountDeleteRequest::of(AccountId::from_num(1001));
        let Operation::Transaction { body, .. } = request.operation(&operator()).expect("op")
        else {
            panic!("expected a transaction");
        };
        assert_eq!(
            body,
            TransactionBody::AccountDelete {
                account_id: AccountId::from_num(1001),
                transfer_account_id: AccountId::from_num(2),
            }
        );
    }

    #[test]
    fn operator_cannot_delete_into_itself() {
        let err = AccountDeleteRequest::of(AccountId::from_num(2))
            .operation(&operator())
            .expect_err("self transfer");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn association_limit_is_bounded() {
        let err = AccountCreateRequest::of(key())
            .with_max_automatic_token_associations(-1)
            .expect_err("negative");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}

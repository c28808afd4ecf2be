//! Purpose: The request/result contract every ledger operation follows.
//! Exports: `Request`, `OperationKind`, `Operation`, `Outcome`.
//! Role: Lets one `ProtocolClient::execute` serve every operation, typed by its request.
//! Invariants: Argument checks run at construction or in `Request::operation`, never after submission.
use std::fmt;

use crate::config::Operator;
use crate::core::entity::TransactionId;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::protocol::network::{LedgerQuery, QueryResponse, TransactionBody, TransactionReceipt};
use crate::protocol::options::{QueryOptions, TransactionOptions};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum OperationKind {
    AccountCreate,
    AccountDelete,
    AccountBalance,
    FileCreate,
    FileAppend,
    FileUpdate,
    FileDelete,
    FileContents,
    FileInfo,
    ContractCreate,
    ContractCall,
    ContractDelete,
    TokenCreate,
    TokenAssociate,
    TokenDissociate,
    TokenMint,
    TokenBurn,
    TokenTransfer,
    TopicCreate,
    TopicUpdate,
    TopicDelete,
    TopicSubmitMessage,
    TopicMessageQuery,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::AccountCreate => "account_create",
            OperationKind::AccountDelete => "account_delete",
            OperationKind::AccountBalance => "account_balance",
            OperationKind::FileCreate => "file_create",
            OperationKind::FileAppend => "file_append",
            OperationKind::FileUpdate => "file_update",
            OperationKind::FileDelete => "file_delete",
            OperationKind::FileContents => "file_contents",
            OperationKind::FileInfo => "file_info",
            OperationKind::ContractCreate => "contract_create",
            OperationKind::ContractCall => "contract_call",
            OperationKind::ContractDelete => "contract_delete",
            OperationKind::TokenCreate => "token_create",
            OperationKind::TokenAssociate => "token_associate",
            OperationKind::TokenDissociate => "token_dissociate",
            OperationKind::TokenMint => "token_mint",
            OperationKind::TokenBurn => "token_burn",
            OperationKind::TokenTransfer => "token_transfer",
            OperationKind::TopicCreate => "topic_create",
            OperationKind::TopicUpdate => "topic_update",
            OperationKind::TopicDelete => "topic_delete",
            OperationKind::TopicSubmitMessage => "topic_submit_message",
            OperationKind::TopicMessageQuery => "topic_message_query",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a request asks the network to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Transaction {
        body: TransactionBody,
        options: TransactionOptions,
    },
    Query {
        query: LedgerQuery,
        options: QueryOptions,
    },
}

/// What the network answered, before it is narrowed to a typed result.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Receipt(TransactionReceipt),
    Response {
        transaction_id: TransactionId,
        response: QueryResponse,
    },
}

impl Outcome {
    pub(crate) fn into_receipt(self, kind: OperationKind) -> ApiResult<TransactionReceipt> {
        match self {
            Outcome::Receipt(receipt) => Ok(receipt),
            Outcome::Response { .. } => Err(mismatch(kind, "a query response")),
        }
    }

    pub(crate) fn into_response(
        self,
        kind: OperationKind,
    ) -> ApiResult<(TransactionId, QueryResponse)> {
        match self {
            Outcome::Response {
                transaction_id,
                response,
            } => Ok((transaction_id, response)),
            Outcome::Receipt(_) => Err(mismatch(kind, "a receipt")),
        }
    }
}

/// One ledger operation. The result type is fixed by the request type.
pub trait Request: fmt::Debug {
    type Output;

    fn kind(&self) -> OperationKind;

    /// Resolves operator-dependent defaults and produces the network call.
    fn operation(&self, operator: &Operator) -> ApiResult<Operation>;

    fn output(outcome: Outcome) -> ApiResult<Self::Output>;
}

fn mismatch(kind: OperationKind, found: &str) -> Error {
    Error::new(ErrorKind::Internal).with_message(format!("{kind} received {found}"))
}

/// A receipt field the operation must have produced.
pub(crate) fn required<T>(
    value: Option<T>,
    receipt: &TransactionReceipt,
    kind: OperationKind,
    field: &str,
) -> ApiResult<T> {
    value.ok_or_else(|| {
        Error::new(ErrorKind::OperationFailure)
            .with_message(format!("{kind} receipt has no {field}"))
            .with_status(receipt.status)
            .with_transaction_id(receipt.transaction_id)
    })
}

/// A query answered with the wrong response variant.
pub(crate) fn unexpected_response(kind: OperationKind, response: &QueryResponse) -> Error {
    Error::new(ErrorKind::OperationFailure)
        .with_message(format!("{kind} received an unexpected response: {response:?}"))
}

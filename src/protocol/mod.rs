//! Purpose: Typed ledger operations executed through an external network client.
//! Exports: `ProtocolClient`, the `Request` contract, every request/result pair, `LocalLedger`.
//! Role: Validates arguments, fills operator defaults and hands envelopes to `LedgerNetwork`.
//! Invariants: One request type per operation; its `Output` is the only result it can produce.

pub mod account;
pub mod client;
pub mod contract;
pub mod file;
pub mod listener;
pub mod local;
pub mod network;
pub mod options;
pub mod request;
pub mod token;
pub mod topic;

pub use account::{
    AccountBalanceRequest, AccountBalanceResult, AccountCreateRequest, AccountCreateResult,
    AccountDeleteRequest, AccountDeleteResult,
};
pub use client::ProtocolClient;
pub use contract::{
    ContractCallRequest, ContractCallResult, ContractCreateRequest, ContractCreateResult,
    ContractDeleteRequest, ContractDeleteResult,
};
pub use file::{
    FileAppendRequest, FileAppendResult, FileContentsRequest, FileContentsResult,
    FileCreateRequest, FileCreateResult, FileDeleteRequest, FileDeleteResult, FileInfo,
    FileInfoRequest, FileInfoResult, FileUpdateRequest, FileUpdateResult,
};
pub use listener::{ListenerRegistration, TransactionEvent, TransactionListener};
pub use local::LocalLedger;
pub use network::{
    LedgerNetwork, LedgerQuery, MessageHandler, QueryEnvelope, QueryResponse, SubscriptionHandle,
    TopicSubscription, TransactionBody, TransactionEnvelope, TransactionReceipt,
};
pub use options::{KeySource, QueryOptions, TransactionOptions};
pub use request::{Operation, OperationKind, Outcome, Request};
pub use token::{
    TokenAssociateRequest, TokenAssociateResult, TokenBurnRequest, TokenBurnResult,
    TokenCreateRequest, TokenCreateResult, TokenDissociateRequest, TokenDissociateResult,
    TokenMintRequest, TokenMintResult, TokenTransferRequest, TokenTransferResult,
};
pub use topic::{
    TopicCreateRequest, TopicCreateResult, TopicDeleteRequest, TopicDeleteResult,
    TopicMessageQueryRequest, TopicMessageQueryResult, TopicSubmitMessageRequest,
    TopicSubmitMessageResult, TopicUpdateRequest, TopicUpdateResult,
};

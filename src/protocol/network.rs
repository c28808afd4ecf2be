//! Purpose: The seam to the external ledger network client.
//! Exports: `LedgerNetwork`, `TransactionEnvelope`, `TransactionBody`, `TransactionReceipt`,
//! `QueryEnvelope`, `LedgerQuery`, `QueryResponse`, `TopicSubscription`, `SubscriptionHandle`.
//! Role: Everything the protocol client hands to, or receives from, signing and consensus.
//! Invariants: Bodies are already validated; the network never sees an unchecked argument.
//! Invariants: A receipt whose status is not a success is a failed operation.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use time::OffsetDateTime;

use crate::core::amount::Hbar;
use crate::core::entity::{AccountId, ContractId, FileId, TokenId, TopicId, TransactionId};
use crate::core::error::ApiResult;
use crate::core::key::PublicKey;
use crate::core::status::Status;
use crate::domain::{AccountTokenBalance, CustomFee, SupplyType, TokenType, TopicMessage, TransactionType};
use crate::protocol::file::FileInfo;

/// Signing, consensus submission and transport, owned by an external client.
pub trait LedgerNetwork: Send + Sync {
    /// Submits one signed transaction and waits for its receipt.
    fn submit(&self, envelope: &TransactionEnvelope) -> ApiResult<TransactionReceipt>;

    /// Runs one paid query against a consensus node.
    fn query(&self, envelope: &QueryEnvelope) -> ApiResult<QueryResponse>;

    /// Streams topic messages to `handler` until the handle is unsubscribed
    /// or the subscription's limit is reached.
    fn subscribe_topic(
        &self,
        subscription: TopicSubscription,
        handler: MessageHandler,
    ) -> ApiResult<SubscriptionHandle>;
}

pub type MessageHandler = Arc<dyn Fn(&TopicMessage) + Send + Sync>;

#[derive(Clone, Debug, PartialEq)]
pub struct TransactionEnvelope {
    pub transaction_id: TransactionId,
    pub max_fee: Hbar,
    pub valid_duration: Duration,
    pub memo: Option<String>,
    pub body: TransactionBody,
}

/// The fields a token create transaction carries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenDefinition {
    pub name: String,
    pub symbol: String,
    pub token_type: TokenType,
    pub decimals: u32,
    pub initial_supply: u64,
    pub supply_type: SupplyType,
    pub max_supply: u64,
    pub treasury_account_id: AccountId,
    pub admin_key: Option<PublicKey>,
    pub supply_key: Option<PublicKey>,
    pub freeze_default: bool,
    pub memo: Option<String>,
    pub custom_fees: CustomFee,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenMovement {
    Fungible { amount: u64 },
    Nft { serial_number: i64 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransactionBody {
    AccountCreate {
        key: PublicKey,
        initial_balance: Hbar,
        memo: Option<String>,
        max_automatic_token_associations: i32,
    },
    AccountDelete {
        account_id: AccountId,
        transfer_account_id: AccountId,
    },
    FileCreate {
        contents: Bytes,
        keys: Vec<PublicKey>,
        memo: Option<String>,
        expiration_time: Option<OffsetDateTime>,
    },
    FileAppend {
        file_id: FileId,
        contents: Bytes,
    },
    FileUpdate {
        file_id: FileId,
        contents: Option<Bytes>,
        memo: Option<String>,
        expiration_time: Option<OffsetDateTime>,
    },
    FileDelete {
        file_id: FileId,
    },
    ContractCreate {
        bytecode_file_id: FileId,
        gas: u64,
        constructor_parameters: Bytes,
        initial_balance: Hbar,
        admin_key: Option<PublicKey>,
        memo: Option<String>,
    },
    ContractCall {
        contract_id: ContractId,
        gas: u64,
        function_parameters: Bytes,
        payable_amount: Hbar,
    },
    ContractDelete {
        contract_id: ContractId,
        transfer_account_id: AccountId,
    },
    TokenCreate(TokenDefinition),
    TokenAssociate {
        account_id: AccountId,
        token_ids: Vec<TokenId>,
    },
    TokenDissociate {
        account_id: AccountId,
        token_ids: Vec<TokenId>,
    },
    TokenMint {
        token_id: TokenId,
        amount: u64,
        metadata: Vec<Bytes>,
    },
    TokenBurn {
        token_id: TokenId,
        amount: u64,
        serial_numbers: Vec<i64>,
    },
    TokenTransfer {
        token_id: TokenId,
        sender: AccountId,
        receiver: AccountId,
        movement: TokenMovement,
    },
    TopicCreate {
        admin_key: Option<PublicKey>,
        submit_key: Option<PublicKey>,
        memo: Option<String>,
        auto_renew_account: Option<AccountId>,
        auto_renew_period: Option<Duration>,
    },
    TopicUpdate {
        topic_id: TopicId,
        memo: Option<String>,
        admin_key: Option<PublicKey>,
        submit_key: Option<PublicKey>,
    },
    TopicDelete {
        topic_id: TopicId,
    },
    TopicSubmitMessage {
        topic_id: TopicId,
        message: Bytes,
    },
}

impl TransactionBody {
    /// The name the mirror node will record this transaction under.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionBody::AccountCreate { .. } => TransactionType::CryptoCreateAccount,
            TransactionBody::AccountDelete { .. } => TransactionType::CryptoDelete,
            TransactionBody::FileCreate { .. } => TransactionType::FileCreate,
            TransactionBody::FileAppend { .. } => TransactionType::FileAppend,
            TransactionBody::FileUpdate { .. } => TransactionType::FileUpdate,
            TransactionBody::FileDelete { .. } => TransactionType::FileDelete,
            TransactionBody::ContractCreate { .. } => TransactionType::ContractCreateInstance,
            TransactionBody::ContractCall { .. } => TransactionType::ContractCall,
            TransactionBody::ContractDelete { .. } => TransactionType::ContractDeleteInstance,
            TransactionBody::TokenCreate(_) => TransactionType::TokenCreation,
            TransactionBody::TokenAssociate { .. } => TransactionType::TokenAssociate,
            TransactionBody::TokenDissociate { .. } => TransactionType::TokenDissociate,
            TransactionBody::TokenMint { .. } => TransactionType::TokenMint,
            TransactionBody::TokenBurn { .. } => TransactionType::TokenBurn,
            TransactionBody::TokenTransfer { .. } => TransactionType::CryptoTransfer,
            TransactionBody::TopicCreate { .. } => TransactionType::ConsensusCreateTopic,
            TransactionBody::TopicUpdate { .. } => TransactionType::ConsensusUpdateTopic,
            TransactionBody::TopicDelete { .. } => TransactionType::ConsensusDeleteTopic,
            TransactionBody::TopicSubmitMessage { .. } => TransactionType::ConsensusSubmitMessage,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractCallOutput {
    pub gas_used: u64,
    pub result: Bytes,
}

/// What consensus reported for one transaction. Entity fields are set by the
/// transactions that create or change them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionReceipt {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub consensus_timestamp: Option<OffsetDateTime>,
    pub account_id: Option<AccountId>,
    pub file_id: Option<FileId>,
    pub contract_id: Option<ContractId>,
    pub token_id: Option<TokenId>,
    pub topic_id: Option<TopicId>,
    pub topic_sequence_number: Option<u64>,
    pub topic_running_hash: Option<Vec<u8>>,
    pub total_supply: Option<u64>,
    pub serial_numbers: Vec<i64>,
    pub contract_call: Option<ContractCallOutput>,
}

impl TransactionReceipt {
    pub fn new(transaction_id: TransactionId, status: Status) -> Self {
        Self {
            transaction_id,
            status,
            consensus_timestamp: None,
            account_id: None,
            file_id: None,
            contract_id: None,
            token_id: None,
            topic_id: None,
            topic_sequence_number: None,
            topic_running_hash: None,
            total_supply: None,
            serial_numbers: Vec::new(),
            contract_call: None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryEnvelope {
    pub payment_transaction_id: TransactionId,
    pub max_payment: Hbar,
    pub query: LedgerQuery,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LedgerQuery {
    AccountBalance {
        account_id: AccountId,
    },
    FileContents {
        file_id: FileId,
    },
    FileInfo {
        file_id: FileId,
    },
    TopicMessages {
        topic_id: TopicId,
        start_time: Option<OffsetDateTime>,
        end_time: Option<OffsetDateTime>,
        limit: Option<u64>,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QueryResponse {
    AccountBalance {
        hbars: Hbar,
        tokens: Vec<AccountTokenBalance>,
    },
    FileContents(Bytes),
    FileInfo(FileInfo),
    TopicMessages(Vec<TopicMessage>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicSubscription {
    pub topic_id: TopicId,
    /// Replay from this consensus time; `None` replays from the first message.
    pub start_time: Option<OffsetDateTime>,
    pub limit: Option<u64>,
}

impl TopicSubscription {
    pub fn new(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            start_time: None,
            limit: None,
        }
    }

    pub fn with_start_time(mut self, start_time: OffsetDateTime) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Cancels a live topic subscription. Clones share one flag.
#[derive(Clone, Debug)]
pub struct SubscriptionHandle {
    active: Arc<AtomicBool>,
}

impl Default for SubscriptionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionHandle {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

//! Purpose: An in-memory `LedgerNetwork` for tests and local development.
//! Exports: `LocalLedger`.
//! Role: Applies transaction bodies to plain maps and answers queries from them.
//! Invariants: Every entity kind draws ids from one counter starting at 0.0.1001.
//! Invariants: Consensus timestamps strictly increase; topic sequence numbers start at 1.
//! Invariants: Rejections come back as receipts with a failure status, like a real node.
//! Invariants: Subscribers are called after the state lock is released, in sequence order.
//! Invariants: A message handler must not subscribe from inside its own callback.
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use sha2::{Digest, Sha384};
use time::OffsetDateTime;

use crate::config::Operator;
use crate::core::amount::Hbar;
use crate::core::entity::{AccountId, ContractId, FileId, TokenId, TopicId};
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::key::PublicKey;
use crate::core::status::Status;
use crate::domain::{AccountTokenBalance, SupplyType, TokenType, Topic, TopicMessage};
use crate::protocol::file::FileInfo;
use crate::protocol::network::{
    ContractCallOutput, LedgerNetwork, LedgerQuery, MessageHandler, QueryEnvelope, QueryResponse,
    SubscriptionHandle, TokenDefinition, TokenMovement, TopicSubscription, TransactionBody,
    TransactionEnvelope, TransactionReceipt,
};
use crate::protocol::options::{MAX_MEMO_BYTES, MAX_TOPIC_MESSAGE_BYTES};

const FIRST_ENTITY_NUM: u64 = 1001;
const RUNNING_HASH_VERSION: u64 = 3;
/// Gas charged for a call before any parameter bytes.
const BASE_CALL_GAS: u64 = 21_000;
const GAS_PER_PARAMETER_BYTE: u64 = 16;
const DEFAULT_FILE_LIFETIME: Duration = Duration::from_secs(90 * 24 * 60 * 60);

struct LocalAccount {
    key: PublicKey,
    balance: Hbar,
    deleted: bool,
    /// Associated tokens and the units (or NFT count) held.
    tokens: BTreeMap<TokenId, u64>,
}

struct LocalFile {
    contents: BytesMut,
    keys: Vec<PublicKey>,
    memo: Option<String>,
    expiration_time: OffsetDateTime,
    deleted: bool,
}

struct LocalContract {
    balance: Hbar,
    deleted: bool,
}

struct LocalToken {
    definition: TokenDefinition,
    total_supply: u64,
    next_serial: i64,
    nft_owners: BTreeMap<i64, AccountId>,
}

struct LocalTopic {
    admin_key: Option<PublicKey>,
    submit_key: Option<PublicKey>,
    memo: Option<String>,
    auto_renew_account: Option<AccountId>,
    auto_renew_period: Option<Duration>,
    created: OffsetDateTime,
    deleted: bool,
    running_hash: Vec<u8>,
    messages: Vec<TopicMessage>,
}

struct Subscriber {
    topic_id: TopicId,
    handler: MessageHandler,
    handle: SubscriptionHandle,
    remaining: Option<u64>,
}

impl Subscriber {
    /// Delivers one message; returns whether the subscription is still live.
    fn deliver(&mut self, message: &TopicMessage) -> bool {
        if !self.handle.is_active() {
            return false;
        }
        (self.handler)(message);
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.handle.unsubscribe();
                return false;
            }
        }
        true
    }
}

#[derive(Default)]
struct LedgerState {
    next_num: u64,
    last_consensus: Option<OffsetDateTime>,
    accounts: BTreeMap<AccountId, LocalAccount>,
    files: BTreeMap<FileId, LocalFile>,
    contracts: BTreeMap<ContractId, LocalContract>,
    tokens: BTreeMap<TokenId, LocalToken>,
    topics: BTreeMap<TopicId, LocalTopic>,
}

type Applied = Result<(), Status>;

pub struct LocalLedger {
    state: Mutex<LedgerState>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl std::fmt::Debug for LocalLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalLedger").finish_non_exhaustive()
    }
}

impl LocalLedger {
    /// A ledger holding only the operator account, funded with `balance`.
    pub fn new(operator: &Operator, balance: Hbar) -> Self {
        let mut state = LedgerState {
            next_num: FIRST_ENTITY_NUM,
            ..LedgerState::default()
        };
        state.accounts.insert(
            operator.account_id,
            LocalAccount::new(operator.public_key.clone(), balance),
        );
        Self {
            state: Mutex::new(state),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Adds a funded account with a caller-chosen id.
    pub fn with_account(mut self, account_id: AccountId, key: PublicKey, balance: Hbar) -> Self {
        if let Ok(state) = self.state.get_mut() {
            state.accounts.insert(account_id, LocalAccount::new(key, balance));
        }
        self
    }

    pub fn hbar_balance(&self, account_id: AccountId) -> ApiResult<Option<Hbar>> {
        Ok(self
            .state()?
            .accounts
            .get(&account_id)
            .filter(|account| !account.deleted)
            .map(|account| account.balance))
    }

    /// Every message of a topic, in sequence order.
    pub fn topic_messages(&self, topic_id: TopicId) -> ApiResult<Vec<TopicMessage>> {
        Ok(self
            .state()?
            .topics
            .get(&topic_id)
            .map(|topic| topic.messages.clone())
            .unwrap_or_default())
    }

    pub fn topic_message(&self, topic_id: TopicId, sequence_number: u64) -> ApiResult<Option<TopicMessage>> {
        let index = match sequence_number.checked_sub(1).map(usize::try_from) {
            Some(Ok(index)) => index,
            _ => return Ok(None),
        };
        Ok(self
            .state()?
            .topics
            .get(&topic_id)
            .and_then(|topic| topic.messages.get(index).cloned()))
    }

    /// The topic as a mirror node would describe it.
    pub fn topic(&self, topic_id: TopicId) -> ApiResult<Option<Topic>> {
        Ok(self.state()?.topics.get(&topic_id).map(|topic| Topic {
            topic_id,
            memo: topic.memo.clone().unwrap_or_default(),
            admin_key: topic.admin_key.clone(),
            submit_key: topic.submit_key.clone(),
            auto_renew_account: topic.auto_renew_account,
            auto_renew_period: topic.auto_renew_period,
            deleted: topic.deleted,
            created_timestamp: Some(topic.created),
        }))
    }

    fn state(&self) -> ApiResult<MutexGuard<'_, LedgerState>> {
        self.state.lock().map_err(|_| poisoned("ledger state"))
    }

    fn subscribers(&self) -> ApiResult<MutexGuard<'_, Vec<Subscriber>>> {
        self.subscribers.lock().map_err(|_| poisoned("subscriber list"))
    }
}

fn publish(subscribers: &mut Vec<Subscriber>, message: &TopicMessage) {
    subscribers.retain_mut(|subscriber| {
        if subscriber.topic_id != message.topic_id {
            return subscriber.handle.is_active();
        }
        subscriber.deliver(message)
    });
}

fn poisoned(what: &str) -> Error {
    Error::new(ErrorKind::Internal).with_message(format!("local ledger {what} lock is poisoned"))
}

fn query_failure(status: Status, message: String) -> Error {
    Error::new(ErrorKind::OperationFailure)
        .with_message(message)
        .with_status(status)
}

impl LedgerNetwork for LocalLedger {
    fn submit(&self, envelope: &TransactionEnvelope) -> ApiResult<TransactionReceipt> {
        // Held until delivery so concurrent submits reach subscribers in sequence order.
        let mut subscribers = self.subscribers()?;
        let mut state = self.state()?;
        let consensus = state.next_consensus_timestamp();
        let mut receipt = TransactionReceipt::new(envelope.transaction_id, Status::Success);
        receipt.consensus_timestamp = Some(consensus);

        let applied = match envelope.memo.as_deref() {
            Some(memo) if memo.len() > MAX_MEMO_BYTES => Err(Status::MemoTooLong),
            _ => state.apply(envelope, consensus, &mut receipt),
        };
        if let Err(status) = applied {
            tracing::debug!(
                transaction_id = %envelope.transaction_id,
                %status,
                "local ledger rejected transaction"
            );
            return Ok(TransactionReceipt {
                consensus_timestamp: Some(consensus),
                ..TransactionReceipt::new(envelope.transaction_id, status)
            });
        }

        let published = match (&envelope.body, receipt.topic_id, receipt.topic_sequence_number) {
            (TransactionBody::TopicSubmitMessage { .. }, Some(topic_id), Some(sequence)) => {
                let index = usize::try_from(sequence - 1).ok();
                state
                    .topics
                    .get(&topic_id)
                    .and_then(|topic| index.and_then(|index| topic.messages.get(index)))
                    .cloned()
            }
            _ => None,
        };
        drop(state);
        if let Some(message) = published {
            publish(&mut subscribers, &message);
        }
        Ok(receipt)
    }

    fn query(&self, envelope: &QueryEnvelope) -> ApiResult<QueryResponse> {
        let state = self.state()?;
        match &envelope.query {
            LedgerQuery::AccountBalance { account_id } => {
                let account = state
                    .accounts
                    .get(account_id)
                    .filter(|account| !account.deleted)
                    .ok_or_else(|| {
                        query_failure(Status::InvalidAccountId, format!("no account {account_id}"))
                    })?;
                let tokens = account
                    .tokens
                    .iter()
                    .map(|(token_id, units)| AccountTokenBalance {
                        token_id: *token_id,
                        balance: i64::try_from(*units).unwrap_or(i64::MAX),
                    })
                    .collect();
                Ok(QueryResponse::AccountBalance {
                    hbars: account.balance,
                    tokens,
                })
            }
            LedgerQuery::FileContents { file_id } => {
                let file = state.live_file(*file_id).map_err(|status| {
                    query_failure(status, format!("file {file_id} is unavailable"))
                })?;
                Ok(QueryResponse::FileContents(file.contents.clone().freeze()))
            }
            LedgerQuery::FileInfo { file_id } => {
                let file = state.files.get(file_id).ok_or_else(|| {
                    query_failure(Status::InvalidFileId, format!("no file {file_id}"))
                })?;
                Ok(QueryResponse::FileInfo(FileInfo {
                    file_id: *file_id,
                    size: file.contents.len() as u64,
                    expiration_time: Some(file.expiration_time),
                    deleted: file.deleted,
                    keys: file.keys.clone(),
                    memo: file.memo.clone().unwrap_or_default(),
                }))
            }
            LedgerQuery::TopicMessages {
                topic_id,
                start_time,
                end_time,
                limit,
            } => {
                let topic = state.topics.get(topic_id).ok_or_else(|| {
                    query_failure(Status::InvalidTopicId, format!("no topic {topic_id}"))
                })?;
                let limit = limit.and_then(|limit| usize::try_from(limit).ok()).unwrap_or(usize::MAX);
                let messages = topic
                    .messages
                    .iter()
                    .filter(|message| start_time.is_none_or(|start| message.consensus_timestamp >= start))
                    .filter(|message| end_time.is_none_or(|end| message.consensus_timestamp < end))
                    .take(limit)
                    .cloned()
                    .collect();
                Ok(QueryResponse::TopicMessages(messages))
            }
        }
    }

    fn subscribe_topic(
        &self,
        subscription: TopicSubscription,
        handler: MessageHandler,
    ) -> ApiResult<SubscriptionHandle> {
        let handle = SubscriptionHandle::new();
        if subscription.limit == Some(0) {
            handle.unsubscribe();
            return Ok(handle);
        }
        let mut subscribers = self.subscribers()?;
        let backlog: Vec<TopicMessage> = {
            let state = self.state()?;
            let topic = state.topics.get(&subscription.topic_id).ok_or_else(|| {
                query_failure(
                    Status::InvalidTopicId,
                    format!("no topic {}", subscription.topic_id),
                )
            })?;
            topic
                .messages
                .iter()
                .filter(|message| {
                    subscription
                        .start_time
                        .is_none_or(|start| message.consensus_timestamp >= start)
                })
                .cloned()
                .collect()
        };
        let mut subscriber = Subscriber {
            topic_id: subscription.topic_id,
            handler,
            handle: handle.clone(),
            remaining: subscription.limit,
        };
        for message in &backlog {
            if !subscriber.deliver(message) {
                return Ok(handle);
            }
        }
        subscribers.push(subscriber);
        Ok(handle)
    }
}

impl LocalAccount {
    fn new(key: PublicKey, balance: Hbar) -> Self {
        Self {
            key,
            balance,
            deleted: false,
            tokens: BTreeMap::new(),
        }
    }
}

impl LedgerState {
    fn next_entity_num(&mut self) -> u64 {
        let num = self.next_num;
        self.next_num += 1;
        num
    }

    fn next_consensus_timestamp(&mut self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let timestamp = match self.last_consensus {
            Some(last) if now <= last => last + time::Duration::nanoseconds(1),
            _ => now,
        };
        self.last_consensus = Some(timestamp);
        timestamp
    }

    fn live_account(&mut self, account_id: AccountId) -> Result<&mut LocalAccount, Status> {
        match self.accounts.get_mut(&account_id) {
            None => Err(Status::InvalidAccountId),
            Some(account) if account.deleted => Err(Status::AccountDeleted),
            Some(account) => Ok(account),
        }
    }

    fn live_file(&self, file_id: FileId) -> Result<&LocalFile, Status> {
        match self.files.get(&file_id) {
            None => Err(Status::InvalidFileId),
            Some(file) if file.deleted => Err(Status::FileDeleted),
            Some(file) => Ok(file),
        }
    }

    fn live_file_mut(&mut self, file_id: FileId) -> Result<&mut LocalFile, Status> {
        match self.files.get_mut(&file_id) {
            None => Err(Status::InvalidFileId),
            Some(file) if file.deleted => Err(Status::FileDeleted),
            Some(file) => Ok(file),
        }
    }

    fn live_contract(&mut self, contract_id: ContractId) -> Result<&mut LocalContract, Status> {
        match self.contracts.get_mut(&contract_id) {
            None => Err(Status::InvalidContractId),
            Some(contract) if contract.deleted => Err(Status::ContractDeleted),
            Some(contract) => Ok(contract),
        }
    }

    fn live_topic(&mut self, topic_id: TopicId) -> Result<&mut LocalTopic, Status> {
        match self.topics.get_mut(&topic_id) {
            Some(topic) if !topic.deleted => Ok(topic),
            _ => Err(Status::InvalidTopicId),
        }
    }

    fn debit(&mut self, account_id: AccountId, amount: Hbar) -> Applied {
        let account = self.live_account(account_id)?;
        account.balance = account
            .balance
            .checked_sub(amount)
            .filter(|balance| !balance.is_negative())
            .ok_or(Status::InsufficientPayerBalance)?;
        Ok(())
    }

    fn credit(&mut self, account_id: AccountId, amount: Hbar) -> Applied {
        let account = self.live_account(account_id)?;
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(Status::InvalidAccountAmounts)?;
        Ok(())
    }

    fn apply(
        &mut self,
        envelope: &TransactionEnvelope,
        consensus: OffsetDateTime,
        receipt: &mut TransactionReceipt,
    ) -> Applied {
        let payer = envelope.transaction_id.account_id;
        self.live_account(payer).map_err(|_| Status::InvalidAccountId)?;

        match &envelope.body {
            TransactionBody::AccountCreate {
                key,
                initial_balance,
                ..
            } => {
                self.debit(payer, *initial_balance)?;
                let account_id = AccountId::from_num(self.next_entity_num());
                self.accounts
                    .insert(account_id, LocalAccount::new(key.clone(), *initial_balance));
                receipt.account_id = Some(account_id);
            }
            TransactionBody::AccountDelete {
                account_id,
                transfer_account_id,
            } => {
                if account_id == transfer_account_id {
                    return Err(Status::TransferAccountSameAsDeleteAccount);
                }
                self.live_account(*transfer_account_id)
                    .map_err(|_| Status::InvalidTransferAccountId)?;
                let account = self.live_account(*account_id)?;
                let remaining = account.balance;
                account.balance = Hbar::ZERO;
                account.deleted = true;
                self.credit(*transfer_account_id, remaining)?;
            }
            TransactionBody::FileCreate {
                contents,
                keys,
                memo,
                expiration_time,
            } => {
                let file_id = FileId::from_num(self.next_entity_num());
                self.files.insert(
                    file_id,
                    LocalFile {
                        contents: BytesMut::from(&contents[..]),
                        keys: keys.clone(),
                        memo: memo.clone(),
                        expiration_time: expiration_time.unwrap_or(consensus + DEFAULT_FILE_LIFETIME),
                        deleted: false,
                    },
                );
                receipt.file_id = Some(file_id);
            }
            TransactionBody::FileAppend { file_id, contents } => {
                self.live_file_mut(*file_id)?.contents.extend_from_slice(contents);
            }
            TransactionBody::FileUpdate {
                file_id,
                contents,
                memo,
                expiration_time,
            } => {
                let file = self.live_file_mut(*file_id)?;
                if let Some(contents) = contents {
                    file.contents = BytesMut::from(&contents[..]);
                }
                if let Some(memo) = memo {
                    file.memo = Some(memo.clone());
                }
                if let Some(expiration_time) = expiration_time {
                    file.expiration_time = *expiration_time;
                }
            }
            TransactionBody::FileDelete { file_id } => {
                let file = self.live_file_mut(*file_id)?;
                file.deleted = true;
                file.contents.clear();
            }
            TransactionBody::ContractCreate {
                bytecode_file_id,
                initial_balance,
                ..
            } => {
                if self.live_file(*bytecode_file_id)?.contents.is_empty() {
                    return Err(Status::InvalidFileId);
                }
                self.debit(payer, *initial_balance)?;
                let contract_id = ContractId::from_num(self.next_entity_num());
                self.contracts.insert(
                    contract_id,
                    LocalContract {
                        balance: *initial_balance,
                        deleted: false,
                    },
                );
                receipt.contract_id = Some(contract_id);
            }
            TransactionBody::ContractCall {
                contract_id,
                gas,
                function_parameters,
                payable_amount,
            } => {
                self.live_contract(*contract_id)?;
                let gas_used = BASE_CALL_GAS
                    .saturating_add(GAS_PER_PARAMETER_BYTE.saturating_mul(function_parameters.len() as u64));
                if gas_used > *gas {
                    return Err(Status::ContractExecutionException);
                }
                self.debit(payer, *payable_amount)?;
                let contract = self.live_contract(*contract_id)?;
                contract.balance = contract
                    .balance
                    .checked_add(*payable_amount)
                    .ok_or(Status::InvalidAccountAmounts)?;
                receipt.contract_id = Some(*contract_id);
                receipt.contract_call = Some(ContractCallOutput {
                    gas_used,
                    result: Bytes::new(),
                });
            }
            TransactionBody::ContractDelete {
                contract_id,
                transfer_account_id,
            } => {
                self.live_account(*transfer_account_id)
                    .map_err(|_| Status::InvalidTransferAccountId)?;
                let contract = self.live_contract(*contract_id)?;
                let remaining = contract.balance;
                contract.balance = Hbar::ZERO;
                contract.deleted = true;
                self.credit(*transfer_account_id, remaining)?;
            }
            TransactionBody::TokenCreate(definition) => {
                let treasury = definition.treasury_account_id;
                self.live_account(treasury)?;
                let token_id = TokenId::from_num(self.next_entity_num());
                let account = self.live_account(treasury)?;
                account.tokens.insert(token_id, definition.initial_supply);
                self.tokens.insert(
                    token_id,
                    LocalToken {
                        definition: definition.clone(),
                        total_supply: definition.initial_supply,
                        next_serial: 1,
                        nft_owners: BTreeMap::new(),
                    },
                );
                receipt.token_id = Some(token_id);
                receipt.total_supply = Some(definition.initial_supply);
            }
            TransactionBody::TokenAssociate {
                account_id,
                token_ids,
            } => {
                if let Some(missing) = token_ids.iter().find(|id| !self.tokens.contains_key(id)) {
                    tracing::debug!(token_id = %missing, "association with unknown token");
                    return Err(Status::InvalidTokenId);
                }
                let account = self.live_account(*account_id)?;
                if token_ids.iter().any(|id| account.tokens.contains_key(id)) {
                    return Err(Status::TokenAlreadyAssociatedToAccount);
                }
                for token_id in token_ids {
                    account.tokens.insert(*token_id, 0);
                }
            }
            TransactionBody::TokenDissociate {
                account_id,
                token_ids,
            } => {
                let account = self.live_account(*account_id)?;
                if token_ids.iter().any(|id| !account.tokens.contains_key(id)) {
                    return Err(Status::TokenNotAssociatedToAccount);
                }
                if token_ids.iter().any(|id| account.tokens.get(id).copied().unwrap_or(0) > 0) {
                    return Err(Status::InsufficientTokenBalance);
                }
                for token_id in token_ids {
                    account.tokens.remove(token_id);
                }
            }
            TransactionBody::TokenMint {
                token_id,
                amount,
                metadata,
            } => self.mint(*token_id, *amount, metadata, receipt)?,
            TransactionBody::TokenBurn {
                token_id,
                amount,
                serial_numbers,
            } => self.burn(*token_id, *amount, serial_numbers, receipt)?,
            TransactionBody::TokenTransfer {
                token_id,
                sender,
                receiver,
                movement,
            } => self.transfer(*token_id, *sender, *receiver, *movement)?,
            TransactionBody::TopicCreate {
                admin_key,
                submit_key,
                memo,
                auto_renew_account,
                auto_renew_period,
            } => {
                if let Some(account_id) = auto_renew_account {
                    self.live_account(*account_id)?;
                }
                let topic_id = TopicId::from_num(self.next_entity_num());
                self.topics.insert(
                    topic_id,
                    LocalTopic {
                        admin_key: admin_key.clone(),
                        submit_key: submit_key.clone(),
                        memo: memo.clone(),
                        auto_renew_account: *auto_renew_account,
                        auto_renew_period: *auto_renew_period,
                        created: consensus,
                        deleted: false,
                        running_hash: vec![0; 48],
                        messages: Vec::new(),
                    },
                );
                receipt.topic_id = Some(topic_id);
            }
            TransactionBody::TopicUpdate {
                topic_id,
                memo,
                admin_key,
                submit_key,
            } => {
                let topic = self.live_topic(*topic_id)?;
                if topic.admin_key.is_none() {
                    return Err(Status::Unauthorized);
                }
                if let Some(memo) = memo {
                    topic.memo = Some(memo.clone());
                }
                if let Some(admin_key) = admin_key {
                    topic.admin_key = Some(admin_key.clone());
                }
                if let Some(submit_key) = submit_key {
                    topic.submit_key = Some(submit_key.clone());
                }
            }
            TransactionBody::TopicDelete { topic_id } => {
                let topic = self.live_topic(*topic_id)?;
                if topic.admin_key.is_none() {
                    return Err(Status::Unauthorized);
                }
                topic.deleted = true;
            }
            TransactionBody::TopicSubmitMessage { topic_id, message } => {
                if message.is_empty() {
                    return Err(Status::InvalidTopicMessage);
                }
                if message.len() > MAX_TOPIC_MESSAGE_BYTES {
                    return Err(Status::MessageSizeTooLarge);
                }
                let payer_key = self.live_account(payer)?.key.clone();
                let topic = self.live_topic(*topic_id)?;
                if topic.submit_key.as_ref().is_some_and(|key| *key != payer_key) {
                    return Err(Status::InvalidSignature);
                }
                let sequence_number = topic.messages.len() as u64 + 1;
                let running_hash = next_running_hash(
                    &topic.running_hash,
                    payer,
                    *topic_id,
                    consensus,
                    sequence_number,
                    message,
                );
                topic.running_hash = running_hash.clone();
                topic.messages.push(TopicMessage {
                    topic_id: *topic_id,
                    sequence_number,
                    consensus_timestamp: consensus,
                    message: message.clone(),
                    running_hash: running_hash.clone(),
                    running_hash_version: RUNNING_HASH_VERSION as u32,
                    payer_account_id: Some(payer),
                    chunk_info: None,
                });
                receipt.topic_id = Some(*topic_id);
                receipt.topic_sequence_number = Some(sequence_number);
                receipt.topic_running_hash = Some(running_hash);
            }
        }
        Ok(())
    }

    fn mint(
        &mut self,
        token_id: TokenId,
        amount: u64,
        metadata: &[Bytes],
        receipt: &mut TransactionReceipt,
    ) -> Applied {
        let token = self.tokens.get_mut(&token_id).ok_or(Status::InvalidTokenId)?;
        if token.definition.supply_key.is_none() {
            return Err(Status::TokenHasNoSupplyKey);
        }
        let treasury = token.definition.treasury_account_id;
        let minted = match token.definition.token_type {
            TokenType::FungibleCommon if amount > 0 && metadata.is_empty() => amount,
            TokenType::NonFungibleUnique if amount == 0 && !metadata.is_empty() => {
                metadata.len() as u64
            }
            _ => return Err(Status::InvalidTokenMintAmount),
        };
        let total_supply = token
            .total_supply
            .checked_add(minted)
            .ok_or(Status::InvalidTokenMintAmount)?;
        if token.definition.supply_type == SupplyType::Finite
            && total_supply > token.definition.max_supply
        {
            return Err(Status::TokenMaxSupplyReached);
        }
        let mut serials = Vec::with_capacity(metadata.len());
        for _ in metadata {
            let serial = token.next_serial;
            token.next_serial += 1;
            token.nft_owners.insert(serial, treasury);
            serials.push(serial);
        }
        token.total_supply = total_supply;

        let held = self
            .live_account(treasury)?
            .tokens
            .entry(token_id)
            .or_insert(0);
        *held = held.saturating_add(minted);
        receipt.token_id = Some(token_id);
        receipt.total_supply = Some(total_supply);
        receipt.serial_numbers = serials;
        Ok(())
    }

    fn burn(
        &mut self,
        token_id: TokenId,
        amount: u64,
        serial_numbers: &[i64],
        receipt: &mut TransactionReceipt,
    ) -> Applied {
        let token = self.tokens.get_mut(&token_id).ok_or(Status::InvalidTokenId)?;
        if token.definition.supply_key.is_none() {
            return Err(Status::TokenHasNoSupplyKey);
        }
        let treasury = token.definition.treasury_account_id;
        let burned = match token.definition.token_type {
            TokenType::FungibleCommon if amount > 0 && serial_numbers.is_empty() => amount,
            TokenType::NonFungibleUnique if amount == 0 && !serial_numbers.is_empty() => {
                if serial_numbers
                    .iter()
                    .any(|serial| token.nft_owners.get(serial) != Some(&treasury))
                {
                    return Err(Status::InvalidNftId);
                }
                for serial in serial_numbers {
                    token.nft_owners.remove(serial);
                }
                serial_numbers.len() as u64
            }
            _ => return Err(Status::InvalidTokenBurnAmount),
        };
        let total_supply = token
            .total_supply
            .checked_sub(burned)
            .ok_or(Status::InvalidTokenBurnAmount)?;
        let held = self
            .live_account(treasury)?
            .tokens
            .get_mut(&token_id)
            .ok_or(Status::TokenNotAssociatedToAccount)?;
        *held = held.checked_sub(burned).ok_or(Status::InsufficientTokenBalance)?;
        if let Some(token) = self.tokens.get_mut(&token_id) {
            token.total_supply = total_supply;
        }
        receipt.token_id = Some(token_id);
        receipt.total_supply = Some(total_supply);
        Ok(())
    }

    fn transfer(
        &mut self,
        token_id: TokenId,
        sender: AccountId,
        receiver: AccountId,
        movement: TokenMovement,
    ) -> Applied {
        let token = self.tokens.get(&token_id).ok_or(Status::InvalidTokenId)?;
        let units = match (token.definition.token_type, movement) {
            (TokenType::FungibleCommon, TokenMovement::Fungible { amount }) => amount,
            (TokenType::NonFungibleUnique, TokenMovement::Nft { serial_number }) => {
                if token.nft_owners.get(&serial_number) != Some(&sender) {
                    return Err(Status::InvalidNftId);
                }
                1
            }
            _ => return Err(Status::InvalidAccountAmounts),
        };
        if !self.live_account(receiver)?.tokens.contains_key(&token_id) {
            return Err(Status::TokenNotAssociatedToAccount);
        }
        let sent = self
            .live_account(sender)?
            .tokens
            .get_mut(&token_id)
            .ok_or(Status::TokenNotAssociatedToAccount)?;
        *sent = sent.checked_sub(units).ok_or(Status::InsufficientTokenBalance)?;
        let received = self
            .live_account(receiver)?
            .tokens
            .entry(token_id)
            .or_insert(0);
        *received = received.saturating_add(units);
        if let (TokenMovement::Nft { serial_number }, Some(token)) =
            (movement, self.tokens.get_mut(&token_id))
        {
            token.nft_owners.insert(serial_number, receiver);
        }
        Ok(())
    }
}

/// SHA-384 chain over the previous hash, the message's identity and a digest of its contents.
fn next_running_hash(
    previous: &[u8],
    payer: AccountId,
    topic_id: TopicId,
    consensus: OffsetDateTime,
    sequence_number: u64,
    message: &[u8],
) -> Vec<u8> {
    let payer = payer.entity();
    let topic = topic_id.entity();
    let mut hasher = Sha384::new();
    hasher.update(previous);
    hasher.update(RUNNING_HASH_VERSION.to_be_bytes());
    for part in [payer.shard, payer.realm, payer.num, topic.shard, topic.realm, topic.num] {
        hasher.update(part.to_be_bytes());
    }
    hasher.update(consensus.unix_timestamp().to_be_bytes());
    hasher.update((consensus.nanosecond() as i32).to_be_bytes());
    hasher.update(sequence_number.to_be_bytes());
    hasher.update(Sha384::digest(message));
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::core::key::{KeyAlgorithm, PrivateKey};
    use crate::protocol::account::{AccountBalanceRequest, AccountCreateRequest};
    use crate::protocol::client::ProtocolClient;
    use crate::protocol::contract::{ContractCallRequest, ContractCreateRequest};
    use crate::protocol::file::{FileAppendRequest, FileContentsRequest, FileCreateRequest};
    use crate::protocol::token::{
        TokenAssociateRequest, TokenCreateRequest, TokenMintRequest, TokenTransferRequest,
    };
    use crate::protocol::topic::{
        TopicCreateRequest, TopicMessageQueryRequest, TopicSubmitMessageRequest,
    };

    fn key(byte: u8) -> PublicKey {
        PublicKey::from_bytes(KeyAlgorithm::Ed25519, &[byte; 32]).expect("key")
    }

    fn operator() -> Operator {
        Operator::new(
            AccountId::from_num(2),
            PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[1; 32]).expect("private"),
            key(2),
        )
        .expect("operator")
    }

    fn client() -> (Arc<LocalLedger>, ProtocolClient) {
        let ledger = Arc::new(LocalLedger::new(&operator(), Hbar::new(1_000)));
        let client = ProtocolClient::new(operator(), Arc::clone(&ledger) as Arc<dyn LedgerNetwork>);
        (ledger, client)
    }

    #[test]
    fn topic_messages_get_sequence_numbers_and_chained_hashes() {
        let (ledger, client) = client();
        let topic = client.execute(&TopicCreateRequest::of()).expect("topic").topic_id;
        assert_eq!(topic, TopicId::from_num(FIRST_ENTITY_NUM));

        let first = client
            .execute(&TopicSubmitMessageRequest::of_text(topic, "one").expect("request"))
            .expect("first");
        let second = client
            .execute(&TopicSubmitMessageRequest::of_text(topic, "two").expect("request"))
            .expect("second");
        assert_eq!(first.sequence_number, 1);
        assert_eq!(second.sequence_number, 2);
        assert_eq!(first.running_hash.len(), 48);
        assert_ne!(first.running_hash, second.running_hash);

        let stored = ledger.topic_message(topic, 1).expect("state").expect("message");
        assert_eq!(stored.message, Bytes::from_static(b"one"));
        assert!(ledger.topic_message(topic, 0).expect("state").is_none());

        let queried = client
            .execute(&TopicMessageQueryRequest::of(topic).with_limit(1).expect("limit"))
            .expect("query");
        assert_eq!(queried.messages.len(), 1);
        assert_eq!(queried.messages[0].sequence_number, 1);
    }

    #[test]
    fn subscription_replays_then_streams_until_limit() {
        let (_ledger, client) = client();
        let topic = client.execute(&TopicCreateRequest::of()).expect("topic").topic_id;
        client
            .execute(&TopicSubmitMessageRequest::of_text(topic, "backlog").expect("request"))
            .expect("submit");

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let handle = client
            .subscribe_topic_messages(TopicSubscription::new(topic).with_limit(2), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .expect("subscribe");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(handle.is_active());

        for text in ["live", "ignored"] {
            client
                .execute(&TopicSubmitMessageRequest::of_text(topic, text).expect("request"))
                .expect("submit");
        }
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(!handle.is_active());
    }

    #[test]
    fn submit_key_restricts_publishers() {
        let (ledger, client) = client();
        let topic = client
            .execute(&TopicCreateRequest::of_keys(key(2), key(8)))
            .expect("topic")
            .topic_id;
        let err = client
            .execute(&TopicSubmitMessageRequest::of_text(topic, "hi").expect("request"))
            .expect_err("wrong submit key");
        assert_eq!(err.status(), Some(Status::InvalidSignature));

        client
            .execute(
                &crate::protocol::topic::TopicUpdateRequest::of_submit_key(topic, key(2)),
            )
            .expect("update");
        client
            .execute(&TopicSubmitMessageRequest::of_text(topic, "hi").expect("request"))
            .expect("submit");
        let described = ledger.topic(topic).expect("state").expect("topic");
        assert_eq!(described.submit_key, Some(key(2)));
    }

    #[test]
    fn public_topic_cannot_be_updated() {
        let (ledger, client) = client();
        let topic = client.execute(&TopicCreateRequest::public()).expect("topic").topic_id;
        assert_eq!(ledger.topic(topic).expect("state").expect("topic").admin_key, None);
        let err = client
            .execute(&crate::protocol::topic::TopicDeleteRequest::of(topic))
            .expect_err("no admin key");
        assert_eq!(err.kind(), ErrorKind::OperationFailure);
        assert_eq!(err.status(), Some(Status::Unauthorized));
    }

    #[test]
    fn account_create_moves_the_initial_balance() {
        let (ledger, client) = client();
        let created = client
            .execute(&AccountCreateRequest::of_balance(key(9), Hbar::new(25)).expect("request"))
            .expect("create");
        assert_eq!(ledger.hbar_balance(created.account_id).expect("state"), Some(Hbar::new(25)));
        let operator_balance = client
            .execute(&AccountBalanceRequest::of_operator())
            .expect("balance");
        assert_eq!(operator_balance.hbars, Hbar::new(975));

        let err = client
            .execute(&AccountCreateRequest::of_balance(key(9), Hbar::new(5_000)).expect("request"))
            .expect_err("overdraw");
        assert_eq!(err.status(), Some(Status::InsufficientPayerBalance));
    }

    #[test]
    fn files_append_and_back_contracts() {
        let (_ledger, client) = client();
        let file = client
            .execute(&FileCreateRequest::of(&b"60806040"[..]).expect("request"))
            .expect("create")
            .file_id;
        client
            .execute(&FileAppendRequest::of(file, &b"5234"[..]).expect("request"))
            .expect("append");
        let contents = client.execute(&FileContentsRequest::of(file)).expect("contents");
        assert_eq!(contents.contents, Bytes::from_static(b"608060405234"));

        let contract = client
            .execute(&ContractCreateRequest::of(file))
            .expect("contract")
            .contract_id;
        let call = client
            .execute(&ContractCallRequest::of(contract, vec![0u8; 4]))
            .expect("call");
        assert_eq!(call.gas_used, BASE_CALL_GAS + 4 * GAS_PER_PARAMETER_BYTE);
    }

    #[test]
    fn nft_mint_and_transfer_track_owners() {
        let (_ledger, client) = client();
        let receiver = client
            .execute(&AccountCreateRequest::of(key(7)))
            .expect("account")
            .account_id;
        let token = client
            .execute(&TokenCreateRequest::non_fungible("Art", "ART").expect("request"))
            .expect("token")
            .token_id;
        let minted = client
            .execute(
                &TokenMintRequest::nft(token, vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")])
                    .expect("request"),
            )
            .expect("mint");
        assert_eq!(minted.serial_numbers, vec![1, 2]);
        assert_eq!(minted.total_supply, 2);

        let transfer = TokenTransferRequest::nft(token, 1, receiver).expect("request");
        let err = client.execute(&transfer).expect_err("not associated");
        assert_eq!(err.status(), Some(Status::TokenNotAssociatedToAccount));

        client
            .execute(&TokenAssociateRequest::of_account(receiver, token))
            .expect("associate");
        client.execute(&transfer).expect("transfer");
        let balance = client
            .execute(&AccountBalanceRequest::of(receiver))
            .expect("balance");
        assert_eq!(balance.token_balance(token), Some(1));
    }

    #[test]
    fn finite_supply_caps_minting() {
        let (_ledger, client) = client();
        let token = client
            .execute(&TokenCreateRequest::fungible_finite("Gold", "GLD", 2, 90, 100).expect("request"))
            .expect("token")
            .token_id;
        let err = client
            .execute(&TokenMintRequest::fungible(token, 11).expect("request"))
            .expect_err("over max");
        assert_eq!(err.status(), Some(Status::TokenMaxSupplyReached));
        let minted = client
            .execute(&TokenMintRequest::fungible(token, 10).expect("request"))
            .expect("mint");
        assert_eq!(minted.total_supply, 100);
    }
}

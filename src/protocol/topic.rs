//! Purpose: Consensus topic operations.
//! Exports: Topic create/update/delete, submit-message and message-query requests and results.
//! Role: Layered factories over `TransactionOptions` defaults.
//! Invariants: Memos are at most 100 bytes; messages are 1..=1024 bytes.
use std::time::Duration;

use bytes::Bytes;
use time::OffsetDateTime;

use crate::config::Operator;
use crate::core::entity::{AccountId, TopicId, TransactionId};
use crate::core::error::{ApiResult, Error};
use crate::core::key::PublicKey;
use crate::core::status::Status;
use crate::domain::TopicMessage;
use crate::protocol::network::{LedgerQuery, QueryResponse, TransactionBody};
use crate::protocol::options::{
    KeySource, MAX_TOPIC_MESSAGE_BYTES, QueryOptions, TransactionOptions, check_max_len, check_memo,
    check_not_empty,
};
use crate::protocol::request::{
    Operation, OperationKind, Outcome, Request, required, unexpected_response,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicCreateRequest {
    admin_key: KeySource,
    submit_key: Option<PublicKey>,
    memo: Option<String>,
    auto_renew_account: Option<AccountId>,
    auto_renew_period: Option<Duration>,
    options: TransactionOptions,
}

impl Default for TopicCreateRequest {
    fn default() -> Self {
        Self {
            admin_key: KeySource::Operator,
            submit_key: None,
            memo: None,
            auto_renew_account: None,
            auto_renew_period: None,
            options: TransactionOptions::default(),
        }
    }
}

impl TopicCreateRequest {
    /// Administered by the operator key; anyone may submit.
    pub fn of() -> Self {
        Self::default()
    }

    /// No admin key: anyone may submit and nobody may update or delete it.
    pub fn public() -> Self {
        Self {
            admin_key: KeySource::None,
            ..Self::default()
        }
    }

    pub fn of_admin_key(admin_key: PublicKey) -> Self {
        Self {
            admin_key: KeySource::Key(admin_key),
            ..Self::default()
        }
    }

    pub fn of_keys(admin_key: PublicKey, submit_key: PublicKey) -> Self {
        Self {
            admin_key: KeySource::Key(admin_key),
            submit_key: Some(submit_key),
            ..Self::default()
        }
    }

    pub fn of_keys_and_memo(
        admin_key: PublicKey,
        submit_key: Option<PublicKey>,
        memo: impl Into<String>,
    ) -> ApiResult<Self> {
        let memo = memo.into();
        check_memo(&memo, "topic memo")?;
        Ok(Self {
            admin_key: KeySource::Key(admin_key),
            submit_key,
            memo: Some(memo),
            ..Self::default()
        })
    }

    pub fn with_auto_renew(mut self, account_id: AccountId, period: Duration) -> ApiResult<Self> {
        if period.is_zero() {
            return Err(Error::invalid_argument("auto renew period must be positive"));
        }
        self.auto_renew_account = Some(account_id);
        self.auto_renew_period = Some(period);
        Ok(self)
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn admin_key(&self) -> &KeySource {
        &self.admin_key
    }

    pub fn submit_key(&self) -> Option<&PublicKey> {
        self.submit_key.as_ref()
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }

    pub fn options(&self) -> &TransactionOptions {
        &self.options
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicCreateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub topic_id: TopicId,
}

impl Request for TopicCreateRequest {
    type Output = TopicCreateResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TopicCreate
    }

    fn operation(&self, operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::TopicCreate {
                admin_key: self.admin_key.resolve(operator),
                submit_key: self.submit_key.clone(),
                memo: self.memo.clone(),
                auto_renew_account: self.auto_renew_account,
                auto_renew_period: self.auto_renew_period,
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::TopicCreate;
        let receipt = outcome.into_receipt(kind)?;
        Ok(TopicCreateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            topic_id: required(receipt.topic_id, &receipt, kind, "topic id")?,
        })
    }
}

/// Changes a topic's memo or keys. Unset fields stay as they are.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicUpdateRequest {
    topic_id: TopicId,
    memo: Option<String>,
    admin_key: Option<PublicKey>,
    submit_key: Option<PublicKey>,
    options: TransactionOptions,
}

impl TopicUpdateRequest {
    pub fn of_memo(topic_id: TopicId, memo: impl Into<String>) -> ApiResult<Self> {
        let memo = memo.into();
        check_memo(&memo, "topic memo")?;
        Ok(Self {
            memo: Some(memo),
            ..Self::empty(topic_id)
        })
    }

    pub fn of_submit_key(topic_id: TopicId, submit_key: PublicKey) -> Self {
        Self {
            submit_key: Some(submit_key),
            ..Self::empty(topic_id)
        }
    }

    pub fn of_keys(topic_id: TopicId, admin_key: PublicKey, submit_key: PublicKey) -> Self {
        Self {
            admin_key: Some(admin_key),
            submit_key: Some(submit_key),
            ..Self::empty(topic_id)
        }
    }

    fn empty(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            memo: None,
            admin_key: None,
            submit_key: None,
            options: TransactionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn topic_id(&self) -> TopicId {
        self.topic_id
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicUpdateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

impl Request for TopicUpdateRequest {
    type Output = TopicUpdateResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TopicUpdate
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::TopicUpdate {
                topic_id: self.topic_id,
                memo: self.memo.clone(),
                admin_key: self.admin_key.clone(),
                submit_key: self.submit_key.clone(),
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let receipt = outcome.into_receipt(OperationKind::TopicUpdate)?;
        Ok(TopicUpdateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicDeleteRequest {
    topic_id: TopicId,
    options: TransactionOptions,
}

impl TopicDeleteRequest {
    pub fn of(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            options: TransactionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicDeleteResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

impl Request for TopicDeleteRequest {
    type Output = TopicDeleteResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TopicDelete
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::TopicDelete {
                topic_id: self.topic_id,
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let receipt = outcome.into_receipt(OperationKind::TopicDelete)?;
        Ok(TopicDeleteResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicSubmitMessageRequest {
    topic_id: TopicId,
    message: Bytes,
    options: TransactionOptions,
}

impl TopicSubmitMessageRequest {
    pub fn of(topic_id: TopicId, message: impl Into<Bytes>) -> ApiResult<Self> {
        let message = message.into();
        check_not_empty(message.len(), "topic message")?;
        check_max_len(message.len(), MAX_TOPIC_MESSAGE_BYTES, "topic message")?;
        Ok(Self {
            topic_id,
            message,
            options: TransactionOptions::default(),
        })
    }

    pub fn of_text(topic_id: TopicId, text: &str) -> ApiResult<Self> {
        Self::of(topic_id, Bytes::copy_from_slice(text.as_bytes()))
    }

    pub fn with_options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn message(&self) -> &Bytes {
        &self.message
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicSubmitMessageResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub sequence_number: u64,
    pub running_hash: Vec<u8>,
}

impl Request for TopicSubmitMessageRequest {
    type Output = TopicSubmitMessageResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TopicSubmitMessage
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Transaction {
            body: TransactionBody::TopicSubmitMessage {
                topic_id: self.topic_id,
                message: self.message.clone(),
            },
            options: self.options.clone(),
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::TopicSubmitMessage;
        let receipt = outcome.into_receipt(kind)?;
        Ok(TopicSubmitMessageResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            sequence_number: required(receipt.topic_sequence_number, &receipt, kind, "sequence number")?,
            running_hash: required(receipt.topic_running_hash.clone(), &receipt, kind, "running hash")?,
        })
    }
}

/// Historical messages of one topic, in consensus order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicMessageQueryRequest {
    topic_id: TopicId,
    start_time: Option<OffsetDateTime>,
    end_time: Option<OffsetDateTime>,
    limit: Option<u64>,
    options: QueryOptions,
}

impl TopicMessageQueryRequest {
    pub fn of(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            start_time: None,
            end_time: None,
            limit: None,
            options: QueryOptions::default(),
        }
    }

    pub fn of_range(
        topic_id: TopicId,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> ApiResult<Self> {
        if end_time < start_time {
            return Err(Error::invalid_argument(
                "topic message query ends before it starts",
            ));
        }
        Ok(Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Self::of(topic_id)
        })
    }

    pub fn with_limit(mut self, limit: u64) -> ApiResult<Self> {
        if limit == 0 {
            return Err(Error::invalid_argument("message limit must be positive"));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicMessageQueryResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub messages: Vec<TopicMessage>,
}

impl Request for TopicMessageQueryRequest {
    type Output = TopicMessageQueryResult;

    fn kind(&self) -> OperationKind {
        OperationKind::TopicMessageQuery
    }

    fn operation(&self, _operator: &Operator) -> ApiResult<Operation> {
        Ok(Operation::Query {
            query: LedgerQuery::TopicMessages {
                topic_id: self.topic_id,
                start_time: self.start_time,
                end_time: self.end_time,
                limit: self.limit,
            },
            options: self.options,
        })
    }

    fn output(outcome: Outcome) -> ApiResult<Self::Output> {
        let kind = OperationKind::TopicMessageQuery;
        match outcome.into_response(kind)? {
            (transaction_id, QueryResponse::TopicMessages(messages)) => {
                Ok(TopicMessageQueryResult {
                    transaction_id,
                    status: Status::Ok,
                    messages,
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
    use crate::core::key::KeyAlgorithm;
    use crate::protocol::options::{DEFAULT_MAX_TRANSACTION_FEE, DEFAULT_VALID_DURATION};

    fn key(byte: u8) -> PublicKey {
        PublicKey::from_bytes(KeyAlgorithm::Ed25519, &[byte; 32]).expect("key")
    }

    #[test]
    fn admin_key_factory_leaves_the_rest_default() {
        let request = TopicCreateRequest::of_admin_key(key(1));
        assert_eq!(request.admin_key(), &KeySource::Key(key(1)));
        assert_eq!(request.submit_key(), None);
        assert_eq!(request.memo(), None);
        assert_eq!(request.options().max_fee(), DEFAULT_MAX_TRANSACTION_FEE);
        assert_eq!(request.options().valid_duration(), DEFAULT_VALID_DURATION);
    }

    #[test]
    fn shortest_factory_uses_the_operator_admin_key() {
        let operator = Operator::new(
            AccountId::from_num(2),
            crate::core::key::PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[1; 32]).expect("private"),
            key(3),
        )
        .expect("operator");
        let admin_key = |request: &TopicCreateRequest| match request.operation(&operator) {
            Ok(Operation::Transaction {
                body: TransactionBody::TopicCreate { admin_key, .. },
                ..
            }) => admin_key,
            other => panic!("unexpected operation {other:?}"),
        };
        assert_eq!(TopicCreateRequest::of().admin_key(), &KeySource::Operator);
        assert_eq!(admin_key(&TopicCreateRequest::of()), Some(key(3)));
        assert_eq!(admin_key(&TopicCreateRequest::public()), None);
    }

    #[test]
    fn layered_factories_add_fields() {
        let request = TopicCreateRequest::of_keys_and_memo(key(1), Some(key(2)), "orders")
            .expect("request");
        assert_eq!(request.submit_key(), Some(&key(2)));
        assert_eq!(request.memo(), Some("orders"));
        let err = TopicCreateRequest::of_keys_and_memo(key(1), None, "x".repeat(101))
            .expect_err("memo");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn message_size_is_bounded() {
        let topic = TopicId::from_num(5);
        let err = TopicSubmitMessageRequest::of(topic, Bytes::new()).expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = TopicSubmitMessageRequest::of(topic, vec![0u8; 1025]).expect_err("large");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(TopicSubmitMessageRequest::of(topic, vec![0u8; 1024]).is_ok());
    }

    #[test]
    fn query_range_must_be_ordered() {
        let start = OffsetDateTime::from_unix_timestamp(1_700_000_100).expect("start");
        let end = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("end");
        let err = TopicMessageQueryRequest::of_range(TopicId::from_num(5), start, end)
            .expect_err("reversed");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}

//! Purpose: Execute ledger operations on behalf of one operator account.
//! Exports: `ProtocolClient`.
//! Role: Assigns transaction ids, forwards to `LedgerNetwork`, notifies listeners, types the result.
//! Invariants: Invalid requests fail before any network call or listener notification.
//! Invariants: Every submitted operation produces exactly one `Submitted` and one `Completed` event.
//! Invariants: Nothing is retried here; a failed call surfaces as `OperationFailure`.
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

use crate::config::{LedgerConfig, Operator};
use crate::core::entity::TransactionId;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::domain::TopicMessage;
use crate::protocol::listener::{
    ListenerRegistration, ListenerRegistry, TransactionEvent, TransactionListener,
};
use crate::protocol::network::{
    LedgerNetwork, QueryEnvelope, SubscriptionHandle, TopicSubscription, TransactionEnvelope,
};
use crate::protocol::request::{Operation, OperationKind, Outcome, Request};

pub struct ProtocolClient {
    operator: Operator,
    network: Arc<dyn LedgerNetwork>,
    listeners: ListenerRegistry,
    last_valid_start: AtomicI64,
}

impl fmt::Debug for ProtocolClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolClient")
            .field("operator", &self.operator.account_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ProtocolClient {
    pub fn new(operator: Operator, network: Arc<dyn LedgerNetwork>) -> Self {
        Self {
            operator,
            network,
            listeners: ListenerRegistry::default(),
            last_valid_start: AtomicI64::new(0),
        }
    }

    pub fn from_config(config: &LedgerConfig, network: Arc<dyn LedgerNetwork>) -> Self {
        Self::new(config.operator.clone(), network)
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn add_listener(&self, listener: impl TransactionListener + 'static) -> ListenerRegistration {
        self.listeners.add(Arc::new(listener))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Runs one operation to completion. The request type decides the result type.
    pub fn execute<R: Request>(&self, request: &R) -> ApiResult<R::Output> {
        let kind = request.kind();
        let operation = request.operation(&self.operator)?;
        let transaction_id = self.next_transaction_id()?;

        tracing::debug!(%kind, %transaction_id, "submitting ledger operation");
        self.listeners.notify(&TransactionEvent::Submitted {
            kind,
            transaction_id,
        });

        let outcome = self.dispatch(kind, transaction_id, operation);
        let receipt_status = match &outcome {
            Ok(Outcome::Receipt(receipt)) => Some(receipt.status),
            _ => None,
        };
        // Completion reports the typed result, so a receipt missing a field is a failure.
        let result = outcome.and_then(R::output);
        let (status, succeeded) = match &result {
            Ok(_) => (receipt_status, true),
            Err(err) => (err.status(), false),
        };
        match &result {
            Ok(_) => tracing::debug!(%kind, %transaction_id, "ledger operation completed"),
            Err(err) => tracing::warn!(%kind, %transaction_id, error = %err, "ledger operation failed"),
        }
        self.listeners.notify(&TransactionEvent::Completed {
            kind,
            transaction_id,
            status,
            succeeded,
        });

        result
    }

    fn dispatch(
        &self,
        kind: OperationKind,
        transaction_id: TransactionId,
        operation: Operation,
    ) -> ApiResult<Outcome> {
        match operation {
            Operation::Transaction { body, options } => {
                let envelope = TransactionEnvelope {
                    transaction_id,
                    max_fee: options.max_fee(),
                    valid_duration: options.valid_duration(),
                    memo: options.memo().map(str::to_string),
                    body,
                };
                let receipt = self
                    .network
                    .submit(&envelope)
                    .map_err(|err| operation_failure(kind, transaction_id, err))?;
                if !receipt.status.is_success() {
                    return Err(Error::new(ErrorKind::OperationFailure)
                        .with_message(format!("{kind} was rejected with {}", receipt.status))
                        .with_status(receipt.status)
                        .with_transaction_id(transaction_id));
                }
                Ok(Outcome::Receipt(receipt))
            }
            Operation::Query { query, options } => {
                let envelope = QueryEnvelope {
                    payment_transaction_id: transaction_id,
                    max_payment: options.max_payment(),
                    query,
                };
                let response = self
                    .network
                    .query(&envelope)
                    .map_err(|err| operation_failure(kind, transaction_id, err))?;
                Ok(Outcome::Response {
                    transaction_id,
                    response,
                })
            }
        }
    }

    /// Streams live topic messages to `handler` until the handle is unsubscribed.
    pub fn subscribe_topic_messages(
        &self,
        subscription: TopicSubscription,
        handler: impl Fn(&TopicMessage) + Send + Sync + 'static,
    ) -> ApiResult<SubscriptionHandle> {
        let topic_id = subscription.topic_id;
        tracing::debug!(%topic_id, "subscribing to topic messages");
        self.network
            .subscribe_topic(subscription, Arc::new(handler))
            .map_err(|err| {
                let status = err.status();
                let wrapped = Error::new(ErrorKind::OperationFailure)
                    .with_message(format!("subscription to topic {topic_id} failed"))
                    .with_source(err);
                match status {
                    Some(status) => wrapped.with_status(status),
                    None => wrapped,
                }
            })
    }

    /// Operator account plus a valid start that never repeats within this client.
    fn next_transaction_id(&self) -> ApiResult<TransactionId> {
        let now = i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos()).map_err(|_| {
            Error::new(ErrorKind::Internal).with_message("system clock is out of range")
        })?;
        let mut previous = self.last_valid_start.load(Ordering::Relaxed);
        let nanos = loop {
            let candidate = now.max(previous.saturating_add(1));
            match self.last_valid_start.compare_exchange_weak(
                previous,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break candidate,
                Err(actual) => previous = actual,
            }
        };
        let valid_start = OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
            .map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("transaction valid start is out of range")
                    .with_source(err)
            })?;
        Ok(TransactionId::new(self.operator.account_id, valid_start))
    }
}

fn operation_failure(kind: OperationKind, transaction_id: TransactionId, err: Error) -> Error {
    let status = err.status();
    let wrapped = Error::new(ErrorKind::OperationFailure)
        .with_message(format!("{kind} failed"))
        .with_transaction_id(transaction_id)
        .with_source(err);
    match status {
        Some(status) => wrapped.with_status(status),
        None => wrapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use crate::core::entity::{AccountId, TopicId};
    use crate::core::key::{KeyAlgorithm, PrivateKey, PublicKey};
    use crate::core::status::Status;
    use crate::protocol::network::{
        MessageHandler, QueryResponse, TransactionBody, TransactionReceipt,
    };
    use crate::protocol::topic::{TopicCreateRequest, TopicSubmitMessageRequest};

    #[derive(Default)]
    struct ScriptedNetwork {
        calls: AtomicUsize,
        status: Mutex<Option<Status>>,
        bodies: Mutex<Vec<TransactionBody>>,
    }

    impl ScriptedNetwork {
        fn rejecting(status: Status) -> Self {
            let network = Self::default();
            *network.status.lock().expect("status") = Some(status);
            network
        }
    }

    impl LedgerNetwork for ScriptedNetwork {
        fn submit(&self, envelope: &TransactionEnvelope) -> ApiResult<TransactionReceipt> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
            self.bodies.lock().expect("bodies").push(envelope.body.clone());
            let status = self.status.lock().expect("status").unwrap_or(Status::Success);
            let mut receipt = TransactionReceipt::new(envelope.transaction_id, status);
            receipt.topic_id = Some(TopicId::from_num(1000 + call));
            Ok(receipt)
        }

        fn query(&self, _envelope: &QueryEnvelope) -> ApiResult<QueryResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::new(ErrorKind::QueryFailure).with_message("node unavailable"))
        }

        fn subscribe_topic(
            &self,
            _subscription: TopicSubscription,
            _handler: MessageHandler,
        ) -> ApiResult<SubscriptionHandle> {
            Ok(SubscriptionHandle::new())
        }
    }

    fn operator() -> Operator {
        Operator::new(
            AccountId::from_num(2),
            PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[1; 32]).expect("private"),
            PublicKey::from_bytes(KeyAlgorithm::Ed25519, &[6; 32]).expect("public"),
        )
        .expect("operator")
    }

    fn recording(client: &ProtocolClient) -> (Arc<Mutex<Vec<TransactionEvent>>>, ListenerRegistration) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let registration = client.add_listener(move |event: &TransactionEvent| {
            sink.lock().expect("events").push(event.clone());
        });
        (events, registration)
    }

    #[test]
    fn removed_listener_sees_nothing_further() {
        let client = ProtocolClient::new(operator(), Arc::new(ScriptedNetwork::default()));
        let (events, registration) = recording(&client);

        let created = client.execute(&TopicCreateRequest::of()).expect("create");
        assert_eq!(created.topic_id, TopicId::from_num(1000));
        assert_eq!(events.lock().expect("events").len(), 2);

        registration.remove();
        registration.remove();
        client.execute(&TopicCreateRequest::of()).expect("second create");
        assert_eq!(events.lock().expect("events").len(), 2);
        assert_eq!(client.listener_count(), 0);
    }

    #[test]
    fn events_carry_kind_and_transaction_id() {
        let client = ProtocolClient::new(operator(), Arc::new(ScriptedNetwork::default()));
        let (events, _registration) = recording(&client);
        let result = client.execute(&TopicCreateRequest::of()).expect("create");

        let events = events.lock().expect("events");
        assert_eq!(
            events[0],
            TransactionEvent::Submitted {
                kind: OperationKind::TopicCreate,
                transaction_id: result.transaction_id,
            }
        );
        assert_eq!(
            events[1],
            TransactionEvent::Completed {
                kind: OperationKind::TopicCreate,
                transaction_id: result.transaction_id,
                status: Some(Status::Success),
                succeeded: true,
            }
        );
    }

    #[test]
    fn rejected_receipt_is_an_operation_failure() {
        let client = ProtocolClient::new(
            operator(),
            Arc::new(ScriptedNetwork::rejecting(Status::InvalidSignature)),
        );
        let (events, _registration) = recording(&client);
        let err = client.execute(&TopicCreateRequest::of()).expect_err("rejected");
        assert_eq!(err.kind(), ErrorKind::OperationFailure);
        assert_eq!(err.status(), Some(Status::InvalidSignature));
        assert!(err.transaction_id().is_some());
        assert!(matches!(
            events.lock().expect("events")[1],
            TransactionEvent::Completed {
                succeeded: false,
                status: Some(Status::InvalidSignature),
                ..
            }
        ));
    }

    #[test]
    fn network_errors_are_wrapped() {
        let client = ProtocolClient::new(operator(), Arc::new(ScriptedNetwork::default()));
        let request = crate::protocol::file::FileContentsRequest::of(
            crate::core::entity::FileId::from_num(150),
        );
        let err = client.execute(&request).expect_err("query");
        assert_eq!(err.kind(), ErrorKind::OperationFailure);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_request_never_reaches_the_network() {
        let network = Arc::new(ScriptedNetwork::default());
        let client = ProtocolClient::new(operator(), Arc::clone(&network) as Arc<dyn LedgerNetwork>);
        let (events, _registration) = recording(&client);
        let request = crate::protocol::account::AccountDeleteRequest::of(AccountId::from_num(2));
        let err = client.execute(&request).expect_err("self delete");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(network.calls.load(Ordering::SeqCst), 0);
        assert!(events.lock().expect("events").is_empty());
    }

    #[test]
    fn transaction_ids_are_unique() {
        let network = Arc::new(ScriptedNetwork::default());
        let client = ProtocolClient::new(operator(), Arc::clone(&network) as Arc<dyn LedgerNetwork>);
        let message =
            TopicSubmitMessageRequest::of_text(TopicId::from_num(1000), "hi").expect("message");
        let first = client.execute(&TopicCreateRequest::of()).expect("first");
        let err = client.execute(&message).expect_err("no sequence number in receipt");
        assert_eq!(err.kind(), ErrorKind::OperationFailure);
        let second = client.execute(&TopicCreateRequest::of()).expect("second");
        assert!(second.transaction_id.valid_start > first.transaction_id.valid_start);
    }

    #[test]
    fn incomplete_receipt_completes_as_failure() {
        let client = ProtocolClient::new(operator(), Arc::new(ScriptedNetwork::default()));
        let (events, _registration) = recording(&client);
        let message =
            TopicSubmitMessageRequest::of_text(TopicId::from_num(1000), "hi").expect("message");

        let err = client.execute(&message).expect_err("no sequence number in receipt");
        assert_eq!(err.kind(), ErrorKind::OperationFailure);

        let events = events.lock().expect("events");
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            TransactionEvent::Completed {
                kind: OperationKind::TopicSubmitMessage,
                succeeded: false,
                ..
            }
        ));
    }
}

//! Purpose: Submit through the protocol client, read back through the mirror client.
//! Exports: None (integration test module).
//! Role: A mirror emulator publishes `LocalLedger` topic state the way a mirror node does.
//! Invariants: Message bytes survive the write path, JSON rendering and conversion unchanged.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

use common::{MirrorEmulator, TestResult, operator};
use ledgerlink::config::{LedgerConfig, NetworkSettings};
use ledgerlink::core::amount::Hbar;
use ledgerlink::core::entity::{TopicId, format_timestamp};
use ledgerlink::domain::TopicMessage;
use ledgerlink::mirror::{DocumentConverter, MirrorClient, Page, UreqRestClient};
use ledgerlink::protocol::{
    LedgerNetwork, LocalLedger, ProtocolClient, TopicCreateRequest, TopicSubmitMessageRequest,
    TopicUpdateRequest,
};

fn render(message: &TopicMessage) -> Value {
    json!({
        "consensus_timestamp": format_timestamp(message.consensus_timestamp),
        "topic_id": message.topic_id.to_string(),
        "message": STANDARD.encode(&message.message),
        "running_hash": STANDARD.encode(&message.running_hash),
        "running_hash_version": message.running_hash_version,
        "sequence_number": message.sequence_number,
        "payer_account_id": message.payer_account_id.map(|id| id.to_string()),
        "chunk_info": null
    })
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"_status": {"messages": [{"message": "Not found"}]}})),
    )
        .into_response()
}

async fn topic(State(ledger): State<Arc<LocalLedger>>, AxumPath(topic): AxumPath<String>) -> Response {
    let Ok(topic_id) = topic.parse::<TopicId>() else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    match ledger.topic(topic_id) {
        Ok(Some(topic)) => Json(json!({
            "topic_id": topic.topic_id.to_string(),
            "memo": topic.memo,
            "admin_key": topic.admin_key.map(|key| json!({"_type": "ED25519", "key": key.to_hex()})),
            "submit_key": null,
            "deleted": topic.deleted,
            "created_timestamp": topic.created_timestamp.map(format_timestamp)
        }))
        .into_response(),
        Ok(None) => not_found(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn topic_messages(
    State(ledger): State<Arc<LocalLedger>>,
    AxumPath(topic): AxumPath<String>,
) -> Response {
    let Ok(topic_id) = topic.parse::<TopicId>() else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    match ledger.topic_messages(topic_id) {
        Ok(messages) => Json(json!({
            "messages": messages.iter().map(render).collect::<Vec<_>>(),
            "links": {"next": null}
        }))
        .into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn topic_message(
    State(ledger): State<Arc<LocalLedger>>,
    AxumPath((topic, sequence)): AxumPath<(String, u64)>,
) -> Response {
    let Ok(topic_id) = topic.parse::<TopicId>() else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    match ledger.topic_message(topic_id, sequence) {
        Ok(Some(message)) => Json(render(&message)).into_response(),
        Ok(None) => not_found(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

struct Harness {
    protocol: ProtocolClient,
    mirror: MirrorClient<UreqRestClient<Value>, DocumentConverter>,
    _emulator: MirrorEmulator,
}

fn harness() -> TestResult<Harness> {
    let ledger = Arc::new(LocalLedger::new(&operator(), Hbar::new(100)));
    let router = Router::new()
        .route("/api/v1/topics/:topic", get(topic))
        .route("/api/v1/topics/:topic/messages", get(topic_messages))
        .route("/api/v1/topics/:topic/messages/:sequence", get(topic_message))
        .with_state(Arc::clone(&ledger));
    let emulator = MirrorEmulator::start(router)?;

    let network = NetworkSettings {
        identifier: "local".to_string(),
        display_name: "Local".to_string(),
        mirror_node_url: Some(emulator.base_url()),
        consensus_nodes: Vec::new(),
    };
    let config =
        LedgerConfig::new(operator(), network).with_request_timeout(Duration::from_secs(5));
    Ok(Harness {
        protocol: ProtocolClient::from_config(&config, ledger as Arc<dyn LedgerNetwork>),
        mirror: MirrorClient::from_config(&config)?,
        _emulator: emulator,
    })
}

#[test]
fn submitted_message_reads_back_by_sequence_number() -> TestResult {
    let harness = harness()?;
    let topic_id = harness
        .protocol
        .execute(&TopicCreateRequest::of_admin_key(operator().public_key))?
        .topic_id;

    let payload = b"settlement batch 42".to_vec();
    let submitted = harness
        .protocol
        .execute(&TopicSubmitMessageRequest::of(topic_id, payload.clone())?)?;
    assert_eq!(submitted.sequence_number, 1);

    let message = harness
        .mirror
        .topic_message(topic_id, 1)?
        .expect("message is published");
    assert_eq!(message.message.as_ref(), payload.as_slice());
    assert_eq!(message.running_hash, submitted.running_hash);
    assert_eq!(message.payer_account_id, Some(operator().account_id));

    assert!(harness.mirror.topic_message(topic_id, 2)?.is_none());
    Ok(())
}

#[test]
fn topic_listing_and_metadata_follow_ledger_state() -> TestResult {
    let harness = harness()?;
    let topic_id = harness
        .protocol
        .execute(&TopicCreateRequest::of_admin_key(operator().public_key))?
        .topic_id;
    harness
        .protocol
        .execute(&TopicUpdateRequest::of_memo(topic_id, "orders")?)?;
    for text in ["one", "two", "three"] {
        harness
            .protocol
            .execute(&TopicSubmitMessageRequest::of_text(topic_id, text)?)?;
    }

    let topic = harness.mirror.topic(topic_id)?.expect("topic exists");
    assert_eq!(topic.memo, "orders");
    assert_eq!(topic.admin_key, Some(operator().public_key));

    let page = harness.mirror.topic_messages(topic_id);
    assert!(!page.has_next()?);
    let texts: Vec<String> = page
        .data()?
        .iter()
        .filter_map(|message| message.message_utf8().map(str::to_string))
        .collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
    Ok(())
}

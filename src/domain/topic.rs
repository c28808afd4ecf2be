// Consensus topics and the messages submitted to them.
use std::time::Duration;

use bytes::Bytes;
use time::OffsetDateTime;

use crate::core::entity::{AccountId, TopicId, TransactionId};
use crate::core::key::PublicKey;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Topic {
    pub topic_id: TopicId,
    pub memo: String,
    pub admin_key: Option<PublicKey>,
    pub submit_key: Option<PublicKey>,
    pub auto_renew_account: Option<AccountId>,
    pub auto_renew_period: Option<Duration>,
    pub deleted: bool,
    pub created_timestamp: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChunkInfo {
    pub initial_transaction_id: Option<TransactionId>,
    pub number: u32,
    pub total: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicMessage {
    pub topic_id: TopicId,
    pub sequence_number: u64,
    pub consensus_timestamp: OffsetDateTime,
    pub message: Bytes,
    pub running_hash: Vec<u8>,
    pub running_hash_version: u32,
    pub payer_account_id: Option<AccountId>,
    pub chunk_info: Option<ChunkInfo>,
}

impl TopicMessage {
    pub fn message_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.message).ok()
    }
}

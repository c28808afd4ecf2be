// Topics and topic messages.
use bytes::Bytes;

use super::fields::Fields;
use crate::core::entity::{TransactionId, parse_timestamp};
use crate::core::error::ApiResult;
use crate::domain::{ChunkInfo, Topic, TopicMessage};

pub(crate) fn topic(fields: Fields<'_>) -> ApiResult<Topic> {
    Ok(Topic {
        topic_id: fields.parse("topic_id")?,
        memo: fields.string_or_default("memo")?,
        admin_key: fields.key("admin_key")?,
        submit_key: fields.key("submit_key")?,
        auto_renew_account: fields.opt_parse("auto_renew_account")?,
        auto_renew_period: fields.opt_duration_seconds("auto_renew_period")?,
        deleted: fields.bool_or("deleted", false)?,
        created_timestamp: fields.opt_timestamp("created_timestamp")?,
    })
}

pub(crate) fn topic_message(fields: Fields<'_>) -> ApiResult<TopicMessage> {
    let sequence_number = fields
        .opt_u64("sequence_number")?
        .ok_or_else(|| fields.error("sequence_number", "required field is missing"))?;
    let chunk_info = match fields.object("chunk_info")? {
        Some(chunk) => Some(chunk_info(chunk)?),
        None => None,
    };
    Ok(TopicMessage {
        topic_id: fields.parse("topic_id")?,
        sequence_number,
        consensus_timestamp: fields.timestamp("consensus_timestamp")?,
        message: Bytes::from(fields.base64_or_empty("message")?),
        running_hash: fields.base64_or_empty("running_hash")?,
        running_hash_version: fields
            .opt_u64("running_hash_version")?
            .map_or(Ok(0), u32::try_from)
            .map_err(|err| {
                fields
                    .error("running_hash_version", "value is out of range")
                    .with_source(err)
            })?,
        payer_account_id: fields.opt_parse("payer_account_id")?,
        chunk_info,
    })
}

fn chunk_info(fields: Fields<'_>) -> ApiResult<ChunkInfo> {
    let initial_transaction_id = match fields.object("initial_transaction_id")? {
        Some(initial) => {
            let valid_start = initial.str("transaction_valid_start")?;
            let valid_start = parse_timestamp(valid_start).map_err(|err| {
                initial
                    .error("transaction_valid_start", "value is not a timestamp")
                    .with_source(err)
            })?;
            Some(TransactionId::new(initial.parse("account_id")?, valid_start))
        }
        None => None,
    };
    Ok(ChunkInfo {
        initial_transaction_id,
        number: fields.u32("number")?,
        total: fields.u32("total")?,
    })
}

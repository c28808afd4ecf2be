// Contract entities and contract logs.
use super::fields::Fields;
use crate::core::error::ApiResult;
use crate::domain::{Contract, ContractLog};

pub(crate) fn contract(fields: Fields<'_>) -> ApiResult<Contract> {
    Ok(Contract {
        contract_id: fields.parse("contract_id")?,
        evm_address: fields.string_or_default("evm_address")?,
        file_id: fields.opt_parse("file_id")?,
        admin_key: fields.key("admin_key")?,
        memo: fields.string_or_default("memo")?,
        auto_renew_account: fields.opt_parse("auto_renew_account")?,
        auto_renew_period: fields.opt_duration_seconds("auto_renew_period")?,
        proxy_account_id: fields.opt_parse("proxy_account_id")?,
        obtainer_id: fields.opt_parse("obtainer_id")?,
        max_automatic_token_associations: fields.i32_or("max_automatic_token_associations", 0)?,
        nonce: fields.opt_i64("nonce")?,
        deleted: fields.bool_or("deleted", false)?,
        permanent_removal: fields.opt_bool("permanent_removal")?,
        created_timestamp: fields.opt_timestamp("created_timestamp")?,
        expiration_timestamp: fields.opt_timestamp("expiration_timestamp")?,
    })
}

pub(crate) fn contract_log(fields: Fields<'_>) -> ApiResult<ContractLog> {
    let topics = match fields.document().get("topics").and_then(|topics| topics.as_array()) {
        Some(items) => items
            .iter()
            .map(|topic| {
                let text = topic
                    .as_str()
                    .ok_or_else(|| fields.error("topics", format!("expected string, found {topic}")))?;
                hex::decode(text.strip_prefix("0x").unwrap_or(text))
                    .map_err(|err| fields.error("topics", "value is not hex").with_source(err))
            })
            .collect::<ApiResult<Vec<_>>>()?,
        None => Vec::new(),
    };
    Ok(ContractLog {
        address: fields.str("address")?.to_string(),
        contract_id: fields.opt_parse("contract_id")?,
        root_contract_id: fields.opt_parse("root_contract_id")?,
        data: fields.hex_or_empty("data")?,
        index: fields.u32("index")?,
        topics,
        bloom: fields.hex_or_empty("bloom")?,
        block_hash: fields.string_or_default("block_hash")?,
        block_number: fields.i64_or("block_number", 0)?,
        timestamp: fields.opt_timestamp("timestamp")?,
        transaction_hash: fields.string_or_default("transaction_hash")?,
        transaction_index: fields.opt_i64("transaction_index")?,
    })
}

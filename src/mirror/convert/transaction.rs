// Transaction records with their hbar, token, NFT and staking reward transfer lists.
use super::fields::Fields;
use crate::core::amount::Hbar;
use crate::core::error::ApiResult;
use crate::core::status::Status;
use crate::domain::{
    NftTransfer, StakingRewardTransfer, TokenTransfer, TransactionInfo, TransactionType, Transfer,
};

pub(crate) fn transaction_info(fields: Fields<'_>) -> ApiResult<TransactionInfo> {
    let name = fields
        .opt_str("name")?
        .map(|name| name.parse::<TransactionType>().unwrap_or(TransactionType::Unknown))
        .unwrap_or(TransactionType::Unknown);
    let result = fields
        .opt_str("result")?
        .map(|result| result.parse::<Status>().unwrap_or(Status::Unknown))
        .unwrap_or(Status::Unknown);
    Ok(TransactionInfo {
        transaction_id: fields.parse("transaction_id")?,
        name,
        result,
        consensus_timestamp: fields.timestamp("consensus_timestamp")?,
        valid_start_timestamp: fields.opt_timestamp("valid_start_timestamp")?,
        charged_tx_fee: Hbar::from_tinybars(fields.i64_or("charged_tx_fee", 0)?),
        max_fee: Hbar::from_tinybars(fields.i64_or("max_fee", 0)?),
        memo: fields.base64_or_empty("memo_base64")?,
        node: fields.opt_parse("node")?,
        nonce: fields.i32_or("nonce", 0)?,
        scheduled: fields.bool_or("scheduled", false)?,
        entity_id: fields.opt_str("entity_id")?.map(str::to_string),
        transaction_hash: fields.base64_or_empty("transaction_hash")?,
        valid_duration_seconds: fields.opt_u64("valid_duration_seconds")?,
        transfers: fields.list("transfers", "transaction.transfers", transfer)?,
        token_transfers: fields.list(
            "token_transfers",
            "transaction.token_transfers",
            token_transfer,
        )?,
        nft_transfers: fields.list("nft_transfers", "transaction.nft_transfers", nft_transfer)?,
        staking_reward_transfers: fields.list(
            "staking_reward_transfers",
            "transaction.staking_reward_transfers",
            staking_reward_transfer,
        )?,
    })
}

fn transfer(fields: Fields<'_>) -> ApiResult<Transfer> {
    Ok(Transfer {
        account_id: fields.parse("account")?,
        amount: Hbar::from_tinybars(fields.i64("amount")?),
        is_approval: fields.bool_or("is_approval", false)?,
    })
}

fn token_transfer(fields: Fields<'_>) -> ApiResult<TokenTransfer> {
    Ok(TokenTransfer {
        token_id: fields.parse("token_id")?,
        account_id: fields.parse("account")?,
        amount: fields.i64("amount")?,
        is_approval: fields.bool_or("is_approval", false)?,
    })
}

fn nft_transfer(fields: Fields<'_>) -> ApiResult<NftTransfer> {
    Ok(NftTransfer {
        token_id: fields.parse("token_id")?,
        serial_number: fields.i64("serial_number")?,
        sender_account_id: fields.opt_parse("sender_account_id")?,
        receiver_account_id: fields.opt_parse("receiver_account_id")?,
        is_approval: fields.bool_or("is_approval", false)?,
    })
}

fn staking_reward_transfer(fields: Fields<'_>) -> ApiResult<StakingRewardTransfer> {
    Ok(StakingRewardTransfer {
        account_id: fields.parse("account")?,
        amount: Hbar::from_tinybars(fields.i64("amount")?),
    })
}

// Account records from `/api/v1/accounts/{id}`.
use super::fields::Fields;
use crate::core::amount::Hbar;
use crate::core::error::ApiResult;
use crate::domain::{AccountInfo, AccountTokenBalance};

pub(crate) fn account_info(fields: Fields<'_>) -> ApiResult<AccountInfo> {
    let (balance, token_balances) = match fields.object("balance")? {
        Some(balance) => (
            balance.i64_or("balance", 0)?,
            balance.list("tokens", "account.balance.tokens", |token| {
                Ok(AccountTokenBalance {
                    token_id: token.parse("token_id")?,
                    balance: token.i64_or("balance", 0)?,
                })
            })?,
        ),
        None => (0, Vec::new()),
    };
    Ok(AccountInfo {
        account_id: fields.parse("account")?,
        evm_address: fields.opt_str("evm_address")?.map(str::to_string),
        balance: Hbar::from_tinybars(balance),
        token_balances,
        ethereum_nonce: fields.i64_or("ethereum_nonce", 0)?,
        pending_reward: Hbar::from_tinybars(fields.i64_or("pending_reward", 0)?),
        memo: fields.string_or_default("memo")?,
        key: fields.key("key")?,
        deleted: fields.bool_or("deleted", false)?,
        decline_reward: fields.bool_or("decline_reward", false)?,
        staked_node_id: fields.opt_i64("staked_node_id")?,
        max_automatic_token_associations: fields.i32_or("max_automatic_token_associations", 0)?,
        created_timestamp: fields.opt_timestamp("created_timestamp")?,
        expiry_timestamp: fields.opt_timestamp("expiry_timestamp")?,
    })
}

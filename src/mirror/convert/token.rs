// Token listings, token details, balances, NFTs and custom fee schedules.
use time::OffsetDateTime;

use super::fields::Fields;
use crate::core::error::{ApiResult, Error};
use crate::domain::{
    Balance, CustomFee, FixedFee, FractionalFee, Nft, RoyaltyFee, SupplyType, Token, TokenInfo,
    TokenType,
};

pub(crate) fn token(fields: Fields<'_>) -> ApiResult<Token> {
    Ok(Token {
        token_id: fields.parse("token_id")?,
        token_type: fields.parse::<TokenType>("type")?,
        name: fields.string_or_default("name")?,
        symbol: fields.string_or_default("symbol")?,
        decimals: fields.u32("decimals")?,
        admin_key: fields.key("admin_key")?,
    })
}

pub(crate) fn token_info(fields: Fields<'_>) -> ApiResult<TokenInfo> {
    let custom_fees = match fields.object("custom_fees")? {
        Some(fees) => custom_fee(fees)?,
        None => CustomFee::default(),
    };
    Ok(TokenInfo {
        token_id: fields.parse("token_id")?,
        token_type: fields.parse("type")?,
        name: fields.string_or_default("name")?,
        symbol: fields.string_or_default("symbol")?,
        memo: fields.string_or_default("memo")?,
        decimals: fields.u32("decimals")?,
        initial_supply: fields.i64_or("initial_supply", 0)?,
        total_supply: fields.i64_or("total_supply", 0)?,
        max_supply: fields.i64_or("max_supply", 0)?,
        supply_type: fields
            .opt_parse::<SupplyType>("supply_type")?
            .unwrap_or(SupplyType::Infinite),
        treasury_account_id: fields.parse("treasury_account_id")?,
        auto_renew_account: fields.opt_parse("auto_renew_account")?,
        auto_renew_period: fields.opt_duration_seconds("auto_renew_period")?,
        deleted: fields.bool_or("deleted", false)?,
        freeze_default: fields.bool_or("freeze_default", false)?,
        paused: fields.opt_str("pause_status")? == Some("PAUSED"),
        admin_key: fields.key("admin_key")?,
        supply_key: fields.key("supply_key")?,
        kyc_key: fields.key("kyc_key")?,
        freeze_key: fields.key("freeze_key")?,
        wipe_key: fields.key("wipe_key")?,
        fee_schedule_key: fields.key("fee_schedule_key")?,
        pause_key: fields.key("pause_key")?,
        custom_fees,
        created_timestamp: fields.opt_timestamp("created_timestamp")?,
        modified_timestamp: fields.opt_timestamp("modified_timestamp")?,
        expiry_timestamp: epoch_nanos(&fields, "expiry_timestamp")?,
    })
}

pub(crate) fn balance(fields: Fields<'_>) -> ApiResult<Balance> {
    let decimals = match fields.opt_i64("decimals")? {
        Some(_) => fields.u32("decimals")?,
        None => 0,
    };
    Balance::new(fields.parse("account")?, fields.i64("balance")?, decimals)
        .map_err(|err| rejected(&fields, "balance", err))
}

pub(crate) fn nft(fields: Fields<'_>) -> ApiResult<Nft> {
    Ok(Nft {
        token_id: fields.parse("token_id")?,
        serial_number: fields.i64("serial_number")?,
        account_id: fields.opt_parse("account_id")?,
        spender: fields.opt_parse("spender")?,
        metadata: fields.base64_or_empty("metadata")?,
        deleted: fields.bool_or("deleted", false)?,
        created_timestamp: fields.opt_timestamp("created_timestamp")?,
        modified_timestamp: fields.opt_timestamp("modified_timestamp")?,
    })
}

pub(crate) fn custom_fee(fields: Fields<'_>) -> ApiResult<CustomFee> {
    Ok(CustomFee {
        fixed_fees: fields.list("fixed_fees", "custom_fees.fixed_fees", fixed_fee)?,
        fractional_fees: fields.list(
            "fractional_fees",
            "custom_fees.fractional_fees",
            fractional_fee,
        )?,
        royalty_fees: fields.list("royalty_fees", "custom_fees.royalty_fees", royalty_fee)?,
        created_timestamp: fields.opt_timestamp("created_timestamp")?,
    })
}

fn fixed_fee(fields: Fields<'_>) -> ApiResult<FixedFee> {
    FixedFee::new(
        fields.i64("amount")?,
        fields.opt_parse("collector_account_id")?,
        fields.opt_parse("denominating_token_id")?,
        fields.bool_or("all_collectors_are_exempt", false)?,
    )
    .map_err(|err| rejected(&fields, "amount", err))
}

fn fractional_fee(fields: Fields<'_>) -> ApiResult<FractionalFee> {
    let amount = fields
        .object("amount")?
        .ok_or_else(|| fields.error("amount", "required field is missing"))?;
    FractionalFee::new(
        amount.i64("numerator")?,
        amount.i64("denominator")?,
        fields.i64_or("minimum", 0)?,
        fields.opt_i64("maximum")?,
        fields.bool_or("net_of_transfers", false)?,
        fields.opt_parse("collector_account_id")?,
        fields.opt_parse("denominating_token_id")?,
        fields.bool_or("all_collectors_are_exempt", false)?,
    )
    .map_err(|err| rejected(&fields, "amount", err))
}

fn royalty_fee(fields: Fields<'_>) -> ApiResult<RoyaltyFee> {
    let amount = fields
        .object("amount")?
        .ok_or_else(|| fields.error("amount", "required field is missing"))?;
    let fallback_fee = match fields.object("fallback_fee")? {
        Some(fallback) => Some(
            FixedFee::new(
                fallback.i64("amount")?,
                fields.opt_parse("collector_account_id")?,
                fallback.opt_parse("denominating_token_id")?,
                fields.bool_or("all_collectors_are_exempt", false)?,
            )
            .map_err(|err| rejected(&fallback, "amount", err))?,
        ),
        None => None,
    };
    RoyaltyFee::new(
        amount.i64("numerator")?,
        amount.i64("denominator")?,
        fallback_fee,
        fields.opt_parse("collector_account_id")?,
        fields.bool_or("all_collectors_are_exempt", false)?,
    )
    .map_err(|err| rejected(&fields, "amount", err))
}

/// Token expiry is reported as integer nanoseconds rather than `seconds.nanos`.
fn epoch_nanos(fields: &Fields<'_>, key: &str) -> ApiResult<Option<OffsetDateTime>> {
    match fields.opt_i64(key)? {
        None => Ok(None),
        Some(nanos) => OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
            .map(Some)
            .map_err(|err| fields.error(key, format!("{nanos} is out of range")).with_source(err)),
    }
}

fn rejected(fields: &Fields<'_>, key: &str, err: Error) -> Error {
    let message = err.message().unwrap_or("value rejected").to_string();
    fields.error(key, message).with_source(err)
}

// Network endpoints: exchange rates, fees, staking and supply.
use super::fields::Fields;
use crate::core::amount::Hbar;
use crate::core::error::ApiResult;
use crate::domain::{ExchangeRate, ExchangeRates, NetworkFee, NetworkStake, NetworkSupplies};

pub(crate) fn exchange_rates(fields: Fields<'_>) -> ApiResult<ExchangeRates> {
    let current = fields
        .object("current_rate")?
        .ok_or_else(|| fields.error("current_rate", "required field is missing"))?;
    let next = fields
        .object("next_rate")?
        .ok_or_else(|| fields.error("next_rate", "required field is missing"))?;
    Ok(ExchangeRates {
        current_rate: exchange_rate(current)?,
        next_rate: exchange_rate(next)?,
    })
}

fn exchange_rate(fields: Fields<'_>) -> ApiResult<ExchangeRate> {
    Ok(ExchangeRate {
        cent_equivalent: fields.i64("cent_equivalent")?,
        hbar_equivalent: fields.i64("hbar_equivalent")?,
        expiration_time: fields.epoch_seconds("expiration_time")?,
    })
}

pub(crate) fn network_fee(fields: Fields<'_>) -> ApiResult<NetworkFee> {
    Ok(NetworkFee {
        gas: fields.i64("gas")?,
        transaction_type: fields.str("transaction_type")?.to_string(),
    })
}

pub(crate) fn network_stake(fields: Fields<'_>) -> ApiResult<NetworkStake> {
    let (staking_period_start, staking_period_end) = match fields.object("staking_period")? {
        Some(period) => (period.opt_timestamp("from")?, period.opt_timestamp("to")?),
        None => (None, None),
    };
    Ok(NetworkStake {
        max_stake_rewarded: fields.i64_or("max_stake_rewarded", 0)?,
        max_staking_reward_rate_per_hbar: fields.i64_or("max_staking_reward_rate_per_hbar", 0)?,
        max_total_reward: fields.i64_or("max_total_reward", 0)?,
        node_reward_fee_fraction: fields.f64_or("node_reward_fee_fraction", 0.0)?,
        reserved_staking_rewards: fields.i64_or("reserved_staking_rewards", 0)?,
        reward_balance_threshold: fields.i64_or("reward_balance_threshold", 0)?,
        stake_total: fields.i64_or("stake_total", 0)?,
        staking_period_start,
        staking_period_end,
        staking_period_duration: fields.i64_or("staking_period_duration", 0)?,
        staking_periods_stored: fields.i64_or("staking_periods_stored", 0)?,
        staking_reward_fee_fraction: fields.f64_or("staking_reward_fee_fraction", 0.0)?,
        staking_reward_rate: fields.i64_or("staking_reward_rate", 0)?,
        staking_start_threshold: fields.i64_or("staking_start_threshold", 0)?,
        unreserved_staking_reward_balance: fields
            .i64_or("unreserved_staking_reward_balance", 0)?,
    })
}

pub(crate) fn network_supplies(fields: Fields<'_>) -> ApiResult<NetworkSupplies> {
    Ok(NetworkSupplies {
        released_supply: Hbar::from_tinybars(fields.i64("released_supply")?),
        total_supply: Hbar::from_tinybars(fields.i64("total_supply")?),
        timestamp: fields.opt_timestamp("timestamp")?,
    })
}

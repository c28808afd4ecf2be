// Network-wide values: exchange rates, gas fees, staking and hbar supply.
use time::OffsetDateTime;

use crate::core::amount::Hbar;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExchangeRate {
    pub cent_equivalent: i64,
    pub hbar_equivalent: i64,
    pub expiration_time: OffsetDateTime,
}

impl ExchangeRate {
    /// US cents that one whole hbar buys at this rate.
    pub fn cents_per_hbar(&self) -> f64 {
        if self.hbar_equivalent == 0 {
            return 0.0;
        }
        self.cent_equivalent as f64 / self.hbar_equivalent as f64
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExchangeRates {
    pub current_rate: ExchangeRate,
    pub next_rate: ExchangeRate,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkFee {
    pub gas: i64,
    pub transaction_type: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NetworkStake {
    pub max_stake_rewarded: i64,
    pub max_staking_reward_rate_per_hbar: i64,
    pub max_total_reward: i64,
    pub node_reward_fee_fraction: f64,
    pub reserved_staking_rewards: i64,
    pub reward_balance_threshold: i64,
    pub stake_total: i64,
    pub staking_period_start: Option<OffsetDateTime>,
    pub staking_period_end: Option<OffsetDateTime>,
    pub staking_period_duration: i64,
    pub staking_periods_stored: i64,
    pub staking_reward_fee_fraction: f64,
    pub staking_reward_rate: i64,
    pub staking_start_threshold: i64,
    pub unreserved_staking_reward_balance: i64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NetworkSupplies {
    pub released_supply: Hbar,
    pub total_supply: Hbar,
    pub timestamp: Option<OffsetDateTime>,
}

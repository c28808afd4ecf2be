// Account state as reported by the mirror node.
use time::OffsetDateTime;

use crate::core::amount::Hbar;
use crate::core::entity::{AccountId, TokenId};
use crate::core::key::PublicKey;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountTokenBalance {
    pub token_id: TokenId,
    pub balance: i64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountInfo {
    pub account_id: AccountId,
    pub evm_address: Option<String>,
    pub balance: Hbar,
    pub token_balances: Vec<AccountTokenBalance>,
    pub ethereum_nonce: i64,
    pub pending_reward: Hbar,
    pub memo: String,
    pub key: Option<PublicKey>,
    pub deleted: bool,
    pub decline_reward: bool,
    pub staked_node_id: Option<i64>,
    pub max_automatic_token_associations: i32,
    pub created_timestamp: Option<OffsetDateTime>,
    pub expiry_timestamp: Option<OffsetDateTime>,
}

impl AccountInfo {
    pub fn token_balance(&self, token_id: TokenId) -> Option<i64> {
        self.token_balances
            .iter()
            .find(|entry| entry.token_id == token_id)
            .map(|entry| entry.balance)
    }
}

//! Purpose: The REST fetch contract between the mirror façade and an HTTP stack.
//! Exports: `RestClient`.
//! Role: Adapters implement `do_get`; single-entity queries and list paths are provided on top of it.
//! Invariants: List queries start from the `*_path` builders; later pages follow `links.next`.
//! Invariants: A missing entity (HTTP 404) is the null document, not an error.
//! Invariants: Transport failures surface as `ErrorKind::QueryFailure`.
use crate::core::document::JsonRepr;
use crate::core::entity::{AccountId, ContractId, TokenId, TopicId, TransactionId};
use crate::core::error::ApiResult;
use crate::mirror::paths::{self, ContractFilter, TransactionFilter};

pub trait RestClient: Send + Sync {
    type Json: JsonRepr;

    /// GETs `path` (which may carry a query string) relative to the mirror base URL.
    fn do_get(&self, path: &str) -> ApiResult<Self::Json>;

    fn query_account(&self, account_id: AccountId) -> ApiResult<Self::Json> {
        self.do_get(&paths::account(account_id))
    }

    fn account_nfts_path(&self, account_id: AccountId) -> String {
        paths::account_nfts(account_id)
    }

    fn query_token(&self, token_id: TokenId) -> ApiResult<Self::Json> {
        self.do_get(&paths::token(token_id))
    }

    fn tokens_path(&self) -> String {
        paths::tokens()
    }

    fn tokens_for_account_path(&self, account_id: AccountId) -> String {
        paths::tokens_for_account(account_id)
    }

    fn token_balances_path(&self, token_id: TokenId) -> String {
        paths::token_balances(token_id)
    }

    fn query_token_balance_for_account(
        &self,
        token_id: TokenId,
        account_id: AccountId,
    ) -> ApiResult<Self::Json> {
        self.do_get(&paths::token_balance_for_account(token_id, account_id))
    }

    fn nfts_path(&self, token_id: TokenId) -> String {
        paths::nfts(token_id)
    }

    fn query_nft(&self, token_id: TokenId, serial_number: i64) -> ApiResult<Self::Json> {
        self.do_get(&paths::nft(token_id, serial_number)?)
    }

    fn query_topic(&self, topic_id: TopicId) -> ApiResult<Self::Json> {
        self.do_get(&paths::topic(topic_id))
    }

    fn topic_messages_path(&self, topic_id: TopicId) -> String {
        paths::topic_messages(topic_id)
    }

    fn query_topic_message(&self, topic_id: TopicId, sequence_number: u64) -> ApiResult<Self::Json> {
        self.do_get(&paths::topic_message(topic_id, sequence_number)?)
    }

    fn query_transaction(&self, transaction_id: &TransactionId) -> ApiResult<Self::Json> {
        self.do_get(&paths::transaction(transaction_id))
    }

    fn transactions_path(&self, filter: &TransactionFilter) -> String {
        paths::transactions(filter)
    }

    fn query_contract(&self, contract_id: ContractId) -> ApiResult<Self::Json> {
        self.do_get(&paths::contract(contract_id))
    }

    fn contracts_path(&self, filter: Option<&ContractFilter>) -> ApiResult<String> {
        paths::contracts(filter)
    }

    fn contract_logs_path(&self, contract_id: ContractId) -> String {
        paths::contract_logs(contract_id)
    }

    fn query_exchange_rates(&self) -> ApiResult<Self::Json> {
        self.do_get(&paths::exchange_rate())
    }

    fn query_network_fees(&self) -> ApiResult<Self::Json> {
        self.do_get(&paths::network_fees())
    }

    fn query_network_stake(&self) -> ApiResult<Self::Json> {
        self.do_get(&paths::network_stake())
    }

    fn query_network_supplies(&self) -> ApiResult<Self::Json> {
        self.do_get(&paths::network_supply())
    }
}

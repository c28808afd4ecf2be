//! Purpose: Typed read-query surface over the mirror node.
//! Exports: `MirrorClient`.
//! Role: Pairs a `RestClient` (fetch) with a `Converter` (map); platforms supply only those two.
//! Invariants: Single-entity queries return `Option`; list queries return lazy pages.
//! Invariants: Invalid arguments fail before any request is sent.
use std::sync::Arc;

use crate::config::LedgerConfig;
use crate::core::document::JsonRepr;
use crate::core::entity::{AccountId, ContractId, TokenId, TopicId, TransactionId};
use crate::core::error::ApiResult;
use crate::domain::{
    AccountInfo, Balance, Contract, ContractLog, ExchangeRates, NetworkFee, NetworkStake,
    NetworkSupplies, Nft, Token, TokenInfo, Topic, TopicMessage, TransactionInfo,
};
use crate::mirror::converter::{Converter, DocumentConverter};
use crate::mirror::page::RestPage;
use crate::mirror::paths::{ContractFilter, TransactionFilter};
use crate::mirror::rest::RestClient;
use crate::mirror::ureq_client::UreqRestClient;

pub struct MirrorClient<R, C> {
    rest: Arc<R>,
    converter: Arc<C>,
}

impl<R, C> Clone for MirrorClient<R, C> {
    fn clone(&self) -> Self {
        Self {
            rest: Arc::clone(&self.rest),
            converter: Arc::clone(&self.converter),
        }
    }
}

impl<J: JsonRepr> MirrorClient<UreqRestClient<J>, DocumentConverter> {
    /// HTTP client against the configured network's mirror node.
    pub fn from_config(config: &LedgerConfig) -> ApiResult<Self> {
        Ok(Self::new(UreqRestClient::from_config(config)?, DocumentConverter))
    }
}

impl<R, C> MirrorClient<R, C>
where
    R: RestClient,
    C: Converter<R::Json> + 'static,
{
    pub fn new(rest: R, converter: C) -> Self {
        Self {
            rest: Arc::new(rest),
            converter: Arc::new(converter),
        }
    }

    pub fn rest(&self) -> &R {
        &self.rest
    }

    fn page<T, F>(&self, path: String, convert: F) -> RestPage<R, T>
    where
        F: Fn(&C, &R::Json) -> ApiResult<Vec<T>> + Send + Sync + 'static,
    {
        let converter = Arc::clone(&self.converter);
        RestPage::new(Arc::clone(&self.rest), path, move |json| {
            convert(converter.as_ref(), json)
        })
    }

    pub fn account_info(&self, account_id: AccountId) -> ApiResult<Option<AccountInfo>> {
        let json = self.rest.query_account(account_id)?;
        self.converter.account_info(&json)
    }

    pub fn nfts_for_account(&self, account_id: AccountId) -> RestPage<R, Nft> {
        self.page(self.rest.account_nfts_path(account_id), |c, json| c.nfts(json))
    }

    pub fn token_info(&self, token_id: TokenId) -> ApiResult<Option<TokenInfo>> {
        let json = self.rest.query_token(token_id)?;
        self.converter.token_info(&json)
    }

    pub fn tokens(&self) -> RestPage<R, Token> {
        self.page(self.rest.tokens_path(), |c, json| c.tokens(json))
    }

    pub fn tokens_for_account(&self, account_id: AccountId) -> RestPage<R, Token> {
        self.page(self.rest.tokens_for_account_path(account_id), |c, json| c.tokens(json))
    }

    pub fn token_balances(&self, token_id: TokenId) -> RestPage<R, Balance> {
        self.page(self.rest.token_balances_path(token_id), |c, json| c.balances(json))
    }

    /// The account's balance of one token; absent when the account holds none.
    pub fn token_balance_for_account(
        &self,
        token_id: TokenId,
        account_id: AccountId,
    ) -> ApiResult<Option<Balance>> {
        let json = self
            .rest
            .query_token_balance_for_account(token_id, account_id)?;
        Ok(self
            .converter
            .balances(&json)?
            .into_iter()
            .find(|balance| balance.account_id() == account_id))
    }

    pub fn nfts(&self, token_id: TokenId) -> RestPage<R, Nft> {
        self.page(self.rest.nfts_path(token_id), |c, json| c.nfts(json))
    }

    pub fn nft(&self, token_id: TokenId, serial_number: i64) -> ApiResult<Option<Nft>> {
        let json = self.rest.query_nft(token_id, serial_number)?;
        self.converter.nft(&json)
    }

    pub fn topic(&self, topic_id: TopicId) -> ApiResult<Option<Topic>> {
        let json = self.rest.query_topic(topic_id)?;
        self.converter.topic(&json)
    }

    pub fn topic_messages(&self, topic_id: TopicId) -> RestPage<R, TopicMessage> {
        self.page(self.rest.topic_messages_path(topic_id), |c, json| c.topic_messages(json))
    }

    pub fn topic_message(
        &self,
        topic_id: TopicId,
        sequence_number: u64,
    ) -> ApiResult<Option<TopicMessage>> {
        let json = self.rest.query_topic_message(topic_id, sequence_number)?;
        self.converter.topic_message(&json)
    }

    pub fn transaction(&self, transaction_id: &TransactionId) -> ApiResult<Option<TransactionInfo>> {
        let json = self.rest.query_transaction(transaction_id)?;
        self.converter.transaction(&json)
    }

    pub fn transactions(&self, filter: &TransactionFilter) -> RestPage<R, TransactionInfo> {
        self.page(self.rest.transactions_path(filter), |c, json| c.transactions(json))
    }

    pub fn contract(&self, contract_id: ContractId) -> ApiResult<Option<Contract>> {
        let json = self.rest.query_contract(contract_id)?;
        self.converter.contract(&json)
    }

    pub fn contracts(&self, filter: Option<&ContractFilter>) -> ApiResult<RestPage<R, Contract>> {
        Ok(self.page(self.rest.contracts_path(filter)?, |c, json| c.contracts(json)))
    }

    pub fn contract_logs(&self, contract_id: ContractId) -> RestPage<R, ContractLog> {
        self.page(self.rest.contract_logs_path(contract_id), |c, json| c.contract_logs(json))
    }

    pub fn exchange_rates(&self) -> ApiResult<Option<ExchangeRates>> {
        let json = self.rest.query_exchange_rates()?;
        self.converter.exchange_rates(&json)
    }

    pub fn network_fees(&self) -> ApiResult<Vec<NetworkFee>> {
        let json = self.rest.query_network_fees()?;
        self.converter.network_fees(&json)
    }

    pub fn network_stake(&self) -> ApiResult<Option<NetworkStake>> {
        let json = self.rest.query_network_stake()?;
        self.converter.network_stake(&json)
    }

    pub fn network_supplies(&self) -> ApiResult<Option<NetworkSupplies>> {
        let json = self.rest.query_network_supplies()?;
        self.converter.network_supplies(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::MirrorClient;
    use crate::core::document::Document;
    use crate::core::entity::{AccountId, TokenId, TopicId};
    use crate::core::error::{ApiResult, ErrorKind};
    use crate::mirror::converter::DocumentConverter;
    use crate::mirror::page::Page;
    use crate::mirror::paths::ContractFilter;
    use crate::mirror::rest::RestClient;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves fixtures as `Document`s and records every requested path.
    #[derive(Default)]
    struct FixtureRest {
        fixtures: HashMap<&'static str, Document>,
        requested: Mutex<Vec<String>>,
    }

    impl FixtureRest {
        fn with(mut self, path: &'static str, body: serde_json::Value) -> Self {
            self.fixtures.insert(path, Document::from(body));
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().expect("lock").clone()
        }
    }

    impl RestClient for FixtureRest {
        type Json = Document;

        fn do_get(&self, path: &str) -> ApiResult<Document> {
            self.requested.lock().expect("lock").push(path.to_string());
            Ok(self.fixtures.get(path).cloned().unwrap_or_default())
        }
    }

    #[test]
    fn unknown_account_is_absent() {
        let client = MirrorClient::new(FixtureRest::default(), DocumentConverter);
        let info = client.account_info(AccountId::from_num(404)).expect("query");
        assert!(info.is_none());
        assert_eq!(client.rest().requested(), vec!["/api/v1/accounts/0.0.404"]);
    }

    #[test]
    fn account_balance_reads_nested_tokens() {
        let rest = FixtureRest::default().with(
            "/api/v1/accounts/0.0.100",
            json!({
                "account": "0.0.100",
                "balance": {
                    "balance": 250000000,
                    "timestamp": "1700000000.000000000",
                    "tokens": [{"token_id": "0.0.1001", "balance": 42}]
                },
                "memo": "treasury",
                "key": {"_type": "ED25519", "key": "a5f0b2c3d4e5f60718293a4b5c6d7e8f9a0b1c2d3e4f5a6b7c8d9e0f1a2b3c4d"}
            }),
        );
        let client = MirrorClient::new(rest, DocumentConverter);
        let info = client
            .account_info(AccountId::from_num(100))
            .expect("query")
            .expect("present");
        assert_eq!(info.balance.to_tinybars(), 250_000_000);
        assert_eq!(info.token_balance(TokenId::from_num(1001)), Some(42));
        assert!(info.key.is_some());
    }

    #[test]
    fn token_balance_for_account_picks_the_account() {
        let rest = FixtureRest::default().with(
            "/api/v1/tokens/0.0.1001/balances?account.id=0.0.100",
            json!({"balances": [{"account": "0.0.100", "balance": 500, "decimals": 2}]}),
        );
        let client = MirrorClient::new(rest, DocumentConverter);
        let balance = client
            .token_balance_for_account(TokenId::from_num(1001), AccountId::from_num(100))
            .expect("query")
            .expect("present");
        assert_eq!(balance.balance(), 500);
    }

    #[test]
    fn list_queries_are_lazy() {
        let client = MirrorClient::new(FixtureRest::default(), DocumentConverter);
        let page = client.topic_messages(TopicId::from_num(5));
        assert!(page.is_first());
        assert!(client.rest().requested().is_empty());
        assert_eq!(page.size().expect("size"), 0);
        assert_eq!(
            client.rest().requested(),
            vec!["/api/v1/topics/0.0.5/messages"]
        );
    }

    /// Routes token listings through a gateway prefix.
    struct GatewayRest(FixtureRest);

    impl RestClient for GatewayRest {
        type Json = Document;

        fn do_get(&self, path: &str) -> ApiResult<Document> {
            self.0.do_get(path)
        }

        fn tokens_path(&self) -> String {
            "/gateway/api/v1/tokens".to_string()
        }
    }

    #[test]
    fn list_queries_use_adapter_paths() {
        let rest = GatewayRest(FixtureRest::default().with(
            "/gateway/api/v1/tokens",
            json!({
                "tokens": [{"token_id": "0.0.1001", "symbol": "GW", "name": "Gateway", "type": "FUNGIBLE_COMMON", "decimals": 2}],
                "links": {"next": null}
            }),
        ));
        let client = MirrorClient::new(rest, DocumentConverter);
        let tokens = client.tokens().collect_all().expect("tokens");
        assert_eq!(tokens.len(), 1);
        assert_eq!(client.rest().0.requested(), vec!["/gateway/api/v1/tokens"]);
    }

    #[test]
    fn invalid_arguments_send_nothing() {
        let client = MirrorClient::new(FixtureRest::default(), DocumentConverter);
        let err = client
            .contracts(Some(&ContractFilter::EvmAddress("not-hex".into())))
            .err()
            .expect("evm");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = client.nft(TokenId::from_num(1), -3).expect_err("serial");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(client.rest().requested().is_empty());
    }

    #[test]
    fn network_fees_are_a_plain_list() {
        let rest = FixtureRest::default().with(
            "/api/v1/network/fees",
            json!({
                "fees": [
                    {"gas": 853000, "transaction_type": "ContractCall"},
                    {"gas": 1000000, "transaction_type": "ContractCreate"}
                ],
                "timestamp": "1700000000.000000000"
            }),
        );
        let client = MirrorClient::new(rest, DocumentConverter);
        let fees = client.network_fees().expect("fees");
        assert_eq!(fees.len(), 2);
        assert_eq!(fees[0].transaction_type, "ContractCall");
    }
}

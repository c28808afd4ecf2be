//! Purpose: Map raw mirror responses into domain values.
//! Exports: `Converter`, `DocumentConverter`.
//! Role: The conversion contract the façade and pages are generic over.
//! Invariants: Null or empty documents map to `None` / an empty list, never an error.
//! Invariants: Present-but-malformed fields fail with `ErrorKind::Parse` carrying the document.
use crate::core::document::JsonRepr;
use crate::core::error::ApiResult;
use crate::domain::{
    AccountInfo, Balance, Contract, ContractLog, ExchangeRates, NetworkFee, NetworkStake,
    NetworkSupplies, Nft, Token, TokenInfo, Topic, TopicMessage, TransactionInfo,
};
use crate::mirror::convert::fields::Fields;
use crate::mirror::convert::{account, contract, network, token, topic, transaction};

/// One pure mapping per response kind, over the JSON representation `J`.
///
/// Single-entity endpoints yield `Option`; collection endpoints read their list
/// from a fixed field (`"tokens"`, `"balances"`, `"nfts"`, ...).
pub trait Converter<J>: Send + Sync {
    fn account_info(&self, json: &J) -> ApiResult<Option<AccountInfo>>;

    fn token_info(&self, json: &J) -> ApiResult<Option<TokenInfo>>;

    fn tokens(&self, json: &J) -> ApiResult<Vec<Token>>;

    fn balances(&self, json: &J) -> ApiResult<Vec<Balance>>;

    fn nft(&self, json: &J) -> ApiResult<Option<Nft>>;

    fn nfts(&self, json: &J) -> ApiResult<Vec<Nft>>;

    fn topic(&self, json: &J) -> ApiResult<Option<Topic>>;

    fn topic_message(&self, json: &J) -> ApiResult<Option<TopicMessage>>;

    fn topic_messages(&self, json: &J) -> ApiResult<Vec<TopicMessage>>;

    fn transaction(&self, json: &J) -> ApiResult<Option<TransactionInfo>>;

    fn transactions(&self, json: &J) -> ApiResult<Vec<TransactionInfo>>;

    fn contract(&self, json: &J) -> ApiResult<Option<Contract>>;

    fn contracts(&self, json: &J) -> ApiResult<Vec<Contract>>;

    fn contract_logs(&self, json: &J) -> ApiResult<Vec<ContractLog>>;

    fn exchange_rates(&self, json: &J) -> ApiResult<Option<ExchangeRates>>;

    fn network_fees(&self, json: &J) -> ApiResult<Vec<NetworkFee>>;

    fn network_stake(&self, json: &J) -> ApiResult<Option<NetworkStake>>;

    fn network_supplies(&self, json: &J) -> ApiResult<Option<NetworkSupplies>>;
}

/// The converter for every [`JsonRepr`]: each adapter is viewed as a
/// [`Document`](crate::core::document::Document) and mapped once.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentConverter;

type Mapping<T> = fn(Fields<'_>) -> ApiResult<T>;

fn single<J: JsonRepr, T>(json: &J, context: &'static str, map: Mapping<T>) -> ApiResult<Option<T>> {
    let document = json.as_document();
    if document.is_empty() {
        return Ok(None);
    }
    map(Fields::of(&document, context)?).map(Some)
}

fn collection<J: JsonRepr, T>(
    json: &J,
    key: &'static str,
    context: &'static str,
    map: Mapping<T>,
) -> ApiResult<Vec<T>> {
    let document = json.as_document();
    if document.is_empty() {
        return Ok(Vec::new());
    }
    Fields::of(&document, context)?.list(key, context, map)
}

impl<J: JsonRepr> Converter<J> for DocumentConverter {
    fn account_info(&self, json: &J) -> ApiResult<Option<AccountInfo>> {
        single(json, "account", account::account_info)
    }

    fn token_info(&self, json: &J) -> ApiResult<Option<TokenInfo>> {
        single(json, "token", token::token_info)
    }

    fn tokens(&self, json: &J) -> ApiResult<Vec<Token>> {
        collection(json, "tokens", "tokens", token::token)
    }

    fn balances(&self, json: &J) -> ApiResult<Vec<Balance>> {
        collection(json, "balances", "balances", token::balance)
    }

    fn nft(&self, json: &J) -> ApiResult<Option<Nft>> {
        single(json, "nft", token::nft)
    }

    fn nfts(&self, json: &J) -> ApiResult<Vec<Nft>> {
        collection(json, "nfts", "nfts", token::nft)
    }

    fn topic(&self, json: &J) -> ApiResult<Option<Topic>> {
        single(json, "topic", topic::topic)
    }

    fn topic_message(&self, json: &J) -> ApiResult<Option<TopicMessage>> {
        single(json, "topic_message", topic::topic_message)
    }

    fn topic_messages(&self, json: &J) -> ApiResult<Vec<TopicMessage>> {
        collection(json, "messages", "messages", topic::topic_message)
    }

    /// `/transactions/{id}` answers with a one-element `transactions` list.
    fn transaction(&self, json: &J) -> ApiResult<Option<TransactionInfo>> {
        let document = json.as_document();
        if document.get("transactions").is_none() {
            return single(json, "transaction", transaction::transaction_info);
        }
        let mut transactions = collection(
            json,
            "transactions",
            "transactions",
            transaction::transaction_info,
        )?;
        if transactions.is_empty() {
            return Ok(None);
        }
        Ok(Some(transactions.swap_remove(0)))
    }

    fn transactions(&self, json: &J) -> ApiResult<Vec<TransactionInfo>> {
        collection(
            json,
            "transactions",
            "transactions",
            transaction::transaction_info,
        )
    }

    fn contract(&self, json: &J) -> ApiResult<Option<Contract>> {
        single(json, "contract", contract::contract)
    }

    fn contracts(&self, json: &J) -> ApiResult<Vec<Contract>> {
        collection(json, "contracts", "contracts", contract::contract)
    }

    fn contract_logs(&self, json: &J) -> ApiResult<Vec<ContractLog>> {
        collection(json, "logs", "logs", contract::contract_log)
    }

    fn exchange_rates(&self, json: &J) -> ApiResult<Option<ExchangeRates>> {
        single(json, "exchange_rate", network::exchange_rates)
    }

    fn network_fees(&self, json: &J) -> ApiResult<Vec<NetworkFee>> {
        collection(json, "fees", "fees", network::network_fee)
    }

    fn network_stake(&self, json: &J) -> ApiResult<Option<NetworkStake>> {
        single(json, "stake", network::network_stake)
    }

    fn network_supplies(&self, json: &J) -> ApiResult<Option<NetworkSupplies>> {
        single(json, "supply", network::network_supplies)
    }
}

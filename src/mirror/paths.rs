//! Purpose: Build mirror node REST paths for every query kind.
//! Exports: Path builders, `TransactionFilter`, `ContractFilter`.
//! Role: Shared by every `RestClient`; adapters only execute the GET.
//! Invariants: Builders are pure; bad arguments fail with `InvalidArgument` before any I/O.
//! Invariants: Query strings are form-encoded; returned paths start with `/api/v1/`.
use url::form_urlencoded;

use crate::core::entity::{AccountId, ContractId, FileId, TokenId, TopicId, TransactionId};
use crate::core::error::{ApiResult, Error};
use crate::domain::{BalanceModification, TransactionResultFilter, TransactionType};

pub const API_PREFIX: &str = "/api/v1";

/// Optional narrowing for `/api/v1/transactions`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TransactionFilter {
    pub account_id: Option<AccountId>,
    pub transaction_type: Option<TransactionType>,
    pub result: Option<TransactionResultFilter>,
    pub balance_modification: Option<BalanceModification>,
}

impl TransactionFilter {
    pub fn for_account(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn with_result(mut self, result: TransactionResultFilter) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_balance_modification(mut self, modification: BalanceModification) -> Self {
        self.balance_modification = Some(modification);
        self
    }
}

/// Narrowing for `/api/v1/contracts`; at most one criterion applies.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ContractFilter {
    EvmAddress(String),
    FileId(FileId),
    ProxyAccount(AccountId),
}

pub fn account(account_id: AccountId) -> String {
    format!("{API_PREFIX}/accounts/{account_id}")
}

pub fn account_nfts(account_id: AccountId) -> String {
    format!("{API_PREFIX}/accounts/{account_id}/nfts")
}

pub fn token(token_id: TokenId) -> String {
    format!("{API_PREFIX}/tokens/{token_id}")
}

pub fn tokens() -> String {
    format!("{API_PREFIX}/tokens")
}

pub fn tokens_for_account(account_id: AccountId) -> String {
    with_query(&tokens(), &[("account.id", account_id.to_string())])
}

pub fn token_balances(token_id: TokenId) -> String {
    format!("{API_PREFIX}/tokens/{token_id}/balances")
}

pub fn token_balance_for_account(token_id: TokenId, account_id: AccountId) -> String {
    with_query(
        &token_balances(token_id),
        &[("account.id", account_id.to_string())],
    )
}

pub fn nfts(token_id: TokenId) -> String {
    format!("{API_PREFIX}/tokens/{token_id}/nfts")
}

pub fn nft(token_id: TokenId, serial_number: i64) -> ApiResult<String> {
    if serial_number <= 0 {
        return Err(Error::invalid_argument(format!(
            "serial number must be positive, got {serial_number}"
        )));
    }
    Ok(format!("{}/{serial_number}", nfts(token_id)))
}

pub fn topic(topic_id: TopicId) -> String {
    format!("{API_PREFIX}/topics/{topic_id}")
}

pub fn topic_messages(topic_id: TopicId) -> String {
    format!("{API_PREFIX}/topics/{topic_id}/messages")
}

pub fn topic_message(topic_id: TopicId, sequence_number: u64) -> ApiResult<String> {
    if sequence_number == 0 {
        return Err(Error::invalid_argument("sequence numbers start at 1"));
    }
    Ok(format!("{}/{sequence_number}", topic_messages(topic_id)))
}

pub fn transaction(transaction_id: &TransactionId) -> String {
    format!(
        "{API_PREFIX}/transactions/{}",
        transaction_id.to_mirror_string()
    )
}

pub fn transactions(filter: &TransactionFilter) -> String {
    let mut pairs = Vec::new();
    if let Some(account_id) = filter.account_id {
        pairs.push(("account.id", account_id.to_string()));
    }
    if let Some(transaction_type) = filter.transaction_type {
        pairs.push(("transactiontype", transaction_type.as_str().to_string()));
    }
    if let Some(result) = filter.result {
        pairs.push(("result", result.as_str().to_string()));
    }
    if let Some(modification) = filter.balance_modification {
        pairs.push(("type", modification.as_str().to_string()));
    }
    with_query(&format!("{API_PREFIX}/transactions"), &pairs)
}

pub fn contract(contract_id: ContractId) -> String {
    format!("{API_PREFIX}/contracts/{contract_id}")
}

pub fn contracts(filter: Option<&ContractFilter>) -> ApiResult<String> {
    let base = format!("{API_PREFIX}/contracts");
    let pair = match filter {
        None => return Ok(base),
        Some(ContractFilter::EvmAddress(address)) => ("evm.address", evm_address(address)?),
        Some(ContractFilter::FileId(file_id)) => ("file.id", file_id.to_string()),
        Some(ContractFilter::ProxyAccount(account_id)) => {
            ("proxy.account.id", account_id.to_string())
        }
    };
    Ok(with_query(&base, &[pair]))
}

pub fn contract_logs(contract_id: ContractId) -> String {
    format!("{API_PREFIX}/contracts/{contract_id}/results/logs")
}

pub fn exchange_rate() -> String {
    format!("{API_PREFIX}/network/exchangerate")
}

pub fn network_fees() -> String {
    format!("{API_PREFIX}/network/fees")
}

pub fn network_stake() -> String {
    format!("{API_PREFIX}/network/stake")
}

pub fn network_supply() -> String {
    format!("{API_PREFIX}/network/supply")
}

/// Splits `path?query` into the resource path and its decoded query pairs.
pub fn split_query(path: &str) -> (&str, Vec<(String, String)>) {
    match path.split_once('?') {
        None => (path, Vec::new()),
        Some((resource, query)) => (
            resource,
            form_urlencoded::parse(query.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
        ),
    }
}

fn with_query(base: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return base.to_string();
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    format!("{base}?{}", serializer.finish())
}

fn evm_address(raw: &str) -> ApiResult<String> {
    let digits = raw.trim().strip_prefix("0x").unwrap_or(raw.trim());
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::invalid_argument(format!(
            "'{raw}' is not a 20-byte hex EVM address"
        )));
    }
    Ok(format!("0x{}", digits.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn balance_path_carries_account_filter() {
        let path = token_balance_for_account(TokenId::from_num(1001), AccountId::from_num(100));
        assert_eq!(path, "/api/v1/tokens/0.0.1001/balances?account.id=0.0.100");
    }

    #[test]
    fn transaction_filter_encodes_every_criterion() {
        let filter = TransactionFilter::for_account(AccountId::from_num(2))
            .with_type(TransactionType::CryptoTransfer)
            .with_result(TransactionResultFilter::Success)
            .with_balance_modification(BalanceModification::Debit);
        assert_eq!(
            transactions(&filter),
            "/api/v1/transactions?account.id=0.0.2&transactiontype=CRYPTOTRANSFER&result=success&type=debit"
        );
        assert_eq!(
            transactions(&TransactionFilter::default()),
            "/api/v1/transactions"
        );
    }

    #[test]
    fn transaction_path_uses_mirror_form() {
        let id: TransactionId = "0.0.2@1700000000.000000001".parse().expect("id");
        assert_eq!(
            transaction(&id),
            "/api/v1/transactions/0.0.2-1700000000-000000001"
        );
    }

    #[test]
    fn bad_arguments_fail_before_io() {
        let err = nft(TokenId::from_num(1), 0).expect_err("serial");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = topic_message(TopicId::from_num(1), 0).expect_err("sequence");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = contracts(Some(&ContractFilter::EvmAddress("0x12".into()))).expect_err("evm");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn contract_filters_pick_one_parameter() {
        let address = "0x00000000000000000000000000000000000003E8";
        assert_eq!(
            contracts(Some(&ContractFilter::EvmAddress(address.into()))).expect("path"),
            "/api/v1/contracts?evm.address=0x00000000000000000000000000000000000003e8"
        );
        assert_eq!(
            contracts(Some(&ContractFilter::FileId(FileId::from_num(150)))).expect("path"),
            "/api/v1/contracts?file.id=0.0.150"
        );
    }

    #[test]
    fn split_query_decodes_pairs() {
        let (resource, pairs) =
            split_query("/api/v1/topics/0.0.5/messages?limit=2&timestamp=gt%3A1700000000.1");
        assert_eq!(resource, "/api/v1/topics/0.0.5/messages");
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "2".to_string()),
                ("timestamp".to_string(), "gt:1700000000.1".to_string())
            ]
        );
    }
}

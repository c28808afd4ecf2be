//! Purpose: Resolved client configuration and the network settings registry.
//! Exports: `Operator`, `NetworkSettings`, `ConsensusNode`, `NetworkSettingsProvider`,
//! `NetworkSettingsRegistry`, `BuiltinNetworks`, `JsonSettingsProvider`, `LedgerConfig`.
//! Role: Explicit values handed to clients; nothing here is process-global.
//! Invariants: Registry identifiers are unique and non-empty; duplicates fail at build time.
//! Invariants: The operator's public and private keys use the same algorithm.
use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::document::truncate;
use crate::core::entity::AccountId;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::key::{PrivateKey, PublicKey};

pub const MAINNET: &str = "mainnet";
pub const TESTNET: &str = "testnet";
pub const PREVIEWNET: &str = "previewnet";

/// The account that pays for and authorizes default operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Operator {
    pub account_id: AccountId,
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl Operator {
    pub fn new(
        account_id: AccountId,
        private_key: PrivateKey,
        public_key: PublicKey,
    ) -> ApiResult<Self> {
        if private_key.algorithm() != public_key.algorithm() {
            return Err(Error::invalid_argument(format!(
                "operator keys disagree: private {:?}, public {:?}",
                private_key.algorithm(),
                public_key.algorithm()
            )));
        }
        Ok(Self {
            account_id,
            private_key,
            public_key,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConsensusNode {
    pub address: String,
    pub account_id: AccountId,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub identifier: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub mirror_node_url: Option<String>,
    #[serde(default)]
    pub consensus_nodes: Vec<ConsensusNode>,
}

/// A source of network definitions.
pub trait NetworkSettingsProvider {
    /// Label used in error messages.
    fn name(&self) -> &str;

    fn settings(&self) -> ApiResult<Vec<NetworkSettings>>;
}

/// The public networks, with their mirror nodes and one consensus node each.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinNetworks;

impl NetworkSettingsProvider for BuiltinNetworks {
    fn name(&self) -> &str {
        "builtin"
    }

    fn settings(&self) -> ApiResult<Vec<NetworkSettings>> {
        let network = |identifier: &str, display_name: &str, mirror: &str, node: &str| {
            NetworkSettings {
                identifier: identifier.to_string(),
                display_name: display_name.to_string(),
                mirror_node_url: Some(mirror.to_string()),
                consensus_nodes: vec![ConsensusNode {
                    address: node.to_string(),
                    account_id: AccountId::from_num(3),
                }],
            }
        };
        Ok(vec![
            network(
                MAINNET,
                "Hedera Mainnet",
                "https://mainnet-public.mirrornode.hedera.com",
                "35.237.200.180:50211",
            ),
            network(
                TESTNET,
                "Hedera Testnet",
                "https://testnet.mirrornode.hedera.com",
                "0.testnet.hedera.com:50211",
            ),
            network(
                PREVIEWNET,
                "Hedera Previewnet",
                "https://previewnet.mirrornode.hedera.com",
                "0.previewnet.hedera.com:50211",
            ),
        ])
    }
}

/// Reads one settings object or an array of them from JSON text.
#[derive(Clone, Debug)]
pub struct JsonSettingsProvider {
    name: String,
    text: String,
}

impl JsonSettingsProvider {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<NetworkSettings>),
    One(NetworkSettings),
}

impl NetworkSettingsProvider for JsonSettingsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn settings(&self) -> ApiResult<Vec<NetworkSettings>> {
        let parsed: OneOrMany = serde_json::from_str(&self.text).map_err(|err| {
            Error::new(ErrorKind::Parse)
                .with_message(format!("network settings from '{}' are malformed", self.name))
                .with_document(truncate(&self.text))
                .with_source(err)
        })?;
        Ok(match parsed {
            OneOrMany::Many(settings) => settings,
            OneOrMany::One(settings) => vec![settings],
        })
    }
}

/// Network definitions gathered from providers, keyed by identifier.
#[derive(Clone, Debug, Default)]
pub struct NetworkSettingsRegistry {
    networks: BTreeMap<String, NetworkSettings>,
}

impl NetworkSettingsRegistry {
    pub fn from_providers(providers: &[&dyn NetworkSettingsProvider]) -> ApiResult<Self> {
        let mut registry = Self::default();
        for provider in providers {
            for settings in provider.settings()? {
                registry.insert(settings).map_err(|err| {
                    let message = err.message().unwrap_or("rejected").to_string();
                    Error::invalid_argument(format!("provider '{}': {message}", provider.name()))
                })?;
            }
        }
        tracing::debug!(networks = registry.networks.len(), "network settings registry built");
        Ok(registry)
    }

    /// Only the built-in public networks.
    pub fn builtin() -> ApiResult<Self> {
        Self::from_providers(&[&BuiltinNetworks])
    }

    pub fn insert(&mut self, settings: NetworkSettings) -> ApiResult<()> {
        let identifier = settings.identifier.trim();
        if identifier.is_empty() {
            return Err(Error::invalid_argument("network identifier must not be empty"));
        }
        if self.networks.contains_key(identifier) {
            return Err(Error::invalid_argument(format!(
                "network '{identifier}' is defined twice"
            )));
        }
        self.networks.insert(identifier.to_string(), settings);
        Ok(())
    }

    pub fn get(&self, identifier: &str) -> Option<&NetworkSettings> {
        self.networks.get(identifier)
    }

    pub fn require(&self, identifier: &str) -> ApiResult<&NetworkSettings> {
        self.get(identifier)
            .ok_or_else(|| Error::invalid_argument(format!("unknown network '{identifier}'")))
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }
}

/// The already-resolved configuration handed to the mirror and protocol clients.
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    pub operator: Operator,
    pub network: NetworkSettings,
    pub request_timeout: Option<Duration>,
}

impl LedgerConfig {
    pub fn new(operator: Operator, network: NetworkSettings) -> Self {
        Self {
            operator,
            network,
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn mirror_node_url(&self) -> ApiResult<&str> {
        self.network
            .mirror_node_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "network '{}' has no mirror node",
                    self.network.identifier
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::key::KeyAlgorithm;

    fn operator() -> Operator {
        Operator::new(
            AccountId::from_num(2),
            PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[7; 32]).expect("private"),
            PublicKey::from_bytes(KeyAlgorithm::Ed25519, &[9; 32]).expect("public"),
        )
        .expect("operator")
    }

    #[test]
    fn builtin_registry_knows_public_networks() {
        let registry = NetworkSettingsRegistry::builtin().expect("registry");
        let ids: Vec<&str> = registry.identifiers().collect();
        assert_eq!(ids, vec![MAINNET, PREVIEWNET, TESTNET]);
        let testnet = registry.require(TESTNET).expect("testnet");
        assert_eq!(
            testnet.mirror_node_url.as_deref(),
            Some("https://testnet.mirrornode.hedera.com")
        );
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let custom = JsonSettingsProvider::new(
            "custom.json",
            r#"{"identifier": "testnet", "mirror_node_url": "http://localhost:5551"}"#,
        );
        let err = NetworkSettingsRegistry::from_providers(&[&BuiltinNetworks, &custom])
            .expect_err("duplicate");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("custom.json"));
    }

    #[test]
    fn json_provider_reads_arrays() {
        let provider = JsonSettingsProvider::new(
            "local",
            r#"[{"identifier": "local", "display_name": "Local",
                 "mirror_node_url": "http://127.0.0.1:5551",
                 "consensus_nodes": [{"address": "127.0.0.1:50211", "account_id": "0.0.3"}]}]"#,
        );
        let settings = provider.settings().expect("settings");
        assert_eq!(settings[0].consensus_nodes[0].account_id, AccountId::from_num(3));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let provider = JsonSettingsProvider::new("broken", "{\"identifier\": 4");
        let err = provider.settings().expect_err("broken");
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn missing_mirror_url_is_invalid_argument() {
        let network = NetworkSettings {
            identifier: "isolated".into(),
            display_name: String::new(),
            mirror_node_url: None,
            consensus_nodes: Vec::new(),
        };
        let config = LedgerConfig::new(operator(), network);
        let err = config.mirror_node_url().expect_err("no mirror");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn operator_keys_must_agree() {
        let err = Operator::new(
            AccountId::from_num(2),
            PrivateKey::from_bytes(KeyAlgorithm::Ed25519, &[7; 32]).expect("private"),
            PublicKey::from_bytes(KeyAlgorithm::EcdsaSecp256k1, &[2; 33]).expect("public"),
        )
        .expect_err("mismatch");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}

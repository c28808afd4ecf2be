//! Purpose: Smart contract entities and their emitted logs.
//! Exports: `Contract`, `ContractLog`, `EventDescriptor`.
//! Role: Leaf values; log decoding is delegated to an externally supplied event description.
//! Invariants: A log only projects into an event whose signature matches the log's first topic.
use std::time::Duration;

use time::OffsetDateTime;

use crate::core::entity::{AccountId, ContractId, FileId};
use crate::core::error::{ApiResult, Error};
use crate::core::key::PublicKey;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contract {
    pub contract_id: ContractId,
    pub evm_address: String,
    pub file_id: Option<FileId>,
    pub admin_key: Option<PublicKey>,
    pub memo: String,
    pub auto_renew_account: Option<AccountId>,
    pub auto_renew_period: Option<Duration>,
    pub proxy_account_id: Option<AccountId>,
    pub obtainer_id: Option<AccountId>,
    pub max_automatic_token_associations: i32,
    pub nonce: Option<i64>,
    pub deleted: bool,
    pub permanent_removal: Option<bool>,
    pub created_timestamp: Option<OffsetDateTime>,
    pub expiration_timestamp: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractLog {
    pub address: String,
    pub contract_id: Option<ContractId>,
    pub root_contract_id: Option<ContractId>,
    pub data: Vec<u8>,
    pub index: u32,
    pub topics: Vec<Vec<u8>>,
    pub bloom: Vec<u8>,
    pub block_hash: String,
    pub block_number: i64,
    pub timestamp: Option<OffsetDateTime>,
    pub transaction_hash: String,
    pub transaction_index: Option<i64>,
}

/// Decoding rules for one contract event, owned by an ABI layer outside this crate.
pub trait EventDescriptor {
    type Event;

    fn name(&self) -> &str;

    /// Keccak-256 of the canonical event signature (the log's first topic).
    fn signature_hash(&self) -> &[u8];

    fn decode(&self, indexed: &[Vec<u8>], data: &[u8]) -> ApiResult<Self::Event>;
}

impl ContractLog {
    pub fn matches<D: EventDescriptor>(&self, descriptor: &D) -> bool {
        self.topics
            .first()
            .is_some_and(|topic| topic.as_slice() == descriptor.signature_hash())
    }

    pub fn to_event<D: EventDescriptor>(&self, descriptor: &D) -> ApiResult<D::Event> {
        if !self.matches(descriptor) {
            return Err(Error::invalid_argument(format!(
                "log {} of {} is not a '{}' event",
                self.index,
                self.address,
                descriptor.name()
            )));
        }
        descriptor.decode(&self.topics[1..], &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::{ContractLog, EventDescriptor};
    use crate::core::error::{ApiResult, Error, ErrorKind};

    struct Transfer {
        signature: Vec<u8>,
    }

    impl EventDescriptor for Transfer {
        type Event = (Vec<u8>, Vec<u8>, u64);

        fn name(&self) -> &str {
            "Transfer"
        }

        fn signature_hash(&self) -> &[u8] {
            &self.signature
        }

        fn decode(&self, indexed: &[Vec<u8>], data: &[u8]) -> ApiResult<Self::Event> {
            if indexed.len() != 2 || data.len() < 8 {
                return Err(Error::invalid_argument("bad Transfer layout"));
            }
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&data[data.len() - 8..]);
            Ok((indexed[0].clone(), indexed[1].clone(), u64::from_be_bytes(raw)))
        }
    }

    fn log(topics: Vec<Vec<u8>>) -> ContractLog {
        ContractLog {
            address: "0x00000000000000000000000000000000000003e9".to_string(),
            contract_id: None,
            root_contract_id: None,
            data: 42u64.to_be_bytes().to_vec(),
            index: 0,
            topics,
            bloom: Vec::new(),
            block_hash: String::new(),
            block_number: 1,
            timestamp: None,
            transaction_hash: String::new(),
            transaction_index: None,
        }
    }

    #[test]
    fn matching_log_projects_into_event() {
        let descriptor = Transfer {
            signature: vec![0xdd; 32],
        };
        let event = log(vec![vec![0xdd; 32], vec![1; 32], vec![2; 32]])
            .to_event(&descriptor)
            .expect("event");
        assert_eq!(event.2, 42);
        assert_eq!(event.0, vec![1; 32]);
    }

    #[test]
    fn foreign_log_is_rejected() {
        let descriptor = Transfer {
            signature: vec![0xdd; 32],
        };
        let err = log(vec![vec![0xaa; 32]]).to_event(&descriptor).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(!log(Vec::new()).matches(&descriptor));
    }
}

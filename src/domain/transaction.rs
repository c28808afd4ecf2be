//! Purpose: Historical transaction records and their transfer lists.
//! Exports: `TransactionType`, `TransactionResultFilter`, `BalanceModification`, `TransactionInfo`,
//! `Transfer`, `TokenTransfer`, `NftTransfer`, `StakingRewardTransfer`.
//! Role: Leaf values for transaction history queries.
//! Invariants: Transfer lists preserve the order the mirror node returned.
use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;

use crate::core::amount::Hbar;
use crate::core::entity::{AccountId, TokenId, TransactionId};
use crate::core::status::Status;

macro_rules! transaction_types {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        pub enum TransactionType {
            $($variant,)+
            Unknown,
        }

        impl TransactionType {
            /// Name used by the mirror node, both in records and in the `transactiontype` filter.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(TransactionType::$variant => $name,)+
                    TransactionType::Unknown => "UNKNOWN",
                }
            }
        }

        impl FromStr for TransactionType {
            type Err = std::convert::Infallible;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                Ok(match input {
                    $($name => TransactionType::$variant,)+
                    _ => TransactionType::Unknown,
                })
            }
        }
    };
}

transaction_types! {
    CryptoCreateAccount => "CRYPTOCREATEACCOUNT",
    CryptoUpdateAccount => "CRYPTOUPDATEACCOUNT",
    CryptoDelete => "CRYPTODELETE",
    CryptoTransfer => "CRYPTOTRANSFER",
    FileCreate => "FILECREATE",
    FileAppend => "FILEAPPEND",
    FileUpdate => "FILEUPDATE",
    FileDelete => "FILEDELETE",
    ContractCreateInstance => "CONTRACTCREATEINSTANCE",
    ContractCall => "CONTRACTCALL",
    ContractDeleteInstance => "CONTRACTDELETEINSTANCE",
    TokenCreation => "TOKENCREATION",
    TokenAssociate => "TOKENASSOCIATE",
    TokenDissociate => "TOKENDISSOCIATE",
    TokenMint => "TOKENMINT",
    TokenBurn => "TOKENBURN",
    ConsensusCreateTopic => "CONSENSUSCREATETOPIC",
    ConsensusUpdateTopic => "CONSENSUSUPDATETOPIC",
    ConsensusDeleteTopic => "CONSENSUSDELETETOPIC",
    ConsensusSubmitMessage => "CONSENSUSSUBMITMESSAGE",
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionResultFilter {
    Success,
    Fail,
}

impl TransactionResultFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionResultFilter::Success => "success",
            TransactionResultFilter::Fail => "fail",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BalanceModification {
    Credit,
    Debit,
}

impl BalanceModification {
    pub fn as_str(self) -> &'static str {
        match self {
            BalanceModification::Credit => "credit",
            BalanceModification::Debit => "debit",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transfer {
    pub account_id: AccountId,
    pub amount: Hbar,
    pub is_approval: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenTransfer {
    pub token_id: TokenId,
    pub account_id: AccountId,
    pub amount: i64,
    pub is_approval: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NftTransfer {
    pub token_id: TokenId,
    pub serial_number: i64,
    pub sender_account_id: Option<AccountId>,
    pub receiver_account_id: Option<AccountId>,
    pub is_approval: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakingRewardTransfer {
    pub account_id: AccountId,
    pub amount: Hbar,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionInfo {
    pub transaction_id: TransactionId,
    pub name: TransactionType,
    pub result: Status,
    pub consensus_timestamp: OffsetDateTime,
    pub valid_start_timestamp: Option<OffsetDateTime>,
    pub charged_tx_fee: Hbar,
    pub max_fee: Hbar,
    pub memo: Vec<u8>,
    pub node: Option<AccountId>,
    pub nonce: i32,
    pub scheduled: bool,
    pub entity_id: Option<String>,
    pub transaction_hash: Vec<u8>,
    pub valid_duration_seconds: Option<u64>,
    pub transfers: Vec<Transfer>,
    pub token_transfers: Vec<TokenTransfer>,
    pub nft_transfers: Vec<NftTransfer>,
    pub staking_reward_transfers: Vec<StakingRewardTransfer>,
}

impl TransactionInfo {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// Net hbar movement for one account within this transaction.
    pub fn net_transfer(&self, account_id: AccountId) -> Hbar {
        let tinybars = self
            .transfers
            .iter()
            .filter(|transfer| transfer.account_id == account_id)
            .map(|transfer| transfer.amount.to_tinybars())
            .sum();
        Hbar::from_tinybars(tinybars)
    }
}

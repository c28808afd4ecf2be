//! Purpose: Immutable domain values returned by mirror queries.
//! Exports: Account, token, topic, transaction, contract, fee and network values.
//! Role: Leaves of the dependency graph; no I/O happens here.
//! Invariants: Values that carry domain rules (fees, balances) validate at construction.

pub mod account;
pub mod contract;
pub mod fee;
pub mod network;
pub mod token;
pub mod topic;
pub mod transaction;

pub use account::{AccountInfo, AccountTokenBalance};
pub use contract::{Contract, ContractLog, EventDescriptor};
pub use fee::{CustomFee, FixedFee, FractionalFee, RoyaltyFee};
pub use network::{ExchangeRate, ExchangeRates, NetworkFee, NetworkStake, NetworkSupplies};
pub use token::{Balance, Nft, SupplyType, Token, TokenInfo, TokenType};
pub use topic::{ChunkInfo, Topic, TopicMessage};
pub use transaction::{
    BalanceModification, NftTransfer, StakingRewardTransfer, TokenTransfer, TransactionInfo,
    TransactionResultFilter, TransactionType, Transfer,
};

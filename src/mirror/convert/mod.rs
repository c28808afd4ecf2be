// Document-to-domain mappings, one module per endpoint family.
pub(crate) mod account;
pub(crate) mod contract;
pub(crate) mod fields;
pub(crate) mod network;
pub(crate) mod token;
pub(crate) mod topic;
pub(crate) mod transaction;

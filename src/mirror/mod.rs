//! Purpose: Historical queries against the ledger's mirror node REST API.
//! Exports: `MirrorClient`, `RestClient`, `UreqRestClient`, `Converter`, `DocumentConverter`,
//! `Page`, `RestPage`, `Pages`, path builders and query filters.
//! Role: Fetch is pluggable (`RestClient`), mapping is shared (`DocumentConverter`).
//! Invariants: Paths are built once in `paths`; pagination is implemented once in `page`.

pub mod client;
mod convert;
pub mod converter;
pub mod page;
pub mod paths;
pub mod rest;
pub mod ureq_client;

pub use client::MirrorClient;
pub use converter::{Converter, DocumentConverter};
pub use page::{Page, Pages, RestPage};
pub use paths::{ContractFilter, TransactionFilter};
pub use rest::RestClient;
pub use ureq_client::UreqRestClient;

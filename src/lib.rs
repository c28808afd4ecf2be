//! Purpose: Typed client access layer for a hashgraph-style distributed ledger.
//! Exports: `config`, `core`, `domain`, `mirror` (paginated REST queries), `protocol` (ledger operations).
//! Role: Library crate; signing, consensus transport and settings discovery are injected.
//! Invariants: No process-global state; clients receive an already-resolved `LedgerConfig`.
//! Invariants: Every failure is a `core::error::Error` whose kind separates caller mistakes
//! from service failures.
pub mod config;
pub mod core;
pub mod domain;
pub mod mirror;
pub mod protocol;

pub use config::{LedgerConfig, NetworkSettings, NetworkSettingsRegistry, Operator};
pub use core::error::{ApiResult, Error, ErrorKind};
pub use mirror::{MirrorClient, Page};
pub use protocol::{ProtocolClient, Request};

//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.
//!
//! - **bank_account**: reqwest-backed client for the remote bank-account
//!   service.
//! - **persistence**: in-memory card store for integration tests and
//!   embedding callers.

pub mod bank_account;
pub mod persistence;

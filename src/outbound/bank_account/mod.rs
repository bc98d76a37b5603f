//! Bank-account outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `BankAccountClient` port.

mod dto;
mod http_client;

pub use http_client::HttpBankAccountClient;

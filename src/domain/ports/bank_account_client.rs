//! Port for the remote bank-account service.
//!
//! The bank-account entity is owned entirely by the remote side; this core
//! only reads it and patches its `card_id` back-reference. Snapshots fetched
//! through this port are transient and never persisted locally.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::card::CardId;

/// Validation errors returned when constructing a [`BankAccountId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankAccountIdValidationError {
    Empty,
    ContainsWhitespace,
}

impl fmt::Display for BankAccountIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "bank account id must not be empty"),
            Self::ContainsWhitespace => {
                write!(f, "bank account id must not contain surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for BankAccountIdValidationError {}

/// Opaque identifier of a remote bank-account record.
///
/// The remote service owns the format; this side only requires it to be
/// non-empty, so "linkage requested" can never mean an empty reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BankAccountId(String);

impl BankAccountId {
    /// Validate and construct a [`BankAccountId`] from borrowed input.
    pub fn new(value: impl Into<String>) -> Result<Self, BankAccountIdValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(BankAccountIdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(BankAccountIdValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BankAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for BankAccountId {
    type Error = BankAccountIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BankAccountId> for String {
    fn from(value: BankAccountId) -> Self {
        value.0
    }
}

/// Transient snapshot of a remote bank-account record.
///
/// Only the fields this core acts on are modelled; everything else the remote
/// service returns stays opaque and is dropped at the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccountLink {
    /// Remote identifier of the account.
    pub id: BankAccountId,
    /// Card the account currently points back at, if any. Kept as the remote
    /// side's raw string; foreign linkages are not required to be our ids.
    pub card_id: Option<String>,
}

/// Errors raised by bank-account client adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankAccountClientError {
    /// The remote service has no account with this id.
    #[error("bank account {account_id} not found")]
    NotFound { account_id: String },
    /// The request never produced a usable response.
    #[error("bank account service transport failed: {message}")]
    Transport { message: String },
    /// The remote service answered with a non-success status.
    #[error("bank account service returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },
    /// The response body could not be decoded.
    #[error("bank account response could not be decoded: {message}")]
    Decode { message: String },
}

impl BankAccountClientError {
    /// Helper for missing remote accounts.
    pub fn not_found(account_id: impl Into<String>) -> Self {
        Self::NotFound {
            account_id: account_id.into(),
        }
    }

    /// Helper for transport-level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for non-success upstream statuses.
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            status,
            message: message.into(),
        }
    }

    /// Helper for payload decode failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Port for reading and re-homing remote bank-account records.
///
/// `update_linkage` is idempotent from the caller's perspective: repeating
/// the same linkage update is safe. The client itself never retries; retry
/// policy, if any, belongs to the caller (the coordinator performs none).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BankAccountClient: Send + Sync {
    /// Fetch a bank account by id.
    async fn get_by_id(
        &self,
        id: &BankAccountId,
    ) -> Result<BankAccountLink, BankAccountClientError>;

    /// Point the account's card back-reference at the given card.
    async fn update_linkage(
        &self,
        account_id: &BankAccountId,
        card_id: &CardId,
    ) -> Result<BankAccountLink, BankAccountClientError>;
}

/// Fixture implementation for tests that do not exercise remote linkage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBankAccountClient;

#[async_trait]
impl BankAccountClient for FixtureBankAccountClient {
    async fn get_by_id(
        &self,
        id: &BankAccountId,
    ) -> Result<BankAccountLink, BankAccountClientError> {
        Ok(BankAccountLink {
            id: id.clone(),
            card_id: None,
        })
    }

    async fn update_linkage(
        &self,
        account_id: &BankAccountId,
        card_id: &CardId,
    ) -> Result<BankAccountLink, BankAccountClientError> {
        Ok(BankAccountLink {
            id: account_id.clone(),
            card_id: Some(card_id.to_string()),
        })
    }
}

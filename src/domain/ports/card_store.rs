//! Port for card persistence and lookup.

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use thiserror::Error;

use crate::domain::card::{Card, CardId, Cci};

/// Errors raised by card store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardStoreError {
    /// Store connection could not be established.
    #[error("card store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("card store query failed: {message}")]
    Query { message: String },
    /// A uniqueness guarantee of the backing store was violated.
    #[error("card store constraint violated: {message}")]
    ConstraintViolation { message: String },
}

impl CardStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for uniqueness violations.
    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }
}

/// Port for persisting and retrieving cards.
///
/// Every operation is safe to call concurrently; the store offers no
/// cross-call transaction, each `save` is atomic for a single entity only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Lazy, unbounded, non-restartable sequence of every stored card.
    fn stream_all(&self) -> BoxStream<'static, Result<Card, CardStoreError>>;

    /// Find a card by id.
    async fn find_by_id(&self, id: &CardId) -> Result<Option<Card>, CardStoreError>;

    /// Find a card by its correlation code.
    async fn find_by_cci(&self, cci: &Cci) -> Result<Option<Card>, CardStoreError>;

    /// Upsert a card keyed by its id and return the stored entity.
    async fn save(&self, card: &Card) -> Result<Card, CardStoreError>;

    /// Delete a card by id. Deleting an absent id succeeds.
    async fn delete_by_id(&self, id: &CardId) -> Result<(), CardStoreError>;
}

/// Fixture implementation for tests that do not exercise card persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCardStore;

#[async_trait]
impl CardStore for FixtureCardStore {
    fn stream_all(&self) -> BoxStream<'static, Result<Card, CardStoreError>> {
        stream::empty().boxed()
    }

    async fn find_by_id(&self, _id: &CardId) -> Result<Option<Card>, CardStoreError> {
        Ok(None)
    }

    async fn find_by_cci(&self, _cci: &Cci) -> Result<Option<Card>, CardStoreError> {
        Ok(None)
    }

    async fn save(&self, card: &Card) -> Result<Card, CardStoreError> {
        Ok(card.clone())
    }

    async fn delete_by_id(&self, _id: &CardId) -> Result<(), CardStoreError> {
        Ok(())
    }
}

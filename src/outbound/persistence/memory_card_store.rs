//! In-memory card store adapter.
//!
//! Backs integration tests and embedding callers that need a working store
//! without external infrastructure. The adapter honours the full port
//! contract, including the `cci` uniqueness guarantee the contract ascribes
//! to the backing store and success on absent-id deletes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};

use crate::domain::card::{Card, CardId, Cci};
use crate::domain::ports::{CardStore, CardStoreError};

/// Thread-safe in-memory implementation of the card store port.
#[derive(Debug, Default)]
pub struct InMemoryCardStore {
    cards: Mutex<HashMap<CardId, Card>>,
}

impl InMemoryCardStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CardId, Card>>, CardStoreError> {
        self.cards
            .lock()
            .map_err(|_| CardStoreError::connection("card store lock poisoned"))
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    fn stream_all(&self) -> BoxStream<'static, Result<Card, CardStoreError>> {
        match self.lock() {
            Ok(guard) => {
                let snapshot: Vec<Card> = guard.values().cloned().collect();
                stream::iter(snapshot.into_iter().map(Ok)).boxed()
            }
            Err(error) => stream::iter(vec![Err(error)]).boxed(),
        }
    }

    async fn find_by_id(&self, id: &CardId) -> Result<Option<Card>, CardStoreError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn find_by_cci(&self, cci: &Cci) -> Result<Option<Card>, CardStoreError> {
        Ok(self.lock()?.values().find(|card| card.cci() == cci).cloned())
    }

    async fn save(&self, card: &Card) -> Result<Card, CardStoreError> {
        let mut guard = self.lock()?;
        let duplicate = guard
            .values()
            .any(|existing| existing.cci() == card.cci() && existing.id() != card.id());
        if duplicate {
            return Err(CardStoreError::constraint_violation(format!(
                "cci {} already in use",
                card.cci()
            )));
        }
        guard.insert(*card.id(), card.clone());
        Ok(card.clone())
    }

    async fn delete_by_id(&self, id: &CardId) -> Result<(), CardStoreError> {
        self.lock()?.remove(id);
        Ok(())
    }
}

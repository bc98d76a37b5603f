//! Card domain service.
//!
//! `CardService` sequences every card operation against the driven ports. The
//! load-bearing part is [`CardService::update`]: when the request references
//! a bank account, the remote account is resolved and re-homed to this card
//! before the local row is written, so a failed linkage leaves storage
//! untouched. The inverse race — linkage committed remotely, local save then
//! failing — has no compensation path; it is surfaced as an internal error
//! and logged, never swallowed.

use std::sync::Arc;

use futures_util::stream::{BoxStream, StreamExt};
use mockable::Clock;
use tracing::{debug, error, warn};

use crate::domain::card::{Card, CardId, Cci, CreateCardRequest, UpdateCardRequest};
use crate::domain::card_service_support::{map_linkage_error, map_store_error};
use crate::domain::error::Error;
use crate::domain::ports::{BankAccountClient, CardStore};

/// Coordinator over the card store and the remote bank-account service.
///
/// Stateless between calls: each call starts fresh from storage. Concurrent
/// updates to the same card are not serialised — the read-modify-write
/// sequence carries no lock or version token, so a lost update between two
/// racing callers is possible. A compare-and-swap revision on the store is
/// the known mitigation; it is deliberately not implemented here.
#[derive(Clone)]
pub struct CardService<S, B> {
    store: Arc<S>,
    bank_accounts: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<S, B> CardService<S, B> {
    /// Create a new service over the card store and bank-account client.
    pub fn new(store: Arc<S>, bank_accounts: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            bank_accounts,
            clock,
        }
    }
}

impl<S, B> CardService<S, B>
where
    S: CardStore,
    B: BankAccountClient,
{
    /// Validate the request, mint the card, and persist it.
    ///
    /// Both timestamps are stamped from the injected clock. A duplicate `cci`
    /// surfaces as an invalid request rather than silently replacing the
    /// existing card.
    pub async fn create(&self, request: CreateCardRequest) -> Result<Card, Error> {
        let card = Card::create(request, self.clock.utc())
            .map_err(|err| Error::invalid_request(format!("invalid card request: {err}")))?;

        let saved = self.store.save(&card).await.map_err(|err| {
            error!(error = %err, card_id = %card.id(), "card create failed");
            map_store_error(err)
        })?;
        debug!(card_id = %saved.id(), "card created");
        Ok(saved)
    }

    /// Apply a routine update, re-homing the referenced bank account first
    /// when the request carries one.
    ///
    /// Remote-then-local ordering means a failed linkage aborts before any
    /// local write. No retries are performed: a retried call re-issues the
    /// linkage update, which is safe only because the remote operation is
    /// idempotent.
    pub async fn update(&self, id: CardId, request: UpdateCardRequest) -> Result<Card, Error> {
        debug!(
            card_id = %id,
            linkage = request.bank_account_id.is_some(),
            "updating card"
        );

        let current = self
            .store
            .find_by_id(&id)
            .await
            .map_err(|err| {
                error!(error = %err, card_id = %id, "card lookup failed");
                map_store_error(err)
            })?
            .ok_or_else(|| Error::not_found(format!("card {id} not found")))?;

        let updated = current.with_balance_update(request.balance, self.clock.utc());

        if let Some(account_id) = request.bank_account_id.as_ref() {
            let account = self
                .bank_accounts
                .get_by_id(account_id)
                .await
                .map_err(|err| {
                    warn!(
                        error = %err,
                        bank_account_id = %account_id,
                        card_id = %id,
                        "bank account lookup failed; card left unmodified"
                    );
                    map_linkage_error(account_id, &err)
                })?;

            self.bank_accounts
                .update_linkage(&account.id, current.id())
                .await
                .map_err(|err| {
                    warn!(
                        error = %err,
                        bank_account_id = %account_id,
                        card_id = %id,
                        "bank account linkage update failed; card left unmodified"
                    );
                    map_linkage_error(account_id, &err)
                })?;
        }

        let saved = self.store.save(&updated).await.map_err(|err| {
            if request.bank_account_id.is_some() {
                // The remote account already points at this card; local and
                // remote records now disagree until reconciled out of band.
                error!(
                    error = %err,
                    card_id = %id,
                    "card save failed after remote linkage committed"
                );
            } else {
                error!(error = %err, card_id = %id, "card save failed");
            }
            map_store_error(err)
        })?;

        debug!(card_id = %id, "card updated");
        Ok(saved)
    }

    /// Fetch a card by id.
    pub async fn find_by_id(&self, id: &CardId) -> Result<Card, Error> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|err| {
                error!(error = %err, card_id = %id, "card lookup failed");
                map_store_error(err)
            })?
            .ok_or_else(|| Error::not_found(format!("card {id} not found")))
    }

    /// Fetch a card by its correlation code.
    pub async fn find_by_cci(&self, cci: &Cci) -> Result<Card, Error> {
        self.store
            .find_by_cci(cci)
            .await
            .map_err(|err| {
                error!(error = %err, cci = %cci, "card lookup by cci failed");
                map_store_error(err)
            })?
            .ok_or_else(|| Error::not_found(format!("card with cci {cci} not found")))
    }

    /// Lazy sequence of every stored card, store faults re-classified per
    /// element.
    pub fn stream_all(&self) -> BoxStream<'static, Result<Card, Error>> {
        self.store
            .stream_all()
            .map(|item| {
                item.map_err(|err| {
                    error!(error = %err, "card stream failed");
                    map_store_error(err)
                })
            })
            .boxed()
    }

    /// Delete a card by id. Deleting an absent card is not an error.
    pub async fn delete_by_id(&self, id: &CardId) -> Result<(), Error> {
        self.store.delete_by_id(id).await.map_err(|err| {
            error!(error = %err, card_id = %id, "card delete failed");
            map_store_error(err)
        })?;
        debug!(card_id = %id, "card deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "card_service_tests.rs"]
mod tests;

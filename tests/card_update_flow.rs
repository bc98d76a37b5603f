//! End-to-end coverage of the card service over a live in-memory store.
//!
//! These tests substitute deterministic doubles for the remote bank-account
//! service and a fixture clock, then drive the full update flow through real
//! persistence: linkage failures must leave storage untouched, successful
//! linkage must hit the remote side before the local write.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cardlink::domain::ports::{
    BankAccountClient, BankAccountClientError, BankAccountId, BankAccountLink, CardStore,
};
use cardlink::domain::{
    CardId, CardService, Cci, CreateCardRequest, ErrorCode, UpdateCardRequest,
};
use cardlink::outbound::persistence::InMemoryCardStore;
use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use futures_util::StreamExt;
use mockable::Clock;
use rust_decimal::Decimal;

// -----------------------------------------------------------------------------
// Test doubles
// -----------------------------------------------------------------------------

struct FixtureClock {
    utc_now: Mutex<DateTime<Utc>>,
}

impl FixtureClock {
    fn starting_at(utc_now: DateTime<Utc>) -> Self {
        Self {
            utc_now: Mutex::new(utc_now),
        }
    }

    fn advance_seconds(&self, seconds: i64) {
        let mut guard = self.utc_now.lock().expect("clock lock");
        *guard += TimeDelta::seconds(seconds);
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.utc_now.lock().expect("clock lock")
    }
}

/// Records every remote call and answers from a fixed script.
struct RecordingBankAccountClient {
    calls: Mutex<Vec<String>>,
    fail_lookup: bool,
    fail_linkage: bool,
}

impl RecordingBankAccountClient {
    fn healthy() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_lookup: false,
            fail_linkage: false,
        }
    }

    fn failing_lookup() -> Self {
        Self {
            fail_lookup: true,
            ..Self::healthy()
        }
    }

    fn failing_linkage() -> Self {
        Self {
            fail_linkage: true,
            ..Self::healthy()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call log lock").clone()
    }
}

#[async_trait]
impl BankAccountClient for RecordingBankAccountClient {
    async fn get_by_id(
        &self,
        id: &BankAccountId,
    ) -> Result<BankAccountLink, BankAccountClientError> {
        self.calls
            .lock()
            .expect("call log lock")
            .push(format!("get:{id}"));
        if self.fail_lookup {
            return Err(BankAccountClientError::not_found(id.as_str()));
        }
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
        self.calls
            .lock()
            .expect("call log lock")
            .push(format!("link:{account_id}:{card_id}"));
        if self.fail_linkage {
            return Err(BankAccountClientError::upstream_status(500, "boom"));
        }
        Ok(BankAccountLink {
            id: account_id.clone(),
            card_id: Some(card_id.to_string()),
        })
    }
}

// -----------------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------------

fn opening_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn create_request(cci: &str) -> CreateCardRequest {
    CreateCardRequest {
        card_number: "4551-8976-0132-8845".to_owned(),
        security_code: 318,
        expiration_date: NaiveDate::from_ymd_opt(2028, 9, 30).expect("valid date"),
        cci: Cci::new(cci).expect("valid cci"),
        balance: Decimal::new(10_500, 2),
        bank_name: "BCP".to_owned(),
    }
}

fn account_id() -> BankAccountId {
    BankAccountId::new("6238e1f2a9f5c40012f3b8a1").expect("valid id")
}

struct Harness {
    service: CardService<InMemoryCardStore, RecordingBankAccountClient>,
    store: Arc<InMemoryCardStore>,
    bank: Arc<RecordingBankAccountClient>,
    clock: Arc<FixtureClock>,
}

fn harness(bank: RecordingBankAccountClient) -> Harness {
    let store = Arc::new(InMemoryCardStore::new());
    let bank = Arc::new(bank);
    let clock = Arc::new(FixtureClock::starting_at(opening_time()));
    let service = CardService::new(
        Arc::clone(&store),
        Arc::clone(&bank),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    Harness {
        service,
        store,
        bank,
        clock,
    }
}

// -----------------------------------------------------------------------------
// Flows
// -----------------------------------------------------------------------------

#[tokio::test]
async fn create_then_find_round_trips_the_card() {
    let harness = harness(RecordingBankAccountClient::healthy());

    let created = harness
        .service
        .create(create_request("193-18492329-012"))
        .await
        .expect("create succeeds");

    let fetched = harness
        .service
        .find_by_id(created.id())
        .await
        .expect("lookup succeeds");
    assert_eq!(fetched, created);

    let by_cci = harness
        .service
        .find_by_cci(created.cci())
        .await
        .expect("cci lookup succeeds");
    assert_eq!(by_cci, created);

    assert_eq!(created.card_number(), "4551-8976-0132-8845");
    assert_eq!(created.created_at(), opening_time());
    assert_eq!(created.updated_at(), opening_time());
}

#[tokio::test]
async fn create_rejects_a_duplicate_cci() {
    let harness = harness(RecordingBankAccountClient::healthy());
    harness
        .service
        .create(create_request("193-18492329-012"))
        .await
        .expect("first create succeeds");

    let error = harness
        .service
        .create(create_request("193-18492329-012"))
        .await
        .expect_err("duplicate cci rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn linked_update_calls_the_remote_side_before_the_local_write() {
    let harness = harness(RecordingBankAccountClient::healthy());
    let created = harness
        .service
        .create(create_request("193-18492329-012"))
        .await
        .expect("create succeeds");
    harness.clock.advance_seconds(60);

    let updated = harness
        .service
        .update(
            *created.id(),
            UpdateCardRequest {
                balance: Some(Decimal::new(4_200, 2)),
                bank_account_id: Some(account_id()),
            },
        )
        .await
        .expect("linked update succeeds");

    assert_eq!(updated.balance(), Decimal::new(4_200, 2));
    assert!(
        updated.updated_at() > created.updated_at(),
        "updated_at must strictly advance"
    );
    assert_eq!(
        harness.bank.calls(),
        vec![
            format!("get:{}", account_id()),
            format!("link:{}:{}", account_id(), created.id()),
        ],
        "remote resolution must precede the linkage update"
    );

    let stored = harness
        .service
        .find_by_id(created.id())
        .await
        .expect("lookup succeeds");
    assert_eq!(stored, updated, "the merged entity is what got persisted");
}

#[tokio::test]
async fn failed_account_lookup_leaves_the_stored_card_untouched() {
    let harness = harness(RecordingBankAccountClient::failing_lookup());
    let created = harness
        .service
        .create(create_request("193-18492329-012"))
        .await
        .expect("create succeeds");
    harness.clock.advance_seconds(60);

    let error = harness
        .service
        .update(
            *created.id(),
            UpdateCardRequest {
                balance: Some(Decimal::new(1, 0)),
                bank_account_id: Some(account_id()),
            },
        )
        .await
        .expect_err("invalid reference");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);

    let stored = harness
        .store
        .find_by_id(created.id())
        .await
        .expect("lookup succeeds")
        .expect("card present");
    assert_eq!(stored, created, "storage must be byte-for-byte unchanged");
    assert_eq!(harness.bank.calls(), vec![format!("get:{}", account_id())]);
}

#[tokio::test]
async fn failed_linkage_update_leaves_the_stored_card_untouched() {
    let harness = harness(RecordingBankAccountClient::failing_linkage());
    let created = harness
        .service
        .create(create_request("193-18492329-012"))
        .await
        .expect("create succeeds");
    harness.clock.advance_seconds(60);

    let error = harness
        .service
        .update(
            *created.id(),
            UpdateCardRequest {
                balance: Some(Decimal::new(1, 0)),
                bank_account_id: Some(account_id()),
            },
        )
        .await
        .expect_err("linkage failed");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);

    let stored = harness
        .store
        .find_by_id(created.id())
        .await
        .expect("lookup succeeds")
        .expect("card present");
    assert_eq!(stored, created, "storage must be byte-for-byte unchanged");
}

#[tokio::test]
async fn update_without_linkage_never_touches_the_remote_service() {
    let harness = harness(RecordingBankAccountClient::healthy());
    let created = harness
        .service
        .create(create_request("193-18492329-012"))
        .await
        .expect("create succeeds");
    harness.clock.advance_seconds(30);

    let updated = harness
        .service
        .update(
            *created.id(),
            UpdateCardRequest {
                balance: Some(Decimal::new(9_999, 2)),
                bank_account_id: None,
            },
        )
        .await
        .expect("plain update succeeds");

    assert_eq!(updated.balance(), Decimal::new(9_999, 2));
    assert!(harness.bank.calls().is_empty());
}

#[tokio::test]
async fn update_of_a_missing_card_records_nothing() {
    let harness = harness(RecordingBankAccountClient::healthy());

    let error = harness
        .service
        .update(CardId::random(), UpdateCardRequest::default())
        .await
        .expect_err("missing card");
    assert_eq!(error.code(), ErrorCode::NotFound);

    let cards: Vec<_> = harness.store.stream_all().collect().await;
    assert!(cards.is_empty(), "the store must record no new entity");
}

#[tokio::test]
async fn delete_is_idempotent_through_the_service() {
    let harness = harness(RecordingBankAccountClient::healthy());
    let created = harness
        .service
        .create(create_request("193-18492329-012"))
        .await
        .expect("create succeeds");

    harness
        .service
        .delete_by_id(created.id())
        .await
        .expect("delete succeeds");
    harness
        .service
        .delete_by_id(created.id())
        .await
        .expect("repeat delete succeeds");

    let error = harness
        .service
        .find_by_id(created.id())
        .await
        .expect_err("card gone");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn stream_all_surfaces_every_stored_card() {
    let harness = harness(RecordingBankAccountClient::healthy());
    harness
        .service
        .create(create_request("193-18492329-012"))
        .await
        .expect("create succeeds");
    harness
        .service
        .create(create_request("193-18492329-013"))
        .await
        .expect("create succeeds");

    let cards: Vec<_> = harness.service.stream_all().collect().await;
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(Result::is_ok));
}

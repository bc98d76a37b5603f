//! Domain entities, ports, and the card update coordinator.
//!
//! Purpose: define strongly typed card records and the service that sequences
//! remote bank-account linkage against local persistence. Keep entities
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc.
//!
//! Public surface:
//! - `Card`, `CardId`, `Cci` — the card aggregate and its identifiers.
//! - `CreateCardRequest`, `UpdateCardRequest` — caller-supplied payloads.
//! - `Error`, `ErrorCode` — transport-agnostic error payload.
//! - `CardService` — the coordinator over the driven ports in [`ports`].

pub mod card;
pub mod card_service;
mod card_service_support;
pub mod error;
pub mod ports;

pub use self::card::{
    Card, CardId, CardValidationError, Cci, CciValidationError, CreateCardRequest,
    UpdateCardRequest,
};
pub use self::card_service::CardService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};

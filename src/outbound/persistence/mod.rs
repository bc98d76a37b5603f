//! Persistence adapters for the card store port.

mod memory_card_store;

pub use memory_card_store::InMemoryCardStore;

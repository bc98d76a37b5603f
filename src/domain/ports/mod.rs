//! Driven ports at the edge of the domain.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the card store and the remote bank-account service). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants instead of returning `anyhow::Result`.

mod bank_account_client;
mod card_store;

#[cfg(test)]
pub use bank_account_client::MockBankAccountClient;
pub use bank_account_client::{
    BankAccountClient, BankAccountClientError, BankAccountId, BankAccountIdValidationError,
    BankAccountLink, FixtureBankAccountClient,
};
#[cfg(test)]
pub use card_store::MockCardStore;
pub use card_store::{CardStore, CardStoreError, FixtureCardStore};

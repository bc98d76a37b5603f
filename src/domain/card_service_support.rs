//! Fault classification for the card service.
//!
//! Lower-level port errors are re-classified into the caller-facing taxonomy
//! here. Messages stay generic: raw causes are logged at the call site and
//! never travel in the response payload.

use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{BankAccountClientError, BankAccountId, CardStoreError};

pub(crate) fn map_store_error(error: CardStoreError) -> Error {
    match error {
        CardStoreError::Connection { .. } | CardStoreError::Query { .. } => {
            Error::internal("card store operation failed")
        }
        CardStoreError::ConstraintViolation { message } => {
            Error::invalid_request("card conflicts with an existing record")
                .with_details(json!({ "constraint": message }))
        }
    }
}

/// Every linkage failure, remote not-found included, invalidates the request
/// that referenced the account. The card row has not been written yet when
/// this fires.
pub(crate) fn map_linkage_error(
    account_id: &BankAccountId,
    _error: &BankAccountClientError,
) -> Error {
    Error::invalid_request("bank account reference invalid")
        .with_details(json!({ "bankAccountId": account_id.as_str() }))
}

//! DTOs for the remote bank-account service's JSON wire format.
//!
//! The adapter decodes into these transport DTOs first, then maps into the
//! domain snapshot (`BankAccountLink`) in one pass. The remote payload
//! carries more fields (client, product, balance, timestamps); they are
//! opaque to this core and dropped here.

use serde::{Deserialize, Serialize};

use crate::domain::ports::{BankAccountId, BankAccountLink};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BankAccountLinkDto {
    pub(super) id: String,
    #[serde(default)]
    pub(super) card_id: Option<String>,
}

impl BankAccountLinkDto {
    pub(super) fn into_domain(self) -> Result<BankAccountLink, String> {
        let id = BankAccountId::new(self.id)
            .map_err(|err| format!("payload carries an unusable account id: {err}"))?;
        Ok(BankAccountLink {
            id,
            card_id: self.card_id,
        })
    }
}

/// Body of the linkage update: re-homes the account's card back-reference.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LinkageUpdateDto {
    pub(super) card_id: String,
}

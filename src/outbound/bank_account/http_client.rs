//! Reqwest-backed bank-account client adapter.
//!
//! This adapter owns transport details only: URL construction, timeout and
//! HTTP error mapping, and JSON decoding into the domain snapshot. It never
//! retries; a failed call is reported once and classified upstream.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use super::dto::{BankAccountLinkDto, LinkageUpdateDto};
use crate::domain::card::CardId;
use crate::domain::ports::{
    BankAccountClient, BankAccountClientError, BankAccountId, BankAccountLink,
};

/// Bank-account client that performs HTTP requests against one base address.
pub struct HttpBankAccountClient {
    client: Client,
    base_url: Url,
}

impl HttpBankAccountClient {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn account_url(&self, id: &BankAccountId) -> Result<Url, BankAccountClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BankAccountClientError::transport("bank account base url cannot carry segments")
            })?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl BankAccountClient for HttpBankAccountClient {
    async fn get_by_id(
        &self,
        id: &BankAccountId,
    ) -> Result<BankAccountLink, BankAccountClientError> {
        let url = self.account_url(id)?;
        debug!(bank_account_id = %id, "fetching bank account");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_account(id, response).await
    }

    async fn update_linkage(
        &self,
        account_id: &BankAccountId,
        card_id: &CardId,
    ) -> Result<BankAccountLink, BankAccountClientError> {
        let url = self.account_url(account_id)?;
        debug!(
            bank_account_id = %account_id,
            card_id = %card_id,
            "updating bank account linkage"
        );
        let body = LinkageUpdateDto {
            card_id: card_id.to_string(),
        };
        let response = self
            .client
            .put(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_account(account_id, response).await
    }
}

async fn decode_account(
    id: &BankAccountId,
    response: reqwest::Response,
) -> Result<BankAccountLink, BankAccountClientError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        let error = map_status_error(id, status, body.as_ref());
        warn!(bank_account_id = %id, %status, error = %error, "bank account call failed");
        return Err(error);
    }
    parse_account(body.as_ref())
}

fn parse_account(body: &[u8]) -> Result<BankAccountLink, BankAccountClientError> {
    let decoded: BankAccountLinkDto = serde_json::from_slice(body).map_err(|error| {
        BankAccountClientError::decode(format!("invalid bank account JSON payload: {error}"))
    })?;
    decoded.into_domain().map_err(BankAccountClientError::decode)
}

fn map_transport_error(error: reqwest::Error) -> BankAccountClientError {
    BankAccountClientError::transport(error.to_string())
}

fn map_status_error(
    id: &BankAccountId,
    status: StatusCode,
    body: &[u8],
) -> BankAccountClientError {
    if status == StatusCode::NOT_FOUND {
        return BankAccountClientError::not_found(id.as_str());
    }
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        "no response body".to_owned()
    } else {
        preview
    };
    BankAccountClientError::upstream_status(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

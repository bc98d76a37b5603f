//! Card data model.
//!
//! A [`Card`] is the unit of record. Its descriptive attributes are set at
//! creation and never mutated; a routine update may replace the balance and
//! restamps `updated_at`, nothing else.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ports::BankAccountId;

/// Validation errors returned by [`Card::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardValidationError {
    EmptyCardNumber,
    EmptyBankName,
    SecurityCodeOutOfRange { max: u32 },
    NegativeOpeningBalance,
}

impl fmt::Display for CardValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCardNumber => write!(f, "card number must not be empty"),
            Self::EmptyBankName => write!(f, "bank name must not be empty"),
            Self::SecurityCodeOutOfRange { max } => {
                write!(f, "security code must be at most {max}")
            }
            Self::NegativeOpeningBalance => write!(f, "opening balance must not be negative"),
        }
    }
}

impl std::error::Error for CardValidationError {}

const SECURITY_CODE_MAX: u32 = 9999;

/// Stable card identifier stored as a UUID.
///
/// Minted once when the card is created and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
    /// Generate a new random [`CardId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for CardId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validation errors returned when constructing a [`Cci`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CciValidationError {
    Empty,
    ContainsWhitespace,
}

impl fmt::Display for CciValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "cci must not be empty"),
            Self::ContainsWhitespace => {
                write!(f, "cci must not contain surrounding whitespace")
            }
        }
    }
}

impl std::error::Error for CciValidationError {}

/// Interbank correlation code: the secondary unique lookup key for a card.
///
/// The backing store guarantees at most one card per `cci` value at any time;
/// the coordinator never silently creates duplicates.
///
/// # Examples
/// ```
/// use cardlink::domain::Cci;
///
/// let cci = Cci::new("193-18492329-012").expect("valid cci");
/// assert_eq!(cci.as_str(), "193-18492329-012");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cci(String);

impl Cci {
    /// Validate and construct a [`Cci`] from borrowed input.
    pub fn new(value: impl Into<String>) -> Result<Self, CciValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CciValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CciValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying code as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Cci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Cci {
    type Error = CciValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Cci> for String {
    fn from(value: Cci) -> Self {
        value.0
    }
}

/// The card record.
///
/// ## Invariants
/// - `id`, `card_number`, `security_code`, `expiration_date`, `cci`, and
///   `bank_name` never change after creation.
/// - `created_at` is set once; `updated_at` is restamped on every successful
///   update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    id: CardId,
    card_number: String,
    security_code: u32,
    expiration_date: NaiveDate,
    cci: Cci,
    balance: Decimal,
    bank_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Card {
    /// Validate a creation request and mint a new card.
    ///
    /// Both timestamps are stamped with `now`; the identifier is minted here
    /// so [`super::ports::CardStore::save`] stays a plain upsert.
    pub fn create(request: CreateCardRequest, now: DateTime<Utc>) -> Result<Self, CardValidationError> {
        if request.card_number.trim().is_empty() {
            return Err(CardValidationError::EmptyCardNumber);
        }
        if request.bank_name.trim().is_empty() {
            return Err(CardValidationError::EmptyBankName);
        }
        if request.security_code > SECURITY_CODE_MAX {
            return Err(CardValidationError::SecurityCodeOutOfRange {
                max: SECURITY_CODE_MAX,
            });
        }
        if request.balance.is_sign_negative() {
            return Err(CardValidationError::NegativeOpeningBalance);
        }
        Ok(Self {
            id: CardId::random(),
            card_number: request.card_number,
            security_code: request.security_code,
            expiration_date: request.expiration_date,
            cci: request.cci,
            balance: request.balance,
            bank_name: request.bank_name,
            created_at: now,
            updated_at: now,
        })
    }

    /// Copy of this card with the balance replaced when one is supplied and
    /// `updated_at` restamped. Every other field carries over unchanged.
    pub fn with_balance_update(&self, balance: Option<Decimal>, updated_at: DateTime<Utc>) -> Self {
        Self {
            balance: balance.unwrap_or(self.balance),
            updated_at,
            ..self.clone()
        }
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn card_number(&self) -> &str {
        self.card_number.as_str()
    }

    pub fn security_code(&self) -> u32 {
        self.security_code
    }

    pub fn expiration_date(&self) -> NaiveDate {
        self.expiration_date
    }

    pub fn cci(&self) -> &Cci {
        &self.cci
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn bank_name(&self) -> &str {
        self.bank_name.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Caller-supplied payload for creating a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub card_number: String,
    pub security_code: u32,
    pub expiration_date: NaiveDate,
    pub cci: Cci,
    pub balance: Decimal,
    pub bank_name: String,
}

/// Caller-supplied patch for a routine card update.
///
/// A present `bank_account_id` signals that the remote bank-account record
/// must be re-homed to point at this card before the local write happens.
/// Presence is tested directly on the option; there is no field probing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_id: Option<BankAccountId>,
}

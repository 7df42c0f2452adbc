//! Buyer details captured by the checkout form.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::lenient;
use super::validation::{ValidationError, blank_fields};

/// One field of the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuyerField {
    Name,
    Email,
    Address,
    PaymentInfo,
}

impl BuyerField {
    /// All fields, in form order.
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Address, Self::PaymentInfo];

    /// JSON key used in the stored draft.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
            Self::PaymentInfo => "paymentInfo",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Full Name",
            Self::Email => "Email Address",
            Self::Address => "Shipping Address",
            Self::PaymentInfo => "Credit Card Details",
        }
    }
}

impl FromStr for BuyerField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "address" => Ok(Self::Address),
            "paymentInfo" | "payment_info" | "payment-info" => Ok(Self::PaymentInfo),
            _ => Err(format!("unknown checkout field: {s}")),
        }
    }
}

/// Draft buyer details.
///
/// Persisted on every edit and cleared after a successful order. Implements
/// `Debug` manually to redact the payment details.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub payment_info: String,
}

impl std::fmt::Debug for BuyerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuyerInfo")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("address", &self.address)
            .field("payment_info", &"[REDACTED]")
            .finish()
    }
}

impl BuyerInfo {
    /// Current value of a field.
    #[must_use]
    pub fn get(&self, field: BuyerField) -> &str {
        match field {
            BuyerField::Name => &self.name,
            BuyerField::Email => &self.email,
            BuyerField::Address => &self.address,
            BuyerField::PaymentInfo => &self.payment_info,
        }
    }

    /// Replace the value of a field.
    pub fn set(&mut self, field: BuyerField, value: impl Into<String>) {
        let value = value.into();
        match field {
            BuyerField::Name => self.name = value,
            BuyerField::Email => self.email = value,
            BuyerField::Address => self.address = value,
            BuyerField::PaymentInfo => self.payment_info = value,
        }
    }

    /// Whether every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        BuyerField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Check the form before submission.
    ///
    /// Blank fields are reported before a malformed email.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequiredFields`] if any field is blank,
    /// or [`ValidationError::InvalidEmail`] if the email is malformed.
    pub fn validate(&self) -> Result<Email, ValidationError> {
        let missing = blank_fields(BuyerField::ALL.map(|f| (f.key(), self.get(f))));
        if !missing.is_empty() {
            return Err(ValidationError::MissingRequiredFields { missing });
        }

        Email::parse(&self.email).map_err(ValidationError::InvalidEmail)
    }
}

//! Client-side form validation errors.
//!
//! Messages are shown inline next to the form and are recoverable by
//! editing the offending field.

use thiserror::Error;

use super::email::EmailError;

/// Reasons a form is refused before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A checkout field is blank.
    #[error("Please fill out all required fields.")]
    MissingRequiredFields {
        /// Storage keys of the blank fields, in form order.
        missing: Vec<&'static str>,
    },

    /// A contact form field is blank.
    #[error("Please fill in all fields.")]
    IncompleteForm {
        /// Names of the blank fields, in form order.
        missing: Vec<&'static str>,
    },

    /// The email field does not look like an address.
    #[error("Please enter a valid email address.")]
    InvalidEmail(#[source] EmailError),
}

impl ValidationError {
    /// Fields that caused the failure.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::MissingRequiredFields { missing } | Self::IncompleteForm { missing } => {
                missing.clone()
            }
            Self::InvalidEmail(_) => vec!["email"],
        }
    }
}

/// Collect the names of empty fields. Whitespace counts as content.
pub(crate) fn blank_fields<'a>(
    fields: impl IntoIterator<Item = (&'static str, &'a str)>,
) -> Vec<&'static str> {
    fields
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
}

//! Customer queries submitted through the contact form.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::email::Email;
use super::id::QueryId;
use super::lenient;
use super::status::QueryStatus;
use super::validation::{ValidationError, blank_fields};

/// A query as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QueryId>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: String,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub automated_response: Option<String>,
    #[serde(default)]
    pub status: QueryStatus,
    #[serde(
        default,
        deserialize_with = "lenient::opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Query {
    /// The automated response, if it has visible text.
    #[must_use]
    pub fn visible_response(&self) -> Option<&str> {
        self.automated_response
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// One page of the query history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage {
    pub queries: Vec<Query>,
    /// Number of queries across all pages.
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_count: u64,
}

impl QueryPage {
    /// Decode a page from a raw response body.
    ///
    /// Returns `None` when the body has no `queries` array. Elements that are
    /// not objects (or carry an undecodable `_id`) are dropped.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut body) = value else {
            return None;
        };
        let Some(Value::Array(items)) = body.remove("queries") else {
            return None;
        };

        let queries = items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        let total_count = body
            .remove("totalCount")
            .and_then(|v| lenient::count(v).ok())
            .unwrap_or(0);

        Some(Self {
            queries,
            total_count,
        })
    }
}

/// Body of `POST /api/queries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuery {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Reply chosen locally before submission.
    pub automated_response: String,
}

/// One field of the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryField {
    Name,
    Email,
    Message,
}

impl QueryField {
    /// All fields, in form order.
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Message];

    /// Form field name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}

impl FromStr for QueryField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "message" => Ok(Self::Message),
            _ => Err(format!("unknown query field: {s}")),
        }
    }
}

/// Contact form state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl QueryForm {
    /// Create a filled-in form.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Current value of a field.
    #[must_use]
    pub fn get(&self, field: QueryField) -> &str {
        match field {
            QueryField::Name => &self.name,
            QueryField::Email => &self.email,
            QueryField::Message => &self.message,
        }
    }

    /// Replace the value of a field.
    pub fn set(&mut self, field: QueryField, value: impl Into<String>) {
        let value = value.into();
        match field {
            QueryField::Name => self.name = value,
            QueryField::Email => self.email = value,
            QueryField::Message => self.message = value,
        }
    }

    /// Check the form before submission.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompleteForm`] if any field is blank, or
    /// [`ValidationError::InvalidEmail`] if the email is malformed.
    pub fn validate(&self) -> Result<Email, ValidationError> {
        let missing = blank_fields(QueryField::ALL.map(|f| (f.key(), self.get(f))));
        if !missing.is_empty() {
            return Err(ValidationError::IncompleteForm { missing });
        }

        Email::parse(&self.email).map_err(ValidationError::InvalidEmail)
    }

    /// Build the request body with the locally chosen reply.
    #[must_use]
    pub fn to_new_query(&self, automated_response: impl Into<String>) -> NewQuery {
        NewQuery {
            name: self.name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
            automated_response: automated_response.into(),
        }
    }
}

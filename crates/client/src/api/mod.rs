//! Storefront backend API.
//!
//! # Endpoints
//!
//! - `GET /api/automated-responses` - canned replies and their keywords
//! - `GET /api/queries?page=&limit=` - one page of the query history
//! - `POST /api/queries` - submit a contact query
//! - `POST /api/checkout` - place the order for the server-side cart
//!
//! Workflows talk to the backend through [`StoreApi`] so tests can replace
//! the HTTP client with an in-memory fake.

mod client;
mod error;

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use iwb_core::{AutomatedResponseRule, NewQuery, Query, QueryPage, lenient};

pub use client::{ApiClient, REQUEST_ID_HEADER};
pub use error::{ApiError, ErrorBody};

/// Operations the storefront workflows need from the backend.
pub trait StoreApi: Sync {
    /// Fetch the automated-response rules.
    ///
    /// A body that is not a JSON array is an [`ApiError::Decode`].
    fn automated_responses(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomatedResponseRule>, ApiError>> + Send;

    /// Fetch one page of the query history (`page` is 1-based).
    ///
    /// A body without a `queries` array is an [`ApiError::Decode`].
    fn queries(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<QueryPage, ApiError>> + Send;

    /// Submit a contact query. Returns the created record when the backend
    /// echoes one back in a recognizable shape.
    fn create_query(
        &self,
        query: &NewQuery,
    ) -> impl Future<Output = Result<Option<Query>, ApiError>> + Send;

    /// Place the order for the shopper's server-side cart.
    fn checkout(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, ApiError>> + Send;
}

impl<T: StoreApi + ?Sized> StoreApi for &T {
    fn automated_responses(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomatedResponseRule>, ApiError>> + Send {
        (**self).automated_responses()
    }

    fn queries(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<QueryPage, ApiError>> + Send {
        (**self).queries(page, limit)
    }

    fn create_query(
        &self,
        query: &NewQuery,
    ) -> impl Future<Output = Result<Option<Query>, ApiError>> + Send {
        (**self).create_query(query)
    }

    fn checkout(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<OrderConfirmation, ApiError>> + Send {
        (**self).checkout(request)
    }
}

/// Body of `POST /api/checkout`.
///
/// The backend derives items and totals from its own copy of the cart, so
/// only the customer name is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_name: String,
}

/// Successful checkout response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OrderConfirmation {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub message: Option<String>,
    /// Remaining fields (order number, sale record, ...), passed through as-is.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl OrderConfirmation {
    /// Interpret any JSON body; non-object bodies carry no details.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        if value.is_object() {
            serde_json::from_value(value).unwrap_or_default()
        } else {
            Self::default()
        }
    }
}

//! IWB storefront client library.
//!
//! Drives the two shopper-facing workflows of the storefront against its REST
//! backend:
//!
//! - **Checkout** ([`checkout`]) - buyer draft kept in local storage, validated
//!   and submitted together with the cart snapshot left by the cart page.
//! - **Customer queries** ([`queries`]) - contact form whose automated reply is
//!   chosen locally by the [`matcher`], plus a paginated history of previous
//!   queries ([`pagination`]).
//!
//! # Architecture
//!
//! ```text
//! view ◄── checkout / queries ──► api (StoreApi) ──► backend
//!                 │       │
//!                 │       └──► matcher, pagination
//!                 └──► storage (LocalStore)
//! ```
//!
//! Workflows are generic over [`api::StoreApi`] and [`storage::LocalStore`]
//! so tests swap in fakes for the backend and the draft store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod matcher;
pub mod pagination;
pub mod queries;
pub mod storage;
pub mod view;

pub use api::{ApiClient, ApiError, StoreApi};
pub use checkout::CheckoutSession;
pub use config::ClientConfig;
pub use error::ClientError;
pub use queries::QueryDesk;

//! Core types for IWB.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod buyer;
pub mod cart;
pub mod email;
pub mod id;
pub mod lenient;
pub mod price;
pub mod query;
pub mod response_rule;
pub mod status;
pub mod validation;

pub use buyer::{BuyerField, BuyerInfo};
pub use cart::{CartItem, CartSnapshot};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use query::{NewQuery, Query, QueryField, QueryForm, QueryPage};
pub use response_rule::AutomatedResponseRule;
pub use status::QueryStatus;
pub use validation::ValidationError;

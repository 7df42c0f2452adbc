//! IWB Core - Shared types library.
//!
//! This crate provides the domain records used across the IWB components:
//! - `client` - Checkout and customer-query workflows, API client, storage
//! - `cli` - Command-line front end driving those workflows
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and records for buyers, carts, queries and
//!   automated-response rules, plus form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Checkout workflow.
//!
//! A [`CheckoutSession`] owns the buyer draft and the cart snapshot for one
//! checkout. Every field edit is persisted so the draft survives restarts;
//! a successful order clears all checkout keys from storage.
//!
//! ```text
//! Editing ──submit──► Submitting ──2xx──► Succeeded(summary)
//!    ▲                    │
//!    └──────retry──── Failed ◄──error──┘
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use iwb_core::{BuyerField, BuyerInfo, CartItem, CartSnapshot, Price, ValidationError};

use crate::api::{ApiError, CheckoutRequest, OrderConfirmation, StoreApi};
use crate::storage::{CheckoutStorage, LocalStore, StorageError};

/// Shown when a failed order carries no better explanation.
pub const ORDER_FAILED_MESSAGE: &str = "Failed to process your order. Please try again.";

/// What the shopper sees after the order went through.
///
/// Built from the cart snapshot and draft as they were before submission,
/// since both are cleared once the order is placed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub items: Vec<CartItem>,
    pub total: Decimal,
    /// Address the confirmation email goes to.
    pub email: Option<String>,
    pub confirmation: OrderConfirmation,
}

impl OrderSummary {
    #[must_use]
    pub const fn total_price(&self) -> Price {
        Price::usd(self.total)
    }
}

/// Where the checkout stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CheckoutStatus {
    /// Form is editable (possibly showing a validation error).
    #[default]
    Editing,
    /// Order request is in flight.
    Submitting,
    /// Order placed.
    Succeeded(OrderSummary),
    /// Order request failed; `retry` returns to editing.
    Failed,
}

/// Why a submission did not place an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("An order is already being submitted")]
    Busy,

    #[error("This order has already been placed")]
    Completed,

    #[error("{message}")]
    Api {
        #[source]
        source: ApiError,
        /// Text shown to the shopper.
        message: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One checkout, from draft to placed order.
#[derive(Debug)]
pub struct CheckoutSession<A, S> {
    api: A,
    storage: CheckoutStorage<S>,
    buyer: BuyerInfo,
    cart: CartSnapshot,
    status: CheckoutStatus,
    error: Option<String>,
}

impl<A: StoreApi, S: LocalStore> CheckoutSession<A, S> {
    /// Load the cart snapshot and buyer draft from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. Malformed stored values
    /// are not errors; they load as empty.
    pub fn open(api: A, store: S) -> Result<Self, StorageError> {
        let storage = CheckoutStorage::new(store);
        let cart = storage.load_cart()?;
        let buyer = storage.load_buyer_info()?;

        tracing::debug!(
            items = cart.items.len(),
            total = %cart.total,
            user_id = %cart.user_id,
            "Opened checkout"
        );

        Ok(Self {
            api,
            storage,
            buyer,
            cart,
            status: CheckoutStatus::Editing,
            error: None,
        })
    }

    #[must_use]
    pub const fn buyer(&self) -> &BuyerInfo {
        &self.buyer
    }

    #[must_use]
    pub const fn cart(&self) -> &CartSnapshot {
        &self.cart
    }

    #[must_use]
    pub const fn status(&self) -> &CheckoutStatus {
        &self.status
    }

    /// Message for the error banner, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, CheckoutStatus::Submitting)
    }

    /// Whether the submit control is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        matches!(self.status, CheckoutStatus::Editing) && !self.cart.is_empty()
    }

    /// Change one buyer field and persist the whole draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft cannot be written; the in-memory value is
    /// updated regardless.
    pub fn update_field(
        &mut self,
        field: BuyerField,
        value: impl Into<String>,
    ) -> Result<(), StorageError> {
        self.buyer.set(field, value);
        self.storage.save_buyer_info(&self.buyer)
    }

    /// Validate the draft and place the order.
    ///
    /// Validation failures make no request. On success the checkout keys are
    /// cleared from storage and the in-memory state is reset; on failure the
    /// stored draft is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] for an incomplete draft,
    /// [`CheckoutError::Busy`]/[`CheckoutError::Completed`] when the session
    /// cannot submit, and [`CheckoutError::Api`] when the backend rejects the
    /// order or cannot be reached.
    #[instrument(skip(self), fields(items = self.cart.items.len()))]
    pub async fn submit(&mut self) -> Result<OrderSummary, CheckoutError> {
        match self.status {
            CheckoutStatus::Submitting => return Err(CheckoutError::Busy),
            CheckoutStatus::Succeeded(_) => return Err(CheckoutError::Completed),
            CheckoutStatus::Editing | CheckoutStatus::Failed => {}
        }

        self.error = None;

        if let Err(e) = self.buyer.validate() {
            tracing::info!(fields = ?e.fields(), "Checkout form is incomplete");
            self.error = Some(e.to_string());
            return Err(e.into());
        }

        self.status = CheckoutStatus::Submitting;
        let request = CheckoutRequest {
            customer_name: self.buyer.name.clone(),
        };

        match self.api.checkout(&request).await {
            Ok(confirmation) => {
                tracing::info!(message = ?confirmation.message, "Order placed");
                Ok(self.complete(confirmation))
            }
            Err(source) => {
                let message = order_failure_message(&source);
                tracing::error!(error = %source, "Order failed");
                self.error = Some(message.clone());
                self.status = CheckoutStatus::Failed;
                Err(CheckoutError::Api { source, message })
            }
        }
    }

    /// Leave the failed state so the form can be submitted again.
    ///
    /// The error banner stays until the next submission.
    pub fn retry(&mut self) {
        if matches!(self.status, CheckoutStatus::Failed) {
            self.status = CheckoutStatus::Editing;
        }
    }

    fn complete(&mut self, confirmation: OrderConfirmation) -> OrderSummary {
        let cart = std::mem::take(&mut self.cart);
        let buyer = std::mem::take(&mut self.buyer);

        // Order is already placed; a failed clear is only logged
        if let Err(e) = self.storage.clear_checkout() {
            tracing::warn!(error = %e, "Order placed but local checkout data was not cleared");
        }

        let summary = OrderSummary {
            items: cart.items,
            total: cart.total,
            email: Some(buyer.email).filter(|e| !e.is_empty()),
            confirmation,
        };

        self.status = CheckoutStatus::Succeeded(summary.clone());
        summary
    }
}

/// Text for the error banner after a failed order request.
#[must_use]
pub fn order_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { message, .. } => message.clone(),
        ApiError::NoResponse(_) => err.to_string(),
        ApiError::Setup(_) | ApiError::Decode(_) => ORDER_FAILED_MESSAGE.to_string(),
    }
}

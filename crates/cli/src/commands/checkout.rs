//! Place the order for the staged cart.
//!
//! # Usage
//!
//! ```bash
//! iwb checkout
//! ```
//!
//! Reads the buyer draft and cart snapshot from the data directory. On
//! success both are cleared; on failure they are kept so the order can be
//! retried after fixing the draft.

use iwb_client::CheckoutSession;
use iwb_client::checkout::CheckoutError;
use iwb_client::view;

use super::Context;
use crate::output;

/// Validate the draft and submit the order.
///
/// The rendered checkout screen is printed in every case.
///
/// # Errors
///
/// Returns an error if the cart is empty, the draft is incomplete, or the
/// backend rejects the order.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CheckoutSession::open(&ctx.api, &ctx.store)?;

    if !session.can_submit() {
        output::print(&view::render_checkout(&session));
        return Err("Cart is empty: stage items with `iwb cart stage` first".into());
    }

    let result = session.submit().await;
    output::print(&view::render_checkout(&session));

    match result {
        Ok(summary) => {
            tracing::info!(items = summary.items.len(), total = %summary.total, "Checkout complete");
            Ok(())
        }
        Err(CheckoutError::Validation(e)) => Err(format!("Checkout form is incomplete: {e}").into()),
        Err(e) => Err(e.into()),
    }
}

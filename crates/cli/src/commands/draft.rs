//! Buyer draft commands.
//!
//! # Usage
//!
//! ```bash
//! iwb draft show
//! iwb draft set --email ada@example.com
//! iwb draft clear
//! ```

use iwb_client::CheckoutSession;
use iwb_client::storage::CheckoutStorage;
use iwb_client::view;
use iwb_core::BuyerField;

use super::Context;
use crate::output;

/// Fields given on the command line; `None` leaves a field unchanged.
#[derive(Debug, Default)]
pub struct DraftUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub payment_info: Option<String>,
}

impl DraftUpdate {
    fn into_fields(self) -> impl Iterator<Item = (BuyerField, String)> {
        [
            (BuyerField::Name, self.name),
            (BuyerField::Email, self.email),
            (BuyerField::Address, self.address),
            (BuyerField::PaymentInfo, self.payment_info),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
    }
}

/// Print the saved draft.
///
/// # Errors
///
/// Returns an error if the draft store cannot be read.
pub fn show(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let buyer = CheckoutStorage::new(&ctx.store).load_buyer_info()?;
    if buyer.is_empty() {
        output::print("No buyer details saved.");
    } else {
        output::print(&view::render_buyer_form(&buyer));
    }
    Ok(())
}

/// Apply the given field updates, persisting after each one.
///
/// # Errors
///
/// Returns an error if no field was given or the draft cannot be written.
pub fn set(ctx: &Context, update: DraftUpdate) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CheckoutSession::open(&ctx.api, &ctx.store)?;

    let mut changed = 0_usize;
    for (field, value) in update.into_fields() {
        session.update_field(field, value)?;
        changed += 1;
    }

    if changed == 0 {
        return Err("Nothing to update: pass at least one of --name, --email, --address, --payment-info".into());
    }

    tracing::info!(fields = changed, "Buyer draft updated");
    output::print(&view::render_buyer_form(session.buyer()));
    Ok(())
}

/// Forget the saved draft. The staged cart is kept.
///
/// # Errors
///
/// Returns an error if the draft store cannot be written.
pub fn clear(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    CheckoutStorage::new(&ctx.store).clear_buyer_info()?;
    tracing::info!("Buyer draft cleared");
    Ok(())
}

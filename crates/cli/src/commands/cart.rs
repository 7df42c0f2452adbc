//! Cart snapshot commands.
//!
//! The storefront's cart page normally writes the snapshot checkout reads;
//! `stage` does the same from the command line.
//!
//! # Usage
//!
//! ```bash
//! iwb cart stage --item "Lavender Soap:2:4.50" --item "Loofah:1:3.00" --user-id u-42
//! iwb cart show
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use iwb_client::storage::CheckoutStorage;
use iwb_client::view;
use iwb_core::{CartItem, CartSnapshot, UserId};

use super::Context;
use crate::output;

/// Errors in a `NAME:QUANTITY:UNIT_PRICE` argument.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartLineError {
    #[error("expected NAME:QUANTITY:UNIT_PRICE, got '{0}'")]
    Format(String),

    #[error("invalid quantity '{0}'")]
    Quantity(String),

    #[error("invalid unit price '{0}'")]
    Price(String),
}

/// One `--item` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine(pub CartItem);

/// Parse `NAME:QUANTITY:UNIT_PRICE`. The name may itself contain colons.
///
/// # Errors
///
/// Returns an error if a part is missing, the quantity is not a positive
/// integer, or the price is not a non-negative decimal.
pub fn parse_line(s: &str) -> Result<CartLine, CartLineError> {
    let mut parts = s.rsplitn(3, ':');
    let (Some(price), Some(quantity), Some(name)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(CartLineError::Format(s.to_string()));
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(CartLineError::Format(s.to_string()));
    }

    let quantity = quantity
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| CartLineError::Quantity(quantity.to_string()))?;

    let price = price
        .trim()
        .parse::<Decimal>()
        .ok()
        .filter(|p| !p.is_sign_negative())
        .ok_or_else(|| CartLineError::Price(price.to_string()))?;

    Ok(CartLine(CartItem::new(name, quantity, price)))
}

/// Print the staged cart.
///
/// # Errors
///
/// Returns an error if the draft store cannot be read.
pub fn show(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let cart = CheckoutStorage::new(&ctx.store).load_cart()?;
    output::print(&format!("Cart for {}", cart.user_id));
    output::print(&view::render_cart(&cart));
    Ok(())
}

/// Record a cart snapshot for checkout.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be written.
pub fn stage(
    ctx: &Context,
    lines: Vec<CartLine>,
    total: Option<Decimal>,
    user_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let items: Vec<CartItem> = lines.into_iter().map(|line| line.0).collect();
    let total = total.unwrap_or_else(|| sum_lines(&items));

    let cart = CartSnapshot {
        items,
        total,
        user_id: UserId::new(user_id),
    };
    CheckoutStorage::new(&ctx.store).stage_cart(&cart)?;

    tracing::info!(items = cart.items.len(), total = %cart.total, "Cart staged");
    output::print(&view::render_cart(&cart));
    Ok(())
}

fn sum_lines(items: &[CartItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.line_total().amount)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let CartLine(item) = parse_line("Lavender Soap:2:4.50").unwrap();
        assert_eq!(item.display_name(), "Lavender Soap");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.price, Decimal::new(450, 2));
    }

    #[test]
    fn test_parse_line_name_with_colon() {
        let CartLine(item) = parse_line("Gift Set: Deluxe:1:20").unwrap();
        assert_eq!(item.display_name(), "Gift Set: Deluxe");
    }

    #[test]
    fn test_parse_line_errors() {
        assert!(matches!(parse_line("Soap:2"), Err(CartLineError::Format(_))));
        assert!(matches!(parse_line(":2:4.50"), Err(CartLineError::Format(_))));
        assert!(matches!(parse_line("Soap:0:4.50"), Err(CartLineError::Quantity(_))));
        assert!(matches!(parse_line("Soap:two:4.50"), Err(CartLineError::Quantity(_))));
        assert!(matches!(parse_line("Soap:1:-1"), Err(CartLineError::Price(_))));
        assert!(matches!(parse_line("Soap:1:cheap"), Err(CartLineError::Price(_))));
    }

    #[test]
    fn test_sum_lines() {
        let items = vec![
            CartItem::new("Soap", 2, Decimal::new(450, 2)),
            CartItem::new("Loofah", 1, Decimal::new(300, 2)),
        ];
        assert_eq!(sum_lines(&items), Decimal::new(1200, 2));
    }

    #[test]
    fn test_sum_lines_saturates() {
        let items = vec![
            CartItem::new("Gold Bar", 2, Decimal::MAX),
            CartItem::new("Loofah", 1, Decimal::new(300, 2)),
        ];
        assert_eq!(sum_lines(&items), Decimal::MAX);
    }
}

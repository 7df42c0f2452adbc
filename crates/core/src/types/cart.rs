//! Cart snapshot handed from the cart page to checkout.
//!
//! Checkout only displays these records; the backend derives the real order
//! contents from its own copy of the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::lenient;
use super::price::Price;

/// A line in the cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Backend document ID, when the cart page recorded one.
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::count_u32")]
    pub quantity: u32,
    /// Unit price in dollars.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub price: Decimal,
}

impl CartItem {
    /// Create a line from a name, quantity and unit price.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self {
            name: Some(name.into()),
            quantity,
            price,
            ..Self::default()
        }
    }

    /// Name shown in summaries.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("Product")
    }

    /// Unit price times quantity, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::usd(self.price.saturating_mul(Decimal::from(self.quantity)))
    }
}

/// Items, total and shopper recorded by the cart page for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    /// Order total as computed by the cart page.
    pub total: Decimal,
    pub user_id: UserId,
}

impl CartSnapshot {
    /// Whether the snapshot holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The total as a displayable price.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        Price::usd(self.total)
    }
}

//! Plain-text rendering of the checkout and query screens.
//!
//! Renderers only read workflow state; they never trigger requests.

use iwb_core::{AutomatedResponseRule, BuyerField, BuyerInfo, CartItem, CartSnapshot, Query};

use crate::api::StoreApi;
use crate::checkout::{CheckoutSession, CheckoutStatus, OrderSummary};
use crate::pagination::Pagination;
use crate::queries::QueryDesk;
use crate::storage::LocalStore;

const ORDER_ERROR_FALLBACK: &str =
    "There was an error processing your order. Please try again later.";

/// Render the whole checkout screen.
#[must_use]
pub fn render_checkout<A: StoreApi, S: LocalStore>(session: &CheckoutSession<A, S>) -> String {
    let mut lines = vec!["Checkout".to_string()];

    if !matches!(session.status(), CheckoutStatus::Succeeded(_)) {
        lines.push(format!(
            "Order Total: {}",
            session.cart().total_price().display()
        ));
    }

    if let Some(error) = session.error() {
        lines.push(format!("Error: {error}"));
    }

    match session.status() {
        CheckoutStatus::Succeeded(summary) => lines.push(render_order_summary(summary)),
        CheckoutStatus::Failed => {
            lines.push("Order Processing Error".to_string());
            lines.push(session.error().unwrap_or(ORDER_ERROR_FALLBACK).to_string());
        }
        CheckoutStatus::Editing | CheckoutStatus::Submitting => {
            lines.push(render_buyer_form(session.buyer()));
            lines.push(String::new());
            lines.push("Order Summary".to_string());
            lines.push(render_cart(session.cart()));
            if session.is_loading() {
                lines.push("Processing...".to_string());
            }
        }
    }

    lines.join("\n")
}

/// Render the confirmation shown after a placed order.
#[must_use]
pub fn render_order_summary(summary: &OrderSummary) -> String {
    let mut lines = vec![
        "Thank you for your order!".to_string(),
        "Your order has been placed successfully.".to_string(),
    ];

    if !summary.items.is_empty() {
        lines.push("Order Summary".to_string());
        lines.extend(render_items(&summary.items));
        lines.push(format!("  Total: {}", summary.total_price().display()));
    }

    if let Some(email) = &summary.email {
        lines.push(format!("A confirmation email will be sent to {email}"));
    }

    lines.join("\n")
}

/// Render the buyer draft, masking the payment details.
#[must_use]
pub fn render_buyer_form(buyer: &BuyerInfo) -> String {
    BuyerField::ALL
        .iter()
        .map(|&field| {
            let value = buyer.get(field);
            let shown = if field == BuyerField::PaymentInfo {
                mask_payment_info(value)
            } else {
                value.to_string()
            };
            format!("{}: {shown}", field.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keep only the last four characters of payment details.
#[must_use]
pub fn mask_payment_info(value: &str) -> String {
    let count = value.chars().count();
    match count {
        0 => String::new(),
        1..=4 => "****".to_string(),
        _ => format!("****{}", value.chars().skip(count - 4).collect::<String>()),
    }
}

/// Render the cart snapshot lines and total.
#[must_use]
pub fn render_cart(cart: &CartSnapshot) -> String {
    if cart.is_empty() {
        return "  Your cart is empty.".to_string();
    }

    let mut lines = render_items(&cart.items);
    lines.push(format!("  Total: {}", cart.total_price().display()));
    lines.join("\n")
}

fn render_items(items: &[CartItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            format!(
                "  {} x{}  {}",
                item.display_name(),
                item.quantity,
                item.line_total().display()
            )
        })
        .collect()
}

/// Render the contact screen: banners, form state and history.
#[must_use]
pub fn render_query_desk<A: StoreApi>(desk: &QueryDesk<A>) -> String {
    let mut lines = vec!["Contact Us".to_string()];

    if let Some(response) = desk.response() {
        lines.push("Thank you for your query!".to_string());
        lines.push(response.to_string());
    }
    if let Some(error) = desk.form_error() {
        lines.push(format!("Error: {error}"));
    }
    if let Some(warning) = desk.rules_warning() {
        lines.push(format!("Warning: {warning}"));
    }
    if desk.is_submitting() {
        lines.push("Submitting...".to_string());
    }

    lines.push(String::new());
    lines.push("Previous Queries".to_string());

    if desk.pagination().is_fetching() {
        lines.push("Loading queries...".to_string());
    } else if let Some(error) = desk.page_error() {
        lines.push(format!("Error: {error}"));
    } else {
        if desk.queries().is_empty() {
            lines.push("No queries submitted yet.".to_string());
        } else {
            lines.extend(desk.queries().iter().map(render_query));
        }
        if let Some(controls) = render_pagination(desk.pagination()) {
            lines.push(controls);
        }
    }

    lines.join("\n")
}

/// Render one history entry.
#[must_use]
pub fn render_query(query: &Query) -> String {
    let or_na = |s: &str| if s.is_empty() { "N/A".to_string() } else { s.to_string() };

    let mut lines = vec![format!("{} ({})", or_na(&query.name), or_na(&query.email))];
    if let Some(created_at) = query.created_at {
        lines.push(format!("  Submitted: {}", created_at.format("%Y-%m-%d %H:%M UTC")));
    }
    lines.push(format!(
        "  {}",
        if query.message.is_empty() {
            "No message content"
        } else {
            query.message.as_str()
        }
    ));
    lines.push(format!("  Status: {}", query.status));
    if let Some(response) = query.visible_response() {
        lines.push("  Automated Response:".to_string());
        lines.push(format!("  {response}"));
    }

    lines.join("\n")
}

/// Render `Previous  Page x of y  Next`, or `None` for a single page.
///
/// Unavailable controls are shown in brackets.
#[must_use]
pub fn render_pagination(pagination: &Pagination) -> Option<String> {
    if !pagination.shows_controls() {
        return None;
    }

    let control = |label: &str, enabled: bool| {
        if enabled && !pagination.is_fetching() {
            label.to_string()
        } else {
            format!("[{label}]")
        }
    };

    Some(format!(
        "{}  Page {} of {}  {}",
        control("Previous", pagination.has_previous()),
        pagination.current_page(),
        pagination.page_count(),
        control("Next", pagination.has_next()),
    ))
}

/// Render the automated-response rules in matching order.
#[must_use]
pub fn render_rules(rules: &[AutomatedResponseRule]) -> String {
    if rules.is_empty() {
        return "No automated responses configured.".to_string();
    }

    rules
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let keywords = if rule.keywords.is_empty() {
                "-".to_string()
            } else {
                rule.keywords.join(", ")
            };
            let default = if rule.is_default { " (default)" } else { "" };
            format!(
                "{}. [{keywords}]{default} {}",
                i + 1,
                rule.response_text.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//! Customer query commands.
//!
//! # Usage
//!
//! ```bash
//! iwb query list --page 2
//! iwb query submit --name Grace --email grace@example.com --message "Where is my delivery?"
//! ```

use iwb_client::{ApiClient, QueryDesk};
use iwb_client::queries::QueryError;
use iwb_client::view;
use iwb_core::QueryField;

use super::Context;
use crate::output;

/// Open a desk on `page`. Out-of-range pages stay on page 1.
async fn open_on_page<'a>(
    ctx: &'a Context,
    page: u32,
) -> (QueryDesk<&'a ApiClient>, Result<(), QueryError>) {
    let mut desk = QueryDesk::new(&ctx.api, ctx.config.queries_per_page);
    let mut result = desk.open().await;

    if result.is_ok() && page != 1 {
        result = match desk.go_to_page(page).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::warn!(
                    page,
                    pages = desk.pagination().page_count(),
                    "Page out of range, showing page 1"
                );
                Ok(())
            }
            Err(e) => Err(e),
        };
    }

    (desk, result)
}

/// Print one page of previous queries.
///
/// # Errors
///
/// Returns an error if the page cannot be loaded.
pub async fn list(ctx: &Context, page: u32) -> Result<(), Box<dyn std::error::Error>> {
    let (desk, result) = open_on_page(ctx, page).await;
    output::print(&view::render_query_desk(&desk));
    result.map_err(Into::into)
}

/// Submit a query and print the reply and the refreshed history.
///
/// # Errors
///
/// Returns an error if the form is invalid or the backend rejects the query.
/// A history page that fails to load is only reported on screen.
pub async fn submit(
    ctx: &Context,
    name: &str,
    email: &str,
    message: &str,
    page: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut desk, _) = open_on_page(ctx, page).await;

    desk.set_field(QueryField::Name, name);
    desk.set_field(QueryField::Email, email);
    desk.set_field(QueryField::Message, message);

    let result = desk.submit().await;
    output::print(&view::render_query_desk(&desk));

    result.map(drop).map_err(Into::into)
}

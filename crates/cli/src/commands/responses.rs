//! Automated-response rule commands.
//!
//! # Usage
//!
//! ```bash
//! iwb responses list
//! iwb responses match "Where is my delivery?"
//! ```

use iwb_client::StoreApi;
use iwb_client::matcher::{self, MatchSource};
use iwb_client::view;

use super::Context;
use crate::output;

/// Print the rules in matching order.
///
/// # Errors
///
/// Returns an error if the rules cannot be fetched.
pub async fn list(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let rules = ctx.api.automated_responses().await?;
    output::print(&view::render_rules(&rules));
    Ok(())
}

/// Show the reply a message would receive and which rule produced it.
///
/// Like the contact form, an unavailable rule list falls back to the
/// generic reply instead of failing.
pub async fn match_message(ctx: &Context, message: &str) {
    let rules = match ctx.api.automated_responses().await {
        Ok(rules) => rules,
        Err(e) => {
            tracing::warn!(error = %e, "Automated responses unavailable, using fallback");
            Vec::new()
        }
    };

    let selection = matcher::select(message, &rules);
    let source = match selection.source {
        MatchSource::Keyword { index, keyword } => {
            format!("rule {} (keyword \"{keyword}\")", index + 1)
        }
        MatchSource::Default { index } => format!("rule {} (default)", index + 1),
        MatchSource::Fallback => "built-in fallback".to_string(),
    };

    output::print(&format!("Matched: {source}"));
    output::print(selection.text);
}

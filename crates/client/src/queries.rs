//! Customer query workflow.
//!
//! A [`QueryDesk`] holds the contact form, the automated-response rules and
//! one page of the query history. Rules are fetched once when the desk opens;
//! the reply to a new query is chosen locally by [`matcher`](crate::matcher)
//! and submitted with it.

use thiserror::Error;
use tracing::instrument;

use iwb_core::{AutomatedResponseRule, Query, QueryField, QueryForm, ValidationError};

use crate::api::{ApiError, StoreApi};
use crate::matcher;
use crate::pagination::Pagination;

/// Warning when the rules endpoint fails.
pub const RULES_UNAVAILABLE: &str = "Failed to load automated responses. Please try again later.";

/// Warning when the rules endpoint returns something other than a list.
pub const RULES_MALFORMED: &str = "Failed to load automated responses: Invalid data format.";

/// Error when a history page cannot be fetched.
pub const PAGE_UNAVAILABLE: &str = "Failed to load previous queries. Please try again.";

/// Error when a history page has the wrong shape.
pub const PAGE_MALFORMED: &str = "Received unexpected data format from the server for queries.";

/// Why a query action did not complete.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A query is already being submitted")]
    Busy,

    #[error("{message}")]
    Api {
        #[source]
        source: ApiError,
        /// Text shown to the customer.
        message: String,
    },
}

/// Contact form plus query history.
#[derive(Debug)]
pub struct QueryDesk<A> {
    api: A,
    rules: Vec<AutomatedResponseRule>,
    rules_warning: Option<String>,
    queries: Vec<Query>,
    pagination: Pagination,
    page_error: Option<String>,
    form: QueryForm,
    form_error: Option<String>,
    submitting: bool,
    response: Option<String>,
}

impl<A: StoreApi> QueryDesk<A> {
    /// Create a desk on page 1 with nothing loaded.
    pub fn new(api: A, page_size: u32) -> Self {
        Self {
            api,
            rules: Vec::new(),
            rules_warning: None,
            queries: Vec::new(),
            pagination: Pagination::new(page_size),
            page_error: None,
            form: QueryForm::default(),
            form_error: None,
            submitting: false,
            response: None,
        }
    }

    /// Load the rules and the first page.
    ///
    /// # Errors
    ///
    /// Returns the page fetch error. A rules failure is only a warning.
    pub async fn open(&mut self) -> Result<(), QueryError> {
        self.load_rules().await;
        self.fetch_page().await
    }

    /// Fetch the automated-response rules, replacing any loaded before.
    ///
    /// On failure the rule list is emptied and [`rules_warning`](Self::rules_warning)
    /// is set; submissions then fall back to the generic reply.
    pub async fn load_rules(&mut self) {
        match self.api.automated_responses().await {
            Ok(rules) => {
                tracing::debug!(count = rules.len(), "Loaded automated responses");
                self.rules = rules;
                self.rules_warning = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Automated responses unavailable");
                self.rules.clear();
                self.rules_warning = Some(
                    if e.is_malformed() {
                        RULES_MALFORMED
                    } else {
                        RULES_UNAVAILABLE
                    }
                    .to_string(),
                );
            }
        }
    }

    /// Fetch the current page of the history.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Api`] if the page cannot be loaded; the list is
    /// then empty and [`page_error`](Self::page_error) is set.
    #[instrument(skip(self), fields(page = self.pagination.current_page()))]
    pub async fn fetch_page(&mut self) -> Result<(), QueryError> {
        self.pagination.begin_fetch();
        self.page_error = None;

        let result = self
            .api
            .queries(self.pagination.current_page(), self.pagination.page_size())
            .await;

        match result {
            Ok(page) => {
                self.queries = page.queries;
                self.pagination.finish_fetch(page.total_count);
                Ok(())
            }
            Err(source) => {
                tracing::error!(error = %source, "Failed to load queries");
                let message = if source.is_malformed() {
                    PAGE_MALFORMED
                } else {
                    PAGE_UNAVAILABLE
                }
                .to_string();

                self.queries.clear();
                self.pagination.fail_fetch();
                self.page_error = Some(message.clone());
                Err(QueryError::Api { source, message })
            }
        }
    }

    /// Move to `page` and fetch it.
    ///
    /// Returns `Ok(false)` without fetching if the page is out of range or a
    /// fetch is in flight.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if the new page cannot be loaded.
    pub async fn go_to_page(&mut self, page: u32) -> Result<bool, QueryError> {
        if !self.pagination.go_to_page(page) {
            return Ok(false);
        }
        self.fetch_page().await.map(|()| true)
    }

    /// Move forward one page and fetch it.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if the new page cannot be loaded.
    pub async fn next_page(&mut self) -> Result<bool, QueryError> {
        self.go_to_page(self.pagination.current_page().saturating_add(1))
            .await
    }

    /// Move back one page and fetch it.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if the new page cannot be loaded.
    pub async fn previous_page(&mut self) -> Result<bool, QueryError> {
        self.go_to_page(self.pagination.current_page().saturating_sub(1))
            .await
    }

    /// Change one form field.
    pub fn set_field(&mut self, field: QueryField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Validate the form, choose the automated reply and submit the query.
    ///
    /// On success the current page is re-fetched, the reply is shown and the
    /// form is reset. A failed re-fetch only sets
    /// [`page_error`](Self::page_error).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] for an incomplete form (no request
    /// is made), [`QueryError::Busy`] while a submission is outstanding, and
    /// [`QueryError::Api`] if the backend rejects the query or is unreachable.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<String, QueryError> {
        if self.submitting {
            return Err(QueryError::Busy);
        }

        self.form_error = None;
        self.response = None;

        if let Err(e) = self.form.validate() {
            tracing::info!(fields = ?e.fields(), "Query form is incomplete");
            self.form_error = Some(e.to_string());
            return Err(e.into());
        }

        let reply = matcher::match_response(&self.form.message, &self.rules).to_string();
        let request = self.form.to_new_query(reply.as_str());

        self.submitting = true;
        let result = self.api.create_query(&request).await;
        self.submitting = false;

        match result {
            Ok(created) => {
                tracing::info!(id = ?created.and_then(|q| q.id), "Query submitted");
                // Failure is recorded in page_error
                let _ = self.fetch_page().await;
                self.response = Some(reply.clone());
                self.form = QueryForm::default();
                Ok(reply)
            }
            Err(source) => {
                tracing::error!(error = %source, "Query submission failed");
                let message = submission_failure_message(&source);
                self.form_error = Some(message.clone());
                Err(QueryError::Api { source, message })
            }
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[AutomatedResponseRule] {
        &self.rules
    }

    #[must_use]
    pub fn rules_warning(&self) -> Option<&str> {
        self.rules_warning.as_deref()
    }

    #[must_use]
    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    #[must_use]
    pub const fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    #[must_use]
    pub fn page_error(&self) -> Option<&str> {
        self.page_error.as_deref()
    }

    #[must_use]
    pub const fn form(&self) -> &QueryForm {
        &self.form
    }

    #[must_use]
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Reply shown after the last successful submission.
    #[must_use]
    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }
}

/// Text for the error banner after a failed submission.
#[must_use]
pub fn submission_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { status, error, .. } => format!(
            "Submission failed: {status} - {}",
            error.as_deref().unwrap_or("Server error.")
        ),
        ApiError::NoResponse(_) => {
            "Submission failed: No response from server. Please check your network connection."
                .to_string()
        }
        ApiError::Setup(_) | ApiError::Decode(_) => {
            "Submission failed: An unexpected error occurred.".to_string()
        }
    }
}

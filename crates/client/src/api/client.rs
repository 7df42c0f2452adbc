//! HTTP implementation of [`StoreApi`] on top of reqwest.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use iwb_core::{AutomatedResponseRule, NewQuery, Query, QueryPage};

use super::error::{ApiError, ErrorBody};
use super::{CheckoutRequest, OrderConfirmation, StoreApi};
use crate::config::ApiConfig;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Storefront backend client.
///
/// Cheaply cloneable; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    query_timeout: Duration,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Setup`] if the token is not a valid header value or
    /// the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ApiError::Setup(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                query_timeout: config.query_timeout,
            }),
        })
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an endpoint path such as `/api/queries`.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Setup(format!("Invalid endpoint {path}: {e}")))
    }

    /// Send a request and decode a 2xx JSON body.
    ///
    /// Non-2xx responses become [`ApiError::Status`] carrying the body's
    /// `error` field when present.
    async fn send(&self, method: Method, request: RequestBuilder) -> Result<Value, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let response = request
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Request failed before a response arrived");
                ApiError::from_transport(e)
            })?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = ErrorBody::message_from(&body);
            tracing::error!(status = status.as_u16(), error = ?error, "Backend returned an error");
            return Err(ApiError::status(&method, status.as_u16(), error));
        }

        let body = response.text().await.map_err(ApiError::from_transport)?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "Response body is not JSON");
            ApiError::Decode(format!("invalid JSON: {e}"))
        })
    }

    async fn get(&self, url: Url) -> Result<Value, ApiError> {
        let request = self.inner.client.get(url);
        self.send(Method::GET, request).await
    }
}

impl StoreApi for ApiClient {
    #[instrument(skip(self), fields(request_id = tracing::field::Empty))]
    async fn automated_responses(&self) -> Result<Vec<AutomatedResponseRule>, ApiError> {
        let body = self.get(self.endpoint("/api/automated-responses")?).await?;

        AutomatedResponseRule::list_from_value(body).ok_or_else(|| {
            tracing::warn!("Automated responses endpoint returned a non-array body");
            ApiError::Decode("expected an array of automated responses".to_string())
        })
    }

    #[instrument(skip(self), fields(request_id = tracing::field::Empty))]
    async fn queries(&self, page: u32, limit: u32) -> Result<QueryPage, ApiError> {
        let mut url = self.endpoint("/api/queries")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());

        let body = self.get(url).await?;

        QueryPage::from_value(body).ok_or_else(|| {
            tracing::warn!("Queries endpoint returned an unexpected structure");
            ApiError::Decode("expected {queries: [...], totalCount}".to_string())
        })
    }

    #[instrument(skip(self, query), fields(request_id = tracing::field::Empty, email = %query.email))]
    async fn create_query(&self, query: &NewQuery) -> Result<Option<Query>, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("/api/queries")?)
            .timeout(self.inner.query_timeout)
            .json(query);

        let body = match self.send(Method::POST, request).await {
            Ok(body) => body,
            // Accepted, but the echo is not JSON
            Err(ApiError::Decode(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_value::<Query>(body) {
            Ok(created) => Ok(Some(created)),
            Err(e) => {
                tracing::warn!(error = %e, "Created query has an unexpected shape");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, request), fields(request_id = tracing::field::Empty))]
    async fn checkout(&self, request: &CheckoutRequest) -> Result<OrderConfirmation, ApiError> {
        let builder = self
            .inner
            .client
            .post(self.endpoint("/api/checkout")?)
            .json(request);

        let body = match self.send(Method::POST, builder).await {
            Ok(body) => body,
            // Order is placed, but the confirmation is not JSON
            Err(ApiError::Decode(_)) => Value::Null,
            Err(e) => return Err(e),
        };
        Ok(OrderConfirmation::from_value(body))
    }
}

//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod draft;
pub mod query;
pub mod responses;

use iwb_client::storage::FileStore;
use iwb_client::{ApiClient, ClientConfig, ClientError};

/// Everything a command needs: configuration, backend client and draft store.
pub struct Context {
    pub config: ClientConfig,
    pub api: ApiClient,
    pub store: FileStore,
}

impl Context {
    /// Build the backend client and open the draft store.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the data directory
    /// cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let api = ApiClient::new(&config.api)?;
        let store = FileStore::open(&config.data_dir)?;

        tracing::debug!(
            base_url = %api.base_url(),
            store = %store.path().display(),
            "Context ready"
        );

        Ok(Self { config, api, store })
    }
}

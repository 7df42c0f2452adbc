//! Local draft storage.
//!
//! [`LocalStore`] is a string key/value store with the semantics of browser
//! local storage. [`FileStore`] keeps all keys in one JSON object file;
//! [`MemoryStore`] backs tests. [`CheckoutStorage`] layers the typed checkout
//! records (buyer draft, cart snapshot) on top of any store.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rust_decimal::Decimal;
use thiserror::Error;

use iwb_core::{BuyerInfo, CartItem, CartSnapshot, UserId, lenient};

/// Storage keys shared with the cart page.
pub mod keys {
    /// Draft buyer details (JSON object).
    pub const BUYER_INFO: &str = "buyerInfo";

    /// Cart lines staged for checkout (JSON array).
    pub const CART_ITEMS: &str = "checkoutCartItems";

    /// Cart total staged for checkout (decimal string).
    pub const CART_TOTAL: &str = "checkoutTotal";

    /// Shopper the cart belongs to.
    pub const CART_USER_ID: &str = "checkoutUserId";

    /// Every key written for a checkout, cleared once the order is placed.
    pub const CHECKOUT: [&str; 4] = [CART_ITEMS, CART_TOTAL, CART_USER_ID, BUYER_INFO];
}

/// Errors from the local store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized.
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value persistence.
pub trait LocalStore {
    /// Read a value; `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key; deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: LocalStore + ?Sized> LocalStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// =============================================================================
// File store
// =============================================================================

/// All keys in a single `storage.json` file under a data directory.
///
/// Writes go to a temporary file that is renamed over the original, so a
/// crash never leaves a half-written store. A corrupt file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// File name inside the data directory.
    pub const FILE_NAME: &'static str = "storage.json";

    /// Open (creating the directory if needed) the store under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: dir.join(Self::FILE_NAME),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Local store is corrupt, starting empty");
            BTreeMap::new()
        }))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Serialize {
                key: Self::FILE_NAME,
                source,
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// Memory store
// =============================================================================

/// In-process store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        {
            let mut map = store.lock();
            for (k, v) in entries {
                map.insert(k.to_string(), v.to_string());
            }
        }
        store
    }

    /// Copy of every entry.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

// =============================================================================
// Typed checkout storage
// =============================================================================

/// Buyer draft and cart snapshot on top of a [`LocalStore`].
///
/// Reads never fail on bad data: malformed values are logged and replaced
/// with empty defaults.
#[derive(Debug)]
pub struct CheckoutStorage<S> {
    store: S,
}

impl<S: LocalStore> CheckoutStorage<S> {
    /// Wrap a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the buyer draft; absent or malformed drafts read as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load_buyer_info(&self) -> Result<BuyerInfo, StorageError> {
        let Some(raw) = self.store.get(keys::BUYER_INFO)? else {
            return Ok(BuyerInfo::default());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored buyer draft is malformed, ignoring it");
            BuyerInfo::default()
        }))
    }

    /// Persist the whole buyer draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft cannot be serialized or written.
    pub fn save_buyer_info(&self, info: &BuyerInfo) -> Result<(), StorageError> {
        let json = serde_json::to_string(info).map_err(|source| StorageError::Serialize {
            key: keys::BUYER_INFO,
            source,
        })?;
        self.store.set(keys::BUYER_INFO, &json)
    }

    /// Forget the buyer draft only.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_buyer_info(&self) -> Result<(), StorageError> {
        self.store.remove(keys::BUYER_INFO)
    }

    /// Load the cart snapshot left by the cart page.
    ///
    /// Missing items read as an empty list, an unparsable total as zero and a
    /// missing shopper as `guest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load_cart(&self) -> Result<CartSnapshot, StorageError> {
        let items = match self.store.get(keys::CART_ITEMS)? {
            Some(raw) => parse_cart_items(&raw),
            None => Vec::new(),
        };

        let total = self
            .store
            .get(keys::CART_TOTAL)?
            .and_then(|raw| lenient::parse_decimal(raw.trim()))
            .unwrap_or(Decimal::ZERO);

        let user_id = self
            .store
            .get(keys::CART_USER_ID)?
            .filter(|id| !id.is_empty())
            .map_or_else(UserId::guest, UserId::from);

        Ok(CartSnapshot {
            items,
            total,
            user_id,
        })
    }

    /// Record a cart snapshot for checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    pub fn stage_cart(&self, cart: &CartSnapshot) -> Result<(), StorageError> {
        let items = serde_json::to_string(&cart.items).map_err(|source| {
            StorageError::Serialize {
                key: keys::CART_ITEMS,
                source,
            }
        })?;

        self.store.set(keys::CART_ITEMS, &items)?;
        self.store.set(keys::CART_TOTAL, &cart.total.to_string())?;
        self.store.set(keys::CART_USER_ID, cart.user_id.as_str())
    }

    /// Forget everything written for this checkout.
    ///
    /// # Errors
    ///
    /// Returns the first write error; later keys are still attempted.
    pub fn clear_checkout(&self) -> Result<(), StorageError> {
        let mut first_error = None;
        for key in keys::CHECKOUT {
            if let Err(e) = self.store.remove(key) {
                tracing::error!(key, error = %e, "Failed to clear checkout key");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn parse_cart_items(raw: &str) -> Vec<CartItem> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Stored cart items are not JSON, ignoring them");
            return Vec::new();
        }
    };

    let serde_json::Value::Array(items) = value else {
        tracing::warn!("Stored cart items are not an array, ignoring them");
        return Vec::new();
    };

    items
        .into_iter()
        .filter(serde_json::Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

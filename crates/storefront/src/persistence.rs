//! Cart persistence.
//!
//! The cart store only needs two things from storage: read the last saved
//! cart once at startup, and overwrite it after each change. Both sit behind
//! [`CartPersistence`] so the store can be tested without touching disk.
//!
//! On disk the cart is a JSON array of `{product, quantity}` objects, one
//! file per storage key (`<data_dir>/<key>.json`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dapur_core::Cart;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by a persistence backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the storage medium failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cart could not be encoded, or the saved data is not a valid cart.
    #[error("invalid cart JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Restore/persist interface for the cart.
pub trait CartPersistence {
    /// Load the saved cart, or `None` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but cannot be read or decoded.
    fn restore(&self) -> Result<Option<Cart>, PersistenceError>;

    /// Overwrite the saved cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    fn persist(&mut self, cart: &Cart) -> Result<(), PersistenceError>;
}

/// Stores the cart as a JSON file named after its storage key.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage for `key` inside `data_dir`. The directory is created on the
    /// first write.
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{key}.json")),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CartPersistence for JsonFileStorage {
    fn restore(&self) -> Result<Option<Cart>, PersistenceError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let cart = serde_json::from_str(&data).inspect_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Saved cart is corrupt");
        })?;
        Ok(Some(cart))
    }

    fn persist(&mut self, cart: &Cart) -> Result<(), PersistenceError> {
        let data = serde_json::to_string(cart)?;

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }

        // Write-then-rename so a crash never leaves a truncated cart behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), items = cart.total_items(), "Cart persisted");
        Ok(())
    }
}

/// In-memory storage, for tests and for sessions that should not outlive
/// the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    saved: Option<String>,
    writes: usize,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds a saved cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be encoded.
    pub fn with_cart(cart: &Cart) -> Result<Self, PersistenceError> {
        Ok(Self {
            saved: Some(serde_json::to_string(cart)?),
            writes: 0,
        })
    }

    /// Storage holding raw, possibly invalid, data.
    #[must_use]
    pub fn with_raw(data: impl Into<String>) -> Self {
        Self {
            saved: Some(data.into()),
            writes: 0,
        }
    }

    /// The raw saved JSON, if any.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.saved.as_deref()
    }

    /// Number of successful `persist` calls.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl CartPersistence for MemoryStorage {
    fn restore(&self) -> Result<Option<Cart>, PersistenceError> {
        Ok(self
            .saved
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?)
    }

    fn persist(&mut self, cart: &Cart) -> Result<(), PersistenceError> {
        self.saved = Some(serde_json::to_string(cart)?);
        self.writes += 1;
        Ok(())
    }
}

/// Restore a cart, falling back to an empty one.
///
/// Unreadable or malformed data is logged and discarded rather than
/// blocking the session.
pub fn restore_or_empty<P: CartPersistence>(storage: &P) -> Cart {
    match storage.restore() {
        Ok(Some(cart)) => {
            debug!(items = cart.total_items(), "Cart restored");
            cart
        }
        Ok(None) => Cart::new(),
        Err(e) => {
            warn!(error = %e, "Discarding unreadable saved cart");
            Cart::new()
        }
    }
}

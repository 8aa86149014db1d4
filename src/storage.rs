//! Session storage.
//!
//! Durable client-side key-value persistence: the serialized cart under
//! one fixed key and the profile reference under another. Absence of the
//! cart key is equivalent to an empty cart.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use mockall::automock;
use thiserror::Error;

use crate::cart::CartLine;

/// File name holding the serialized cart lines.
const CART_KEY: &str = "cart.json";

/// File name holding the opaque profile reference.
const PROFILE_KEY: &str = "profile_id";

/// Errors related to reading or writing session storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage could not be read or written.
    #[error("storage i/o error")]
    Io(#[from] io::Error),

    /// A stored value did not parse as the expected layout.
    #[error("corrupt stored value")]
    Corrupt(#[source] serde_json::Error),
}

/// Durable key-value persistence surface for a single browsing session.
///
/// The profile reference is created by the external profile-capture
/// collaborator; this surface only reads it back (and records it, on the
/// collaborator's behalf).
#[automock]
pub trait SessionStore: Send + Sync {
    /// Load the stored cart lines, or `None` if no cart was ever saved.
    fn load_cart(&self) -> Result<Option<Vec<CartLine>>, StoreError>;

    /// Replace the stored cart lines with the given snapshot.
    fn save_cart(&self, lines: &[CartLine]) -> Result<(), StoreError>;

    /// The opaque identifier for the current user, if one was captured.
    fn profile_reference(&self) -> Result<Option<String>, StoreError>;

    /// Record a captured profile reference.
    fn set_profile_reference(&self, reference: &str) -> Result<(), StoreError>;
}

impl<S: SessionStore + ?Sized> SessionStore for std::sync::Arc<S> {
    fn load_cart(&self) -> Result<Option<Vec<CartLine>>, StoreError> {
        (**self).load_cart()
    }

    fn save_cart(&self, lines: &[CartLine]) -> Result<(), StoreError> {
        (**self).save_cart(lines)
    }

    fn profile_reference(&self) -> Result<Option<String>, StoreError> {
        (**self).profile_reference()
    }

    fn set_profile_reference(&self, reference: &str) -> Result<(), StoreError> {
        (**self).set_profile_reference(reference)
    }
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    cart: Option<String>,
    profile: Option<String>,
}

/// In-memory store for tests and ephemeral sessions.
///
/// Values are held in their serialized form so that round-trips exercise
/// the same layout as durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn load_cart(&self) -> Result<Option<Vec<CartLine>>, StoreError> {
        self.lock()
            .cart
            .as_deref()
            .map(|raw| serde_json::from_str(raw).map_err(StoreError::Corrupt))
            .transpose()
    }

    fn save_cart(&self, lines: &[CartLine]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(lines).map_err(StoreError::Corrupt)?;
        self.lock().cart = Some(raw);

        Ok(())
    }

    fn profile_reference(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock().profile.clone())
    }

    fn set_profile_reference(&self, reference: &str) -> Result<(), StoreError> {
        self.lock().profile = Some(reference.to_owned());

        Ok(())
    }
}

/// File-backed store: one file per key inside a session directory.
///
/// This is the durable surface outliving a single page view on the
/// device; the cart key holds a JSON array of line records.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at the given directory.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Io`] if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn read_key(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn write_key(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::write(self.key_path(key), value)?;

        Ok(())
    }

    /// The directory this store persists into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SessionStore for JsonFileStore {
    fn load_cart(&self) -> Result<Option<Vec<CartLine>>, StoreError> {
        self.read_key(CART_KEY)?
            .map(|raw| serde_json::from_str(&raw).map_err(StoreError::Corrupt))
            .transpose()
    }

    fn save_cart(&self, lines: &[CartLine]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(lines).map_err(StoreError::Corrupt)?;

        self.write_key(CART_KEY, &raw)
    }

    fn profile_reference(&self) -> Result<Option<String>, StoreError> {
        self.read_key(PROFILE_KEY)
    }

    fn set_profile_reference(&self, reference: &str) -> Result<(), StoreError> {
        self.write_key(PROFILE_KEY, reference)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn line(product_id: &str, unit_price: u64, quantity: u32) -> CartLine {
        CartLine {
            product_id: product_id.to_owned(),
            name: format!("Product {product_id}"),
            unit_price,
            image: Some(format!("/static/store/{product_id}.jpg")),
            quantity,
        }
    }

    #[test]
    fn memory_store_starts_empty() -> TestResult {
        let store = MemoryStore::new();

        assert!(store.load_cart()?.is_none());
        assert!(store.profile_reference()?.is_none());

        Ok(())
    }

    #[test]
    fn memory_store_round_trips_cart() -> TestResult {
        let store = MemoryStore::new();
        let lines = vec![line("A", 100, 2), line("B", 250, 1)];

        store.save_cart(&lines)?;

        assert_eq!(store.load_cart()?, Some(lines));

        Ok(())
    }

    #[test]
    fn memory_store_round_trips_profile_reference() -> TestResult {
        let store = MemoryStore::new();

        store.set_profile_reference("profile-123")?;

        assert_eq!(store.profile_reference()?.as_deref(), Some("profile-123"));

        Ok(())
    }

    #[test]
    fn file_store_missing_keys_read_as_none() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path())?;

        assert!(store.load_cart()?.is_none());
        assert!(store.profile_reference()?.is_none());

        Ok(())
    }

    #[test]
    fn file_store_round_trips_cart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path())?;
        let lines = vec![line("A", 100, 2), line("B", 250, 1)];

        store.save_cart(&lines)?;

        // A second store over the same directory sees the same snapshot,
        // as a new page view would.
        let reopened = JsonFileStore::new(dir.path())?;

        assert_eq!(reopened.load_cart()?, Some(lines));

        Ok(())
    }

    #[test]
    fn file_store_round_trips_profile_reference() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path())?;

        store.set_profile_reference("profile-123")?;

        assert_eq!(store.profile_reference()?.as_deref(), Some("profile-123"));

        Ok(())
    }

    #[test]
    fn file_store_corrupt_cart_surfaces_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = JsonFileStore::new(dir.path())?;

        fs::write(dir.path().join("cart.json"), "{not json")?;

        let result = store.load_cart();

        assert!(
            matches!(result, Err(StoreError::Corrupt(_))),
            "expected Corrupt, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn stored_layout_uses_wire_field_names() -> TestResult {
        let raw = serde_json::to_value([line("A", 100, 2)])?;

        assert_eq!(
            raw,
            serde_json::json!([{
                "id": "A",
                "name": "Product A",
                "price": 100,
                "image": "/static/store/A.jpg",
                "quantity": 2,
            }])
        );

        Ok(())
    }
}

use std::cell::RefCell;
use std::path::PathBuf;

use crate::{
    models::store::Store,
    storage::{Storage, StorageError},
};

/// In-memory [`Storage`] backend. Round-trips the store through its JSON
/// representation so tests exercise the same serialization path as the
/// file backend.
#[derive(Default)]
pub struct MemoryStorage {
    contents: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until a store has been written, for asserting that a service
    /// persisted (or skipped persisting) a change.
    pub fn is_empty(&self) -> bool {
        self.contents.borrow().is_none()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Store, StorageError> {
        match self.contents.borrow().as_deref() {
            None => Ok(Store::default()),
            Some(json) => serde_json::from_str(json).map_err(|e| StorageError::ParseFailed {
                path: PathBuf::from("<memory>"),
                source: e,
            }),
        }
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        let json = serde_json::to_string(store)
            .map_err(|e| StorageError::SerializeFailed { source: e })?;
        *self.contents.borrow_mut() = Some(json);
        Ok(())
    }
}

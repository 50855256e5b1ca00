use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use quiz_core::render::AssetLookup;

/// Shared, read-only bytes of one archive entry.
#[derive(Clone, PartialEq, Eq)]
pub struct AssetHandle {
    path: String,
    bytes: Arc<[u8]>,
}

impl AssetHandle {
    #[must_use]
    pub fn new(path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("path", &self.path)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Assets extracted from one archive, keyed by exact entry path.
///
/// The store owns the handles for the lifetime of the loaded archive.
/// `release` drops them all; it also runs on drop.
#[derive(Debug, Default)]
pub struct AssetStore {
    entries: HashMap<String, AssetHandle>,
}

impl AssetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        let path = path.into();
        let handle = AssetHandle::new(path.clone(), bytes);
        self.entries.insert(path, handle);
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&AssetHandle> {
        self.entries.get(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted asset paths.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Drop every handle. Never fails; calling it again is a no-op.
    pub fn release(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        if released > 0 {
            log::debug!("released {released} archive assets");
        }
        released
    }
}

impl AssetLookup for AssetStore {
    fn has_asset(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }
}

impl Drop for AssetStore {
    fn drop(&mut self) {
        self.release();
    }
}

//! Local favorites, one list per namespace.
//!
//! Favorites live in a small key-value [`Storage`]: each namespace is one key
//! holding a JSON array of [`FavoriteRecord`]s, most recently added first. The
//! store never fails outward. Missing or corrupt data reads as an empty list,
//! unreadable entries are skipped one by one, and a failed write is logged
//! while the caller still gets the new list.
//!
//! # Examples
//!
//! ```rust
//! use kodex::favorites::{FavoritesStore, MemoryStorage};
//! use kodex::types::{CatalogItem, Namespace};
//!
//! let store = FavoritesStore::new(MemoryStorage::new());
//! let storm = CatalogItem {
//!     id: "1".to_string(),
//!     label: "Storm".to_string(),
//!     thumbnail: None,
//!     description: String::new(),
//! };
//!
//! assert_eq!(store.toggle(Namespace::Heroes, &storm).len(), 1);
//! assert!(store.contains(Namespace::Heroes, "1"));
//! assert!(store.toggle(Namespace::Heroes, &storm).is_empty());
//! ```

use parking_lot::Mutex;
use serde_json::Value;
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

use crate::{
    error::{Error, Result},
    net::json,
    types::{FavoriteRecord, Labeled, Namespace, Thumbnail},
};

/// Minimal string key-value backend.
pub trait Storage: Send + Sync {
    /// Raw value stored under `key`, `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process storage, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage keeping one `<key>.json` file per key in a directory.
///
/// The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::storage(key, format!("Failed to create directory: {}", e)))?;

        // Write-then-rename so a crash never leaves a half-written list
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Error::storage(key, e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| Error::storage(key, e.to_string()))?;
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Reads one stored record leniently.
///
/// Ids may be strings or numbers, under `_id` or `id`, and fall back to the
/// label. Labels may be stored under `label`, `name` or `title`. Entries with
/// neither an id nor a label are unreadable.
fn read_record(value: &Value) -> Option<FavoriteRecord> {
    let label = ["label", "name", "title"]
        .iter()
        .find_map(|field| value.get(*field).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    let id = ["_id", "id"]
        .iter()
        .find_map(|field| value.get(*field).and_then(json::read_id))
        .or_else(|| (!label.is_empty()).then(|| label.clone()))?;

    let thumbnail = value
        .get("thumbnail")
        .and_then(|thumb| serde_json::from_value::<Thumbnail>(thumb.clone()).ok());

    let description = value
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(FavoriteRecord {
        id,
        label,
        thumbnail,
        description,
    })
}

/// Favorites for both namespaces over an injected [`Storage`].
pub struct FavoritesStore<S: Storage> {
    storage: S,
    // serializes read-modify-write cycles of toggle
    write_lock: Mutex<()>,
}

impl<S: Storage> FavoritesStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current favorites of `namespace`, most recent first.
    ///
    /// Missing or corrupt storage yields an empty list. Within a readable
    /// array, only the entries that cannot be read are dropped.
    pub fn load(&self, namespace: Namespace) -> Vec<FavoriteRecord> {
        let Some(raw) = self.storage.get(namespace.key()) else {
            return Vec::new();
        };

        let entries = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(key = namespace.key(), error = %e, "ignoring corrupt favorites");
                return Vec::new();
            }
        };

        let total = entries.len();
        let list: Vec<FavoriteRecord> = entries.iter().filter_map(read_record).collect();
        if list.len() < total {
            warn!(
                key = namespace.key(),
                skipped = total - list.len(),
                "skipping unreadable favorite records"
            );
        }
        list
    }

    /// Adds `item` in front of the list, or removes it if its id is present.
    ///
    /// Returns the new list. Toggling the same item twice restores the
    /// original list.
    pub fn toggle(&self, namespace: Namespace, item: &impl Labeled) -> Vec<FavoriteRecord> {
        let _guard = self.write_lock.lock();

        let mut list = self.load(namespace);
        let before = list.len();
        list.retain(|record| record.id != item.id());
        if list.len() == before {
            list.insert(0, FavoriteRecord::from_item(item));
        }

        self.save(namespace, &list);
        list
    }

    /// Whether an item with `id` is a favorite.
    pub fn contains(&self, namespace: Namespace, id: &str) -> bool {
        self.load(namespace).iter().any(|record| record.id == id)
    }

    /// Ids of all favorites of `namespace`.
    pub fn ids(&self, namespace: Namespace) -> HashSet<String> {
        self.load(namespace).into_iter().map(|record| record.id).collect()
    }

    fn save(&self, namespace: Namespace, list: &[FavoriteRecord]) {
        let result = serde_json::to_string(list)
            .map_err(Error::from)
            .and_then(|raw| self.storage.set(namespace.key(), &raw));

        if let Err(e) = result {
            warn!(key = namespace.key(), error = %e, "failed to persist favorites");
        }
    }
}

//! Concurrency-safe, file-backed task record store.
//!
//! [`TaskStore`] owns the task map and the auto-incrementing id sequence,
//! guarded by a single readers-writer lock so the cross-field invariant
//! (every stored id is below the counter) updates atomically. Durability is
//! a single JSON image rewritten wholesale on every [`TaskStore::save`];
//! there is no write-ahead log and no incremental update.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Errors returned by [`TaskStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No task with the requested id exists.
    #[error("task not found")]
    NotFound,

    /// Reading or writing the task file failed.
    #[error("task file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding the task file failed.
    #[error("task file serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// On-disk snapshot of the store: the id counter plus every task keyed by id.
///
/// serde_json writes the integer map keys as decimal strings, so the file
/// reads as `{"next_id": 3, "data": {"1": {...}, "2": {...}}}`. `data` may
/// be absent or `null` in hand-edited files and is treated as empty.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DiskImage {
    #[serde(default)]
    next_id: i64,
    #[serde(default)]
    data: Option<HashMap<i64, Task>>,
}

/// Guarded mutable state. The map and the counter move together: `next_id`
/// is always strictly greater than every id in `data`.
struct Inner {
    data: HashMap<i64, Task>,
    next_id: i64,
}

/// In-memory task collection with optional single-file JSON persistence.
///
/// All operations are synchronous. `create`/`update`/`delete`/`load` take
/// the write lock; `list`/`get` and the snapshot step of `save` take the
/// read lock, so reads run concurrently with each other but never overlap
/// a mutation. `save` releases the lock before touching the filesystem.
///
/// The store never saves on its own; callers flush explicitly after each
/// mutation and decide what to do with a failure.
pub struct TaskStore {
    inner: RwLock<Inner>,
    file_path: Option<PathBuf>,
}

impl TaskStore {
    /// Creates an empty store. With `None` the store is purely in-memory
    /// and [`TaskStore::save`]/[`TaskStore::load`] are no-ops.
    #[must_use]
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                data: HashMap::new(),
                next_id: 1,
            }),
            file_path,
        }
    }

    /// Creates a store and attempts a best-effort load of existing state.
    ///
    /// A failed load (unreadable or corrupt file) is logged at warn and
    /// dropped; the store starts empty. A missing file is not a failure.
    /// Call [`TaskStore::load`] directly to surface load errors instead.
    #[must_use]
    pub fn open(file_path: Option<PathBuf>) -> Self {
        let store = Self::new(file_path);
        if let Err(e) = store.load() {
            tracing::warn!(error = %e, "failed to load task file, starting empty");
        }
        store
    }

    /// Inserts a new task with the given title and returns the stored copy.
    ///
    /// The id is taken from the counter, which is incremented under the
    /// same write lock. Title validity (trimmed, non-empty) is the
    /// caller's responsibility; the store does not re-validate.
    pub fn create(&self, title: impl Into<String>) -> Task {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        let task = Task::new(id, title);
        inner.data.insert(id, task.clone());
        task
    }

    /// Returns a snapshot copy of all tasks, in no particular order.
    #[must_use]
    pub fn list(&self) -> Vec<Task> {
        let inner = self.inner.read();
        inner.data.values().cloned().collect()
    }

    /// Returns the task with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id is absent.
    pub fn get(&self, id: i64) -> Result<Task, StoreError> {
        let inner = self.inner.read();
        inner.data.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    /// Replaces the stored record for `task.id` wholesale.
    ///
    /// Callers are expected to have fetched the current record, merged the
    /// fields they intend to change, and re-submitted the full value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `task.id` is absent; the map is
    /// left unchanged.
    pub fn update(&self, task: Task) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        match inner.data.get_mut(&task.id) {
            Some(slot) => {
                *slot = task;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    /// Removes the task with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id is absent; the map is
    /// left unchanged.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        match inner.data.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    /// Writes the current state to the configured file, replacing it.
    ///
    /// A no-op success when no file path is configured. The snapshot is
    /// taken under the read lock; serialization and the write happen after
    /// the lock is released, so a slow disk never blocks writers.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be written (for
    /// example the path is a directory) or [`StoreError::Serialization`]
    /// if encoding fails. In-memory state is unaffected either way.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = self.file_path.as_deref() else {
            return Ok(());
        };
        let image = {
            let inner = self.inner.read();
            DiskImage {
                next_id: inner.next_id,
                data: Some(inner.data.clone()),
            }
        };
        let bytes = serde_json::to_vec_pretty(&image)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Replaces the in-memory state with the contents of the configured file.
    ///
    /// A no-op success when no file path is configured or the file does not
    /// exist. On success the map and counter are replaced wholesale: a
    /// missing or `null` `data` becomes an empty map, and `next_id` is
    /// taken from the image when positive, else recomputed as one past the
    /// largest stored id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
    /// [`StoreError::Serialization`] if it fails to parse. The in-memory
    /// state is untouched on failure.
    pub fn load(&self) -> Result<(), StoreError> {
        let Some(path) = self.file_path.as_deref() else {
            return Ok(());
        };
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let image: DiskImage = serde_json::from_slice(&bytes)?;
        let data = image.data.unwrap_or_default();
        let next_id = if image.next_id > 0 {
            image.next_id
        } else {
            data.keys().max().copied().unwrap_or(0) + 1
        };
        let mut inner = self.inner.write();
        inner.data = data;
        inner.next_id = next_id;
        Ok(())
    }
}

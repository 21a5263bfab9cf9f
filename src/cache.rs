//! File-keyed memoization for expensive context construction.
//!
//! An entry is invalidated when the keyed file's modification time moves
//! past the time the entry was built, or when the file cannot be stat'ed
//! at all (fail safe toward recomputation). The bypass flag disables
//! caching unconditionally; automated verification uses it to guarantee
//! every request recomputes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

struct Entry<T> {
    built_at: SystemTime,
    value: T,
}

pub struct FileCache<T> {
    entries: Mutex<HashMap<PathBuf, Entry<T>>>,
    bypass: bool,
}

impl<T: Clone> FileCache<T> {
    pub fn new(bypass: bool) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            bypass,
        }
    }

    /// Look up `key`, rebuilding with `build` when the entry is missing or
    /// stale. The lock is held across the build so concurrent callers of
    /// the same key never duplicate in-flight work; builds are pure, so
    /// this only costs latency, never correctness.
    pub fn get_or_build<F>(&self, key: &Path, build: F) -> T
    where
        F: FnOnce() -> T,
    {
        if self.bypass {
            return build();
        }

        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            // A poisoned lock means a previous build panicked; the map may
            // be missing that entry but is otherwise intact.
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(entry) = entries.get(key) {
            if !is_stale(key, entry.built_at) {
                return entry.value.clone();
            }
        }

        let value = build();
        entries.insert(
            key.to_path_buf(),
            Entry {
                built_at: SystemTime::now(),
                value: value.clone(),
            },
        );
        value
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

fn is_stale(key: &Path, built_at: SystemTime) -> bool {
    match std::fs::metadata(key).and_then(|metadata| metadata.modified()) {
        Ok(modified) => modified > built_at,
        // Unreadable or deleted file: treat as invalidated.
        Err(_) => true,
    }
}

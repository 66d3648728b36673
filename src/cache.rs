use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::index::SizeIndex;

/// Process-wide memoization of loaded size indices, keyed by dataset.
///
/// Get-or-insert semantics: a cached index is returned as-is; otherwise the
/// index file is read, parsed and stored. The lock is not held across the
/// disk read, so two concurrent first-loads of the same key may both parse
/// the file; the loads are idempotent and the last insert wins.
#[derive(Default)]
pub struct IndexCache {
    entries: Mutex<HashMap<String, Arc<SizeIndex>>>,
}

impl IndexCache {
    pub fn new() -> Self {
        IndexCache::default()
    }

    pub fn load(&self, key: &str, base_path: &Path) -> Result<Arc<SizeIndex>> {
        if let Some(index) = self.entries.lock().unwrap().get(key) {
            return Ok(index.clone());
        }

        let path = base_path.join(format!("size-index-{key}.json"));
        let index = SizeIndex::from_file(&path)
            .with_context(|| format!("failed to load size index for {key}"))?;
        let index = Arc::new(index);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), index.clone());
        Ok(index)
    }

    /// Drops every cached index. Intended for deterministic tests.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

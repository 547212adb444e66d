//! JSON-file storage backend.
//!
//! The whole item list lives in memory and is rewritten to disk on every
//! change, which is fine for the handful of entries a crew run produces.
//! Writes go to a sibling temp file that is renamed over the real one, so an
//! interrupted write never leaves a half-written file behind.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::interface::Storage;
use crate::memory::short_term::ShortTermMemoryItem;
use crate::utilities::exceptions::MemoryError;
use crate::utilities::string_utils::{overlap_score, search_terms};

/// Items kept on disk; older ones are dropped first.
pub const DEFAULT_MAX_ITEMS: usize = 100;

#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    max_items: usize,
    items: Mutex<Vec<ShortTermMemoryItem>>,
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

impl JsonFileStorage {
    /// Open `path`. A missing or empty file starts an empty store.
    ///
    /// A file that is not valid JSON is moved aside to `<name>.corrupt` and
    /// the store starts empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        let items: Vec<ShortTermMemoryItem> = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => match serde_json::from_str(&text) {
                Ok(items) => items,
                Err(e) => {
                    let corrupt = sibling(&path, ".corrupt");
                    log::warn!(
                        "Memory file {} is not valid JSON ({}); moving it to {} and starting empty",
                        path.display(),
                        e,
                        corrupt.display()
                    );
                    fs::rename(&path, &corrupt)?;
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        log::debug!("Loaded {} memory item(s) from {}", items.len(), path.display());
        Ok(Self {
            path,
            max_items: DEFAULT_MAX_ITEMS,
            items: Mutex::new(items),
        })
    }

    /// Keep at most `max_items` items, newest first to survive.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &[ShortTermMemoryItem]) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(items)?;
        let tmp = sibling(&self.path, ".tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn save(&self, item: ShortTermMemoryItem) -> Result<(), MemoryError> {
        let mut items = self.items.lock();
        items.push(item);
        if items.len() > self.max_items {
            let excess = items.len() - self.max_items;
            items.drain(..excess);
        }
        self.persist(&items)
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<ShortTermMemoryItem>, MemoryError> {
        let terms = search_terms(query);
        let items = self.items.lock();

        let mut scored: Vec<(usize, &ShortTermMemoryItem)> = items
            .iter()
            .map(|item| (overlap_score(&terms, &item.data), item))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.timestamp.cmp(&a.1.timestamp)));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, item)| item.clone())
            .collect())
    }

    fn items(&self) -> Vec<ShortTermMemoryItem> {
        self.items.lock().clone()
    }

    fn reset(&self) -> Result<(), MemoryError> {
        let mut items = self.items.lock();
        items.clear();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

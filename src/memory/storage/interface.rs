//! Storage interface for the memory system.

use crate::memory::short_term::ShortTermMemoryItem;
use crate::utilities::exceptions::MemoryError;

/// Backend that persists memory items.
///
/// All memory storage backends must implement this trait.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Persist one item.
    fn save(&self, item: ShortTermMemoryItem) -> Result<(), MemoryError>;

    /// Up to `limit` items relevant to `query`, most relevant first.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<ShortTermMemoryItem>, MemoryError>;

    /// Every stored item, oldest first.
    fn items(&self) -> Vec<ShortTermMemoryItem>;

    /// Remove all entries.
    fn reset(&self) -> Result<(), MemoryError>;
}

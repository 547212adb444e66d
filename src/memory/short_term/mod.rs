//! Short-term memory for managing transient data related to immediate tasks.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::memory::storage::{JsonFileStorage, Storage};
use crate::utilities::exceptions::MemoryError;
use crate::utilities::string_utils::truncate_chars;

/// Default file used by the support crew.
pub const DEFAULT_MEMORY_FILE: &str = "support_memory.json";

/// Results folded into a task prompt.
const CONTEXT_LIMIT: usize = 5;
/// Per-insight cap inside the contextual block.
const INSIGHT_CHARS: usize = 500;

/// An item stored in short-term memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortTermMemoryItem {
    pub id: Uuid,
    /// The data content of the memory item.
    pub data: String,
    /// The agent role that created this item, if any.
    pub agent: Option<String>,
    /// Description of the task that produced the item.
    pub task: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ShortTermMemoryItem {
    pub fn new(data: impl Into<String>, agent: Option<String>, task: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            data: data.into(),
            agent,
            task,
            timestamp: Utc::now(),
        }
    }
}

/// ShortTermMemory manages transient data related to immediate tasks and
/// interactions, retrieved by lexical overlap with the task at hand.
#[derive(Debug)]
pub struct ShortTermMemory {
    storage: Box<dyn Storage>,
}

impl ShortTermMemory {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Memory backed by the JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        Ok(Self::new(Box::new(JsonFileStorage::load(path)?)))
    }

    /// Save a value to short-term memory.
    pub fn save(
        &self,
        value: &str,
        agent_role: Option<&str>,
        task_description: Option<&str>,
    ) -> Result<(), MemoryError> {
        let item = ShortTermMemoryItem::new(
            value,
            agent_role.map(str::to_string),
            task_description.map(str::to_string),
        );
        self.storage.save(item)
    }

    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<ShortTermMemoryItem>, MemoryError> {
        self.storage.search(query, limit)
    }

    pub fn items(&self) -> Vec<ShortTermMemoryItem> {
        self.storage.items()
    }

    /// Relevant insights formatted for a task prompt, or an empty string.
    pub fn contextual_block(&self, query: &str) -> Result<String, MemoryError> {
        let results = self.search(query, CONTEXT_LIMIT)?;
        if results.is_empty() {
            return Ok(String::new());
        }

        let formatted: Vec<String> = results
            .iter()
            .map(|r| format!("- {}", truncate_chars(r.data.trim(), INSIGHT_CHARS)))
            .collect();
        Ok(format!("Recent Insights:\n{}", formatted.join("\n")))
    }

    /// Reset short-term memory.
    pub fn reset(&self) -> Result<(), MemoryError> {
        self.storage.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contextual_block() {
        let dir = tempfile::tempdir().unwrap();
        let memory = ShortTermMemory::load(dir.path().join("m.json")).unwrap();
        assert_eq!(memory.contextual_block("anything").unwrap(), "");

        memory
            .save("The customer asked about crew memory.", Some("Support"), None)
            .unwrap();
        memory.save("Weather is sunny.", None, None).unwrap();

        assert_eq!(
            memory.contextual_block("How does memory work?").unwrap(),
            "Recent Insights:\n- The customer asked about crew memory."
        );
    }

    #[test]
    fn test_save_records_agent_and_task() {
        let dir = tempfile::tempdir().unwrap();
        let memory = ShortTermMemory::load(dir.path().join("m.json")).unwrap();
        memory.save("answer", Some("QA"), Some("Review")).unwrap();

        let items = memory.items();
        assert_eq!(items[0].agent.as_deref(), Some("QA"));
        assert_eq!(items[0].task.as_deref(), Some("Review"));
    }

    #[test]
    fn test_reset_clears_items() {
        let dir = tempfile::tempdir().unwrap();
        let memory = ShortTermMemory::load(dir.path().join("m.json")).unwrap();
        memory.save("something", None, None).unwrap();
        memory.reset().unwrap();
        assert!(memory.items().is_empty());
    }
}

//! Crew memory.
//!
//! Short-term memory records each task's output so later tasks, and later
//! runs sharing the same file, can recall it.

pub mod short_term;
pub mod storage;

pub use short_term::{ShortTermMemory, ShortTermMemoryItem, DEFAULT_MEMORY_FILE};
pub use storage::{JsonFileStorage, Storage};

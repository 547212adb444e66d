//! Storage backends for memory.

pub mod interface;
pub mod json_file_storage;

pub use interface::Storage;
pub use json_file_storage::JsonFileStorage;

//! Agent module.
//!
//! This module contains the `Agent` descriptor and its task execution entry
//! point.

pub mod core;

// Re-export the main Agent type.
pub use self::core::Agent;

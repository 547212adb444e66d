//! Utility modules.

pub mod exceptions;
pub mod logger;
pub mod markdown;
pub mod printer;
pub mod prompts;
pub mod rpm_controller;
pub mod string_utils;

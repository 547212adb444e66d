//! Crew output and the ready-made crews.

pub mod crew_output;
pub mod customer_support;
pub mod research_article;

pub use crew_output::CrewOutput;

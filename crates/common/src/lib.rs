//! Shared types, error taxonomy, and configuration for ReviewBot.

pub mod config;
pub mod error;
pub mod types;

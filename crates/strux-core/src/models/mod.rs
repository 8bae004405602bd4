//! Data models: extraction schemas and configuration.

pub mod config;
pub mod invoice;
pub mod notes;

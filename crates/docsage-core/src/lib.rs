//! # DocSage Core
//!
//! Shared foundation for the DocSage document intelligence engine:
//! configuration, error types, data model, and the capability traits
//! (embedding, generation, insight storage) implemented by sibling crates.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

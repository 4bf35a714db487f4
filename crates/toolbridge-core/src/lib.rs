//! Toolbridge Core: shared errors and utilities.
//!
//! This crate provides the foundational types used across all Toolbridge
//! crates. It has no internal Toolbridge dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`cache`]: In-process TTL key-value cache

#![forbid(unsafe_code)]

pub mod cache;
pub mod error;

// Re-export key types at crate root for convenience
pub use cache::TtlCache;
pub use error::{Error, Result};

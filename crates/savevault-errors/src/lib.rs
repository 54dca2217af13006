//! Centralized error types for SaveVault
//!
//! This crate provides a unified error handling system for the SaveVault
//! project, covering the storage engine, save profiles and the file system
//! lifecycle.
//!
//! # Architecture
//!
//! The error system is organized into several modules:
//!
//! - [`common`]: Top-level error type and classifications used across all crates
//! - [`storage`]: Backend and storage-engine errors
//! - [`profile`]: Save-profile errors
//! - [`validation`]: Input validation errors
//!
//! # Propagation policy
//!
//! Storage-layer failures are converted into result values at the engine
//! boundary and never escape as panics. Lifecycle operations that require an
//! initialized file system report [`SaveVaultError::NotInitialized`] so
//! callers can retry after awaiting initialization.
//!
//! # Example
//!
//! ```
//! use savevault_errors::prelude::*;
//!
//! fn open_slot(name: &str) -> Result<String> {
//!     if name.trim().is_empty() {
//!         return Err(ValidationError::BlankKey.into());
//!     }
//!     Ok(name.to_string())
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
pub mod prelude;
pub mod profile;
pub mod storage;
pub mod validation;

pub use common::{ErrorCategory, ErrorSeverity, SaveVaultError};
pub use profile::ProfileError;
pub use storage::StorageError;
pub use validation::ValidationError;

/// A specialized `Result` type for SaveVault operations.
pub type Result<T> = std::result::Result<T, SaveVaultError>;

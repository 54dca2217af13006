//! Prelude module for convenient error handling imports.
//!
//! # Example
//!
//! ```
//! use savevault_errors::prelude::*;
//!
//! fn guarded(initialized: bool) -> Result<()> {
//!     if !initialized {
//!         return Err(SaveVaultError::not_initialized("guarded"));
//!     }
//!     Ok(())
//! }
//! ```

pub use crate::{
    Result,
    common::{ErrorCategory, ErrorSeverity, SaveVaultError},
    profile::ProfileError,
    storage::StorageError,
    validation::ValidationError,
};

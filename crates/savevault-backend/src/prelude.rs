//! Prelude module for convenient backend imports.

pub use crate::{DiskFileOperations, FileOperations, MemoryFileOperations};

//! Prelude module for convenient engine imports.

pub use crate::{
    buffer::FileBuffer,
    config::{FileStorageConfig, LoggingLevel, ShutdownArgs},
    queue::CoalescingQueue,
    result::{FileData, SaveResult},
    storage::FileStorage,
    validator::FileValidator,
};

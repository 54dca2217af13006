//! Prelude module for convenient save-system imports.

pub use savevault_engine::{LoggingLevel, ShutdownArgs};
pub use savevault_errors::prelude::*;

pub use crate::{
    converter::SaveConverter,
    creation::{ProfileCreationArgs, ProfileCreationResult, ProfileCreationStatus},
    events::FileSystemEvent,
    header::{FileHeader, FileKind},
    options::StoreOptions,
    profile::{ProfileContext, ProfileData, SaveProfile},
    save_data::SaveData,
    settings::FileSystemSettings,
    system::{FileSystem, FileSystemState},
};

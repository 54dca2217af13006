//! Lifecycle notifications.

/// Notifications published by the [`crate::FileSystem`] over a broadcast
/// channel.
///
/// Events are fire-and-forget: a lagging or dropped subscriber can never
/// abort the engine operation that triggered the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSystemEvent {
    /// Initialization is about to run.
    InitializationStarted,
    /// The file system reached the `Initialized` state.
    InitializationCompleted,
    /// Shutdown is about to run.
    ShutdownStarted,
    /// The file system returned to the `Uninitialized` state.
    ShutdownCompleted,
    /// The active profile changed.
    ProfileChanged {
        /// Display name of the new active profile.
        profile: String,
    },
    /// A profile was created.
    ProfileCreated {
        /// Display name of the created profile.
        profile: String,
    },
    /// A profile is about to be deleted.
    ProfileDeleted {
        /// Display name of the deleted profile.
        profile: String,
    },
    /// A profile's data was reset.
    ProfileReset {
        /// Display name of the reset profile.
        profile: String,
    },
}

//! Profile creation arguments and status codes.

use std::sync::Arc;

use crate::profile::SaveProfile;

/// Arguments for creating a profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileCreationArgs {
    /// Requested display name. When empty, a name is generated from the
    /// default profile name and the persisted profile counter.
    pub name: Option<String>,
    /// Switch to the new profile immediately after creating it.
    pub activate: bool,
}

impl ProfileCreationArgs {
    /// Create arguments for a named profile.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            activate: false,
        }
    }

    /// Request activation of the new profile.
    pub fn activated(mut self) -> Self {
        self.activate = true;
        self
    }
}

/// Why a profile creation was accepted or rejected.
///
/// Rejections are expected user-facing outcomes, not errors: callers
/// branch on the status to drive their UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileCreationStatus {
    /// The profile was created.
    Success,
    /// The name contains disallowed characters.
    NameInvalid,
    /// The name exceeds the maximum length.
    NameTooLong,
    /// A profile with this name already exists.
    NameNotAvailable,
    /// The registry is at its configured capacity.
    ProfileLimitReached,
    /// The name collides with the reserved default-name pattern.
    SystemReservedName,
}

/// Outcome of a profile creation.
#[derive(Clone)]
#[must_use]
pub struct ProfileCreationResult {
    /// The created profile on success.
    pub profile: Option<Arc<SaveProfile>>,
    /// Why the creation succeeded or was rejected.
    pub status: ProfileCreationStatus,
}

impl ProfileCreationResult {
    /// A successful creation.
    pub fn success(profile: Arc<SaveProfile>) -> Self {
        Self {
            profile: Some(profile),
            status: ProfileCreationStatus::Success,
        }
    }

    /// A rejected creation.
    pub fn rejected(status: ProfileCreationStatus) -> Self {
        Self {
            profile: None,
            status,
        }
    }

    /// Whether the profile was created.
    pub fn is_success(&self) -> bool {
        self.status == ProfileCreationStatus::Success
    }
}

impl std::fmt::Debug for ProfileCreationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileCreationResult")
            .field("status", &self.status)
            .field(
                "profile",
                &self.profile.as_ref().map(|p| p.display_name()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_result() {
        let result = ProfileCreationResult::rejected(ProfileCreationStatus::NameTooLong);
        assert!(!result.is_success());
        assert!(result.profile.is_none());
    }
}

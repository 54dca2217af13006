//! Legacy save conversion hook.

use std::sync::Arc;

use async_trait::async_trait;
use savevault_engine::FileStorage;

use crate::profile::SaveProfile;
use crate::settings::FileSystemSettings;

/// One-time converter run after initialization to migrate saves written
/// by an earlier storage layout.
///
/// The lifecycle builds a dedicated storage engine from
/// [`SaveConverter::settings`] (pointing at the legacy layout) and hands
/// it to [`SaveConverter::convert`] together with the freshly loaded
/// active and shared profiles. Conversion failures are logged and do not
/// abort initialization.
#[async_trait]
pub trait SaveConverter: Send + Sync {
    /// Settings describing the legacy storage layout.
    fn settings(&self) -> FileSystemSettings;

    /// Migrate legacy data into the given profiles.
    async fn convert(
        &self,
        legacy: Arc<FileStorage>,
        active: &SaveProfile,
        shared: &SaveProfile,
    ) -> anyhow::Result<()>;
}

//! Save profiles: named, folder-scoped namespaces of persisted keys.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use savevault_engine::validator::FileValidator;
use savevault_engine::{FileStorage, SaveResult};
use savevault_errors::{ProfileError, Result, StorageError, ValidationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::header::{FileHeader, FileKind};
use crate::options::StoreOptions;
use crate::save_data::SaveData;

/// Join a profile-relative file name under the profile folder into an
/// engine key.
pub(crate) fn join_key(folder: &str, file: &str) -> String {
    Path::new(folder).join(file).to_string_lossy().into_owned()
}

/// Shared handles a profile needs to reach the engine.
///
/// Profiles never touch global state: the lifecycle constructs one context
/// per engine and clones it into every profile it owns.
#[derive(Clone)]
pub struct ProfileContext {
    /// The storage engine all file operations route through.
    pub storage: Arc<FileStorage>,
    /// Key sanitizer shared with the lifecycle.
    pub validator: Arc<FileValidator>,
    /// File system version recorded into headers and envelopes.
    pub version: String,
}

/// The persisted shape of a profile: identity plus the header list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileData {
    /// Human-readable profile name.
    pub display_name: String,
    /// Folder under the engine root holding the profile's files.
    pub folder_name: String,
    /// Name of the profile's own header file inside its folder.
    pub file_name: String,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// Headers of every file the profile tracks.
    #[serde(default)]
    pub files: Vec<FileHeader>,
}

#[derive(Default)]
struct ProfileRuntime {
    loaded: bool,
    /// Decoded value envelopes, keyed by sanitized file name.
    values: HashMap<String, SaveData>,
    /// Raw payloads not yet decoded into an envelope.
    raw: HashMap<String, String>,
    /// Keys stored via `store_file` awaiting the next `save`.
    dirty: HashSet<String>,
    /// The header list changed and the profile file needs a write.
    header_dirty: bool,
}

/// A named save slot: a registry of file headers plus lazily-decoded
/// caches, persisted inside its own folder under the storage engine.
///
/// `save_file` writes through to the engine immediately; `store_file`
/// defers the write until the next [`SaveProfile::save`]. Loads promote
/// raw payloads into decoded envelopes on first typed access — a one-way
/// transition per key.
pub struct SaveProfile {
    ctx: ProfileContext,
    data: Mutex<ProfileData>,
    runtime: Mutex<ProfileRuntime>,
}

impl SaveProfile {
    /// Create a fresh, empty profile. The header file is marked dirty so
    /// the first [`SaveProfile::save`] persists the profile itself.
    pub fn new(
        display_name: impl Into<String>,
        folder_name: impl Into<String>,
        file_name: impl Into<String>,
        ctx: ProfileContext,
    ) -> Self {
        Self {
            ctx,
            data: Mutex::new(ProfileData {
                display_name: display_name.into(),
                folder_name: folder_name.into(),
                file_name: file_name.into(),
                created_at: Utc::now(),
                files: Vec::new(),
            }),
            runtime: Mutex::new(ProfileRuntime {
                header_dirty: true,
                ..ProfileRuntime::default()
            }),
        }
    }

    /// Wrap a profile loaded from the backend.
    pub fn from_data(data: ProfileData, ctx: ProfileContext) -> Self {
        Self {
            ctx,
            data: Mutex::new(data),
            runtime: Mutex::new(ProfileRuntime::default()),
        }
    }

    // ---- identity ---------------------------------------------------------

    /// Human-readable profile name.
    pub fn display_name(&self) -> String {
        self.data.lock().display_name.clone()
    }

    /// Folder under the engine root holding the profile's files.
    pub fn folder_name(&self) -> String {
        self.data.lock().folder_name.clone()
    }

    /// When the profile was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.data.lock().created_at
    }

    /// Engine key of the profile's own header file.
    pub fn profile_data_path(&self) -> String {
        let data = self.data.lock();
        let path = join_key(&data.folder_name, &data.file_name);
        drop(data);
        self.ctx.validator.sanitize(&path)
    }

    /// Whether the initial full load pass has run.
    pub fn is_loaded(&self) -> bool {
        self.runtime.lock().loaded
    }

    /// Snapshot of the tracked headers.
    pub fn headers(&self) -> Vec<FileHeader> {
        self.data.lock().files.clone()
    }

    /// Number of tracked files.
    pub fn file_count(&self) -> usize {
        self.data.lock().files.len()
    }

    fn sanitize_key(&self, key: &str) -> Result<String> {
        if key.trim().is_empty() {
            return Err(ValidationError::BlankKey.into());
        }
        Ok(self.ctx.validator.sanitize(key))
    }

    fn file_key(&self, file_name: &str) -> String {
        join_key(&self.data.lock().folder_name, file_name)
    }

    // ---- save & store -----------------------------------------------------

    /// Persist `value` under `key`, writing through the storage engine
    /// immediately and registering a header when the key is new.
    ///
    /// # Errors
    ///
    /// Fails fast on a blank key or when the value cannot be encoded.
    pub fn save_file<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        options: StoreOptions,
    ) -> Result<()> {
        let file_name = self.sanitize_key(key)?;
        let envelope = self.upsert_value(&file_name, value, &options)?;

        let result = self.ctx.storage.save(&self.file_key(&file_name), &envelope);
        log_save_result(&result, &file_name);

        if self.add_header(&file_name, FileKind::Value, &options) {
            self.save_header_file();
        }
        Ok(())
    }

    /// Update the in-memory value for `key` and mark it dirty; the backend
    /// write is deferred until the next [`SaveProfile::save`].
    ///
    /// # Errors
    ///
    /// Fails fast on a blank key or when the value cannot be encoded.
    pub fn store_file<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        options: StoreOptions,
    ) -> Result<()> {
        let file_name = self.sanitize_key(key)?;
        let _ = self.upsert_value(&file_name, value, &options)?;
        self.runtime.lock().dirty.insert(file_name.clone());

        if self.add_header(&file_name, FileKind::Value, &options) {
            debug!(file = %file_name, profile = %self.display_name(), "added header");
            self.runtime.lock().header_dirty = true;
        }
        Ok(())
    }

    fn upsert_value<T: Serialize>(
        &self,
        file_name: &str,
        value: &T,
        options: &StoreOptions,
    ) -> Result<SaveData> {
        let value = serde_json::to_value(value)
            .map_err(|err| StorageError::encode(file_name, err.to_string()))?;
        let mut runtime = self.runtime.lock();
        let _ = runtime.raw.remove(file_name);
        let envelope = match runtime.values.get_mut(file_name) {
            Some(existing) => {
                existing.update(value, &self.ctx.version);
                existing.clone()
            }
            None => {
                let envelope = SaveData::new(
                    file_name,
                    value,
                    &self.ctx.version,
                    options.tags.clone(),
                );
                runtime
                    .values
                    .insert(file_name.to_string(), envelope.clone());
                envelope
            }
        };
        Ok(envelope)
    }

    fn add_header(&self, file_name: &str, kind: FileKind, options: &StoreOptions) -> bool {
        let mut data = self.data.lock();
        if data.files.iter().any(|header| header.matches(file_name, kind)) {
            return false;
        }
        data.files
            .push(FileHeader::new(file_name, kind, options, &self.ctx.version));
        true
    }

    // ---- load -------------------------------------------------------------

    /// Typed access to the value stored under `key`.
    ///
    /// Returns `None` when the key is unknown or the stored payload does
    /// not decode into `T`. The first typed access of a raw payload
    /// promotes it into the decoded cache.
    ///
    /// # Errors
    ///
    /// Fails fast on a blank key.
    pub fn try_load_file<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let file_name = self.sanitize_key(key)?;
        let mut runtime = self.runtime.lock();

        if let Some(raw) = runtime.raw.get(&file_name).cloned() {
            return Ok(match serde_json::from_str::<SaveData>(&raw) {
                Ok(envelope) => {
                    let _ = runtime.raw.remove(&file_name);
                    let value = envelope.decode::<T>();
                    runtime.values.insert(file_name.clone(), envelope);
                    if value.is_none() {
                        warn!(file = %file_name, "stored payload does not decode into the requested type");
                    }
                    value
                }
                Err(_) => {
                    warn!(file = %file_name, "raw payload is not a value envelope");
                    None
                }
            });
        }

        if let Some(envelope) = runtime.values.get(&file_name) {
            let value = envelope.decode::<T>();
            if value.is_none() {
                warn!(file = %file_name, "file was previously saved with a different type");
            }
            return Ok(value);
        }

        Ok(None)
    }

    /// Typed access returning `T::default()` when the key is unknown.
    ///
    /// # Errors
    ///
    /// Fails fast on a blank key.
    pub fn load_file_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self.try_load_file(key)?.unwrap_or_default())
    }

    /// Whether a header for `key` exists. Requires the profile to be
    /// loaded.
    ///
    /// # Errors
    ///
    /// Fails fast on a blank key, or when the profile is not loaded.
    pub fn has_file(&self, key: &str) -> Result<bool> {
        let file_name = self.sanitize_key(key)?;
        if !self.is_loaded() {
            return Err(ProfileError::not_loaded(self.display_name()).into());
        }
        Ok(self
            .data
            .lock()
            .files
            .iter()
            .any(|header| header.file_name == file_name))
    }

    /// Remove `key` from the profile: caches, header and backend file.
    /// Persists the shortened header list.
    ///
    /// # Errors
    ///
    /// Fails fast on a blank key.
    pub fn delete_file(&self, key: &str) -> Result<()> {
        let file_name = self.sanitize_key(key)?;
        {
            let mut runtime = self.runtime.lock();
            let _ = runtime.values.remove(&file_name);
            let _ = runtime.raw.remove(&file_name);
            let _ = runtime.dirty.remove(&file_name);
        }
        {
            let mut data = self.data.lock();
            let before = data.files.len();
            data.files.retain(|header| header.file_name != file_name);
            if data.files.len() != before {
                self.runtime.lock().header_dirty = true;
            }
        }
        self.ctx.storage.delete(&self.file_key(&file_name));
        self.save();
        Ok(())
    }

    // ---- profile save, load & unload --------------------------------------

    /// Persist every dirty entry, plus the profile's own header file when
    /// the header list changed.
    pub fn save(&self) {
        let (dirty, header_dirty) = {
            let mut runtime = self.runtime.lock();
            let dirty: Vec<SaveData> = runtime
                .dirty
                .iter()
                .filter_map(|key| runtime.values.get(key).cloned())
                .collect();
            runtime.dirty.clear();
            (dirty, runtime.header_dirty)
        };
        for envelope in dirty {
            let result = self
                .ctx
                .storage
                .save(&self.file_key(&envelope.file_name), &envelope);
            log_save_result(&result, &envelope.file_name);
        }
        if header_dirty {
            self.save_header_file();
        }
    }

    fn save_header_file(&self) {
        let data = self.data.lock().clone();
        let path = self.profile_data_path();
        let result = self.ctx.storage.save(&path, &data);
        log_save_result(&result, &path);
        self.runtime.lock().header_dirty = false;
    }

    /// Load every tracked file into the caches. Idempotent: a loaded
    /// profile is left untouched.
    ///
    /// Headers whose kind is [`FileKind::Value`] decode eagerly into the
    /// value cache; blobs, unknown kinds and payloads that fail to decode
    /// are kept raw for lazy typed access.
    pub async fn load_async(&self) {
        if self.is_loaded() {
            return;
        }
        let (folder, headers) = {
            let data = self.data.lock();
            (data.folder_name.clone(), data.files.clone())
        };
        for header in headers {
            if header.file_name.trim().is_empty() {
                error!(profile = %self.display_name(), "header with blank file name skipped");
                continue;
            }
            let key = join_key(&folder, &header.file_name);
            match header.kind {
                FileKind::Value => {
                    let envelope = self.ctx.storage.load_async::<SaveData>(&key).await;
                    match envelope.read() {
                        Some(envelope) => {
                            self.runtime
                                .lock()
                                .values
                                .insert(header.file_name.clone(), envelope);
                        }
                        None => {
                            let raw = self.ctx.storage.load_raw_async(&key).await;
                            if let Some(text) = raw.read() {
                                self.runtime
                                    .lock()
                                    .raw
                                    .insert(header.file_name.clone(), text);
                            }
                        }
                    }
                }
                FileKind::Blob | FileKind::Unknown => {
                    let raw = self.ctx.storage.load_raw_async(&key).await;
                    if let Some(text) = raw.read() {
                        self.runtime
                            .lock()
                            .raw
                            .insert(header.file_name.clone(), text);
                    }
                }
            }
        }
        self.runtime.lock().loaded = true;
    }

    /// Synchronous variant of [`SaveProfile::load_async`].
    pub fn load(&self) {
        if self.is_loaded() {
            return;
        }
        let (folder, headers) = {
            let data = self.data.lock();
            (data.folder_name.clone(), data.files.clone())
        };
        for header in headers {
            if header.file_name.trim().is_empty() {
                error!(profile = %self.display_name(), "header with blank file name skipped");
                continue;
            }
            let key = join_key(&folder, &header.file_name);
            match header.kind {
                FileKind::Value => match self.ctx.storage.load::<SaveData>(&key).read() {
                    Some(envelope) => {
                        self.runtime
                            .lock()
                            .values
                            .insert(header.file_name.clone(), envelope);
                    }
                    None => {
                        if let Some(text) = self.ctx.storage.load_raw(&key).read() {
                            self.runtime
                                .lock()
                                .raw
                                .insert(header.file_name.clone(), text);
                        }
                    }
                },
                FileKind::Blob | FileKind::Unknown => {
                    if let Some(text) = self.ctx.storage.load_raw(&key).read() {
                        self.runtime
                            .lock()
                            .raw
                            .insert(header.file_name.clone(), text);
                    }
                }
            }
        }
        self.runtime.lock().loaded = true;
    }

    /// Clear every cache. The header list is untouched; the profile can be
    /// loaded again.
    pub fn unload(&self) {
        let mut runtime = self.runtime.lock();
        runtime.values.clear();
        runtime.raw.clear();
        runtime.dirty.clear();
        runtime.loaded = false;
    }

    /// Clear every cache *and* the header list. Used when wiping a
    /// profile's data; the emptied header file is persisted by the next
    /// [`SaveProfile::save`].
    pub fn reset(&self) {
        self.unload();
        self.data.lock().files.clear();
        self.runtime.lock().header_dirty = true;
    }

    /// The persisted shape of this profile.
    pub fn to_data(&self) -> ProfileData {
        self.data.lock().clone()
    }
}

fn log_save_result(result: &SaveResult, file: &str) {
    if let Some(error) = result.error() {
        warn!(file, %error, "profile save was rejected by the engine");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savevault_backend::MemoryFileOperations;
    use savevault_cipher::PassthroughCipher;
    use savevault_engine::{FileStorageConfig, LoggingLevel};
    use std::path::PathBuf;
    use std::time::Duration;

    fn must<T, E: std::fmt::Debug>(r: std::result::Result<T, E>) -> T {
        match r {
            Ok(v) => v,
            Err(e) => panic!("unexpected Err: {e:?}"),
        }
    }

    fn test_context(ops: Arc<MemoryFileOperations>) -> ProfileContext {
        let config = FileStorageConfig {
            base_dir: PathBuf::from("save"),
            root_folder: "TestRoot".to_string(),
            encryption_key: "key".to_string(),
            cipher: Arc::new(PassthroughCipher),
            file_operations: ops,
            force_synchronous: true,
            error_logging: LoggingLevel::Warning,
            write_timeout: Duration::from_secs(5),
        };
        ProfileContext {
            storage: must(savevault_engine::FileStorage::initialize(config)),
            validator: Arc::new(FileValidator::default()),
            version: "1.0.0".to_string(),
        }
    }

    fn test_profile(ops: Arc<MemoryFileOperations>) -> SaveProfile {
        SaveProfile::new("Slot0", "Slot0", "_slot.sav", test_context(ops))
    }

    #[tokio::test]
    async fn test_save_file_writes_through_and_registers_header() {
        let ops = Arc::new(MemoryFileOperations::new());
        let profile = test_profile(Arc::clone(&ops));

        must(profile.save_file("score", &7u32, StoreOptions::default()));

        assert_eq!(ops.write_count(&PathBuf::from("save/TestRoot/Slot0/score.sav")), 1);
        assert_eq!(profile.file_count(), 1);
        // Header file written alongside the new header.
        assert!(ops.contains(&PathBuf::from("save/TestRoot/Slot0/_slot.sav")));
        assert_eq!(must(profile.try_load_file::<u32>("score")), Some(7));
    }

    #[tokio::test]
    async fn test_store_file_defers_backend_write() {
        let ops = Arc::new(MemoryFileOperations::new());
        let profile = test_profile(Arc::clone(&ops));
        let score_path = PathBuf::from("save/TestRoot/Slot0/score.sav");

        must(profile.store_file("score", &5u32, StoreOptions::default()));
        must(profile.store_file("score", &7u32, StoreOptions::default()));
        assert_eq!(ops.write_count(&score_path), 0);

        profile.save();

        assert_eq!(ops.write_count(&score_path), 1);
        let text = ops.file_text(&score_path).unwrap_or_default();
        assert!(text.contains(":7") || text.contains(": 7"), "payload holds 7: {text}");
    }

    #[tokio::test]
    async fn test_blank_key_fails_fast() {
        let ops = Arc::new(MemoryFileOperations::new());
        let profile = test_profile(ops);

        assert!(profile.save_file("  ", &1u32, StoreOptions::default()).is_err());
        assert!(profile.try_load_file::<u32>("").is_err());
        assert!(profile.delete_file("").is_err());
    }

    #[tokio::test]
    async fn test_type_mismatch_returns_none() {
        let ops = Arc::new(MemoryFileOperations::new());
        let profile = test_profile(ops);

        must(profile.save_file("score", &7u32, StoreOptions::default()));
        assert_eq!(must(profile.try_load_file::<String>("score")), None);
        // The original typed access still works.
        assert_eq!(must(profile.try_load_file::<u32>("score")), Some(7));
    }

    #[tokio::test]
    async fn test_round_trip_through_backend() {
        let ops = Arc::new(MemoryFileOperations::new());
        let profile = test_profile(Arc::clone(&ops));

        must(profile.save_file("score", &41u32, StoreOptions::default()));
        let data = profile.to_data();

        // A second profile instance over the same backend lazily loads
        // what the first one wrote.
        let restored = SaveProfile::from_data(data, test_context(Arc::clone(&ops)));
        restored.load_async().await;
        assert!(restored.is_loaded());
        assert_eq!(must(restored.try_load_file::<u32>("score")), Some(41));
    }

    #[tokio::test]
    async fn test_unknown_header_kind_loads_as_raw() {
        let ops = Arc::new(MemoryFileOperations::new());
        let profile = test_profile(Arc::clone(&ops));
        must(profile.save_file("score", &7u32, StoreOptions::default()));
        let mut data = profile.to_data();
        if let Some(header) = data.files.first_mut() {
            header.kind = FileKind::Unknown;
        }

        let restored = SaveProfile::from_data(data, test_context(ops));
        restored.load_async().await;

        // Raw payloads still resolve through lazy typed access.
        assert_eq!(must(restored.try_load_file::<u32>("score")), Some(7));
    }

    #[tokio::test]
    async fn test_delete_file_removes_header_and_backend_file() {
        let ops = Arc::new(MemoryFileOperations::new());
        let profile = test_profile(Arc::clone(&ops));

        must(profile.save_file("score", &7u32, StoreOptions::default()));
        must(profile.delete_file("score"));

        assert_eq!(profile.file_count(), 0);
        assert!(!ops.contains(&PathBuf::from("save/TestRoot/Slot0/score.sav")));
        assert_eq!(must(profile.try_load_file::<u32>("score")), None);
    }

    #[tokio::test]
    async fn test_has_file_requires_loaded_profile() {
        let ops = Arc::new(MemoryFileOperations::new());
        let profile = test_profile(ops);

        assert!(profile.has_file("score").is_err());

        profile.load_async().await;
        assert!(!must(profile.has_file("score")));

        must(profile.save_file("score", &7u32, StoreOptions::default()));
        assert!(must(profile.has_file("score")));
    }

    #[tokio::test]
    async fn test_reset_clears_headers_and_persists_empty_list() {
        let ops = Arc::new(MemoryFileOperations::new());
        let profile = test_profile(Arc::clone(&ops));

        must(profile.save_file("score", &7u32, StoreOptions::default()));
        profile.reset();
        profile.save();

        assert_eq!(profile.file_count(), 0);
        let header_text = ops
            .file_text(&PathBuf::from("save/TestRoot/Slot0/_slot.sav"))
            .unwrap_or_default();
        assert!(header_text.contains("\"files\":[]"), "empty header list: {header_text}");
    }
}

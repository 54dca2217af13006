//! The file system lifecycle state machine.
//!
//! A [`FileSystem`] is an explicit, caller-owned handle (no globals):
//! construct one at application start, initialize it with settings, and
//! pass it to whatever needs profile access. Multiple instances coexist,
//! which is what the tests do.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use savevault_cipher::PassthroughCipher;
use savevault_backend::DiskFileOperations;
use savevault_engine::{FileStorage, FileStorageConfig, FileValidator, ShutdownArgs};
use savevault_errors::{ProfileError, Result, SaveVaultError};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast, watch};
use tracing::{debug, error, info, trace, warn};

use crate::converter::SaveConverter;
use crate::creation::{ProfileCreationArgs, ProfileCreationResult, ProfileCreationStatus};
use crate::events::FileSystemEvent;
use crate::options::StoreOptions;
use crate::profile::{ProfileContext, ProfileData, SaveProfile, join_key};
use crate::settings::{DEFAULT_ENCRYPTION_KEY, FileSystemSettings};

const SYSTEM_DATA_FILE: &str = "storage.sav";
const PROFILE_PATHS_FILE: &str = "profiles.sav";
const PROFILE_HEADER_FILE: &str = "_slot.sav";
const SHARED_PROFILE_NAME: &str = "Shared";
const SHARED_PROFILE_FOLDER: &str = "_shared";
const SHARED_PROFILE_FILE: &str = "_shared.sav";
const MAX_PROFILE_NAME_LENGTH: usize = 64;

/// Lifecycle state of a [`FileSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileSystemState {
    /// No storage exists; the initial and terminal state.
    #[default]
    Uninitialized,
    /// `initialize` is running.
    Initializing,
    /// The stable operating state.
    Initialized,
    /// `shutdown` is running; transitions back to `Uninitialized`.
    Shutdown,
}

/// Active-profile pointer and profile-name counter, stored as a file of
/// the shared profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SystemData {
    #[serde(default)]
    active_profile_path: String,
    #[serde(default)]
    next_profile_index: u32,
}

/// Ordered list of known profile data paths, stored as a file of the
/// shared profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfilePathData {
    #[serde(default)]
    paths: Vec<String>,
}

/// Everything that only exists while the file system is initialized.
struct Runtime {
    ctx: ProfileContext,
    root_folder: String,
    default_profile_name: String,
    profile_limit: usize,
    shared: Arc<SaveProfile>,
    active: Option<Arc<SaveProfile>>,
    profiles: HashMap<String, Arc<SaveProfile>>,
    path_data: ProfilePathData,
    system_data: SystemData,
}

struct Inner {
    state: FileSystemState,
    runtime: Option<Runtime>,
}

/// The process-facing save system: owns the storage engine, the shared
/// profile and the profile registry, and guards every operation behind the
/// lifecycle state machine.
pub struct FileSystem {
    inner: RwLock<Inner>,
    events: broadcast::Sender<FileSystemEvent>,
    init_signal: Mutex<watch::Sender<bool>>,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem {
    /// Create an uninitialized file system handle.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(32);
        let (init_signal, _) = watch::channel(false);
        Self {
            inner: RwLock::new(Inner {
                state: FileSystemState::Uninitialized,
                runtime: None,
            }),
            events,
            init_signal: Mutex::new(init_signal),
        }
    }

    // ---- observation ------------------------------------------------------

    /// Current lifecycle state.
    pub async fn state(&self) -> FileSystemState {
        self.inner.read().await.state
    }

    /// Whether the file system is in the `Initialized` state.
    pub async fn is_initialized(&self) -> bool {
        self.state().await == FileSystemState::Initialized
    }

    /// Subscribe to lifecycle notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<FileSystemEvent> {
        self.events.subscribe()
    }

    /// Wait until the file system reaches the `Initialized` state.
    pub async fn await_initialization(&self) {
        let mut signal = { self.init_signal.lock().subscribe() };
        if signal.wait_for(|initialized| *initialized).await.is_err() {
            debug!("initialization signal was reset before completion");
        }
    }

    fn publish(&self, event: FileSystemEvent) {
        if let Err(error) = self.events.send(event) {
            trace!(%error, "no lifecycle event subscribers");
        }
    }

    // ---- guarded accessors ------------------------------------------------

    /// The active save profile.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized` state.
    pub async fn profile(&self) -> Result<Arc<SaveProfile>> {
        let inner = self.inner.read().await;
        Self::runtime_of(&inner, "profile")?
            .active
            .clone()
            .ok_or_else(|| SaveVaultError::not_initialized("profile"))
    }

    /// The shared profile holding cross-profile bookkeeping and any data
    /// that is not profile-specific.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized` state.
    pub async fn shared_profile(&self) -> Result<Arc<SaveProfile>> {
        let inner = self.inner.read().await;
        Ok(Arc::clone(&Self::runtime_of(&inner, "shared_profile")?.shared))
    }

    /// Every known profile.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized` state.
    pub async fn profiles(&self) -> Result<Vec<Arc<SaveProfile>>> {
        let inner = self.inner.read().await;
        Ok(Self::runtime_of(&inner, "profiles")?
            .profiles
            .values()
            .cloned()
            .collect())
    }

    /// Look a profile up by display name.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized` state.
    pub async fn profile_by_name(&self, name: &str) -> Result<Option<Arc<SaveProfile>>> {
        let inner = self.inner.read().await;
        Ok(Self::runtime_of(&inner, "profile_by_name")?
            .profiles
            .values()
            .find(|profile| profile.display_name() == name)
            .cloned())
    }

    /// The resolved file system version.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized` state.
    pub async fn version(&self) -> Result<String> {
        let inner = self.inner.read().await;
        Ok(Self::runtime_of(&inner, "version")?.ctx.version.clone())
    }

    /// The version-suffixed root folder name.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized` state.
    pub async fn root_folder(&self) -> Result<String> {
        let inner = self.inner.read().await;
        Ok(Self::runtime_of(&inner, "root_folder")?.root_folder.clone())
    }

    /// Commit the storage backend. May stall the caller depending on the
    /// platform; avoid calling mid-gameplay.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized` state.
    pub async fn save_backend(&self) -> Result<()> {
        let inner = self.inner.read().await;
        Self::runtime_of(&inner, "save_backend")?.ctx.storage.save_backend();
        Ok(())
    }

    fn runtime_of<'a>(inner: &'a Inner, operation: &str) -> Result<&'a Runtime> {
        if inner.state != FileSystemState::Initialized {
            return Err(SaveVaultError::not_initialized(operation));
        }
        inner
            .runtime
            .as_ref()
            .ok_or_else(|| SaveVaultError::not_initialized(operation))
    }

    fn runtime_mut<'a>(inner: &'a mut Inner, operation: &str) -> Result<&'a mut Runtime> {
        if inner.state != FileSystemState::Initialized {
            return Err(SaveVaultError::not_initialized(operation));
        }
        inner
            .runtime
            .as_mut()
            .ok_or_else(|| SaveVaultError::not_initialized(operation))
    }

    // ---- initialization ---------------------------------------------------

    /// Bring the file system up: construct the storage engine, load or
    /// create the shared profile and the profile registry, resolve and
    /// activate the active profile, and run the legacy converter when one
    /// is configured.
    ///
    /// A no-op when the file system is not `Uninitialized`.
    ///
    /// # Errors
    ///
    /// Any failure during the sequence tears the partially-built state
    /// down again (automatic shutdown) and surfaces the error; the file
    /// system is back in `Uninitialized` and can be re-initialized.
    pub async fn initialize(&self, settings: FileSystemSettings) -> Result<()> {
        {
            let mut inner = self.inner.write().await;
            if inner.state != FileSystemState::Uninitialized {
                debug!(state = ?inner.state, "initialize is a no-op outside Uninitialized");
                return Ok(());
            }
            inner.state = FileSystemState::Initializing;
            info!("initialization started");
            self.publish(FileSystemEvent::InitializationStarted);

            match Self::build_runtime(&settings).await {
                Ok(runtime) => {
                    inner.runtime = Some(runtime);
                    inner.state = FileSystemState::Initialized;
                }
                Err(err) => {
                    error!(error = %err, "error during file system initialization, shutting down");
                    inner.state = FileSystemState::Uninitialized;
                    return Err(err);
                }
            }

            // Legacy conversion runs once the state machine is stable.
            if let Some(converter) = &settings.converter {
                if let Some(runtime) = inner.runtime.as_ref() {
                    if let Err(error) = Self::run_converter(converter.as_ref(), runtime).await {
                        warn!(%error, "legacy save conversion failed");
                    }
                }
            }

            if let Some(runtime) = inner.runtime.as_ref() {
                runtime.shared.save();
            }
        }

        self.init_signal.lock().send_replace(true);
        info!("initialization completed");
        self.publish(FileSystemEvent::InitializationCompleted);
        Ok(())
    }

    fn storage_config(settings: &FileSystemSettings, root_folder: &str) -> FileStorageConfig {
        FileStorageConfig {
            base_dir: settings.base_dir.clone(),
            root_folder: root_folder.to_string(),
            encryption_key: settings
                .encryption_key
                .clone()
                .filter(|key| !key.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ENCRYPTION_KEY.to_string()),
            cipher: settings
                .cipher
                .clone()
                .unwrap_or_else(|| Arc::new(PassthroughCipher)),
            file_operations: settings
                .file_operations
                .clone()
                .unwrap_or_else(|| Arc::new(DiskFileOperations::new())),
            force_synchronous: settings.force_synchronous,
            error_logging: settings.error_logging,
            write_timeout: settings.write_timeout,
        }
    }

    async fn build_runtime(settings: &FileSystemSettings) -> Result<Runtime> {
        let version = settings.resolved_version();
        let root_folder = settings.root_folder_name(&version);
        let validator = Arc::new(FileValidator::new(
            &settings.file_extension,
            settings.enforce_file_extensions.as_deref(),
            settings.warn_missing_extension,
        ));
        let storage = FileStorage::initialize(Self::storage_config(settings, &root_folder))?;

        match Self::assemble_runtime(settings, storage.clone(), validator, version, root_folder)
            .await
        {
            Ok(runtime) => Ok(runtime),
            Err(err) => {
                // Tear the half-built engine down so nothing keeps pumping.
                storage.shutdown(ShutdownArgs::synchronous());
                Err(err)
            }
        }
    }

    async fn assemble_runtime(
        settings: &FileSystemSettings,
        storage: Arc<FileStorage>,
        validator: Arc<FileValidator>,
        version: String,
        root_folder: String,
    ) -> Result<Runtime> {
        let ctx = ProfileContext {
            storage: Arc::clone(&storage),
            validator,
            version,
        };
        let profile_limit = if settings.profile_limit == 0 {
            usize::MAX
        } else {
            settings.profile_limit as usize
        };

        let shared_path = join_key(SHARED_PROFILE_FOLDER, SHARED_PROFILE_FILE);
        let shared = Arc::new(
            match storage.load_async::<ProfileData>(&shared_path).await.read() {
                Some(data) => SaveProfile::from_data(data, ctx.clone()),
                None => SaveProfile::new(
                    SHARED_PROFILE_NAME,
                    SHARED_PROFILE_FOLDER,
                    SHARED_PROFILE_FILE,
                    ctx.clone(),
                ),
            },
        );
        shared.load_async().await;

        let system_data: SystemData = shared.try_load_file(SYSTEM_DATA_FILE)?.unwrap_or_default();
        let path_data: ProfilePathData =
            shared.try_load_file(PROFILE_PATHS_FILE)?.unwrap_or_default();

        let active_path = system_data.active_profile_path.clone();
        let active_data = if active_path.is_empty() {
            None
        } else {
            storage.load_async::<ProfileData>(&active_path).await.read()
        };
        let active = Arc::new(match active_data {
            Some(data) => SaveProfile::from_data(data, ctx.clone()),
            None => {
                let folder = format!("{}{}", settings.default_profile_name, path_data.paths.len());
                SaveProfile::new(&folder, &folder, PROFILE_HEADER_FILE, ctx.clone())
            }
        });

        let mut profiles = HashMap::with_capacity(path_data.paths.len());
        for profile_path in &path_data.paths {
            if profiles.contains_key(profile_path) {
                continue;
            }
            if let Some(data) = storage.load_async::<ProfileData>(profile_path).await.read() {
                profiles.insert(
                    profile_path.clone(),
                    Arc::new(SaveProfile::from_data(data, ctx.clone())),
                );
            }
        }

        let mut runtime = Runtime {
            ctx,
            root_folder,
            default_profile_name: settings.default_profile_name.clone(),
            profile_limit,
            shared,
            active: None,
            profiles,
            path_data,
            system_data,
        };

        // The startup switch; change notifications are suppressed because
        // the state machine is not Initialized yet.
        let _switched = Self::activate_profile(&mut runtime, Arc::clone(&active)).await;
        // A freshly created default profile has no file yet; persist it so
        // the active-profile pointer resolves on the next run.
        active.save();

        Ok(runtime)
    }

    async fn run_converter(converter: &dyn SaveConverter, runtime: &Runtime) -> Result<()> {
        let Some(active) = &runtime.active else {
            return Ok(());
        };
        let settings = converter.settings();
        let version = settings.resolved_version();
        let root_folder = settings.root_folder_name(&version);
        let legacy = FileStorage::initialize(Self::storage_config(&settings, &root_folder))?;

        info!("running legacy save converter");
        let outcome = converter
            .convert(Arc::clone(&legacy), active, &runtime.shared)
            .await;
        legacy.shutdown(ShutdownArgs::synchronous());

        match outcome {
            Ok(()) => {
                active.save();
                Ok(())
            }
            Err(err) => Err(SaveVaultError::Other(format!(
                "legacy save conversion failed: {err}"
            ))),
        }
    }

    // ---- shutdown ---------------------------------------------------------

    /// Bring the file system down: drain all pending storage I/O, unload
    /// the active and shared profiles, clear every cache and return to
    /// `Uninitialized`.
    ///
    /// A no-op when the file system is not `Initialized`.
    pub async fn shutdown(&self, args: ShutdownArgs) {
        {
            let mut inner = self.inner.write().await;
            if inner.state != FileSystemState::Initialized {
                debug!(state = ?inner.state, "shutdown is a no-op outside Initialized");
                return;
            }
            inner.state = FileSystemState::Shutdown;
            info!("shutdown started");
            self.publish(FileSystemEvent::ShutdownStarted);

            if let Some(runtime) = inner.runtime.take() {
                runtime.ctx.storage.shutdown_async(args).await;
                if let Some(active) = &runtime.active {
                    active.unload();
                }
                runtime.shared.unload();
            }

            // Re-arm the initialization signal for the next lifecycle.
            {
                let mut signal = self.init_signal.lock();
                let (fresh, _) = watch::channel(false);
                *signal = fresh;
            }

            inner.state = FileSystemState::Uninitialized;
        }
        info!("shutdown completed");
        self.publish(FileSystemEvent::ShutdownCompleted);
    }

    // ---- profile switching ------------------------------------------------

    /// Make `profile` the active profile. Returns `false` when it already
    /// is.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized` state.
    pub async fn switch_profile(&self, profile: &Arc<SaveProfile>) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let runtime = Self::runtime_mut(&mut inner, "switch_profile")?;
        let switched = Self::activate_profile(runtime, Arc::clone(profile)).await;
        if switched {
            self.publish(FileSystemEvent::ProfileChanged {
                profile: profile.display_name(),
            });
            runtime.shared.save();
        }
        Ok(switched)
    }

    /// Unload the previous active profile, load the new one and persist
    /// the active-profile pointer. Returns `false` for a same-profile
    /// switch.
    async fn activate_profile(runtime: &mut Runtime, profile: Arc<SaveProfile>) -> bool {
        if let Some(current) = &runtime.active {
            if Arc::ptr_eq(current, &profile) {
                return false;
            }
            if current.is_loaded() {
                current.unload();
            }
            info!(
                from = %current.display_name(),
                to = %profile.display_name(),
                "switching active profile"
            );
        } else {
            info!(to = %profile.display_name(), "activating profile");
        }

        profile.load_async().await;
        let path = profile.profile_data_path();
        runtime.profiles.insert(path.clone(), Arc::clone(&profile));
        runtime.system_data.active_profile_path = path;
        Self::persist_system_data(runtime);
        runtime.active = Some(profile);
        true
    }

    fn persist_system_data(runtime: &Runtime) {
        if let Err(error) = runtime.shared.store_file(
            SYSTEM_DATA_FILE,
            &runtime.system_data,
            StoreOptions::default(),
        ) {
            warn!(%error, "failed to stage system data");
        }
    }

    fn persist_registry(runtime: &Runtime) {
        if let Err(error) = runtime.shared.store_file(
            PROFILE_PATHS_FILE,
            &runtime.path_data,
            StoreOptions::default(),
        ) {
            warn!(%error, "failed to stage profile registry");
        }
    }

    // ---- profile creation -------------------------------------------------

    /// Create a new profile.
    ///
    /// Rejections (limit reached, reserved or invalid or colliding name)
    /// are reported as a [`ProfileCreationStatus`], not as errors.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized` state.
    pub async fn create_profile(
        &self,
        args: ProfileCreationArgs,
    ) -> Result<ProfileCreationResult> {
        let mut inner = self.inner.write().await;
        let runtime = Self::runtime_mut(&mut inner, "create_profile")?;

        if runtime.path_data.paths.len() >= runtime.profile_limit {
            return Ok(ProfileCreationResult::rejected(
                ProfileCreationStatus::ProfileLimitReached,
            ));
        }

        if let Some(name) = &args.name {
            if Self::is_reserved_name(name, &runtime.default_profile_name) {
                return Ok(ProfileCreationResult::rejected(
                    ProfileCreationStatus::SystemReservedName,
                ));
            }
        }

        let profile_name = match &args.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => {
                runtime.system_data.next_profile_index += 1;
                let generated = format!(
                    "{}{}",
                    runtime.default_profile_name, runtime.system_data.next_profile_index
                );
                Self::persist_system_data(runtime);
                generated
            }
        };

        if profile_name.chars().count() > MAX_PROFILE_NAME_LENGTH {
            return Ok(ProfileCreationResult::rejected(
                ProfileCreationStatus::NameTooLong,
            ));
        }
        if !runtime.ctx.validator.is_valid_profile_name(&profile_name) {
            return Ok(ProfileCreationResult::rejected(
                ProfileCreationStatus::NameInvalid,
            ));
        }

        let folder_name = profile_name.replace(' ', "_");
        let candidate = runtime
            .ctx
            .validator
            .sanitize(&join_key(&folder_name, PROFILE_HEADER_FILE));
        if runtime.path_data.paths.contains(&candidate) {
            return Ok(ProfileCreationResult::rejected(
                ProfileCreationStatus::NameNotAvailable,
            ));
        }

        let profile = Arc::new(SaveProfile::new(
            &profile_name,
            &folder_name,
            PROFILE_HEADER_FILE,
            runtime.ctx.clone(),
        ));
        let path = profile.profile_data_path();
        runtime.path_data.paths.push(path.clone());
        Self::persist_registry(runtime);

        if args.activate {
            let _switched = Self::activate_profile(runtime, Arc::clone(&profile)).await;
        } else {
            runtime.profiles.insert(path, Arc::clone(&profile));
        }

        profile.save();
        runtime.shared.save();

        info!(profile = %profile_name, "profile created");
        self.publish(FileSystemEvent::ProfileCreated {
            profile: profile_name,
        });
        if args.activate {
            self.publish(FileSystemEvent::ProfileChanged {
                profile: profile.display_name(),
            });
        }
        Ok(ProfileCreationResult::success(profile))
    }

    /// A user-supplied name must not collide with generated profile names
    /// (`{default}{digits}`).
    fn is_reserved_name(name: &str, default_profile_name: &str) -> bool {
        let Some(rest) = name.strip_prefix(default_profile_name) else {
            return false;
        };
        rest.chars().all(|c| c.is_ascii_digit())
    }

    // ---- profile deletion -------------------------------------------------

    /// Delete a profile and every file it tracks. The active profile is
    /// refused.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized`
    /// state; [`ProfileError::ActiveProfile`] for the active profile.
    pub async fn delete_profile(&self, profile: &Arc<SaveProfile>) -> Result<()> {
        let mut inner = self.inner.write().await;
        let runtime = Self::runtime_mut(&mut inner, "delete_profile")?;

        let display_name = profile.display_name();
        if runtime
            .active
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(active, profile))
        {
            warn!(profile = %display_name, "cannot delete the active profile");
            return Err(ProfileError::active_profile(display_name).into());
        }

        self.publish(FileSystemEvent::ProfileDeleted {
            profile: display_name.clone(),
        });

        let path = profile.profile_data_path();
        let folder = profile.folder_name();
        let _removed = runtime.profiles.remove(&path);
        runtime.path_data.paths.retain(|known| known != &path);
        Self::persist_registry(runtime);
        runtime.shared.save();

        if profile.is_loaded() {
            profile.unload();
        }
        for header in profile.headers() {
            runtime
                .ctx
                .storage
                .delete_async(&join_key(&folder, &header.file_name))
                .await;
        }
        runtime.ctx.storage.delete_async(&path).await;
        runtime.ctx.storage.delete_folder_async(&folder).await;

        info!(profile = %display_name, "profile deleted");
        Ok(())
    }

    /// Delete a profile by display name.
    ///
    /// # Errors
    ///
    /// [`ProfileError::NotFound`] when no profile carries the name, plus
    /// everything [`FileSystem::delete_profile`] reports.
    pub async fn delete_profile_by_name(&self, name: &str) -> Result<()> {
        let profile = self
            .profile_by_name(name)
            .await?
            .ok_or_else(|| ProfileError::not_found(name))?;
        self.delete_profile(&profile).await
    }

    // ---- profile reset ----------------------------------------------------

    /// Delete every file the profile tracks, clear its header list and
    /// persist the now-empty profile.
    ///
    /// # Errors
    ///
    /// [`SaveVaultError::NotInitialized`] outside the `Initialized` state.
    pub async fn reset_profile(&self, profile: &Arc<SaveProfile>) -> Result<()> {
        let inner = self.inner.write().await;
        let runtime = Self::runtime_of(&inner, "reset_profile")?;

        let folder = profile.folder_name();
        if profile.is_loaded() {
            profile.unload();
        }
        for header in profile.headers() {
            runtime
                .ctx
                .storage
                .delete_async(&join_key(&folder, &header.file_name))
                .await;
        }
        profile.reset();
        profile.save();

        let display_name = profile.display_name();
        info!(profile = %display_name, "profile reset");
        self.publish(FileSystemEvent::ProfileReset {
            profile: display_name,
        });
        Ok(())
    }

    /// Reset a profile by display name.
    ///
    /// # Errors
    ///
    /// [`ProfileError::NotFound`] when no profile carries the name, plus
    /// everything [`FileSystem::reset_profile`] reports.
    pub async fn reset_profile_by_name(&self, name: &str) -> Result<()> {
        let profile = self
            .profile_by_name(name)
            .await?
            .ok_or_else(|| ProfileError::not_found(name))?;
        self.reset_profile(&profile).await
    }
}

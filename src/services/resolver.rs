use crate::models::{AppId, GameRecord, UNKNOWN};
use crate::services::library::{
    self, COMMON_DIR, LibraryError, STEAMAPPS_DIR, manifest_path, read_libraries,
};
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Errors that can occur while resolving a game
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Steam installation not found")]
    InstallationNotFound,

    #[error("Game with AppID {0} not found in any Steam library")]
    GameNotFound(AppId),

    #[error("Field '{field}' not found in manifest: {manifest}")]
    MissingField {
        field: &'static str,
        manifest: Utf8PathBuf,
    },

    #[error("Game directory not found: {0}")]
    DirectoryMissing(Utf8PathBuf),

    #[error("{name} (AppID {id}) is not fully installed: SizeOnDisk is 0")]
    NotFullyInstalled { id: AppId, name: String },

    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// Finds the Steam installation root.
///
/// The system implementation asks the OS (registry on Windows, home directory
/// conventions elsewhere); tests and the `steam_path` setting use a fixed root.
#[cfg_attr(test, mockall::automock)]
pub trait SteamRootLocator {
    fn locate(&self) -> Option<Utf8PathBuf>;
}

/// Locates Steam the way the client registers itself with the OS
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSteamLocator;

impl SteamRootLocator for SystemSteamLocator {
    fn locate(&self) -> Option<Utf8PathBuf> {
        let steam_dir = match steamlocate::SteamDir::locate() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("Steam installation lookup failed: {}", e);
                return None;
            }
        };

        match Utf8PathBuf::try_from(steam_dir.path().to_path_buf()) {
            Ok(path) if path.is_dir() => Some(path),
            Ok(path) => {
                tracing::warn!("Registered Steam path is not a directory: {}", path);
                None
            }
            Err(e) => {
                tracing::warn!("Steam path is not valid UTF-8: {}", e);
                None
            }
        }
    }
}

/// A Steam root supplied by the caller (settings override, tests)
#[derive(Debug, Clone)]
pub struct FixedSteamRoot(pub Utf8PathBuf);

impl SteamRootLocator for FixedSteamRoot {
    fn locate(&self) -> Option<Utf8PathBuf> {
        self.0.is_dir().then(|| self.0.clone())
    }
}

/// Resolves an AppID into a [`GameRecord`] by walking Steam's libraries.
///
/// Stateless apart from the injected locator: every call re-reads the index and
/// manifest, so results always reflect the current filesystem.
pub struct GameResolver<L: SteamRootLocator> {
    locator: L,
}

impl<L: SteamRootLocator> GameResolver<L> {
    pub fn new(locator: L) -> Self {
        Self { locator }
    }

    /// The Steam root, or `InstallationNotFound`
    pub fn steam_root(&self) -> Result<Utf8PathBuf, ResolveError> {
        self.locator
            .locate()
            .ok_or(ResolveError::InstallationNotFound)
    }

    /// Resolve `app_id` against the located Steam installation.
    pub fn resolve(&self, app_id: &AppId) -> Result<GameRecord, ResolveError> {
        let steam_root = self.steam_root()?;
        resolve_in(&steam_root, app_id)
    }

    /// Path of the manifest for `app_id` in whichever library holds it
    pub fn manifest_for(&self, app_id: &AppId) -> Result<Utf8PathBuf, ResolveError> {
        let steam_root = self.steam_root()?;
        let library = find_game_library(&steam_root, app_id)?;
        Ok(manifest_path(&library, &app_id.manifest_file_name()))
    }
}

/// Reject a game Steam reports as having nothing on disk.
pub fn ensure_fully_installed(game: &GameRecord) -> Result<(), ResolveError> {
    if game.is_fully_installed() {
        Ok(())
    } else {
        tracing::warn!("AppID {} has SizeOnDisk 0", game.id);
        Err(ResolveError::NotFullyInstalled {
            id: game.id.clone(),
            name: game.name.clone(),
        })
    }
}

/// Resolve `app_id` against the Steam installation registered with the OS.
pub fn resolve_game(app_id: &AppId) -> Result<GameRecord, ResolveError> {
    GameResolver::new(SystemSteamLocator).resolve(app_id)
}

/// First library (in index order) holding a manifest for `app_id`.
pub fn find_game_library(steam_root: &Utf8Path, app_id: &AppId) -> Result<Utf8PathBuf, ResolveError> {
    let manifest_name = app_id.manifest_file_name();
    read_libraries(steam_root)?
        .into_iter()
        .find(|library| manifest_path(library, &manifest_name).is_file())
        .ok_or_else(|| ResolveError::GameNotFound(app_id.clone()))
}

/// Resolve `app_id` against a known Steam root.
pub fn resolve_in(steam_root: &Utf8Path, app_id: &AppId) -> Result<GameRecord, ResolveError> {
    let library_path = find_game_library(steam_root, app_id)?;
    tracing::debug!("AppID {} found in library {}", app_id, library_path);

    let manifest = manifest_path(&library_path, &app_id.manifest_file_name());
    let mut fields = library::read_manifest(&manifest)?;

    let install_dir = fields
        .swap_remove("installdir")
        .ok_or_else(|| ResolveError::MissingField {
            field: "installdir",
            manifest: manifest.clone(),
        })?;

    let game_path = library_path
        .join(STEAMAPPS_DIR)
        .join(COMMON_DIR)
        .join(&install_dir);
    if !game_path.is_dir() {
        return Err(ResolveError::DirectoryMissing(game_path));
    }

    // An empty value falls back to the default like a missing key
    let mut field_or = |key: &str, default: &str| {
        fields
            .swap_remove(key)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let record = GameRecord {
        id: app_id.clone(),
        name: field_or("name", UNKNOWN),
        install_dir,
        game_path,
        build_id: field_or("buildid", UNKNOWN),
        size_on_disk: field_or("SizeOnDisk", "0"),
        library_path,
        last_updated: field_or("LastUpdated", "0").parse().unwrap_or(0),
    };

    tracing::info!(
        "Resolved AppID {} ({}) at {}",
        record.id,
        record.name,
        record.game_path
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_locator_failure_is_installation_not_found() {
        let mut locator = MockSteamRootLocator::new();
        locator.expect_locate().times(1).returning(|| None);

        let resolver = GameResolver::new(locator);
        let err = resolver.resolve(&AppId::new("440").unwrap()).unwrap_err();
        assert!(matches!(err, ResolveError::InstallationNotFound));
    }

    #[test]
    fn test_missing_index_surfaces_through_resolver() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        let mut locator = MockSteamRootLocator::new();
        let located = root.clone();
        locator
            .expect_locate()
            .returning(move || Some(located.clone()));

        let resolver = GameResolver::new(locator);
        let err = resolver.resolve(&AppId::new("440").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Library(LibraryError::IndexFileMissing(_))
        ));
    }

    fn record(size_on_disk: &str) -> GameRecord {
        GameRecord {
            id: AppId::new("1245620").unwrap(),
            name: "ELDEN RING".to_string(),
            install_dir: "ELDEN RING".to_string(),
            game_path: Utf8PathBuf::from("/lib/steamapps/common/ELDEN RING"),
            build_id: "1".to_string(),
            size_on_disk: size_on_disk.to_string(),
            library_path: Utf8PathBuf::from("/lib"),
            last_updated: 0,
        }
    }

    #[test]
    fn test_zero_size_on_disk_is_not_fully_installed() {
        let err = ensure_fully_installed(&record("0")).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NotFullyInstalled { ref name, .. } if name == "ELDEN RING"
        ));
        assert!(ensure_fully_installed(&record("52337287466")).is_ok());
    }

    #[test]
    fn test_fixed_root_requires_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        assert_eq!(FixedSteamRoot(root.clone()).locate(), Some(root.clone()));
        assert_eq!(FixedSteamRoot(root.join("nope")).locate(), None);
    }

    #[test]
    fn test_game_not_found_when_no_library_has_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join(STEAMAPPS_DIR)).unwrap();
        fs::write(
            library::library_index_path(&root),
            format!("\"libraryfolders\" {{ \"0\" {{ \"path\" \"{}\" }} }}", root),
        )
        .unwrap();

        let err = resolve_in(&root, &AppId::new("570").unwrap()).unwrap_err();
        assert!(matches!(err, ResolveError::GameNotFound(id) if id.as_str() == "570"));
    }
}

use std::path::{Path, PathBuf};

use cb_core::{file_utils, IntoIoError, IoError, Platform};

/// Default repository that library downloads fall back to when a
/// library declares neither an explicit URL nor a repository base.
pub const DEFAULT_LIBRARY_REPO: &str = "https://libraries.minecraft.net/";

/// Everything the launcher core needs to know about its environment,
/// built once at startup and passed by reference to every component.
///
/// There is deliberately no global state here: directories, platform
/// and policy all travel through this value, so tests can point the
/// whole pipeline at a sandbox and a simulated platform.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Root folder holding `libraries/` and `versions/`.
    pub launcher_dir: PathBuf,
    /// The platform launches target. Normally [`Platform::current`].
    pub platform: Platform,
    /// Explicit java executable to use instead of auto-location.
    pub java_override: Option<PathBuf>,
    /// Base URL used when a library declares no download source.
    pub library_repo: String,
    /// Whether a native archive that fails to extract aborts the
    /// launch. `false` tolerates archives that were skipped as
    /// incompatible with the current architecture anyway.
    pub strict_natives: bool,
}

impl LauncherConfig {
    /// Config rooted at the system config dir (`~/.config/Craftbox` etc).
    ///
    /// # Errors
    /// - if the config dir is not found
    /// - if the launcher directory could not be created
    pub fn from_system_dirs() -> Result<Self, IoError> {
        Ok(Self::new(file_utils::get_launcher_dir()?))
    }

    #[must_use]
    pub fn new(launcher_dir: PathBuf) -> Self {
        Self {
            launcher_dir,
            platform: Platform::current(),
            java_override: None,
            library_repo: DEFAULT_LIBRARY_REPO.to_owned(),
            strict_natives: true,
        }
    }

    #[must_use]
    pub fn libraries_dir(&self) -> PathBuf {
        self.launcher_dir.join("libraries")
    }

    #[must_use]
    pub fn versions_dir(&self) -> PathBuf {
        self.launcher_dir.join("versions")
    }

    #[must_use]
    pub fn version_json_path(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id).join(format!("{id}.json"))
    }

    #[must_use]
    pub fn client_jar_path(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id).join(format!("{id}.jar"))
    }

    /// Creates the directory skeleton under the launcher root.
    ///
    /// # Errors
    /// Returns an error if a directory could not be created.
    pub async fn create_directories(&self) -> Result<(), IoError> {
        for dir in [self.libraries_dir(), self.versions_dir()] {
            tokio::fs::create_dir_all(&dir).await.path(dir)?;
        }
        Ok(())
    }
}

/// A launchable installation: where the instance lives on disk
/// and which version id it runs.
#[derive(Debug, Clone)]
pub struct Instance {
    pub dir: PathBuf,
    pub version_id: String,
}

impl Instance {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, version_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            version_id: version_id.into(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

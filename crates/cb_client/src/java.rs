//! Finds the java runtime executable the game process will run on.

use std::path::PathBuf;

use cb_core::info;

use crate::{config::LauncherConfig, launch::error::GameLaunchError};

#[cfg(target_os = "windows")]
const JAVA_EXE: &str = "java.exe";
#[cfg(not(target_os = "windows"))]
const JAVA_EXE: &str = "java";

/// Resolution order: configured override, `$JAVA_HOME/bin`, then the
/// first hit on `$PATH`. Fails before any process is spawned if none
/// of those yields an executable.
///
/// # Errors
/// Returns [`GameLaunchError::JavaNotFound`] if no java executable
/// could be located.
pub fn find_java(config: &LauncherConfig) -> Result<PathBuf, GameLaunchError> {
    if let Some(java_override) = &config.java_override {
        if !java_override.as_os_str().is_empty() {
            return Ok(java_override.clone());
        }
    }

    if let Some(java_home) = std::env::var_os("JAVA_HOME") {
        let candidate = PathBuf::from(java_home).join("bin").join(JAVA_EXE);
        if candidate.is_file() {
            info!("Java (from JAVA_HOME): {candidate:?}");
            return Ok(candidate);
        }
    }

    if let Some(path) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path) {
            let candidate = dir.join(JAVA_EXE);
            if candidate.is_file() {
                info!("Java (from PATH): {candidate:?}");
                return Ok(candidate);
            }
        }
    }

    Err(GameLaunchError::JavaNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_without_existence_check() {
        let mut config = LauncherConfig::new(PathBuf::from("/launcher"));
        config.java_override = Some(PathBuf::from("/custom/jdk/bin/java"));
        assert_eq!(
            find_java(&config).unwrap(),
            PathBuf::from("/custom/jdk/bin/java")
        );
    }

    #[test]
    fn empty_override_is_ignored() {
        let mut config = LauncherConfig::new(PathBuf::from("/launcher"));
        config.java_override = Some(PathBuf::new());
        // Whatever the environment yields, the empty override must
        // not be returned as-is.
        if let Ok(found) = find_java(&config) {
            assert!(!found.as_os_str().is_empty());
        }
    }
}

//! The launch pipeline: resolve descriptor, download libraries,
//! extract natives, build the command, spawn the game.

pub(crate) mod args;
mod command;
pub(crate) mod error;

pub use args::{ArgParseError, LaunchArgs};
pub use command::CommandBuilder;
pub use error::GameLaunchError;

use std::{path::Path, process::ExitStatus, sync::mpsc::Sender};

use cb_core::{info, DownloadProgress};
use tokio::process::{Child, Command};

use crate::{
    config::{Instance, LauncherConfig},
    download::{DownloadError, LibraryDownloader},
    java,
    natives::NativesDir,
    resolver::VersionResolver,
};

/// A handle to the spawned game.
///
/// Owns the temporary natives directory: the extracted libraries
/// stay on disk for as long as this handle lives, and are cleaned
/// up when it's dropped.
#[derive(Debug)]
pub struct GameProcess {
    child: Child,
    natives: NativesDir,
}

impl GameProcess {
    /// Waits for the game to exit.
    ///
    /// # Errors
    /// Returns an error if waiting on the child fails.
    pub async fn wait(&mut self) -> Result<ExitStatus, GameLaunchError> {
        self.child.wait().await.map_err(GameLaunchError::CommandError)
    }

    /// Kills the game process.
    ///
    /// # Errors
    /// Returns an error if the process couldn't be killed.
    pub async fn kill(&mut self) -> Result<(), GameLaunchError> {
        self.child.kill().await.map_err(GameLaunchError::CommandError)
    }

    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    #[must_use]
    pub fn natives_dir(&self) -> &Path {
        self.natives.path()
    }
}

/// Launches an instance: the full sequence from version id to a
/// running process.
///
/// Fails fast: nothing is spawned unless every earlier stage
/// (resolution, downloads, extraction, command assembly) succeeded.
/// Progress events go to `sender` if one is given.
///
/// # Errors
/// See [`GameLaunchError`]; library download failures arrive as one
/// aggregate error listing every failed library.
pub async fn launch(
    config: &LauncherConfig,
    instance: &Instance,
    launch_args: &LaunchArgs,
    sender: Option<Sender<DownloadProgress>>,
) -> Result<GameProcess, GameLaunchError> {
    if !instance.dir.is_dir() {
        return Err(GameLaunchError::InstanceNotFound(instance.dir.clone()));
    }
    config.create_directories().await?;

    info!("Launching version {}", instance.version_id);

    send_progress(&sender, DownloadProgress::DownloadingVersionJson)?;
    let mut resolver = VersionResolver::new(config);
    let version = resolver.resolve(&instance.version_id).await?;

    let natives = NativesDir::create()?;

    let mut launch_args = launch_args.clone();
    if launch_args.game_dir.is_none() {
        launch_args.game_dir = Some(instance.dir.clone());
    }
    if launch_args.version.is_none() {
        launch_args.version = Some(version.id.clone());
    }

    let downloader = LibraryDownloader::new(
        config,
        natives.path(),
        launch_args.features(),
        sender,
    );
    let mut classpath = downloader.download_all(&version).await?;
    downloader
        .ensure_client_jar(&version, &mut classpath)
        .await?;

    let java = java::find_java(config)?;

    let mut builder = CommandBuilder::new(config);
    let command_line = builder.build(&version, &classpath, natives.path(), &launch_args, &java)?;

    info!("Game command: {:?}\n", censored(&command_line));

    let mut command = Command::new(&command_line[0]);
    command.args(&command_line[1..]).current_dir(&instance.dir);

    let child = command.spawn().map_err(GameLaunchError::CommandError)?;

    Ok(GameProcess { child, natives })
}

fn send_progress(
    sender: &Option<Sender<DownloadProgress>>,
    progress: DownloadProgress,
) -> Result<(), GameLaunchError> {
    if let Some(sender) = sender {
        sender
            .send(progress)
            .map_err(DownloadError::SendProgress)?;
    }
    Ok(())
}

/// Redacts the values of credential-bearing flags for logging.
fn censored(command: &[String]) -> Vec<String> {
    const SECRET_FLAGS: &[&str] = &["--accessToken", "--uuid", "--clientId", "--xuid"];

    let mut output = command.to_vec();
    let mut redact_next = false;
    for entry in &mut output {
        if redact_next {
            "[REDACTED]".clone_into(entry);
            redact_next = false;
        } else if SECRET_FLAGS.contains(&entry.as_str()) {
            redact_next = true;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_version(config: &LauncherConfig, id: &str, json: &str) {
        let dir = config.versions_dir().join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{id}.json")), json).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn launch_spawns_process_and_cleans_up_natives() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LauncherConfig::new(dir.path().join("root"));
        // Stands in for a java runtime: accepts any argv, exits 0.
        config.java_override = Some(PathBuf::from("/bin/echo"));

        let instance_dir = dir.path().join("instance");
        std::fs::create_dir_all(&instance_dir).unwrap();

        std::fs::create_dir_all(config.versions_dir()).unwrap();
        write_version(
            &config,
            "e2e",
            r#"{ "id": "e2e", "mainClass": "net.example.Main", "libraries": [] }"#,
        );

        let instance = Instance::new(&instance_dir, "e2e");
        let mut process = launch(&config, &instance, &LaunchArgs::default(), None)
            .await
            .unwrap();

        let natives_dir = process.natives_dir().to_path_buf();
        assert!(natives_dir.is_dir());

        let status = process.wait().await.unwrap();
        assert!(status.success());

        drop(process);
        assert!(!natives_dir.exists(), "natives dir removed with the handle");
    }

    #[tokio::test]
    async fn missing_instance_dir_fails_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let config = LauncherConfig::new(dir.path().join("root"));
        let instance = Instance::new(dir.path().join("nope"), "e2e");

        let err = launch(&config, &instance, &LaunchArgs::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GameLaunchError::InstanceNotFound(_)));
    }

    #[test]
    fn censoring_hides_credential_values() {
        let command: Vec<String> = [
            "java",
            "--username",
            "Steve",
            "--accessToken",
            "secret-token",
            "--uuid",
            "123",
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();

        let censored = censored(&command);
        assert!(!censored.contains(&"secret-token".to_owned()));
        assert!(!censored.contains(&"123".to_owned()));
        assert!(censored.contains(&"Steve".to_owned()));
    }
}

//! Assembles the argv for the game process: java executable, JVM
//! arguments, main class, game arguments. Conditional entries
//! are rule-gated; `${}` placeholder tokens are substituted.

use std::{collections::BTreeMap, path::Path, path::PathBuf};

use cb_core::{
    json::version::{Argument, ArgumentValue, VersionDetails},
    CLASSPATH_SEPARATOR, LAUNCHER_NAME, LAUNCHER_VERSION_NAME,
};

use crate::{
    config::LauncherConfig,
    launch::{args::LaunchArgs, error::GameLaunchError},
    rules::{self, FeatureFlags},
};

pub struct CommandBuilder<'a> {
    config: &'a LauncherConfig,
    placeholders: BTreeMap<String, String>,
}

impl<'a> CommandBuilder<'a> {
    #[must_use]
    pub fn new(config: &'a LauncherConfig) -> Self {
        Self {
            config,
            placeholders: BTreeMap::new(),
        }
    }

    /// Builds the full command line:
    /// java executable, JVM arguments, main class, game arguments.
    ///
    /// # Errors
    /// - `MainClassMissing` when the resolved descriptor has no main class
    /// - `PathBufToString` when a path isn't valid UTF-8
    pub fn build(
        &mut self,
        version: &VersionDetails,
        classpath: &[PathBuf],
        natives_dir: &Path,
        launch_args: &LaunchArgs,
        java: &Path,
    ) -> Result<Vec<String>, GameLaunchError> {
        self.build_placeholders(version, classpath, natives_dir, launch_args)?;
        let features = launch_args.features();

        let mut command = vec![path_to_string(java)?];

        if let Some(jvm) = version.arguments.as_ref().and_then(|a| a.jvm.as_ref()) {
            command.extend(self.process_arguments(jvm, &features));
        } else {
            // Old descriptors have no jvm argument template; the
            // launcher supplies the natives path and classpath itself.
            command.push(format!(
                "-Djava.library.path={}",
                path_to_string(natives_dir)?
            ));
            command.push("-cp".to_owned());
            command.push(self.placeholders["classpath"].clone());
        }

        command.push(
            version
                .mainClass
                .clone()
                .ok_or_else(|| GameLaunchError::MainClassMissing(version.id.clone()))?,
        );

        if let Some(game) = version.arguments.as_ref().and_then(|a| a.game.as_ref()) {
            command.extend(self.process_arguments(game, &features));
        } else if let Some(arguments) = &version.minecraftArguments {
            command.extend(arguments.split(' ').map(|arg| self.substitute(arg)));
        }

        Ok(command)
    }

    /// Walks an argument template: literal entries pass through,
    /// conditional entries are included only when their rules admit
    /// the environment. Substitution applies to everything kept.
    fn process_arguments(&self, arguments: &[Argument], features: &FeatureFlags) -> Vec<String> {
        let mut output = Vec::new();
        for argument in arguments {
            match argument {
                Argument::Plain(value) => output.push(self.substitute(value)),
                Argument::Conditional { rules, value } => {
                    if !rules::admits(rules, &self.config.platform, features) {
                        continue;
                    }
                    match value {
                        ArgumentValue::Single(value) => output.push(self.substitute(value)),
                        ArgumentValue::Many(values) => {
                            output.extend(values.iter().map(|v| self.substitute(v)));
                        }
                    }
                }
            }
        }
        output
    }

    /// Replaces `${name}` tokens from the placeholder map.
    /// Unknown names stay as-is; argument templates reference more
    /// placeholders than any one launcher provides.
    fn substitute(&self, input: &str) -> String {
        if !input.contains("${") {
            return input.to_owned();
        }

        let mut output = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(start) = rest.find("${") {
            output.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                output.push_str(&rest[start..]);
                rest = "";
                break;
            };

            let name = &after[..end];
            if let Some(value) = self.placeholders.get(name) {
                output.push_str(value);
            } else {
                output.push_str("${");
                output.push_str(name);
                output.push('}');
            }
            rest = &after[end + 1..];
        }
        output.push_str(rest);
        output
    }

    fn build_placeholders(
        &mut self,
        version: &VersionDetails,
        classpath: &[PathBuf],
        natives_dir: &Path,
        launch_args: &LaunchArgs,
    ) -> Result<(), GameLaunchError> {
        self.placeholders.clear();

        let mut set = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                self.placeholders.insert(key.to_owned(), value);
            }
        };

        set("auth_player_name", launch_args.username.clone());
        set(
            "version_name",
            launch_args
                .version
                .clone()
                .or_else(|| Some(version.id.clone())),
        );
        set(
            "game_directory",
            opt_path_to_string(launch_args.game_dir.as_deref())?,
        );
        set(
            "assets_root",
            opt_path_to_string(launch_args.assets_dir.as_deref())?,
        );
        set(
            "game_assets",
            opt_path_to_string(launch_args.assets_dir.as_deref())?,
        );
        set("assets_index_name", launch_args.asset_index.clone());
        set("auth_uuid", launch_args.uuid.clone());
        set("uuid", launch_args.uuid.clone());
        set("auth_access_token", launch_args.access_token.clone());
        set("auth_session", launch_args.access_token.clone());
        set("accessToken", launch_args.access_token.clone());
        set("clientid", launch_args.client_id.clone());
        set("auth_xuid", launch_args.xuid.clone());
        set("user_type", launch_args.user_type.clone());
        set(
            "version_type",
            launch_args
                .version_type
                .clone()
                .or_else(|| version.r#type.clone()),
        );
        set("user_properties", Some("{}".to_owned()));
        set(
            "resolution_width",
            launch_args.width.map(|n| n.to_string()),
        );
        set(
            "resolution_height",
            launch_args.height.map(|n| n.to_string()),
        );
        set("quickPlayPath", launch_args.quick_play_path.clone());
        set(
            "quickPlaySingleplayer",
            launch_args.quick_play_singleplayer.clone(),
        );
        set(
            "quickPlayMultiplayer",
            launch_args.quick_play_multiplayer.clone(),
        );
        set("quickPlayRealms", launch_args.quick_play_realms.clone());

        set("launcher_name", Some(LAUNCHER_NAME.to_owned()));
        set("launcher_version", Some(LAUNCHER_VERSION_NAME.to_owned()));
        set("natives_directory", Some(path_to_string(natives_dir)?));
        set(
            "classpath_separator",
            Some(CLASSPATH_SEPARATOR.to_string()),
        );
        set(
            "library_directory",
            Some(path_to_string(&self.config.libraries_dir())?),
        );
        set("classpath", Some(build_classpath_string(classpath)?));

        Ok(())
    }
}

fn build_classpath_string(classpath: &[PathBuf]) -> Result<String, GameLaunchError> {
    let mut entries = Vec::with_capacity(classpath.len());
    for path in classpath {
        entries.push(path_to_string(path)?);
    }
    Ok(entries.join(&CLASSPATH_SEPARATOR.to_string()))
}

fn path_to_string(path: &Path) -> Result<String, GameLaunchError> {
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| GameLaunchError::PathBufToString(path.to_owned()))
}

fn opt_path_to_string(path: Option<&Path>) -> Result<Option<String>, GameLaunchError> {
    path.map(path_to_string).transpose()
}

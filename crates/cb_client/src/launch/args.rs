//! The flat set of launch parameters handed in by the caller
//! (GUI, server-join flow, or the debug CLI), plus the feature
//! flags derived from them.

use std::path::PathBuf;

use thiserror::Error;

use crate::rules::FeatureFlags;

#[derive(Debug, Error)]
pub enum ArgParseError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid integer for {key}: {value}")]
    InvalidInteger { key: String, value: String },
}

/// Launch parameters. Built once per launch, read-only afterwards;
/// unset fields leave their `${placeholder}` tokens untouched in the
/// built command.
#[derive(Debug, Clone, Default)]
pub struct LaunchArgs {
    pub username: Option<String>,
    pub version: Option<String>,
    pub game_dir: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub asset_index: Option<String>,
    pub uuid: Option<String>,
    pub access_token: Option<String>,
    pub client_id: Option<String>,
    pub xuid: Option<String>,
    pub user_type: Option<String>,
    pub version_type: Option<String>,
    pub demo: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quick_play_path: Option<String>,
    pub quick_play_singleplayer: Option<String>,
    pub quick_play_multiplayer: Option<String>,
    pub quick_play_realms: Option<String>,
}

impl LaunchArgs {
    /// Parses `--key value` pairs in the style the game itself takes
    /// them. Unknown keys are ignored (forward compatibility with
    /// newer argument templates).
    ///
    /// # Errors
    /// Returns an error on a key with a missing or malformed value.
    pub fn parse(args: &[String]) -> Result<Self, ArgParseError> {
        let mut parsed = LaunchArgs::default();

        let mut iter = args.iter();
        while let Some(key) = iter.next() {
            let mut next = || {
                iter.next()
                    .cloned()
                    .ok_or_else(|| ArgParseError::MissingValue(key.clone()))
            };

            match key.as_str() {
                "--username" => parsed.username = Some(next()?),
                "--version" => parsed.version = Some(next()?),
                "--gameDir" => parsed.game_dir = Some(PathBuf::from(next()?)),
                "--assetsDir" => parsed.assets_dir = Some(PathBuf::from(next()?)),
                "--assetIndex" => parsed.asset_index = Some(next()?),
                "--uuid" => parsed.uuid = Some(next()?),
                "--accessToken" => parsed.access_token = Some(next()?),
                "--clientId" => parsed.client_id = Some(next()?),
                "--xuid" => parsed.xuid = Some(next()?),
                "--userType" => parsed.user_type = Some(next()?),
                "--versionType" => parsed.version_type = Some(next()?),

                "--demo" => parsed.demo = true,

                "--width" => parsed.width = Some(parse_int(key, &next()?)?),
                "--height" => parsed.height = Some(parse_int(key, &next()?)?),

                "--quickPlayPath" => parsed.quick_play_path = Some(next()?),
                "--quickPlaySingleplayer" => parsed.quick_play_singleplayer = Some(next()?),
                "--quickPlayMultiplayer" => parsed.quick_play_multiplayer = Some(next()?),
                "--quickPlayRealms" => parsed.quick_play_realms = Some(next()?),

                _ => {}
            }
        }

        Ok(parsed)
    }

    /// The feature flags rule conditions can ask about.
    #[must_use]
    pub fn features(&self) -> FeatureFlags {
        FeatureFlags {
            is_demo_user: self.demo,
            has_custom_resolution: self.width.is_some() && self.height.is_some(),
            has_quick_plays_support: self.quick_play_path.is_some(),
            is_quick_play_singleplayer: self.quick_play_singleplayer.is_some(),
            is_quick_play_multiplayer: self.quick_play_multiplayer.is_some(),
            is_quick_play_realms: self.quick_play_realms.is_some(),
        }
    }
}

fn parse_int(key: &str, value: &str) -> Result<u32, ArgParseError> {
    value.parse().map_err(|_| ArgParseError::InvalidInteger {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn parses_known_flags() {
        let parsed = LaunchArgs::parse(&args(&[
            "--username",
            "Steve",
            "--version",
            "1.20.1",
            "--width",
            "1280",
            "--height",
            "720",
            "--demo",
            "--unknownFlag",
        ]))
        .unwrap();

        assert_eq!(parsed.username.as_deref(), Some("Steve"));
        assert_eq!(parsed.version.as_deref(), Some("1.20.1"));
        assert_eq!(parsed.width, Some(1280));
        assert!(parsed.demo);
    }

    #[test]
    fn missing_value_errors() {
        let err = LaunchArgs::parse(&args(&["--username"])).unwrap_err();
        assert!(matches!(err, ArgParseError::MissingValue(_)));
    }

    #[test]
    fn bad_integer_errors() {
        let err = LaunchArgs::parse(&args(&["--width", "wide"])).unwrap_err();
        assert!(matches!(err, ArgParseError::InvalidInteger { .. }));
    }

    #[test]
    fn feature_flags_derivation() {
        let mut parsed = LaunchArgs::parse(&args(&["--demo"])).unwrap();
        let features = parsed.features();
        assert!(features.is_demo_user);
        assert!(!features.has_custom_resolution);

        parsed.width = Some(800);
        assert!(!parsed.features().has_custom_resolution, "needs both axes");
        parsed.height = Some(600);
        assert!(parsed.features().has_custom_resolution);

        parsed.quick_play_multiplayer = Some("play.example.net".to_owned());
        assert!(parsed.features().is_quick_play_multiplayer);
        assert!(!parsed.features().is_quick_play_realms);
    }
}

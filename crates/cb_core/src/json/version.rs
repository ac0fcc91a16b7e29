use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A client version descriptor (`versions/<id>/<id>.json`).
///
/// Descriptors may be partial: anything carrying `inheritsFrom`
/// only declares what it adds or overrides on top of its parent.
/// [`VersionDetails::merged`] combines the two into a complete
/// descriptor; most optional fields only become mandatory after
/// the inheritance chain has been resolved.
#[allow(non_snake_case)]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VersionDetails {
    /// Name of the version.
    pub id: String,
    /// Parent version this descriptor extends, if any.
    pub inheritsFrom: Option<String>,
    /// Which is the main class in the jar that has the main function.
    pub mainClass: Option<String>,
    /// The list of command line arguments.
    ///
    /// Used in new versions, compared to minecraftArguments used in old versions.
    pub arguments: Option<Arguments>,
    /// The list of command line arguments as one space-separated string.
    ///
    /// Used in old versions, compared to arguments used in new versions.
    pub minecraftArguments: Option<String>,
    /// Library dependencies of the version that need to be downloaded.
    #[serde(default)]
    pub libraries: Vec<Library>,
    /// Where to download the client jar.
    pub downloads: Option<Downloads>,
    /// Which version of the assets to be downloaded.
    pub assets: Option<String>,
    /// An index/list of assets (music/sounds) to be downloaded.
    pub assetIndex: Option<AssetIndex>,
    /// Version of java required.
    pub javaVersion: Option<JavaVersion>,
    /// Type of version, such as alpha, beta or release.
    pub r#type: Option<String>,
    pub releaseTime: Option<String>,
}

impl VersionDetails {
    /// Merges a parent descriptor with a child that inherits from it,
    /// producing a new complete descriptor. Neither input is mutated.
    ///
    /// - Scalar/object fields: the child's value wins when present.
    /// - `libraries`: parent's list followed by the child's list.
    ///   Duplicate coordinates are expected and kept; later entries
    ///   may be more specific.
    /// - `arguments`: concatenated per argument type (jvm, game);
    ///   a type present on only one side passes through unchanged.
    ///
    /// The result no longer references a parent.
    #[must_use]
    pub fn merged(parent: VersionDetails, child: VersionDetails) -> VersionDetails {
        let mut libraries = parent.libraries;
        libraries.extend(child.libraries);

        let arguments = match (parent.arguments, child.arguments) {
            (Some(parent), Some(child)) => Some(Arguments {
                jvm: concat_args(parent.jvm, child.jvm),
                game: concat_args(parent.game, child.game),
            }),
            (parent, child) => child.or(parent),
        };

        VersionDetails {
            id: child.id,
            inheritsFrom: None,
            mainClass: child.mainClass.or(parent.mainClass),
            arguments,
            minecraftArguments: child.minecraftArguments.or(parent.minecraftArguments),
            libraries,
            downloads: child.downloads.or(parent.downloads),
            assets: child.assets.or(parent.assets),
            assetIndex: child.assetIndex.or(parent.assetIndex),
            javaVersion: child.javaVersion.or(parent.javaVersion),
            r#type: child.r#type.or(parent.r#type),
            releaseTime: child.releaseTime.or(parent.releaseTime),
        }
    }
}

fn concat_args(
    parent: Option<Vec<Argument>>,
    child: Option<Vec<Argument>>,
) -> Option<Vec<Argument>> {
    match (parent, child) {
        (Some(mut parent), Some(child)) => {
            parent.extend(child);
            Some(parent)
        }
        (parent, child) => child.or(parent),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Arguments {
    pub jvm: Option<Vec<Argument>>,
    pub game: Option<Vec<Argument>>,
}

/// One entry of `arguments.jvm` / `arguments.game`: either a literal
/// string or a conditional `{ rules, value }` object.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Argument {
    Plain(String),
    Conditional {
        rules: Vec<Rule>,
        value: ArgumentValue,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ArgumentValue {
    Single(String),
    Many(Vec<String>),
}

#[allow(non_snake_case)]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AssetIndex {
    pub id: String,
    pub url: String,
    pub sha1: Option<String>,
    pub size: Option<u64>,
    pub totalSize: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Downloads {
    pub client: Download,
    pub server: Option<Download>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Download {
    pub url: String,
    pub sha1: Option<String>,
    pub size: Option<u64>,
}

#[allow(non_snake_case)]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JavaVersion {
    pub component: Option<String>,
    pub majorVersion: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Library {
    /// Maven-style coordinate: `group:artifact:version[:classifier]`.
    pub name: Option<String>,
    /// Alternate repository base to derive the download URL from.
    pub url: Option<String>,
    pub downloads: Option<LibraryDownloads>,
    pub rules: Option<Vec<Rule>>,
    /// Legacy map of os name -> natives classifier key.
    pub natives: Option<BTreeMap<String, String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LibraryDownloads {
    pub artifact: Option<LibraryArtifact>,
    pub classifiers: Option<BTreeMap<String, LibraryArtifact>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LibraryArtifact {
    pub path: Option<String>,
    pub url: Option<String>,
    pub sha1: Option<String>,
    pub size: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Rule {
    pub action: RuleAction,
    pub os: Option<RuleOs>,
    pub features: Option<BTreeMap<String, bool>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RuleOs {
    pub name: Option<String>,
    pub arch: Option<String>,
    /// Regex over the OS version. Parsed but not evaluated.
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib(name: &str) -> Library {
        Library {
            name: Some(name.to_owned()),
            url: None,
            downloads: None,
            rules: None,
            natives: None,
        }
    }

    fn descriptor(id: &str, libs: Vec<Library>, game: Option<Vec<Argument>>) -> VersionDetails {
        VersionDetails {
            id: id.to_owned(),
            inheritsFrom: None,
            mainClass: None,
            arguments: game.map(|game| Arguments {
                jvm: None,
                game: Some(game),
            }),
            minecraftArguments: None,
            libraries: libs,
            downloads: None,
            assets: None,
            assetIndex: None,
            javaVersion: None,
            r#type: None,
            releaseTime: None,
        }
    }

    #[test]
    fn merge_concatenates_libraries_and_arguments() {
        let mut parent = descriptor(
            "1.20.1",
            vec![lib("a:a:1"), lib("b:b:1")],
            Some(vec![Argument::Plain("g1".to_owned())]),
        );
        parent.mainClass = Some("net.example.Main".to_owned());

        let child = descriptor(
            "loader-1.20.1",
            vec![lib("c:c:1")],
            Some(vec![Argument::Plain("g2".to_owned())]),
        );

        let merged = VersionDetails::merged(parent, child);

        assert_eq!(merged.id, "loader-1.20.1");
        assert_eq!(merged.inheritsFrom, None);
        assert_eq!(merged.mainClass.as_deref(), Some("net.example.Main"));

        let names: Vec<_> = merged
            .libraries
            .iter()
            .map(|l| l.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, ["a:a:1", "b:b:1", "c:c:1"]);

        let game = merged.arguments.unwrap().game.unwrap();
        let game: Vec<_> = game
            .iter()
            .map(|a| match a {
                Argument::Plain(s) => s.as_str(),
                Argument::Conditional { .. } => panic!("expected plain args"),
            })
            .collect();
        assert_eq!(game, ["g1", "g2"]);
    }

    #[test]
    fn merge_child_scalar_wins() {
        let mut parent = descriptor("base", vec![], None);
        parent.mainClass = Some("base.Main".to_owned());
        parent.assets = Some("5".to_owned());

        let mut child = descriptor("mod", vec![], None);
        child.mainClass = Some("mod.Main".to_owned());

        let merged = VersionDetails::merged(parent, child);
        assert_eq!(merged.mainClass.as_deref(), Some("mod.Main"));
        // Absent on the child, inherited from the parent.
        assert_eq!(merged.assets.as_deref(), Some("5"));
    }

    #[test]
    fn merge_argument_type_on_one_side_passes_through() {
        let mut parent = descriptor("base", vec![], None);
        parent.arguments = Some(Arguments {
            jvm: Some(vec![Argument::Plain("-Xss1M".to_owned())]),
            game: None,
        });
        let child = descriptor("mod", vec![], Some(vec![Argument::Plain("--demo".to_owned())]));

        let merged = VersionDetails::merged(parent, child);
        let arguments = merged.arguments.unwrap();
        assert_eq!(arguments.jvm.unwrap().len(), 1);
        assert_eq!(arguments.game.unwrap().len(), 1);
    }

    #[test]
    fn argument_entries_deserialize_both_shapes() {
        let json = r#"[
            "--username",
            { "rules": [ { "action": "allow", "features": { "is_demo_user": true } } ],
              "value": "--demo" },
            { "rules": [ { "action": "allow", "os": { "name": "osx" } } ],
              "value": ["-XstartOnFirstThread", "-Dcb.test=1"] }
        ]"#;
        let args: Vec<Argument> = serde_json::from_str(json).unwrap();
        assert!(matches!(&args[0], Argument::Plain(s) if s == "--username"));
        assert!(matches!(
            &args[1],
            Argument::Conditional {
                value: ArgumentValue::Single(_),
                ..
            }
        ));
        assert!(matches!(
            &args[2],
            Argument::Conditional {
                value: ArgumentValue::Many(v),
                ..
            } if v.len() == 2
        ));
    }

    #[test]
    fn partial_descriptor_deserializes() {
        let json = r#"{
            "id": "loader-1.20.1",
            "inheritsFrom": "1.20.1",
            "mainClass": "net.loader.Main",
            "libraries": [ { "name": "net.loader:loader:0.15" } ]
        }"#;
        let details: VersionDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.inheritsFrom.as_deref(), Some("1.20.1"));
        assert!(details.arguments.is_none());
        assert_eq!(details.libraries.len(), 1);
    }
}

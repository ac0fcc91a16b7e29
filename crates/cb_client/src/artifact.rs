//! Maps a library declaration to the file it lives at locally
//! and the URL it can be fetched from.

use std::path::{Path, PathBuf};

use cb_core::{
    json::version::{Library, LibraryArtifact},
    Arch, OsName, Platform,
};

/// A library declaration resolved against a platform: where the
/// artifact goes on disk, where it comes from, and what it should
/// hash to.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub path: PathBuf,
    pub url: String,
    pub sha1: Option<String>,
    pub size: Option<u64>,
    /// Native artifacts are extracted, never put on the classpath.
    pub is_native: bool,
}

/// A library is native when its coordinate embeds a `natives-`
/// classifier, when it declares per-OS classifier downloads, or when
/// it carries the legacy `natives` map.
#[must_use]
pub fn is_native_library(library: &Library) -> bool {
    if let Some(name) = &library.name {
        if name.contains(":natives-") {
            return true;
        }
    }
    if let Some(downloads) = &library.downloads {
        if downloads.classifiers.is_some() {
            return true;
        }
    }
    library.natives.is_some()
}

/// Classifier keys to try for the platform, most specific first.
/// Unqualified `natives-windows` is x86-64 by convention; `natives-osx`
/// is the legacy spelling of `natives-macos`.
#[must_use]
pub fn native_classifier_candidates(platform: &Platform) -> Vec<&'static str> {
    match platform.os {
        OsName::Windows => match platform.arch {
            Arch::Arm64 => vec!["natives-windows-arm64"],
            Arch::X86 => vec!["natives-windows-x86"],
            Arch::X86_64 => vec!["natives-windows"],
        },
        OsName::MacOs => match platform.arch {
            Arch::Arm64 => vec!["natives-macos-arm64", "natives-macos", "natives-osx"],
            _ => vec!["natives-macos", "natives-osx"],
        },
        OsName::Linux | OsName::FreeBsd => vec!["natives-linux"],
    }
}

/// Resolves a library to a concrete artifact, or `None` when the
/// declaration carries nothing resolvable (no artifact node and no
/// usable coordinate).
#[must_use]
pub fn resolve_library(
    library: &Library,
    platform: &Platform,
    libraries_dir: &Path,
    default_repo: &str,
) -> Option<ResolvedArtifact> {
    let is_native = is_native_library(library);

    let node = artifact_node(library, platform, is_native);

    let relative_path = node
        .and_then(|n| n.path.clone())
        .or_else(|| node.and_then(|n| n.url.as_deref().and_then(repo_relative_path)))
        .or_else(|| path_from_coordinate(library.name.as_deref()?))?;

    let url = node
        .and_then(|n| n.url.clone())
        .or_else(|| {
            library.url.as_ref().map(|base| {
                let mut base = base.clone();
                if !base.ends_with('/') {
                    base.push('/');
                }
                format!("{base}{relative_path}")
            })
        })
        .unwrap_or_else(|| format!("{default_repo}{relative_path}"));

    Some(ResolvedArtifact {
        path: libraries_dir.join(&relative_path),
        url,
        sha1: node.and_then(|n| n.sha1.clone()),
        size: node.and_then(|n| n.size),
        is_native,
    })
}

/// Picks the artifact node to download: the matching platform
/// classifier for natives, otherwise the plain artifact.
fn artifact_node<'a>(
    library: &'a Library,
    platform: &Platform,
    is_native: bool,
) -> Option<&'a LibraryArtifact> {
    let downloads = library.downloads.as_ref();

    if is_native {
        if let Some(classifiers) = downloads.and_then(|d| d.classifiers.as_ref()) {
            for key in native_classifier_candidates(platform) {
                if let Some(node) = classifiers.get(key) {
                    return Some(node);
                }
            }
            // Legacy descriptors name the classifier key in the
            // `natives` map, sometimes with an ${arch} token.
            if let Some(key) = legacy_natives_key(library, platform) {
                if let Some(node) = classifiers.get(&key) {
                    return Some(node);
                }
            }
        }
    }

    downloads.and_then(|d| d.artifact.as_ref())
}

fn legacy_natives_key(library: &Library, platform: &Platform) -> Option<String> {
    let key = library.natives.as_ref()?.get(platform.os.rule_name())?;
    let bits = if platform.arch.is_64_bit() { "64" } else { "32" };
    Some(key.replace("${arch}", bits))
}

/// `group:artifact:version[:classifier]` ->
/// `group/with/slashes/artifact/version/artifact-version[-classifier].jar`
#[must_use]
pub fn path_from_coordinate(name: &str) -> Option<String> {
    let mut parts = name.split(':');
    let group = parts.next()?;
    let artifact = parts.next()?;
    let version = parts.next()?;
    let classifier = parts
        .next()
        .map(|c| format!("-{c}"))
        .unwrap_or_default();

    Some(format!(
        "{}/{artifact}/{version}/{artifact}-{version}{classifier}.jar",
        group.replace('.', "/")
    ))
}

/// Extracts the repository-relative path out of a full artifact URL,
/// e.g. `https://repo.example/maven/a/b/c.jar` -> `maven/a/b/c.jar`.
fn repo_relative_path(url: &str) -> Option<String> {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let (_, path) = after_scheme.split_once('/')?;
    if path.is_empty() {
        None
    } else {
        Some(path.to_owned())
    }
}

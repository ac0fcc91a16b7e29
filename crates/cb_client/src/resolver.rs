//! Loads version descriptors by id, pulling missing ones from the
//! version manifest and flattening `inheritsFrom` chains.

use std::{collections::HashMap, path::PathBuf};

use cb_core::{
    file_utils, info,
    json::{Manifest, VersionDetails},
    IntoIoError,
};

use crate::{config::LauncherConfig, download::DownloadError};

pub const MANIFEST_FILE_NAME: &str = "version_manifest_v2.json";

/// Resolves version ids to complete descriptors.
///
/// Holds a per-resolver cache keyed by id, so a parent shared by
/// several children in one launch is only loaded once. Descriptors
/// handed out are fully resolved: they never reference an
/// unresolved parent.
pub struct VersionResolver {
    versions_dir: PathBuf,
    cache: HashMap<String, VersionDetails>,
    resolving: Vec<String>,
}

impl VersionResolver {
    #[must_use]
    pub fn new(config: &LauncherConfig) -> Self {
        Self {
            versions_dir: config.versions_dir(),
            cache: HashMap::new(),
            resolving: Vec::new(),
        }
    }

    /// Resolves `id` into a complete descriptor, merging the whole
    /// inheritance chain (parent first, child overrides).
    ///
    /// # Errors
    /// - `DescriptorNotFound` if there's neither a local file nor a
    ///   manifest entry for the id (or a parent id)
    /// - `ManifestNotFound` if a manifest lookup was needed but no
    ///   manifest exists
    /// - network/filesystem/JSON errors while fetching or loading
    pub async fn resolve(&mut self, id: &str) -> Result<VersionDetails, DownloadError> {
        if let Some(hit) = self.cache.get(id) {
            return Ok(hit.clone());
        }
        if self.resolving.iter().any(|n| n == id) {
            return Err(DownloadError::InheritanceLoop(id.to_owned()));
        }

        self.resolving.push(id.to_owned());
        let result: Result<VersionDetails, DownloadError> = async {
            let raw = self.load_raw(id).await?;

            Ok(if let Some(parent_id) = raw.inheritsFrom.clone() {
                info!("Version {id} inherits from {parent_id}");
                let parent = Box::pin(self.resolve(&parent_id)).await?;
                VersionDetails::merged(parent, raw)
            } else {
                raw
            })
        }
        .await;
        self.resolving.pop();

        let resolved = result?;
        self.cache.insert(id.to_owned(), resolved.clone());
        Ok(resolved)
    }

    /// Loads a single descriptor without touching its parents:
    /// local file first, else fetched via the manifest to the
    /// expected local path.
    async fn load_raw(&self, id: &str) -> Result<VersionDetails, DownloadError> {
        let json_path = self.versions_dir.join(id).join(format!("{id}.json"));

        if !json_path.exists() {
            let url = self.manifest_url(id)?;
            info!("Downloading version JSON for {id}");
            file_utils::download_file_to_path(&url, &json_path).await?;
        }

        let text = tokio::fs::read_to_string(&json_path)
            .await
            .path(&json_path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn manifest_url(&self, id: &str) -> Result<String, DownloadError> {
        let manifest_path = self.versions_dir.join(MANIFEST_FILE_NAME);
        let Ok(text) = std::fs::read_to_string(&manifest_path) else {
            return Err(DownloadError::ManifestNotFound(manifest_path));
        };
        let manifest: Manifest = serde_json::from_str(&text)?;

        match manifest.find_name(id) {
            Some(version) => Ok(version.url.clone()),
            None => Err(descriptor_not_found(id)),
        }
    }
}

/// The not-found error, with a hint when the id looks like a
/// mod-loader profile whose descriptor only an installer would have
/// written. Callers surface the hint in their remediation UI.
fn descriptor_not_found(id: &str) -> DownloadError {
    let lower = id.to_lowercase();
    let hint = [
        ("neoforge", "NeoForge"),
        ("forge", "Forge"),
        ("fabric", "Fabric"),
        ("quilt", "Quilt"),
        ("optifine", "OptiFine"),
    ]
    .iter()
    .find(|(token, _)| lower.contains(token))
    .map(|(_, loader)| *loader);

    DownloadError::DescriptorNotFound(match hint {
        Some(loader) => {
            format!("{id} (this looks like a {loader} profile; run its installer first)")
        }
        None => id.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_version(versions_dir: &std::path::Path, id: &str, json: &str) {
        let dir = versions_dir.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{id}.json")), json).unwrap();
    }

    fn config_at(dir: &std::path::Path) -> LauncherConfig {
        LauncherConfig::new(dir.to_path_buf())
    }

    #[tokio::test]
    async fn resolves_local_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        write_version(
            &config.versions_dir(),
            "1.20.1",
            r#"{ "id": "1.20.1", "mainClass": "net.example.Main", "libraries": [] }"#,
        );

        let mut resolver = VersionResolver::new(&config);
        let details = resolver.resolve("1.20.1").await.unwrap();
        assert_eq!(details.mainClass.as_deref(), Some("net.example.Main"));
    }

    #[tokio::test]
    async fn resolves_inheritance_chain() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        write_version(
            &config.versions_dir(),
            "1.20.1",
            r#"{ "id": "1.20.1", "mainClass": "net.example.Main",
                 "libraries": [ { "name": "a:a:1" } ],
                 "arguments": { "game": ["base"] } }"#,
        );
        write_version(
            &config.versions_dir(),
            "loader-1.20.1",
            r#"{ "id": "loader-1.20.1", "inheritsFrom": "1.20.1",
                 "mainClass": "net.loader.Main",
                 "libraries": [ { "name": "b:b:2" } ],
                 "arguments": { "game": ["extra"] } }"#,
        );

        let mut resolver = VersionResolver::new(&config);
        let details = resolver.resolve("loader-1.20.1").await.unwrap();

        assert_eq!(details.mainClass.as_deref(), Some("net.loader.Main"));
        assert_eq!(details.inheritsFrom, None);
        assert_eq!(details.libraries.len(), 2);
        assert_eq!(details.libraries[0].name.as_deref(), Some("a:a:1"));
        assert_eq!(details.libraries[1].name.as_deref(), Some("b:b:2"));
        assert_eq!(
            details.arguments.unwrap().game.unwrap().len(),
            2,
            "parent then child game arguments"
        );
    }

    #[tokio::test]
    async fn missing_version_without_manifest_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        std::fs::create_dir_all(config.versions_dir()).unwrap();

        let mut resolver = VersionResolver::new(&config);
        let err = resolver.resolve("1.99").await.unwrap_err();
        assert!(matches!(err, DownloadError::ManifestNotFound(_)));
    }

    #[tokio::test]
    async fn missing_manifest_entry_reports_descriptor_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        std::fs::create_dir_all(config.versions_dir()).unwrap();
        std::fs::write(
            config.versions_dir().join(MANIFEST_FILE_NAME),
            r#"{ "versions": [ { "id": "1.20.1", "url": "https://example.invalid/v.json" } ] }"#,
        )
        .unwrap();

        let mut resolver = VersionResolver::new(&config);
        let err = resolver.resolve("1.99").await.unwrap_err();
        assert!(matches!(err, DownloadError::DescriptorNotFound(_)));
    }

    #[tokio::test]
    async fn loader_profile_hint_in_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        std::fs::create_dir_all(config.versions_dir()).unwrap();
        std::fs::write(
            config.versions_dir().join(MANIFEST_FILE_NAME),
            r#"{ "versions": [] }"#,
        )
        .unwrap();

        let mut resolver = VersionResolver::new(&config);
        let err = resolver
            .resolve("1.20.1-forge-47.2.0")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Forge"), "got: {message}");
    }

    #[tokio::test]
    async fn inheritance_cycle_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        write_version(
            &config.versions_dir(),
            "a",
            r#"{ "id": "a", "inheritsFrom": "b" }"#,
        );
        write_version(
            &config.versions_dir(),
            "b",
            r#"{ "id": "b", "inheritsFrom": "a" }"#,
        );

        let mut resolver = VersionResolver::new(&config);
        let err = resolver.resolve("a").await.unwrap_err();
        assert!(matches!(err, DownloadError::InheritanceLoop(_)));
    }

    #[tokio::test]
    async fn cache_returns_same_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_at(dir.path());
        write_version(
            &config.versions_dir(),
            "1.20.1",
            r#"{ "id": "1.20.1", "mainClass": "net.example.Main" }"#,
        );

        let mut resolver = VersionResolver::new(&config);
        resolver.resolve("1.20.1").await.unwrap();

        // Descriptor file gone; the cache still serves it.
        std::fs::remove_dir_all(config.versions_dir().join("1.20.1")).unwrap();
        let details = resolver.resolve("1.20.1").await.unwrap();
        assert_eq!(details.id, "1.20.1");
    }
}

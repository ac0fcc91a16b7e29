use serde::Deserialize;

/// A version manifest: the list of all known versions
/// and where to download their descriptors from.
#[derive(Deserialize, Clone, Debug)]
pub struct Manifest {
    pub versions: Vec<ManifestVersion>,
}

impl Manifest {
    /// Looks up a version by its name.
    /// This searches for an *exact match*.
    #[must_use]
    pub fn find_name(&self, name: &str) -> Option<&ManifestVersion> {
        self.versions.iter().find(|n| n.id == name)
    }
}

#[allow(non_snake_case)]
#[derive(Deserialize, Clone, Debug)]
pub struct ManifestVersion {
    pub id: String,
    pub url: String,
    pub r#type: Option<String>,
    pub releaseTime: Option<String>,
}

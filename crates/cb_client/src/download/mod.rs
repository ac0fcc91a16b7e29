//! Concurrent download and verification of a resolved version's
//! libraries, plus native extraction scheduling.

mod error;

pub use error::{DownloadError, LibraryFailure, LibraryFailures};

use std::{
    path::{Path, PathBuf},
    sync::{mpsc::Sender, Mutex},
};

use cb_core::{do_jobs, err, file_utils, info, json::VersionDetails, DownloadProgress};

use crate::{
    artifact::{resolve_library, ResolvedArtifact},
    config::LauncherConfig,
    natives,
    rules::{self, FeatureFlags},
};

/// Downloads every admitted library of a descriptor, extracts the
/// native ones, and produces the classpath.
///
/// Classpath order is fixed from declaration order (parent list then
/// child list) *before* any download starts, so completion order of
/// the concurrent jobs can't reorder it.
pub struct LibraryDownloader<'a> {
    config: &'a LauncherConfig,
    natives_dir: &'a Path,
    features: FeatureFlags,
    sender: Option<Sender<DownloadProgress>>,
}

impl<'a> LibraryDownloader<'a> {
    #[must_use]
    pub fn new(
        config: &'a LauncherConfig,
        natives_dir: &'a Path,
        features: FeatureFlags,
        sender: Option<Sender<DownloadProgress>>,
    ) -> Self {
        Self {
            config,
            natives_dir,
            features,
            sender,
        }
    }

    /// Fetches all admitted libraries, blocking until every download
    /// and extraction job has finished (the single barrier of the
    /// launch pipeline), and returns the non-native library paths in
    /// declaration order.
    ///
    /// Files already on disk whose declared sha1/size match are not
    /// fetched again; cached natives are still extracted. A file
    /// that exists but mismatches is re-downloaded in place.
    ///
    /// # Errors
    /// Per-library failures are collected; if any job failed, the
    /// whole call fails with an aggregate error naming each library,
    /// and no classpath is returned.
    pub async fn download_all(
        &self,
        version: &VersionDetails,
    ) -> Result<Vec<PathBuf>, DownloadError> {
        info!("Starting download of {} libraries.", version.libraries.len());

        let libraries_dir = self.config.libraries_dir();

        let mut entries: Vec<(String, ResolvedArtifact)> = Vec::new();
        let mut classpath = Vec::new();

        for library in &version.libraries {
            if !rules::admits_opt(
                library.rules.as_deref(),
                &self.config.platform,
                &self.features,
            ) {
                if let Some(name) = &library.name {
                    info!("Skipping library (rules): {name}");
                }
                continue;
            }

            let Some(artifact) = resolve_library(
                library,
                &self.config.platform,
                &libraries_dir,
                &self.config.library_repo,
            ) else {
                continue;
            };

            if !artifact.is_native {
                classpath.push(artifact.path.clone());
            }

            let label = library
                .name
                .clone()
                .unwrap_or_else(|| artifact.url.clone());
            entries.push((label, artifact));
        }

        let out_of = entries.len();
        let progress = Mutex::new(0_usize);

        let jobs = entries
            .iter()
            .map(|(name, artifact)| self.fetch_library(name, artifact, &progress, out_of));
        let outputs = do_jobs(jobs).await;

        let failures: Vec<LibraryFailure> = outputs.into_iter().filter_map(Result::err).collect();
        if !failures.is_empty() {
            return Err(DownloadError::LibraryBatch(LibraryFailures(failures)));
        }

        Ok(classpath)
    }

    async fn fetch_library(
        &self,
        name: &str,
        artifact: &ResolvedArtifact,
        progress: &Mutex<usize>,
        out_of: usize,
    ) -> Result<(), LibraryFailure> {
        self.fetch_library_inner(name, artifact)
            .await
            .map_err(|error| LibraryFailure {
                name: name.to_owned(),
                error,
            })?;

        {
            let mut progress = progress.lock().unwrap();
            *progress += 1;
            self.send_progress(DownloadProgress::DownloadingLibraries {
                progress: *progress,
                out_of,
            })
            .map_err(|error| LibraryFailure {
                name: name.to_owned(),
                error,
            })?;
        }

        Ok(())
    }

    async fn fetch_library_inner(
        &self,
        name: &str,
        artifact: &ResolvedArtifact,
    ) -> Result<(), DownloadError> {
        if !file_matches(&artifact.path, artifact.sha1.as_deref(), artifact.size).await {
            info!("Downloading {name}: {}", artifact.url);
            download_checked(
                &artifact.url,
                &artifact.path,
                artifact.sha1.as_deref(),
                artifact.size,
                name,
            )
            .await?;
        }

        if artifact.is_native {
            let extracted = natives::extract_archive(
                &artifact.path,
                self.natives_dir,
                &self.config.platform,
            );
            if self.config.strict_natives {
                extracted?;
            } else if let Err(error) = extracted {
                err!("Ignoring native extraction failure for {name}: {error}");
            }
        }

        Ok(())
    }

    /// Makes sure the version's own client jar is present, verified,
    /// and on the classpath, if the descriptor declares one.
    ///
    /// # Errors
    /// Returns an error if the jar can't be fetched or fails its
    /// checksum after a forced re-download.
    pub async fn ensure_client_jar(
        &self,
        version: &VersionDetails,
        classpath: &mut Vec<PathBuf>,
    ) -> Result<(), DownloadError> {
        let Some(downloads) = &version.downloads else {
            return Ok(());
        };
        let client = &downloads.client;
        let jar_path = self.config.client_jar_path(&version.id);

        if !file_matches(&jar_path, client.sha1.as_deref(), client.size).await {
            info!("Downloading client jar for {}", version.id);
            self.send_progress(DownloadProgress::DownloadingClientJar)?;
            download_checked(
                &client.url,
                &jar_path,
                client.sha1.as_deref(),
                client.size,
                "client jar",
            )
            .await?;
        }

        if !classpath.contains(&jar_path) {
            classpath.push(jar_path);
        }
        Ok(())
    }

    fn send_progress(&self, progress: DownloadProgress) -> Result<(), DownloadError> {
        if let Some(sender) = &self.sender {
            sender.send(progress)?;
        }
        Ok(())
    }
}

/// Whether a file on disk satisfies the declared integrity data:
/// every declared check (size and/or sha1) must pass. With nothing
/// declared, existing is enough.
pub async fn file_matches(path: &Path, sha1: Option<&str>, size: Option<u64>) -> bool {
    let Ok(metadata) = tokio::fs::metadata(path).await else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    if let Some(size) = size {
        if metadata.len() != size {
            return false;
        }
    }

    if let Some(expected) = sha1 {
        match file_utils::sha1_hex_of_file(path).await {
            Ok(actual) => {
                if !actual.eq_ignore_ascii_case(expected) {
                    return false;
                }
            }
            Err(_) => return false,
        }
    }

    true
}

/// Downloads to `path` and verifies the declared checks. A mismatch
/// triggers one forced re-download; a second mismatch is an error.
async fn download_checked(
    url: &str,
    path: &Path,
    sha1: Option<&str>,
    size: Option<u64>,
    name: &str,
) -> Result<(), DownloadError> {
    file_utils::download_file_to_path(url, path).await?;
    if file_matches(path, sha1, size).await {
        return Ok(());
    }

    err!("Integrity mismatch for {name}, re-downloading");
    file_utils::download_file_to_path(url, path).await?;
    if file_matches(path, sha1, size).await {
        return Ok(());
    }

    let expected = match (sha1, size) {
        (Some(sha1), _) => sha1.to_owned(),
        (None, Some(size)) => format!("size {size}"),
        (None, None) => "an existing file".to_owned(),
    };
    let got = match sha1 {
        Some(_) => file_utils::sha1_hex_of_file(path)
            .await
            .unwrap_or_else(|_| "unreadable file".to_owned()),
        None => match tokio::fs::metadata(path).await {
            Ok(m) => format!("size {}", m.len()),
            Err(_) => "unreadable file".to_owned(),
        },
    };
    Err(DownloadError::ChecksumMismatch {
        name: name.to_owned(),
        expected,
        got,
    })
}

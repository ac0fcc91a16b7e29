use std::{
    future::Future,
    path::{Path, PathBuf},
};

use futures::StreamExt;
use serde::de::DeserializeOwned;
use sha1::{Digest, Sha1};
use thiserror::Error;
use tokio_util::io::StreamReader;

use crate::{error::IoError, IntoIoError, JsonDownloadError, CLIENT};

/// Returns the path to the Craftbox root folder,
/// using the system config dir:
/// - `~/.config` on Linux
/// - `~/AppData/Roaming` on Windows
/// - `~/Library/Application Support` on macOS
///
/// # Errors
/// - if config dir is not found
/// - if the launcher directory could not be created (permissions issue)
pub fn get_launcher_dir() -> Result<PathBuf, IoError> {
    let launcher_directory = dirs::config_dir()
        .ok_or(IoError::ConfigDirNotFound)?
        .join("Craftbox");

    std::fs::create_dir_all(&launcher_directory).path(&launcher_directory)?;
    Ok(launcher_directory)
}

const NETWORK_ERROR_MSG: &str = r"
- Check your internet connection
- Check if you are behind a firewall/proxy
- Try doing the action again

";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Download Error (code {code}){NETWORK_ERROR_MSG}Url: {url}")]
    DownloadError {
        code: reqwest::StatusCode,
        url: reqwest::Url,
    },
    #[error("Network Request Error{NETWORK_ERROR_MSG}{0}")]
    ReqwestError(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum DownloadFileError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Io(#[from] IoError),
}

impl From<reqwest::Error> for DownloadFileError {
    fn from(value: reqwest::Error) -> Self {
        Self::Request(RequestError::ReqwestError(value))
    }
}

/// Runs a fallible network operation, retrying once on failure.
/// Transient connection resets are common enough with the
/// repositories we hit that a single retry pays for itself.
async fn retry<T, E, Fut, F: Fn() -> Fut>(f: F) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    match f().await {
        Ok(n) => Ok(n),
        Err(_) => f().await,
    }
}

/// Downloads a file from the given URL into a `String`.
///
/// # Errors
/// Returns an error if:
/// - Error sending request
/// - Request is rejected (HTTP status code)
/// - Redirect loop detected
/// - Redirect limit exhausted.
pub async fn download_file_to_string(url: &str) -> Result<String, RequestError> {
    async fn inner(url: &str) -> Result<String, RequestError> {
        let response = CLIENT.get(url).send().await?;
        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            Err(RequestError::DownloadError {
                code: response.status(),
                url: response.url().clone(),
            })
        }
    }

    retry(|| inner(url)).await
}

/// Downloads a file from the given URL into a `Vec<u8>`.
///
/// # Errors
/// Returns an error if:
/// - Error sending request
/// - Request is rejected (HTTP status code)
/// - Redirect loop detected
/// - Redirect limit exhausted.
pub async fn download_file_to_bytes(url: &str) -> Result<Vec<u8>, RequestError> {
    async fn inner(url: &str) -> Result<Vec<u8>, RequestError> {
        let response = CLIENT.get(url).send().await?;
        if response.status().is_success() {
            Ok(response.bytes().await?.to_vec())
        } else {
            Err(RequestError::DownloadError {
                code: response.status(),
                url: response.url().clone(),
            })
        }
    }

    retry(|| inner(url)).await
}

/// Downloads a file from the given URL into a JSON.
///
/// More specifically, it tries to parse the contents
/// into anything implementing `serde::Deserialize`
///
/// # Errors
/// Returns an error if:
/// - the file can't be downloaded (see [`download_file_to_string`])
/// - the contents don't parse into the requested type
pub async fn download_file_to_json<T: DeserializeOwned>(
    url: &str,
) -> Result<T, JsonDownloadError> {
    let text = download_file_to_string(url).await?;
    Ok(serde_json::from_str(&text)?)
}

/// Downloads a file from the given URL and saves it to a path.
///
/// This uses `tokio` streams internally allowing for highly
/// efficient downloading.
///
/// # Errors
/// Returns an error if:
/// - the file can't be downloaded (see [`download_file_to_string`])
/// - the parent directory can't be created, or the file can't be written
pub async fn download_file_to_path(url: &str, path: &Path) -> Result<(), DownloadFileError> {
    async fn inner(url: &str, path: &Path) -> Result<(), DownloadFileError> {
        let response = CLIENT.get(url).send().await?;

        if response.status().is_success() {
            let stream = response
                .bytes_stream()
                .map(|n| n.map_err(std::io::Error::other));
            let mut stream = StreamReader::new(stream);

            if let Some(parent) = path.parent() {
                if !parent.is_dir() {
                    tokio::fs::create_dir_all(&parent).await.path(parent)?;
                }
            }

            let mut file = tokio::fs::File::create(&path).await.path(path)?;
            tokio::io::copy(&mut stream, &mut file).await.path(path)?;
            Ok(())
        } else {
            Err(RequestError::DownloadError {
                code: response.status(),
                url: response.url().clone(),
            }
            .into())
        }
    }

    retry(|| inner(url, path)).await
}

/// Computes the lowercase hex SHA-1 digest of a byte slice.
#[must_use]
pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Computes the lowercase hex SHA-1 digest of a file's contents.
///
/// # Errors
/// Returns an error if the file can't be read.
pub async fn sha1_hex_of_file(path: &Path) -> Result<String, IoError> {
    let bytes = tokio::fs::read(path).await.path(path)?;
    Ok(sha1_hex(&bytes))
}

/// Sets the executable bit on a file.
///
/// This makes a file executable on Unix systems,
/// ie. it can be run as a program.
///
/// # Errors
/// Returns an error if:
/// - the file does not exist
/// - the user doesn't have permission to read the file metadata
/// - the user doesn't have permission to change the file metadata
#[cfg(target_family = "unix")]
pub fn set_executable(path: &std::path::Path) -> Result<(), IoError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path).path(path)?.permissions();
    perms.set_mode(0o755); // rwxr-xr-x
    std::fs::set_permissions(path, perms).path(path)
}

#[cfg(test)]
mod tests {
    use super::sha1_hex;

    #[test]
    fn sha1_digest() {
        // Known vectors
        assert_eq!(sha1_hex(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(
            sha1_hex(b"The quick brown fox jumps over the lazy dog"),
            "2fd4e1c67a2d28fced849ee1bb76e7391b93eb12"
        );
    }
}

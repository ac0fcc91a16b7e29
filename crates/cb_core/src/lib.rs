//! Core utilities shared between the Craftbox crates.
//!
//! # Contains
//! - File and download utilities
//! - Error types
//! - JSON structs for version descriptors and the version manifest
//! - Platform (OS + arch) capability
//! - Logging macros

mod error;
/// Common utilities for working with files.
pub mod file_utils;
/// JSON structs for version descriptors and the version manifest.
pub mod json;
/// Target platform description.
pub mod platform;
/// Logging macros.
pub mod print;
mod progress;

use std::sync::LazyLock;

pub use error::{IntoIoError, IntoStringError, IoError, JsonDownloadError, JsonFileError};
pub use file_utils::{DownloadFileError, RequestError};
pub use platform::{Arch, OsName, Platform};
pub use print::logger_finish;
pub use progress::{DownloadProgress, GenericProgress, Progress};

pub const CLASSPATH_SEPARATOR: char = if cfg!(unix) { ':' } else { ';' };

pub const LAUNCHER_NAME: &str = "Craftbox";
pub const LAUNCHER_VERSION_NAME: &str = "0.1.0";

pub static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// Perform multiple async tasks concurrently, at most
/// 3x the CPU core count in flight at once.
///
/// Unlike a `try_join_all`, this never short-circuits: every job
/// runs to completion and every job's result is returned, so the
/// caller can report all failures instead of only the first.
pub async fn do_jobs<T, E>(
    results: impl Iterator<Item = impl std::future::Future<Output = Result<T, E>>>,
) -> Vec<Result<T, E>> {
    let jobs = 3 * std::thread::available_parallelism().map_or(4, std::num::NonZero::get);

    let mut tasks = futures::stream::FuturesUnordered::new();
    let mut outputs = Vec::new();

    for result in results {
        tasks.push(result);
        if tasks.len() > jobs {
            if let Some(task) = futures::StreamExt::next(&mut tasks).await {
                outputs.push(task);
            }
        }
    }

    while let Some(task) = futures::StreamExt::next(&mut tasks).await {
        outputs.push(task);
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::do_jobs;

    #[tokio::test]
    async fn do_jobs_collects_every_result() {
        let jobs = (0..100).map(|i| async move {
            if i % 7 == 0 {
                Err(i)
            } else {
                Ok(i * 2)
            }
        });

        let outputs = do_jobs(jobs).await;
        assert_eq!(outputs.len(), 100);
        assert_eq!(outputs.iter().filter(|n| n.is_err()).count(), 15);
    }
}

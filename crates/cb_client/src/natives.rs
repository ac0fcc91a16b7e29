//! Unpacks platform shared libraries out of downloaded archives.
//!
//! Multiple archives routinely carry the same shared library (two
//! natives jars both shipping `lwjgl.dll`), and extraction jobs run
//! concurrently, so every output path is guarded by a process-local
//! lock: exactly one writer wins, everyone else treats the file as
//! already present. Writes go to a uniquely-named temp file which is
//! renamed into place, so a reader can never observe a half-written
//! library.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, LazyLock, Mutex,
    },
};

use cb_core::{err, info_no_log, pt, IntoIoError, IoError, Platform};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NativesError {
    #[error("could not read native archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Io(#[from] IoError),
}

/// A per-launch directory holding the extracted native libraries.
///
/// Created under the system temp dir with a unique name; removing it
/// happens on drop, so keep the guard alive for as long as the
/// launched process may load libraries from it ([`crate::GameProcess`]
/// holds it for you).
#[derive(Debug)]
pub struct NativesDir {
    path: PathBuf,
}

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

impl NativesDir {
    /// # Errors
    /// Returns an error if the directory can't be created.
    pub fn create() -> Result<Self, IoError> {
        let path = std::env::temp_dir().join(format!(
            "craftbox-natives-{}-{}",
            std::process::id(),
            DIR_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&path).path(&path)?;
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for NativesDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            err!("Could not clean up natives dir {:?}: {e}", self.path);
        }
    }
}

/// Extracts the shared libraries from a natives archive into
/// `natives_dir`, flattened to their basename. Idempotent, and safe
/// to call concurrently for the same archive or overlapping entries.
///
/// Archives whose filename names a different CPU architecture are
/// skipped wholesale.
///
/// # Errors
/// Returns an error if the archive can't be opened or an entry
/// can't be written out.
pub fn extract_archive(
    archive_path: &Path,
    natives_dir: &Path,
    platform: &Platform,
) -> Result<(), NativesError> {
    let file_name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if !archive_matches_arch(file_name, platform) {
        info_no_log!("Skipping natives (wrong arch): {file_name}");
        return Ok(());
    }

    std::fs::create_dir_all(natives_dir).path(natives_dir)?;

    let file = std::fs::File::open(archive_path).path(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let extension = format!(".{}", platform.os.library_extension());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_owned();

        if entry.is_dir() || name.starts_with("META-INF/") {
            continue;
        }
        let base_name = name.rsplit('/').next().unwrap_or(&name);
        if !base_name.to_lowercase().ends_with(&extension) {
            continue;
        }

        let out = natives_dir.join(base_name);
        extract_entry(&mut entry, &out, natives_dir)?;
    }

    pt!("Extracted natives: {file_name}");
    Ok(())
}

static ENTRY_COUNTER: AtomicUsize = AtomicUsize::new(0);

static OUTPUT_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn lock_for(out: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(out).unwrap_or_else(|_| out.to_path_buf());
    let mut locks = OUTPUT_LOCKS.lock().unwrap();
    locks.entry(key).or_default().clone()
}

fn extract_entry(
    entry: &mut impl std::io::Read,
    out: &Path,
    natives_dir: &Path,
) -> Result<(), NativesError> {
    let lock = lock_for(out);
    let _guard = lock.lock().unwrap();

    if out.exists() {
        return Ok(());
    }

    // Temp file in the target dir, so the rename below stays on one
    // filesystem and therefore atomic.
    let tmp = natives_dir.join(format!(
        ".native-{}-{}.tmp",
        std::process::id(),
        ENTRY_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = (|| -> Result<(), IoError> {
        {
            let mut file = std::fs::File::create(&tmp).path(&tmp)?;
            std::io::copy(entry, &mut file).path(&tmp)?;
        }

        match std::fs::rename(&tmp, out) {
            Ok(()) => {}
            // Lost the race against a writer outside this process.
            Err(_) if out.exists() => {}
            Err(e) => return Err(e).path(out),
        }

        #[cfg(target_family = "unix")]
        cb_core::file_utils::set_executable(out)?;

        Ok(())
    })();

    let _ = std::fs::remove_file(&tmp);
    result.map_err(NativesError::Io)
}

/// Whether an archive filename's embedded classifier is compatible
/// with the platform's CPU architecture. Unqualified windows natives
/// are x86-64 by convention.
fn archive_matches_arch(file_name: &str, platform: &Platform) -> bool {
    let name = file_name.to_lowercase();
    let is_arm = platform.arch.is_arm();
    let is_64 = platform.arch.is_64_bit();

    if name.contains("arm64") || name.contains("aarch64") {
        return is_arm;
    }
    if name.contains("-x86") {
        return !is_64 && !is_arm;
    }
    if platform.os == cb_core::OsName::Windows {
        return is_64 && !is_arm;
    }
    true
}

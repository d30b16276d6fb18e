//! This module contains a patcher which applies an in-memory patcher to a file on disk, keeping a backup of the original

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::{Patched, Patcher};

/// Suffix appended to the target path to name its backup
pub const BACKUP_SUFFIX: &str = ".backup";

/// Errors when patching a file
#[derive(Debug, Error)]
pub enum FileError<E> {
    /// The target path does not exist. Nothing was read or written.
    #[error("File not found at: {}", .0.display())]
    NotFound(PathBuf),
    /// Error while copying, reading or writing files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Error from the underlying patcher. The target was not written.
    #[error("{0}")]
    Patch(E),
}

/// Whether the backup was made by this run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackupStatus {
    /// The backup did not exist and was copied from the target
    Created,
    /// A backup was already present and was left untouched
    Existing,
}

/// Backup of a target file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Backup {
    /// Location of the backup
    pub path: PathBuf,
    /// Whether the backup was created by this run
    pub status: BackupStatus,
}

/// Summary of a successful file patch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchReport {
    /// Patched file
    pub path: PathBuf,
    /// Location of the backup
    pub backup: PathBuf,
    /// Whether the backup was created by this run
    pub backup_status: BackupStatus,
    /// Outcome of the underlying patcher
    pub outcome: Patched,
}

/// Returns the backup location for `path`, which is `path` with [`BACKUP_SUFFIX`] appended
pub fn backup_path(path: &Path) -> PathBuf {
    let mut backup = OsString::from(path.as_os_str());
    backup.push(BACKUP_SUFFIX);
    PathBuf::from(backup)
}

/// This struct wraps patchers to apply them to files instead of memory.
/// It backs up the target, loads it fully, runs the wrapped patcher on the loaded bytes, and rewrites the whole file if anything changed.
///
/// The backup is made once per target path.
/// An existing backup is reused without comparing it to the target, so a target modified by other means since the first run keeps the older backup.
///
/// No locking is done; running two patchers against the same file at once is not supported.
pub struct FilePatcher<P: Patcher> {
    /// Underlying patcher.
    patcher: P,
}
impl<P: Patcher> FilePatcher<P> {
    /// Creates a new FilePatcher
    pub fn new(patcher: P) -> Self {
        Self { patcher }
    }

    /// Returns the wrapped patcher
    pub fn inner(&self) -> &P {
        &self.patcher
    }

    /// Patches the file at `path`.
    ///
    /// Runs [`FilePatcher::backup`] and then [`FilePatcher::apply`].
    /// The target is only written when the wrapped patcher returns [`Patched::Applied`].
    pub fn patch<Q: AsRef<Path>>(&self, path: Q) -> Result<PatchReport, FileError<P::Error>> {
        let path = path.as_ref();
        let backup = self.backup(path)?;
        let outcome = self.apply(path)?;

        Ok(PatchReport {
            path: path.to_owned(),
            backup: backup.path,
            backup_status: backup.status,
            outcome,
        })
    }

    /// Checks that `path` exists and copies it to its backup location if no backup is there yet.
    ///
    /// Nothing is touched when `path` is missing.
    pub fn backup<Q: AsRef<Path>>(&self, path: Q) -> Result<Backup, FileError<P::Error>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FileError::NotFound(path.to_owned()));
        }
        info!(path = %path.display(), "found target file");

        let backup = backup_path(path);
        let status = if backup.exists() {
            info!(backup = %backup.display(), "backup already exists");
            BackupStatus::Existing
        } else {
            info!(backup = %backup.display(), "creating backup");
            copy_with_metadata(path, &backup)?;
            BackupStatus::Created
        };

        Ok(Backup {
            path: backup,
            status,
        })
    }

    /// Loads `path`, runs the wrapped patcher on it and rewrites the whole file if it was modified.
    ///
    /// No backup is made; see [`FilePatcher::backup`].
    pub fn apply<Q: AsRef<Path>>(&self, path: Q) -> Result<Patched, FileError<P::Error>> {
        let path = path.as_ref();
        let mut buffer = fs::read(path)?;
        debug!(len = buffer.len(), "loaded target file");

        let outcome = self.patcher.patch(&mut buffer).map_err(FileError::Patch)?;
        if outcome.modified() {
            fs::write(path, &buffer)?;
            info!(path = %path.display(), "wrote patched file");
        } else {
            info!(path = %path.display(), "file already patched, nothing written");
        }

        Ok(outcome)
    }
}

/// Copies `from` to `to`, carrying over permissions and the modification time
fn copy_with_metadata(from: &Path, to: &Path) -> io::Result<()> {
    // `fs::copy` already carries permissions
    fs::copy(from, to)?;
    let modified = fs::metadata(from)?.modified()?;
    File::options().write(true).open(to)?.set_modified(modified)
}

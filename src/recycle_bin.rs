//! Reversible deletion: files are moved into a staging directory instead of
//! being erased, and moved back out on restore.

use crate::config::{CollisionPolicy, Config};
use crate::errors::{CoreError, Result};
use crate::fs::{is_cross_device, FileSystem, RealFileSystem};
use crate::helpers::{canonical_or_relaxed, is_bare_file_name};
use crate::models::{StagedEntry, StagedFile};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PARTIAL_SUFFIX: &str = ".partial";
const DISPLACED_SUFFIX: &str = ".displaced";

/// A single staging directory holding soft-deleted files, keyed by base name.
///
/// Not internally synchronised: concurrent callers must serialise access to
/// the same staging directory themselves.
#[derive(Debug, Clone)]
pub struct RecycleBin<F: FileSystem = RealFileSystem> {
    staging_dir: PathBuf,
    collision_policy: CollisionPolicy,
    fs: F,
}

impl RecycleBin<RealFileSystem> {
    pub fn new(config: &Config) -> Self {
        Self::with_fs(config, RealFileSystem)
    }
}

impl<F: FileSystem> RecycleBin<F> {
    pub fn with_fs(config: &Config, fs: F) -> Self {
        Self {
            staging_dir: config.staging_dir.clone(),
            collision_policy: config.collision_policy,
            fs,
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Creates the staging directory if it does not exist yet.
    pub fn ensure_staging_dir(&self) -> Result<()> {
        if !self.fs.exists(&self.staging_dir) {
            debug!(dir = %self.staging_dir.display(), "creating staging directory");
        }
        self.fs.create_dir_all(&self.staging_dir)
    }

    /// Moves `path` into the staging directory under its base name.
    pub fn soft_delete(&self, path: &Path) -> Result<StagedEntry> {
        let metadata = match self.fs.symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.io_source().map(|e| e.kind()) == Some(std::io::ErrorKind::NotFound) => {
                return Err(CoreError::not_found(path));
            }
            Err(err) => return Err(err),
        };
        if metadata.is_dir() {
            return Err(CoreError::invalid_input(format!(
                "{} is a directory; only files can be deleted",
                path.display()
            )));
        }

        let staged_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                CoreError::invalid_input(format!("{} has no usable file name", path.display()))
            })?;

        self.ensure_staging_dir()?;
        let original_path = canonical_or_relaxed(path);
        let staged_path = self.staging_dir.join(&staged_name);
        self.check_collision(&staged_path)?;

        self.move_file(path, &staged_path)?;
        info!(
            from = %original_path.display(),
            to = %staged_path.display(),
            "file moved to recycle bin"
        );

        Ok(StagedEntry::new(original_path, staged_name, staged_path).with_size(metadata.len()))
    }

    /// Moves the staged file `name` into `target_dir`, creating it if needed.
    pub fn restore(&self, name: &str, target_dir: &Path) -> Result<PathBuf> {
        if !is_bare_file_name(name) {
            return Err(CoreError::invalid_input(format!(
                "`{name}` is not a plain file name"
            )));
        }

        self.ensure_staging_dir()?;
        let staged_path = self.staging_dir.join(name);
        if !self.fs.exists(&staged_path) {
            return Err(CoreError::not_found(staged_path));
        }

        self.fs.create_dir_all(target_dir)?;
        let destination = target_dir.join(name);
        self.check_collision(&destination)?;

        self.move_file(&staged_path, &destination)?;
        info!(
            staged = name,
            to = %destination.display(),
            "file recovered from recycle bin"
        );
        Ok(destination)
    }

    /// Restores `name` into the process working directory.
    pub fn restore_to_cwd(&self, name: &str) -> Result<PathBuf> {
        let cwd = std::env::current_dir().map_err(|err| CoreError::io(".", err))?;
        self.restore(name, &cwd)
    }

    /// Lists files currently held in the staging directory, in directory order.
    pub fn entries(&self) -> Result<Vec<StagedFile>> {
        self.ensure_staging_dir()?;
        let mut staged = Vec::new();
        for path in self.fs.list_dir(&self.staging_dir)? {
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
                continue;
            };
            if is_scratch_name(&name) {
                continue;
            }
            let metadata = match self.fs.symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "skipping unreadable staged entry");
                    continue;
                }
            };
            if metadata.is_dir() {
                continue;
            }
            staged.push(StagedFile {
                name,
                path,
                size_bytes: metadata.len(),
                modified: metadata.modified().ok(),
            });
        }
        Ok(staged)
    }

    fn check_collision(&self, destination: &Path) -> Result<()> {
        if !self.fs.exists(destination) {
            return Ok(());
        }
        match self.collision_policy {
            CollisionPolicy::Overwrite => {
                warn!(path = %destination.display(), "replacing existing file");
                Ok(())
            }
            CollisionPolicy::Fail => Err(CoreError::Conflict(destination.to_path_buf())),
        }
    }

    /// Renames `from` to `to`, falling back to copy-then-remove across volumes.
    ///
    /// On any failure `from` is left in place with its content intact.
    fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        match self.fs.rename(from, to) {
            Ok(()) => Ok(()),
            Err(err) if err.io_source().is_some_and(is_cross_device) => {
                debug!(
                    from = %from.display(),
                    to = %to.display(),
                    "rename crosses devices, copying instead"
                );
                self.copy_then_remove(from, to)
            }
            Err(err) => Err(err),
        }
    }

    fn copy_then_remove(&self, from: &Path, to: &Path) -> Result<()> {
        let partial = scratch_path_for(to, PARTIAL_SUFFIX);

        if let Err(err) = self.fs.copy(from, &partial) {
            self.discard(&partial);
            return Err(err);
        }
        let displaced = match self.set_aside(to) {
            Ok(displaced) => displaced,
            Err(err) => {
                self.discard(&partial);
                return Err(err);
            }
        };
        if let Err(err) = self.fs.rename(&partial, to) {
            self.discard(&partial);
            self.put_back(displaced.as_deref(), to);
            return Err(err);
        }
        if let Err(err) = self.fs.remove_file(from) {
            // Keep exactly one copy: the source wins when it cannot be removed.
            self.discard(to);
            self.put_back(displaced.as_deref(), to);
            return Err(err);
        }
        if let Some(displaced) = displaced {
            self.discard(&displaced);
        }
        Ok(())
    }

    /// Moves an existing `path` out of the way so it can be put back if the
    /// move replacing it is aborted.
    fn set_aside(&self, path: &Path) -> Result<Option<PathBuf>> {
        if !self.fs.exists(path) {
            return Ok(None);
        }
        let aside = scratch_path_for(path, DISPLACED_SUFFIX);
        self.fs.rename(path, &aside)?;
        Ok(Some(aside))
    }

    fn put_back(&self, displaced: Option<&Path>, to: &Path) {
        let Some(displaced) = displaced else {
            return;
        };
        if let Err(err) = self.fs.rename(displaced, to) {
            warn!(
                path = %displaced.display(),
                error = %err,
                "failed to put replaced file back after aborted move"
            );
        }
    }

    fn discard(&self, path: &Path) {
        if !self.fs.exists(path) {
            return;
        }
        if let Err(err) = self.fs.remove_file(path) {
            warn!(path = %path.display(), error = %err, "failed to clean up after aborted move");
        }
    }
}

fn scratch_path_for(destination: &Path, suffix: &str) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!(".{name}{suffix}"))
}

/// Hidden in-flight files left next to a destination by a cross-device move.
fn is_scratch_name(name: &str) -> bool {
    name.starts_with('.') && (name.ends_with(PARTIAL_SUFFIX) || name.ends_with(DISPLACED_SUFFIX))
}

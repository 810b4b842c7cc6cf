use crate::errors::CoreError;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem abstraction boundary for the recycle bin.
///
/// Keeping this trait narrow makes it easy to inject failures (cross-device
/// renames, failing copies) in tests without touching a real second volume.
pub trait FileSystem: Send + Sync {
    /// Returns true when path exists (symlink-aware).
    fn exists(&self, path: &Path) -> bool;

    /// Reads symlink metadata.
    fn symlink_metadata(&self, path: &Path) -> crate::Result<Metadata>;

    /// Creates a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Renames/moves a path. Fails across volumes.
    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()>;

    /// Copies file contents and permissions, returning the number of bytes copied.
    fn copy(&self, from: &Path, to: &Path) -> crate::Result<u64>;

    /// Removes a file.
    fn remove_file(&self, path: &Path) -> crate::Result<()>;

    /// Lists directory children as concrete paths.
    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn symlink_metadata(&self, path: &Path) -> crate::Result<Metadata> {
        fs::symlink_metadata(path).map_err(|err| CoreError::io(path, err))
    }

    fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::create_dir_all(path).map_err(|err| CoreError::io(path, err))
    }

    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()> {
        fs::rename(from, to).map_err(|err| CoreError::io(from, err))
    }

    fn copy(&self, from: &Path, to: &Path) -> crate::Result<u64> {
        fs::copy(from, to).map_err(|err| CoreError::io(from, err))
    }

    fn remove_file(&self, path: &Path) -> crate::Result<()> {
        fs::remove_file(path).map_err(|err| CoreError::io(path, err))
    }

    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>> {
        fs::read_dir(path)
            .map_err(|err| CoreError::io(path, err))?
            .map(|entry| entry.map(|v| v.path()))
            .collect::<Result<Vec<PathBuf>, io::Error>>()
            .map_err(|err| CoreError::io(path, err))
    }
}

/// Copies the regular file `source` to `destination`, creating the
/// destination's parent directory when it is missing.
pub fn copy_file(fs: &impl FileSystem, source: &Path, destination: &Path) -> crate::Result<u64> {
    match fs.symlink_metadata(source) {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => {
            return Err(CoreError::InvalidInput(format!(
                "{} is not a regular file",
                source.display()
            )))
        }
        Err(_) => return Err(CoreError::NotFound(source.to_path_buf())),
    }
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)?;
    }
    fs.copy(source, destination)
}

/// True when a rename failed only because source and destination live on
/// different volumes, so a copy-then-remove fallback is appropriate.
pub fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(unix)]
    {
        err.raw_os_error() == Some(libc::EXDEV)
    }

    #[cfg(windows)]
    {
        // ERROR_NOT_SAME_DEVICE
        err.raw_os_error() == Some(17)
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = err;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_dir_returns_children() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let mut children = RealFileSystem.list_dir(dir.path()).unwrap();
        children.sort();
        assert_eq!(children, vec![dir.path().join("a.txt"), dir.path().join("sub")]);
    }

    #[test]
    fn rename_error_names_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let err = RealFileSystem.rename(&missing, &dir.path().join("b.txt")).unwrap_err();
        match err {
            CoreError::Io(path, io_err) => {
                assert_eq!(path, missing);
                assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn copy_file_creates_destination_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "abc").unwrap();
        let destination = dir.path().join("x").join("y").join("b.txt");

        let copied = copy_file(&RealFileSystem, &source, &destination).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "abc");
        assert!(source.exists());
    }

    #[test]
    fn copy_file_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_file(&RealFileSystem, &dir.path().join("nope"), &dir.path().join("b")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        let err = copy_file(&RealFileSystem, dir.path(), &dir.path().join("b")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[cfg(unix)]
    #[test]
    fn exdev_is_cross_device() {
        assert!(is_cross_device(&io::Error::from_raw_os_error(libc::EXDEV)));
        assert!(!is_cross_device(&io::Error::from_raw_os_error(libc::EACCES)));
        assert!(!is_cross_device(&io::Error::new(io::ErrorKind::Other, "x")));
    }
}

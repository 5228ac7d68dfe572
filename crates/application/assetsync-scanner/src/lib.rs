use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{0} is not a directory")]
    NotADirectory(Utf8PathBuf),
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

pub struct Scanner;

impl Scanner {
    /// Lazily walks `root` and yields every file below it.
    ///
    /// Order is whatever the filesystem returns. Symlinks to files are
    /// yielded, symlinked directories are not entered, dangling links are
    /// skipped. The first error ends the useful part of the walk; callers
    /// are expected to stop on it.
    pub fn walk(
        root: &Utf8Path,
    ) -> Result<impl Iterator<Item = Result<Utf8PathBuf, ScannerError>>, ScannerError> {
        let meta = fs::metadata(root)?;
        if !meta.is_dir() {
            return Err(ScannerError::NotADirectory(root.to_path_buf()));
        }

        info!("Walking {}", root);

        Ok(WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| Self::file_entry(entry).transpose()))
    }

    /// `root` made absolute against the working directory, without resolving
    /// symlinks, so walked paths mean the same thing to another process.
    pub fn absolute_root(root: &Utf8Path) -> Result<Utf8PathBuf, ScannerError> {
        if root.is_absolute() {
            return Ok(root.to_path_buf());
        }
        let abs = std::path::absolute(root)?;
        Utf8PathBuf::from_path_buf(abs).map_err(ScannerError::NonUtf8Path)
    }

    /// Eager variant of [`Scanner::walk`].
    pub fn list_files(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ScannerError> {
        Self::walk(root)?.collect()
    }

    fn file_entry(
        entry: Result<DirEntry, walkdir::Error>,
    ) -> Result<Option<Utf8PathBuf>, ScannerError> {
        let entry = entry?;
        let file_type = entry.file_type();

        let is_file = if file_type.is_file() {
            true
        } else if file_type.is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(target) => target.is_file(),
                Err(e) => {
                    debug!("Skipping dangling link {}: {}", entry.path().display(), e);
                    false
                }
            }
        } else {
            false
        };

        if !is_file {
            return Ok(None);
        }

        Utf8PathBuf::from_path_buf(entry.into_path())
            .map(Some)
            .map_err(ScannerError::NonUtf8Path)
    }
}

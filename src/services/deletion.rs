//! Filesystem deletion primitive shared by the retention pass and the sweep

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A path that could not be removed. Reported, never fatal.
#[derive(Debug, Error)]
pub enum DeletionError {
    #[error("{} does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to delete {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of one deletion attempt
#[derive(Debug)]
pub struct DeletionOutcome {
    pub path: PathBuf,
    pub error: Option<DeletionError>,
}

impl DeletionOutcome {
    /// Attempt to delete `path` and record what happened
    pub fn attempt(path: PathBuf) -> Self {
        let error = remove_recursively(&path).err();
        Self { path, error }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Remove a file, symlink or whole directory tree
pub fn remove_recursively(path: &Path) -> Result<(), DeletionError> {
    let io_error = |source: io::Error| DeletionError::Io {
        path: path.to_path_buf(),
        source,
    };

    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DeletionError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(io_error(e)),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(io_error)
    } else {
        fs::remove_file(path).map_err(io_error)
    }
}

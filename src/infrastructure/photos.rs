//! Photo library backed by a local directory.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ImageHandle;

const IMAGE_PATTERNS: [&str; 1] = ["**/*.{jpg,jpeg,png}"];

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("We need access to your photos.")]
    AccessDenied,
    #[error("Could not scan photo library: {0}")]
    Scan(String),
}

/// Access request plus listing, performed as one step.
pub trait PhotoLibrary: Send {
    fn open(&self) -> Result<Vec<ImageHandle>, PhotoError>;
}

pub struct DirectoryLibrary {
    root: Option<PathBuf>,
}

impl DirectoryLibrary {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn request_access(&self) -> Result<&PathBuf, PhotoError> {
        let root = self.root.as_ref().ok_or(PhotoError::AccessDenied)?;
        match std::fs::read_dir(root) {
            Ok(_) => Ok(root),
            Err(e) => {
                tracing::warn!(path = %root.display(), error = %e, "photo library not readable");
                Err(PhotoError::AccessDenied)
            }
        }
    }
}

impl PhotoLibrary for DirectoryLibrary {
    fn open(&self) -> Result<Vec<ImageHandle>, PhotoError> {
        let root = self.request_access()?;

        let walker = globwalk::GlobWalkerBuilder::from_patterns(root, &IMAGE_PATTERNS)
            .case_insensitive(true)
            .build()
            .map_err(|e| PhotoError::Scan(e.to_string()))?;

        let mut paths: Vec<PathBuf> = walker
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.into_path()),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable library entry");
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        Ok(paths.into_iter().map(ImageHandle::new).collect())
    }
}

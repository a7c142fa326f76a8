use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Suffix appended to the target file name for the sibling temp file.
pub const TEMP_SUFFIX: &str = ".tmp";

/// A validated rewrite target.
///
/// Holds the canonical path of a regular file. Symlinks are resolved so the
/// file they point to is rewritten and the link itself is left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Path as given by the caller
    requested: PathBuf,
    /// Canonical path of the file that gets replaced
    canonical: PathBuf,
}

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Could not open {path}: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("Path has no file name: {0}")]
    NoFileName(PathBuf),
}

impl Target {
    /// Resolve and validate `path`.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self, TargetError> {
        let requested = path.as_ref().to_path_buf();

        // Canonicalize to resolve symlinks and .. components
        let canonical = requested
            .canonicalize()
            .map_err(|source| TargetError::Inaccessible {
                path: requested.clone(),
                source,
            })?;

        let metadata = canonical
            .metadata()
            .map_err(|source| TargetError::Inaccessible {
                path: requested.clone(),
                source,
            })?;
        if !metadata.is_file() {
            return Err(TargetError::NotAFile(requested));
        }

        if canonical.file_name().is_none() || canonical.parent().is_none() {
            return Err(TargetError::NoFileName(requested));
        }

        Ok(Self {
            requested,
            canonical,
        })
    }

    pub fn requested(&self) -> &Path {
        &self.requested
    }

    pub fn canonical(&self) -> &Path {
        &self.canonical
    }

    /// Directory holding the target; the temp file is created here so the
    /// final rename stays on one filesystem.
    pub fn directory(&self) -> &Path {
        // resolve() rejected paths without a parent
        self.canonical.parent().unwrap_or_else(|| Path::new("."))
    }

    /// File name of the sibling temp file (`<name>.tmp`).
    pub fn temp_file_name(&self) -> OsString {
        let mut name = self
            .canonical
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(TEMP_SUFFIX);
        name
    }

    /// Full path of the sibling temp file.
    pub fn temp_path(&self) -> PathBuf {
        self.directory().join(self.temp_file_name())
    }
}

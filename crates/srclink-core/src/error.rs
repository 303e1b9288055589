use std::path::PathBuf;
use thiserror::Error;

/// Core error type for srclink operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No package.json found in {dir}")]
    ManifestNotFound { dir: PathBuf },
}

/// Result alias used throughout srclink-core.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable code for JSON output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::ManifestRead { .. } => "MANIFEST_READ_FAILED",
            Self::ManifestParse { .. } => "MANIFEST_INVALID",
            Self::ManifestNotFound { .. } => "MANIFEST_NOT_FOUND",
        }
    }
}

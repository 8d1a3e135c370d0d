//! Artifact store specification models and top-level error types.

use std::io;
use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////
// #region StoreOptions

/// Input options for [`crate::store::ArtifactStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecArtifactStoreOptions {
    /// Storage root; artifacts are written directly under it.
    pub dir_root: PathBuf,
    /// File extension appended to generated artifact names (without dot).
    pub extension: String,
    /// Maximum worker threads for deferred deletion.
    pub num_workers_max: Option<usize>,
    /// Maximum deletions queued on the pool before the caller runs them inline.
    pub queue_capacity: Option<usize>,
}

impl Default for SpecArtifactStoreOptions {
    fn default() -> Self {
        Self {
            dir_root: PathBuf::from("temp"),
            extension: "xlsx".to_string(),
            num_workers_max: None,
            queue_capacity: None,
        }
    }
}

/// One deferred deletion failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCleanupError {
    /// Artifact path that failed deletion.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// Outcome of one deletion attempt, folded into the store report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EnumDeleteOutcome {
    /// File existed and was removed.
    Deleted { if_inline: bool },
    /// File was already gone.
    Missing { if_inline: bool },
    /// Removal failed.
    Failed {
        if_inline: bool,
        error: SpecCleanupError,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Store-level failures.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactStoreError {
    /// Name is empty, contains a path separator, or is a relative component.
    #[error("Invalid artifact name: {0:?}")]
    InvalidArtifactName(String),
    /// Storage root could not be created.
    #[error("Failed to initialize storage root {}: {source}", path.display())]
    StorageInitFailed {
        /// Storage root path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Artifact file could not be created or written.
    #[error("Failed to write artifact {}: {source}", path.display())]
    WriteFailed {
        /// Artifact path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Artifact file could not be read.
    #[error("Failed to read artifact {}: {source}", path.display())]
    ReadFailed {
        /// Artifact path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Artifact file could not be removed.
    #[error("Failed to delete artifact {}: {source}", path.display())]
    DeleteFailed {
        /// Artifact path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Deletion worker pool could not be started.
    #[error("Failed to build cleanup worker pool: {0}")]
    PoolInitFailed(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

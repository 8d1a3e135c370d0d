//! Top-level export error type.

use std::io;
use std::path::PathBuf;

use sheetkit_io_fs::ArtifactStoreError;

/// Failures surfaced by layout loading, document building and export.
#[derive(Debug, thiserror::Error)]
pub enum ExcelExportError {
    /// Required layout fields missing or malformed coordinates.
    #[error("Invalid layout config: {0}")]
    ConfigValidation(String),
    /// Layout description is not valid YAML for the layout shape.
    #[error("Failed to parse layout config: {0}")]
    ConfigParse(String),
    /// Layout description file could not be read.
    #[error("Failed to read layout config {}: {source}", path.display())]
    ConfigRead {
        /// Layout file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A dotted path names a member the record does not have.
    #[error("Field not found: no member `{member}` while resolving `{path}`")]
    FieldNotFound {
        /// Full field path as configured.
        path: String,
        /// Path segment that did not resolve.
        member: String,
    },
    /// Grid construction aborted; wraps the original cause.
    #[error("Document generation failed: {source}")]
    DocumentGenerationFailed {
        /// Original failure.
        #[source]
        source: Box<ExcelExportError>,
    },
    /// Workbook serialization failed.
    #[error("xlsx write error: {0}")]
    XlsxWrite(String),
    /// Temporary artifact could not be created, written, or read.
    #[error("Artifact IO failure: {0}")]
    ArtifactIo(#[from] ArtifactStoreError),
}

impl ExcelExportError {
    /// Wrap `self` as the cause of a failed build.
    pub fn into_generation_failure(self) -> Self {
        Self::DocumentGenerationFailed {
            source: Box::new(self),
        }
    }
}

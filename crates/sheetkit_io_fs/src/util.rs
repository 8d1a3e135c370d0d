use std::fs;
use std::io;
use std::path::{Component, Path};

use uuid::Uuid;

use crate::spec::{ArtifactStoreError, EnumDeleteOutcome, SpecCleanupError};

////////////////////////////////////////////////////////////////////////////////
// #region ArtifactNaming

/// Create unique artifact name `{base_name}_{uuid}.{extension}`.
pub(crate) fn derive_artifact_name(base_name: &str, extension: &str) -> String {
    let c_extension = extension.trim_start_matches('.');
    format!("{base_name}_{}.{c_extension}", Uuid::new_v4())
}

/// Reject names that could address anything outside the storage root.
pub(crate) fn validate_artifact_name(name: &str) -> Result<(), ArtifactStoreError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(ArtifactStoreError::InvalidArtifactName(name.to_string()));
    }

    let mut iter_components = Path::new(name).components();
    match (iter_components.next(), iter_components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ArtifactStoreError::InvalidArtifactName(name.to_string())),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorkerSizing

pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu,
    }
}

pub(crate) fn calculate_queue_capacity(queue_capacity: Option<usize>, n_workers: usize) -> usize {
    match queue_capacity {
        Some(n) => n,
        None => n_workers.saturating_mul(4),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Deletion

/// Remove one artifact file, classifying the outcome.
pub(crate) fn delete_file_if_exists(path_file: &Path, if_inline: bool) -> EnumDeleteOutcome {
    match fs::remove_file(path_file) {
        Ok(()) => EnumDeleteOutcome::Deleted { if_inline },
        Err(e) if e.kind() == io::ErrorKind::NotFound => EnumDeleteOutcome::Missing { if_inline },
        Err(e) => EnumDeleteOutcome::Failed {
            if_inline,
            error: SpecCleanupError {
                path: path_file.to_path_buf(),
                exception: e.to_string(),
            },
        },
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

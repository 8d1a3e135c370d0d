//! Temporary artifact storage with deferred deletion.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::report::{ReportCleanup, ReportCleanupBuilder};
use crate::spec::{ArtifactStoreError, EnumDeleteOutcome, SpecArtifactStoreOptions};
use crate::util::{
    calculate_queue_capacity, calculate_worker_limit, delete_file_if_exists,
    derive_artifact_name, validate_artifact_name,
};

/// Uniquely named artifacts under one storage root.
///
/// Deletions requested through [`Self::schedule_delete`] run on a pool owned by
/// the store. When more than `queue_capacity` deletions are pending, the
/// caller runs the deletion itself. Each outcome is folded into the running
/// report as soon as its deletion finishes. [`Self::shutdown`] waits for all
/// pending deletions and returns the final report.
pub struct ArtifactStore {
    path_dir_root: PathBuf,
    extension: String,
    n_queue_capacity: usize,
    ledger: Arc<CleanupLedger>,
    thread_pool: ThreadPool,
}

/// Running cleanup counters plus the number of deletions still on the pool.
#[derive(Debug, Default)]
struct CleanupState {
    n_pending: usize,
    builder: ReportCleanupBuilder,
}

#[derive(Debug, Default)]
struct CleanupLedger {
    state: Mutex<CleanupState>,
    cv_idle: Condvar,
}

impl CleanupLedger {
    fn lock(&self) -> MutexGuard<'_, CleanupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one scheduled deletion and take a pool slot.
    /// Fails with the pending count when the queue is full.
    fn reserve_slot(&self, n_capacity: usize) -> Result<(), usize> {
        let mut state = self.lock();
        state.builder.add_scheduled();
        if state.n_pending >= n_capacity {
            return Err(state.n_pending);
        }
        state.n_pending += 1;
        Ok(())
    }

    fn record(&self, outcome: EnumDeleteOutcome, if_queued: bool) {
        let mut state = self.lock();
        state.builder.add_outcome(outcome);
        if if_queued {
            state.n_pending -= 1;
            if state.n_pending == 0 {
                self.cv_idle.notify_all();
            }
        }
    }

    fn wait_idle(&self) -> MutexGuard<'_, CleanupState> {
        let mut state = self.lock();
        while state.n_pending > 0 {
            state = self
                .cv_idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state
    }
}

impl ArtifactStore {
    /// Create a store and start its deletion pool. The storage root is created lazily.
    pub fn new(options: SpecArtifactStoreOptions) -> Result<Self, ArtifactStoreError> {
        let n_workers = calculate_worker_limit(options.num_workers_max);
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(n_workers)
            .thread_name(|n_idx| format!("artifact-cleanup-{n_idx}"))
            .build()
            .map_err(|e| ArtifactStoreError::PoolInitFailed(e.to_string()))?;

        Ok(Self {
            path_dir_root: options.dir_root,
            extension: options.extension,
            n_queue_capacity: calculate_queue_capacity(options.queue_capacity, n_workers),
            ledger: Arc::new(CleanupLedger::default()),
            thread_pool,
        })
    }

    /// Resolve artifact name to its path under the storage root.
    pub fn path_artifact(&self, name: &str) -> Result<PathBuf, ArtifactStoreError> {
        validate_artifact_name(name)?;
        Ok(self.path_dir_root.join(name))
    }

    /// Write `bytes` to a new artifact named `{base_name}_{uuid}.{extension}`.
    ///
    /// Returns the generated name, which is the retrieval handle.
    pub fn write_artifact(
        &self,
        base_name: &str,
        bytes: &[u8],
    ) -> Result<String, ArtifactStoreError> {
        let c_name = derive_artifact_name(base_name, &self.extension);
        let path_file = self.path_artifact(&c_name)?;

        fs::create_dir_all(&self.path_dir_root).map_err(|source| {
            ArtifactStoreError::StorageInitFailed {
                path: self.path_dir_root.clone(),
                source,
            }
        })?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path_file)
            .map_err(|source| ArtifactStoreError::WriteFailed {
                path: path_file.clone(),
                source,
            })?;
        if let Err(source) = file.write_all(bytes).and_then(|_| file.flush()) {
            drop(file);
            let _ = fs::remove_file(&path_file);
            return Err(ArtifactStoreError::WriteFailed {
                path: path_file,
                source,
            });
        }

        log::debug!(
            "artifact written: {} ({} bytes)",
            path_file.display(),
            bytes.len()
        );
        Ok(c_name)
    }

    /// Read artifact content.
    pub fn read_artifact(&self, name: &str) -> Result<Vec<u8>, ArtifactStoreError> {
        let path_file = self.path_artifact(name)?;
        fs::read(&path_file).map_err(|source| ArtifactStoreError::ReadFailed {
            path: path_file,
            source,
        })
    }

    /// Read artifact content for one-time retrieval and schedule its deletion.
    ///
    /// Deletion is scheduled even when the read fails.
    pub fn take_artifact(&self, name: &str) -> Result<Vec<u8>, ArtifactStoreError> {
        let res_read = self.read_artifact(name);
        self.schedule_delete(name)?;
        res_read
    }

    /// Delete artifact synchronously. Returns `false` when it was already gone.
    pub fn delete_artifact(&self, name: &str) -> Result<bool, ArtifactStoreError> {
        let path_file = self.path_artifact(name)?;
        match fs::remove_file(&path_file) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(ArtifactStoreError::DeleteFailed {
                path: path_file,
                source,
            }),
        }
    }

    /// Queue artifact deletion on the cleanup pool.
    pub fn schedule_delete(&self, name: &str) -> Result<(), ArtifactStoreError> {
        let path_file = self.path_artifact(name)?;

        if let Err(n_pending) = self.ledger.reserve_slot(self.n_queue_capacity) {
            log::warn!(
                "cleanup queue full ({} pending), deleting on caller: {}",
                n_pending,
                path_file.display()
            );
            let outcome = delete_file_if_exists(&path_file, true);
            log_delete_outcome(&outcome, &path_file);
            self.ledger.record(outcome, false);
            return Ok(());
        }

        let ledger = Arc::clone(&self.ledger);
        self.thread_pool.spawn(move || {
            let outcome = delete_file_if_exists(&path_file, false);
            log_delete_outcome(&outcome, &path_file);
            ledger.record(outcome, true);
        });
        Ok(())
    }

    /// Counters of deletions finished so far; pending deletions are not waited for.
    pub fn report(&self) -> ReportCleanup {
        self.ledger.lock().builder.clone().build()
    }

    /// Block until no deletion is pending on the pool, then snapshot the counters.
    pub fn wait_pending(&self) -> ReportCleanup {
        self.ledger.wait_idle().builder.clone().build()
    }

    /// Wait for every scheduled deletion, stop the pool, and report.
    pub fn shutdown(self) -> ReportCleanup {
        let report = {
            let mut state = self.ledger.wait_idle();
            std::mem::take(&mut state.builder).build()
        };
        drop(self.thread_pool);

        log::info!("{report}");
        report
    }
}

fn log_delete_outcome(outcome: &EnumDeleteOutcome, path_file: &Path) {
    match outcome {
        EnumDeleteOutcome::Deleted { .. } => {
            log::debug!("file {} deleted", path_file.display())
        }
        EnumDeleteOutcome::Missing { .. } => {
            log::debug!("file {} already gone", path_file.display())
        }
        EnumDeleteOutcome::Failed { error, .. } => {
            log::warn!(
                "file {} not deleted: {}",
                path_file.display(),
                error.exception
            )
        }
    }
}

//! `sheetkit_io_fs` v1:
//! Rust-side temporary artifact storage.
//!
//! Modules:
//! - `store`  : unique naming, write/read/take, deferred deletion
//! - `spec`   : options/errors
//! - `report` : cleanup report model
//! - `util`   : shared helper functions

pub mod report;
pub mod spec;
pub mod store;
mod util;

pub use report::{ReportCleanup, ReportCleanupBuilder};
pub use spec::{ArtifactStoreError, SpecArtifactStoreOptions, SpecCleanupError};
pub use store::ArtifactStore;

//! Cleanup report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

use crate::spec::{EnumDeleteOutcome, SpecCleanupError};

/// Aggregate counters and diagnostics for the deferred deletions of one store.
#[derive(Debug, Default, Clone)]
pub struct ReportCleanup {
    /// Number of deletions requested.
    pub cnt_scheduled: u64,
    /// Number of artifacts removed.
    pub cnt_deleted: u64,
    /// Number of artifacts already gone when their deletion ran.
    pub cnt_missing: u64,
    /// Number of deletions run on the caller thread because the queue was full.
    pub cnt_inline: u64,
    /// Per-artifact failures.
    pub errors: Vec<SpecCleanupError>,
}

impl ReportCleanup {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scheduled".to_string(), self.cnt_scheduled);
        dict_counts.insert("cnt_deleted".to_string(), self.cnt_deleted);
        dict_counts.insert("cnt_missing".to_string(), self.cnt_missing);
        dict_counts.insert("cnt_inline".to_string(), self.cnt_inline);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} scheduled={} deleted={} missing={} inline={} errors={}",
            dict_counts["cnt_scheduled"],
            dict_counts["cnt_deleted"],
            dict_counts["cnt_missing"],
            dict_counts["cnt_inline"],
            dict_counts["cnt_errors"]
        )
    }
}

impl fmt::Display for ReportCleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[CLEANUP]"))
    }
}

/// Mutable accumulator for cleanup statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportCleanupBuilder {
    /// See [`ReportCleanup::cnt_scheduled`].
    pub cnt_scheduled: u64,
    /// See [`ReportCleanup::cnt_deleted`].
    pub cnt_deleted: u64,
    /// See [`ReportCleanup::cnt_missing`].
    pub cnt_missing: u64,
    /// See [`ReportCleanup::cnt_inline`].
    pub cnt_inline: u64,
    /// See [`ReportCleanup::errors`].
    pub errors: Vec<SpecCleanupError>,
}

impl ReportCleanupBuilder {
    /// Increment scheduled count by one.
    pub fn add_scheduled(&mut self) {
        self.cnt_scheduled += 1;
    }

    /// Increment deleted count by one.
    pub fn add_deleted(&mut self) {
        self.cnt_deleted += 1;
    }

    /// Increment missing count by one.
    pub fn add_missing(&mut self) {
        self.cnt_missing += 1;
    }

    /// Increment inline count by one.
    pub fn add_inline(&mut self) {
        self.cnt_inline += 1;
    }

    pub(crate) fn add_outcome(&mut self, outcome: EnumDeleteOutcome) {
        let if_inline = match outcome {
            EnumDeleteOutcome::Deleted { if_inline } => {
                self.add_deleted();
                if_inline
            }
            EnumDeleteOutcome::Missing { if_inline } => {
                self.add_missing();
                if_inline
            }
            EnumDeleteOutcome::Failed { if_inline, error } => {
                self.errors.push(error);
                if_inline
            }
        };
        if if_inline {
            self.add_inline();
        }
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportCleanup {
        ReportCleanup {
            cnt_scheduled: self.cnt_scheduled,
            cnt_deleted: self.cnt_deleted,
            cnt_missing: self.cnt_missing,
            cnt_inline: self.cnt_inline,
            errors: self.errors,
        }
    }
}

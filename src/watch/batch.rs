// src/watch/batch.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::types::{ChangeRecord, FileStatus};

/// The open batch of classified changes, keyed by path.
///
/// A later record for a path overwrites the earlier one, except that
/// `Deleted` followed by `Added` collapses into `Changed`: a file removed
/// and recreated inside one debounce window is reported once.
#[derive(Debug, Default)]
pub struct Batch {
    records: BTreeMap<PathBuf, FileStatus>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: ChangeRecord) {
        let ChangeRecord { path, mut status } = record;
        if status == FileStatus::Added && self.records.get(&path) == Some(&FileStatus::Deleted) {
            status = FileStatus::Changed;
        }
        self.records.insert(path, status);
    }

    pub fn status_of(&self, path: &std::path::Path) -> Option<FileStatus> {
        self.records.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot and clear, in path order.
    pub fn take(&mut self) -> Vec<ChangeRecord> {
        std::mem::take(&mut self.records)
            .into_iter()
            .map(|(path, status)| ChangeRecord { path, status })
            .collect()
    }
}

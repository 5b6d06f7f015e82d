// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered record views backing one display region each.

use std::collections::HashSet;

use ds_core::{Record, RecordId};

/// Records shown in one display region, in arrival order.
///
/// With de-duplication on, a record id appears at most once; later copies
/// are dropped and the first one wins.
#[derive(Debug, Clone)]
pub struct RecordView<R> {
    records: Vec<R>,
    seen: HashSet<RecordId>,
    dedupe: bool,
}

impl<R: Record> RecordView<R> {
    pub fn new(dedupe: bool) -> Self {
        RecordView {
            records: Vec::new(),
            seen: HashSet::new(),
            dedupe,
        }
    }

    /// Replace the whole view, keeping the given order.
    pub fn replace(&mut self, records: Vec<R>) {
        self.clear();
        for record in records {
            self.append(record);
        }
    }

    /// Append a record. Returns false if it was dropped as a duplicate.
    pub fn append(&mut self, record: R) -> bool {
        if self.dedupe && !self.seen.insert(record.id().clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.seen.clear();
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.iter().any(|r| r.id() == id)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One escaped fragment per record, concatenated. Empty for an empty view.
    pub fn render(&self) -> String {
        ds_core::render(&self.records)
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;

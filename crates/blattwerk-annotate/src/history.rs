// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Undo/redo history — an append-only log of annotation-list snapshots with a
// cursor. Committing after an undo truncates everything past the cursor.

use std::sync::Arc;

use tracing::debug;

use crate::annotation::Annotation;

/// Outcome of an undo or redo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStep {
    Moved,
    /// Nothing further in that direction; the view is unchanged.
    AtBoundary,
}

/// Snapshot log plus cursor. `cursor == None` is the empty view before the
/// first snapshot.
#[derive(Debug, Clone, Default)]
pub struct History {
    log: Vec<Arc<[Annotation]>>,
    cursor: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// The annotation list currently in view.
    pub fn current(&self) -> &[Annotation] {
        match self.cursor {
            Some(index) => &self.log[index],
            None => &[],
        }
    }

    /// Drop every snapshot after the cursor, then append `annotations`.
    pub fn commit(&mut self, annotations: Vec<Annotation>) {
        let keep = self.cursor.map_or(0, |index| index + 1);
        let discarded = self.log.len() - keep;
        self.log.truncate(keep);
        self.log.push(annotations.into());
        self.cursor = Some(self.log.len() - 1);
        debug!(snapshots = self.log.len(), discarded, "snapshot committed");
    }

    /// Commit the current view with `annotation` appended.
    pub fn push(&mut self, annotation: Annotation) {
        let mut next = self.current().to_vec();
        next.push(annotation);
        self.commit(next);
    }

    pub fn undo(&mut self) -> HistoryStep {
        match self.cursor {
            None => HistoryStep::AtBoundary,
            Some(index) => {
                self.cursor = index.checked_sub(1);
                HistoryStep::Moved
            }
        }
    }

    pub fn redo(&mut self) -> HistoryStep {
        let next = self.cursor.map_or(0, |index| index + 1);
        if next >= self.log.len() {
            return HistoryStep::AtBoundary;
        }
        self.cursor = Some(next);
        HistoryStep::Moved
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |index| index + 1) < self.log.len()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

//! Bounded undo/redo history of editor state.
//!
//! A linear stack with a pointer. Committing after an undo drops the
//! entries past the pointer (branch truncation); committing past
//! [`MAX_HISTORY`] forgets the oldest entry first. Undo and redo at a
//! boundary are no-ops, never errors.

use std::collections::VecDeque;

use serde::Serialize;

use crate::config::Customization;
use crate::types::{PageContent, Timestamp};

/// Maximum number of snapshots kept per editing session.
pub const MAX_HISTORY: usize = 50;

/// One immutable snapshot of the editable state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub customization: Customization,
    pub content: PageContent,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone)]
pub struct EditingHistory {
    entries: VecDeque<HistoryEntry>,
    /// `None` exactly when `entries` is empty.
    pointer: Option<usize>,
    limit: usize,
}

impl Default for EditingHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EditingHistory {
    pub fn new() -> Self {
        Self::with_limit(MAX_HISTORY)
    }

    /// History holding at most `limit` snapshots (at least one).
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            pointer: None,
            limit,
        }
    }

    /// Record a snapshot of `customization` and `content`.
    ///
    /// Entries after the pointer are discarded first. The snapshot owns deep
    /// copies, so later edits to the live state never reach it.
    pub fn commit(&mut self, customization: &Customization, content: &PageContent) -> &HistoryEntry {
        if let Some(pointer) = self.pointer {
            self.entries.truncate(pointer + 1);
        }

        self.entries.push_back(HistoryEntry {
            customization: customization.clone(),
            content: content.clone(),
            timestamp: chrono::Utc::now(),
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }

        let last = self.entries.len() - 1;
        self.pointer = Some(last);
        &self.entries[last]
    }

    /// Step back one snapshot. Returns the entry now pointed at, or `None`
    /// when already at the oldest entry (or empty).
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let pointer = self.pointer.filter(|&p| p > 0)?;
        self.pointer = Some(pointer - 1);
        self.entries.get(pointer - 1)
    }

    /// Step forward one snapshot. Returns the entry now pointed at, or `None`
    /// when already at the newest entry (or empty).
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let pointer = self.pointer.filter(|&p| p + 1 < self.entries.len())?;
        self.pointer = Some(pointer + 1);
        self.entries.get(pointer + 1)
    }

    pub fn can_undo(&self) -> bool {
        self.pointer.is_some_and(|p| p > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.pointer.is_some_and(|p| p + 1 < self.entries.len())
    }

    /// Drop every snapshot. Used when the session ends or the base template
    /// changes, since snapshots only make sense against one template.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.pointer = None;
    }

    /// The entry the pointer is on.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.pointer.and_then(|p| self.entries.get(p))
    }

    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Snapshots oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The staged-edit layer: wraps the host [`File`] for the duration of one
//! program run, buffering every mutation in a change log while all reads
//! keep seeing the committed snapshot.
//!
//! Addresses and regexp searches therefore work in a stable, pre-edit
//! coordinate system for the whole run; logical positions are reconciled
//! through the pending log exactly when a mutation lands. `commit` hands
//! the composed log to the host in one piece.

use std::io::Read;

use tracing::debug;

use crate::delta::Delta;
use crate::error::Result;
use crate::traits::{File, ReadSeek};

pub(crate) struct Staged<'a> {
    file: &'a mut dyn File,
    changes: Delta,
    original_len: usize,
    applied_len: usize,
}

impl<'a> Staged<'a> {
    pub(crate) fn new(file: &'a mut dyn File) -> Result<Self> {
        let len = file.len()?;
        Ok(Staged {
            file,
            changes: Delta::new(),
            original_len: len,
            applied_len: len,
        })
    }

    /// Compose the accumulated log into the host and reset. All-or-nothing:
    /// a failing host leaves the log applied nowhere.
    pub(crate) fn commit(&mut self) -> Result<()> {
        let log = std::mem::take(&mut self.changes);
        debug!(ops = log.ops().len(), "committing staged edits");
        self.file.compose(log)?;
        self.original_len = self.file.len()?;
        self.applied_len = self.original_len;
        Ok(())
    }

    /// Stage an insert of `bytes` at pre-edit position `at`. Returns the
    /// number of bytes accepted. Dot moves to the inserted range.
    pub(crate) fn insert(&mut self, bytes: &[u8], at: usize) -> usize {
        if bytes.is_empty() {
            return 0;
        }
        let at = self.changes.transform_position(at, true);
        let at = at.min(self.applied_len);
        let change = Delta::new().retain(at).insert(bytes);
        self.changes = self.changes.compose(&change);
        self.applied_len += bytes.len();
        self.select(at, at + bytes.len());
        bytes.len()
    }

    /// Stage a delete of pre-edit range `[start, end)`. Returns the number
    /// of bytes removed. Dot collapses to the start of the cut.
    pub(crate) fn delete(&mut self, start: usize, end: usize) -> usize {
        let start = self.changes.transform_position(start, true);
        let end = self.changes.transform_position(end, true);
        let end = end.min(self.applied_len);
        if end <= start {
            return 0;
        }
        let n = end - start;
        let change = Delta::new().retain(start).delete(n);
        self.changes = self.changes.compose(&change);
        self.applied_len -= n;
        self.select(start, start);
        n
    }

    pub(crate) fn select(&mut self, q0: usize, q1: usize) {
        self.file.select(q0, q1);
    }

    pub(crate) fn dot(&self) -> (usize, usize) {
        self.file.dot()
    }

    /// Length of the snapshot taken at construction time. Staged edits do
    /// not change it; address arithmetic stays in pre-edit coordinates.
    pub(crate) fn len(&self) -> usize {
        self.original_len
    }

    /// Seekable reader over the pre-edit bytes `[start, end)`, clamped to
    /// the snapshot.
    pub(crate) fn reader(&self, start: usize, end: usize) -> Box<dyn ReadSeek + '_> {
        let start = start.min(self.original_len);
        let end = end.clamp(start, self.original_len);
        self.file.reader(start, end)
    }

    /// Materialize the pre-edit bytes `[start, end)`.
    pub(crate) fn window(&self, start: usize, end: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(end.saturating_sub(start));
        self.reader(start, end).read_to_end(&mut buf)?;
        Ok(buf)
    }
}

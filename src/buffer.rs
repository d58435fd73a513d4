//! The standard in-memory host: a plain byte buffer that accumulates
//! committed change logs. This is what tests and most embedders use.

use std::io::Cursor;

use crate::delta::Delta;
use crate::error::Result;
use crate::traits::{File, ReadSeek};

/// An owned byte buffer implementing the [`File`] capability.
///
/// Contents are raw bytes; they do not have to be valid UTF-8. Every
/// committed change log is folded into [`MemBuffer::changes`], so callers
/// can inspect exactly which operations a program performed.
#[derive(Debug, Clone, Default)]
pub struct MemBuffer {
    contents: Vec<u8>,
    changes: Delta,
    q0: usize,
    q1: usize,
}

impl MemBuffer {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        MemBuffer {
            contents: contents.into(),
            changes: Delta::new(),
            q0: 0,
            q1: 0,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.contents
    }

    /// Contents as a string, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents).into_owned()
    }

    /// All change logs committed so far, composed into one.
    pub fn changes(&self) -> &Delta {
        &self.changes
    }
}

impl File for MemBuffer {
    fn select(&mut self, q0: usize, q1: usize) {
        self.q0 = q0;
        self.q1 = q1;
    }

    fn dot(&self) -> (usize, usize) {
        (self.q0, self.q1)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.contents.len())
    }

    fn reader(&self, q0: usize, q1: usize) -> Box<dyn ReadSeek + '_> {
        let q0 = q0.min(self.contents.len());
        let q1 = q1.clamp(q0, self.contents.len());
        Box::new(Cursor::new(&self.contents[q0..q1]))
    }

    fn compose(&mut self, log: Delta) -> Result<()> {
        self.contents = log.apply(&self.contents);
        self.changes = self.changes.compose(&log);
        Ok(())
    }
}

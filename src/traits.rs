use std::io::{Read, Seek};

use crate::delta::Delta;
use crate::error::Result;

/// A seekable byte stream over a window of a buffer.
///
/// Blanket-implemented for everything that is `Read + Seek`, so hosts can
/// hand back a `Cursor`, a file wrapper, or anything else without naming
/// this trait.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// The buffer capability the engine consumes.
///
/// This is the single extension point: implement it for your text storage
/// (an in-memory buffer, a rope, a file, an OT document) and the engine
/// can address, search, and rewrite it. The engine never mutates the host
/// directly while a program runs; all edits arrive in one [`Delta`]
/// through [`File::compose`] at commit time.
///
/// # Examples
///
/// ```no_run
/// use sam_mini::{compile, Context, MemBuffer};
///
/// let mut buffer = MemBuffer::new("Code Emacs Vim Sam ed");
/// let program = compile(",x/m /d").unwrap();
/// program.run(Context { file: &mut buffer, printer: None }).unwrap();
/// assert_eq!(buffer.text(), "Code Emacs ViSaed");
/// ```
pub trait File {
    /// Set dot. The engine always supplies a valid range; hosts need not
    /// validate.
    fn select(&mut self, q0: usize, q1: usize);

    /// Return the current dot.
    fn dot(&self) -> (usize, usize);

    /// Total byte length of the committed contents. May fail (e.g. a
    /// backing file that cannot be stat'ed); the error is surfaced to the
    /// caller of `Program::run`.
    fn len(&self) -> Result<usize>;

    /// A seekable reader over bytes `[q0, q1)` of the committed contents.
    /// Seeks are relative to the window, not the whole buffer.
    fn reader(&self, q0: usize, q1: usize) -> Box<dyn ReadSeek + '_>;

    /// Apply a change log atomically. All-or-nothing: a host that cannot
    /// honor the whole log must reject it and leave its contents alone.
    fn compose(&mut self, log: Delta) -> Result<()>;
}

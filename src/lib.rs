//! # sam_mini - a minimal, embeddable Sam/Acme command language engine
//!
//! `sam_mini` is a platform-agnostic Rust library implementing the
//! structural editing command language of the Sam and Acme editors: a tiny
//! concatenative DSL composing *address expressions* with *commands* that
//! select, print, transform, and rewrite regions of a text buffer.
//!
//! ## Design Philosophy
//!
//! This library follows a strict separation of concerns:
//! - **The library handles**: parsing the command language, address
//!   evaluation, regexp-driven looping and substitution, and staging edits
//!   so a whole program commits atomically
//! - **The host handles**: text storage, rendering, undo/redo, file I/O
//!
//! The host supplies its buffer through the [`File`] trait and receives
//! all mutations as a single change log ([`Delta`]) at commit time. While
//! a program runs, every address and search is evaluated against the
//! pre-edit snapshot, so commands like `x/re/d` are never perturbed by
//! their own earlier deletions.
//!
//! ## Quick Start
//!
//! ```
//! use sam_mini::{compile, Context, MemBuffer};
//!
//! let mut buffer = MemBuffer::new("Code Emacs Vim Sam ed");
//! let program = compile("/Emacs/a/ is not so great/").unwrap();
//! program
//!     .run(Context {
//!         file: &mut buffer,
//!         printer: None,
//!     })
//!     .unwrap();
//! assert_eq!(buffer.text(), "Code Emacs is not so great Vim Sam ed");
//! ```
//!
//! ## The command language
//!
//! An address selects a byte range: `3` (line), `#12` (byte), `$` (end),
//! `/re/` and `?re?` (search), `.` (dot), and compounds like `1,$` or
//! `/a/;/b/`. A command then acts on it: `a`/`c`/`i` insert text, `d`
//! deletes, `p` prints, `=` reports positions, `m`/`t` move and copy,
//! `s/re/rhs/` substitutes (with `&` and `\1`..`\9` back-references), and
//! the loop combinators `x`, `y`, `g`, `v`, and `{…}` drive a child
//! command over computed sub-ranges.
//!
//! ## What's NOT Included
//!
//! To keep the library minimal and focused:
//! - No multi-file commands: the `"` file selector and `'` mark addresses
//!   parse but fail to evaluate
//! - No wrap-around searches; `?re?` stops at the start of the buffer
//! - No undo history (hosts get one composable change log per run)
//! - No Unicode column arithmetic; all positions are byte offsets

mod address;
mod buffer;
mod delta;
mod error;
mod exec;
mod fs;
mod parser;
mod pattern;
mod scanner;
mod staged;
mod traits;
mod types;

use std::io::Write;

use tracing::debug;

pub use crate::buffer::MemBuffer;
pub use crate::delta::{Delta, Op};
pub use crate::error::{Error, Result};
pub use crate::fs::FsFile;
pub use crate::traits::{File, ReadSeek};

use crate::exec::Machine;
use crate::parser::Cmd;
use crate::scanner::Scanner;
use crate::staged::Staged;

/// Everything a program run needs from the host: the buffer capability
/// and an optional sink for `p` and `=` output.
pub struct Context<'a> {
    pub file: &'a mut dyn File,
    pub printer: Option<&'a mut dyn Write>,
}

/// A compiled program: one or more commands run in order against a single
/// staged buffer, committed together.
#[derive(Debug, Clone)]
pub struct Program {
    cmds: Vec<Cmd>,
}

/// Compile command source into a [`Program`]. Trailing newlines normalize
/// to exactly one; the empty program is rejected.
pub fn compile(src: &str) -> Result<Program> {
    if src.is_empty() {
        return Err(Error::EmptyProgram);
    }
    let normalized = format!("{}\n", src.trim_end_matches('\n'));
    debug!(bytes = normalized.len(), "compiling program");
    let mut scanner = Scanner::new(&normalized);
    let mut cmds = Vec::new();
    while let Some(cmd) = parser::parse_cmd(&mut scanner, 0)? {
        cmds.push(cmd);
    }
    if cmds.is_empty() {
        return Err(Error::EmptyProgram);
    }
    Ok(Program { cmds })
}

impl Program {
    /// Execute against the host buffer. On success every staged edit is
    /// composed into the host atomically; on error the host is untouched.
    pub fn run(&self, ctx: Context<'_>) -> Result<()> {
        let mut machine = Machine {
            file: Staged::new(ctx.file)?,
            printer: ctx.printer,
        };
        for cmd in &self.cmds {
            exec::exec_cmd(&mut machine, cmd)?;
        }
        machine.file.commit()
    }
}

#![allow(dead_code)]

use sam_mini::{compile, Context, MemBuffer, Result};

/// Compile and run a command against an in-memory buffer, no printer.
pub fn run(command: &str, file: &mut MemBuffer) -> Result<()> {
    compile(command)?.run(Context {
        file,
        printer: None,
    })
}

/// Compile and run a command, capturing printer output.
pub fn run_print(command: &str, file: &mut MemBuffer) -> Result<String> {
    let program = compile(command)?;
    let mut out: Vec<u8> = Vec::new();
    program.run(Context {
        file,
        printer: Some(&mut out),
    })?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// The four-line sample paragraph used across the command tests.
pub const MANUAL: &str = "\
This manual is organized in a rather haphazard manner. The first
several sections were written hastily in an attempt to provide a
general introduction to the commands in Emacs and to try to show
the method in the madness that is the Emacs command structure.
";

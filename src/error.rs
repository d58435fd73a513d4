use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while compiling or running a command.
///
/// Parse failures abort `compile`; runtime failures abort `Program::run`
/// before anything is committed, leaving the host buffer untouched.
#[derive(Debug, Error)]
pub enum Error {
    // --- syntax ---
    #[error("bad delimiter `{}`", byte_char(.0))]
    BadDelimiter(u8),
    #[error("no regular expression defined")]
    EmptyRegexp,
    #[error("unterminated regular expression")]
    UnterminatedRegexp,
    #[error("bad substitution right hand side")]
    BadRhs,
    #[error("regular expression expected")]
    RegexpExpected,
    #[error("address expected")]
    AddressExpected,
    #[error("command expected")]
    CommandExpected,
    #[error("newline expected{}", saw(.0))]
    ExpectedNewline(Option<u8>),
    #[error("bad address syntax")]
    BadAddressSyntax,
    #[error("bad compound address syntax")]
    BadCompoundAddress,
    #[error("command takes no address")]
    TakesNoAddress,
    #[error("unknown command `{}`", cmd_char(.0))]
    UnknownCommand(u16),
    #[error("right brace with no left brace")]
    UnmatchedBrace,
    #[error("newline expected after `=`")]
    BadReportSuffix,
    #[error("empty command")]
    EmptyProgram,
    #[error("bad regular expression: {0}")]
    BadRegexp(#[from] regex::Error),

    // --- range ---
    #[error("address out of range")]
    AddressOutOfRange,
    #[error("addresses out of order")]
    AddressesOutOfOrder,
    #[error("no match for regular expression")]
    NoMatch,
    #[error("move overlaps itself")]
    MoveOverlaps,
    #[error("invalid replacement offset `\\{0}`")]
    BadBackref(usize),

    // --- unsupported ---
    #[error("address `{0}` is not supported")]
    UnsupportedAddress(char),

    // --- host ---
    #[error("host i/o: {0}")]
    Io(#[from] io::Error),
    #[error("host: {0}")]
    Host(String),

    // --- invariant ---
    #[error("wrong number of inserted characters")]
    ShortInsert,
}

impl Error {
    /// Host-side failure with a custom message, for `File` implementations
    /// that reject an operation (e.g. composing into a read-only buffer).
    pub fn host(msg: impl Into<String>) -> Self {
        Error::Host(msg.into())
    }
}

fn byte_char(c: &u8) -> char {
    char::from(*c)
}

fn cmd_char(cmdc: &u16) -> char {
    char::from(*cmdc as u8)
}

fn saw(c: &Option<u8>) -> String {
    match c {
        Some(c) => format!(" (saw `{}`)", char::from(*c)),
        None => String::new(),
    }
}

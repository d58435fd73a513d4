//! Byte-level cursor over command text, plus the specialized extractors
//! the parser drives: numbers, regexps, substitution right hand sides,
//! text blocks, and terminated tokens.

use crate::error::{Error, Result};

pub(crate) struct Scanner<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Scanner {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn read(&mut self) -> Option<u8> {
        let c = self.src.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    pub(crate) fn unread(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
        }
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    /// Advance over spaces and tabs, then peek.
    pub(crate) fn peek_skip_blank(&mut self) -> Option<u8> {
        while let Some(b' ' | b'\t') = self.src.get(self.pos) {
            self.pos += 1;
        }
        self.peek()
    }

    /// Read a decimal number, with an optional leading `-` when `signed`.
    /// Returns `1` (or `-1` after a bare sign) when no digits follow.
    pub(crate) fn read_num(&mut self, signed: bool) -> i64 {
        let mut sign = 1i64;
        if signed && self.peek() == Some(b'-') {
            sign = -1;
            self.read();
        }
        match self.peek() {
            Some(c) if c.is_ascii_digit() => {}
            _ => return sign,
        }
        let mut n = 0i64;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            n = n.saturating_mul(10).saturating_add(i64::from(c - b'0'));
            self.read();
        }
        sign * n
    }

    /// Read regexp source up to an unescaped `delim` or newline.
    /// `\<delim>` yields a literal delimiter; `\\` passes through for the
    /// regexp compiler; everything else is kept verbatim.
    pub(crate) fn read_regexp(&mut self, delim: u8) -> Result<String> {
        let mut buf = Vec::new();
        let terminator;
        loop {
            let mut c = self.read().ok_or(Error::UnterminatedRegexp)?;
            if c == b'\\' {
                match self.peek() {
                    Some(e) if e == delim => {
                        c = self.read().ok_or(Error::UnterminatedRegexp)?;
                    }
                    Some(b'\\') => {
                        buf.push(c);
                        c = self.read().ok_or(Error::UnterminatedRegexp)?;
                    }
                    _ => {}
                }
            } else if c == delim || c == b'\n' {
                terminator = c;
                break;
            }
            buf.push(c);
        }
        if terminator != delim {
            self.unread();
        }
        if buf.is_empty() {
            return Err(Error::EmptyRegexp);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Read a substitution replacement up to an unescaped `delim` or
    /// newline (the terminator is pushed back). `\n` becomes a newline,
    /// `\<delim>` a literal delimiter; for `s` every other `\x` survives
    /// as `\x` so back-references reach the replacement expander; a `\`
    /// dangling at end of line demotes to a literal backslash.
    pub(crate) fn read_rhs(&mut self, delim: u8, cmdc: u8) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut terminated = false;
        loop {
            let Some(mut c) = self.read() else { break };
            if c == delim || c == b'\n' {
                terminated = true;
                break;
            }
            if c == b'\\' {
                c = self.read().ok_or(Error::BadRhs)?;
                if c == b'\n' {
                    self.unread();
                    c = b'\\';
                } else if c == b'n' {
                    c = b'\n';
                } else if c != delim && (cmdc == b's' || c != b'\\') {
                    buf.push(b'\\');
                }
            }
            buf.push(c);
        }
        if terminated {
            self.unread();
        }
        Ok(buf)
    }

    /// Read command text: either a dot-terminated block (when the rest of
    /// the current line is blank) or a delimited form shaped like an RHS.
    pub(crate) fn read_text(&mut self) -> Result<Vec<u8>> {
        if self.peek_skip_blank() == Some(b'\n') {
            self.read();
            let mut buf = Vec::new();
            loop {
                let mut line = Vec::new();
                let mut eof = false;
                loop {
                    match self.read() {
                        None => {
                            eof = true;
                            break;
                        }
                        Some(b'\n') => break,
                        Some(c) => line.push(c),
                    }
                }
                line.push(b'\n');
                if eof {
                    buf.extend_from_slice(&line);
                    return Ok(buf);
                }
                if line == b".\n" {
                    return Ok(buf);
                }
                buf.extend_from_slice(&line);
            }
        }
        let delim = self.read().ok_or(Error::ExpectedNewline(None))?;
        ok_delimiter(delim)?;
        let text = self.read_rhs(delim, b'a')?;
        if self.peek() == Some(delim) {
            self.read();
        }
        self.assert_line_end()?;
        Ok(text)
    }

    /// Read up to a terminating byte, preserving leading blanks.
    pub(crate) fn read_token(&mut self, terminators: &[u8]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        while let Some(c @ (b' ' | b'\t')) = self.peek() {
            self.read();
            buf.push(c);
        }
        let mut last = None;
        while let Some(c) = self.read() {
            if terminators.contains(&c) {
                last = Some(c);
                break;
            }
            buf.push(c);
        }
        if last != Some(b'\n') {
            self.assert_line_end()?;
        }
        Ok(buf)
    }

    /// Require that the next non-blank byte is a newline, consuming it.
    pub(crate) fn assert_line_end(&mut self) -> Result<()> {
        self.peek_skip_blank();
        match self.read() {
            Some(b'\n') => Ok(()),
            other => Err(Error::ExpectedNewline(other)),
        }
    }
}

/// A regexp or RHS delimiter may be any byte that is not a backslash and
/// not alphanumeric.
pub(crate) fn ok_delimiter(c: u8) -> Result<()> {
    if c == b'\\' || c.is_ascii_alphanumeric() {
        return Err(Error::BadDelimiter(c));
    }
    Ok(())
}

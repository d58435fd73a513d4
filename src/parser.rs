//! Two-phase parser for the command language: simple addresses, compound
//! addresses, and commands (with `{…}` grouping handled by nesting).
//!
//! The AST is an owned tree. `Addr` nodes chain through `next` (suffixes,
//! or the right side of `,`/`;`, whose left side hangs off `left`); `Cmd`
//! nodes chain through `next` only as siblings inside a group.

use crate::error::{Error, Result};
use crate::exec::{lookup, Count, DefAddr};
use crate::scanner::{ok_delimiter, Scanner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AddrKind {
    /// `#n` byte offset.
    CharOffset(i64),
    /// `n` line number (1-based).
    Line(i64),
    /// `.` current dot.
    Dot,
    /// `$` end of buffer.
    End,
    /// `*` whole buffer.
    All,
    /// `/re/` forward search.
    Forward(String),
    /// `?re?` backward search.
    Backward(String),
    Plus,
    Minus,
    Comma,
    Semi,
    /// `'` mark; parses but cannot be evaluated.
    Mark,
    /// `"re"` file selector; parses but cannot be evaluated.
    FileSel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Addr {
    pub kind: AddrKind,
    /// Left side of `,` and `;` only.
    pub left: Option<Box<Addr>>,
    /// Suffix chain, or the right side of `,` and `;`.
    pub next: Option<Box<Addr>>,
}

impl Addr {
    pub(crate) fn bare(kind: AddrKind) -> Self {
        Addr {
            kind,
            left: None,
            next: None,
        }
    }
}

/// Distinguishes the two-byte `cd` opcode from plain `c` while keeping
/// the command character in the low byte.
pub(crate) const CMD_ALIAS_BIT: u16 = 0x100;

#[derive(Debug, Clone)]
pub(crate) struct Cmd {
    pub cmdc: u16,
    pub addr: Option<Box<Addr>>,
    pub re: Option<String>,
    pub text: Option<Vec<u8>>,
    /// Destination address for `m` and `t`.
    pub mtaddr: Option<Box<Addr>>,
    /// Loop body or default sub-command.
    pub cmd: Option<Box<Cmd>>,
    /// Next sibling, only inside `{…}`.
    pub next: Option<Box<Cmd>>,
    /// Substitution count.
    pub num: i64,
    /// Holds `g` to mark a global substitution.
    pub flag: u8,
}

impl Cmd {
    pub(crate) fn bare(cmdc: u16) -> Self {
        Cmd {
            cmdc,
            addr: None,
            re: None,
            text: None,
            mtaddr: None,
            cmd: None,
            next: None,
            num: 0,
            flag: 0,
        }
    }
}

pub(crate) fn parse_simple_addr(s: &mut Scanner) -> Result<Option<Addr>> {
    let Some(ch) = s.peek_skip_blank() else {
        return Ok(None);
    };
    let kind = match ch {
        b'#' => {
            s.read();
            AddrKind::CharOffset(s.read_num(false))
        }
        b'0'..=b'9' => AddrKind::Line(s.read_num(false)),
        b'/' | b'?' | b'"' => {
            s.read();
            let re = s.read_regexp(ch)?;
            match ch {
                b'/' => AddrKind::Forward(re),
                b'?' => AddrKind::Backward(re),
                _ => AddrKind::FileSel(re),
            }
        }
        b'.' => {
            s.read();
            AddrKind::Dot
        }
        b'$' => {
            s.read();
            AddrKind::End
        }
        b'*' => {
            s.read();
            AddrKind::All
        }
        b'+' => {
            s.read();
            AddrKind::Plus
        }
        b'-' => {
            s.read();
            AddrKind::Minus
        }
        b'\'' => {
            s.read();
            AddrKind::Mark
        }
        _ => return Ok(None),
    };
    let mut addr = Addr::bare(kind);
    addr.next = parse_simple_addr(s)?.map(Box::new);
    let needs_plus = match addr.next.as_deref() {
        None => false,
        Some(next) => match &next.kind {
            AddrKind::Dot | AddrKind::End | AddrKind::Mark => {
                if !matches!(addr.kind, AddrKind::FileSel(_)) {
                    return Err(Error::BadAddressSyntax);
                }
                false
            }
            AddrKind::FileSel(_) => return Err(Error::BadAddressSyntax),
            AddrKind::Line(_) | AddrKind::CharOffset(_)
                if matches!(addr.kind, AddrKind::FileSel(_)) =>
            {
                false
            }
            AddrKind::Line(_)
            | AddrKind::CharOffset(_)
            | AddrKind::Forward(_)
            | AddrKind::Backward(_) => !matches!(addr.kind, AddrKind::Plus | AddrKind::Minus),
            AddrKind::Plus | AddrKind::Minus => false,
            AddrKind::All | AddrKind::Comma | AddrKind::Semi => {
                return Err(Error::BadAddressSyntax)
            }
        },
    };
    if needs_plus {
        // An implicit `+` joins the suffix: `1/re/` means `1+/re/`.
        let tail = addr.next.take();
        let mut plus = Addr::bare(AddrKind::Plus);
        plus.next = tail;
        addr.next = Some(Box::new(plus));
    }
    Ok(Some(addr))
}

pub(crate) fn parse_compound_addr(s: &mut Scanner) -> Result<Option<Addr>> {
    let left = parse_simple_addr(s)?;
    let sep = match s.peek_skip_blank() {
        Some(c @ (b',' | b';')) => c,
        _ => return Ok(left),
    };
    s.read();
    let next = parse_compound_addr(s)?;
    if let Some(n) = &next {
        if matches!(n.kind, AddrKind::Comma | AddrKind::Semi) && n.left.is_none() {
            return Err(Error::BadCompoundAddress);
        }
    }
    Ok(Some(Addr {
        kind: if sep == b',' {
            AddrKind::Comma
        } else {
            AddrKind::Semi
        },
        left: left.map(Box::new),
        next: next.map(Box::new),
    }))
}

/// Parse one command (and, for `{`, its children). Returns `None` at end
/// of input, or when a `}` closes the group at `nest > 0`.
pub(crate) fn parse_cmd(s: &mut Scanner, nest: usize) -> Result<Option<Cmd>> {
    let addr = parse_compound_addr(s)?;
    if s.peek_skip_blank().is_none() {
        return Ok(None);
    }
    let Some(c) = s.read() else {
        return Ok(None);
    };
    let mut cmd = Cmd::bare(u16::from(c));
    cmd.addr = addr.map(Box::new);
    if c == b'c' && s.peek() == Some(b'd') {
        s.read();
        cmd.cmdc = u16::from(b'c') | CMD_ALIAS_BIT;
    }
    let Some(ct) = lookup(cmd.cmdc) else {
        match c {
            b'{' => {
                let mut children = Vec::new();
                loop {
                    if s.peek_skip_blank() == Some(b'\n') {
                        s.read();
                    }
                    match parse_cmd(s, nest + 1)? {
                        Some(child) => children.push(child),
                        None => break,
                    }
                }
                let mut head = None;
                for child in children.into_iter().rev() {
                    let mut boxed = Box::new(child);
                    boxed.next = head.take();
                    head = Some(boxed);
                }
                cmd.cmd = head;
                return Ok(Some(cmd));
            }
            b'}' => {
                s.assert_line_end()?;
                if nest == 0 {
                    return Err(Error::UnmatchedBrace);
                }
                return Ok(None);
            }
            _ => return Err(Error::UnknownCommand(cmd.cmdc)),
        }
    };

    if cmd.cmdc == u16::from(b'\n') {
        return Ok(Some(cmd));
    }
    if ct.defaddr == DefAddr::None && cmd.addr.is_some() {
        return Err(Error::TakesNoAddress);
    }
    match ct.count {
        Count::None => {}
        Count::Unsigned => cmd.num = s.read_num(false),
        Count::Signed => cmd.num = s.read_num(true),
    }
    if ct.regexp {
        // `x` and `y` fall back to line iteration when no pattern follows.
        let bare_loop = matches!(cmd.cmdc as u8, b'x' | b'y')
            && matches!(s.peek(), Some(b' ' | b'\t' | b'\n'));
        if !bare_loop {
            s.peek_skip_blank();
            let delim = s.read().ok_or(Error::RegexpExpected)?;
            if delim == b'\n' {
                return Err(Error::RegexpExpected);
            }
            ok_delimiter(delim)?;
            cmd.re = Some(s.read_regexp(delim)?);
            if cmd.cmdc == u16::from(b's') {
                cmd.text = Some(s.read_rhs(delim, b's')?);
                if s.peek() == Some(delim) {
                    s.read();
                    if s.peek() == Some(b'g') {
                        s.read();
                        cmd.flag = b'g';
                    }
                }
            }
        }
    }
    if ct.addr {
        let mtaddr = parse_simple_addr(s)?.ok_or(Error::AddressExpected)?;
        cmd.mtaddr = Some(Box::new(mtaddr));
    }
    if let Some(defcmd) = ct.defcmd {
        if s.peek_skip_blank() == Some(b'\n') {
            s.read();
            cmd.cmd = Some(Box::new(Cmd::bare(u16::from(defcmd))));
        } else {
            let sub = parse_cmd(s, nest)?.ok_or(Error::CommandExpected)?;
            cmd.cmd = Some(Box::new(sub));
        }
    } else if ct.text {
        cmd.text = Some(s.read_text()?);
    } else if let Some(terminators) = ct.token {
        cmd.text = Some(s.read_token(terminators)?);
    } else {
        s.assert_line_end()?;
    }
    Ok(Some(cmd))
}

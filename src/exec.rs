//! Command dispatch: the per-opcode descriptor table, default-address
//! resolution, the loop combinators (`x`, `y`, `g`, `v`, `{…}`), the
//! substitution engine, and positional printing.

use std::io::{self, Write};

use tracing::trace;

use crate::address::{self, line_address, read_one};
use crate::error::{Error, Result};
use crate::parser::{Addr, AddrKind, Cmd};
use crate::pattern::Pattern;
use crate::staged::Staged;
use crate::types::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefAddr {
    None,
    Dot,
    All,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Count {
    None,
    #[allow(dead_code)]
    Unsigned,
    Signed,
}

/// Static descriptor for one opcode: which arguments follow it and how
/// its missing address/body default.
pub(crate) struct CmdTab {
    pub cmdc: u16,
    pub text: bool,
    pub regexp: bool,
    pub addr: bool,
    pub defcmd: Option<u8>,
    pub defaddr: DefAddr,
    pub count: Count,
    pub token: Option<&'static [u8]>,
}

const LINE_TOKENS: &[u8] = b"\n";

macro_rules! row {
    ($cmdc:expr, $text:expr, $regexp:expr, $addr:expr, $defcmd:expr, $defaddr:expr, $count:expr, $token:expr) => {
        CmdTab {
            cmdc: $cmdc as u16,
            text: $text,
            regexp: $regexp,
            addr: $addr,
            defcmd: $defcmd,
            defaddr: $defaddr,
            count: $count,
            token: $token,
        }
    };
}

#[rustfmt::skip]
static CMDTAB: &[CmdTab] = &[
    //   cmdc  text   regexp addr   defcmd      defaddr       count          token
    row!(b'\n', false, false, false, None,       DefAddr::Dot, Count::None,   None),
    row!(b'a',  true,  false, false, None,       DefAddr::Dot, Count::None,   None),
    row!(b'c',  true,  false, false, None,       DefAddr::Dot, Count::None,   None),
    row!(b'd',  false, false, false, None,       DefAddr::Dot, Count::None,   None),
    row!(b'g',  false, true,  false, Some(b'p'), DefAddr::Dot, Count::None,   None),
    row!(b'i',  true,  false, false, None,       DefAddr::Dot, Count::None,   None),
    row!(b'm',  false, false, true,  None,       DefAddr::Dot, Count::None,   None),
    row!(b'p',  false, false, false, None,       DefAddr::Dot, Count::None,   None),
    row!(b's',  false, true,  false, None,       DefAddr::Dot, Count::Signed, None),
    row!(b't',  false, false, true,  None,       DefAddr::Dot, Count::None,   None),
    row!(b'v',  false, true,  false, Some(b'p'), DefAddr::Dot, Count::None,   None),
    row!(b'x',  false, true,  false, Some(b'p'), DefAddr::Dot, Count::None,   None),
    row!(b'y',  false, true,  false, Some(b'p'), DefAddr::Dot, Count::None,   None),
    row!(b'=',  false, false, false, None,       DefAddr::Dot, Count::None,   Some(LINE_TOKENS)),
];

pub(crate) fn lookup(cmdc: u16) -> Option<&'static CmdTab> {
    CMDTAB.iter().find(|row| row.cmdc == cmdc)
}

/// Execution state for one program run: the staged buffer plus the
/// optional printer that `p` and `=` write to.
pub(crate) struct Machine<'a> {
    pub file: Staged<'a>,
    pub printer: Option<&'a mut dyn Write>,
}

pub(crate) fn exec_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    trace!(cmdc = %char::from(cmd.cmdc as u8), "dispatch");
    let ct = lookup(cmd.cmdc);
    if let Some(ct) = ct {
        if ct.defaddr != DefAddr::None {
            let newline = cmd.cmdc == u16::from(b'\n');
            let addr: Option<Addr> = match cmd.addr.as_deref() {
                None if !newline => Some(Addr::bare(default_kind(ct.defaddr))),
                Some(a)
                    if !newline && matches!(a.kind, AddrKind::FileSel(_)) && a.next.is_none() =>
                {
                    // A bare file selector gets the command's default tail.
                    let mut a = a.clone();
                    a.next = Some(Box::new(Addr::bare(default_kind(ct.defaddr))));
                    Some(a)
                }
                other => other.cloned(),
            };
            if let Some(a) = &addr {
                let span = address::eval(a, &mut m.file, 0)?;
                m.file.select(span.q0, span.q1);
            }
        }
    }
    if cmd.cmdc == u16::from(b'{') {
        return brace_cmd(m, cmd);
    }
    if ct.is_none() {
        return Err(Error::UnknownCommand(cmd.cmdc));
    }
    match cmd.cmdc as u8 {
        b'\n' => nl_cmd(m, cmd),
        b'a' => a_cmd(m, cmd),
        b'c' => c_cmd(m, cmd),
        b'd' => d_cmd(m),
        b'g' | b'v' => g_cmd(m, cmd),
        b'i' => i_cmd(m, cmd),
        b'm' => m_cmd(m, cmd),
        b'p' => p_cmd(m),
        b's' => s_cmd(m, cmd),
        b't' => t_cmd(m, cmd),
        b'x' | b'y' => x_cmd(m, cmd),
        b'=' => eq_cmd(m, cmd),
        _ => Err(Error::UnknownCommand(cmd.cmdc)),
    }
}

fn default_kind(defaddr: DefAddr) -> AddrKind {
    match defaddr {
        DefAddr::All => AddrKind::All,
        _ => AddrKind::Dot,
    }
}

/// `{…}`: evaluate the group address if any, then run each child with dot
/// reset to the snapshot taken on entry.
fn brace_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    if let Some(a) = &cmd.addr {
        let span = address::eval(a, &mut m.file, 0)?;
        m.file.select(span.q0, span.q1);
    }
    let (q0, q1) = m.file.dot();
    let mut child = cmd.cmd.as_deref();
    while let Some(c) = child {
        m.file.select(q0, q1);
        exec_cmd(m, c)?;
        child = c.next.as_deref();
    }
    Ok(())
}

/// Bare newline: advance dot to cover the current line, or to the next
/// line when it already covers one exactly.
fn nl_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    let (q0, q1) = m.file.dot();
    let mut span = Span::new(q0, q1);
    if cmd.addr.is_none() {
        let mut a = line_address(&m.file, 0, -1, span)?;
        let fwd = line_address(&m.file, 0, 1, span)?;
        a.q1 = fwd.q1;
        if a.q0 == q0 && a.q1 == q1 {
            a = line_address(&m.file, 1, 1, span)?;
        }
        span = a;
    }
    m.file.select(span.q0, span.q1);
    Ok(())
}

fn a_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    let (_, q1) = m.file.dot();
    insert_checked(m, cmd.text.as_deref().unwrap_or_default(), q1)
}

fn i_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    let (q0, _) = m.file.dot();
    insert_checked(m, cmd.text.as_deref().unwrap_or_default(), q0)
}

fn c_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    let (q0, q1) = m.file.dot();
    replace_text(m, q0, q1, cmd.text.as_deref().unwrap_or_default())
}

fn d_cmd(m: &mut Machine) -> Result<()> {
    let (q0, q1) = m.file.dot();
    if q1 > q0 {
        m.file.delete(q0, q1);
    }
    Ok(())
}

fn insert_checked(m: &mut Machine, data: &[u8], at: usize) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    if m.file.insert(data, at) != data.len() {
        return Err(Error::ShortInsert);
    }
    Ok(())
}

fn replace_text(m: &mut Machine, q0: usize, q1: usize, data: &[u8]) -> Result<()> {
    if q1 > q0 {
        m.file.delete(q0, q1);
    }
    insert_checked(m, data, q0)
}

/// `g` runs the child when dot matches the pattern, `v` when it does not.
fn g_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    let re = Pattern::compile(cmd.re.as_deref().unwrap_or_default())?;
    let (q0, q1) = m.file.dot();
    let window = m.file.window(q0, q1)?;
    let matched = re.find(&window).is_some();
    let inverse = cmd.cmdc == u16::from(b'v');
    if matched != inverse {
        let child = cmd.cmd.as_deref().ok_or(Error::CommandExpected)?;
        m.file.select(q0, q1);
        exec_cmd(m, child)?;
    }
    Ok(())
}

fn m_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    let mtaddr = cmd.mtaddr.as_deref().ok_or(Error::AddressExpected)?;
    let dst = address::eval(mtaddr, &mut m.file, 0)?;
    let (q0, q1) = m.file.dot();
    if q1 <= q0 || (q0 == dst.q0 && q1 == dst.q1) {
        return Ok(());
    }
    if q1 > dst.q0 && q0 < dst.q1 {
        return Err(Error::MoveOverlaps);
    }
    let data = m.file.window(q0, q1)?;
    m.file.delete(q0, q1);
    m.file.insert(&data, dst.q1);
    Ok(())
}

fn t_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    let mtaddr = cmd.mtaddr.as_deref().ok_or(Error::AddressExpected)?;
    let dst = address::eval(mtaddr, &mut m.file, 0)?;
    let (q0, q1) = m.file.dot();
    if q1 <= q0 {
        return Ok(());
    }
    let data = m.file.window(q0, q1)?;
    m.file.insert(&data, dst.q1);
    Ok(())
}

fn p_cmd(m: &mut Machine) -> Result<()> {
    let (q0, q1) = m.file.dot();
    if let Some(printer) = m.printer.as_deref_mut() {
        let mut reader = m.file.reader(q0, q1);
        io::copy(&mut reader, printer)?;
    }
    m.file.select(q0, q1);
    Ok(())
}

/// Substitution. Matches are collected over the pre-edit window of dot,
/// skipping zero-width matches that touch the previous terminator, then
/// replacements are staged one by one at the pre-edit coordinates.
fn s_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    let re = Pattern::compile(cmd.re.as_deref().unwrap_or_default())?;
    let (q0, q1) = m.file.dot();
    let window = m.file.window(q0, q1)?;
    let rhs = cmd.text.as_deref().unwrap_or_default();
    let global = cmd.flag == b'g';

    let mut sets = Vec::new();
    let mut n = if cmd.num == 0 { 1 } else { cmd.num };
    let mut prev_end: Option<usize> = None;
    let mut p1 = q0;
    while p1 <= q1 {
        let Some(caps) = re.captures(&window[p1 - q0..]) else {
            break;
        };
        let whole = caps.whole.shifted(p1);
        let groups: Vec<Option<Span>> = caps
            .groups
            .iter()
            .map(|g| g.map(|s| s.shifted(p1)))
            .collect();
        if whole.is_empty() {
            if prev_end == Some(whole.q0) {
                p1 += 1;
                continue;
            }
            p1 = whole.q1 + 1;
        } else {
            p1 = whole.q1;
        }
        prev_end = Some(whole.q1);
        n -= 1;
        if n > 0 {
            continue;
        }
        sets.push((whole, groups));
        if !global {
            break;
        }
    }

    for (whole, groups) in &sets {
        let replacement = expand_rhs(rhs, *whole, groups, &window, q0)?;
        replace_text(m, whole.q0, whole.q1, &replacement)?;
    }
    Ok(())
}

/// Expand a substitution RHS for one match: `&` is the whole match,
/// `\1`..`\9` a capture group (error past the last group, empty for a
/// group that did not participate), any other `\x` is `x` itself.
fn expand_rhs(
    rhs: &[u8],
    whole: Span,
    groups: &[Option<Span>],
    window: &[u8],
    base: usize,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(rhs.len());
    let mut i = 0;
    while i < rhs.len() {
        let c = rhs[i];
        if c == b'\\' && i + 1 < rhs.len() {
            i += 1;
            let e = rhs[i];
            if e.is_ascii_digit() && e != b'0' {
                let j = usize::from(e - b'0');
                if j >= groups.len() {
                    return Err(Error::BadBackref(j));
                }
                if let Some(g) = groups[j] {
                    out.extend_from_slice(&window[g.q0 - base..g.q1 - base]);
                }
            } else {
                out.push(e);
            }
        } else if c == b'&' {
            out.extend_from_slice(&window[whole.q0 - base..whole.q1 - base]);
        } else {
            out.push(c);
        }
        i += 1;
    }
    Ok(out)
}

/// `x`/`y` with a pattern loop over matches (or the gaps between them);
/// without one they loop line by line.
fn x_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    if cmd.re.is_some() {
        looper(m, cmd, cmd.cmdc == u16::from(b'x'))
    } else {
        line_looper(m, cmd)
    }
}

fn looper(m: &mut Machine, cmd: &Cmd, is_x: bool) -> Result<()> {
    let re = Pattern::compile(cmd.re.as_deref().unwrap_or_default())?;
    let child = cmd.cmd.as_deref().ok_or(Error::CommandExpected)?;
    let (q0, q1) = m.file.dot();
    let window = m.file.window(q0, q1)?;

    let mut ranges = Vec::new();
    let mut gap_start = q0;
    let mut prev_end = if is_x { None } else { Some(q0) };
    let mut p = q0;
    while p < q1 {
        match re.find(&window[p - q0..]) {
            None => {
                if is_x || gap_start > q1 {
                    break;
                }
                ranges.push(Span::new(gap_start, q1));
                break;
            }
            Some(hit) => {
                let hit = hit.shifted(p);
                if hit.is_empty() {
                    if prev_end == Some(hit.q0) {
                        p += 1;
                        continue;
                    }
                    p = hit.q1 + 1;
                } else {
                    p = hit.q1;
                }
                ranges.push(if is_x {
                    hit
                } else {
                    Span::new(gap_start, hit.q0)
                });
                gap_start = hit.q1;
                prev_end = Some(hit.q1);
            }
        }
    }
    loop_cmd(m, child, &ranges)
}

fn line_looper(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    let child = cmd.cmd.as_deref().ok_or(Error::CommandExpected)?;
    let (q0, q1) = m.file.dot();
    let mut a3 = Span::new(q0, q0);
    let mut line = line_address(&m.file, 0, 1, a3)?;
    let mut ranges = Vec::new();
    let mut p = q0;
    while p < q1 {
        a3.q0 = a3.q1;
        if p != q0 || line.q1 == p {
            line = line_address(&m.file, 1, 1, a3)?;
        }
        if line.q0 >= q1 {
            break;
        }
        if line.q1 >= q1 {
            line.q1 = q1;
        }
        if line.q1 > line.q0 && line.q0 >= a3.q1 && line.q1 > a3.q1 {
            a3 = line;
            ranges.push(line);
            p = a3.q1;
            continue;
        }
        break;
    }
    loop_cmd(m, child, &ranges)
}

/// Drive the child once per range, each time with dot set to the range.
/// Ranges are in pre-edit coordinates; the staged layer reconciles them
/// with whatever earlier iterations changed.
fn loop_cmd(m: &mut Machine, child: &Cmd, ranges: &[Span]) -> Result<()> {
    for r in ranges {
        m.file.select(r.q0, r.q1);
        exec_cmd(m, child)?;
    }
    Ok(())
}

enum Posn {
    Line,
    Chars,
    LineChars,
}

fn eq_cmd(m: &mut Machine, cmd: &Cmd) -> Result<()> {
    let mode = match cmd.text.as_deref().unwrap_or_default() {
        b"" => Posn::Line,
        b"#" => Posn::Chars,
        b"+" => Posn::LineChars,
        _ => return Err(Error::BadReportSuffix),
    };
    print_posn(m, mode)
}

fn print_posn(m: &mut Machine, mode: Posn) -> Result<()> {
    let (q0, q1) = m.file.dot();
    let report = match mode {
        Posn::Chars => {
            if q1 != q0 {
                format!("#{q0},#{q1}\n")
            } else {
                format!("#{q0}\n")
            }
        }
        Posn::Line => {
            let (n1, _) = line_ending_count(&m.file, 0, q0)?;
            let l1 = n1 + 1;
            let (n2, _) = line_ending_count(&m.file, q0, q1)?;
            let mut l2 = l1 + n2;
            if q1 > 0 && q1 > q0 {
                // A selection ending exactly on a newline reports the line
                // it terminates, not the one after.
                let mut reader = m.file.reader(q1 - 1, q1);
                if read_one(&mut reader)? == Some(b'\n') {
                    l2 -= 1;
                }
            }
            if l2 != l1 {
                format!("{l1},{l2}\n")
            } else {
                format!("{l1}\n")
            }
        }
        Posn::LineChars => {
            let (n1, r1) = line_ending_count(&m.file, 0, q0)?;
            let l1 = n1 + 1;
            let (n2, r2) = line_ending_count(&m.file, q0, q1)?;
            let l2 = l1 + n2;
            if l2 != l1 {
                format!("{l1}+#{r1},{l2}+#{r2}\n")
            } else {
                format!("{l1}+#{r1}\n")
            }
        }
    };
    if let Some(printer) = m.printer.as_deref_mut() {
        printer.write_all(report.as_bytes())?;
    }
    Ok(())
}

/// Count newlines in `[q0, q1)` and the distance from the last line start
/// to `q1`.
fn line_ending_count(file: &Staged, q0: usize, q1: usize) -> Result<(usize, usize)> {
    let mut newlines = 0;
    let mut start = q0;
    let mut p = q0;
    let mut reader = file.reader(q0, q1);
    while p < q1 {
        let Some(b) = read_one(&mut reader)? else {
            break;
        };
        if b == b'\n' {
            start = p + 1;
            newlines += 1;
        }
        p += 1;
    }
    Ok((newlines, p - start))
}

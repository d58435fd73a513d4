//! Address evaluation: turns an [`Addr`] chain into a byte range against
//! the staged buffer snapshot, threading the `+`/`-`/`?` sign through the
//! chain the way Sam does.

use std::io::{Read, Seek, SeekFrom};

use crate::error::{Error, Result};
use crate::parser::{Addr, AddrKind};
use crate::pattern::Pattern;
use crate::staged::Staged;
use crate::traits::ReadSeek;
use crate::types::Span;

/// Evaluate an address chain. `sign` is 0 at top level; `+`, `-`, and `?`
/// set it for the nodes that follow.
pub(crate) fn eval(addr: &Addr, file: &mut Staged, mut sign: i64) -> Result<Span> {
    let (q0, q1) = file.dot();
    let mut r = Span::new(q0, q1);
    let mut cur = Some(addr);
    while let Some(a) = cur {
        match &a.kind {
            AddrKind::CharOffset(num) => {
                let n = usize::try_from(*num).map_err(|_| Error::AddressOutOfRange)?;
                if sign == 0 {
                    r = Span::point(n);
                } else if sign < 0 {
                    let p = r.q0.checked_sub(n).ok_or(Error::AddressOutOfRange)?;
                    r = Span::point(p);
                } else {
                    r = Span::point(r.q1.saturating_add(n));
                }
                if r.q0 > file.len() {
                    return Err(Error::AddressOutOfRange);
                }
            }
            AddrKind::Line(num) => {
                r = line_address(file, *num, sign, r)?;
            }
            AddrKind::Dot => {}
            AddrKind::End => {
                r = Span::point(file.len());
            }
            AddrKind::All => {
                r = Span::new(0, file.len());
            }
            AddrKind::Mark => return Err(Error::UnsupportedAddress('\'')),
            AddrKind::FileSel(_) => return Err(Error::UnsupportedAddress('"')),
            AddrKind::Forward(re) | AddrKind::Backward(re) => {
                if matches!(a.kind, AddrKind::Backward(_)) {
                    sign = -sign;
                    if sign == 0 {
                        sign = -1;
                    }
                }
                let (start, end) = if sign < 0 {
                    (0, r.q0)
                } else {
                    (r.q1, file.len())
                };
                r = regexp_search(re, file, start, end, sign)?.ok_or(Error::NoMatch)?;
            }
            AddrKind::Comma | AddrKind::Semi => {
                let lhs = match &a.left {
                    Some(left) => eval(left, file, 0)?,
                    None => Span::new(0, 0),
                };
                if matches!(a.kind, AddrKind::Semi) {
                    file.select(lhs.q0, lhs.q1);
                }
                let rhs = match &a.next {
                    Some(next) => eval(next, file, 0)?,
                    None => Span::point(file.len()),
                };
                let out = Span::new(lhs.q0, rhs.q1);
                if out.q1 < out.q0 {
                    return Err(Error::AddressesOutOfOrder);
                }
                return Ok(out);
            }
            AddrKind::Plus | AddrKind::Minus => {
                sign = if matches!(a.kind, AddrKind::Minus) {
                    -1
                } else {
                    1
                };
                let next_is_sign = matches!(
                    a.next.as_deref(),
                    None | Some(Addr {
                        kind: AddrKind::Plus | AddrKind::Minus,
                        ..
                    })
                );
                if next_is_sign {
                    // A bare sign is a one-line relative move.
                    r = line_address(file, 1, sign, r)?;
                }
            }
        }
        cur = a.next.as_deref();
    }
    Ok(r)
}

/// Resolve the `n`-th line relative to `cur`, forward when `sign >= 0`
/// (counting newlines from the start of the buffer, or from `cur.q1` when
/// a sign is set), backward when `sign < 0` (counting line starts before
/// `cur.q0`). The result always spans a whole line, trailing newline
/// included.
pub(crate) fn line_address(file: &Staged, n: i64, sign: i64, cur: Span) -> Result<Span> {
    let file_len = file.len();
    let (q0, q1) = (cur.q0, cur.q1);
    if sign >= 0 {
        let mut p;
        let r0;
        if n == 0 {
            if sign == 0 || q1 == 0 {
                return Ok(Span::new(0, 0));
            }
            r0 = q1;
            p = q1 - 1;
        } else {
            let mut count;
            let mut reader;
            if sign == 0 || q1 == 0 {
                p = 0;
                count = 1;
                reader = file.reader(p, file_len);
            } else {
                p = q1 - 1;
                count = 0;
                reader = file.reader(p, file_len);
                if let Some(b) = read_one(&mut reader)? {
                    if b == b'\n' {
                        count = 1;
                    }
                }
                p += 1;
            }
            while count < n {
                match read_one(&mut reader)? {
                    None => return Err(Error::AddressOutOfRange),
                    Some(b) => {
                        p += 1;
                        if b == b'\n' {
                            count += 1;
                        }
                    }
                }
            }
            r0 = p;
        }
        let mut reader = file.reader(p, file_len);
        while let Some(b) = read_one(&mut reader)? {
            p += 1;
            if b == b'\n' {
                break;
            }
        }
        Ok(Span::new(r0, p))
    } else {
        let mut p = q0;
        let mut reader = file.reader(0, q0);
        let r1;
        if n == 0 {
            r1 = q0;
        } else {
            let mut count = 0;
            while count < n {
                if p == 0 {
                    count += 1;
                    if count != n {
                        return Err(Error::AddressOutOfRange);
                    }
                } else {
                    let b = byte_at(&mut reader, p - 1)?;
                    if b != b'\n' {
                        p -= 1;
                    } else {
                        count += 1;
                        if count != n {
                            p -= 1;
                        }
                    }
                }
            }
            r1 = p;
            if p > 0 {
                p -= 1;
            }
        }
        while p > 0 {
            if byte_at(&mut reader, p - 1)? == b'\n' {
                break;
            }
            p -= 1;
        }
        Ok(Span::new(p, r1))
    }
}

/// Search `[start, end)` of the snapshot. Forward returns the first match;
/// backward (`sign < 0`) the last. No wrap-around at buffer boundaries.
fn regexp_search(
    pattern: &str,
    file: &Staged,
    start: usize,
    end: usize,
    sign: i64,
) -> Result<Option<Span>> {
    let re = Pattern::compile(pattern)?;
    let window = file.window(start, end)?;
    let hit = if sign < 0 {
        re.find_last(&window)
    } else {
        re.find(&window)
    };
    Ok(hit.map(|s| s.shifted(start)))
}

/// Read the next byte of a window, `None` at its end.
pub(crate) fn read_one(reader: &mut Box<dyn ReadSeek + '_>) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Read the byte at window-relative offset `off`.
fn byte_at(reader: &mut Box<dyn ReadSeek + '_>, off: usize) -> Result<u8> {
    reader.seek(SeekFrom::Start(off as u64))?;
    read_one(reader)?.ok_or(Error::AddressOutOfRange)
}

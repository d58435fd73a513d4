//! Thin adapter over the regex engine. Patterns always compile in
//! multiline mode so `^`/`$` match at line boundaries, and matching runs
//! over byte windows (buffers need not be valid UTF-8).

use regex::bytes::Regex;

use crate::error::Result;
use crate::types::Span;

pub(crate) struct Pattern {
    re: Regex,
}

/// Capture spans for one match, window-relative. `groups[0]` is the whole
/// match; a group that did not participate is `None`.
pub(crate) struct SubMatches {
    pub whole: Span,
    pub groups: Vec<Option<Span>>,
}

impl Pattern {
    pub(crate) fn compile(src: &str) -> Result<Self> {
        let re = Regex::new(&format!("(?m){src}"))?;
        Ok(Pattern { re })
    }

    /// First match in `window`, window-relative.
    pub(crate) fn find(&self, window: &[u8]) -> Option<Span> {
        self.re.find(window).map(|m| Span::new(m.start(), m.end()))
    }

    /// First match with capture groups, window-relative.
    pub(crate) fn captures(&self, window: &[u8]) -> Option<SubMatches> {
        let caps = self.re.captures(window)?;
        let whole = caps.get(0)?;
        let groups = (0..caps.len())
            .map(|i| caps.get(i).map(|m| Span::new(m.start(), m.end())))
            .collect();
        Some(SubMatches {
            whole: Span::new(whole.start(), whole.end()),
            groups,
        })
    }

    /// Last match in `window`: repeated forward matching, remembering the
    /// final hit. There is no wrap-around; the window bounds the search.
    pub(crate) fn find_last(&self, window: &[u8]) -> Option<Span> {
        let mut last = None;
        let mut from = 0;
        while from <= window.len() {
            let Some(m) = self.find(&window[from..]) else {
                break;
            };
            let hit = m.shifted(from);
            // Step one past the end so zero-width matches make progress.
            from = hit.q1 + 1;
            last = Some(hit);
        }
        last
    }
}

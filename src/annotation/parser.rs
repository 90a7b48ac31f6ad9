//! Tokenizer for the annotation mini-language.
//!
//! Annotations are scanned out of free-form note text. A token looks like:
//!
//! ```text
//! [00:01:30-00:02:00, 80%, 1.25x]
//! [00:01:30-00:02:00, 80%, 1.25x, ->]
//! [00:01:30-00:02:00, 80%, 1.25x, |5]
//! ```
//!
//! `->` requests an auto-jump to the next declared interval when this one
//! ends; `|N` requests an N-second pause at the interval start. Tokens that
//! do not match the grammar exactly are skipped: they never abort the scan
//! and the surrounding text is free prose. Callers that want to surface the
//! skips (the default UX stays silent) use [`parse_with_diagnostics`].

use serde::Serialize;

use super::timestamp::parse_timestamp;

/// Follow-on behaviour attached to an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntervalAction {
    /// Apply settings only; playback continues normally past the end.
    None,
    /// At the interval end, continue at the next declared interval.
    AutoJump,
    /// Pause for the given number of seconds at the interval start.
    Pause { seconds: u32 },
}

/// One parsed annotation. Immutable once parsed; a text change reparses the
/// whole document and discards the old list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interval {
    /// Start of the playback window, in seconds.
    pub start: f64,
    /// End of the playback window, in seconds. Always `>= start`.
    pub end: f64,
    /// Volume to apply while the interval is active, 0-100.
    pub volume: u8,
    /// Playback rate to apply while the interval is active.
    pub speed: f64,
    /// Follow-on action.
    pub action: IntervalAction,
    /// 0-based declaration-order position within the source text. This is
    /// the engine's priority key: a later-declared interval may start
    /// earlier on the timeline, on purpose, so a note can revisit an
    /// earlier point of the media further down the page.
    pub index: usize,
    /// The exact matched source text, kept so a UI can locate the
    /// annotation again on click.
    pub raw: String,
}

impl Interval {
    /// Whether `t` falls inside the interval window, widened by `tolerance`
    /// on both sides.
    pub fn contains(&self, t: f64, tolerance: f64) -> bool {
        t >= self.start - tolerance && t <= self.end + tolerance
    }
}

/// Why a bracketed candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A timestamp field was malformed or out of range.
    Timestamp,
    /// The start timestamp is later than the end timestamp.
    StartAfterEnd,
    /// The volume field was malformed or above 100.
    Volume,
    /// The speed field was malformed or not positive.
    Speed,
    /// The `->` / `|N` suffix was malformed.
    Suffix,
    /// A separator or the closing bracket was missing.
    Delimiter,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::Timestamp => "malformed timestamp",
            SkipReason::StartAfterEnd => "start is after end",
            SkipReason::Volume => "malformed volume",
            SkipReason::Speed => "malformed speed",
            SkipReason::Suffix => "malformed action suffix",
            SkipReason::Delimiter => "missing separator or closing bracket",
        };
        f.write_str(text)
    }
}

/// A bracketed span that looked like an annotation but failed to parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSpan {
    /// Byte offset of the opening bracket in the source text.
    pub start: usize,
    /// Byte offset one past the span (closing bracket or end of line).
    pub end: usize,
    /// The rejected text.
    pub text: String,
    pub reason: SkipReason,
}

/// Result of a diagnostic parse: the interval list plus every rejected
/// candidate span.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub intervals: Vec<Interval>,
    pub skipped: Vec<SkippedSpan>,
}

/// Parse annotation tokens out of `text` in declaration order.
///
/// Malformed candidates are dropped silently; indices are assigned to valid
/// matches only, strictly left to right. The function is pure: the same
/// text always yields a structurally identical list.
pub fn parse(text: &str) -> Vec<Interval> {
    parse_with_diagnostics(text).intervals
}

/// Like [`parse`], but also reports every rejected candidate span so a host
/// can offer stricter feedback than the default silent skip.
pub fn parse_with_diagnostics(text: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let bytes = text.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'[' {
            pos += 1;
            continue;
        }

        // Only brackets opening directly onto a digit are annotation
        // candidates; anything else is prose like "[sic]".
        if !bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit()) {
            pos += 1;
            continue;
        }

        match match_token(&text[pos..]) {
            Ok((fields, len)) => {
                let index = outcome.intervals.len();
                outcome.intervals.push(fields.into_interval(index, &text[pos..pos + len]));
                pos += len;
            }
            Err(reason) => {
                let end = candidate_end(text, pos);
                outcome.skipped.push(SkippedSpan {
                    start: pos,
                    end,
                    text: text[pos..end].to_string(),
                    reason,
                });
                pos += 1;
            }
        }
    }

    outcome
}

/// End of a rejected candidate for diagnostics: through the next `]` on the
/// same line, or the end of the line.
fn candidate_end(text: &str, open: usize) -> usize {
    let rest = &text[open..];
    let line_len = rest.find('\n').unwrap_or(rest.len());
    match rest[..line_len].find(']') {
        Some(close) => open + close + 1,
        None => open + line_len,
    }
}

struct TokenFields {
    start: f64,
    end: f64,
    volume: u8,
    speed: f64,
    action: IntervalAction,
}

impl TokenFields {
    fn into_interval(self, index: usize, raw: &str) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
            volume: self.volume,
            speed: self.speed,
            action: self.action,
            index,
            raw: raw.to_string(),
        }
    }
}

/// Match one full token at the start of `input` (which begins at `[`).
///
/// Returns the parsed fields and the total matched length including the
/// closing bracket.
fn match_token(input: &str) -> Result<(TokenFields, usize), SkipReason> {
    let mut scan = Scanner::new(input);
    scan.expect(b'[').ok_or(SkipReason::Delimiter)?;

    let start = scan.timestamp().ok_or(SkipReason::Timestamp)?;
    scan.expect(b'-').ok_or(SkipReason::Delimiter)?;
    let end = scan.timestamp().ok_or(SkipReason::Timestamp)?;
    if start > end {
        return Err(SkipReason::StartAfterEnd);
    }

    scan.separator().ok_or(SkipReason::Delimiter)?;
    let volume = scan.volume().ok_or(SkipReason::Volume)?;

    scan.separator().ok_or(SkipReason::Delimiter)?;
    let speed = scan.speed().ok_or(SkipReason::Speed)?;

    // Optional action suffix: at most one of `->` or `|N`.
    let action = if scan.separator().is_some() {
        scan.action_suffix().ok_or(SkipReason::Suffix)?
    } else {
        IntervalAction::None
    };

    scan.expect(b']').ok_or(SkipReason::Delimiter)?;

    Ok((
        TokenFields {
            start,
            end,
            volume,
            speed,
            action,
        },
        scan.pos,
    ))
}

/// Cursor over a single token candidate.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// A comma followed by any amount of spacing.
    fn separator(&mut self) -> Option<()> {
        self.expect(b',')?;
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.pos += 1;
        }
        Some(())
    }

    fn timestamp(&mut self) -> Option<f64> {
        let (value, len) = parse_timestamp(self.rest())?;
        self.pos += len;
        Some(value)
    }

    fn digits(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Integer percent, `0` through `100`, terminated by `%`.
    fn volume(&mut self) -> Option<u8> {
        let value: u32 = self.digits()?.parse().ok()?;
        self.expect(b'%')?;
        if value > 100 {
            return None;
        }
        Some(value as u8)
    }

    /// Positive decimal rate terminated by `x`, e.g. `1.25x`.
    fn speed(&mut self) -> Option<f64> {
        let from = self.pos;
        self.digits()?;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            self.digits()?;
        }
        let value: f64 = self.input[from..self.pos].parse().ok()?;
        self.expect(b'x')?;
        if value > 0.0 {
            Some(value)
        } else {
            None
        }
    }

    fn action_suffix(&mut self) -> Option<IntervalAction> {
        match self.peek()? {
            b'-' => {
                self.pos += 1;
                self.expect(b'>')?;
                Some(IntervalAction::AutoJump)
            }
            b'|' => {
                self.pos += 1;
                let seconds: u32 = self.digits()?.parse().ok()?;
                Some(IntervalAction::Pause { seconds })
            }
            _ => None,
        }
    }
}

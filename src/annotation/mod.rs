//! Annotation mini-language.
//!
//! Note text can embed playback annotations of the form
//! `[H:MM:SS-H:MM:SS, V%, S.SSx]` with an optional `->` (auto-jump) or `|N`
//! (timed pause) suffix. This module turns free-form text into an ordered
//! interval list; everything downstream of it ([`crate::engine`]) consumes
//! that list and never the raw text.
//!
//! - [`parser`]: tokenizer, [`Interval`], and skip diagnostics
//! - [`timestamp`]: the `H:MM:SS(.fff)` timestamp grammar

pub mod parser;
pub mod timestamp;

pub use parser::{
    parse, parse_with_diagnostics, Interval, IntervalAction, ParseOutcome, SkipReason, SkippedSpan,
};
pub use timestamp::format_timestamp;

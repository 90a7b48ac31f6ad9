//! cuescript - annotation-driven playback automation.
//!
//! A user annotates a media timeline inside plain-text notes with a small
//! mini-language (`[00:01:30-00:02:00, 80%, 1.25x, ->]`), and playback
//! follows the annotations automatically: volume and rate changes per
//! interval, auto-jump chaining, and timed pause-and-resume.
//!
//! The crate is the automation core only. Note storage, players, and UIs
//! live in the host application, which supplies note text plus a
//! [`player::PlayerAdapter`] and reads engine state back for display.
//!
//! - [`annotation`]: text -> ordered interval list
//! - [`engine`]: the poll-driven state machine, timers, seek detection
//! - [`player`]: the capability set the engine drives, plus a simulator

pub mod annotation;
pub mod engine;
pub mod player;

pub use annotation::{parse, parse_with_diagnostics, Interval, IntervalAction, ParseOutcome};
pub use engine::{EngineConfig, EngineError, Phase, Processor};
pub use player::{NotificationSink, PlayerAdapter, PlayerState, Severity};

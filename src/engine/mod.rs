//! Annotation-driven playback automation engine.
//!
//! The engine consumes the interval list produced by [`crate::annotation`]
//! and a [`crate::player::PlayerAdapter`], and automates playback from
//! them: it detects which annotated interval the playhead is inside,
//! applies that interval's volume/rate exactly once, restores the previous
//! settings on the way out, and runs the follow-on actions (auto-jump,
//! timed pause) on cancellable one-shot timers.
//!
//! Everything is single-threaded and poll-driven. The host calls
//! [`Processor::tick`] on a fixed cadence; timers are computed against a
//! [`Clock`] so tests can run the whole machine on a hand-cranked clock.
//!
//! - [`processor`]: the state machine itself
//! - [`tracker`]: position sampling and manual-seek classification
//! - [`scheduler`]: cancellable one-shot timers
//! - [`clock`]: wall-clock abstraction

pub mod clock;
pub mod error;
pub mod processor;
pub mod scheduler;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::EngineError;
pub use processor::{AutoJumpInfo, EngineSnapshot, Phase, Processor};
pub use scheduler::{Scheduler, TimerId};
pub use tracker::{PositionTracker, Sample};

/// Engine timing constants.
///
/// The defaults are the one canonical set this implementation commits to.
/// Hosts can override individual values, but every constant here has a
/// relationship worth keeping: the manual-seek threshold must exceed the
/// drift a poll tick can accumulate at the highest supported rate, and the
/// restore grace must stay below the tick interval so a post-jump restore
/// lands before detection re-enters the successor.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Widening applied to interval windows on both sides, seconds.
    pub tolerance: f64,
    /// Position delta above which a sample is classified as a manual seek,
    /// seconds.
    pub seek_threshold: f64,
    /// Cadence the host is expected to call [`Processor::tick`] at,
    /// seconds. The engine itself never sleeps; hosts (and the `simulate`
    /// subcommand's default cadence) read it.
    pub tick_interval: f64,
    /// How far before an interval's start a timed-pause entry seeks back,
    /// compensating for detection-loop latency. Seconds.
    pub pause_entry_lead: f64,
    /// Playback rate used to creep toward the pause instant.
    pub creep_rate: f64,
    /// Delay between a timed-pause entry and the hard pause, seconds.
    pub pause_entry_delay: f64,
    /// Delay after an auto-jump seek before the settings restore fires,
    /// absorbing player seek lag. Seconds.
    pub restore_grace: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            seek_threshold: 2.0,
            tick_interval: 0.5,
            pause_entry_lead: 0.5,
            creep_rate: 0.25,
            pause_entry_delay: 0.3,
            restore_grace: 0.3,
        }
    }
}

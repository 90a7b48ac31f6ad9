//! External player surface.
//!
//! The engine never talks to a concrete media framework. It consumes the
//! small capability set defined here, and a host wires in whatever player
//! it actually has (a web embed, a desktop backend, a test double).
//!
//! - [`PlayerAdapter`]: read/write time, volume, rate; seek; play/pause
//! - [`NotificationSink`]: one-way status messages, observability only
//! - [`sim`]: a scripted in-memory player for tests and the `simulate`
//!   subcommand

pub mod sim;

use serde::Serialize;

pub use sim::{SimPlayer, SimPlayerOp};

/// Coarse player lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

/// Capability set the engine drives. Implementations are expected to be
/// cheap and non-blocking; the engine calls these from its poll tick.
pub trait PlayerAdapter {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Current volume, 0-100.
    fn volume(&self) -> u8;

    /// Current playback rate. Always positive.
    fn playback_rate(&self) -> f64;

    fn set_volume(&mut self, volume: u8);

    fn set_playback_rate(&mut self, rate: f64);

    /// Seek to `seconds`. `allow_seek_ahead` permits seeking into media
    /// that has not buffered yet.
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool);

    fn pause(&mut self);

    fn play(&mut self);

    fn state(&self) -> PlayerState;
}

/// Message severity for the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(text)
    }
}

/// One-way status channel. Never read back; nothing in the engine branches
/// on whether or how a message was shown.
pub trait NotificationSink {
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Sink that discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _message: &str, _severity: Severity) {}
}

/// Sink that collects messages, for tests and the simulator trace.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub messages: Vec<(Severity, String)>,
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.messages.push((severity, message.to_string()));
    }
}

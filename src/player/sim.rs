//! Scripted in-memory player.
//!
//! `SimPlayer` stands in for a real media backend: it keeps position,
//! volume, rate, and state in plain fields, advances position at the
//! current rate when asked, and records every adapter call so tests and the
//! `simulate` subcommand can assert on the exact call sequence.

use serde::Serialize;

use super::{PlayerAdapter, PlayerState};

/// One recorded adapter call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SimPlayerOp {
    SetVolume { volume: u8 },
    SetPlaybackRate { rate: f64 },
    SeekTo { seconds: f64 },
    Pause,
    Play,
}

/// In-memory player double.
#[derive(Debug, Clone)]
pub struct SimPlayer {
    time: f64,
    volume: u8,
    rate: f64,
    state: PlayerState,
    ops: Vec<SimPlayerOp>,
}

impl Default for SimPlayer {
    fn default() -> Self {
        Self {
            time: 0.0,
            volume: 100,
            rate: 1.0,
            state: PlayerState::Paused,
            ops: Vec::new(),
        }
    }
}

impl SimPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playing at `seconds`.
    pub fn playing_at(seconds: f64) -> Self {
        Self {
            time: seconds,
            state: PlayerState::Playing,
            ..Self::default()
        }
    }

    /// Advance virtual media time by `dt` wall-clock seconds. Position
    /// moves at the current playback rate, and only while playing.
    pub fn advance(&mut self, dt: f64) {
        if self.state == PlayerState::Playing {
            self.time += dt * self.rate;
        }
    }

    /// Move the playhead directly, without recording an op. Used by tests
    /// to model a user dragging the seek bar.
    pub fn set_time(&mut self, seconds: f64) {
        self.time = seconds;
    }

    pub fn set_state(&mut self, state: PlayerState) {
        self.state = state;
    }

    /// Calls recorded so far, oldest first.
    pub fn ops(&self) -> &[SimPlayerOp] {
        &self.ops
    }

    /// Take and clear the recorded calls.
    pub fn drain_ops(&mut self) -> Vec<SimPlayerOp> {
        std::mem::take(&mut self.ops)
    }
}

impl PlayerAdapter for SimPlayer {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn volume(&self) -> u8 {
        self.volume
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
        self.ops.push(SimPlayerOp::SetVolume { volume: self.volume });
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.ops.push(SimPlayerOp::SetPlaybackRate { rate });
    }

    fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) {
        self.time = seconds.max(0.0);
        self.ops.push(SimPlayerOp::SeekTo { seconds: self.time });
    }

    fn pause(&mut self) {
        self.state = PlayerState::Paused;
        self.ops.push(SimPlayerOp::Pause);
    }

    fn play(&mut self) {
        self.state = PlayerState::Playing;
        self.ops.push(SimPlayerOp::Play);
    }

    fn state(&self) -> PlayerState {
        self.state
    }
}

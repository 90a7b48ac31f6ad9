//! The playback automation state machine.
//!
//! The processor owns one media session's worth of state: which interval is
//! active, the cursor that keeps already-passed intervals from re-firing,
//! the snapshot of the player settings taken at activation, and the pending
//! one-shot timers. It is driven entirely by [`Processor::tick`] plus the
//! explicit manual-activation calls; nothing here blocks or sleeps.
//!
//! # Phases
//!
//! - **Idle**: no interval active.
//! - **Active**: an interval was entered and its settings applied.
//! - **ActiveWithPendingJump**: the playhead left the interval's window but
//!   its auto-jump timer is still armed; settings are deliberately not yet
//!   restored because the jump still needs them.
//! - **PausedHold**: inside a timed-pause action, playback forced paused
//!   until the resume timer fires.

use serde::Serialize;
use tracing::{debug, info};

use crate::annotation::{format_timestamp, parse, Interval, IntervalAction};
use crate::player::{NotificationSink, PlayerAdapter, PlayerState, Severity};

use super::clock::Clock;
use super::error::EngineError;
use super::scheduler::{Scheduler, TimerId};
use super::tracker::{PositionTracker, Sample};
use super::EngineConfig;

/// Processor phase, derived from internal state. Read-only; nothing in the
/// engine branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Active,
    ActiveWithPendingJump,
    PausedHold,
}

/// Pending auto-jump, for display purposes only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AutoJumpInfo {
    /// Sequence index the jump will continue at.
    pub target_index: usize,
    /// Wall-clock seconds until the jump fires.
    pub remaining: f64,
}

/// Read-only view of the engine for rendering hosts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub phase: Phase,
    pub active_index: Option<usize>,
    pub cursor: Option<usize>,
    pub auto_jump: Option<AutoJumpInfo>,
}

/// Player settings captured at activation, restored on exit.
#[derive(Debug, Clone, Copy)]
struct OriginalSettings {
    volume: u8,
    rate: f64,
}

/// Payloads for the one-shot timers the processor arms.
#[derive(Debug, Clone, Copy)]
enum TimerTask {
    /// Continue at the successor of `from` when the interval window has
    /// elapsed in wall-clock terms.
    AutoJump { from: usize },
    /// Restore the snapshotted settings shortly after an auto-jump seek,
    /// once the player has had a moment to land.
    RestoreAfterJump,
    /// Hard-pause for a timed-pause interval.
    PauseHold { index: usize },
    /// Resume from a timed pause at the interval's declared rate.
    Resume { rate: f64 },
}

/// Annotation-driven playback automation for one media session.
///
/// Created when a session starts, dropped (or [`reset`](Self::reset)) when
/// it ends or the media identity changes. Single-threaded by construction:
/// every mutation goes through `&mut self`, which is what makes the
/// entry/exit transitions race-free without locks.
pub struct Processor<P, N, C> {
    config: EngineConfig,
    clock: C,
    notifier: N,
    player: Option<P>,
    intervals: Vec<Interval>,
    scheduler: Scheduler<TimerTask>,
    tracker: PositionTracker,
    /// Sequence index of the active interval.
    active: Option<usize>,
    /// Last activated sequence index; scanning only considers intervals
    /// after it. Only a manual seek moves it backwards.
    cursor: Option<usize>,
    original: Option<OriginalSettings>,
    jump_timer: Option<TimerId>,
    jump_target: Option<usize>,
    pause_hold_timer: Option<TimerId>,
    resume_timer: Option<TimerId>,
    /// The active interval's window was exited while its jump was armed.
    /// Keeps the exit from re-running its side effects on later ticks.
    exited_pending_jump: bool,
    paused_hold: bool,
}

impl<P, N, C> Processor<P, N, C>
where
    P: PlayerAdapter,
    N: NotificationSink,
    C: Clock,
{
    pub fn new(config: EngineConfig, notifier: N, clock: C) -> Self {
        let tracker = PositionTracker::new(config.seek_threshold);
        Self {
            config,
            clock,
            notifier,
            player: None,
            intervals: Vec::new(),
            scheduler: Scheduler::new(),
            tracker,
            active: None,
            cursor: None,
            original: None,
            jump_timer: None,
            jump_target: None,
            pause_hold_timer: None,
            resume_timer: None,
            exited_pending_jump: false,
            paused_hold: false,
        }
    }

    pub fn attach_player(&mut self, player: P) {
        self.player = Some(player);
    }

    pub fn detach_player(&mut self) -> Option<P> {
        self.player.take()
    }

    pub fn player(&self) -> Option<&P> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut P> {
        self.player.as_mut()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Reparse annotation text and install the interval list wholesale.
    ///
    /// Any activation in progress is exited (with settings restore) and all
    /// timers are cancelled first: sequence indices from the old list must
    /// not survive into the new one. Returns the number of intervals.
    pub fn set_annotations(&mut self, text: &str) -> usize {
        self.set_intervals(parse(text))
    }

    /// Install an already-parsed interval list. Same reset semantics as
    /// [`set_annotations`](Self::set_annotations).
    pub fn set_intervals(&mut self, intervals: Vec<Interval>) -> usize {
        self.cancel_all_timers();
        self.restore_and_clear();
        self.cursor = None;
        self.intervals = intervals;
        debug!(count = self.intervals.len(), "interval list replaced");
        self.intervals.len()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// One poll-loop pass.
    ///
    /// Due timers are serviced first and regardless of player state, so a
    /// pending auto-jump or resume can fire while the session is paused.
    /// Position tracking and window detection run only while the player
    /// reports `Playing`, and never on a tick that fired a timer: entry
    /// after an auto-jump is left to the following tick, by which point the
    /// post-jump restore grace has elapsed.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        let due = self.scheduler.take_due(now);
        if !due.is_empty() {
            for (_, task) in due {
                self.run_task(now, task);
            }
            return;
        }

        let Some(player) = self.player.as_ref() else {
            // No adapter this tick; retry on the next one.
            return;
        };
        if player.state() != PlayerState::Playing {
            return;
        }
        let t = player.current_time();

        match self.tracker.observe(t) {
            Sample::ManualSeek { from, to } => self.handle_manual_seek(from, to),
            Sample::Initial | Sample::Progress => self.detect(now, t),
        }
    }

    /// Manual activation: jump to an interval's start and enter it now,
    /// bypassing the poll loop.
    pub fn activate_at_start(&mut self, index: usize) -> Result<(), EngineError> {
        let interval = self
            .intervals
            .get(index)
            .ok_or(EngineError::UnknownInterval { index })?;
        let start = interval.start;
        if self.player.is_none() {
            return Err(EngineError::PlayerNotAttached);
        }

        let now = self.clock.now();
        self.cancel_all_timers();
        self.restore_and_clear();

        if let Some(player) = self.player.as_mut() {
            player.seek_to(start, true);
        }
        self.tracker.sync(start);
        // Seat the cursor just before the interval so the next poll tick
        // does not re-detect and re-trigger it; entry advances it.
        self.cursor = index.checked_sub(1);
        self.enter(now, index);
        Ok(())
    }

    /// Manual activation variant: seek to an interval's end without
    /// entering it. A preview jump; ordinary detection takes over on the
    /// next tick.
    pub fn activate_at_end(&mut self, index: usize) -> Result<(), EngineError> {
        let end = self
            .intervals
            .get(index)
            .ok_or(EngineError::UnknownInterval { index })?
            .end;
        let Some(player) = self.player.as_mut() else {
            return Err(EngineError::PlayerNotAttached);
        };
        player.seek_to(end, true);
        self.tracker.sync(end);
        Ok(())
    }

    /// Cancel every pending timer and return to `Idle` without touching the
    /// player. Must run on media-session end or identity change so no stale
    /// timer fires against an unrelated session.
    pub fn reset(&mut self) {
        self.cancel_all_timers();
        self.active = None;
        self.original = None;
        self.exited_pending_jump = false;
        self.paused_hold = false;
        self.cursor = None;
        self.tracker.reset();
        debug!("engine reset");
    }

    pub fn phase(&self) -> Phase {
        if self.paused_hold {
            Phase::PausedHold
        } else if self.active.is_some() {
            if self.exited_pending_jump {
                Phase::ActiveWithPendingJump
            } else {
                Phase::Active
            }
        } else {
            Phase::Idle
        }
    }

    pub fn active_interval(&self) -> Option<&Interval> {
        self.active.and_then(|i| self.intervals.get(i))
    }

    /// Last activated sequence index, if any.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Pending auto-jump details, if one is armed. Observability only.
    pub fn auto_jump_info(&self) -> Option<AutoJumpInfo> {
        let id = self.jump_timer?;
        let target_index = self.jump_target?;
        let remaining = self.scheduler.remaining(id, self.clock.now())?;
        Some(AutoJumpInfo {
            target_index,
            remaining,
        })
    }

    /// Read-only state for rendering.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            phase: self.phase(),
            active_index: self.active,
            cursor: self.cursor,
            auto_jump: self.auto_jump_info(),
        }
    }

    // ------------------------------------------------------------------
    // Detection
    // ------------------------------------------------------------------

    fn detect(&mut self, now: f64, t: f64) {
        if let Some(index) = self.active {
            let inside = self
                .intervals
                .get(index)
                .is_some_and(|iv| iv.contains(t, self.config.tolerance));
            if !inside {
                self.exit_active();
            }
            return;
        }

        let from = self.cursor.map_or(0, |c| c + 1);
        let candidate = self
            .intervals
            .iter()
            .skip(from)
            .find(|iv| iv.contains(t, self.config.tolerance))
            .map(|iv| iv.index);
        if let Some(index) = candidate {
            self.enter(now, index);
        }
    }

    fn enter(&mut self, now: f64, index: usize) {
        let Some(interval) = self.intervals.get(index).cloned() else {
            return;
        };
        let Some(player) = self.player.as_mut() else {
            return;
        };

        // Snapshot once per activation chain. A snapshot still pending
        // belongs to the chain's first entry and wins.
        if self.original.is_none() {
            self.original = Some(OriginalSettings {
                volume: player.volume(),
                rate: player.playback_rate(),
            });
        }

        player.set_volume(interval.volume);

        match interval.action {
            IntervalAction::Pause { seconds } => {
                // Detection runs after the start has already passed; seek
                // back and creep so the hold lands close to the declared
                // instant, then pause hard after a short delay.
                let target = (interval.start - self.config.pause_entry_lead).max(0.0);
                player.seek_to(target, true);
                player.set_playback_rate(self.config.creep_rate);
                self.tracker.sync(target);

                self.cancel_pause_timers();
                self.pause_hold_timer = Some(self.scheduler.arm(
                    now,
                    self.config.pause_entry_delay,
                    TimerTask::PauseHold { index },
                ));
                self.resume_timer = Some(self.scheduler.arm(
                    now,
                    self.config.pause_entry_delay + f64::from(seconds),
                    TimerTask::Resume {
                        rate: interval.speed,
                    },
                ));
            }
            IntervalAction::AutoJump => {
                player.set_playback_rate(interval.speed);
                // Wall-clock delay compensates for the playback rate: a 5s
                // window at 2.0x elapses in 2.5 real seconds.
                let wall_delay =
                    ((interval.end - player.current_time()) / interval.speed).max(0.0);
                self.cancel_jump_timer();
                self.jump_timer = Some(self.scheduler.arm(
                    now,
                    wall_delay,
                    TimerTask::AutoJump { from: index },
                ));
                self.jump_target = Some(index + 1);
            }
            IntervalAction::None => {
                player.set_playback_rate(interval.speed);
            }
        }

        self.active = Some(index);
        self.cursor = Some(index);
        self.exited_pending_jump = false;
        debug!(index, start = interval.start, end = interval.end, "interval entered");
        self.notifier.notify(
            &format!(
                "Annotation {} active ({} - {})",
                index + 1,
                format_timestamp(interval.start),
                format_timestamp(interval.end)
            ),
            Severity::Info,
        );
    }

    fn exit_active(&mut self) {
        let Some(index) = self.active else {
            return;
        };

        let jump_armed = self
            .jump_timer
            .is_some_and(|id| self.scheduler.is_armed(id));
        let is_auto_jump = self
            .intervals
            .get(index)
            .is_some_and(|iv| iv.action == IntervalAction::AutoJump);

        if is_auto_jump && jump_armed {
            // The armed jump still needs the interval's settings; restore
            // is deferred until it completes.
            if !self.exited_pending_jump {
                self.exited_pending_jump = true;
                debug!(index, "window exited with auto-jump still armed");
            }
            return;
        }

        self.cancel_pause_timers();
        self.cancel_jump_timer();
        debug!(index, "interval exited");
        self.restore_and_clear();
    }

    /// Restore the snapshotted settings (if any) and drop the activation.
    fn restore_and_clear(&mut self) {
        if let Some(original) = self.original.take() {
            if let Some(player) = self.player.as_mut() {
                player.set_volume(original.volume);
                player.set_playback_rate(original.rate);
            }
        }
        self.active = None;
        self.exited_pending_jump = false;
        self.paused_hold = false;
    }

    // ------------------------------------------------------------------
    // Timer actions
    // ------------------------------------------------------------------

    fn run_task(&mut self, now: f64, task: TimerTask) {
        match task {
            TimerTask::AutoJump { from } => self.run_auto_jump(now, from),
            TimerTask::RestoreAfterJump => {
                // Skip if an interval re-activated during the grace window;
                // the chain's final exit restores instead.
                if self.active.is_none() {
                    self.restore_and_clear();
                }
            }
            TimerTask::PauseHold { index } => {
                self.pause_hold_timer = None;
                if self.active == Some(index) {
                    if let Some(player) = self.player.as_mut() {
                        player.pause();
                        self.paused_hold = true;
                        debug!(index, "pause hold engaged");
                    }
                }
            }
            TimerTask::Resume { rate } => {
                self.resume_timer = None;
                if let Some(player) = self.player.as_mut() {
                    player.set_playback_rate(rate);
                    player.play();
                }
                self.paused_hold = false;
                debug!(rate, "resumed from timed pause");
            }
        }
    }

    fn run_auto_jump(&mut self, now: f64, from: usize) {
        self.jump_timer = None;
        self.jump_target = None;

        let next = self.intervals.get(from + 1).cloned();
        let Some(player) = self.player.as_mut() else {
            // Nothing to drive; drop the activation so a later attach
            // starts clean.
            self.active = None;
            self.exited_pending_jump = false;
            return;
        };

        match next {
            Some(next_interval) => {
                player.seek_to(next_interval.start, true);
                self.tracker.sync(next_interval.start);
                self.active = None;
                self.exited_pending_jump = false;
                // The snapshot stays in place: fresh detection re-enters
                // the successor on the next tick, and the grace restore
                // below only applies if nothing re-activated by then.
                self.scheduler
                    .arm(now, self.config.restore_grace, TimerTask::RestoreAfterJump);
                info!(from, to = from + 1, "auto-jump");
                self.notifier.notify(
                    &format!("Continuing at annotation {}", from + 2),
                    Severity::Info,
                );
            }
            None => {
                // End of the declared sequence: pausing is the safe
                // terminal fallback.
                player.pause();
                self.restore_and_clear();
                info!(from, "auto-jump with no successor, pausing");
                self.notifier
                    .notify("Reached the end of the annotated sequence", Severity::Info);
            }
        }
    }

    // ------------------------------------------------------------------
    // Manual seek
    // ------------------------------------------------------------------

    /// A user seek invalidates sequence-order scanning: cancel pending
    /// work, exit through the normal restore path, and re-seat the cursor
    /// at the interval chronologically nearest the new position.
    fn handle_manual_seek(&mut self, from: f64, to: f64) {
        debug!(from, to, "manual seek detected");
        self.cancel_all_timers();
        self.restore_and_clear();

        let nearest = self
            .intervals
            .iter()
            .min_by(|a, b| (a.start - to).abs().total_cmp(&(b.start - to).abs()))
            .map(|iv| iv.index);
        self.cursor = nearest.and_then(|index| index.checked_sub(1));
        debug!(?nearest, cursor = ?self.cursor, "cursor re-seated");
    }

    // ------------------------------------------------------------------
    // Timer bookkeeping
    // ------------------------------------------------------------------

    fn cancel_jump_timer(&mut self) {
        if let Some(id) = self.jump_timer.take() {
            self.scheduler.cancel(id);
        }
        self.jump_target = None;
    }

    fn cancel_pause_timers(&mut self) {
        if let Some(id) = self.pause_hold_timer.take() {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.resume_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn cancel_all_timers(&mut self) {
        self.cancel_jump_timer();
        self.cancel_pause_timers();
        self.scheduler.clear();
    }
}

//! `simulate` subcommand handler.
//!
//! Runs the engine over a scripted player on a manual clock and prints the
//! adapter calls and notifications the annotations produced. Useful for
//! checking what a note will actually do without a media session.

use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::Serialize;

use cuescript::annotation::format_timestamp;
use cuescript::engine::{Clock, EngineConfig, ManualClock, Processor};
use cuescript::player::{RecordingSink, Severity, SimPlayer, SimPlayerOp};

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TraceEvent {
    Player {
        at: f64,
        op: SimPlayerOp,
    },
    Notice {
        at: f64,
        severity: Severity,
        message: String,
    },
}

/// Simulate playback of an annotated notes file.
pub fn handle(file: &Path, start: f64, duration: f64, tick_ms: u64, json: bool) -> Result<()> {
    ensure!(tick_ms > 0, "tick interval must be positive");
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let clock = ManualClock::new();
    let mut engine = Processor::new(EngineConfig::default(), RecordingSink::default(), clock.clone());
    let count = engine.set_annotations(&text);
    ensure!(count > 0, "no annotations found in {}", file.display());
    engine.attach_player(SimPlayer::playing_at(start));

    let dt = tick_ms as f64 / 1000.0;
    let steps = (duration / dt).ceil() as u64;
    let mut trace = Vec::new();

    for step in 0..=steps {
        if step > 0 {
            clock.advance(dt);
            if let Some(player) = engine.player_mut() {
                player.advance(dt);
            }
        }
        engine.tick();

        let at = clock.now();
        if let Some(player) = engine.player_mut() {
            for op in player.drain_ops() {
                trace.push(TraceEvent::Player { at, op });
            }
        }
        for (severity, message) in engine.notifier_mut().messages.drain(..) {
            trace.push(TraceEvent::Notice {
                at,
                severity,
                message,
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
        return Ok(());
    }

    for event in &trace {
        match event {
            TraceEvent::Player { at, op } => {
                println!("{:>8.2}s  {}", at, describe(op));
            }
            TraceEvent::Notice {
                at,
                severity,
                message,
            } => {
                println!("{:>8.2}s  [{}] {}", at, severity, message);
            }
        }
    }
    if trace.is_empty() {
        println!("nothing happened in {:.1}s of playback from {}", duration, format_timestamp(start));
    }

    Ok(())
}

fn describe(op: &SimPlayerOp) -> String {
    match op {
        SimPlayerOp::SetVolume { volume } => format!("volume -> {}%", volume),
        SimPlayerOp::SetPlaybackRate { rate } => format!("rate -> {:.2}x", rate),
        SimPlayerOp::SeekTo { seconds } => format!("seek -> {}", format_timestamp(*seconds)),
        SimPlayerOp::Pause => "pause".to_string(),
        SimPlayerOp::Play => "play".to_string(),
    }
}

//! End-to-end engine scenarios on a simulated player and manual clock.

use cuescript::engine::{EngineConfig, ManualClock, Phase, Processor};
use cuescript::player::{PlayerAdapter, PlayerState, RecordingSink, SimPlayer, SimPlayerOp};

type Engine = Processor<SimPlayer, RecordingSink, ManualClock>;

fn engine_at(text: &str, start: f64) -> (Engine, ManualClock) {
    let clock = ManualClock::new();
    let mut engine = Processor::new(EngineConfig::default(), RecordingSink::default(), clock.clone());
    engine.set_annotations(text);
    engine.attach_player(SimPlayer::playing_at(start));
    (engine, clock)
}

fn step(engine: &mut Engine, clock: &ManualClock, dt: f64) {
    clock.advance(dt);
    if let Some(player) = engine.player_mut() {
        player.advance(dt);
    }
    engine.tick();
}

const TWO_INTERVALS: &str =
    "[00:00:10-00:00:15, 100%, 1.00x]\n[00:00:20-00:00:25, 80%, 1.25x, ->]";

#[test]
fn second_interval_activates_with_its_settings() {
    let (mut engine, _clock) = engine_at(TWO_INTERVALS, 22.0);
    assert_eq!(engine.intervals().len(), 2);

    engine.tick();

    assert_eq!(engine.phase(), Phase::Active);
    assert_eq!(engine.active_interval().unwrap().index, 1);
    let player = engine.player().unwrap();
    assert_eq!(player.volume(), 80);
    assert_eq!(player.playback_rate(), 1.25);
}

#[test]
fn reaching_the_end_without_a_successor_pauses() {
    let (mut engine, clock) = engine_at(TWO_INTERVALS, 22.0);
    engine.tick();

    // (25 - 22) / 1.25 = 2.4 wall seconds until the jump fires; there is
    // no interval with sequence index 2, so the engine pauses instead.
    let info = engine.auto_jump_info().unwrap();
    assert!((info.remaining - 2.4).abs() < 1e-9);

    let mut elapsed = 0.0;
    while elapsed < 2.4 {
        step(&mut engine, &clock, 0.5);
        elapsed += 0.5;
    }

    assert_eq!(engine.player().unwrap().state(), PlayerState::Paused);
    assert_eq!(engine.phase(), Phase::Idle);
    let messages = &engine.notifier().messages;
    assert!(messages
        .iter()
        .any(|(_, m)| m.contains("end of the annotated sequence")));
}

#[test]
fn timed_pause_holds_and_resumes_at_declared_speed() {
    let (mut engine, clock) = engine_at("[00:01:30-00:01:40, 100%, 1.00x, |3]", 89.6);

    // t = 89.6 is still ahead of the 90s start; nothing activates yet.
    engine.tick();
    assert_eq!(engine.phase(), Phase::Idle);

    // Next tick crosses the start; the engine compensates for detection
    // latency by seeking back to start - 0.5s and creeping at 0.25x.
    step(&mut engine, &clock, 0.5);
    let player = engine.player().unwrap();
    assert_eq!(player.current_time(), 89.5);
    assert_eq!(player.playback_rate(), 0.25);

    // Hard pause ~0.3s later.
    step(&mut engine, &clock, 0.3);
    assert_eq!(engine.player().unwrap().state(), PlayerState::Paused);
    assert_eq!(engine.phase(), Phase::PausedHold);

    // After the 3s hold, playback resumes at the declared 1.00x.
    step(&mut engine, &clock, 3.0);
    let player = engine.player().unwrap();
    assert_eq!(player.state(), PlayerState::Playing);
    assert_eq!(player.playback_rate(), 1.0);
}

#[test]
fn user_seek_clears_activation_and_reseats_cursor_chronologically() {
    // Declaration order deliberately disagrees with time order: the last
    // declared interval is the earliest on the timeline.
    let text = "[00:00:05-00:00:10, 100%, 1.00x]\n\
                [00:03:00-00:03:10, 80%, 1.00x]\n\
                [00:01:55-00:02:05, 60%, 1.00x]";
    let (mut engine, clock) = engine_at(text, 6.0);
    engine.tick();
    assert_eq!(engine.active_interval().unwrap().index, 0);

    // User seeks to t=120. Nearest start time is interval 2 (115s), so
    // the cursor re-seats to 1 even though sequence scanning alone would
    // never go back past interval 0.
    engine.player_mut().unwrap().set_time(120.0);
    clock.advance(0.5);
    engine.tick();

    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(engine.cursor(), Some(1));

    // The next tick picks interval 2 up again.
    step(&mut engine, &clock, 0.5);
    assert_eq!(engine.active_interval().unwrap().index, 2);
    assert_eq!(engine.player().unwrap().volume(), 60);
}

#[test]
fn auto_jump_chains_through_the_declared_sequence() {
    let text = "[00:00:10-00:00:12, 80%, 2.00x, ->]\n\
                [00:05:00-00:05:03, 60%, 1.00x, ->]\n\
                [00:09:00-00:09:10, 40%, 1.00x]";
    let (mut engine, clock) = engine_at(text, 10.0);
    engine.tick();
    assert_eq!(engine.active_interval().unwrap().index, 0);

    // Interval 0: 2s window at 2.0x fires after 1 wall second.
    step(&mut engine, &clock, 1.0);
    assert_eq!(engine.player().unwrap().current_time(), 300.0);

    // Grace restore, then re-entry of interval 1.
    step(&mut engine, &clock, 0.5);
    step(&mut engine, &clock, 0.5);
    assert_eq!(engine.active_interval().unwrap().index, 1);

    // The rest of interval 1's window elapses in well under 2 wall
    // seconds; the jump fires on this tick.
    step(&mut engine, &clock, 2.0);
    assert_eq!(engine.player().unwrap().current_time(), 540.0);
    step(&mut engine, &clock, 0.5);
    step(&mut engine, &clock, 0.5);
    assert_eq!(engine.active_interval().unwrap().index, 2);
    assert_eq!(engine.player().unwrap().volume(), 40);
}

#[test]
fn settings_around_a_plain_activation_are_symmetric() {
    let (mut engine, clock) = engine_at("[00:00:10-00:00:12, 30%, 0.50x]", 10.5);
    {
        let player = engine.player_mut().unwrap();
        player.set_volume(65);
        player.set_playback_rate(1.75);
        player.drain_ops();
    }

    engine.tick();
    assert_eq!(engine.player().unwrap().volume(), 30);

    // Creep out of the window (0.5x keeps per-tick drift small).
    for _ in 0..8 {
        step(&mut engine, &clock, 0.5);
    }

    assert_eq!(engine.phase(), Phase::Idle);
    let player = engine.player().unwrap();
    assert_eq!(player.volume(), 65);
    assert_eq!(player.playback_rate(), 1.75);
}

#[test]
fn fast_rate_jump_landing_is_not_mistaken_for_a_user_seek() {
    // At 2.0x the playhead moves a full second per tick, and the jump
    // itself lands hundreds of seconds away; neither may reset the cursor
    // the way a real user seek would.
    let text = "[00:00:10-00:00:14, 80%, 2.00x, ->]\n[00:08:00-00:08:10, 60%, 1.00x]";
    let (mut engine, clock) = engine_at(text, 10.0);
    engine.tick();
    assert_eq!(engine.active_interval().unwrap().index, 0);

    // Jump fires after (14 - 10) / 2.0 = 2 wall seconds.
    for _ in 0..4 {
        step(&mut engine, &clock, 0.5);
    }
    assert_eq!(engine.player().unwrap().current_time(), 480.0);

    // Grace restore, then detection: must classify the landing as
    // progress and re-enter the successor, not re-seat to nearest start.
    step(&mut engine, &clock, 0.5);
    step(&mut engine, &clock, 0.5);
    assert_eq!(engine.active_interval().unwrap().index, 1);
    assert_eq!(engine.cursor(), Some(1));
}

#[test]
fn timed_pause_drives_the_full_adapter_call_sequence() {
    let (mut engine, clock) = engine_at("[00:01:30-00:01:40, 70%, 1.50x, |2]", 89.6);
    engine.tick();
    engine.player_mut().unwrap().drain_ops();

    // Cross the start, hold, and resume; collect every adapter call.
    let mut ops = Vec::new();
    for dt in [0.5, 0.3, 2.0] {
        step(&mut engine, &clock, dt);
        ops.extend(engine.player_mut().unwrap().drain_ops());
    }

    assert_eq!(
        ops,
        vec![
            SimPlayerOp::SetVolume { volume: 70 },
            SimPlayerOp::SeekTo { seconds: 89.5 },
            SimPlayerOp::SetPlaybackRate { rate: 0.25 },
            SimPlayerOp::Pause,
            SimPlayerOp::SetPlaybackRate { rate: 1.5 },
            SimPlayerOp::Play,
        ]
    );
}

#[test]
fn snapshot_is_json_serializable() {
    let (mut engine, _clock) = engine_at(TWO_INTERVALS, 22.0);
    engine.tick();

    let json = serde_json::to_value(engine.snapshot()).unwrap();
    assert_eq!(json["phase"], "active");
    assert_eq!(json["active_index"], 1);
    assert_eq!(json["cursor"], 1);
    assert_eq!(json["auto_jump"]["target_index"], 2);
}

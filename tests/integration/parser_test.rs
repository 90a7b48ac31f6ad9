//! Parser behaviour over realistic note documents.

use cuescript::annotation::{parse, parse_with_diagnostics, IntervalAction, SkipReason};

const NOTES: &str = "\
# Lecture 4 - sorting

Intro is slow, keep it quiet and fast:
[00:00:00-00:02:30, 40%, 2.00x]

The proof starts here, full volume, jump straight to the example after:
[00:12:10-00:15:45.5, 100%, 1.00x, ->]
[00:31:00-00:33:20, 100%, 1.00x]

Revisit the definition from earlier while reading this paragraph:
[00:05:00-00:05:30, 80%, 0.75x, |10]

todo [check this later] and a broken one: [00:70:00-00:71:00, 50%, 1.00x]
";

#[test]
fn realistic_document_parses_in_declaration_order() {
    let intervals = parse(NOTES);

    assert_eq!(intervals.len(), 4);
    let starts: Vec<f64> = intervals.iter().map(|iv| iv.start).collect();
    assert_eq!(starts, vec![0.0, 730.0, 1860.0, 300.0]);
    let indices: Vec<usize> = intervals.iter().map(|iv| iv.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn realistic_document_reports_only_the_broken_candidate() {
    let outcome = parse_with_diagnostics(NOTES);

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].reason, SkipReason::Timestamp);
    assert!(outcome.skipped[0].text.starts_with("[00:70:00"));
}

#[test]
fn actions_and_fractions_survive_the_round_trip() {
    let intervals = parse(NOTES);

    assert_eq!(intervals[0].action, IntervalAction::None);
    assert_eq!(intervals[1].action, IntervalAction::AutoJump);
    assert_eq!(intervals[1].end, 945.5);
    assert_eq!(intervals[3].action, IntervalAction::Pause { seconds: 10 });
    assert_eq!(intervals[3].speed, 0.75);
}

#[test]
fn raw_text_locates_each_annotation_in_the_source() {
    let intervals = parse(NOTES);
    for interval in &intervals {
        assert!(NOTES.contains(&interval.raw), "raw not found: {}", interval.raw);
    }
}

#[test]
fn parse_twice_yields_identical_lists() {
    assert_eq!(parse(NOTES), parse(NOTES));
}

#[test]
fn outcome_serializes_to_json() {
    let outcome = parse_with_diagnostics(NOTES);
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["intervals"].as_array().unwrap().len(), 4);
    assert_eq!(json["intervals"][1]["action"]["kind"], "auto_jump");
    assert_eq!(json["intervals"][3]["action"]["seconds"], 10);
    assert_eq!(json["skipped"][0]["reason"], "timestamp");
}

#[test]
fn empty_and_annotation_free_text_parse_to_nothing() {
    assert!(parse("").is_empty());
    assert!(parse("just some prose with [brackets] in it").is_empty());
}

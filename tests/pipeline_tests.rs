//! End-to-end pipeline, corpus boundary, config, and report tests

use std::collections::HashSet;

use dacapo::config::{Config, StaffSelector};
use dacapo::corpus::{self, parse_corpus, CorpusError, ScoreItem};
use dacapo::dedup;
use dacapo::report::{write_report, DedupReport};

fn test_config() -> Config {
    Config {
        worker_threads: 2,
        ..Config::default()
    }
}

fn item(path: &str, pitches: Vec<i32>) -> ScoreItem {
    ScoreItem {
        path: path.to_string(),
        pitches,
    }
}

// --- corpus boundary ---

#[test]
fn corpus_selects_the_configured_staff() {
    let jsonl = r#"{"path": "a.musicxml", "upper": [76, 72], "lower": [45, 52]}"#;

    let upper = parse_corpus(jsonl, StaffSelector::Upper).unwrap();
    assert_eq!(upper[0].pitches, vec![76, 72]);

    let lower = parse_corpus(jsonl, StaffSelector::Lower).unwrap();
    assert_eq!(lower[0].pitches, vec![45, 52]);
}

#[test]
fn corpus_skips_unusable_records() {
    let jsonl = concat!(
        r#"{"path": "good.musicxml", "upper": [60, 62], "lower": [40]}"#,
        "\n",
        r#"{"path": "empty.musicxml", "upper": [], "lower": [40]}"#,
        "\n",
        r#"{"path": "missing.musicxml", "lower": [40]}"#,
        "\n",
    );

    let items = parse_corpus(jsonl, StaffSelector::Upper).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].path, "good.musicxml");
}

#[test]
fn corpus_reports_malformed_lines_with_their_number() {
    let jsonl = concat!(
        r#"{"path": "a.musicxml", "upper": [60]}"#,
        "\n",
        "not json at all\n",
    );

    let err = parse_corpus(jsonl, StaffSelector::Upper).unwrap_err();
    match err {
        CorpusError::Malformed { line, .. } => assert_eq!(line, 2),
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn corpus_keeps_the_last_record_for_a_repeated_path() {
    let jsonl = concat!(
        r#"{"path": "a.musicxml", "upper": [60]}"#,
        "\n",
        r#"{"path": "a.musicxml", "upper": [61, 62]}"#,
        "\n",
    );

    let items = parse_corpus(jsonl, StaffSelector::Upper).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].pitches, vec![61, 62]);
}

#[test]
fn corpus_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.jsonl");
    std::fs::write(
        &path,
        r#"{"path": "a.musicxml", "upper": [60, 62, 64], "lower": [40]}"#,
    )
    .unwrap();

    let items = corpus::load_corpus(&path, StaffSelector::Upper).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].pitches, vec![60, 62, 64]);
}

// --- configuration ---

#[test]
fn config_defaults_are_valid() {
    let config = Config::default();
    config.validate().unwrap();
    assert_eq!(config.num_permutations, 128);
    assert_eq!(config.staff_selector, StaffSelector::Upper);
}

#[test]
fn config_round_trips_through_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dacapo.toml");

    let mut config = Config::default();
    config.staff_selector = StaffSelector::Lower;
    config.confirmation_threshold = 0.65;
    config.save(&path).unwrap();

    let loaded = Config::load_or_default(&path).unwrap();
    assert_eq!(loaded.staff_selector, StaffSelector::Lower);
    assert!((loaded.confirmation_threshold - 0.65).abs() < 1e-12);
}

#[test]
fn config_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(loaded.num_permutations, Config::default().num_permutations);
}

#[test]
fn config_rejects_out_of_range_values() {
    let mut config = Config::default();
    config.num_permutations = 4;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.similarity_band = 0.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.confirmation_threshold = 1.5;
    assert!(config.validate().is_err());
}

// --- full pipeline ---

#[test]
fn pipeline_discards_exact_duplicates_and_keeps_distinct_scores() {
    let theme: Vec<i32> = (48..108).collect();
    let other: Vec<i32> = (0..40).rev().collect();

    let items = vec![
        item("theme.musicxml", theme.clone()),
        item("theme_copy.musicxml", theme),
        item("other.musicxml", other),
    ];

    let outcome = dedup::run(&items, &test_config());

    assert_eq!(
        outcome.discarded,
        HashSet::from(["theme_copy.musicxml".to_string()])
    );
    assert_eq!(
        outcome.retained,
        vec!["theme.musicxml".to_string(), "other.musicxml".to_string()]
    );
}

#[test]
fn pipeline_is_deterministic_across_runs() {
    let base: Vec<i32> = (30..120).collect();
    let mut items = Vec::new();
    for i in 0..8 {
        let mut variant = base.clone();
        variant.truncate(80 + i);
        items.push(item(&format!("v{i}.musicxml"), variant));
    }
    // A pair of exact duplicates and two unrelated pieces
    items.push(item("dup1.musicxml", (0..25).collect()));
    items.push(item("dup2.musicxml", (0..25).collect()));
    items.push(item("solo.musicxml", (200..230).rev().collect()));

    let config = test_config();
    let first = dedup::run(&items, &config);
    let second = dedup::run(&items, &config);

    assert_eq!(first.discarded, second.discarded);
    assert_eq!(first.retained, second.retained);
}

#[test]
fn pipeline_handles_an_empty_corpus() {
    let outcome = dedup::run(&[], &test_config());
    assert!(outcome.discarded.is_empty());
    assert!(outcome.retained.is_empty());
}

#[test]
fn pipeline_longest_cluster_member_survives() {
    let long: Vec<i32> = (40..100).collect();
    let items = vec![
        item("short_copy.musicxml", long[..55].to_vec()),
        item("full.musicxml", long.clone()),
        item("another_copy.musicxml", long),
    ];

    let outcome = dedup::run(&items, &test_config());

    assert!(!outcome.discarded.contains("full.musicxml"));
}

// --- report ---

#[test]
fn report_sorts_discards_and_preserves_corpus_order() {
    let items = vec![
        item("b.musicxml", (0..30).collect()),
        item("a.musicxml", (0..30).collect()),
        item("z.musicxml", (100..140).collect()),
    ];

    let config = test_config();
    let outcome = dedup::run(&items, &config);
    let report = DedupReport::new(items.len(), &outcome, &config);

    assert_eq!(report.total, 3);
    let mut sorted = report.discarded.clone();
    sorted.sort();
    assert_eq!(report.discarded, sorted);
    // Retained keeps original corpus order, not alphabetical
    assert_eq!(report.retained.first().map(String::as_str), Some("b.musicxml"));
}

#[test]
fn report_writes_valid_json() {
    let items = vec![
        item("a.musicxml", (0..30).collect()),
        item("a_copy.musicxml", (0..30).collect()),
    ];
    let config = test_config();
    let outcome = dedup::run(&items, &config);
    let report = DedupReport::new(items.len(), &outcome, &config);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    write_report(&report, Some(&path)).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["total"], 2);
    assert_eq!(value["discarded"][0], "a_copy.musicxml");
    assert_eq!(value["retained"][0], "a.musicxml");
}

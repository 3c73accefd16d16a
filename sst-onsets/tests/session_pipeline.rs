// End-to-end runs of a session against synthetic behaviour files
use sst_onsets::{
    ContrastNode, EventsError, OnsetEvent, OnsetReader, ProtocolModel, SessionConfig,
    SessionProcessor, Timepoint,
};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const HEADER: &str = "Trial\tTrial Category\tTrial Start Time (Onset)\tPre-determined/randomised onset\tGo Stimulus Presentation Time \tStimulus Presented\tDelay\tStop Stimulus Presentation Time \tResponse made by Subject\tAbsolute Response Time\tRelative Response Time\tResponse Outcome\tReal Jitter\tPre-determined Jitter\tSuccess Rate of Variable Delay Stop Trials\t";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Write a behaviour file with one row per `(start_ms, outcome)` pair
fn write_log(dir: &Path, trials: &[(i64, &str)]) -> PathBuf {
    let mut content = format!("Stop Signal Task v2\n{HEADER}\n");
    for (index, (start_ms, outcome)) in trials.iter().enumerate() {
        let go_ms = start_ms + 500;
        writeln!(
            content,
            "{}\tGO\t{start_ms}\t{start_ms}\t\"{go_ms}\"\tLEFT\t0\t0\tLEFT\t{}\t400\t{outcome}\t\"1600\"\t1600\t\"0.5\"\t",
            index + 1,
            go_ms + 400
        )
        .unwrap();
    }

    let path = dir.join("ss_000000000001.csv");
    std::fs::write(&path, content).unwrap();
    path
}

/// 480 trials cycling through every outcome except GO_WRONG_KEY_RESPONSE
fn baseline_trials() -> Vec<(i64, &'static str)> {
    let outcomes = ["GO_SUCCESS", "GO_TOO_LATE", "STOP_SUCCESS", "STOP_FAILURE", "GO_SUCCESS"];
    (0..480)
        .map(|i| (10_000 + i as i64 * 2_000, outcomes[i % outcomes.len()]))
        .collect()
}

fn find<'a>(contrasts: &'a [ContrastNode], name: &str) -> Option<&'a ContrastNode> {
    contrasts.iter().find(|c| c.name() == name)
}

#[test]
fn baseline_session_with_missing_condition() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(dir.path(), &baseline_trials());

    let outcome = SessionProcessor::new(SessionConfig::new())
        .process(&log, Timepoint::Baseline, ProtocolModel::A, dir.path())
        .unwrap();

    assert_eq!(outcome.stats.trials, 480);
    assert_eq!(outcome.stats.matched_trials, 480);
    assert!(outcome.missing.contains("go_wrong"));
    assert_eq!(outcome.missing.len(), 1);

    let written = std::fs::read_to_string(&outcome.onset_file).unwrap();
    assert!(written.starts_with("Conditions;Onsets;Durations\n"));
    assert!(written.lines().any(|line| line == "go_wrong;nan;nan"));
    assert!(written.contains("go_toolate;12.5;0.0\n"));

    // go_success trials count for validation but are not written
    assert!(!written.contains("go_success"));
    assert_eq!(written.lines().count(), 1 + 96 * 3 + 1);

    assert!(find(&outcome.contrasts, "go_wrong").is_none());
    assert!(find(&outcome.contrasts, "stop_success - stop_failure").is_some());
    assert!(find(&outcome.contrasts, "Effects of interest").is_some());
    assert_eq!(outcome.removed.iter().collect::<Vec<_>>(), vec!["go_wrong"]);
}

#[test]
fn onset_artifact_round_trips() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(dir.path(), &baseline_trials());
    let config = SessionConfig::new().with_delimiter(',');

    let outcome = SessionProcessor::new(config)
        .process(&log, Timepoint::Baseline, ProtocolModel::A, dir.path())
        .unwrap();

    let reread = OnsetReader::new(',').read_file(&outcome.onset_file).unwrap();
    assert_eq!(reread, outcome.events);
    assert_eq!(reread.last(), Some(&OnsetEvent::missing("go_wrong")));
}

#[test]
fn restart_discards_earlier_trials() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();

    // A false start of 3 trials, then the real run from a reset clock
    let mut trials = vec![(50_000, "STOP_FAILURE"), (52_000, "STOP_FAILURE"), (54_000, "GO_WRONG_KEY_RESPONSE")];
    trials.extend(baseline_trials());
    let log = write_log(dir.path(), &trials);

    let outcome = SessionProcessor::default()
        .process(&log, Timepoint::Baseline, ProtocolModel::A, dir.path())
        .unwrap();

    assert_eq!(outcome.stats.restarts, 1);
    assert_eq!(outcome.stats.trials, 480);
    // The only go_wrong trial happened before the restart
    assert!(outcome.missing.contains("go_wrong"));
}

#[test]
fn short_baseline_session_is_rejected() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let trials: Vec<(i64, &str)> = baseline_trials().into_iter().take(400).collect();
    let log = write_log(dir.path(), &trials);

    let err = SessionProcessor::default()
        .process(&log, Timepoint::Baseline, ProtocolModel::A, dir.path())
        .unwrap_err();

    assert!(err.is_validation());
    assert!(matches!(err, EventsError::TrialCount { count: 400, .. }));
}

#[test]
fn follow_up_session_accepts_any_count() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let trials: Vec<(i64, &str)> = baseline_trials().into_iter().take(120).collect();
    let log = write_log(dir.path(), &trials);

    let outcome = SessionProcessor::default()
        .process(&log, Timepoint::FollowUp2, ProtocolModel::B, dir.path())
        .unwrap();

    assert_eq!(outcome.stats.matched_trials, 120);
    // Model B keeps go_success in the onset file
    assert!(outcome.events.iter().any(|e| e.condition == "go_success"));
    assert!(find(&outcome.contrasts, "go_wrong - go_success").is_none());
    assert!(find(&outcome.contrasts, "stop_success - go_success").is_some());
    assert!(find(&outcome.contrasts, "Effects of interest").is_none());
}

use std::{fs, path::Path};

use tempfile::tempdir;
use unittrack::{
    CapturedOutput, Console, LogEntry, ManualClock, RunTracker, SourceLocation, StoreOutcome,
    TrackerConfig, require,
};

struct Harness {
    tracker: RunTracker,
    clock: ManualClock,
    out: CapturedOutput,
    err: CapturedOutput,
}

fn harness(dir: &Path) -> Harness {
    harness_with(TrackerConfig::in_dir(dir))
}

fn harness_with(config: TrackerConfig) -> Harness {
    let clock = ManualClock::new();
    let (console, out, err) = Console::capture();
    let tracker = RunTracker::with_parts(config, console, Box::new(clock.clone()));
    Harness {
        tracker,
        clock,
        out,
        err,
    }
}

fn timed_case(h: &mut Harness, name: &str, elapsed_ns: i64, passes: &[bool]) {
    h.tracker.begin_case(name, &format!("{name} description"));
    h.clock.advance(elapsed_ns);
    for (idx, pass) in passes.iter().enumerate() {
        h.tracker.require(*pass, &format!("{name}_check_{idx}"));
    }
    h.tracker.end_case();
}

fn read(dir: &Path, file: &str) -> String {
    fs::read_to_string(dir.join(file)).expect("store file")
}

#[test]
fn test_clean_directory_run_writes_all_stores() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    timed_case(&mut h, "A", 100, &[true, true]);
    timed_case(&mut h, "B", 50, &[true, false]);

    assert!(h.tracker.is_dirty());
    assert_eq!(h.tracker.finish(), 1);
    assert!(!h.tracker.is_dirty());

    assert_eq!(read(dir.path(), "timings.txt"), "100 A\n50 B\n");
    assert_eq!(read(dir.path(), "results.txt"), "0 A\n1 B\n");
    assert_eq!(
        read(dir.path(), "profile.txt"),
        "A\n  A_check_0\n  A_check_1\nB\n  B_check_0\n  B_check_1\n"
    );
    assert!(!h.err.contents().contains("too slow"));
    let out = h.out.contents();
    assert!(out.contains("A - A description\n"));
    assert!(out.contains("A -> 100ns\n"));
    assert!(out.contains("Generating test timings in text file"));
}

#[test]
fn test_second_run_flags_slow_case_only() {
    let dir = tempdir().expect("tempdir");
    let mut first = harness(dir.path());
    timed_case(&mut first, "A", 100, &[true]);
    timed_case(&mut first, "B", 50, &[false]);
    first.tracker.finish();

    let mut second = harness(dir.path());
    timed_case(&mut second, "A", 200, &[true]);
    timed_case(&mut second, "B", 50, &[false]);

    let err = second.err.contents();
    assert!(err.contains("After running test case \"A\" - \"A description\""));
    assert!(err.contains("Test was too slow (previous: 100ns, current: 200ns)"));
    assert!(!err.contains("After running test case \"B\""));
    let out = second.out.contents();
    assert!(out.contains("A -> 200ns (100% slower than previous)"));
    assert!(out.contains("B -> 50ns (0% faster than previous)"));

    assert!(!second.tracker.is_dirty());
    let report = second.tracker.flush();
    assert!(matches!(report.timings, StoreOutcome::Skipped));
    assert_eq!(read(dir.path(), "timings.txt"), "100 A\n50 B\n");
}

#[test]
fn test_new_case_never_warns_even_with_tiny_tolerance() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    h.tracker.set_tolerance(0.0001);
    timed_case(&mut h, "fresh", 1_000_000, &[true]);
    assert!(h.err.contents().is_empty());
    assert_eq!(h.tracker.timings().get("fresh"), Some(1_000_000));
}

#[test]
fn test_timings_off_skips_recording_and_warning() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("timings.txt"), "10 A\n").expect("seed");
    let mut h = harness(dir.path());
    h.tracker.timings_off();
    timed_case(&mut h, "A", 10_000, &[true]);
    timed_case(&mut h, "B", 10_000, &[true]);

    assert!(h.err.contents().is_empty());
    assert!(!h.tracker.is_dirty());
    assert_eq!(h.tracker.timings().get("B"), None);
    assert!(!h.out.contents().contains(" -> "));

    let report = h.tracker.flush();
    assert!(matches!(report.timings, StoreOutcome::Skipped));
    assert_eq!(read(dir.path(), "timings.txt"), "10 A\n");
}

#[test]
fn test_negative_tolerance_disables_timing() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    h.tracker.set_tolerance(-1.0);
    timed_case(&mut h, "A", 10, &[]);
    assert!(!h.tracker.is_dirty());
    assert!(!h.tracker.is_running());
}

#[test]
fn test_zero_previous_duration_does_not_warn() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("timings.txt"), "0 A\n").expect("seed");
    let mut h = harness(dir.path());
    timed_case(&mut h, "A", 500, &[true]);
    assert!(h.err.contents().is_empty());
    assert!(
        h.out
            .contents()
            .contains("A -> 500ns (no usable previous timing)")
    );
}

#[test]
fn test_report_failure_counts_exactly_once() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    h.tracker.begin_case("counting", "Failures accumulate.");
    h.tracker.check_assertion("x == y");
    h.tracker.report_failure(SourceLocation::new("lib.rs", 12));
    assert_eq!(h.tracker.error_count(), 1);
    assert_eq!(h.tracker.case_errors("counting"), Some(1));
    h.tracker.report_failure(SourceLocation::new("lib.rs", 13));
    assert_eq!(h.tracker.error_count(), 2);
    assert_eq!(h.tracker.case_errors("counting"), Some(2));
    h.tracker.end_case();

    let err = h.err.contents();
    assert!(err.contains("While running test case \"counting\" - \"Failures accumulate.\""));
    assert!(err.contains("(in file: lib.rs, on line: 12)"));
    assert!(err.contains("Requirement (x == y) failed"));
}

#[test]
fn test_begin_case_resets_case_tally() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    timed_case(&mut h, "again", 1, &[false]);
    timed_case(&mut h, "again", 1, &[]);
    assert_eq!(h.tracker.case_errors("again"), Some(0));
    assert_eq!(h.tracker.error_count(), 1);
}

#[test]
fn test_require_macro_reports_caller_location() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    h.tracker.begin_case("macro", "Macro labels.");
    let value = 3;
    assert!(!require!(h.tracker, value == 4));
    h.tracker.end_case();

    let err = h.err.contents();
    assert!(err.contains("Requirement (value == 4) failed"));
    assert!(err.contains("tracker_tests.rs"));
}

#[test]
fn test_profiling_off_logs_case_starts_only() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    h.tracker.set_profiling(false);
    timed_case(&mut h, "quiet", 5, &[true, false]);
    assert_eq!(
        h.tracker.assertion_log().entries(),
        &[LogEntry::CaseStarted("quiet".into())]
    );
    h.tracker.finish();
    assert_eq!(read(dir.path(), "profile.txt"), "quiet\n");
    assert_eq!(read(dir.path(), "results.txt"), "1 quiet\n");
}

#[test]
fn test_next_case_ends_previous_and_starts_continuation() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    h.tracker.begin_case("part1", "First half.");
    h.clock.advance(30);
    h.tracker.next_case("part2", "Second half.");
    h.clock.advance(70);
    h.tracker.end_case();

    assert_eq!(h.tracker.timings().get("part1"), Some(30));
    assert_eq!(h.tracker.timings().get("part2"), Some(70));
    assert_eq!(h.tracker.assertion_log().case_order(), vec!["part1", "part2"]);
}

#[test]
fn test_quiet_tracker_prints_no_progress() {
    let dir = tempdir().expect("tempdir");
    let mut config = TrackerConfig::in_dir(dir.path());
    config.verbose = false;
    let mut h = harness_with(config);
    timed_case(&mut h, "A", 100, &[true]);
    assert!(h.out.contents().is_empty());
}

#[test]
fn test_end_case_without_running_case_is_harmless() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    h.tracker.end_case();
    assert!(!h.tracker.is_dirty());
    assert_eq!(h.tracker.error_count(), 0);
}

#[test]
fn test_flush_failure_is_reported_not_fatal() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(&dir.path().join("missing"));
    timed_case(&mut h, "A", 100, &[false]);

    let report = h.tracker.flush();
    assert!(!report.all_ok());
    assert_eq!(report.failures().len(), 3);
    assert!(h.tracker.is_dirty());
    assert_eq!(h.tracker.finish(), 1);
}

#[test]
fn test_summary_lists_better_and_worse_cases() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("results.txt"), "1 A\n0 B\n2 C\n").expect("seed");
    let mut h = harness(dir.path());
    timed_case(&mut h, "A", 10, &[true]);
    timed_case(&mut h, "B", 10, &[false]);
    timed_case(&mut h, "C", 10, &[false, false]);
    timed_case(&mut h, "D", 10, &[false]);

    let summary = h.tracker.summarize();
    assert_eq!(summary.better, vec!["A".to_string()]);
    assert_eq!(summary.worse, vec!["B".to_string(), "D".to_string()]);
    assert_eq!(summary.errors, 4);

    h.out.clear();
    h.err.clear();
    assert_eq!(h.tracker.summary(), 4);
    let out = h.out.contents();
    let err = h.err.contents();
    assert!(out.contains("Test Result Summary"));
    assert!(out.contains("better than in the previous test run:\n  A\n"));
    assert!(err.contains("worse than in the previous test run:\n  B\n  D\n"));
    assert!(err.contains("4 ERROR(S) encountered!."));
}

#[test]
fn test_summary_all_passed() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    timed_case(&mut h, "A", 10, &[true]);
    assert_eq!(h.tracker.summary(), 0);
    assert!(h.out.contents().contains("All tests passed."));
    assert!(h.err.contents().is_empty());
}

#[test]
fn test_display_shows_state() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    h.tracker.begin_case("shown", "Display state.");
    h.tracker.check_assertion("flag");
    let text = h.tracker.to_string();
    assert!(text.contains("Test Case:\tshown()"));
    assert!(text.contains("Condition:\tflag"));
    assert!(text.contains("Tolerance:\t25"));
}

#[test]
fn test_partial_run_keeps_entries_of_cases_not_run() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("timings.txt"), "100 keep\n200 skip\n").expect("seed");
    fs::write(dir.path().join("results.txt"), "0 keep\n3 skip\n").expect("seed");

    let mut h = harness(dir.path());
    timed_case(&mut h, "keep", 100, &[true]);
    timed_case(&mut h, "fresh", 40, &[false]);
    assert_eq!(h.tracker.finish(), 1);

    assert_eq!(
        read(dir.path(), "timings.txt"),
        "100 keep\n40 fresh\n200 skip\n"
    );
    assert_eq!(read(dir.path(), "results.txt"), "0 keep\n1 fresh\n3 skip\n");

    let mut next = harness(dir.path());
    assert_eq!(next.tracker.timings().get("skip"), Some(200));
    assert_eq!(next.tracker.previous_results().get("skip"), Some(3));
    timed_case(&mut next, "skip", 200, &[]);
    assert_eq!(next.tracker.summarize().better, vec!["skip".to_string()]);
}

#[test]
fn test_multiline_label_stays_on_one_profile_line() {
    let dir = tempdir().expect("tempdir");
    let mut h = harness(dir.path());
    h.tracker.begin_case("wrapped", "Multi-line label.");
    h.tracker.check_assertion("first\nsecond\r\nthird");
    h.tracker.end_case();
    h.tracker.finish();
    assert_eq!(
        read(dir.path(), "profile.txt"),
        "wrapped\n  first second  third\n"
    );
}

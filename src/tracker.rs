//! The run tracker: case boundaries, assertion accounting, timing checks and
//! the end-of-run flush.
//!
//! One [`RunTracker`] is built per test run and handed by `&mut` to every case
//! body. Previous-run stores are loaded when it is built and written back by
//! [`RunTracker::finish`].
//!
//! ```rust,no_run
//! use unittrack::{RunTracker, TrackerConfig, require};
//!
//! let mut tracker = RunTracker::new(TrackerConfig::default());
//! tracker.begin_case("parse_empty", "Empty input parses to nothing.");
//! require!(tracker, "".split_whitespace().count() == 0);
//! tracker.end_case();
//! let errors = tracker.finish();
//! tracker.summary();
//! std::process::exit(if errors == 0 { 0 } else { 1 });
//! ```

use std::{fmt, panic::Location};

use ahash::AHashSet;

use crate::{
    AssertionLog, Clock, Console, DEFAULT_TOLERANCE, FlushReport, MonotonicClock, ResultStore,
    RunSummary, StoreOutcome, TimingStore, TrackerConfig,
    regression::{self, TimingVerdict},
    store::{self, is_storable_name},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new<T: Into<String>>(file: T, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

pub struct RunTracker {
    config: TrackerConfig,
    console: Console,
    clock: Box<dyn Clock>,
    case: String,
    description: String,
    condition: String,
    errors: usize,
    dirty: bool,
    started_at: Option<i64>,
    timings: TimingStore,
    previous_results: ResultStore,
    case_errors: ResultStore,
    log: AssertionLog,
}

impl RunTracker {
    /// Tracker writing to stdio and timing with the monotonic clock.
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_parts(config, Console::stdio(), Box::new(MonotonicClock::new()))
    }

    pub fn with_parts(config: TrackerConfig, console: Console, clock: Box<dyn Clock>) -> Self {
        let timings = TimingStore::load(&config.timings_path());
        let previous_results = ResultStore::load(&config.results_path());
        tracing::debug!(
            store_dir = %config.store_dir.display(),
            timings = timings.len(),
            results = previous_results.len(),
            "run tracker ready"
        );
        Self {
            config,
            console,
            clock,
            case: String::new(),
            description: String::new(),
            condition: String::new(),
            errors: 0,
            dirty: false,
            started_at: None,
            timings,
            previous_results,
            case_errors: ResultStore::new(),
            log: AssertionLog::new(),
        }
    }

    pub fn begin_case(&mut self, name: &str, description: &str) {
        if self.started_at.is_some() {
            tracing::warn!(
                running = %self.case,
                next = name,
                "case started while another was running; discarding its timing"
            );
        }
        if !is_storable_name(name) {
            tracing::warn!(case = name, "case name cannot be persisted");
        }
        self.case = name.to_string();
        self.description = description.to_string();
        self.case_errors.set(name, 0);
        self.log.case_started(name);
        tracing::debug!(case = name, "case started");
        if self.config.verbose {
            self.console
                .out(format_args!("{} - {}\n", self.case, self.description));
        }
        self.started_at = Some(self.clock.now_ns());
    }

    /// Ends the running case and starts a continuation of it.
    pub fn next_case(&mut self, name: &str, description: &str) {
        self.end_case();
        self.begin_case(name, description);
    }

    pub fn check_assertion(&mut self, label: &str) {
        self.condition = label.to_string();
        if self.config.profiling {
            self.log.assertion(&self.case, label);
        }
    }

    pub fn report_failure(&mut self, location: SourceLocation) {
        self.errors += 1;
        let tally = self.case_errors.get(&self.case).unwrap_or(0);
        self.case_errors.set(&self.case, tally + 1);
        tracing::debug!(case = %self.case, %location, "assertion failed");
        self.console.err(format_args!(
            "\nWhile running test case \"{}\" - \"{}\"\n\t(in file: {}, on line: {})\n\tRequirement ({}) failed\n\n",
            self.case, self.description, location.file, location.line, self.condition
        ));
    }

    /// Checks `condition` under `label`, reporting a failure at the caller's
    /// location when it does not hold.
    #[track_caller]
    pub fn require(&mut self, condition: bool, label: &str) -> bool {
        self.check_assertion(label);
        if !condition {
            self.report_failure(Location::caller().into());
        }
        condition
    }

    pub fn end_case(&mut self) {
        let Some(started_at) = self.started_at.take() else {
            tracing::warn!(case = %self.case, "end_case called with no running case");
            return;
        };
        if self.config.tolerance <= 0.0 {
            return;
        }
        let elapsed = self.clock.now_ns().saturating_sub(started_at);
        let previous = self.timings.get(&self.case);
        match regression::compare(previous, elapsed, self.config.tolerance) {
            TimingVerdict::Disabled => {}
            TimingVerdict::FirstSeen { elapsed_ns } => {
                self.timings.insert_if_absent(&self.case, elapsed_ns);
                self.dirty = true;
                tracing::debug!(case = %self.case, elapsed_ns, "first timing recorded");
                if self.config.verbose {
                    self.console
                        .out(format_args!("{} -> {}ns\n", self.case, elapsed_ns));
                }
            }
            TimingVerdict::Compared(cmp) => {
                if cmp.too_slow {
                    tracing::debug!(
                        case = %self.case,
                        previous_ns = cmp.previous_ns,
                        elapsed_ns = cmp.elapsed_ns,
                        "case slower than tolerance"
                    );
                    self.console.err(format_args!(
                        "\nAfter running test case \"{}\" - \"{}\"\n\tTest was too slow (previous: {}ns, current: {}ns)\n\n",
                        self.case, self.description, cmp.previous_ns, cmp.elapsed_ns
                    ));
                }
                if self.config.verbose {
                    self.console
                        .out(format_args!("{} -> {}\n", self.case, cmp.describe()));
                }
            }
        }
    }

    /// Writes the stores and returns the total error count. Store write
    /// failures are logged; use [`RunTracker::flush`] to inspect them.
    pub fn finish(&mut self) -> usize {
        if self.started_at.is_some() {
            tracing::warn!(case = %self.case, "finishing with a case still running");
        }
        let report = self.flush();
        for err in report.failures() {
            tracing::warn!(%err, "store not updated");
        }
        self.errors
    }

    pub fn flush(&mut self) -> FlushReport {
        let order = self.log.case_order();

        let timings = if self.dirty {
            let path = self.config.timings_path();
            self.console.out(format_args!(
                "Generating test timings in text file {}\n",
                path.display()
            ));
            let timing_order = with_carried(&order, self.timings.names());
            let outcome = StoreOutcome::from_result(self.timings.write(&path, timing_order));
            if outcome.is_written() {
                self.dirty = false;
            }
            outcome
        } else {
            StoreOutcome::Skipped
        };

        let path = self.config.profile_path();
        self.console.out(format_args!(
            "Generating test profile in text file {}\n",
            path.display()
        ));
        let profile =
            StoreOutcome::from_result(store::write_text(&path, &self.log.render_profile()));

        let path = self.config.results_path();
        self.console.out(format_args!(
            "Generating test results in text file {}\n",
            path.display()
        ));
        let mut merged = self.case_errors.clone();
        for name in self.previous_results.names() {
            if let Some(count) = self.previous_results.get(name) {
                merged.insert_if_absent(name, count);
            }
        }
        let result_order = with_carried(&order, self.previous_results.names());
        let results = StoreOutcome::from_result(merged.write(&path, result_order));

        tracing::info!(
            cases = order.len(),
            errors = self.errors,
            timings = ?timings,
            "run flushed"
        );
        FlushReport {
            timings,
            profile,
            results,
        }
    }

    /// Error count changes against the previous run, without printing.
    pub fn summarize(&self) -> RunSummary {
        RunSummary::compare(
            &self.log,
            &self.case_errors,
            &self.previous_results,
            self.errors,
        )
    }

    /// Prints the better/worse case lists and the final verdict line.
    pub fn summary(&mut self) -> usize {
        let summary = self.summarize();
        self.console.out(format_args!("\nTest Result Summary\n"));
        if !summary.worse.is_empty() {
            self.console.err(format_args!(
                "\nThe following test cases are worse than in the previous test run:\n"
            ));
            for case in &summary.worse {
                self.console.err(format_args!("  {case}\n"));
            }
        }
        if !summary.better.is_empty() {
            self.console.out(format_args!(
                "\nThe following test cases are better than in the previous test run:\n"
            ));
            for case in &summary.better {
                self.console.out(format_args!("  {case}\n"));
            }
        }
        if summary.passed() {
            self.console.out(format_args!("\nAll tests passed.\n"));
        } else {
            self.console
                .err(format_args!("\n{} ERROR(S) encountered!.\n", summary.errors));
        }
        summary.errors
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.config.verbose
    }

    pub fn set_profiling(&mut self, profiling: bool) {
        self.config.profiling = profiling;
    }

    pub fn is_profiling(&self) -> bool {
        self.config.profiling
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.config.tolerance = tolerance;
    }

    pub fn tolerance(&self) -> f64 {
        self.config.tolerance
    }

    pub fn timings_off(&mut self) {
        self.set_tolerance(0.0);
    }

    pub fn timings_on(&mut self) {
        self.set_tolerance(DEFAULT_TOLERANCE);
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn case_errors(&self, case: &str) -> Option<usize> {
        self.case_errors.get(case)
    }

    pub fn current_case(&self) -> &str {
        &self.case
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whether new timings are waiting to be written.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn assertion_log(&self) -> &AssertionLog {
        &self.log
    }

    pub fn timings(&self) -> &TimingStore {
        &self.timings
    }

    pub fn previous_results(&self) -> &ResultStore {
        &self.previous_results
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }
}

/// `order` followed by the `stored` names it does not mention, so cases that
/// were not run this time keep their previous lines.
fn with_carried<'a>(order: &[&'a str], stored: Vec<&'a str>) -> Vec<&'a str> {
    let ran: AHashSet<&str> = order.iter().copied().collect();
    let mut all = order.to_vec();
    all.extend(stored.into_iter().filter(|name| !ran.contains(name)));
    all
}

impl fmt::Display for RunTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tTest Case:\t{}()", self.case)?;
        writeln!(f, "\tDescription:\t{}", self.description)?;
        writeln!(f, "\tCondition:\t{}", self.condition)?;
        writeln!(f, "\tVerbose:\t{}", self.config.verbose)?;
        writeln!(f, "\tCurrent Errors:\t{}", self.errors)?;
        writeln!(f, "\tTolerance:\t{}", (self.config.tolerance * 100.0) as i64)
    }
}

impl fmt::Debug for RunTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunTracker")
            .field("case", &self.case)
            .field("errors", &self.errors)
            .field("dirty", &self.dirty)
            .field("running", &self.started_at.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

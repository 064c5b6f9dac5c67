//! Lightweight unit-test run tracker for Test Driven Development.
//!
//! unittrack runs test cases sequentially in one process and keeps three
//! text files between runs:
//!
//! - `timings.txt` - the first recorded duration of every case, used to flag
//!   cases that became slower than the configured tolerance
//! - `results.txt` - failure counts per case, compared by
//!   [`RunTracker::summary`] to list cases that got better or worse
//! - `profile.txt` - every assertion checked, grouped by case
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use unittrack::{Registry, RunTracker, TrackerConfig, require};
//!
//! let registry = Registry::new()
//!     .case("adds", "Addition works.", |t| {
//!         require!(t, 1 + 1 == 2);
//!     })?
//!     .case("splits", "Split then continue.", |t| {
//!         require!(t, "a b".split(' ').count() == 2);
//!         t.next_case("joins", "Join after split.");
//!         require!(t, ["a", "b"].join(" ") == "a b");
//!     })?;
//!
//! let mut tracker = RunTracker::new(TrackerConfig::default());
//! registry.run(&mut tracker);
//! let errors = tracker.finish();
//! tracker.summary();
//! # Ok::<(), unittrack::TrackerError>(())
//! ```

pub mod assertion_log;
pub mod cli;
pub mod clock;
pub mod config;
pub mod console;
pub mod errors;
pub mod regression;
pub mod registry;
pub mod store;
pub mod summary;
pub mod tracker;

pub use crate::assertion_log::{AssertionLog, LogEntry};
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::config::{DEFAULT_TOLERANCE, TrackerConfig};
pub use crate::console::{CapturedOutput, Console};
pub use crate::errors::TrackerError;
pub use crate::regression::{TimingComparison, TimingVerdict};
pub use crate::registry::Registry;
pub use crate::store::{ResultStore, TimingStore};
pub use crate::summary::{FlushReport, RunSummary, StoreOutcome};
pub use crate::tracker::{RunTracker, SourceLocation};

/// Checks a condition on a [`RunTracker`], labelling it with its own source
/// text and reporting the invocation site on failure.
#[macro_export]
macro_rules! require {
    ($tracker:expr, $cond:expr $(,)?) => {
        $tracker.require($cond, stringify!($cond))
    };
}

use crate::{AssertionLog, ResultStore, TrackerError};

/// Per-case error count changes against the previous run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub worse: Vec<String>,
    pub better: Vec<String>,
    pub errors: usize,
}

impl RunSummary {
    /// Classifies every started case; a case missing from `previous` is
    /// compared against zero.
    pub fn compare(
        log: &AssertionLog,
        current: &ResultStore,
        previous: &ResultStore,
        errors: usize,
    ) -> Self {
        let mut summary = Self {
            errors,
            ..Self::default()
        };
        for case in log.case_order() {
            let new = current.get(case).unwrap_or(0);
            let old = previous.get(case).unwrap_or(0);
            if new > old {
                summary.worse.push(case.to_string());
            } else if new < old {
                summary.better.push(case.to_string());
            }
        }
        summary
    }

    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

#[derive(Debug)]
pub enum StoreOutcome {
    Written,
    /// Nothing new to persist.
    Skipped,
    Failed(TrackerError),
}

impl StoreOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, StoreOutcome::Written)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StoreOutcome::Failed(_))
    }

    pub(crate) fn from_result(result: Result<(), TrackerError>) -> Self {
        match result {
            Ok(()) => StoreOutcome::Written,
            Err(err) => StoreOutcome::Failed(err),
        }
    }
}

/// What happened to each store during a flush.
#[derive(Debug)]
pub struct FlushReport {
    pub timings: StoreOutcome,
    pub profile: StoreOutcome,
    pub results: StoreOutcome,
}

impl FlushReport {
    pub fn all_ok(&self) -> bool {
        ![&self.timings, &self.profile, &self.results]
            .iter()
            .any(|outcome| outcome.is_failed())
    }

    pub fn failures(&self) -> Vec<&TrackerError> {
        [&self.timings, &self.profile, &self.results]
            .into_iter()
            .filter_map(|outcome| match outcome {
                StoreOutcome::Failed(err) => Some(err),
                _ => None,
            })
            .collect()
    }
}

use ahash::AHashSet;

use crate::{RunTracker, TrackerError, store::is_storable_name};

type CaseBody = Box<dyn Fn(&mut RunTracker)>;

pub struct RegisteredCase {
    pub name: String,
    pub description: String,
    body: CaseBody,
}

/// Ordered set of runnable cases.
///
/// Each case is run between `begin_case` and `end_case`. A body may split
/// itself into continuations with [`RunTracker::next_case`]; those names are
/// not registered and cannot be run on their own.
#[derive(Default)]
pub struct Registry {
    cases: Vec<RegisteredCase>,
    names: AHashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(
        &mut self,
        name: &str,
        description: &str,
        body: F,
    ) -> Result<(), TrackerError>
    where
        F: Fn(&mut RunTracker) + 'static,
    {
        if !is_storable_name(name) {
            return Err(TrackerError::invalid_case(format!(
                "case name {name:?} must be non-empty and contain no whitespace"
            )));
        }
        if !self.names.insert(name.to_string()) {
            return Err(TrackerError::invalid_case(format!(
                "case {name} registered twice"
            )));
        }
        self.cases.push(RegisteredCase {
            name: name.to_string(),
            description: description.to_string(),
            body: Box::new(body),
        });
        Ok(())
    }

    /// Builder form of [`Registry::register`].
    pub fn case<F>(
        mut self,
        name: &str,
        description: &str,
        body: F,
    ) -> Result<Self, TrackerError>
    where
        F: Fn(&mut RunTracker) + 'static,
    {
        self.register(name, description, body)?;
        Ok(self)
    }

    pub fn names(&self) -> Vec<&str> {
        self.cases.iter().map(|case| case.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Runs every case in registration order and returns the tracker's
    /// running error count.
    pub fn run(&self, tracker: &mut RunTracker) -> usize {
        self.run_matching(tracker, |_| true)
    }

    /// Runs only the cases whose names pass `filter`.
    pub fn run_matching<P>(&self, tracker: &mut RunTracker, filter: P) -> usize
    where
        P: Fn(&str) -> bool,
    {
        for case in self.cases.iter().filter(|case| filter(&case.name)) {
            tracker.begin_case(&case.name, &case.description);
            (case.body)(tracker);
            tracker.end_case();
        }
        tracker.error_count()
    }
}

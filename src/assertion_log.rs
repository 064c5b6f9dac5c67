use ahash::AHashSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEntry {
    CaseStarted(String),
    Assertion { case: String, label: String },
}

/// Insertion-ordered record of case starts and checked assertions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssertionLog {
    entries: Vec<LogEntry>,
}

impl AssertionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_started(&mut self, case: &str) {
        self.entries.push(LogEntry::CaseStarted(case.to_string()));
    }

    pub fn assertion(&mut self, case: &str, label: &str) {
        self.entries.push(LogEntry::Assertion {
            case: case.to_string(),
            label: label.to_string(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case names in the order they were first started.
    pub fn case_order(&self) -> Vec<&str> {
        let mut seen = AHashSet::new();
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                LogEntry::CaseStarted(case) => Some(case.as_str()),
                LogEntry::Assertion { .. } => None,
            })
            .filter(|case| seen.insert(*case))
            .collect()
    }

    pub fn labels_for(&self, case: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                LogEntry::Assertion { case: c, label } if c == case => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Profile text: case lines flush left, labels indented two spaces and
    /// folded onto one line.
    pub fn render_profile(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                LogEntry::CaseStarted(case) => {
                    out.push_str(case);
                }
                LogEntry::Assertion { label, .. } => {
                    out.push_str("  ");
                    out.push_str(&label.replace(['\r', '\n'], " "));
                }
            }
            out.push('\n');
        }
        out
    }
}

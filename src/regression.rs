//! Timing comparison between a case's previous and current durations.

#[derive(Clone, Debug, PartialEq)]
pub enum TimingVerdict {
    /// Tolerance is zero or negative; nothing is measured or recorded.
    Disabled,
    /// No previous duration exists for the case.
    FirstSeen { elapsed_ns: i64 },
    Compared(TimingComparison),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingComparison {
    pub previous_ns: i64,
    pub elapsed_ns: i64,
    pub delta_ns: i64,
    /// `delta / previous`; `None` when the previous duration is not positive.
    pub change: Option<f64>,
    pub too_slow: bool,
}

impl TimingComparison {
    pub fn slower(&self) -> bool {
        self.delta_ns > 0
    }

    /// Whole percent change, truncated toward zero.
    pub fn percent(&self) -> Option<i64> {
        self.change.map(|change| (change * 100.0) as i64)
    }

    pub fn describe(&self) -> String {
        match self.percent() {
            Some(percent) if self.slower() => {
                format!("{}ns ({percent}% slower than previous)", self.elapsed_ns)
            }
            Some(percent) => {
                format!("{}ns ({}% faster than previous)", self.elapsed_ns, -percent)
            }
            None => format!("{}ns (no usable previous timing)", self.elapsed_ns),
        }
    }
}

pub fn compare(previous_ns: Option<i64>, elapsed_ns: i64, tolerance: f64) -> TimingVerdict {
    if tolerance <= 0.0 {
        return TimingVerdict::Disabled;
    }
    let Some(previous_ns) = previous_ns else {
        return TimingVerdict::FirstSeen { elapsed_ns };
    };
    let delta_ns = elapsed_ns.saturating_sub(previous_ns);
    let change = (previous_ns > 0).then(|| delta_ns as f64 / previous_ns as f64);
    let too_slow = delta_ns > 0 && change.is_some_and(|change| change > tolerance);
    TimingVerdict::Compared(TimingComparison {
        previous_ns,
        elapsed_ns,
        delta_ns,
        change,
        too_slow,
    })
}

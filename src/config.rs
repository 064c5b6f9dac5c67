//! Run tracker configuration.
//!
//! A [`TrackerConfig`] controls console verbosity, assertion profiling, the
//! timing tolerance and where the three store files live. Values come from
//! [`Default`], an optional JSON file and `UNITTRACK_*` environment
//! overrides, applied in that order.
//!
//! ```rust
//! use unittrack::TrackerConfig;
//!
//! let config = TrackerConfig::default();
//! assert!(config.verbose);
//! assert!(config.profiling);
//! assert_eq!(config.tolerance, 0.25);
//! assert_eq!(config.timings_path().file_name().unwrap(), "timings.txt");
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::TrackerError;

/// Fractional slowdown allowed before a case is reported as too slow.
pub const DEFAULT_TOLERANCE: f64 = 0.25;

pub const TIMINGS_FILE: &str = "timings.txt";
pub const RESULTS_FILE: &str = "results.txt";
pub const PROFILE_FILE: &str = "profile.txt";

pub const ENV_DIR: &str = "UNITTRACK_DIR";
pub const ENV_TOLERANCE: &str = "UNITTRACK_TOLERANCE";
pub const ENV_VERBOSE: &str = "UNITTRACK_VERBOSE";
pub const ENV_PROFILE: &str = "UNITTRACK_PROFILE";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Echo case starts and durations to standard output.
    pub verbose: bool,
    /// Record every checked assertion label in the profile log.
    pub profiling: bool,
    /// Allowed slowdown as a fraction; `<= 0.0` disables timing entirely.
    pub tolerance: f64,
    /// Directory the store files are read from and written to.
    pub store_dir: PathBuf,
    pub timings_file: String,
    pub results_file: String,
    pub profile_file: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            verbose: true,
            profiling: true,
            tolerance: DEFAULT_TOLERANCE,
            store_dir: PathBuf::from("."),
            timings_file: TIMINGS_FILE.to_string(),
            results_file: RESULTS_FILE.to_string(),
            profile_file: PROFILE_FILE.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Default configuration rooted at `dir`.
    pub fn in_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            store_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Reads a JSON configuration file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, TrackerError> {
        let data = fs::read(path)
            .map_err(|e| TrackerError::config(format!("{}: {e}", path.display())))?;
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(&data)
            .map_err(|e| TrackerError::config(format!("{}: {e}", path.display())))
    }

    /// Applies `UNITTRACK_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, TrackerError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup, keyed by the `UNITTRACK_*`
    /// variable names.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DIR) {
            self.store_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_TOLERANCE) {
            self.tolerance = parse_tolerance(&raw)?;
        }
        if let Some(raw) = lookup(ENV_VERBOSE) {
            self.verbose = parse_flag(ENV_VERBOSE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PROFILE) {
            self.profiling = parse_flag(ENV_PROFILE, &raw)?;
        }
        Ok(self)
    }

    pub fn timings_path(&self) -> PathBuf {
        self.store_dir.join(&self.timings_file)
    }

    pub fn results_path(&self) -> PathBuf {
        self.store_dir.join(&self.results_file)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.store_dir.join(&self.profile_file)
    }
}

pub fn parse_tolerance(raw: &str) -> Result<f64, TrackerError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| TrackerError::config(format!("tolerance {raw:?} is not a number")))?;
    if !value.is_finite() {
        return Err(TrackerError::config(format!(
            "tolerance {raw:?} must be finite"
        )));
    }
    Ok(value)
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, TrackerError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => Err(TrackerError::config(format!(
            "{key} expects a boolean, got {other:?}"
        ))),
    }
}

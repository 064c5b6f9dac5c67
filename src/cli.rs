use std::path::PathBuf;

use crate::{
    TrackerConfig, TrackerError,
    config::parse_tolerance,
};

#[derive(Clone, Debug, PartialEq)]
pub struct CommandLineConfig {
    pub config_file: Option<PathBuf>,
    pub store_dir: Option<PathBuf>,
    pub tolerance: Option<f64>,
    pub quiet: bool,
    pub no_profile: bool,
    pub summary: bool,
    pub strict: bool,
    pub values: Vec<i64>,
}

impl Default for CommandLineConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            store_dir: None,
            tolerance: None,
            quiet: false,
            no_profile: false,
            summary: true,
            strict: false,
            values: Vec::new(),
        }
    }
}

impl CommandLineConfig {
    /// Parses `args`, skipping the program name in `args[0]`.
    pub fn from_args(args: &[&str]) -> Result<Self, TrackerError> {
        let mut cfg = Self::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match *arg {
                "--config" => {
                    cfg.config_file = Some(PathBuf::from(required(&mut iter, "--config")?));
                }
                "--dir" => {
                    cfg.store_dir = Some(PathBuf::from(required(&mut iter, "--dir")?));
                }
                "--tolerance" => {
                    let raw = required(&mut iter, "--tolerance")?;
                    cfg.tolerance = Some(
                        parse_tolerance(raw)
                            .map_err(|e| TrackerError::invalid_argument(e.to_string()))?,
                    );
                }
                "--timings-off" => cfg.tolerance = Some(0.0),
                "-q" | "--quiet" => cfg.quiet = true,
                "--no-profile" => cfg.no_profile = true,
                "--no-summary" => cfg.summary = false,
                "--strict" => cfg.strict = true,
                other if other.starts_with('-') && other.parse::<i64>().is_err() => {
                    return Err(TrackerError::invalid_argument(format!("unknown flag {other}")));
                }
                value => {
                    let parsed = value.parse().map_err(|_| {
                        TrackerError::invalid_argument(format!("{value} is not an integer"))
                    })?;
                    cfg.values.push(parsed);
                }
            }
        }
        Ok(cfg)
    }

    /// Layers these flags over `base`.
    pub fn apply(&self, mut base: TrackerConfig) -> TrackerConfig {
        if let Some(dir) = &self.store_dir {
            base.store_dir = dir.clone();
        }
        if let Some(tolerance) = self.tolerance {
            base.tolerance = tolerance;
        }
        if self.quiet {
            base.verbose = false;
        }
        if self.no_profile {
            base.profiling = false;
        }
        base
    }

    /// Error count the self-test suite is expected to end with.
    pub fn expected_errors(&self) -> usize {
        if self.strict { 0 } else { 1 }
    }

    pub fn help() -> &'static str {
        "Usage: unittrack [--config FILE] [--dir PATH] [--tolerance F | --timings-off] \
         [--quiet] [--no-profile] [--no-summary] [--strict] [VALUE...]\n"
    }
}

fn required<'a, 'b, I>(iter: &mut I, flag: &str) -> Result<&'b str, TrackerError>
where
    'b: 'a,
    I: Iterator<Item = &'a &'b str>,
{
    iter.next()
        .copied()
        .ok_or_else(|| TrackerError::invalid_argument(format!("{flag} requires a value")))
}

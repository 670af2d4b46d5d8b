use std::str::FromStr;

use crate::limits::{DEFAULT_JOB_CAPACITY, MAX_JOB_CAPACITY};

pub const DEFAULT_CHANNEL_DEPTH: usize = 1024;

/// Runtime settings for the binary, read from `CAMPUS_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Job queue capacity, clamped to `MAX_JOB_CAPACITY`.
    pub job_capacity: usize,
    /// Prometheus listener port; metrics are disabled when unset.
    pub metrics_port: Option<u16>,
    /// Bound of each worker's command channel.
    pub channel_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            job_capacity: DEFAULT_JOB_CAPACITY,
            metrics_port: None,
            channel_depth: DEFAULT_CHANNEL_DEPTH,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing or unparseable values
    /// fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            job_capacity: parse(&lookup, "CAMPUS_JOB_CAPACITY")
                .unwrap_or(defaults.job_capacity)
                .min(MAX_JOB_CAPACITY),
            metrics_port: parse(&lookup, "CAMPUS_METRICS_PORT"),
            channel_depth: parse(&lookup, "CAMPUS_CHANNEL_DEPTH")
                .filter(|&d| d > 0)
                .unwrap_or(defaults.channel_depth),
        }
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}

use crate::activity::DEFAULT_ACTIVITY_CAPACITY;
use crate::sessions::DEFAULT_MAX_SESSIONS;
use chrono::{FixedOffset, Offset, Utc};
use std::{env, str::FromStr, time::Duration};
use tracing::warn;

/// São Paulo has observed no daylight saving time since 2019.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub utc_offset: FixedOffset,
    pub session_max_age: Duration,
    pub sweep_interval: Duration,
    pub max_sessions: usize,
    pub activity_capacity: usize,
    /// Base URL the served emitter posts to; the script's own origin when unset.
    pub public_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            utc_offset: offset_from_minutes(DEFAULT_UTC_OFFSET_MINUTES)
                .unwrap_or_else(|| Utc.fix()),
            session_max_age: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
            max_sessions: DEFAULT_MAX_SESSIONS,
            activity_capacity: DEFAULT_ACTIVITY_CAPACITY,
            public_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source; unparseable values
    /// fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let utc_offset = parse_var::<i32>(&lookup, "TRACKER_UTC_OFFSET_MINUTES")
            .and_then(|minutes| {
                let offset = offset_from_minutes(minutes);
                if offset.is_none() {
                    warn!(minutes, "TRACKER_UTC_OFFSET_MINUTES out of range, using default");
                }
                offset
            })
            .unwrap_or(defaults.utc_offset);

        Self {
            port: parse_var(&lookup, "PORT").unwrap_or(defaults.port),
            utc_offset,
            session_max_age: parse_var(&lookup, "TRACKER_SESSION_MAX_AGE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_max_age),
            sweep_interval: parse_var(&lookup, "TRACKER_SWEEP_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            max_sessions: parse_var(&lookup, "TRACKER_MAX_SESSIONS").unwrap_or(defaults.max_sessions),
            activity_capacity: parse_var(&lookup, "TRACKER_ACTIVITY_CAPACITY")
                .unwrap_or(defaults.activity_capacity),
            public_url: lookup("TRACKER_PUBLIC_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable config value");
            None
        }
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

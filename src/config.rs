use std::env;
use std::time::Duration;

use crate::packet::ProtocolRevision;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u32 = 7777;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);
/// Above this many players the `d` request is skipped by default.
pub const DEFAULT_ROSTER_LIMIT: u16 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Hostname or dotted-quad address.
    pub host: String,
    /// Kept wide so an out-of-range value reaches validation instead of
    /// being silently truncated.
    pub port: u32,
    /// Per-request timeout; each of the three stages gets the full window.
    pub timeout: Duration,
    pub revision: ProtocolRevision,
    /// Skip the player list when `playersOnline` exceeds this. `None` always fetches it.
    pub large_roster_threshold: Option<u16>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            revision: ProtocolRevision::Current,
            large_roster_threshold: Some(DEFAULT_ROSTER_LIMIT),
        }
    }
}

impl QueryConfig {
    /// Defaults overridden by `SAMP_HOST`, `SAMP_PORT`, `SAMP_TIMEOUT_MS`,
    /// `SAMP_LEGACY` and `SAMP_ROSTER_LIMIT` (`0` or `off` disables the limit).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("SAMP_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.host),

            port: lookup("SAMP_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),

            timeout: lookup("SAMP_TIMEOUT_MS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),

            revision: match lookup("SAMP_LEGACY").as_deref().map(str::trim) {
                Some("1") | Some("true") | Some("yes") => ProtocolRevision::Legacy,
                _ => defaults.revision,
            },

            large_roster_threshold: match lookup("SAMP_ROSTER_LIMIT") {
                Some(v) if matches!(v.trim(), "0" | "off" | "none") => None,
                Some(v) => v.trim().parse().ok().or(defaults.large_roster_threshold),
                None => defaults.large_roster_threshold,
            },
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u32) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_revision(mut self, revision: ProtocolRevision) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_large_roster_threshold(mut self, threshold: Option<u16>) -> Self {
        self.large_roster_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = QueryConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7777);
        assert_eq!(config.timeout, Duration::from_millis(1000));
        assert_eq!(config.revision, ProtocolRevision::Current);
        assert_eq!(config.large_roster_threshold, Some(100));
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(QueryConfig::from_lookup(lookup(&[])), QueryConfig::default());
    }

    #[test]
    fn environment_overrides() {
        let config = QueryConfig::from_lookup(lookup(&[
            ("SAMP_HOST", "samp.example.net"),
            ("SAMP_PORT", "7778"),
            ("SAMP_TIMEOUT_MS", "250"),
            ("SAMP_LEGACY", "1"),
            ("SAMP_ROSTER_LIMIT", "off"),
        ]));
        assert_eq!(config.host, "samp.example.net");
        assert_eq!(config.port, 7778);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.revision, ProtocolRevision::Legacy);
        assert_eq!(config.large_roster_threshold, None);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let config = QueryConfig::from_lookup(lookup(&[
            ("SAMP_PORT", "seven"),
            ("SAMP_TIMEOUT_MS", "-5"),
            ("SAMP_ROSTER_LIMIT", "lots"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.large_roster_threshold, Some(DEFAULT_ROSTER_LIMIT));
    }
}

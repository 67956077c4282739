//! Provisioning configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default dataset size limit: 100 GiB.
pub const DEFAULT_MAXIMUM_SIZE_BYTES: u64 = 107_374_182_400;

/// Knobs for the create-or-find-then-wait protocol.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProvisionConfig {
    /// Delay between state lookups while waiting, in milliseconds.
    #[serde(default = "ProvisionConfig::default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Upper bound on the convergence wait, in milliseconds.
    #[serde(default = "ProvisionConfig::default_timeout")]
    pub timeout_ms: u64,

    /// Size limit requested for newly created datasets.
    #[serde(default = "ProvisionConfig::default_maximum_size")]
    pub maximum_size_bytes: u64,
}

impl ProvisionConfig {
    const fn default_poll_interval() -> u64 {
        5_000
    }

    const fn default_timeout() -> u64 {
        120_000 // 2 minutes
    }

    const fn default_maximum_size() -> u64 {
        DEFAULT_MAXIMUM_SIZE_BYTES
    }

    /// Set the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = duration_millis(interval);
        self
    }

    /// Set the convergence timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = duration_millis(timeout);
        self
    }

    /// Get the poll interval as a `Duration`.
    ///
    /// Never zero, since a zero-period ticker is not allowed.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Get the convergence timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: Self::default_poll_interval(),
            timeout_ms: Self::default_timeout(),
            maximum_size_bytes: Self::default_maximum_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ProvisionConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.maximum_size_bytes, 107_374_182_400);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: ProvisionConfig = serde_json::from_str(r#"{"timeout_ms": 500}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(500));
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = ProvisionConfig::default().with_poll_interval(Duration::ZERO);
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}

//! Retry configuration for asset uploads.
//!
//! Limits come from the environment so they can be tuned per CI runner
//! without touching the release configuration file.

use std::time::Duration;

/// Configuration for upload retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Max retries per asset after the first attempt
    pub file_uploads: u32,

    /// Delay before the first retry; doubles on each further retry
    pub base_delay: Duration,

    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            file_uploads: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Parse a value from an environment variable with clamping to maximum
    ///
    /// # Arguments
    /// * `var_name` - Environment variable name (e.g., "SHIPWRIGHT_RETRY_UPLOADS")
    /// * `default` - Default value if variable is not set or invalid
    /// * `max` - Maximum allowed value (values above this are clamped)
    fn parse_env(var_name: &str, default: u32, max: u32) -> u32 {
        Self::parse_value(std::env::var(var_name).ok().as_deref(), default, max)
    }

    fn parse_value(raw: Option<&str>, default: u32, max: u32) -> u32 {
        raw.and_then(|s| s.trim().parse::<u32>().ok())
            .map(|v| v.min(max))
            .unwrap_or(default)
    }

    /// Create config from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            file_uploads: Self::parse_env("SHIPWRIGHT_RETRY_UPLOADS", defaults.file_uploads, 20),
            base_delay: Duration::from_millis(u64::from(Self::parse_env(
                "SHIPWRIGHT_RETRY_DELAY_MS",
                1000,
                60_000,
            ))),
            max_delay: defaults.max_delay,
        }
    }

    /// Config that retries immediately
    pub fn immediate(file_uploads: u32) -> Self {
        Self {
            file_uploads,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_clamps_to_max() {
        assert_eq!(RetryConfig::parse_value(Some("50"), 10, 20), 20);
        assert_eq!(RetryConfig::parse_value(Some(" 3 "), 10, 20), 3);
    }

    #[test]
    fn test_parse_value_falls_back_to_default() {
        assert_eq!(RetryConfig::parse_value(None, 10, 20), 10);
        assert_eq!(RetryConfig::parse_value(Some("many"), 10, 20), 10);
    }

    #[test]
    fn test_delay_doubles_up_to_max() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(1), Duration::from_secs(1));
        assert_eq!(config.delay_for(2), Duration::from_secs(2));
        assert_eq!(config.delay_for(4), Duration::from_secs(8));
        assert_eq!(config.delay_for(10), Duration::from_secs(60));
    }
}

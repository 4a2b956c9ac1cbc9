//! Retry configuration for the retryable pipeline stages.
//!
//! Only draft creation and the publish call are ever retried, and only for
//! transport failures. Asset uploads are attempted exactly once per run.

use super::EnvConfig;
use crate::error::ConfigError;
use std::time::Duration;

/// Upper bound for any configured attempt count
pub const MAX_ATTEMPTS: u32 = 10;

/// Maximum backoff between two attempts (1 hour)
const MAX_BACKOFF: Duration = Duration::from_secs(3600);

/// Configuration for retry behavior of the draft-creation and publish stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts for `create_release` (1 = no retry)
    pub create_release: u32,

    /// Total attempts for the final `set_draft_state(false)` call
    pub publish_release: u32,

    /// Delay before the first retry; doubled on every further retry
    pub base_delay: Duration,

    /// Cap applied to the doubled delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            create_release: 3,
            publish_release: 3,
            base_delay: Duration::from_secs(1),
            max_delay: MAX_BACKOFF,
        }
    }
}

impl RetryConfig {
    /// No retries and no waiting. Used by tests and `--no-retry`.
    pub fn none() -> Self {
        Self {
            create_release: 1,
            publish_release: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Parse an attempt count from the environment, clamped to `[1, MAX_ATTEMPTS]`
    fn parse_attempts(env: &EnvConfig, var_name: &str, default: u32) -> u32 {
        env.get(var_name)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .map(|v| v.clamp(1, MAX_ATTEMPTS))
            .unwrap_or(default)
    }

    /// Create config from environment variables with fallback to defaults
    pub fn from_env(env: &EnvConfig) -> Self {
        let defaults = Self::default();
        Self {
            create_release: Self::parse_attempts(env, "RELEASE_RETRY_CREATE", defaults.create_release),
            publish_release: Self::parse_attempts(
                env,
                "RELEASE_RETRY_PUBLISH",
                defaults.publish_release,
            ),
            ..defaults
        }
    }

    /// Validate attempt counts are reasonable
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("create_release", self.create_release),
            ("publish_release", self.publish_release),
        ] {
            if value == 0 || value > MAX_ATTEMPTS {
                return Err(ConfigError::InvalidRetry {
                    reason: format!("{name} attempts must be in 1..={MAX_ATTEMPTS}, got {value}"),
                });
            }
        }
        if self.base_delay > self.max_delay {
            return Err(ConfigError::InvalidRetry {
                reason: "base_delay exceeds max_delay".to_string(),
            });
        }
        Ok(())
    }

    /// Backoff before retry number `retry` (1-based): base, 2×base, 4×base, … capped
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = RetryConfig {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            ..RetryConfig::default()
        };
        assert_eq!(config.backoff(1), Duration::from_secs(1));
        assert_eq!(config.backoff(2), Duration::from_secs(2));
        assert_eq!(config.backoff(3), Duration::from_secs(4));
        assert_eq!(config.backoff(4), Duration::from_secs(5));
    }

    #[test]
    fn test_from_env_clamps() {
        let env = EnvConfig::from_pairs([
            ("RELEASE_RETRY_CREATE", "50"),
            ("RELEASE_RETRY_PUBLISH", "0"),
        ]);
        let config = RetryConfig::from_env(&env);
        assert_eq!(config.create_release, MAX_ATTEMPTS);
        assert_eq!(config.publish_release, 1);
    }

    #[test]
    fn test_from_env_ignores_garbage() {
        let env = EnvConfig::from_pairs([("RELEASE_RETRY_CREATE", "three")]);
        assert_eq!(RetryConfig::from_env(&env).create_release, 3);
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = RetryConfig {
            create_release: 0,
            ..RetryConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(RetryConfig::default().validate().is_ok());
        assert!(RetryConfig::none().validate().is_ok());
    }
}

use std::time::Duration;

/// Funnel limiter configuration.
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    /// How long an untouched funnel survives in the store.
    /// Must exceed the idle gap between bursts, or funnels reset to full early.
    pub state_ttl: Duration,
    /// Prefix for state and lock keys.
    pub key_prefix: String,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            state_ttl: Duration::from_secs(60),
            key_prefix: "funnel".to_string(),
        }
    }
}

impl LimiterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            state_ttl: Duration::from_secs(
                std::env::var("FUNNEL_STATE_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            key_prefix: std::env::var("FUNNEL_KEY_PREFIX")
                .unwrap_or_else(|_| "funnel".to_string()),
        }
    }

    /// Store key holding the funnel state for `key`.
    pub fn state_key(&self, key: &str) -> String {
        format!("{}:state:{}", self.key_prefix, key)
    }

    /// Lock name guarding the funnel for `key`.
    pub fn lock_key(&self, key: &str) -> String {
        format!("{}:lock:{}", self.key_prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_prefixed_and_distinct() {
        let config = LimiterConfig::default();

        assert_eq!(config.state_key("user:42"), "funnel:state:user:42");
        assert_eq!(config.lock_key("user:42"), "funnel:lock:user:42");
    }

    #[test]
    fn test_from_env_parses_and_falls_back() {
        // Only this test touches FUNNEL_* variables.
        unsafe {
            std::env::set_var("FUNNEL_STATE_TTL_SECS", "300");
            std::env::set_var("FUNNEL_KEY_PREFIX", "api");
        }
        let config = LimiterConfig::from_env();
        assert_eq!(config.state_ttl, Duration::from_secs(300));
        assert_eq!(config.lock_key("u1"), "api:lock:u1");

        unsafe {
            std::env::set_var("FUNNEL_STATE_TTL_SECS", "five minutes");
            std::env::remove_var("FUNNEL_KEY_PREFIX");
        }
        let config = LimiterConfig::from_env();
        assert_eq!(config.state_ttl, Duration::from_secs(60));
        assert_eq!(config.key_prefix, "funnel");

        unsafe {
            std::env::remove_var("FUNNEL_STATE_TTL_SECS");
        }
    }
}

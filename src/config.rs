//! Runtime configuration for a [`Factory`](crate::lifecycle::Factory).

use crate::error::FactoryError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Initial gate states and the optional bound on admission waits.
///
/// Missing fields fall back to [`FactoryConfig::default`], so a partial
/// document such as `{"wait_timeout_ms": 500}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Whether the factory starts open to visitors.
    pub visitors_open: bool,
    /// Whether the returning service starts open.
    pub returns_open: bool,
    /// Upper bound for `buy_products` / `steal_products` admission waits.
    /// `None` waits forever.
    pub wait_timeout_ms: Option<u64>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            visitors_open: true,
            returns_open: true,
            wait_timeout_ms: None,
        }
    }
}

impl FactoryConfig {
    pub const VISITORS_OPEN_VAR: &'static str = "FACTORY_VISITORS_OPEN";
    pub const RETURNS_OPEN_VAR: &'static str = "FACTORY_RETURNS_OPEN";
    pub const WAIT_TIMEOUT_VAR: &'static str = "FACTORY_WAIT_TIMEOUT_MS";

    /// Builds a configuration from `FACTORY_*` environment variables.
    ///
    /// Unset variables keep their default; malformed ones are rejected.
    pub fn from_env() -> Result<Self, FactoryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FactoryError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(Self::VISITORS_OPEN_VAR) {
            config.visitors_open = parse_var(Self::VISITORS_OPEN_VAR, &raw)?;
        }
        if let Some(raw) = lookup(Self::RETURNS_OPEN_VAR) {
            config.returns_open = parse_var(Self::RETURNS_OPEN_VAR, &raw)?;
        }
        if let Some(raw) = lookup(Self::WAIT_TIMEOUT_VAR) {
            config.wait_timeout_ms = Some(parse_var(Self::WAIT_TIMEOUT_VAR, &raw)?);
        }
        Ok(config)
    }

    /// Bounds admission waits by `timeout`, rounded up to whole milliseconds
    /// so a sub-millisecond bound never becomes an instant timeout.
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.wait_timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, FactoryError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| FactoryError::InvalidConfig(format!("{key}={raw:?}: {e}")))
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
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_open_both_gates() {
        let config = FactoryConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, FactoryConfig::default());
        assert!(config.visitors_open);
        assert!(config.returns_open);
        assert_eq!(config.wait_timeout(), None);
    }

    #[test]
    fn test_env_overrides() {
        let config = FactoryConfig::from_lookup(lookup(&[
            ("FACTORY_VISITORS_OPEN", "false"),
            ("FACTORY_WAIT_TIMEOUT_MS", " 250 "),
        ]))
        .unwrap();
        assert!(!config.visitors_open);
        assert!(config.returns_open);
        assert_eq!(config.wait_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_malformed_value_is_rejected() {
        let err = FactoryConfig::from_lookup(lookup(&[("FACTORY_RETURNS_OPEN", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, FactoryError::InvalidConfig(msg) if msg.contains("FACTORY_RETURNS_OPEN")));
    }

    #[test]
    fn test_wait_timeout_rounds_up_and_saturates() {
        let config = FactoryConfig::default().with_wait_timeout(Duration::from_micros(300));
        assert_eq!(config.wait_timeout_ms, Some(1));

        let config = FactoryConfig::default().with_wait_timeout(Duration::from_micros(2_500));
        assert_eq!(config.wait_timeout_ms, Some(3));

        let config = FactoryConfig::default().with_wait_timeout(Duration::from_millis(40));
        assert_eq!(config.wait_timeout(), Some(Duration::from_millis(40)));

        let config = FactoryConfig::default().with_wait_timeout(Duration::MAX);
        assert_eq!(config.wait_timeout_ms, Some(u64::MAX));
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: FactoryConfig = serde_json::from_str(r#"{"wait_timeout_ms": 500}"#).unwrap();
        assert!(config.visitors_open);
        assert_eq!(config.wait_timeout(), Some(Duration::from_millis(500)));
    }
}

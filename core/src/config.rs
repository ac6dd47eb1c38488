//! Client configuration loaded from data or the environment.

use serde::Deserialize;

use crate::error::RestError;

pub const DEFAULT_MAX_IDLE_CONNECTIONS_PER_HOST: usize = 5;

/// Settings shared by every request issued through a `Rest` client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RestConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_max_idle")]
    pub max_idle_connections_per_host: usize,
}

fn default_max_idle() -> usize {
    DEFAULT_MAX_IDLE_CONNECTIONS_PER_HOST
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: None,
            max_idle_connections_per_host: DEFAULT_MAX_IDLE_CONNECTIONS_PER_HOST,
        }
    }
}

impl RestConfig {
    /// Read `REST_BASE_URL`, `REST_USER_AGENT` and
    /// `REST_MAX_IDLE_CONNECTIONS_PER_HOST`. Unset variables keep defaults.
    pub fn from_env() -> Result<Self, RestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RestError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup("REST_BASE_URL") {
            config.base_url = base_url;
        }
        config.user_agent = lookup("REST_USER_AGENT").filter(|v| !v.is_empty());
        if let Some(raw) = lookup("REST_MAX_IDLE_CONNECTIONS_PER_HOST") {
            config.max_idle_connections_per_host = raw.trim().parse().map_err(|_| {
                RestError::InvalidConfig(format!(
                    "REST_MAX_IDLE_CONNECTIONS_PER_HOST is not a number: {raw:?}"
                ))
            })?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = RestConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RestConfig::default());
        assert_eq!(config.max_idle_connections_per_host, 5);
    }

    #[test]
    fn reads_all_variables() {
        let config = RestConfig::from_lookup(lookup(&[
            ("REST_BASE_URL", "http://example.test"),
            ("REST_USER_AGENT", "probe/2"),
            ("REST_MAX_IDLE_CONNECTIONS_PER_HOST", " 9 "),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://example.test");
        assert_eq!(config.user_agent.as_deref(), Some("probe/2"));
        assert_eq!(config.max_idle_connections_per_host, 9);
    }

    #[test]
    fn empty_user_agent_means_default() {
        let config = RestConfig::from_lookup(lookup(&[("REST_USER_AGENT", "")])).unwrap();
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn rejects_non_numeric_pool_size() {
        let err = RestConfig::from_lookup(lookup(&[("REST_MAX_IDLE_CONNECTIONS_PER_HOST", "many")]))
            .unwrap_err();
        assert!(matches!(err, RestError::InvalidConfig(_)));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: RestConfig =
            serde_json::from_str(r#"{"base_url":"http://example.test"}"#).unwrap();
        assert_eq!(config.base_url, "http://example.test");
        assert_eq!(config.user_agent, None);
        assert_eq!(config.max_idle_connections_per_host, 5);
    }
}

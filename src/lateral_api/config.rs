use crate::lateral_api::types::LateralError;
use serde::{Deserialize, Deserializer, Serialize};
use std::env;
use std::sync::{Arc, RwLock};

pub const DEFAULT_TOKEN_EXPIRES_IN: &str = "30s";
pub const DEFAULT_URL: &str = "https://app.lateral.run";

const ENV_APP_ID: &str = "LATERAL_APP_ID";
const ENV_APP_SECRET: &str = "LATERAL_APP_SECRET";
const ENV_TOKEN_EXPIRES_IN: &str = "LATERAL_TOKEN_EXPIRES_IN";
const ENV_URL: &str = "LATERAL_URL";

/// Resolved client configuration
///
/// `app_id` and `app_secret` are not validated here. A missing secret only
/// surfaces when a token is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(rename = "appID")]
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    /// Default token lifetime as a duration literal, e.g. `"30s"`
    pub token_expires_in: String,
    /// Base URL of the Lateral service
    pub url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: None,
            app_secret: None,
            token_expires_in: DEFAULT_TOKEN_EXPIRES_IN.to_string(),
            url: DEFAULT_URL.to_string(),
        }
    }
}

impl Config {
    /// Merge configuration layers, key by key, later layers winning:
    /// `defaults`, then `current` (if any), then `overrides`.
    pub fn layered(
        defaults: &Config,
        current: Option<&Config>,
        overrides: &ConfigOverrides,
    ) -> Config {
        let base = current.unwrap_or(defaults);
        Config {
            app_id: overrides
                .app_id
                .clone()
                .unwrap_or_else(|| base.app_id.clone()),
            app_secret: overrides
                .app_secret
                .clone()
                .unwrap_or_else(|| base.app_secret.clone()),
            token_expires_in: overrides
                .token_expires_in
                .clone()
                .unwrap_or_else(|| base.token_expires_in.clone()),
            url: overrides.url.clone().unwrap_or_else(|| base.url.clone()),
        }
    }

    /// Look up one value by key. Accepts the wire names (`appID`,
    /// `appSecret`, `tokenExpiresIn`, `url`) and their snake_case forms.
    /// Unknown keys and unset values yield `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "appID" | "app_id" => self.app_id.as_deref(),
            "appSecret" | "app_secret" => self.app_secret.as_deref(),
            "tokenExpiresIn" | "token_expires_in" => Some(&self.token_expires_in),
            "url" => Some(&self.url),
            _ => None,
        }
    }
}

/// Partial configuration; every unset field falls through to the layer below
///
/// `app_id` and `app_secret` can also be cleared: `Some(None)` (JSON `null`)
/// resets the value, while `None` (key absent) leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    #[serde(
        rename = "appID",
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_id: Option<Option<String>>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expires_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set application ID (builder pattern)
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(Some(app_id.into()));
        self
    }

    /// Reset the application ID to unset (builder pattern)
    pub fn clear_app_id(mut self) -> Self {
        self.app_id = Some(None);
        self
    }

    /// Set application secret (builder pattern)
    pub fn with_app_secret(mut self, app_secret: impl Into<String>) -> Self {
        self.app_secret = Some(Some(app_secret.into()));
        self
    }

    /// Reset the application secret to unset (builder pattern)
    pub fn clear_app_secret(mut self) -> Self {
        self.app_secret = Some(None);
        self
    }

    /// Set default token lifetime (builder pattern)
    pub fn with_token_expires_in(mut self, expires_in: impl Into<String>) -> Self {
        self.token_expires_in = Some(expires_in.into());
        self
    }

    /// Set base URL (builder pattern)
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Read overrides from `LATERAL_APP_ID`, `LATERAL_APP_SECRET`,
    /// `LATERAL_TOKEN_EXPIRES_IN` and `LATERAL_URL`. Blank values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            app_id: read(ENV_APP_ID).map(Some),
            app_secret: read(ENV_APP_SECRET).map(Some),
            token_expires_in: read(ENV_TOKEN_EXPIRES_IN),
            url: read(ENV_URL),
        }
    }

    /// Parse overrides from a JSON document using the wire key names
    pub fn from_json(json: &str) -> Result<Self, LateralError> {
        serde_json::from_str(json)
            .map_err(|e| LateralError::Config(format!("Invalid configuration JSON: {}", e)))
    }
}

/// A present key, `null` included, deserializes to `Some`
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Configuration holder shared by all calls of one client
///
/// Updates build a complete new snapshot and swap it in under the write
/// lock, so a reader sees either the old or the new configuration, never a
/// mix of both.
#[derive(Debug)]
pub struct ConfigStore {
    defaults: Config,
    current: RwLock<Arc<Config>>,
}

impl ConfigStore {
    /// Create a store seeded with the built-in defaults overlaid by `initial`
    pub fn new(initial: ConfigOverrides) -> Self {
        Self::with_defaults(Config::default(), initial)
    }

    /// Create a store with caller-provided defaults instead of the built-in ones
    pub fn with_defaults(defaults: Config, initial: ConfigOverrides) -> Self {
        let config = Config::layered(&defaults, None, &initial);
        tracing::debug!("Configuration initialized: url={}", config.url);

        Self {
            defaults,
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Re-merge as defaults, then current, then `overrides`
    pub fn update(&self, overrides: ConfigOverrides) -> Result<(), LateralError> {
        let mut current = self
            .current
            .write()
            .map_err(|e| LateralError::Config(format!("Config lock poisoned: {}", e)))?;

        let updated = Config::layered(&self.defaults, Some(&**current), &overrides);
        tracing::debug!("Configuration updated: url={}", updated.url);
        *current = Arc::new(updated);
        Ok(())
    }

    /// Snapshot of the full configuration
    pub fn get(&self) -> Result<Arc<Config>, LateralError> {
        self.current
            .read()
            .map(|config| Arc::clone(&*config))
            .map_err(|e| LateralError::Config(format!("Config lock poisoned: {}", e)))
    }

    /// Single value by key; see [`Config::get`]
    pub fn get_value(&self, key: &str) -> Result<Option<String>, LateralError> {
        Ok(self.get()?.get(key).map(str::to_string))
    }

    pub fn defaults(&self) -> &Config {
        &self.defaults
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(ConfigOverrides::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let store = ConfigStore::default();
        let config = store.get().unwrap();
        assert_eq!(config.app_id, None);
        assert_eq!(config.app_secret, None);
        assert_eq!(config.token_expires_in, "30s");
        assert_eq!(config.url, "https://app.lateral.run");
    }

    #[test]
    fn test_update_keeps_earlier_layers() {
        let store = ConfigStore::new(ConfigOverrides::new().with_url("A"));
        store
            .update(ConfigOverrides::new().with_token_expires_in("1h"))
            .unwrap();

        let config = store.get().unwrap();
        assert_eq!(
            *config,
            Config {
                app_id: None,
                app_secret: None,
                token_expires_in: "1h".to_string(),
                url: "A".to_string(),
            }
        );
    }

    #[test]
    fn test_update_overrides_previous_value() {
        let store = ConfigStore::new(ConfigOverrides::new().with_app_id("app_1"));
        store
            .update(ConfigOverrides::new().with_app_id("app_2"))
            .unwrap();
        assert_eq!(store.get_value("appID").unwrap().as_deref(), Some("app_2"));
    }

    #[test]
    fn test_custom_defaults() {
        let defaults = Config {
            url: "http://localhost:3000".to_string(),
            ..Config::default()
        };
        let store = ConfigStore::with_defaults(defaults, ConfigOverrides::new().with_app_id("a"));

        let config = store.get().unwrap();
        assert_eq!(config.url, "http://localhost:3000");
        assert_eq!(config.app_id.as_deref(), Some("a"));
        assert_eq!(store.defaults().app_id, None);
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_update() {
        let store = ConfigStore::default();
        let before = store.get().unwrap();
        store.update(ConfigOverrides::new().with_url("B")).unwrap();

        assert_eq!(before.url, DEFAULT_URL);
        assert_eq!(store.get().unwrap().url, "B");
    }

    #[test]
    fn test_get_value_by_key() {
        let store = ConfigStore::new(ConfigOverrides::new().with_app_secret("s3cret"));
        assert_eq!(store.get_value("appSecret").unwrap().as_deref(), Some("s3cret"));
        assert_eq!(store.get_value("app_secret").unwrap().as_deref(), Some("s3cret"));
        assert_eq!(store.get_value("tokenExpiresIn").unwrap().as_deref(), Some("30s"));
        assert_eq!(store.get_value("appID").unwrap(), None);
        assert_eq!(store.get_value("nope").unwrap(), None);
    }

    #[test]
    fn test_from_lookup_ignores_blank_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("LATERAL_APP_ID", " app_9 "),
            ("LATERAL_APP_SECRET", "   "),
            ("LATERAL_URL", "http://localhost:8080"),
        ]);

        let overrides = ConfigOverrides::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(overrides.app_id, Some(Some("app_9".to_string())));
        assert_eq!(overrides.app_secret, None);
        assert_eq!(overrides.token_expires_in, None);
        assert_eq!(overrides.url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_from_json_uses_wire_names() {
        let overrides =
            ConfigOverrides::from_json(r#"{"appID": "app_1", "tokenExpiresIn": "5m"}"#).unwrap();
        assert_eq!(overrides.app_id, Some(Some("app_1".to_string())));
        assert_eq!(overrides.token_expires_in.as_deref(), Some("5m"));
        assert_eq!(overrides.url, None);

        let err = ConfigOverrides::from_json("{").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration JSON"));
    }

    #[test]
    fn test_update_can_clear_credentials() {
        let store = ConfigStore::new(
            ConfigOverrides::new()
                .with_app_id("app_1")
                .with_app_secret("s3cret"),
        );
        store
            .update(ConfigOverrides::new().clear_app_secret())
            .unwrap();

        let config = store.get().unwrap();
        assert_eq!(config.app_id.as_deref(), Some("app_1"));
        assert_eq!(config.app_secret, None);
    }

    #[test]
    fn test_from_json_null_clears_value() {
        let overrides = ConfigOverrides::from_json(r#"{"appID": null}"#).unwrap();
        assert_eq!(overrides.app_id, Some(None));
        assert_eq!(overrides.app_secret, None);

        let store = ConfigStore::new(ConfigOverrides::new().with_app_id("app_1"));
        store.update(overrides).unwrap();
        assert_eq!(store.get_value("appID").unwrap(), None);
    }
}

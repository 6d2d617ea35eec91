use std::time::Duration;

use apiglue_core::{DEFAULT_AIRTABLE_BASE_URL, Failure, Namespace, Settings};
use apiglue_runner::RunnerConfig;

/// Largest number of records Airtable accepts in one write or delete call.
pub const MAX_RECORDS_PER_REQUEST: usize = 10;

/// Configuration for the Airtable provider.
#[derive(Clone)]
pub struct AirtableConfig {
    /// Personal access token or API key, sent as a bearer token.
    pub api_key: String,

    /// Identifier of the base (`app...`) all tables belong to.
    pub base_id: String,

    /// API root, e.g. `https://api.airtable.com/v0/`. Override this for
    /// testing against a mock server.
    pub base_url: String,

    /// Pause between consecutive chunk requests of a bulk operation.
    pub request_delay: Duration,

    /// Tables used by base-wide operations when no table list is passed.
    pub tables: Vec<String>,
}

impl std::fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_id", &self.base_id)
            .field("base_url", &self.base_url)
            .field("request_delay", &self.request_delay)
            .field("tables", &self.tables)
            .finish()
    }
}

impl AirtableConfig {
    /// Create a configuration with the default API root and a 200ms delay
    /// between bulk requests.
    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            base_url: DEFAULT_AIRTABLE_BASE_URL.to_owned(),
            request_delay: Duration::from_millis(200),
            tables: Vec::new(),
        }
    }

    /// Build a configuration from [`Settings`], letting explicitly passed
    /// values take precedence over configured ones.
    pub fn from_settings(
        settings: &Settings,
        api_key: Option<&str>,
        base_id: Option<&str>,
    ) -> Result<Self, Failure> {
        let api_key = settings.resolve(api_key, Namespace::Airtable, "api_key")?;
        let base_id = settings.resolve(base_id, Namespace::Airtable, "base_id")?;
        let base_url = settings.require(Namespace::Airtable, "base_url")?;

        Ok(Self::new(api_key, base_id)
            .with_base_url(base_url)
            .with_request_delay(Duration::from_millis(settings.airtable.request_delay_ms))
            .with_tables(settings.airtable.tables.clone()))
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Set the default table list for base-wide operations.
    #[must_use]
    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    /// Runner settings for bulk writes: ten records per request, spaced by
    /// the request delay.
    pub fn runner(&self) -> RunnerConfig {
        RunnerConfig::default()
            .with_chunk_size(MAX_RECORDS_PER_REQUEST)
            .with_delay(self.request_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AirtableConfig::new("key", "app123");
        assert_eq!(config.base_url, "https://api.airtable.com/v0/");
        assert_eq!(config.request_delay, Duration::from_millis(200));
        assert!(config.tables.is_empty());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AirtableConfig::new("pat-secret-value", "app123");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("pat-secret-value"));
        assert!(debug.contains("app123"));
    }

    #[test]
    fn from_settings_prefers_passed_values() {
        let mut settings = Settings::default();
        settings.airtable.set_api_key("configured-key").unwrap();
        settings.airtable.set_base_id("appConfigured").unwrap();
        settings.airtable.set_request_delay_ms(50);

        let config = AirtableConfig::from_settings(&settings, None, Some("appPassed")).unwrap();
        assert_eq!(config.api_key, "configured-key");
        assert_eq!(config.base_id, "appPassed");
        assert_eq!(config.request_delay, Duration::from_millis(50));
    }

    #[test]
    fn from_settings_names_missing_property() {
        let err = AirtableConfig::from_settings(&Settings::default(), None, None).unwrap_err();
        let env = err.normalize();
        assert_eq!(env.code, Some(400));
        assert!(
            env.message
                .unwrap()
                .contains("use settings.airtable.set_api_key")
        );
    }
}

use std::time::Duration;

use apiglue_core::{Failure, Namespace, Settings};
use apiglue_runner::RunnerConfig;

/// Standard Jotform API host.
pub const API_BASE_URL: &str = "https://api.jotform.com";

/// API host of HIPAA-compliant Jotform accounts.
pub const HIPAA_API_BASE_URL: &str = "https://hipaa-api.jotform.com";

/// Submissions requested per page when walking a form.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Configuration for the Jotform provider.
#[derive(Clone)]
pub struct JotformConfig {
    /// API key, sent in the `APIKEY` header.
    pub api_key: String,

    /// Form used by form-level operations.
    pub form_id: Option<String>,

    /// API host. Override this for testing against a mock server.
    pub base_url: String,

    /// Submissions requested per page.
    pub page_size: usize,

    /// Pause between consecutive requests of bulk and polling operations.
    pub request_delay: Duration,
}

impl std::fmt::Debug for JotformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JotformConfig")
            .field("api_key", &"[REDACTED]")
            .field("form_id", &self.form_id)
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("request_delay", &self.request_delay)
            .finish()
    }
}

impl JotformConfig {
    /// Create a configuration for a standard (non-HIPAA) account.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            form_id: None,
            base_url: API_BASE_URL.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            request_delay: Duration::from_secs(1),
        }
    }

    /// Build a configuration from [`Settings`], letting explicitly passed
    /// values take precedence over configured ones.
    ///
    /// The form id stays optional here; operations that need one fail when
    /// it is missing.
    pub fn from_settings(
        settings: &Settings,
        api_key: Option<&str>,
        form_id: Option<&str>,
    ) -> Result<Self, Failure> {
        let api_key = settings.resolve(api_key, Namespace::Jotform, "api_key")?;
        let form_id = form_id
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .or_else(|| settings.get(Namespace::Jotform, "form_id"));

        let mut config = Self::new(api_key).with_hipaa(settings.jotform.is_hipaa.unwrap_or(false));
        config.form_id = form_id;
        if let Some(url) = settings.get(Namespace::Jotform, "base_url") {
            config = config.with_base_url(url);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_form_id(mut self, form_id: impl Into<String>) -> Self {
        self.form_id = Some(form_id.into());
        self
    }

    /// Switch between the HIPAA and the standard API host.
    #[must_use]
    pub fn with_hipaa(mut self, is_hipaa: bool) -> Self {
        self.base_url = if is_hipaa {
            HIPAA_API_BASE_URL
        } else {
            API_BASE_URL
        }
        .to_owned();
        self
    }

    /// Override the API host (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Runner settings for bulk and polling operations: one submission per
    /// request, spaced by the request delay.
    pub fn runner(&self) -> RunnerConfig {
        RunnerConfig::default()
            .with_chunk_size(1)
            .with_delay(self.request_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = JotformConfig::new("key");
        assert_eq!(config.base_url, "https://api.jotform.com");
        assert_eq!(config.page_size, 1000);
        assert!(config.form_id.is_none());
        assert_eq!(config.runner().chunk_size, 1);
        assert_eq!(config.runner().delay, Duration::from_secs(1));
    }

    #[test]
    fn hipaa_switches_host() {
        let config = JotformConfig::new("key").with_hipaa(true);
        assert_eq!(config.base_url, "https://hipaa-api.jotform.com");
        assert_eq!(config.with_hipaa(false).base_url, API_BASE_URL);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = JotformConfig::new("jf-secret-value").with_form_id("2301");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("jf-secret-value"));
        assert!(debug.contains("2301"));
    }

    #[test]
    fn from_settings_uses_configured_values() {
        let mut settings = Settings::default();
        settings.jotform.set_api_key("configured").unwrap();
        settings.jotform.set_form_id("9001").unwrap();
        settings.jotform.set_is_hipaa(true);

        let config = JotformConfig::from_settings(&settings, None, None).unwrap();
        assert_eq!(config.api_key, "configured");
        assert_eq!(config.form_id.as_deref(), Some("9001"));
        assert_eq!(config.base_url, HIPAA_API_BASE_URL);

        let passed = JotformConfig::from_settings(&settings, Some("passed"), Some("42")).unwrap();
        assert_eq!(passed.api_key, "passed");
        assert_eq!(passed.form_id.as_deref(), Some("42"));
    }

    #[test]
    fn from_settings_base_url_override_wins() {
        let mut settings = Settings::default();
        settings.jotform.set_api_key("k").unwrap();
        settings.jotform.set_is_hipaa(true);
        settings.jotform.set_base_url("http://127.0.0.1:9999").unwrap();

        let config = JotformConfig::from_settings(&settings, None, None).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn from_settings_requires_api_key() {
        let err = JotformConfig::from_settings(&Settings::default(), None, None).unwrap_err();
        assert!(err.to_string().contains("settings.jotform.set_api_key"));
    }
}

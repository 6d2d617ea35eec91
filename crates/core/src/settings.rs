use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::Failure;

/// Default Airtable REST endpoint.
pub const DEFAULT_AIRTABLE_BASE_URL: &str = "https://api.airtable.com/v0/";

/// Default pause between consecutive Airtable requests (five requests per
/// second per base).
pub const DEFAULT_AIRTABLE_REQUEST_DELAY_MS: u64 = 200;

/// Configuration namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    General,
    Airtable,
    Jotform,
}

impl Namespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Airtable => "airtable",
            Self::Jotform => "jotform",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default values for provider operations.
///
/// Values are read by the providers when an operation is called without an
/// explicit override. Every setter rejects empty input.
///
/// # Example
///
/// ```toml
/// [airtable]
/// api_key = "key123"
/// base_id = "app123"
/// tables = ["Contacts", "Orders"]
///
/// [jotform]
/// api_key = "abc"
/// form_id = "2101"
/// is_hipaa = false
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub airtable: AirtableSettings,
    #[serde(default)]
    pub jotform: JotformSettings,
}

/// Settings that are not tied to a provider.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralSettings {
    /// Key used in the "endpoint not supported" object.
    #[serde(default = "default_not_supported_key")]
    pub not_supported_key: String,
    /// Message used in the "endpoint not supported" object.
    #[serde(default = "default_not_supported_message")]
    pub not_supported_message: String,
    /// Base URL of the calling service, used by `hit_in_house_endpoint`.
    #[serde(default)]
    pub in_house_base_url: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            not_supported_key: default_not_supported_key(),
            not_supported_message: default_not_supported_message(),
            in_house_base_url: None,
        }
    }
}

fn default_not_supported_key() -> String {
    "error".to_owned()
}

fn default_not_supported_message() -> String {
    "This endpoint is not supported".to_owned()
}

#[derive(Clone, Deserialize)]
pub struct AirtableSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_airtable_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub base_id: Option<String>,
    /// Tables used when a base-wide operation is called without a table list.
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default = "default_airtable_request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for AirtableSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_airtable_base_url(),
            base_id: None,
            tables: Vec::new(),
            request_delay_ms: default_airtable_request_delay_ms(),
        }
    }
}

impl fmt::Debug for AirtableSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("base_id", &self.base_id)
            .field("tables", &self.tables)
            .field("request_delay_ms", &self.request_delay_ms)
            .finish()
    }
}

fn default_airtable_base_url() -> String {
    DEFAULT_AIRTABLE_BASE_URL.to_owned()
}

fn default_airtable_request_delay_ms() -> u64 {
    DEFAULT_AIRTABLE_REQUEST_DELAY_MS
}

#[derive(Clone, Default, Deserialize)]
pub struct JotformSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub is_hipaa: Option<bool>,
    /// Overrides the API host derived from `is_hipaa`.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl fmt::Debug for JotformSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JotformSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("form_id", &self.form_id)
            .field("is_hipaa", &self.is_hipaa)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn require_value(namespace: Namespace, key: &str, value: String) -> Result<String, Failure> {
    if value.is_empty() {
        return Err(Failure::validation(format!(
            "{namespace}.{key} was given an empty value; skip the call to keep the current value"
        )));
    }
    Ok(value)
}

impl Settings {
    /// Parse settings from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, Failure> {
        toml::from_str(input).map_err(|e| Failure::unexpected("ConfigError", e.to_string()))
    }

    /// Read and parse a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Failure> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading settings");
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Failure::unexpected("ConfigError", format!("{}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Look up a configured value by namespace and key.
    ///
    /// Unknown keys and unset values both yield `None`.
    pub fn get(&self, namespace: Namespace, key: &str) -> Option<String> {
        let value = match (namespace, key) {
            (Namespace::General, "not_supported_key") => {
                Some(self.general.not_supported_key.clone())
            }
            (Namespace::General, "not_supported_message") => {
                Some(self.general.not_supported_message.clone())
            }
            (Namespace::General, "in_house_base_url") => self.general.in_house_base_url.clone(),
            (Namespace::Airtable, "api_key") => self.airtable.api_key.clone(),
            (Namespace::Airtable, "base_url") => Some(self.airtable.base_url.clone()),
            (Namespace::Airtable, "base_id") => self.airtable.base_id.clone(),
            (Namespace::Airtable, "request_delay_ms") => {
                Some(self.airtable.request_delay_ms.to_string())
            }
            (Namespace::Jotform, "api_key") => self.jotform.api_key.clone(),
            (Namespace::Jotform, "form_id") => self.jotform.form_id.clone(),
            (Namespace::Jotform, "is_hipaa") => self.jotform.is_hipaa.map(|b| b.to_string()),
            (Namespace::Jotform, "base_url") => self.jotform.base_url.clone(),
            _ => None,
        };
        value.filter(|v| !v.is_empty())
    }

    /// Pick the explicitly passed value, else the configured one.
    ///
    /// Fails with a validation error naming the property and its setter when
    /// neither is available.
    pub fn resolve(
        &self,
        passed: Option<&str>,
        namespace: Namespace,
        key: &str,
    ) -> Result<String, Failure> {
        if let Some(value) = passed.filter(|v| !v.is_empty()) {
            return Ok(value.to_owned());
        }
        self.get(namespace, key).ok_or_else(|| {
            Failure::validation(format!(
                "{key} property is not set yet nor passed, you either pass it or alternatively \
                 use settings.{namespace}.set_{key} to configure it first."
            ))
        })
    }

    /// Like [`resolve`](Self::resolve) but without an explicit value.
    pub fn require(&self, namespace: Namespace, key: &str) -> Result<String, Failure> {
        self.get(namespace, key).ok_or_else(|| {
            Failure::validation(format!(
                "{key} property is not set yet, please use settings.{namespace}.set_{key} \
                 to configure it first."
            ))
        })
    }
}

impl GeneralSettings {
    pub fn set_not_supported_key(&mut self, key: impl Into<String>) -> Result<(), Failure> {
        self.not_supported_key = require_value(Namespace::General, "not_supported_key", key.into())?;
        Ok(())
    }

    pub fn set_not_supported_message(&mut self, message: impl Into<String>) -> Result<(), Failure> {
        self.not_supported_message =
            require_value(Namespace::General, "not_supported_message", message.into())?;
        Ok(())
    }

    pub fn set_in_house_base_url(&mut self, url: impl Into<String>) -> Result<(), Failure> {
        let url = require_value(Namespace::General, "in_house_base_url", url.into())?;
        self.in_house_base_url = Some(url.trim_end_matches('/').to_owned());
        Ok(())
    }
}

impl AirtableSettings {
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<(), Failure> {
        self.api_key = Some(require_value(Namespace::Airtable, "api_key", api_key.into())?);
        Ok(())
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<(), Failure> {
        self.base_url = require_value(Namespace::Airtable, "base_url", base_url.into())?;
        Ok(())
    }

    pub fn set_base_id(&mut self, base_id: impl Into<String>) -> Result<(), Failure> {
        self.base_id = Some(require_value(Namespace::Airtable, "base_id", base_id.into())?);
        Ok(())
    }

    pub fn set_tables(&mut self, tables: Vec<String>) -> Result<(), Failure> {
        if tables.is_empty() {
            return Err(Failure::validation(
                "airtable.tables was given an empty value; skip the call to keep the current value",
            ));
        }
        self.tables = tables;
        Ok(())
    }

    pub fn set_request_delay_ms(&mut self, delay_ms: u64) {
        self.request_delay_ms = delay_ms;
    }
}

impl JotformSettings {
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<(), Failure> {
        self.api_key = Some(require_value(Namespace::Jotform, "api_key", api_key.into())?);
        Ok(())
    }

    pub fn set_form_id(&mut self, form_id: impl Into<String>) -> Result<(), Failure> {
        self.form_id = Some(require_value(Namespace::Jotform, "form_id", form_id.into())?);
        Ok(())
    }

    pub fn set_is_hipaa(&mut self, is_hipaa: bool) {
        self.is_hipaa = Some(is_hipaa);
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<(), Failure> {
        self.base_url = Some(require_value(Namespace::Jotform, "base_url", base_url.into())?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.airtable.base_url, DEFAULT_AIRTABLE_BASE_URL);
        assert_eq!(settings.airtable.request_delay_ms, 200);
        assert_eq!(settings.general.not_supported_key, "error");
        assert!(settings.get(Namespace::Airtable, "api_key").is_none());
    }

    #[test]
    fn parses_toml() {
        let settings = Settings::from_toml_str(
            r#"
            [airtable]
            api_key = "key123"
            base_id = "app123"
            tables = ["Contacts", "Orders"]

            [jotform]
            form_id = "2101"
            is_hipaa = true
            "#,
        )
        .unwrap();
        assert_eq!(settings.get(Namespace::Airtable, "base_id").as_deref(), Some("app123"));
        assert_eq!(settings.airtable.tables, vec!["Contacts", "Orders"]);
        assert_eq!(settings.airtable.base_url, DEFAULT_AIRTABLE_BASE_URL);
        assert_eq!(settings.get(Namespace::Jotform, "is_hipaa").as_deref(), Some("true"));
    }

    #[test]
    fn invalid_toml_is_a_failure() {
        let err = Settings::from_toml_str("[airtable\n").unwrap_err();
        assert!(matches!(err, Failure::Unexpected { ref name, .. } if name == "ConfigError"));
    }

    #[test]
    fn resolve_prefers_passed_value() {
        let mut settings = Settings::default();
        settings.airtable.set_api_key("configured").unwrap();
        let value = settings
            .resolve(Some("passed"), Namespace::Airtable, "api_key")
            .unwrap();
        assert_eq!(value, "passed");
        let value = settings.resolve(Some(""), Namespace::Airtable, "api_key").unwrap();
        assert_eq!(value, "configured");
    }

    #[test]
    fn resolve_names_the_setter_when_missing() {
        let settings = Settings::default();
        let err = settings
            .resolve(None, Namespace::Jotform, "form_id")
            .unwrap_err();
        let env = err.normalize();
        assert_eq!(env.code, Some(400));
        let message = env.message.unwrap();
        assert!(message.contains("form_id property is not set yet nor passed"));
        assert!(message.contains("settings.jotform.set_form_id"));
    }

    #[test]
    fn require_reports_missing_setting() {
        let err = Settings::default()
            .require(Namespace::General, "in_house_base_url")
            .unwrap_err();
        assert!(err.to_string().contains("settings.general.set_in_house_base_url"));
    }

    #[test]
    fn setters_reject_empty_values() {
        let mut settings = Settings::default();
        assert!(settings.airtable.set_base_id("").is_err());
        assert!(settings.jotform.set_api_key(String::new()).is_err());
        assert!(settings.airtable.set_tables(Vec::new()).is_err());
        assert!(settings.general.set_not_supported_message("").is_err());
        assert_eq!(settings.general.not_supported_message, "This endpoint is not supported");
    }

    #[test]
    fn in_house_base_url_drops_trailing_slash() {
        let mut settings = Settings::default();
        settings
            .general
            .set_in_house_base_url("https://service.example.com/")
            .unwrap();
        assert_eq!(
            settings.general.in_house_base_url.as_deref(),
            Some("https://service.example.com")
        );
    }

    #[test]
    fn debug_redacts_api_keys() {
        let mut settings = Settings::default();
        settings.airtable.set_api_key("secret-airtable").unwrap();
        settings.jotform.set_api_key("secret-jotform").unwrap();
        let debug = format!("{settings:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-airtable"));
        assert!(!debug.contains("secret-jotform"));
    }
}

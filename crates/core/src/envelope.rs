use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the extra attribute that carries a pagination cursor.
pub const OFFSET_KEY: &str = "offset";

/// Uniform success/failure result returned by every apiglue operation.
///
/// Optional fields are omitted from the serialized form rather than written
/// as `null`. Any additional attributes (most importantly the pagination
/// [`Cursor`] under `offset`) are flattened into the top-level object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the operation succeeded from the caller's perspective.
    pub success: bool,

    /// HTTP status of the last request, or an application code such as 400.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,

    /// Human-readable description of the outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Resulting data on success, provider error data on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// Extra named attributes merged into the envelope.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl Envelope {
    /// Build an envelope, dropping every value that is empty.
    ///
    /// Empty messages, and bodies or extra attributes that are `null` or an
    /// empty string, are not recorded, so they never show up in the
    /// serialized form. An empty array body is kept: it is how an empty
    /// listing is reported.
    pub fn new(
        success: bool,
        code: Option<u16>,
        message: Option<String>,
        body: Option<Value>,
        extra: Option<Map<String, Value>>,
    ) -> Self {
        let extra = extra
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, value)| !is_blank(value))
            .collect();
        Self {
            success,
            code,
            message: message.filter(|m| !m.is_empty()),
            body: body.filter(|b| !is_blank(b)),
            extra,
        }
    }

    /// A successful envelope with the given status code.
    #[must_use]
    pub fn success(code: u16) -> Self {
        Self {
            success: true,
            code: Some(code),
            ..Self::default()
        }
    }

    /// A failed envelope with the given code and message.
    #[must_use]
    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self::new(false, Some(code), Some(message.into()), None, None)
    }

    #[must_use]
    pub fn with_code(mut self, code: Option<u16>) -> Self {
        self.code = code;
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.message = (!message.is_empty()).then_some(message);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = (!is_blank(&body)).then_some(body);
        self
    }

    /// Attach an extra attribute; `null` and `""` values are ignored.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        if !is_blank(&value) {
            self.extra.insert(key.into(), value);
        }
        self
    }

    /// Attach (or clear) the pagination cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: Option<Cursor>) -> Self {
        match cursor {
            Some(cursor) => {
                self.extra
                    .insert(OFFSET_KEY.to_owned(), Value::String(cursor.0));
            }
            None => {
                self.extra.remove(OFFSET_KEY);
            }
        }
        self
    }

    /// The continuation cursor, if the provider reported more pages.
    pub fn cursor(&self) -> Option<Cursor> {
        match self.extra.get(OFFSET_KEY) {
            Some(Value::String(s)) if !s.is_empty() => Some(Cursor(s.clone())),
            _ => None,
        }
    }

    /// The body as an array of items, or `None` when it is absent or not an
    /// array.
    pub fn items(&self) -> Option<&Vec<Value>> {
        self.body.as_ref().and_then(Value::as_array)
    }

    /// Serialize into a JSON value, following the omission rules above.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("success".to_owned(), Value::Bool(self.success));
        if let Some(code) = self.code {
            obj.insert("code".to_owned(), Value::from(code));
        }
        if let Some(message) = &self.message {
            obj.insert("message".to_owned(), Value::String(message.clone()));
        }
        if let Some(body) = &self.body {
            obj.insert("body".to_owned(), body.clone());
        }
        for (key, value) in &self.extra {
            obj.insert(key.clone(), value.clone());
        }
        Value::Object(obj)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.success { "success" } else { "failure" };
        match (self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{outcome} ({code}): {message}"),
            (Some(code), None) => write!(f, "{outcome} ({code})"),
            (None, Some(message)) => write!(f, "{outcome}: {message}"),
            (None, None) => f.write_str(outcome),
        }
    }
}

/// Opaque continuation token returned by a paginated endpoint.
///
/// Presence means more pages exist. The value is threaded verbatim into the
/// next page request and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a provider-issued token. Empty tokens mean "no more pages".
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        (!token.is_empty()).then_some(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

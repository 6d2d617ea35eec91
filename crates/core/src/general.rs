use serde_json::{Map, Value};

use crate::settings::Settings;

/// Body returned by endpoints that do not support the requested method.
///
/// The indicative key and message come from the general settings, e.g.
/// `{"method": "POST", "error": "This endpoint is not supported"}`.
pub fn endpoint_not_supported(method: Option<&str>, settings: &Settings) -> Value {
    let mut obj = Map::new();
    obj.insert(
        "method".to_owned(),
        method.map_or(Value::Null, |m| Value::String(m.to_owned())),
    );
    obj.insert(
        settings.general.not_supported_key.clone(),
        Value::String(settings.general.not_supported_message.clone()),
    );
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn uses_default_key_and_message() {
        let body = endpoint_not_supported(Some("POST"), &Settings::default());
        assert_eq!(
            body,
            json!({"method": "POST", "error": "This endpoint is not supported"})
        );
    }

    #[test]
    fn uses_configured_key_and_message() {
        let mut settings = Settings::default();
        settings.general.set_not_supported_key("description").unwrap();
        settings
            .general
            .set_not_supported_message("Only GET is allowed here")
            .unwrap();
        let body = endpoint_not_supported(None, &settings);
        assert_eq!(
            body,
            json!({"method": null, "description": "Only GET is allowed here"})
        );
    }
}

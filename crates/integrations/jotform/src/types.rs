use serde::Deserialize;
use serde_json::{Map, Value};

/// Envelope Jotform wraps around every API answer.
#[derive(Debug, Clone, Deserialize)]
pub struct JotformResponse {
    /// Jotform's own status code; may differ from the HTTP status.
    #[serde(rename = "responseCode")]
    pub response_code: u16,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub content: Value,

    /// Paging information of list endpoints.
    #[serde(rename = "resultSet", default)]
    pub result_set: Option<ResultSet>,
}

impl JotformResponse {
    pub fn is_error(&self) -> bool {
        self.response_code >= 300
    }
}

/// Paging information of a submissions listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub count: usize,
}

impl ResultSet {
    /// Offset of the next page, when the current one came back full.
    pub fn next_offset(&self) -> Option<usize> {
        (self.count > 0 && self.count == self.limit).then_some(self.offset + self.count)
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Encode submission fields the way the submission endpoints expect them.
///
/// `{"3": "Ada"}` becomes `submission[3]=Ada`. Object values are split per
/// sub field: a sub key containing `_` becomes `submission[3][sub_key]`,
/// any other sub key becomes `submission[3_key]`.
pub fn fields_query_pairs(fields: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (id, value) in fields {
        match value {
            Value::Object(sub_fields) => {
                for (sub_id, sub_value) in sub_fields {
                    let key = if sub_id.contains('_') {
                        format!("submission[{id}][{sub_id}]")
                    } else {
                        format!("submission[{id}_{sub_id}]")
                    };
                    pairs.push((key, query_value(sub_value)));
                }
            }
            other => pairs.push((format!("submission[{id}]"), query_value(other))),
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn next_offset_only_for_full_pages() {
        let full = ResultSet {
            offset: 20,
            limit: 20,
            count: 20,
        };
        assert_eq!(full.next_offset(), Some(40));

        let partial = ResultSet {
            offset: 40,
            limit: 20,
            count: 7,
        };
        assert_eq!(partial.next_offset(), None);

        let empty = ResultSet {
            offset: 0,
            limit: 0,
            count: 0,
        };
        assert_eq!(empty.next_offset(), None);
    }

    #[test]
    fn response_deserializes_result_set() {
        let resp: JotformResponse = serde_json::from_value(json!({
            "responseCode": 200,
            "message": "success",
            "content": [{"id": "1"}],
            "resultSet": {"offset": 0, "limit": 1, "count": 1}
        }))
        .unwrap();
        assert!(!resp.is_error());
        assert_eq!(resp.result_set.unwrap().next_offset(), Some(1));
    }

    #[test]
    fn embedded_error_code_is_error() {
        let resp: JotformResponse =
            serde_json::from_value(json!({"responseCode": 401, "message": "Unauthorized"})).unwrap();
        assert!(resp.is_error());
        assert!(resp.content.is_null());
    }

    #[test]
    fn fields_encode_plain_and_sub_fields() {
        let fields = json!({
            "3": "Ada",
            "4": {"first": "Ada", "last": "Lovelace"},
            "5": {"field_1": "x"},
            "6": 42
        });
        let pairs = fields_query_pairs(fields.as_object().unwrap());
        let expected: Vec<(String, String)> = [
            ("submission[3]", "Ada"),
            ("submission[4_first]", "Ada"),
            ("submission[4_last]", "Lovelace"),
            ("submission[5][field_1]", "x"),
            ("submission[6]", "42"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        assert_eq!(pairs, expected);
    }
}

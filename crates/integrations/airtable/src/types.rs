use apiglue_core::Cursor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest `maxRecords` value accepted on a single list call.
pub const MAX_RECORDS_PER_PAGE: usize = 100;

/// Optional parameters of a single "list records" call.
#[derive(Debug, Clone, Default)]
pub struct RecordsQuery {
    /// Upper bound on the number of records returned (`maxRecords`).
    pub max_records: Option<usize>,
    /// Continuation cursor from the previous page.
    pub offset: Option<Cursor>,
    /// Airtable formula used to filter records (`filterByFormula`).
    pub formula: Option<String>,
    /// Only return these fields (`fields[]`).
    pub fields: Vec<String>,
}

impl RecordsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: Option<Cursor>) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_formula(mut self, formula: Option<&str>) -> Self {
        self.formula = formula.filter(|f| !f.is_empty()).map(str::to_owned);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Query-string pairs in the order Airtable documents them.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(max) = self.max_records {
            pairs.push(("maxRecords".to_owned(), max.to_string()));
        }
        if let Some(formula) = &self.formula {
            pairs.push(("filterByFormula".to_owned(), formula.clone()));
        }
        if let Some(offset) = &self.offset {
            pairs.push(("offset".to_owned(), offset.as_str().to_owned()));
        }
        for field in &self.fields {
            pairs.push(("fields[]".to_owned(), field.clone()));
        }
        pairs
    }
}

/// Response of the "list records" endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListRecordsResponse {
    pub records: Vec<Value>,
    /// Present when more pages are available.
    #[serde(default)]
    pub offset: Option<String>,
}

/// Response of the create, update and delete endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsResponse {
    pub records: Vec<Value>,
}

/// A record to create: only its cell values.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecord {
    pub fields: Value,
}

/// A partial update of an existing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub id: String,
    pub fields: Value,
}

impl RecordUpdate {
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// JSON body of a bulk create or update call.
#[derive(Debug, Clone, Serialize)]
pub struct RecordsRequest<R> {
    pub records: Vec<R>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_pairs_include_only_set_values() {
        assert!(RecordsQuery::new().to_query_pairs().is_empty());

        let query = RecordsQuery::new()
            .with_max_records(5)
            .with_formula(Some("{Status}='Done'"))
            .with_offset(Cursor::new("itrA/recB"))
            .with_fields(vec!["Name".into(), "Email".into()]);
        let pairs = query.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("maxRecords".to_owned(), "5".to_owned()),
                ("filterByFormula".to_owned(), "{Status}='Done'".to_owned()),
                ("offset".to_owned(), "itrA/recB".to_owned()),
                ("fields[]".to_owned(), "Name".to_owned()),
                ("fields[]".to_owned(), "Email".to_owned()),
            ]
        );
    }

    #[test]
    fn empty_formula_is_dropped() {
        let query = RecordsQuery::new().with_formula(Some(""));
        assert!(query.formula.is_none());
    }

    #[test]
    fn list_response_without_offset() {
        let resp: ListRecordsResponse =
            serde_json::from_value(json!({"records": [{"id": "rec1"}]})).unwrap();
        assert_eq!(resp.records.len(), 1);
        assert!(resp.offset.is_none());
    }

    #[test]
    fn create_request_wraps_fields() {
        let body = RecordsRequest {
            records: vec![NewRecord {
                fields: json!({"Name": "Ada"}),
            }],
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"records": [{"fields": {"Name": "Ada"}}]})
        );
    }
}

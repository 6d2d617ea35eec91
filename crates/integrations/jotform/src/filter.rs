//! Client-side filters over fetched submissions.

use serde_json::Value;

/// Submissions whose top-level `flag` property equals `value`
/// (e.g. `status == "ACTIVE"` or `new == "1"`).
pub fn filter_by_flag(submissions: &[Value], value: &Value, flag: &str) -> Vec<Value> {
    submissions
        .iter()
        .filter(|submission| submission.get(flag) == Some(value))
        .cloned()
        .collect()
}

/// Submissions whose answer to question `id` equals `value`.
///
/// With a `sub_id` the answer's sub field is compared as well, so both a
/// compound answer (`{"first": "Ada"}`) and a plain one match.
pub fn filter_by_answer(
    submissions: &[Value],
    value: &Value,
    id: &str,
    sub_id: Option<&str>,
) -> Vec<Value> {
    submissions
        .iter()
        .filter(|submission| {
            let Some(answer) = submission
                .get("answers")
                .and_then(|answers| answers.get(id))
                .and_then(|question| question.get("answer"))
            else {
                return false;
            };
            answer == value || sub_id.and_then(|sub| answer.get(sub)) == Some(value)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn submissions() -> Vec<Value> {
        vec![
            json!({"id": "1", "status": "ACTIVE", "new": "1",
                   "answers": {"3": {"answer": {"first": "Ada", "last": "Lovelace"}}, "4": {"answer": "yes"}}}),
            json!({"id": "2", "status": "DELETED", "new": "0",
                   "answers": {"3": {"answer": {"first": "Alan", "last": "Turing"}}, "4": {"answer": "no"}}}),
            json!({"id": "3", "status": "ACTIVE", "new": "0", "answers": {}}),
        ]
    }

    fn ids(found: &[Value]) -> Vec<&str> {
        found.iter().filter_map(|s| s["id"].as_str()).collect()
    }

    #[test]
    fn by_flag() {
        let all = submissions();
        assert_eq!(ids(&filter_by_flag(&all, &json!("ACTIVE"), "status")), vec!["1", "3"]);
        assert_eq!(ids(&filter_by_flag(&all, &json!("1"), "new")), vec!["1"]);
        assert!(filter_by_flag(&all, &json!("x"), "missing").is_empty());
    }

    #[test]
    fn by_plain_answer() {
        let all = submissions();
        assert_eq!(ids(&filter_by_answer(&all, &json!("no"), "4", None)), vec!["2"]);
    }

    #[test]
    fn by_sub_field_answer() {
        let all = submissions();
        let found = filter_by_answer(&all, &json!("Lovelace"), "3", Some("last"));
        assert_eq!(ids(&found), vec!["1"]);
        // Without the sub field only whole answers are compared.
        assert!(filter_by_answer(&all, &json!("Lovelace"), "3", None).is_empty());
    }

    #[test]
    fn missing_answers_never_match() {
        let all = submissions();
        assert!(filter_by_answer(&all, &json!("yes"), "99", None).is_empty());
    }
}

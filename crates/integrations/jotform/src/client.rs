use apiglue_core::{Cursor, Envelope, Failure};
use apiglue_runner::{concat_bodies, retry_until, run_chunked, walk_pages};
use apiglue_transport::{HttpMethod, HttpRequest, Transport};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

use crate::config::JotformConfig;
use crate::error::JotformError;
use crate::filter::{filter_by_answer, filter_by_flag};
use crate::types::{JotformResponse, fields_query_pairs};

/// Jotform submissions client.
pub struct JotformClient<T> {
    config: JotformConfig,
    transport: T,
}

impl<T: Transport> JotformClient<T> {
    pub fn new(config: JotformConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &JotformConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn form_id(&self) -> Result<&str, Failure> {
        self.config
            .form_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| JotformError::NoFormId.into())
    }

    /// Send a request and unwrap Jotform's own response envelope.
    ///
    /// An error code embedded in a 200 answer is reported as a failure with
    /// that code.
    async fn call(&self, request: HttpRequest) -> Result<JotformResponse, Failure> {
        if self.config.api_key.is_empty() {
            return Err(JotformError::NotConfigured("api_key").into());
        }
        let response = self
            .transport
            .send(request.with_header("APIKEY", &self.config.api_key))
            .await
            .map_err(|e| Failure::from(e).into_normalized())?;

        let parsed = JotformResponse::deserialize(&response.body)
            .map_err(|e| JotformError::UnexpectedResponse(e.to_string()))?;

        if parsed.is_error() {
            warn!(code = parsed.response_code, "Jotform reported an error");
            let failure: Failure = JotformError::Api {
                code: parsed.response_code,
                message: parsed
                    .message
                    .unwrap_or_else(|| format!("Jotform error {}", parsed.response_code)),
                body: response.body,
            }
            .into();
            return Err(failure.into_normalized());
        }
        Ok(parsed)
    }

    /// Fetch a single submission by id.
    #[instrument(skip(self))]
    pub async fn submission(&self, submission_id: &str) -> Result<Envelope, Failure> {
        if submission_id.is_empty() {
            return Err(JotformError::MissingParameter("submission_id").into());
        }

        let response = self
            .call(HttpRequest::get(self.url(&format!("submission/{submission_id}"))))
            .await?;
        let form = response
            .content
            .get("form_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        Ok(Envelope::success(response.response_code)
            .with_message(format!("Retrieved submission {submission_id} of Jotform form {form}"))
            .with_body(response.content))
    }

    /// Fetch one page of the form's submissions.
    ///
    /// When the page came back full, the envelope carries the cursor of the
    /// next page under `offset`.
    #[instrument(skip(self, offset), fields(form_id = ?self.config.form_id))]
    pub async fn submissions_page(
        &self,
        limit: usize,
        offset: Option<&Cursor>,
    ) -> Result<Envelope, Failure> {
        let form_id = self.form_id()?;
        if limit == 0 {
            return Err(Failure::validation("limit must be at least 1"));
        }

        let mut request = HttpRequest::get(self.url(&format!("form/{form_id}/submissions")))
            .with_query("limit", limit.to_string());
        if let Some(offset) = offset {
            request = request.with_query("offset", offset.as_str());
        }

        let response = self.call(request).await?;
        let Value::Array(submissions) = response.content else {
            return Err(JotformError::UnexpectedResponse(
                "submissions content is not a list".into(),
            )
            .into());
        };
        let next = response
            .result_set
            .and_then(|set| set.next_offset())
            .and_then(|next| Cursor::new(next.to_string()));
        debug!(submissions = submissions.len(), more = next.is_some(), "submissions page fetched");

        let count = submissions.len();
        Ok(Envelope::success(response.response_code)
            .with_message(format!("Retrieved {count} submissions from form {form_id}"))
            .with_body(Value::Array(submissions))
            .with_cursor(next))
    }

    /// Fetch the form's submissions, all of them or the first `count`.
    #[instrument(skip(self), fields(form_id = ?self.config.form_id))]
    pub async fn submissions(&self, count: Option<usize>) -> Result<Envelope, Failure> {
        let form_id = self.form_id()?;
        let page_size = match count {
            Some(count) if count > 0 => count.min(self.config.page_size),
            _ => self.config.page_size,
        };

        let envelope = walk_pages(
            |cursor| async move { self.submissions_page(page_size, cursor.as_ref()).await },
            count,
        )
        .await?;

        let fetched = envelope.items().map_or(0, Vec::len);
        Ok(envelope.with_message(format!("Retrieved {fetched} submissions from form {form_id}")))
    }

    /// Fetch every submission whose `flag` property equals `value`.
    #[instrument(skip(self, value))]
    pub async fn submissions_by_flag(&self, value: &Value, flag: &str) -> Result<Envelope, Failure> {
        if flag.is_empty() {
            return Err(JotformError::MissingParameter("flag").into());
        }

        let all = self.submissions(None).await?;
        let found = filter_by_flag(all.items().map(Vec::as_slice).unwrap_or_default(), value, flag);

        Ok(Envelope::new(
            true,
            all.code,
            Some(format!(
                "Filtered the submissions to only get the ones with the value {value} in {flag} flag"
            )),
            Some(Value::Array(found)),
            None,
        ))
    }

    /// Fetch every submission whose answer to question `id` (and optionally
    /// its sub field `sub_id`) equals `value`.
    #[instrument(skip(self, value))]
    pub async fn submissions_by_answer(
        &self,
        value: &Value,
        id: &str,
        sub_id: Option<&str>,
    ) -> Result<Envelope, Failure> {
        if id.is_empty() {
            return Err(JotformError::MissingParameter("id").into());
        }

        let all = self.submissions(None).await?;
        let found = filter_by_answer(all.items().map(Vec::as_slice).unwrap_or_default(), value, id, sub_id);

        let field = match sub_id {
            Some(sub) => format!("{id} and sub field {sub}"),
            None => id.to_owned(),
        };
        Ok(Envelope::new(
            true,
            all.code,
            Some(format!(
                "Filtered the submissions to only get the ones with the value {value} in the field {field}"
            )),
            Some(Value::Array(found)),
            None,
        ))
    }

    async fn create_in_form(
        &self,
        form_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<Envelope, Failure> {
        if fields.is_empty() {
            return Err(JotformError::MissingParameter("fields").into());
        }

        let mut request =
            HttpRequest::new(HttpMethod::Post, self.url(&format!("form/{form_id}/submissions")));
        request.query.extend(fields_query_pairs(fields));

        let response = self.call(request).await?;
        let submission_id = response
            .content
            .get("submissionID")
            .cloned()
            .unwrap_or(Value::Null);

        Ok(Envelope::success(response.response_code)
            .with_message(format!("Added submission successfully to form {form_id}"))
            .with_body(json!({ "submissionId": submission_id })))
    }

    async fn create_chunk(
        &self,
        form_id: &str,
        chunk: Vec<Map<String, Value>>,
    ) -> Result<Envelope, Failure> {
        let mut created = Vec::with_capacity(chunk.len());
        let mut code = None;
        for fields in &chunk {
            let envelope = self.create_in_form(form_id, fields).await?;
            code = envelope.code;
            created.extend(envelope.body);
        }
        Ok(Envelope::new(true, code, None, Some(Value::Array(created)), None))
    }

    /// Add a submission to the configured form.
    ///
    /// `fields` maps question ids to answers; see [`fields_query_pairs`] for
    /// how compound answers are encoded.
    #[instrument(skip_all, fields(form_id = ?self.config.form_id))]
    pub async fn create_submission(&self, fields: &Map<String, Value>) -> Result<Envelope, Failure> {
        let form_id = self.form_id()?;
        self.create_in_form(form_id, fields).await
    }

    /// Add several submissions, one request at a time with the configured
    /// delay in between.
    #[instrument(skip_all, fields(form_id = ?self.config.form_id, submissions = submissions.len()))]
    pub async fn create_submissions(
        &self,
        submissions: Vec<Map<String, Value>>,
    ) -> Result<Envelope, Failure> {
        let form_id = self.form_id()?;
        if submissions.is_empty() {
            return Err(JotformError::MissingParameter("submissions").into());
        }

        let runner = self.config.runner();
        let chunks = run_chunked(
            |chunk, form_id| self.create_chunk(form_id, chunk),
            submissions,
            runner.chunk_size,
            form_id,
            runner.delay,
        )
        .await?;

        let (created, code) = concat_bodies(chunks);
        info!(created = created.len(), "submissions created");
        Ok(Envelope::success(code.unwrap_or(200))
            .with_message(format!("Added {} submissions to form {form_id}", created.len()))
            .with_body(Value::Array(created)))
    }

    /// Overwrite answers of an existing submission.
    #[instrument(skip(self, fields))]
    pub async fn update_submission(
        &self,
        submission_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<Envelope, Failure> {
        if submission_id.is_empty() {
            return Err(JotformError::MissingParameter("submission_id").into());
        }
        if fields.is_empty() {
            return Err(JotformError::MissingParameter("fields").into());
        }

        let mut request =
            HttpRequest::new(HttpMethod::Post, self.url(&format!("submission/{submission_id}")));
        request.query.extend(fields_query_pairs(fields));

        let response = self.call(request).await?;
        let id = response
            .content
            .get("submissionID")
            .cloned()
            .unwrap_or_else(|| Value::String(submission_id.to_owned()));

        Ok(Envelope::success(response.response_code)
            .with_message(format!("Updated submission {submission_id} successfully"))
            .with_body(json!({ "submissionId": id })))
    }

    /// Poll a submission until `predicate` accepts it.
    ///
    /// Polls are spaced by the configured request delay. With
    /// `max_attempts`, the last fetched envelope is returned once the budget
    /// is used up, accepted or not.
    #[instrument(skip(self, predicate))]
    pub async fn await_submission<P>(
        &self,
        submission_id: &str,
        predicate: P,
        max_attempts: Option<u32>,
    ) -> Result<Envelope, Failure>
    where
        P: FnMut(&Envelope) -> bool,
    {
        retry_until(
            || self.submission(submission_id),
            predicate,
            max_attempts,
            self.config.runner().delay,
        )
        .await
    }
}

use apiglue_core::{Cursor, Envelope, Failure};
use apiglue_runner::{concat_bodies, run_chunked, walk_pages};
use apiglue_transport::{HttpMethod, HttpRequest, HttpResponse, Transport};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::config::AirtableConfig;
use crate::error::AirtableError;
use crate::types::{
    ListRecordsResponse, MAX_RECORDS_PER_PAGE, NewRecord, RecordUpdate, RecordsQuery,
    RecordsRequest, RecordsResponse,
};

/// Characters escaped in a table name used as a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Airtable records client.
///
/// Every operation returns a success [`Envelope`] or a [`Failure`]; bulk
/// writes are split into chunks of ten records and sent one at a time with
/// the configured delay in between.
pub struct AirtableClient<T> {
    config: AirtableConfig,
    transport: T,
}

impl<T: Transport> AirtableClient<T> {
    pub fn new(config: AirtableConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &AirtableConfig {
        &self.config
    }

    /// Fails when the API key or base id is empty.
    fn check_config(&self) -> Result<(), Failure> {
        if self.config.api_key.is_empty() {
            return Err(AirtableError::NotConfigured("api_key").into());
        }
        if self.config.base_id.is_empty() {
            return Err(AirtableError::NotConfigured("base_id").into());
        }
        Ok(())
    }

    fn table_url(&self, table: &str) -> Result<String, Failure> {
        self.check_config()?;
        if table.is_empty() {
            return Err(AirtableError::MissingParameter("table").into());
        }
        Ok(format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.base_id,
            utf8_percent_encode(table, PATH_SEGMENT)
        ))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Failure> {
        self.check_config()?;
        self.transport
            .send(request.with_bearer(&self.config.api_key))
            .await
            .map_err(|e| Failure::from(e).into_normalized())
    }

    fn tables_or_default<'a>(&'a self, tables: Option<&'a [String]>) -> Result<&'a [String], Failure> {
        let tables = tables.unwrap_or(&self.config.tables);
        if tables.is_empty() {
            return Err(AirtableError::NoTables.into());
        }
        Ok(tables)
    }

    /// Fetch a single page of records.
    ///
    /// The returned envelope carries the page's records as its body and the
    /// cursor of the next page, if any, under `offset`.
    #[instrument(skip(self, query), fields(table = %table))]
    pub async fn records_page(&self, table: &str, query: &RecordsQuery) -> Result<Envelope, Failure> {
        if let Some(max) = query.max_records
            && !(1..=MAX_RECORDS_PER_PAGE).contains(&max)
        {
            return Err(AirtableError::InvalidMaxRecords(max).into());
        }

        let mut request = HttpRequest::get(self.table_url(table)?);
        request.query.extend(query.to_query_pairs());
        let response = self.send(request).await?;

        let page: ListRecordsResponse = serde_json::from_value(response.body)
            .map_err(|e| AirtableError::UnexpectedResponse(e.to_string()))?;
        debug!(records = page.records.len(), more = page.offset.is_some(), "records page fetched");

        let count = page.records.len();
        Ok(Envelope::success(response.status)
            .with_message(format!("Retrieved {count} records from table {table}"))
            .with_body(Value::Array(page.records))
            .with_cursor(page.offset.and_then(Cursor::new)))
    }

    /// Fetch every record of a table, following pagination to the end.
    #[instrument(skip(self, formula), fields(table = %table))]
    pub async fn table(&self, table: &str, formula: Option<&str>) -> Result<Envelope, Failure> {
        self.table_url(table)?;
        let envelope = walk_pages(
            |cursor| {
                let query = RecordsQuery::new().with_formula(formula).with_offset(cursor);
                async move { self.records_page(table, &query).await }
            },
            None,
        )
        .await?;

        let count = envelope.items().map_or(0, Vec::len);
        Ok(envelope.with_message(format!("Retrieved {count} records from table {table}")))
    }

    /// Fetch the first `count` records of a table.
    #[instrument(skip(self, formula), fields(table = %table))]
    pub async fn first_records(
        &self,
        table: &str,
        count: usize,
        formula: Option<&str>,
    ) -> Result<Envelope, Failure> {
        self.table_url(table)?;
        // maxRecords caps the whole listing, not one page.
        let max_records = (1..=MAX_RECORDS_PER_PAGE).contains(&count).then_some(count);

        let envelope = walk_pages(
            |cursor| {
                let mut query = RecordsQuery::new().with_formula(formula).with_offset(cursor);
                query.max_records = max_records;
                async move { self.records_page(table, &query).await }
            },
            Some(count),
        )
        .await?;

        let fetched = envelope.items().map_or(0, Vec::len);
        Ok(envelope.with_message(format!("Retrieved {fetched} records from table {table}")))
    }

    /// Fetch every record of several tables.
    ///
    /// The body maps each table name to its records. Falls back to the
    /// configured table list when `tables` is `None`.
    #[instrument(skip_all)]
    pub async fn base(&self, tables: Option<&[String]>) -> Result<Envelope, Failure> {
        let tables = self.tables_or_default(tables)?;

        let mut body = Map::new();
        let mut code = None;
        for table in tables {
            let envelope = self.table(table, None).await?;
            code = envelope.code;
            body.insert(table.clone(), envelope.body.unwrap_or_else(|| Value::Array(Vec::new())));
        }

        Ok(Envelope::new(
            true,
            code,
            Some(format!("Retrieved records of tables {}", tables.join(", "))),
            Some(Value::Object(body)),
            None,
        ))
    }

    /// Like [`base`](Self::base), but only keeps the record ids.
    #[instrument(skip_all)]
    pub async fn base_record_ids(&self, tables: Option<&[String]>) -> Result<Envelope, Failure> {
        let base = self.base(tables).await?;

        let mut ids = Map::new();
        if let Some(Value::Object(tables)) = base.body {
            for (table, records) in tables {
                let table_ids = record_ids(&records).into_iter().map(Value::String).collect();
                ids.insert(table, Value::Array(table_ids));
            }
        }

        let names: Vec<&str> = ids.keys().map(String::as_str).collect();
        let message = format!("Retrieved record ids of tables {}", names.join(", "));
        Ok(Envelope::new(
            true,
            base.code,
            Some(message),
            Some(Value::Object(ids)),
            None,
        ))
    }

    async fn create_chunk(&self, table: &str, chunk: Vec<Value>) -> Result<Envelope, Failure> {
        let body = RecordsRequest {
            records: chunk
                .into_iter()
                .map(|fields| NewRecord { fields })
                .collect(),
        };
        let request = HttpRequest::new(HttpMethod::Post, self.table_url(table)?)
            .with_json(serde_json::to_value(body)?);
        self.write_chunk(request).await
    }

    async fn update_chunk(&self, table: &str, chunk: Vec<RecordUpdate>) -> Result<Envelope, Failure> {
        let body = RecordsRequest { records: chunk };
        let request = HttpRequest::new(HttpMethod::Patch, self.table_url(table)?)
            .with_json(serde_json::to_value(body)?);
        self.write_chunk(request).await
    }

    async fn delete_chunk(&self, table: &str, chunk: Vec<String>) -> Result<Envelope, Failure> {
        let mut request = HttpRequest::new(HttpMethod::Delete, self.table_url(table)?);
        for id in chunk {
            request = request.with_query("records[]", id);
        }
        self.write_chunk(request).await
    }

    async fn write_chunk(&self, request: HttpRequest) -> Result<Envelope, Failure> {
        let response = self.send(request).await?;
        let written: RecordsResponse = serde_json::from_value(response.body)
            .map_err(|e| AirtableError::UnexpectedResponse(e.to_string()))?;
        Ok(Envelope::success(response.status).with_body(Value::Array(written.records)))
    }

    /// Create records from their cell values, ten per request.
    ///
    /// The body lists the created records in input order.
    #[instrument(skip(self, records), fields(table = %table, records = records.len()))]
    pub async fn create_records(&self, table: &str, records: Vec<Value>) -> Result<Envelope, Failure> {
        self.table_url(table)?;
        if records.is_empty() {
            return Err(AirtableError::MissingParameter("records").into());
        }

        let runner = self.config.runner();
        let chunks = run_chunked(
            |chunk, table| self.create_chunk(table, chunk),
            records,
            runner.chunk_size,
            table,
            runner.delay,
        )
        .await?;

        let (created, code) = concat_bodies(chunks);
        info!(created = created.len(), "records created");
        Ok(Envelope::success(code.unwrap_or(200))
            .with_message(format!("Successfully created {} records in table {table}", created.len()))
            .with_body(Value::Array(created)))
    }

    /// Update records by id, ten per request. Only the passed fields change.
    #[instrument(skip(self, records), fields(table = %table, records = records.len()))]
    pub async fn update_records(
        &self,
        table: &str,
        records: Vec<RecordUpdate>,
    ) -> Result<Envelope, Failure> {
        self.table_url(table)?;
        if records.is_empty() {
            return Err(AirtableError::MissingParameter("records").into());
        }

        let runner = self.config.runner();
        let chunks = run_chunked(
            |chunk, table| self.update_chunk(table, chunk),
            records,
            runner.chunk_size,
            table,
            runner.delay,
        )
        .await?;

        let (updated, code) = concat_bodies(chunks);
        info!(updated = updated.len(), "records updated");
        Ok(Envelope::success(code.unwrap_or(200))
            .with_message(format!("Successfully updated {} records in table {table}", updated.len()))
            .with_body(Value::Array(updated)))
    }

    /// Delete records by id, ten per request.
    ///
    /// An empty id list is a successful no-op.
    #[instrument(skip(self, ids), fields(table = %table, records = ids.len()))]
    pub async fn delete_records(&self, table: &str, ids: Vec<String>) -> Result<Envelope, Failure> {
        self.table_url(table)?;
        if ids.is_empty() {
            return Ok(Envelope::success(200)
                .with_message("No record ids passed, nothing to delete")
                .with_body(Value::Array(Vec::new())));
        }

        let runner = self.config.runner();
        let chunks = run_chunked(
            |chunk, table| self.delete_chunk(table, chunk),
            ids,
            runner.chunk_size,
            table,
            runner.delay,
        )
        .await?;

        let (deleted, code) = concat_bodies(chunks);
        info!(deleted = deleted.len(), "records deleted");
        Ok(Envelope::success(code.unwrap_or(200))
            .with_message(format!("Deleted {} records from table {table}", deleted.len()))
            .with_body(Value::Array(deleted)))
    }

    /// Delete every record of a table.
    #[instrument(skip(self), fields(table = %table))]
    pub async fn clear_table(&self, table: &str) -> Result<Envelope, Failure> {
        let listing = self.table(table, None).await?;
        let ids = listing.body.as_ref().map(record_ids).unwrap_or_default();

        if ids.is_empty() {
            return Ok(Envelope::success(200)
                .with_message(format!("Table {table} is empty"))
                .with_body(Value::Array(Vec::new())));
        }

        let deleted = self.delete_records(table, ids).await?;
        let count = deleted.items().map_or(0, Vec::len);
        Ok(deleted.with_message(format!("Deleted all {count} records of table {table}")))
    }

    /// Delete every record of several tables.
    ///
    /// The body maps each table name to the envelope of its
    /// [`clear_table`](Self::clear_table) call.
    #[instrument(skip_all)]
    pub async fn clear_base(&self, tables: Option<&[String]>) -> Result<Envelope, Failure> {
        let tables = self.tables_or_default(tables)?;

        let mut body = Map::new();
        let mut code = None;
        for table in tables {
            let cleared = self.clear_table(table).await?;
            code = cleared.code;
            body.insert(table.clone(), cleared.to_value());
        }

        Ok(Envelope::new(
            true,
            code,
            Some(format!("Cleared tables {}", tables.join(", "))),
            Some(Value::Object(body)),
            None,
        ))
    }
}

/// Ids of a list of records; entries without a string id are skipped.
fn record_ids(records: &Value) -> Vec<String> {
    records
        .as_array()
        .map(|records| {
            records
                .iter()
                .filter_map(|r| r.get("id").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

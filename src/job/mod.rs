//! Asynchronous analysis job handling.
//!
//! When an analysis job finishes, a notification event names the job and
//! the source document. [`JobProcessor`] takes it from there: it fetches
//! all result pages from a [`JobResultSource`], reconstructs every page,
//! uploads the page list to a [`ResultSink`] under [`output_key`], and
//! writes a [`Record`] to a [`RecordStore`]. Each collaborator call runs
//! under the configured [`RetryPolicy`].

mod retry;
mod sink;
mod source;
mod store;

pub use retry::RetryPolicy;
pub use sink::{output_key, DirectorySink, ResultSink};
pub use source::{fetch_job_result, DirectoryResultSource, JobResultSource};
pub use store::{sanitize_table_name, FileRecordStore, Record, RecordStore, DEFAULT_TABLE};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::parser::{AnalysisParser, ParseOptions};
use crate::render::{pages_to_json, JsonFormat};

/// Job status that allows processing.
pub const STATUS_SUCCEEDED: &str = "SUCCEEDED";

/// A job-completion notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Analysis job id
    pub job_id: String,
    /// Caller-supplied tag, usually a document id
    pub job_tag: Option<String>,
    /// Final job status
    pub status: String,
    /// API that started the job
    pub api: String,
    /// Bucket holding the source document
    pub bucket: String,
    /// Object name of the source document
    pub object_name: String,
}

impl Notification {
    /// `bucket/object` path of the source document.
    pub fn file_path(&self) -> String {
        format!("{}/{}", self.bucket, self.object_name)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawEvent {
    #[serde(default)]
    records: Vec<RawRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRecord {
    sns: RawSns,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawSns {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawMessage {
    #[serde(alias = "job_id")]
    job_id: Option<String>,
    job_tag: Option<String>,
    status: Option<String>,
    #[serde(rename = "API")]
    api: Option<String>,
    document_location: Option<RawLocation>,
}

#[derive(Deserialize)]
struct RawLocation {
    #[serde(rename = "S3Bucket")]
    bucket: Option<String>,
    #[serde(rename = "S3ObjectName", alias = "S3object_name")]
    object_name: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Notification(format!("missing {}", field)))
}

/// Parse a single notification message body.
///
/// Fails with [`Error::Notification`] when a required field is missing or
/// empty, and with [`Error::JobNotSucceeded`] when the job did not succeed.
pub fn parse_message(message: &str) -> Result<Notification> {
    let raw: RawMessage = serde_json::from_str(message)
        .map_err(|e| Error::Notification(format!("message is not valid JSON: {}", e)))?;

    let job_id = required(raw.job_id, "JobId")?;
    let status = required(raw.status, "Status")?;
    let api = required(raw.api, "API")?;
    let location = raw
        .document_location
        .ok_or_else(|| Error::Notification("missing DocumentLocation".into()))?;
    let bucket = required(location.bucket, "DocumentLocation.S3Bucket")?;
    let object_name = required(location.object_name, "DocumentLocation.S3ObjectName")?;

    if status != STATUS_SUCCEEDED {
        return Err(Error::JobNotSucceeded { job_id, status });
    }

    Ok(Notification {
        job_id,
        job_tag: raw.job_tag.filter(|t| !t.is_empty()),
        status,
        api,
        bucket,
        object_name,
    })
}

/// Parse a notification event carrying one or more job messages.
pub fn parse_event(event: &str) -> Result<Vec<Notification>> {
    let raw: RawEvent = serde_json::from_str(event)
        .map_err(|e| Error::Notification(format!("event is not valid JSON: {}", e)))?;

    if raw.records.is_empty() {
        return Err(Error::Notification("event has no records".into()));
    }

    raw.records
        .iter()
        .map(|record| parse_message(&record.sns.message))
        .collect()
}

/// Configuration for [`JobProcessor`].
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Record store table
    pub table: String,
    /// Retry policy for collaborator calls
    pub retry: RetryPolicy,
    /// Reconstruction options
    pub parse: ParseOptions,
    /// Format of the uploaded JSON
    pub json_format: JsonFormat,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            retry: RetryPolicy::default(),
            parse: ParseOptions::default(),
            json_format: JsonFormat::Compact,
        }
    }
}

impl JobConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record store table.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set reconstruction options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Set the uploaded JSON format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }
}

/// What a processed job produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    /// Analysis job id
    pub job_id: String,
    /// Key the page list was uploaded under
    pub output_key: String,
    /// Number of reconstructed pages
    pub page_count: u32,
}

/// Runs finished jobs through reconstruction and storage.
pub struct JobProcessor<S, K, R> {
    source: S,
    sink: K,
    store: R,
    config: JobConfig,
}

impl<S, K, R> JobProcessor<S, K, R>
where
    S: JobResultSource,
    K: ResultSink,
    R: RecordStore,
{
    /// Create a processor with default configuration.
    pub fn new(source: S, sink: K, store: R) -> Self {
        Self::with_config(source, sink, store, JobConfig::default())
    }

    /// Create a processor with custom configuration.
    pub fn with_config(source: S, sink: K, store: R, config: JobConfig) -> Self {
        Self {
            source,
            sink,
            store,
            config,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Process every job named in a notification event.
    pub fn process_event(&self, event: &str) -> Result<Vec<JobOutcome>> {
        parse_event(event)?
            .iter()
            .map(|notification| self.process(notification))
            .collect()
    }

    /// Process one finished job.
    pub fn process(&self, notification: &Notification) -> Result<JobOutcome> {
        let retry = &self.config.retry;
        let file_path = notification.file_path();
        log::info!("Processing job {} for {}", notification.job_id, file_path);

        let result =
            fetch_job_result(&self.source, &notification.api, &notification.job_id, retry)?;

        let document = AnalysisParser::from_result_with_options(result, self.config.parse.clone())
            .with_source(file_path.clone())
            .parse()?;

        let body = pages_to_json(&document.pages, self.config.json_format)?;
        let key = output_key(&notification.object_name);
        retry.run("upload result", || self.sink.put(&key, body.as_bytes()))?;

        let record = Record::new(
            notification.object_name.clone(),
            file_path,
            serde_json::to_value(&document.pages)?,
        );
        retry.run("store record", || {
            self.store.put(&self.config.table, &record)
        })?;

        log::info!(
            "Job {}: {} pages written to {}",
            notification.job_id,
            document.pages.len(),
            key
        );

        Ok(JobOutcome {
            job_id: notification.job_id.clone(),
            output_key: key,
            page_count: document.pages.len() as u32,
        })
    }
}

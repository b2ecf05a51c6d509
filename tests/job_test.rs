//! End-to-end tests for the job pipeline.

use std::cell::Cell;
use std::fs;
use std::rc::Rc;
use std::time::Duration;

use blockdoc::job::{
    output_key, DirectoryResultSource, DirectorySink, FileRecordStore, JobConfig, JobProcessor,
    ResultSink, RetryPolicy, DEFAULT_TABLE,
};
use blockdoc::Error;

const FIRST_PAGE: &str = r#"{
    "JobStatus": "SUCCEEDED",
    "DocumentMetadata": {"Pages": 2},
    "NextToken": "opaque",
    "Blocks": [
        {"BlockType": "LINE", "Id": "l1", "Page": 1, "Text": "Application",
         "Geometry": {"BoundingBox": {"Top": 0.125, "Left": 0.1, "Width": 0.5, "Height": 0.0625}}},
        {"BlockType": "KEY_VALUE_SET", "Id": "k1", "Page": 1, "EntityTypes": ["KEY"],
         "Geometry": {"BoundingBox": {"Top": 0.25, "Left": 0.1, "Width": 0.2, "Height": 0.0625}},
         "Relationships": [{"Type": "CHILD", "Ids": ["w1"]}, {"Type": "VALUE", "Ids": ["v1"]}]},
        {"BlockType": "KEY_VALUE_SET", "Id": "v1", "Page": 1, "EntityTypes": ["VALUE"],
         "Geometry": {"BoundingBox": {"Top": 0.25, "Left": 0.4, "Width": 0.2, "Height": 0.0625}},
         "Relationships": [{"Type": "CHILD", "Ids": ["w2"]}]},
        {"BlockType": "WORD", "Id": "w1", "Page": 1, "Text": "Name",
         "Geometry": {"BoundingBox": {"Top": 0.25, "Left": 0.1, "Width": 0.2, "Height": 0.0625}}},
        {"BlockType": "WORD", "Id": "w2", "Page": 1, "Text": "Alice",
         "Geometry": {"BoundingBox": {"Top": 0.25, "Left": 0.4, "Width": 0.2, "Height": 0.0625}}}
    ]
}"#;

const SECOND_PAGE: &str = r#"{
    "Blocks": [
        {"BlockType": "LINE", "Id": "l2", "Page": 2, "Text": "Signature",
         "Geometry": {"BoundingBox": {"Top": 0.5, "Left": 0.1, "Width": 0.5, "Height": 0.0625}}}
    ]
}"#;

fn event(job_id: &str, status: &str, object: &str) -> String {
    let message = serde_json::json!({
        "JobId": job_id,
        "JobTag": "doc-1",
        "Status": status,
        "API": "StartDocumentAnalysis",
        "DocumentLocation": {"S3Bucket": "inbox", "S3ObjectName": object}
    })
    .to_string();
    serde_json::json!({"Records": [{"Sns": {"Message": message}}]}).to_string()
}

struct Dirs {
    _tmp: tempfile::TempDir,
    results: std::path::PathBuf,
    output: std::path::PathBuf,
    records: std::path::PathBuf,
}

fn setup() -> Dirs {
    let tmp = tempfile::tempdir().unwrap();
    let results = tmp.path().join("results");
    let output = tmp.path().join("output");
    let records = tmp.path().join("records");

    let job_dir = results.join("job-42");
    fs::create_dir_all(&job_dir).unwrap();
    fs::write(job_dir.join("0001.json"), FIRST_PAGE).unwrap();
    fs::write(job_dir.join("0002.json"), SECOND_PAGE).unwrap();

    Dirs {
        _tmp: tmp,
        results,
        output,
        records,
    }
}

#[test]
fn test_process_event_writes_output_and_record() {
    let dirs = setup();
    let processor = JobProcessor::new(
        DirectoryResultSource::new(&dirs.results),
        DirectorySink::new(&dirs.output),
        FileRecordStore::new(&dirs.records),
    );

    let outcomes = processor
        .process_event(&event("job-42", "SUCCEEDED", "forms/2024/app.pdf"))
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.job_id, "job-42");
    assert_eq!(outcome.output_key, "forms/2024/app/textract/app.json");
    assert_eq!(outcome.page_count, 2);

    let written = fs::read_to_string(dirs.output.join(&outcome.output_key)).unwrap();
    let pages: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(pages[0]["page"], 1);
    assert_eq!(pages[0]["content"][0]["line_text"], "Application");
    assert_eq!(pages[0]["content"][0]["key_values"]["Name "], "Alice ");
    assert_eq!(pages[1]["content"][0]["line_text"], "Signature");

    let store = FileRecordStore::new(&dirs.records);
    let record = store
        .get(DEFAULT_TABLE, "forms/2024/app.pdf")
        .unwrap()
        .expect("record stored");
    assert_eq!(record.file_path, "inbox/forms/2024/app.pdf");
    assert_eq!(record.content, pages);
}

#[test]
fn test_custom_table_is_sanitized() {
    let dirs = setup();
    let config = JobConfig::new()
        .with_table("W2 forms")
        .with_retry(RetryPolicy::no_retry());
    let processor = JobProcessor::with_config(
        DirectoryResultSource::new(&dirs.results),
        DirectorySink::new(&dirs.output),
        FileRecordStore::new(&dirs.records),
        config,
    );

    processor
        .process_event(&event("job-42", "SUCCEEDED", "app.pdf"))
        .unwrap();

    assert!(dirs.records.join("W2-forms").join("app.pdf.json").is_file());
    assert!(dirs.output.join(output_key("app.pdf")).is_file());
}

#[test]
fn test_failed_job_never_reaches_collaborators() {
    let dirs = setup();
    let processor = JobProcessor::new(
        DirectoryResultSource::new(&dirs.results),
        DirectorySink::new(&dirs.output),
        FileRecordStore::new(&dirs.records),
    );

    let err = processor
        .process_event(&event("job-42", "FAILED", "app.pdf"))
        .unwrap_err();
    assert!(matches!(err, Error::JobNotSucceeded { .. }));
    assert!(!dirs.output.exists());
    assert!(!dirs.records.exists());
}

#[test]
fn test_missing_results_is_storage_error() {
    let dirs = setup();
    let processor = JobProcessor::new(
        DirectoryResultSource::new(&dirs.results),
        DirectorySink::new(&dirs.output),
        FileRecordStore::new(&dirs.records),
    );

    let err = processor
        .process_event(&event("job-unknown", "SUCCEEDED", "app.pdf"))
        .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
}

/// Sink that is throttled a fixed number of times before accepting writes.
struct FlakySink {
    inner: DirectorySink,
    failures_left: Cell<u32>,
    calls: Rc<Cell<u32>>,
}

impl ResultSink for FlakySink {
    fn put(&self, key: &str, body: &[u8]) -> blockdoc::Result<()> {
        self.calls.set(self.calls.get() + 1);
        if self.failures_left.get() > 0 {
            self.failures_left.set(self.failures_left.get() - 1);
            return Err(Error::Throttled {
                service: "sink".into(),
                message: "slow down".into(),
            });
        }
        self.inner.put(key, body)
    }
}

fn fast_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_attempts(attempts)
        .with_initial_backoff(Duration::from_millis(1))
        .with_max_backoff(Duration::from_millis(2))
}

#[test]
fn test_throttled_upload_is_retried() {
    let dirs = setup();
    let calls = Rc::new(Cell::new(0));
    let sink = FlakySink {
        inner: DirectorySink::new(&dirs.output),
        failures_left: Cell::new(2),
        calls: Rc::clone(&calls),
    };
    let processor = JobProcessor::with_config(
        DirectoryResultSource::new(&dirs.results),
        sink,
        FileRecordStore::new(&dirs.records),
        JobConfig::new().with_retry(fast_retry(3)),
    );

    let outcomes = processor
        .process_event(&event("job-42", "SUCCEEDED", "app.pdf"))
        .unwrap();
    assert!(dirs.output.join(&outcomes[0].output_key).is_file());
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_retry_gives_up_after_max_attempts() {
    let dirs = setup();
    let calls = Rc::new(Cell::new(0));
    let sink = FlakySink {
        inner: DirectorySink::new(&dirs.output),
        failures_left: Cell::new(10),
        calls: Rc::clone(&calls),
    };
    let processor = JobProcessor::with_config(
        DirectoryResultSource::new(&dirs.results),
        sink,
        FileRecordStore::new(&dirs.records),
        JobConfig::new().with_retry(fast_retry(3)),
    );

    let err = processor
        .process_event(&event("job-42", "SUCCEEDED", "app.pdf"))
        .unwrap_err();
    assert!(matches!(err, Error::Throttled { .. }));
    assert_eq!(calls.get(), 3);
    assert!(!dirs.records.exists());
}

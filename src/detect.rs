//! Input format detection.
//!
//! Analysis output arrives in three shapes: a single response object, an
//! array of response pages saved from a paginated job, or a notification
//! event announcing that a job finished. Only the first two carry blocks.

use crate::error::{Error, Result};
use crate::model::AnalysisResponse;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Shape of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// One response object with a `Blocks` array
    Response,
    /// An array of response pages
    ResponsePages(usize),
    /// A notification event (`Records[].Sns.Message`)
    NotificationEvent,
}

impl InputFormat {
    /// Whether this input carries blocks.
    pub fn has_blocks(&self) -> bool {
        !matches!(self, InputFormat::NotificationEvent)
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Response => write!(f, "analysis response"),
            InputFormat::ResponsePages(n) => write!(f, "analysis response ({} pages)", n),
            InputFormat::NotificationEvent => write!(f, "notification event"),
        }
    }
}

/// Detect the input format of a file.
///
/// # Example
/// ```no_run
/// use blockdoc::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("job-output.json").unwrap();
/// println!("Input: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let data = fs::read(path)?;
    detect_format_from_bytes(&data)
}

/// Detect the input format of raw bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<InputFormat> {
    let value: Value = serde_json::from_slice(data)?;
    classify(&value)
}

fn classify(value: &Value) -> Result<InputFormat> {
    match value {
        Value::Object(map) if map.contains_key("Blocks") => Ok(InputFormat::Response),
        Value::Object(map) if map.contains_key("Records") => Ok(InputFormat::NotificationEvent),
        Value::Array(items)
            if !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.get("Blocks").is_some_and(Value::is_array)) =>
        {
            Ok(InputFormat::ResponsePages(items.len()))
        }
        Value::Object(_) => {
            Err(Error::UnknownFormat("object has neither Blocks nor Records".into()))
        }
        Value::Array(_) => {
            Err(Error::UnknownFormat("array is empty or holds non-response items".into()))
        }
        _ => Err(Error::UnknownFormat("expected a JSON object or array".into())),
    }
}

/// Decode analysis responses from raw bytes.
///
/// A single response yields a one-element list. Notification events are
/// rejected, since they point at a job instead of carrying its output.
pub fn decode_responses(data: &[u8]) -> Result<Vec<AnalysisResponse>> {
    let value: Value = serde_json::from_slice(data)?;
    match classify(&value)? {
        InputFormat::Response => Ok(vec![serde_json::from_value(value)?]),
        InputFormat::ResponsePages(_) => Ok(serde_json::from_value(value)?),
        InputFormat::NotificationEvent => {
            Err(Error::UnknownFormat("notification event carries no blocks".into()))
        }
    }
}

//! Where finished job results are fetched from.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::decode_responses;
use crate::error::{Error, Result};
use crate::model::{AnalysisResponse, AnalysisResult};

use super::retry::RetryPolicy;

/// Job statuses whose output may be reconstructed.
const USABLE_STATUSES: &[&str] = &["SUCCEEDED", "PARTIAL_SUCCESS"];

/// Source of paginated analysis results for a finished job.
pub trait JobResultSource {
    /// Fetch one page of results. `next_token` is `None` for the first page
    /// and otherwise the token returned by the previous page.
    fn fetch_page(
        &self,
        api: &str,
        job_id: &str,
        next_token: Option<&str>,
    ) -> Result<AnalysisResponse>;
}

/// Fetch every page of a job's results and merge them.
///
/// Follows `NextToken` until a page comes back without one. Each page
/// fetch is retried under `retry`.
pub fn fetch_job_result<S>(
    source: &S,
    api: &str,
    job_id: &str,
    retry: &RetryPolicy,
) -> Result<AnalysisResult>
where
    S: JobResultSource + ?Sized,
{
    let mut responses = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut token: Option<String> = None;

    loop {
        let response = retry.run("fetch job result", || {
            source.fetch_page(api, job_id, token.as_deref())
        })?;

        if responses.is_empty() {
            if let Some(status) = response.job_status.as_deref() {
                if !USABLE_STATUSES.contains(&status) {
                    return Err(Error::JobNotSucceeded {
                        job_id: job_id.to_string(),
                        status: status.to_string(),
                    });
                }
                if status != "SUCCEEDED" {
                    log::warn!("Job {} finished with status {}", job_id, status);
                }
            }
        }

        token = response.next_token.clone();
        responses.push(response);

        match token.as_deref() {
            None => break,
            Some(next) if !seen_tokens.insert(next.to_string()) => {
                return Err(Error::Other(format!(
                    "job {} returned next token '{}' twice",
                    job_id, next
                )));
            }
            Some(_) => {}
        }
    }

    log::debug!("Job {}: fetched {} result pages", job_id, responses.len());
    AnalysisResult::from_responses(responses)
}

/// Serves saved job results from a directory.
///
/// A job's output is either `<root>/<job_id>.json` (one response, or an
/// array of response pages) or a directory `<root>/<job_id>/` holding one
/// response per `.json` file, taken in file name order. Continuation
/// tokens are page positions, so tokens stored in the files are ignored.
#[derive(Debug, Clone)]
pub struct DirectoryResultSource {
    root: PathBuf,
}

impl DirectoryResultSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, job_id: &str) -> Result<SavedJob> {
        if job_id.is_empty() || job_id.contains(['/', '\\']) || job_id == ".." {
            return Err(Error::Storage(format!("invalid job id '{}'", job_id)));
        }

        let file = self.root.join(format!("{}.json", job_id));
        if file.is_file() {
            return Ok(SavedJob::Responses(decode_responses(&fs::read(&file)?)?));
        }

        let dir = self.root.join(job_id);
        if dir.is_dir() {
            let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .collect();
            files.sort();
            return Ok(SavedJob::PageFiles(files));
        }

        Err(Error::Storage(format!(
            "no results for job {} under {}",
            job_id,
            self.root.display()
        )))
    }
}

/// Saved output of one job.
enum SavedJob {
    /// Every page, decoded from a single file.
    Responses(Vec<AnalysisResponse>),
    /// One response file per page, in page order. Only the requested page
    /// is read.
    PageFiles(Vec<PathBuf>),
}

impl SavedJob {
    fn len(&self) -> usize {
        match self {
            SavedJob::Responses(pages) => pages.len(),
            SavedJob::PageFiles(files) => files.len(),
        }
    }

    fn take(self, position: usize) -> Result<AnalysisResponse> {
        match self {
            SavedJob::Responses(mut pages) => Ok(pages.swap_remove(position)),
            SavedJob::PageFiles(files) => {
                log::trace!("Reading result page {}", files[position].display());
                Ok(serde_json::from_slice(&fs::read(&files[position])?)?)
            }
        }
    }
}

impl JobResultSource for DirectoryResultSource {
    fn fetch_page(
        &self,
        api: &str,
        job_id: &str,
        next_token: Option<&str>,
    ) -> Result<AnalysisResponse> {
        log::debug!(
            "{} results for job {} (token {:?})",
            api,
            job_id,
            next_token
        );

        let saved = self.locate(job_id)?;
        let position = match next_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| Error::Storage(format!("invalid next token '{}'", token)))?,
        };

        let count = saved.len();
        if position >= count {
            return Err(Error::Storage(format!(
                "next token {} is past the last of {} result pages",
                position, count
            )));
        }

        let mut page = saved.take(position)?;
        page.next_token = (position + 1 < count).then(|| (position + 1).to_string());
        Ok(page)
    }
}

//! Per-file orchestration: list, resolve, fetch, assemble.
//!
//! Every file ends in exactly one [`FileOutcome`]. A row is only appended once
//! all lookups for its file succeeded, so the report never holds partial rows.
//! What happens after a failed file is decided by the [`FailurePolicy`].

use crate::records::RecordFetcher;
use crate::report::{MetadataReport, MetadataRow};
use crate::resolver::document_reference_url;
use crate::transport::HttpGet;
use crate::{CoreError, CoreResult};
use cavatica::{CavaticaClient, RemoteFile};
use chrono::Utc;

/// Source of the files to process.
pub trait FileLister {
    fn list_files(&self, project_id: &str) -> CoreResult<Vec<RemoteFile>>;
}

impl FileLister for CavaticaClient {
    fn list_files(&self, project_id: &str) -> CoreResult<Vec<RemoteFile>> {
        Ok(self.list_project_files(project_id)?)
    }
}

/// Why a file produced no row without failing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No usable `fhir_document_reference` metadata.
    NoDocumentReference,
    /// The DocumentReference search matched nothing.
    EmptyBundle,
}

/// Result of processing one file.
#[derive(Debug)]
pub enum FileOutcome {
    Row(MetadataRow),
    Skipped(SkipReason),
    Failed(CoreError),
}

/// What to do when a file fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run and discard the report.
    #[default]
    Abort,
    /// Log the failure, count it, and move on to the next file.
    Continue,
}

/// Counters for a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub listed: usize,
    pub rows: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: chrono::Duration,
}

pub struct Pipeline<L, T> {
    lister: L,
    fetcher: RecordFetcher<T>,
    policy: FailurePolicy,
}

impl<L: FileLister, T: HttpGet> Pipeline<L, T> {
    pub fn new(lister: L, fetcher: RecordFetcher<T>, policy: FailurePolicy) -> Self {
        Self {
            lister,
            fetcher,
            policy,
        }
    }

    /// Process every file of `project_id` in listing order.
    ///
    /// # Errors
    ///
    /// Listing failures are always returned. File failures are returned as
    /// [`CoreError::FileFailed`] under [`FailurePolicy::Abort`] and counted
    /// otherwise.
    pub fn run(&self, project_id: &str) -> CoreResult<(MetadataReport, RunSummary)> {
        let start = Utc::now();
        let files = self.lister.list_files(project_id)?;

        let mut report = MetadataReport::new();
        let mut skipped = 0;
        let mut failed = 0;

        for file in &files {
            match self.process_file(file) {
                FileOutcome::Row(row) => report.push(row),
                FileOutcome::Skipped(reason) => {
                    tracing::debug!("skipping file {}: {:?}", file.id, reason);
                    skipped += 1;
                }
                FileOutcome::Failed(err) => match self.policy {
                    FailurePolicy::Abort => {
                        return Err(CoreError::FileFailed {
                            file_id: file.id.clone(),
                            source: Box::new(err),
                        });
                    }
                    FailurePolicy::Continue => {
                        tracing::error!("file {} failed: {}", file.id, err);
                        failed += 1;
                    }
                },
            }
        }

        let summary = RunSummary {
            listed: files.len(),
            rows: report.len(),
            skipped,
            failed,
            elapsed: Utc::now() - start,
        };
        tracing::info!(
            "processed {} files: {} rows, {} skipped, {} failed in {}ms",
            summary.listed,
            summary.rows,
            summary.skipped,
            summary.failed,
            summary.elapsed.num_milliseconds()
        );

        Ok((report, summary))
    }

    /// Resolve one file into its outcome.
    pub fn process_file(&self, file: &RemoteFile) -> FileOutcome {
        match self.resolve_file(file) {
            Ok(outcome) => outcome,
            Err(err) => FileOutcome::Failed(err),
        }
    }

    fn resolve_file(&self, file: &RemoteFile) -> CoreResult<FileOutcome> {
        let Some(url) = document_reference_url(file)? else {
            return Ok(FileOutcome::Skipped(SkipReason::NoDocumentReference));
        };

        let Some(doc) = self.fetcher.fetch_document_reference(url)? else {
            return Ok(FileOutcome::Skipped(SkipReason::EmptyBundle));
        };

        let sample_id = self.fetcher.fetch_sample_id(&doc)?;
        let patient = self.fetcher.fetch_patient_info(&doc)?;
        let trisomy = self.fetcher.fetch_trisomy_state(&doc)?;

        tracing::debug!("file {} -> sample {}", file.id, sample_id);
        Ok(FileOutcome::Row(MetadataRow::assemble(sample_id, patient, trisomy)))
    }
}

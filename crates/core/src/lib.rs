//! # fhir2vis core
//!
//! Core logic for correlating Cavatica workspace files with INCLUDE FHIR records.
//!
//! This crate contains:
//! - Runtime configuration resolved once at startup ([`CoreConfig`])
//! - The cookie-authenticated FHIR transport ([`CookieClient`])
//! - Document-reference resolution on file metadata
//! - Chained record lookups ([`RecordFetcher`])
//! - Row assembly and the JSON report ([`MetadataReport`])
//! - The per-file pipeline and its failure policy ([`Pipeline`])
//!
//! **No CLI concerns**: argument parsing, logging setup and output selection belong
//! in the `fhir2vis` binary.

pub mod config;
pub mod constants;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod resolver;
pub mod transport;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use pipeline::{FailurePolicy, FileLister, FileOutcome, Pipeline, RunSummary, SkipReason};
pub use records::{PatientInfo, RecordFetcher};
pub use report::{MetadataReport, MetadataRow};
pub use resolver::document_reference_url;
pub use transport::{CookieClient, HttpGet};

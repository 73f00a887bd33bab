//! FHIR wire/boundary support for the INCLUDE clinical data service.
//!
//! This crate provides **wire models** and **translation helpers** for the JSON
//! resources returned by a FHIR REST server:
//! - search bundles (`total` + `entry[]`)
//! - DocumentReference, Specimen and Patient resources
//! - Condition searches used to derive the trisomy state
//!
//! This crate focuses on:
//! - strict-but-tolerant deserialisation (unknown keys are allowed, wrong types are not)
//! - translation from wire structs into flat domain-level types
//! - explicit absent-vs-present accessors instead of unchecked key lookups
//!
//! It performs no HTTP itself; transport lives in `fhir2vis-core`.

pub mod bundle;
pub mod condition;
pub mod document_reference;
pub mod identifier;
pub mod patient;
pub mod specimen;

// Re-export facades
pub use condition::ConditionSearch;
pub use document_reference::DocumentReference;
pub use patient::Patient;
pub use specimen::Specimen;

// Re-export public domain-level types
pub use bundle::Bundle;
pub use condition::TrisomyState;
pub use document_reference::{DocumentReferenceData, DocumentReferenceSet};
pub use identifier::{Identifier, IdentifierUse};
pub use patient::PatientData;
pub use specimen::SpecimenData;

use serde::de::DeserializeOwned;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("{resource} is missing required element '{element}'")]
    MissingElement {
        resource: &'static str,
        element: &'static str,
    },
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Deserialise JSON text into a wire struct, reporting the failing field path.
///
/// `label` names the resource in the error message, e.g. `"Patient"`.
pub(crate) fn parse_wire<T: DeserializeOwned>(json_text: &str, label: &str) -> FhirResult<T> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);

    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(FhirError::Translation(format!(
                "{label} schema mismatch at {path}: {source}"
            )))
        }
    }
}

/// Reject a resource whose `resourceType` is present but not the expected one.
///
/// Servers always send `resourceType`; fixtures and proxies sometimes strip it,
/// so absence is accepted.
pub(crate) fn check_resource_type(actual: Option<&str>, expected: &str) -> FhirResult<()> {
    match actual {
        Some(found) if found != expected => Err(FhirError::InvalidInput(format!(
            "Expected resourceType '{expected}', got '{found}'"
        ))),
        _ => Ok(()),
    }
}

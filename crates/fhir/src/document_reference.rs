//! FHIR DocumentReference search results.
//!
//! A document reference links a stored genomic file to the specimen it was
//! sequenced from (`context.related[0]`) and to the patient (`subject`). Its
//! `type.coding[0].display` names the specimen/data type.
//!
//! Responsibilities:
//! - Define the wire model for DocumentReference entries in a search bundle
//! - Flatten the nested references into a domain-level carrier
//! - Surface missing references as explicit errors when a caller needs them

use crate::bundle::{parse_bundle, Bundle};
use crate::{FhirError, FhirResult};
use serde::Deserialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Flat view of a DocumentReference resource.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentReferenceData {
    /// Relative reference to the patient, e.g. `Patient/4927`.
    pub subject_reference: Option<String>,

    /// Relative reference to the first related resource (the specimen), e.g. `Specimen/10`.
    pub specimen_reference: Option<String>,

    /// Display label of the first `type` coding.
    pub type_display: Option<String>,
}

impl DocumentReferenceData {
    /// The subject reference, or an error naming the missing element.
    pub fn require_subject(&self) -> FhirResult<&str> {
        self.subject_reference
            .as_deref()
            .ok_or(FhirError::MissingElement {
                resource: "DocumentReference",
                element: "subject.reference",
            })
    }

    /// The specimen reference, or an error naming the missing element.
    pub fn require_specimen(&self) -> FhirResult<&str> {
        self.specimen_reference
            .as_deref()
            .ok_or(FhirError::MissingElement {
                resource: "DocumentReference",
                element: "context.related[0].reference",
            })
    }
}

/// Search bundle of document references.
pub type DocumentReferenceSet = Bundle<DocumentReferenceData>;

// ============================================================================
// Public DocumentReference operations
// ============================================================================

/// DocumentReference operations.
///
/// Zero-sized namespace for associated functions.
pub struct DocumentReference;

impl DocumentReference {
    /// Parse a DocumentReference search response.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the JSON is malformed, `total` is missing, or a
    /// field has an unexpected type.
    pub fn parse_search(json_text: &str) -> FhirResult<DocumentReferenceSet> {
        parse_bundle(json_text, "DocumentReference bundle", wire_to_domain)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
struct DocumentReferenceWire {
    #[serde(default)]
    subject: Option<ReferenceWire>,

    #[serde(rename = "type", default)]
    type_concept: Option<CodeableConceptWire>,

    #[serde(default)]
    context: Option<ContextWire>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ReferenceWire {
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct CodeableConceptWire {
    #[serde(default)]
    coding: Vec<CodingWire>,
}

#[derive(Clone, Debug, Deserialize)]
struct CodingWire {
    #[serde(default)]
    display: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct ContextWire {
    #[serde(default)]
    related: Vec<ReferenceWire>,
}

fn wire_to_domain(wire: DocumentReferenceWire) -> DocumentReferenceData {
    DocumentReferenceData {
        subject_reference: wire.subject.and_then(|s| s.reference),
        specimen_reference: wire
            .context
            .and_then(|c| c.related.into_iter().next())
            .and_then(|r| r.reference),
        type_display: wire
            .type_concept
            .and_then(|t| t.coding.into_iter().next())
            .and_then(|c| c.display),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_document_reference() {
        let json = r#"{
            "resourceType": "Bundle",
            "total": 1,
            "entry": [{
                "resource": {
                    "resourceType": "DocumentReference",
                    "id": "dr-1",
                    "subject": {"reference": "Patient/4927"},
                    "type": {"coding": [
                        {"system": "https://includedcc.org", "display": "Aligned Reads"},
                        {"display": "ignored"}
                    ]},
                    "context": {"related": [
                        {"reference": "Specimen/10"},
                        {"reference": "Specimen/11"}
                    ]}
                }
            }]
        }"#;

        let set = DocumentReference::parse_search(json).expect("parse search");
        assert_eq!(set.total, 1);
        let doc = set.first_entry().flatten().expect("first resource");
        assert_eq!(
            doc,
            &DocumentReferenceData {
                subject_reference: Some("Patient/4927".into()),
                specimen_reference: Some("Specimen/10".into()),
                type_display: Some("Aligned Reads".into()),
            }
        );
        assert_eq!(doc.require_subject().unwrap(), "Patient/4927");
        assert_eq!(doc.require_specimen().unwrap(), "Specimen/10");
    }

    #[test]
    fn missing_type_leaves_display_empty() {
        let json = r#"{"total": 1, "entry": [{"resource": {
            "subject": {"reference": "Patient/1"},
            "context": {"related": [{"reference": "Specimen/2"}]}
        }}]}"#;

        let set = DocumentReference::parse_search(json).expect("parse search");
        let doc = set.first_entry().flatten().expect("first resource");
        assert_eq!(doc.type_display, None);
    }

    #[test]
    fn missing_references_are_reported_by_name() {
        let doc = DocumentReferenceData::default();

        match doc.require_subject() {
            Err(FhirError::MissingElement { element, .. }) => {
                assert_eq!(element, "subject.reference")
            }
            other => panic!("expected MissingElement, got {other:?}"),
        }
        match doc.require_specimen() {
            Err(FhirError::MissingElement { element, .. }) => {
                assert_eq!(element, "context.related[0].reference")
            }
            other => panic!("expected MissingElement, got {other:?}"),
        }
    }

    #[test]
    fn wrong_type_reports_path() {
        let json = r#"{"total": 1, "entry": [{"resource": {"subject": "Patient/1"}}]}"#;
        let err = DocumentReference::parse_search(json).expect_err("subject must be an object");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("subject")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }
}

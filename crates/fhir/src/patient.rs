//! FHIR-aligned patient wire model and translation helpers.
//!
//! Responsibilities:
//! - Define a wire model covering the patient fields the report needs
//! - Extract the official identifier (case id) and gender
//! - Resolve race and ethnicity from the US-Core extensions
//!
//! Notes:
//! - US-Core race/ethnicity extensions are complex extensions: the outer
//!   extension is identified by URL and holds nested extensions (`ombCategory`,
//!   `detailed`, `text`). The reported value is the `valueString` of the
//!   **last** nested extension, which is the `text` summary on INCLUDE data.

use crate::identifier::{identifiers_from_wire, Identifier, IdentifierWire};
use crate::{check_resource_type, parse_wire, FhirError, FhirResult};
use serde::Deserialize;

/// Extension URL for US-Core race.
pub const US_CORE_RACE_URL: &str = "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race";

/// Extension URL for US-Core ethnicity.
pub const US_CORE_ETHNICITY_URL: &str =
    "http://hl7.org/fhir/us/core/StructureDefinition/us-core-ethnicity";

// ============================================================================
// Public domain-level types
// ============================================================================

/// Domain-level carrier for patient demographics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientData {
    /// Identifiers in server order.
    pub identifiers: Vec<Identifier>,

    /// Administrative gender, passed through verbatim.
    pub gender: Option<String>,

    /// Race text from the US-Core race extension.
    pub race: Option<String>,

    /// Ethnicity text from the US-Core ethnicity extension.
    pub ethnicity: Option<String>,
}

impl PatientData {
    /// The official case id, if any.
    pub fn case_id(&self) -> Option<&str> {
        Identifier::official_value(&self.identifiers)
    }
}

// ============================================================================
// Public Patient operations
// ============================================================================

/// Patient resource operations.
///
/// This is a zero-sized type used for namespacing patient-related operations.
/// All methods are associated functions.
pub struct Patient;

impl Patient {
    /// Parse a patient resource from JSON text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path"
    /// (e.g. `extension[0].url`) to the failing field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FhirError`] if:
    /// - the JSON does not represent a patient resource,
    /// - any field has an unexpected type,
    /// - an extension has no `url`,
    /// - a race or ethnicity extension has no nested extensions, or its last
    ///   nested extension has no `valueString`,
    /// - resourceType is present and not "Patient".
    pub fn parse(json_text: &str) -> FhirResult<PatientData> {
        let wire: PatientWire = parse_wire(json_text, "Patient")?;
        check_resource_type(wire.resource_type.as_deref(), "Patient")?;

        wire_to_domain(wire)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
struct PatientWire {
    #[serde(rename = "resourceType", default)]
    resource_type: Option<String>,

    #[serde(default)]
    identifier: Vec<IdentifierWire>,

    #[serde(default)]
    gender: Option<String>,

    #[serde(default)]
    extension: Option<Vec<ExtensionWire>>,
}

#[derive(Clone, Debug, Deserialize)]
struct ExtensionWire {
    url: String,

    #[serde(default)]
    extension: Vec<ExtensionWire>,

    #[serde(rename = "valueString", default)]
    value_string: Option<String>,
}

impl ExtensionWire {
    fn last_nested_value(&self) -> FhirResult<String> {
        self.extension
            .last()
            .and_then(|e| e.value_string.clone())
            .ok_or(FhirError::MissingElement {
                resource: "Patient",
                element: "extension[].extension[-1].valueString",
            })
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: PatientWire) -> FhirResult<PatientData> {
    let mut race = None;
    let mut ethnicity = None;

    // A later matching extension overrides an earlier one.
    for ext in wire.extension.iter().flatten() {
        match ext.url.as_str() {
            US_CORE_RACE_URL => race = Some(ext.last_nested_value()?),
            US_CORE_ETHNICITY_URL => ethnicity = Some(ext.last_nested_value()?),
            _ => {}
        }
    }

    Ok(PatientData {
        identifiers: identifiers_from_wire(wire.identifier),
        gender: wire.gender,
        race,
        ethnicity,
    })
}

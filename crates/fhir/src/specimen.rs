//! FHIR Specimen wire model.
//!
//! Only the identifiers are read: the official one is the sample id.

use crate::identifier::{identifiers_from_wire, Identifier, IdentifierWire};
use crate::{check_resource_type, parse_wire, FhirResult};
use serde::Deserialize;

/// Domain-level carrier for a specimen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecimenData {
    pub identifiers: Vec<Identifier>,
}

impl SpecimenData {
    /// The official sample id, if any.
    pub fn sample_id(&self) -> Option<&str> {
        Identifier::official_value(&self.identifiers)
    }
}

/// Specimen resource operations.
pub struct Specimen;

impl Specimen {
    /// Parse a Specimen resource from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FhirError`] on malformed JSON, unexpected field types, or a
    /// `resourceType` other than `Specimen`.
    pub fn parse(json_text: &str) -> FhirResult<SpecimenData> {
        let wire: SpecimenWire = parse_wire(json_text, "Specimen")?;
        check_resource_type(wire.resource_type.as_deref(), "Specimen")?;

        Ok(SpecimenData {
            identifiers: identifiers_from_wire(wire.identifier),
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
struct SpecimenWire {
    #[serde(rename = "resourceType", default)]
    resource_type: Option<String>,

    #[serde(default)]
    identifier: Vec<IdentifierWire>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FhirError;

    #[test]
    fn official_identifier_is_sample_id() {
        let json = r#"{
            "resourceType": "Specimen",
            "id": "10",
            "identifier": [
                {"use": "secondary", "value": "SEC-9"},
                {"use": "official", "value": "SID-001"}
            ]
        }"#;

        let specimen = Specimen::parse(json).expect("parse specimen");
        assert_eq!(specimen.sample_id(), Some("SID-001"));
    }

    #[test]
    fn specimen_without_identifiers_has_no_sample_id() {
        let specimen = Specimen::parse(r#"{"resourceType": "Specimen"}"#).expect("parse");
        assert_eq!(specimen.sample_id(), None);
    }

    #[test]
    fn rejects_other_resource_types() {
        let err = Specimen::parse(r#"{"resourceType": "Patient"}"#).expect_err("wrong type");
        assert!(matches!(err, FhirError::InvalidInput(_)));
    }
}

//! Chained FHIR record lookups for one workspace file.
//!
//! Starting from a DocumentReference search URL:
//! 1. the search bundle gives the first document reference,
//! 2. its `context.related[0]` reference leads to the specimen (sample id),
//! 3. its `subject` reference leads to the patient (demographics),
//! 4. the same subject is used for the trisomy 21 condition search.
//!
//! Relative references are resolved against the configured base URL.

use crate::config::normalise_base_url;
use crate::transport::HttpGet;
use crate::CoreResult;
use fhir::{
    ConditionSearch, DocumentReference, DocumentReferenceData, FhirError, Patient, Specimen,
    TrisomyState,
};

/// Patient-derived report fields. Absent values are empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientInfo {
    pub case_id: String,
    pub specimen_type: String,
    pub gender: String,
    pub race: String,
    pub ethnicity: String,
}

/// Performs the record lookups against one FHIR server.
pub struct RecordFetcher<T> {
    transport: T,
    base_url: String,
}

impl<T: HttpGet> RecordFetcher<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: normalise_base_url(base_url),
        }
    }

    /// Absolute URL of a relative reference such as `Patient/4927`.
    pub fn resource_url(&self, relative: &str) -> String {
        format!("{}{}", self.base_url, relative.trim_start_matches('/'))
    }

    /// Fetch the DocumentReference search at `url`.
    ///
    /// Returns `Ok(None)` when the search matched nothing (`total == 0`),
    /// otherwise the first entry's resource.
    ///
    /// # Errors
    ///
    /// A non-zero total without a first entry resource is an error, as are
    /// transport and parse failures.
    pub fn fetch_document_reference(&self, url: &str) -> CoreResult<Option<DocumentReferenceData>> {
        let body = self.transport.get_text(url)?;
        let set = DocumentReference::parse_search(&body)?;

        if set.is_empty() {
            return Ok(None);
        }

        match set.first_entry() {
            Some(Some(doc)) => Ok(Some(doc.clone())),
            Some(None) => Err(FhirError::MissingElement {
                resource: "DocumentReference bundle",
                element: "entry[0].resource",
            }
            .into()),
            None => Err(FhirError::MissingElement {
                resource: "DocumentReference bundle",
                element: "entry[0]",
            }
            .into()),
        }
    }

    /// Official identifier of the specimen the document was derived from.
    pub fn fetch_sample_id(&self, doc: &DocumentReferenceData) -> CoreResult<String> {
        let url = self.resource_url(doc.require_specimen()?);
        let specimen = Specimen::parse(&self.transport.get_text(&url)?)?;

        Ok(specimen.sample_id().unwrap_or_default().to_string())
    }

    /// Demographics of the document's subject plus the document's type label.
    ///
    /// # Errors
    ///
    /// A patient without `gender` is an error; every other missing value
    /// becomes an empty string.
    pub fn fetch_patient_info(&self, doc: &DocumentReferenceData) -> CoreResult<PatientInfo> {
        let url = self.resource_url(doc.require_subject()?);
        let patient = Patient::parse(&self.transport.get_text(&url)?)?;

        let gender = patient.gender.clone().ok_or(FhirError::MissingElement {
            resource: "Patient",
            element: "gender",
        })?;

        Ok(PatientInfo {
            case_id: patient.case_id().unwrap_or_default().to_string(),
            specimen_type: doc.type_display.clone().unwrap_or_default(),
            gender,
            race: patient.race.unwrap_or_default(),
            ethnicity: patient.ethnicity.unwrap_or_default(),
        })
    }

    /// Trisomy 21 state of the document's subject.
    pub fn fetch_trisomy_state(&self, doc: &DocumentReferenceData) -> CoreResult<TrisomyState> {
        let subject = doc.require_subject()?;
        let url = self.resource_url(&ConditionSearch::trisomy_path(subject));
        let total = ConditionSearch::parse_total(&self.transport.get_text(&url)?)?;

        let state = TrisomyState::from_condition_total(total);
        if let TrisomyState::Unknown { total } = state {
            tracing::warn!(
                "{} has {} confirmed trisomy 21 conditions; leaving state empty",
                subject,
                total
            );
        }
        Ok(state)
    }
}

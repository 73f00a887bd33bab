//! Condition search helpers used to derive the trisomy 21 state.
//!
//! The query asks for confirmed Down syndrome (`MONDO:0008608`) conditions of
//! one subject. Only the bundle `total` matters.

use crate::bundle::parse_bundle;
use crate::FhirResult;
use serde::de::IgnoredAny;

/// MONDO code for Down syndrome (trisomy 21).
pub const TRISOMY_21_CODE: &str = "MONDO:0008608";

/// Genotype label derived from the condition search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrisomyState {
    /// No confirmed condition: typical chromosome 21 count.
    D21,
    /// Confirmed trisomy 21.
    T21,
    /// More than one confirmed condition record; the label is undetermined.
    Unknown { total: u64 },
}

impl TrisomyState {
    /// Map a condition search total onto a genotype label.
    pub fn from_condition_total(total: u64) -> Self {
        match total {
            0 => TrisomyState::D21,
            1 => TrisomyState::T21,
            total => TrisomyState::Unknown { total },
        }
    }

    /// Label written to the report. `Unknown` renders as an empty string.
    pub fn label(self) -> &'static str {
        match self {
            TrisomyState::D21 => "D21",
            TrisomyState::T21 => "T21",
            TrisomyState::Unknown { .. } => "",
        }
    }
}

impl std::fmt::Display for TrisomyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrisomyState::Unknown { total } => write!(f, "unknown ({total} conditions)"),
            other => f.write_str(other.label()),
        }
    }
}

/// Condition search operations.
pub struct ConditionSearch;

impl ConditionSearch {
    /// Relative search path for confirmed `code` conditions of `subject`.
    ///
    /// `subject` is a relative reference such as `Patient/4927`; both values are
    /// percent-encoded.
    pub fn confirmed_path(code: &str, subject: &str) -> String {
        format!(
            "Condition?code={}&verification-status=confirmed&subject={}&_format=json",
            urlencoding::encode(code),
            urlencoding::encode(subject)
        )
    }

    /// Relative search path for confirmed trisomy 21 conditions of `subject`.
    pub fn trisomy_path(subject: &str) -> String {
        Self::confirmed_path(TRISOMY_21_CODE, subject)
    }

    /// Parse a Condition search response and return its `total`.
    pub fn parse_total(json_text: &str) -> FhirResult<u64> {
        let bundle = parse_bundle(json_text, "Condition bundle", |_: IgnoredAny| ())?;
        Ok(bundle.total)
    }
}

//! Metadata rows and the report they are collected into.
//!
//! The report serialises as a JSON array of 7-element string arrays, with no
//! header row:
//! `[sample_id, case_id, specimen_type, gender, race, ethnicity, trisomy_state]`.

use crate::records::PatientInfo;
use crate::{CoreError, CoreResult};
use fhir::TrisomyState;
use serde::ser::{Serialize, Serializer};
use std::fs;
use std::io::Write;
use std::path::Path;

/// One flattened row per workspace file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataRow {
    pub sample_id: String,
    pub case_id: String,
    pub specimen_type: String,
    pub gender: String,
    pub race: String,
    pub ethnicity: String,
    pub trisomy_state: String,
}

impl MetadataRow {
    /// Combine the lookup results for one file.
    pub fn assemble(sample_id: String, patient: PatientInfo, trisomy: TrisomyState) -> Self {
        Self {
            sample_id,
            case_id: patient.case_id,
            specimen_type: patient.specimen_type,
            gender: patient.gender,
            race: patient.race,
            ethnicity: patient.ethnicity,
            trisomy_state: trisomy.label().to_string(),
        }
    }

    /// Fields in report order.
    pub fn fields(&self) -> [&str; 7] {
        [
            self.sample_id.as_str(),
            self.case_id.as_str(),
            self.specimen_type.as_str(),
            self.gender.as_str(),
            self.race.as_str(),
            self.ethnicity.as_str(),
            self.trisomy_state.as_str(),
        ]
    }
}

impl Serialize for MetadataRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields().serialize(serializer)
    }
}

/// Rows in file-processing order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataReport {
    rows: Vec<MetadataRow>,
}

impl MetadataReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: MetadataRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[MetadataRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Compact JSON text of the whole report.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(&self.rows).map_err(CoreError::Serialization)
    }

    /// Write the JSON report followed by a newline.
    pub fn write_json<W: Write>(&self, mut writer: W) -> CoreResult<()> {
        let json = self.to_json()?;
        writeln!(writer, "{json}").map_err(CoreError::ReportWrite)?;
        writer.flush().map_err(CoreError::ReportWrite)
    }

    /// Write the report to `path`, replacing any existing file.
    ///
    /// The report is written next to `path` first and then renamed into place,
    /// so readers never observe a partial report.
    pub fn write_to_path(&self, path: &Path) -> CoreResult<()> {
        let json = self.to_json()?;

        let mut staging = path.as_os_str().to_owned();
        staging.push(".partial");
        let staging = Path::new(&staging);

        fs::write(staging, format!("{json}\n")).map_err(CoreError::ReportWrite)?;
        fs::rename(staging, path).map_err(|e| {
            let _ = fs::remove_file(staging);
            CoreError::ReportWrite(e)
        })
    }
}

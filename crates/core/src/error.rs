#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned HTTP {status}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("workspace error: {0}")]
    Workspace(#[from] cavatica::CavaticaError),
    #[error("metadata '{key}' of file {file_id} is not a string")]
    MetadataType { file_id: String, key: String },
    #[error("file {file_id} failed: {source}")]
    FileFailed {
        file_id: String,
        #[source]
        source: Box<CoreError>,
    },
    #[error("failed to serialize report: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to write report: {0}")]
    ReportWrite(std::io::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

//! Fixed values used throughout the core crate.

/// Default INCLUDE FHIR service base URL.
pub const DEFAULT_FHIR_BASE_URL: &str = "https://include-api-fhir-service.includedcc.org/";

/// Name of the load-balancer session cookie that authenticates FHIR requests.
pub const FHIR_AUTH_COOKIE_NAME: &str = "AWSELBAuthSessionCookie-0";

/// Workspace file metadata key holding the DocumentReference search URL.
pub const DOCUMENT_REFERENCE_METADATA_KEY: &str = "fhir_document_reference";

/// Default per-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

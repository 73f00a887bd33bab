//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup (from command-line
//! arguments) and then passed into the clients and the pipeline. The two API
//! base URLs are part of it rather than process-wide constants.

use crate::constants::{DEFAULT_FHIR_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::pipeline::FailurePolicy;
use crate::{CoreError, CoreResult};
use cavatica::RetryPolicy;
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    cavatica_api_url: String,
    cavatica_token: String,
    project_id: String,
    fhir_base_url: String,
    fhir_auth_cookie: String,
    request_timeout: Duration,
    failure_policy: FailurePolicy,
    retry_policy: RetryPolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig` with default endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if any credential or the project id
    /// is empty.
    pub fn new(
        cavatica_token: String,
        project_id: String,
        fhir_auth_cookie: String,
    ) -> CoreResult<Self> {
        require_non_empty("cavatica token", &cavatica_token)?;
        require_non_empty("cavatica project", &project_id)?;
        require_non_empty("FHIR authentication cookie", &fhir_auth_cookie)?;

        Ok(Self {
            cavatica_api_url: cavatica::DEFAULT_API_URL.to_string(),
            cavatica_token,
            project_id: project_id.trim().to_string(),
            fhir_base_url: DEFAULT_FHIR_BASE_URL.to_string(),
            fhir_auth_cookie,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            failure_policy: FailurePolicy::default(),
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Override the workspace API URL.
    pub fn with_cavatica_api_url(mut self, url: &str) -> CoreResult<Self> {
        validate_http_url("cavatica API URL", url)?;
        self.cavatica_api_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Override the FHIR base URL. It is normalised to end with `/`.
    pub fn with_fhir_base_url(mut self, url: &str) -> CoreResult<Self> {
        validate_http_url("FHIR base URL", url)?;
        self.fhir_base_url = normalise_base_url(url);
        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> CoreResult<Self> {
        if timeout.is_zero() {
            return Err(CoreError::InvalidInput(
                "request timeout must be greater than zero".into(),
            ));
        }
        self.request_timeout = timeout;
        Ok(self)
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> CoreResult<Self> {
        if max_attempts == 0 {
            return Err(CoreError::InvalidInput(
                "max attempts must be at least 1".into(),
            ));
        }
        self.retry_policy.max_attempts = max_attempts;
        Ok(self)
    }

    pub fn cavatica_api_url(&self) -> &str {
        &self.cavatica_api_url
    }

    pub fn cavatica_token(&self) -> &str {
        &self.cavatica_token
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn fhir_base_url(&self) -> &str {
        &self.fhir_base_url
    }

    pub fn fhir_auth_cookie(&self) -> &str {
        &self.fhir_auth_cookie
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

fn require_non_empty(name: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput(format!("{name} cannot be empty")));
    }
    Ok(())
}

fn validate_http_url(name: &str, value: &str) -> CoreResult<()> {
    let parsed = reqwest::Url::parse(value)
        .map_err(|e| CoreError::InvalidInput(format!("{name} '{value}' is not a URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CoreError::InvalidInput(format!(
            "{name} must use http or https, got '{other}'"
        ))),
    }
}

/// Ensure a base URL ends with exactly one `/` so relative references append cleanly.
pub(crate) fn normalise_base_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

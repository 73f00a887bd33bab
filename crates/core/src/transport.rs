//! HTTP transport for the FHIR service.
//!
//! Record lookups go through the [`HttpGet`] trait so the fetch logic can run
//! against an in-memory transport in tests. [`CookieClient`] is the real
//! implementation: a blocking reqwest client that sends the session cookie on
//! every request.

use crate::constants::FHIR_AUTH_COOKIE_NAME;
use crate::{CoreError, CoreResult};
use reqwest::header::{ACCEPT, COOKIE};
use std::time::Duration;

/// A plain GET returning the response body.
pub trait HttpGet {
    /// Fetch `url` and return the body text of a successful response.
    ///
    /// # Errors
    ///
    /// Connection failures and non-success statuses are errors.
    fn get_text(&self, url: &str) -> CoreResult<String>;
}

/// Blocking client authenticated with the FHIR load-balancer session cookie.
pub struct CookieClient {
    http: reqwest::blocking::Client,
    cookie: String,
}

impl CookieClient {
    /// Build a client sending `{FHIR_AUTH_COOKIE_NAME}={cookie_value}`.
    pub fn new(cookie_value: &str, timeout: Duration) -> CoreResult<Self> {
        if cookie_value.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "FHIR authentication cookie cannot be empty".into(),
            ));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CoreError::ClientBuild)?;

        Ok(Self {
            http,
            cookie: cookie_header(cookie_value),
        })
    }
}

impl HttpGet for CookieClient {
    fn get_text(&self, url: &str) -> CoreResult<String> {
        tracing::debug!("GET {}", url);

        let transport_err = |source: reqwest::Error| CoreError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url)
            .header(COOKIE, &self.cookie)
            .header(ACCEPT, "application/fhir+json, application/json")
            .send()
            .map_err(transport_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        response.text().map_err(transport_err)
    }
}

fn cookie_header(value: &str) -> String {
    format!("{FHIR_AUTH_COOKIE_NAME}={}", value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_uses_session_cookie_name() {
        assert_eq!(cookie_header(" abc123 "), "AWSELBAuthSessionCookie-0=abc123");
    }

    #[test]
    fn rejects_empty_cookie() {
        let err = CookieClient::new("", Duration::from_secs(1))
            .err()
            .expect("empty cookie");
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }
}

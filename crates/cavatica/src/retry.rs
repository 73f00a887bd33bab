//! Sleep-and-retry policy for workspace API responses.
//!
//! Two response kinds are transient:
//! - `429 Too Many Requests`: wait until the `X-RateLimit-Reset` epoch second.
//! - `503 Service Unavailable` whose JSON body has `"code": 0`: the platform is
//!   in maintenance; wait a fixed interval.
//!
//! Every other non-success status is final.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Header carrying the epoch second at which the rate-limit window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";

/// Retry configuration for the workspace client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first one.
    pub max_attempts: u32,

    /// Wait applied to maintenance responses.
    pub maintenance_wait: Duration,

    /// Lower bound for rate-limit waits; also used when the reset header is
    /// missing, unparseable, or already in the past.
    pub min_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            maintenance_wait: Duration::from_secs(300),
            min_rate_limit_wait: Duration::from_secs(1),
        }
    }
}

/// What to do with a non-success response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the duration, then send the request again.
    Retry(Duration),
    /// Surface the response as an error.
    Fail,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<i64>,
}

impl RetryPolicy {
    /// Classify a non-success response.
    ///
    /// `rate_limit_reset` is the raw `X-RateLimit-Reset` header value, `body` the
    /// response text, and `now` the current time.
    pub fn decide(
        &self,
        status: u16,
        rate_limit_reset: Option<&str>,
        body: &str,
        now: DateTime<Utc>,
    ) -> RetryDecision {
        match status {
            429 => RetryDecision::Retry(self.rate_limit_wait(rate_limit_reset, now)),
            503 if is_maintenance_body(body) => RetryDecision::Retry(self.maintenance_wait),
            _ => RetryDecision::Fail,
        }
    }

    fn rate_limit_wait(&self, reset: Option<&str>, now: DateTime<Utc>) -> Duration {
        let until_reset = reset
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|epoch| epoch - now.timestamp())
            .filter(|secs| *secs > 0)
            .map(|secs| Duration::from_secs(secs as u64));

        match until_reset {
            Some(wait) => wait.max(self.min_rate_limit_wait),
            None => self.min_rate_limit_wait,
        }
    }
}

fn is_maintenance_body(body: &str) -> bool {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.code)
        == Some(0)
}

//! Fetch collaborator: blocking HTTP with a four-way tagged outcome.
//!
//! The session loop never parses transport details; it pattern-matches
//! [`FetchOutcome`] exhaustively. Certificate validation failures are their
//! own variant because proceeding past one requires explicit user consent
//! (the fetch is then retried with verification disabled).

use std::time::Duration;
use tracing::{error, info, warn};

/// Result of fetching a reference. Exactly four variants; every consumer
/// matches all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server returned a non-error response; payload is the decoded body.
    Success(String),
    /// The server answered with an HTTP error status. Retryable after a
    /// user decision; the diagnostic body is shown alongside the status.
    SoftError {
        /// Numeric HTTP status code (>= 400).
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
        /// Decoded response body, for the diagnostic screen.
        body: String,
    },
    /// Transport-layer certificate validation failed. Requires an explicit
    /// user override to proceed.
    TrustFailure,
    /// The request could not be completed at all (bad reference, DNS,
    /// connect, timeout). Not retryable without user action.
    HardFailure(String),
}

/// Blocking HTTP fetcher. One instance per session; certificate
/// verification is decided per call so a trust override never outlives the
/// reference it was granted for.
#[derive(Debug, Clone)]
pub struct Fetcher {
    timeout: Duration,
    user_agent: String,
}

impl Fetcher {
    /// Create a fetcher with the session's timeout and User-Agent.
    pub fn new(timeout_secs: u64, user_agent: impl Into<String>) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            user_agent: user_agent.into(),
        }
    }

    /// Fetch `reference`, classifying the result. `verify` disables
    /// certificate validation when false (user-approved override only).
    pub fn fetch(&self, reference: &str, verify: bool) -> FetchOutcome {
        let url = match reqwest::Url::parse(reference) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            Ok(url) => {
                return FetchOutcome::HardFailure(format!(
                    "Unsupported scheme '{}'",
                    url.scheme()
                ));
            }
            Err(err) => {
                return FetchOutcome::HardFailure(format!("Invalid reference: {err}"));
            }
        };

        let client = match reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .danger_accept_invalid_certs(!verify)
            .build()
        {
            Ok(client) => client,
            Err(err) => return FetchOutcome::HardFailure(err.to_string()),
        };

        info!(%url, verify, "fetching");
        let response = match client.get(url).send() {
            Ok(response) => response,
            Err(err) => {
                return if is_trust_failure(&err) {
                    error!(%err, "certificate validation failed");
                    FetchOutcome::TrustFailure
                } else {
                    error!(%err, "request failed");
                    FetchOutcome::HardFailure(err.to_string())
                };
            }
        };

        let status = response.status();
        let body = match response.text() {
            Ok(body) => body,
            Err(err) => return FetchOutcome::HardFailure(format!("Decoding failed: {err}")),
        };

        if status.as_u16() >= 400 {
            warn!(status = status.as_u16(), "server returned an error status");
            FetchOutcome::SoftError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            }
        } else {
            info!(status = status.as_u16(), bytes = body.len(), "fetched");
            FetchOutcome::Success(body)
        }
    }
}

/// Walk the error source chain looking for certificate language. reqwest
/// folds TLS failures into its connect error, so string inspection is the
/// only portable classification across TLS backends.
fn is_trust_failure(err: &reqwest::Error) -> bool {
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(inner) = cause {
        let message = inner.to_string().to_ascii_lowercase();
        if message.contains("certificate") || message.contains("self-signed") {
            return true;
        }
        cause = inner.source();
    }
    false
}

/// Short human description for common HTTP error statuses, shown on the
/// soft-error diagnostic screen.
pub fn describe_status(status: u16) -> &'static str {
    match status {
        400 => "Bad Request - The server cannot process the request due to client error",
        401 => "Unauthorized - Authentication is required",
        403 => "Forbidden - You don't have permission to access this resource",
        404 => "Not Found - The requested resource could not be found",
        418 => "I'm a teapot - The requested entity body is short and stout",
        500 => "Internal Server Error - Something went wrong on the server",
        502 => "Bad Gateway - The server received an invalid response",
        503 => "Service Unavailable - The server is temporarily unable to handle the request",
        504 => "Gateway Timeout - The server timed out waiting for another server",
        _ => "Unknown Error",
    }
}

//! Error types for the relay.
//!
//! `UpstreamError` covers everything that can go wrong talking to a third-party
//! endpoint; `RelayError` is what a handler surfaces to the dashboard.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Failure of a single outbound fetch. Never retried.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Connection, TLS, timeout or other transport-level failure.
    #[error("upstream request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-2xx status.
    #[error("upstream {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body could not be read or decoded as the expected format.
    #[error("upstream {url} sent an undecodable body: {reason}")]
    Decode { url: String, reason: String },
}

/// Error returned by a relay operation.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The commodities page came back suspiciously short (captcha/block page).
    #[error("upstream looks rate limited: got only {lines} lines of markup")]
    RateLimited { lines: usize },

    /// The upstream payload decoded but did not have the expected shape.
    #[error("unexpected upstream payload: {0}")]
    Transform(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Errors from the provider API layer.
use std::fmt;

use thiserror::Error;

use super::session::Service;

/// Typed errors from the API client and session collaborators.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No endpoint is configured for the requested service.
    #[error("no {service} endpoint configured (set `{key}` in the config file or RACK_{env})")]
    NotConfigured {
        /// Service the client was requested for.
        service: Service,
        /// Settings key holding the endpoint.
        key: &'static str,
        /// Environment variable suffix for the same key.
        env: &'static str,
    },

    /// The configured endpoint is not a usable base URL.
    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Connection, TLS, timeout or body-read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{method} {url} returned {status}{}", body_suffix(body))]
    Status {
        /// HTTP method of the failed request.
        method: String,
        /// Full request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body, trimmed.
        body: String,
    },

    /// The response decoded, but not into the record shape the command expects.
    #[error("could not decode response into {expected}: {detail}")]
    UnexpectedShape {
        /// Record type the command expected.
        expected: &'static str,
        /// Decoder diagnostic.
        detail: String,
    },
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

impl ApiError {
    /// Build an [`ApiError::UnexpectedShape`] from any displayable decoder error.
    #[must_use]
    pub fn shape<D: fmt::Display + ?Sized>(expected: &'static str, detail: &D) -> Self {
        Self::UnexpectedShape {
            expected,
            detail: detail.to_string(),
        }
    }

    /// Machine-readable code for JSON error envelopes.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured { .. } | Self::InvalidEndpoint { .. } => "not_configured",
            Self::Transport(_) => "transport_error",
            Self::Status { status: 404, .. } => "not_found",
            Self::Status { .. } => "api_error",
            Self::UnexpectedShape { .. } => "unexpected_shape",
        }
    }
}

/// Top-level command errors.
use thiserror::Error;

use crate::api::ApiError;

/// Exit code for every failed command.
pub const EXIT_FAILURE: i32 = 1;

/// Errors that abort a command. Every variant is fatal for the invocation.
#[derive(Debug, Error)]
pub enum RackError {
    /// Wrong number of positional arguments, or a malformed flag value.
    #[error("{0}")]
    InvalidArgs(String),

    /// A required flag was not given.
    #[error("missing required flag --{flag}")]
    MissingFlag {
        /// Long name of the flag.
        flag: &'static str,
    },

    /// An API call failed; `action` reads like "listing servers".
    #[error("Error {action}: {source}")]
    Api {
        /// What the command was doing.
        action: &'static str,
        /// The underlying API failure.
        #[source]
        source: ApiError,
    },

    /// The configuration file or environment could not be loaded.
    #[error("Error loading configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// Writing output failed.
    #[error("Error writing output: {0}")]
    Io(#[from] std::io::Error),
}

impl RackError {
    /// Adapter for `map_err` that tags an [`ApiError`] with the failed action.
    #[must_use]
    pub fn api(action: &'static str) -> impl FnOnce(ApiError) -> Self {
        move |source| Self::Api { action, source }
    }

    /// Machine-readable code for JSON error envelopes.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgs(_) => "invalid_args",
            Self::MissingFlag { .. } => "missing_flag",
            Self::Api { source, .. } => source.code(),
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }

    /// Return the CLI exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_prefix() {
        let err = RackError::api("listing servers")(ApiError::Status {
            method: "GET".to_owned(),
            url: "http://x/servers/detail".to_owned(),
            status: 401,
            body: String::new(),
        });
        assert_eq!(
            err.to_string(),
            "Error listing servers: GET http://x/servers/detail returned 401"
        );
        assert_eq!(err.code(), "api_error");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_shape_error_code() {
        let err = RackError::api("listing servers")(ApiError::shape("servers", "missing field"));
        assert_eq!(err.code(), "unexpected_shape");
        assert!(err.to_string().contains("could not decode response into servers"));
    }
}

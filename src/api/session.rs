/// Service clients handed out to command handlers.
use std::fmt;
use std::time::Duration;

use tracing::debug;

use super::compute::ComputeApi;
use super::errors::ApiError;
use super::http::HttpClient;
use super::object_store::ObjectStoreApi;
use crate::settings::Settings;

/// Provider services a command can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Compute,
    ObjectStore,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compute => "compute",
            Self::ObjectStore => "object-store",
        })
    }
}

/// Hands out authenticated clients, one per service.
///
/// Handlers ask for a client only after their arguments validated, so a
/// rejected invocation never touches the network.
pub trait Session {
    /// Client for the compute service.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the service is not configured.
    fn compute(&self) -> Result<Box<dyn ComputeApi>, ApiError>;

    /// Client for the object-store service.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the service is not configured.
    fn object_store(&self) -> Result<Box<dyn ObjectStoreApi>, ApiError>;
}

/// [`Session`] over HTTP, using the endpoints and token from [`Settings`].
#[derive(Debug, Clone)]
pub struct HttpSession {
    settings: Settings,
}

impl HttpSession {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn client(&self, service: Service) -> Result<HttpClient, ApiError> {
        let (key, env) = match service {
            Service::Compute => ("compute_endpoint", "COMPUTE_ENDPOINT"),
            Service::ObjectStore => ("object_store_endpoint", "OBJECT_STORE_ENDPOINT"),
        };
        let endpoint = self
            .settings
            .endpoint(service)
            .ok_or(ApiError::NotConfigured { service, key, env })?;
        debug!(%service, %endpoint, region = %self.settings.region, "creating client");
        HttpClient::new(
            &endpoint,
            self.settings.auth_token.clone(),
            Duration::from_secs(self.settings.timeout_secs),
        )
    }
}

impl Session for HttpSession {
    fn compute(&self) -> Result<Box<dyn ComputeApi>, ApiError> {
        Ok(Box::new(self.client(Service::Compute)?))
    }

    fn object_store(&self) -> Result<Box<dyn ObjectStoreApi>, ApiError> {
        Ok(Box::new(self.client(Service::ObjectStore)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_service() {
        let session = HttpSession::new(Settings::default());
        let err = session.compute().err().unwrap();
        assert!(matches!(
            err,
            ApiError::NotConfigured {
                service: Service::Compute,
                ..
            }
        ));
        assert!(err.to_string().contains("compute_endpoint"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let settings = Settings {
            object_store_endpoint: Some("not a url".to_owned()),
            ..Settings::default()
        };
        let err = HttpSession::new(settings).object_store().err().unwrap();
        assert!(matches!(err, ApiError::InvalidEndpoint { .. }));
    }
}

/// Object-store service: containers, their metadata and objects.
use std::collections::BTreeMap;

use super::errors::ApiError;
use crate::types::{Container, ContainerInfo};

/// Filters for listing containers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerListOpts {
    pub limit: Option<u32>,
    pub marker: Option<String>,
    pub end_marker: Option<String>,
    pub prefix: Option<String>,
}

impl ContainerListOpts {
    /// Query-string pairs, always asking for a JSON listing.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("format", "json".to_owned())];
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        for (key, value) in [
            ("marker", &self.marker),
            ("end_marker", &self.end_marker),
            ("prefix", &self.prefix),
        ] {
            if let Some(value) = value {
                query.push((key, value.clone()));
            }
        }
        query
    }
}

/// Attributes written on container create or update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerOpts {
    pub read_acl: Option<String>,
    pub write_acl: Option<String>,
    /// Metadata keys to add or overwrite.
    pub metadata: BTreeMap<String, String>,
    /// Metadata keys to remove.
    pub remove_metadata: Vec<String>,
}

impl ContainerOpts {
    /// Request headers carrying these attributes.
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(read) = &self.read_acl {
            headers.push(("X-Container-Read".to_owned(), read.clone()));
        }
        if let Some(write) = &self.write_acl {
            headers.push(("X-Container-Write".to_owned(), write.clone()));
        }
        for (key, value) in &self.metadata {
            headers.push((format!("{META_PREFIX}{key}"), value.clone()));
        }
        for key in &self.remove_metadata {
            headers.push((format!("X-Remove-Container-Meta-{key}"), "x".to_owned()));
        }
        headers
    }
}

/// Header prefix of custom container metadata.
pub const META_PREFIX: &str = "X-Container-Meta-";

/// The object-store API collaborator.
///
/// Every method returns `ApiError` on transport failure or a non-success
/// status.
pub trait ObjectStoreApi {
    /// `GET /?format=json`.
    fn list_containers(&self, opts: &ContainerListOpts) -> Result<Vec<Container>, ApiError>;

    /// `PUT /<name>`.
    fn create_container(&self, name: &str, opts: &ContainerOpts) -> Result<(), ApiError>;

    /// `HEAD /<name>`.
    fn get_container(&self, name: &str) -> Result<ContainerInfo, ApiError>;

    /// `POST /<name>`.
    fn update_container(&self, name: &str, opts: &ContainerOpts) -> Result<(), ApiError>;

    /// `DELETE /<name>`; the container must be empty.
    fn delete_container(&self, name: &str) -> Result<(), ApiError>;

    /// Names of every object in the container.
    fn list_objects(&self, container: &str) -> Result<Vec<String>, ApiError>;

    /// `DELETE /<container>/<object>`.
    fn delete_object(&self, container: &str, object: &str) -> Result<(), ApiError>;
}

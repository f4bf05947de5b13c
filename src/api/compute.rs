/// Compute service: server listing and lookup.
use serde_json::Value;

use super::errors::ApiError;
use crate::types::Server;

/// Raw page bodies of a paginated list call, in request order.
pub type Pages = Vec<Value>;

/// Filters for listing servers. `Default` means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerListOpts {
    pub changes_since: Option<String>,
    pub image: Option<String>,
    pub flavor: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub marker: Option<String>,
    pub limit: Option<u32>,
}

impl ServerListOpts {
    /// Query-string pairs for the filters that are set.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let strings = [
            ("changes-since", &self.changes_since),
            ("image", &self.image),
            ("flavor", &self.flavor),
            ("name", &self.name),
            ("status", &self.status),
            ("marker", &self.marker),
        ];
        let mut query: Vec<(&'static str, String)> = strings
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
            .collect();
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

/// The compute API collaborator.
pub trait ComputeApi {
    /// Fetch every page of `GET /servers/detail` matching `opts`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    fn list_servers(&self, opts: &ServerListOpts) -> Result<Pages, ApiError>;

    /// Fetch the body of `GET /servers/<id>`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    fn get_server(&self, id: &str) -> Result<Value, ApiError>;
}

/// Decode the `servers` array of every page.
///
/// # Errors
///
/// Returns `ApiError::UnexpectedShape` if a page has no `servers` array or an
/// entry is not an object.
pub fn extract_servers(pages: &[Value]) -> Result<Vec<Server>, ApiError> {
    let mut servers = Vec::new();
    for page in pages {
        let entries = page
            .get("servers")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::shape("servers", "page has no `servers` array"))?;
        for entry in entries {
            servers.push(decode_server(entry.clone())?);
        }
    }
    Ok(servers)
}

/// Decode the `server` object of a single-server response.
///
/// # Errors
///
/// Returns `ApiError::UnexpectedShape` if the body has no `server` object.
pub fn extract_server(mut body: Value) -> Result<Server, ApiError> {
    match body.get_mut("server").map(Value::take) {
        Some(server) => decode_server(server),
        None => Err(ApiError::shape("server", "body has no `server` object")),
    }
}

fn decode_server(entry: Value) -> Result<Server, ApiError> {
    if !entry.is_object() {
        return Err(ApiError::shape("server", &format!("expected an object, got {entry}")));
    }
    serde_json::from_value(entry).map_err(|e| ApiError::shape("server", &e))
}

/// The `href` of the `next` link in a list page, if any.
#[must_use]
pub fn next_link(page: &Value) -> Option<&str> {
    page.get("servers_links")?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some("next"))?
        .get("href")?
        .as_str()
}

/// HTTP implementation of the compute and object-store collaborators.
///
/// Speaks the `OpenStack` compute v2 and Swift conventions against endpoints
/// taken from configuration. The token is sent as `X-Auth-Token`; obtaining
/// it is left to the provider's own tooling.
use std::collections::HashSet;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::compute::{ComputeApi, Pages, ServerListOpts, next_link};
use super::errors::ApiError;
use super::object_store::{ContainerListOpts, ContainerOpts, META_PREFIX, ObjectStoreApi};
use crate::types::{Container, ContainerInfo};

/// Blocking HTTP client bound to one service endpoint.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

#[derive(Deserialize)]
struct ObjectEntry {
    name: String,
}

impl HttpClient {
    /// Client for the service rooted at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidEndpoint` if `endpoint` is not an absolute
    /// base URL, or `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidEndpoint {
            url: endpoint.to_owned(),
            reason,
        };
        let base = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_owned()));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base, token })
    }

    /// Endpoint URL with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        match &self.token {
            Some(token) => request.header("X-Auth-Token", token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = request.build()?;
        let method = request.method().to_string();
        let url = request.url().to_string();
        debug!(%method, %url, "sending request");

        let response = self.http.execute(request)?;
        let status = response.status();
        trace!(%status, "received response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(ApiError::Status {
            method,
            url,
            status: status.as_u16(),
            body: body.trim().to_owned(),
        })
    }

    /// GET `url` and parse the body; an empty body (e.g. `204`) is `Null`.
    fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        let body = self.send(self.request(Method::GET, url))?.text()?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::shape("JSON", &e))
    }

    fn write(&self, method: Method, url: Url, opts: &ContainerOpts) -> Result<(), ApiError> {
        let request = opts
            .headers()
            .into_iter()
            .fold(self.request(method, url), |request, (name, value)| {
                request.header(name, value)
            });
        self.send(request)?;
        Ok(())
    }
}

fn with_query(mut url: Url, query: &[(&str, String)]) -> Url {
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    url
}

fn decode_list<T: for<'de> Deserialize<'de>>(
    body: Value,
    expected: &'static str,
) -> Result<Vec<T>, ApiError> {
    if body.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(body).map_err(|e| ApiError::shape(expected, &e))
}

impl ComputeApi for HttpClient {
    fn list_servers(&self, opts: &ServerListOpts) -> Result<Pages, ApiError> {
        let mut url = with_query(self.url(&["servers", "detail"]), &opts.query());
        let mut seen = HashSet::new();
        let mut pages = Vec::new();
        loop {
            seen.insert(url.to_string());
            let page = self.get_json(url)?;
            let next = next_link(&page)
                .map(Url::parse)
                .transpose()
                .map_err(|e| ApiError::shape("servers", &format!("bad next link: {e}")))?;
            pages.push(page);
            match next {
                Some(next) if !seen.contains(next.as_str()) => url = next,
                _ => break,
            }
        }
        debug!(pages = pages.len(), "fetched server pages");
        Ok(pages)
    }

    fn get_server(&self, id: &str) -> Result<Value, ApiError> {
        self.get_json(self.url(&["servers", id]))
    }
}

impl ObjectStoreApi for HttpClient {
    fn list_containers(&self, opts: &ContainerListOpts) -> Result<Vec<Container>, ApiError> {
        let body = self.get_json(with_query(self.url(&[]), &opts.query()))?;
        decode_list(body, "containers")
    }

    fn create_container(&self, name: &str, opts: &ContainerOpts) -> Result<(), ApiError> {
        self.write(Method::PUT, self.url(&[name]), opts)
    }

    fn get_container(&self, name: &str) -> Result<ContainerInfo, ApiError> {
        let response = self.send(self.request(Method::HEAD, self.url(&[name])))?;
        let headers = response.headers();
        let header = |key: &str| {
            headers
                .get(key)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let count = |key: &str| -> u64 { header(key).and_then(|v| v.parse().ok()).unwrap_or(0) };

        let meta_prefix = META_PREFIX.to_ascii_lowercase();
        let metadata = headers
            .iter()
            .filter_map(|(key, value)| {
                let key = key.as_str().strip_prefix(meta_prefix.as_str())?;
                Some((key.to_owned(), value.to_str().ok()?.to_owned()))
            })
            .collect();

        Ok(ContainerInfo {
            name: name.to_owned(),
            object_count: count("x-container-object-count"),
            bytes_used: count("x-container-bytes-used"),
            read_acl: header("x-container-read"),
            write_acl: header("x-container-write"),
            metadata,
        })
    }

    fn update_container(&self, name: &str, opts: &ContainerOpts) -> Result<(), ApiError> {
        self.write(Method::POST, self.url(&[name]), opts)
    }

    fn delete_container(&self, name: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, self.url(&[name])))?;
        Ok(())
    }

    fn list_objects(&self, container: &str) -> Result<Vec<String>, ApiError> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let mut query = vec![("format", "json".to_owned())];
            if let Some(marker) = &marker {
                query.push(("marker", marker.clone()));
            }
            let body = self.get_json(with_query(self.url(&[container]), &query))?;
            let batch: Vec<ObjectEntry> = decode_list(body, "objects")?;
            let Some(last) = batch.last() else { break };
            marker = Some(last.name.clone());
            names.extend(batch.into_iter().map(|o| o.name));
        }
        Ok(names)
    }

    fn delete_object(&self, container: &str, object: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, self.url(&[container, object])))?;
        Ok(())
    }
}

/// Records returned by the provider API, and the envelopes written to stdout.
///
/// Records are what gets written to stdout: serialized as-is in the JSON
/// modes, or flattened through their [`Tabular`] impl for tables.
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::RackError;
use crate::extract::{DisplayRow, Fields, Tabular};

/// A compute server, as listed by `GET /servers/detail`.
///
/// Nested references and the address map stay loosely typed so that a
/// surprising shape degrades to empty columns instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(rename = "accessIPv4", deserialize_with = "lenient_string")]
    pub access_ipv4: String,
    #[serde(rename = "accessIPv6", deserialize_with = "lenient_string")]
    pub access_ipv6: String,
    /// Addresses keyed by network name, e.g. `{"private": [{"addr": ..}]}`.
    pub addresses: Value,
    /// Image reference, usually `{"id": .., "links": [..]}`; `""` for volume-backed servers.
    pub image: Value,
    /// Flavor reference, usually `{"id": .., "links": [..]}`.
    pub flavor: Value,
    #[serde(deserialize_with = "lenient_string")]
    pub created: String,
    #[serde(deserialize_with = "lenient_string")]
    pub updated: String,
    /// Every other field the provider returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tabular for Server {
    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Name",
        "Status",
        "Public IPv4",
        "Private IPv4",
        "Image",
        "Flavor",
    ];

    fn display_row(&self) -> DisplayRow {
        let fields = Fields::of(self);
        [
            ("ID", fields.text("id")),
            ("Name", fields.text("name")),
            ("Status", fields.text("status")),
            ("Public IPv4", fields.text("accessIPv4")),
            (
                "Private IPv4",
                fields.first_nested("addresses", "private", "addr"),
            ),
            ("Image", fields.nested_id("image")),
            ("Flavor", fields.nested_id("flavor")),
        ]
        .into_iter()
        .collect()
    }
}

/// An object-store container, as listed by `GET /?format=json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Container {
    pub name: String,
    /// Number of objects.
    pub count: u64,
    /// Bytes used.
    pub bytes: u64,
}

impl Tabular for Container {
    const COLUMNS: &'static [&'static str] = &["Name", "Count", "Bytes"];

    fn display_row(&self) -> DisplayRow {
        let fields = Fields::of(self);
        [
            ("Name", fields.text("name")),
            ("Count", fields.text("count")),
            ("Bytes", fields.text("bytes")),
        ]
        .into_iter()
        .collect()
    }
}

/// Container details, read from the headers of `HEAD /<container>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub name: String,
    pub object_count: u64,
    pub bytes_used: u64,
    pub read_acl: Option<String>,
    pub write_acl: Option<String>,
    /// Custom metadata, keys without the `X-Container-Meta-` prefix.
    pub metadata: BTreeMap<String, String>,
}

impl ContainerInfo {
    /// Metadata as sorted key/value records.
    #[must_use]
    pub fn metadata_entries(&self) -> Vec<MetadataEntry> {
        self.metadata
            .iter()
            .map(|(key, value)| MetadataEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

impl Tabular for ContainerInfo {
    const COLUMNS: &'static [&'static str] = &[
        "Name",
        "Object Count",
        "Bytes Used",
        "Read ACL",
        "Write ACL",
        "Metadata",
    ];

    fn display_row(&self) -> DisplayRow {
        let fields = Fields::of(self);
        let metadata = self
            .metadata
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");
        [
            ("Name", fields.text("name")),
            ("Object Count", fields.text("object_count")),
            ("Bytes Used", fields.text("bytes_used")),
            ("Read ACL", fields.text("read_acl")),
            ("Write ACL", fields.text("write_acl")),
            ("Metadata", metadata),
        ]
        .into_iter()
        .collect()
    }
}

/// One metadata key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

impl Tabular for MetadataEntry {
    const COLUMNS: &'static [&'static str] = &["Key", "Value"];

    fn display_row(&self) -> DisplayRow {
        [("Key", self.key.clone()), ("Value", self.value.clone())]
            .into_iter()
            .collect()
    }
}

/// Result message of a mutating command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOutput {
    /// Always `true`.
    pub ok: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// A structured error envelope for JSON error output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    /// Always `false`.
    pub ok: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail in the JSON error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (`snake_case`).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorOutput {
    /// Construct from a `RackError`.
    #[must_use]
    pub fn from_rack_error(err: &RackError) -> Self {
        Self {
            ok: false,
            error: ErrorDetail {
                code: err.code().to_owned(),
                message: err.to_string(),
            },
        }
    }
}

/// Accept strings, numbers, booleans and null where a display string is expected.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

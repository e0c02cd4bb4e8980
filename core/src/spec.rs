#![deny(missing_docs)]

//! # Spec Document
//!
//! Raw, immutable representation of a service API model (`api-2.json`) and its
//! optional documentation companion (`docs-2.json`).
//!
//! These structs map directly onto the JSON layout. No cross-referencing or
//! classification happens here; see [`crate::graph`] for that.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Wire protocol of a service API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Action-parameter style (`POST /` with `Action=...`).
    Query,
    /// URI-routed JSON.
    RestJson,
    /// URI-routed XML.
    RestXml,
    /// JSON-RPC style with a target header.
    Json,
    /// EC2 flavour of the query protocol.
    Ec2,
    /// Anything else, kept verbatim.
    Other(String),
}

impl Protocol {
    /// Returns the canonical protocol tag.
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::Query => "query",
            Protocol::RestJson => "rest-json",
            Protocol::RestXml => "rest-xml",
            Protocol::Json => "json",
            Protocol::Ec2 => "ec2",
            Protocol::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for Protocol {
    fn from(value: &str) -> Self {
        match value {
            "query" => Protocol::Query,
            "rest-json" => Protocol::RestJson,
            "rest-xml" => Protocol::RestXml,
            "json" => Protocol::Json,
            "ec2" => Protocol::Ec2,
            other => Protocol::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Protocol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Protocol::from(raw.as_str()))
    }
}

/// The closed set of recognised shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// UTF-8 text.
    String,
    /// Single character, rendered as text.
    Character,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// true/false.
    Boolean,
    /// Base64 encoded binary.
    Blob,
    /// Point in time.
    Timestamp,
    /// Homogeneous sequence.
    List,
    /// String-keyed dictionary.
    Map,
    /// Named members; also used for exceptions.
    Structure,
}

impl ShapeKind {
    /// Parses a raw `type` value. Returns `None` for anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        let kind = match raw {
            "string" => ShapeKind::String,
            "character" => ShapeKind::Character,
            "integer" => ShapeKind::Integer,
            "long" => ShapeKind::Long,
            "float" => ShapeKind::Float,
            "double" => ShapeKind::Double,
            "boolean" => ShapeKind::Boolean,
            "blob" => ShapeKind::Blob,
            "timestamp" => ShapeKind::Timestamp,
            "list" => ShapeKind::List,
            "map" => ShapeKind::Map,
            "structure" => ShapeKind::Structure,
            _ => return None,
        };
        Some(kind)
    }
}

/// Wire location of a structure member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A single HTTP header.
    Header,
    /// A prefixed header map.
    Headers,
    /// A URI path label.
    Uri,
    /// A query string parameter.
    QueryString,
    /// The HTTP status code.
    StatusCode,
    /// Anything else; treated as part of the body.
    Other(String),
}

impl Location {
    /// True when the member travels outside the body representation.
    pub fn is_header_or_uri(&self) -> bool {
        matches!(self, Location::Header | Location::Headers | Location::Uri)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "header" => Location::Header,
            "headers" => Location::Headers,
            "uri" => Location::Uri,
            "querystring" => Location::QueryString,
            "statusCode" => Location::StatusCode,
            _ => Location::Other(raw),
        })
    }
}

/// Reference to a named shape, optionally tagged with its wire location.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShapeRef {
    /// Target shape name.
    pub shape: String,
    /// Wire location (members only).
    #[serde(default)]
    pub location: Option<Location>,
    /// Wire name override, when the member is renamed on the wire.
    #[serde(default, rename = "locationName")]
    pub location_name: Option<String>,
}

/// `metadata` block of the model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// API version, e.g. `2012-11-05`.
    pub api_version: String,
    /// Human readable service name.
    #[serde(default)]
    pub service_full_name: String,
    /// Wire protocol.
    pub protocol: Protocol,
}

/// HTTP binding of an operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSpec {
    /// HTTP method, e.g. `POST`.
    pub method: String,
    /// Request URI template, e.g. `/clusters/{name}`.
    #[serde(default = "default_request_uri")]
    pub request_uri: String,
    /// Success status code; 200 when absent.
    #[serde(default)]
    pub response_code: Option<u16>,
}

fn default_request_uri() -> String {
    "/".to_string()
}

/// Raw operation entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationSpec {
    /// HTTP binding.
    pub http: HttpSpec,
    /// Input payload shape.
    #[serde(default)]
    pub input: Option<ShapeRef>,
    /// Output payload shape.
    #[serde(default)]
    pub output: Option<ShapeRef>,
    /// Error shapes, in declaration order.
    #[serde(default)]
    pub errors: Vec<ShapeRef>,
    /// Whether the operation is deprecated.
    #[serde(default)]
    pub deprecated: bool,
}

/// Error traits attached to an exception shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorTraits {
    /// Error code on the wire.
    #[serde(default)]
    pub code: Option<String>,
    /// HTTP status code returned with this error.
    #[serde(default)]
    pub http_status_code: Option<u16>,
    /// Whether the caller is at fault.
    #[serde(default)]
    pub sender_fault: bool,
}

/// Raw shape entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShapeSpec {
    /// Raw kind. Mapped to [`ShapeKind`] on demand.
    #[serde(rename = "type")]
    pub kind: String,
    /// Only meaningful for structures.
    #[serde(default)]
    pub exception: bool,
    /// Required member names (structures).
    #[serde(default)]
    pub required: Vec<String>,
    /// Member name to shape reference (structures).
    #[serde(default)]
    pub members: IndexMap<String, ShapeRef>,
    /// Element reference (lists).
    #[serde(default)]
    pub member: Option<ShapeRef>,
    /// Key reference (maps).
    #[serde(default)]
    pub key: Option<ShapeRef>,
    /// Value reference (maps).
    #[serde(default)]
    pub value: Option<ShapeRef>,
    /// Minimum length / value / item count, depending on kind.
    ///
    /// Kept as the literal JSON number so 64-bit bounds survive intact.
    #[serde(default)]
    pub min: Option<serde_json::Number>,
    /// Maximum length / value / item count, depending on kind.
    #[serde(default)]
    pub max: Option<serde_json::Number>,
    /// Regular expression for strings.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Allowed literal values for strings.
    #[serde(default, rename = "enum")]
    pub enum_values: Vec<serde_json::Value>,
    /// Error traits (exceptions).
    #[serde(default)]
    pub error: Option<ErrorTraits>,
}

impl ShapeSpec {
    /// Parses the raw kind. `None` when it is not one of the recognised kinds.
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        ShapeKind::parse(&self.kind)
    }

    /// True for `structure` shapes.
    pub fn is_structure(&self) -> bool {
        self.kind == "structure"
    }

    /// True for `list` shapes.
    pub fn is_list(&self) -> bool {
        self.kind == "list"
    }

    /// True for `map` shapes.
    pub fn is_map(&self) -> bool {
        self.kind == "map"
    }
}

/// The parsed `api-2.json` document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiSpec {
    /// Service metadata.
    pub metadata: Metadata,
    /// Operations keyed by name.
    pub operations: IndexMap<String, OperationSpec>,
    /// Shapes keyed by name.
    pub shapes: IndexMap<String, ShapeSpec>,
}

impl ApiSpec {
    /// Looks up a shape, reporting a dangling reference from `referrer` on a miss.
    pub fn shape(&self, referrer: &str, name: &str) -> AppResult<&ShapeSpec> {
        self.shapes
            .get(name)
            .ok_or_else(|| AppError::dangling(referrer, name))
    }
}

/// The parsed `docs-2.json` companion document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocSpec {
    /// Service level documentation.
    #[serde(default)]
    pub service: Option<String>,
    /// Operation name to documentation text.
    #[serde(default)]
    pub operations: HashMap<String, String>,
}

impl DocSpec {
    /// Documentation for an operation, if any.
    pub fn operation(&self, name: &str) -> Option<&str> {
        self.operations.get(name).map(String::as_str)
    }
}

const REQUIRED_TOP_LEVEL: [&str; 3] = ["metadata", "operations", "shapes"];

/// Parses an API model from JSON text.
///
/// A missing `metadata`, `operations` or `shapes` key is reported as
/// [`AppError::MissingField`] rather than a generic decode failure.
pub fn parse_api_spec(json: &str) -> AppResult<ApiSpec> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    let obj = raw
        .as_object()
        .ok_or_else(|| AppError::MissingField("metadata".into()))?;
    for field in REQUIRED_TOP_LEVEL {
        if !obj.contains_key(field) {
            return Err(AppError::MissingField(field.to_string()));
        }
    }
    Ok(serde_json::from_value(raw)?)
}

/// Parses a documentation document from JSON text.
pub fn parse_doc_spec(json: &str) -> AppResult<DocSpec> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses an API model file.
pub fn load_api_spec(path: &Path) -> AppResult<ApiSpec> {
    let content = std::fs::read_to_string(path)?;
    parse_api_spec(&content)
}

/// Reads and parses a documentation file. A missing file yields `Ok(None)`.
pub fn load_doc_spec(path: &Path) -> AppResult<Option<DocSpec>> {
    if !path.exists() {
        tracing::debug!(?path, "no documentation file");
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    parse_doc_spec(&content).map(Some)
}

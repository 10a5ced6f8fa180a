//! Defines models for requests sent to actinia.

use crate::errors::ClientError;
use crate::process_chain::{ProcessChainBody, ProcessChainItem};
use crate::types::TemporalType;
use camino::Utf8PathBuf;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use time::macros::format_description;
use time::PrimitiveDateTime;

/// Body of a location creation request: a `g.proj` call in a process chain.
pub(crate) fn create_location(epsg: &str) -> ProcessChainBody {
    let item = ProcessChainItem::new("1", "g.proj", [("epsg", epsg)]).flags("t");
    ProcessChainBody::new(vec![item])
}

#[derive(Serialize)]
pub(crate) struct CreateStrds<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub temporal_type: TemporalType,
}

#[derive(Serialize)]
pub(crate) struct RegisterRasterLayer<'a> {
    pub name: &'a str,
    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// A point in time given either as text, which is sent verbatim, or as a date-time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeArg {
    Text(String),
    DateTime(PrimitiveDateTime),
}

impl TimeArg {
    /// Render as `YYYY-mm-dd HH:MM:SS`.
    pub(crate) fn render(&self) -> Result<String, ClientError> {
        match self {
            Self::Text(s) => Ok(s.clone()),
            Self::DateTime(dt) => dt
                .format(format_description!(
                    "[year]-[month]-[day] [hour]:[minute]:[second]"
                ))
                .map_err(|e| ClientError::Validation(e.to_string())),
        }
    }
}

impl From<&str> for TimeArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TimeArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<PrimitiveDateTime> for TimeArg {
    fn from(value: PrimitiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

/// Timestamp path segment of STRDS statistics requests.
pub(crate) fn timestamp_segment(timestamp: &PrimitiveDateTime) -> Result<String, ClientError> {
    timestamp
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
        .map_err(|e| ClientError::Validation(e.to_string()))
}

/// Locations at which to sample a space-time raster dataset, or the area
/// over which to compute its statistics.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryInput {
    /// Rows of `[id, x, y]`.
    Points(Vec<Vec<String>>),
    /// A GeoJSON document.
    GeoJson(Value),
    /// Path to a local GeoJSON file.
    File(Utf8PathBuf),
}

impl GeometryInput {
    /// Whether the request goes to a `*_geojson` endpoint.
    pub(crate) fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Body of a sampling request.
    pub(crate) async fn sampling_body(self) -> Result<String, ClientError> {
        match self {
            Self::Points(points) => Ok(json!({ "points": points }).to_string()),
            other => other.statistics_body().await,
        }
    }

    /// Body of a statistics request.
    pub(crate) async fn statistics_body(self) -> Result<String, ClientError> {
        match self {
            Self::Points(points) => Ok(json!(points).to_string()),
            Self::GeoJson(value) => Ok(value.to_string()),
            Self::File(path) => Ok(fs_err::tokio::read_to_string(path).await?),
        }
    }
}

impl From<Vec<Vec<String>>> for GeometryInput {
    fn from(value: Vec<Vec<String>>) -> Self {
        Self::Points(value)
    }
}

impl From<Value> for GeometryInput {
    fn from(value: Value) -> Self {
        Self::GeoJson(value)
    }
}

impl From<Utf8PathBuf> for GeometryInput {
    fn from(value: Utf8PathBuf) -> Self {
        Self::File(value)
    }
}

const RENDER_KEYS: [&str; 8] = [
    "n",
    "s",
    "e",
    "w",
    "width",
    "height",
    "start_time",
    "end_time",
];

/// Parameters of a STRDS render request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    pub n: f64,
    pub s: f64,
    pub e: f64,
    pub w: f64,
    pub width: u32,
    pub height: u32,
    pub start_time: String,
    pub end_time: String,
}

impl TryFrom<&Value> for RenderParams {
    type Error = ClientError;

    /// The object must have exactly the keys `n, s, e, w, width, height, start_time, end_time`.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let expected: BTreeSet<&str> = RENDER_KEYS.into_iter().collect();
        let keys: Option<BTreeSet<&str>> = value
            .as_object()
            .map(|o| o.keys().map(|k| k.as_str()).collect());
        if keys.as_ref() != Some(&expected) {
            return Err(ClientError::Validation(format!(
                "render parameters must contain exactly the keys {}",
                RENDER_KEYS.iter().map(|k| format!("'{}'", k)).join(", ")
            )));
        }
        serde_json::from_value(value.clone())
            .map_err(|e| ClientError::Validation(format!("invalid render parameters: {}", e)))
    }
}

//! Definitions of structs describing response data from the actinia API.

use crate::types::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The common frame of actinia responses, of which only the results are of interest.
#[derive(Deserialize)]
pub(crate) struct ProcessResponse<T> {
    pub process_results: T,
}

/// Response of `GET locations`. Newer servers call locations "projects".
#[derive(Deserialize)]
pub(crate) struct LocationsResponse {
    pub locations: Option<Vec<String>>,
    pub projects: Option<Vec<String>>,
}

impl LocationsResponse {
    pub fn into_names(self) -> Vec<String> {
        self.locations.or(self.projects).unwrap_or_default()
    }
}

/// Links of a job.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobUrls {
    pub status: StatusUrl,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Progress {
    pub num_of_steps: u32,
    pub step: u32,
}

/// State of a job as reported by the server.
///
/// Every poll replaces the whole state with the one in the response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobState {
    pub resource_id: ResourceId,
    pub status: JobStatus,
    pub message: String,
    pub urls: JobUrls,
    /// Missing until the job produced results, in which case it is `{}`.
    #[serde(default = "empty_object")]
    pub process_results: Value,
    pub user_id: Option<UserId>,
    pub accept_datetime: Option<String>,
    pub accept_timestamp: Option<f64>,
    pub datetime: Option<String>,
    pub timestamp: Option<f64>,
    pub time_delta: Option<f64>,
    pub http_code: Option<u16>,
    pub api_info: Option<Value>,
    pub process_log: Option<Value>,
    pub process_chain_list: Option<Value>,
    pub progress: Option<Progress>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Computational region of a location, mapset or layer.
///
/// Layers only know part of it, hence everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Region {
    pub zone: Option<i64>,
    pub projection: Option<i64>,
    pub n: Option<f64>,
    pub s: Option<f64>,
    pub e: Option<f64>,
    pub w: Option<f64>,
    pub t: Option<f64>,
    pub b: Option<f64>,
    pub nsres: Option<f64>,
    pub ewres: Option<f64>,
    pub nsres3: Option<f64>,
    pub ewres3: Option<f64>,
    pub tbres: Option<f64>,
    pub rows: Option<i64>,
    pub cols: Option<i64>,
    pub rows3: Option<i64>,
    pub cols3: Option<i64>,
    pub depths: Option<i64>,
    pub cells: Option<i64>,
    pub cells3: Option<i64>,
}

/// `process_results` of location and mapset info requests.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProjectionInfo {
    pub projection: String,
    pub region: Region,
}

/// Free-form layer or dataset metadata, as GRASS reports it.
pub type InfoMap = Map<String, Value>;

/// GRASS reports numbers as strings about as often as it reports them as numbers.
pub(crate) fn lenient_f64(info: &InfoMap, key: &str) -> Option<f64> {
    match info.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integers in floating point notation are accepted only if they are whole and in range.
pub(crate) fn lenient_i64(info: &InfoMap, key: &str) -> Option<i64> {
    match info.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| s.parse().ok().and_then(whole_i64))
        }
        _ => None,
    }
}

fn whole_i64(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

/// Result of a synchronous process chain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(String),
    Invalid(String),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

#[derive(Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

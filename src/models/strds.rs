//! Space-time raster datasets.

use crate::client::routes;
use crate::client::session::{Payload, Session, OK};
use crate::constants::EMPTY_DATASET_MARKER;
use crate::errors::{ActiniaError, ClientError};
use crate::models::data::{InfoMap, ProcessResponse};
use crate::requests::{RegisterRasterLayer, RenderParams, TimeArg};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;

const LAYERS_ACCEPTED: &[StatusCode] = &[StatusCode::OK, StatusCode::BAD_REQUEST];

/// Raster layers registered in a space-time raster dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum StrdsRasterLayers {
    /// The dataset exists but no raster layer is registered in it.
    Empty,
    /// Registered layers, as reported by the server.
    Populated(Vec<Value>),
}

impl StrdsRasterLayers {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Populated(layers) => layers.is_empty(),
        }
    }

    pub fn layers(&self) -> &[Value] {
        match self {
            Self::Empty => &[],
            Self::Populated(layers) => layers,
        }
    }
}

/// Whether an error response to a raster layer listing means "no layers registered".
///
/// An explicit `process_results.empty` flag wins. Otherwise the response is
/// recognised by [EMPTY_DATASET_MARKER] in its message or in the stderr of its process log.
pub fn is_empty_dataset(body: &Value) -> bool {
    if let Some(flag) = body
        .get("process_results")
        .and_then(|r| r.get("empty"))
        .and_then(Value::as_bool)
    {
        return flag;
    }
    let in_message = body
        .get("message")
        .and_then(Value::as_str)
        .map(|m| m.contains(EMPTY_DATASET_MARKER))
        .unwrap_or(false);
    let in_stderr = || {
        body.get("process_log")
            .and_then(Value::as_array)
            .map(|entries| {
                entries.iter().any(|entry| {
                    entry
                        .get("stderr")
                        .and_then(Value::as_array)
                        .map(|lines| {
                            lines
                                .iter()
                                .filter_map(Value::as_str)
                                .any(|line| line.contains(EMPTY_DATASET_MARKER))
                        })
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false)
    };
    in_message || in_stderr()
}

/// A space-time raster dataset (STRDS) in a mapset.
#[derive(Debug)]
pub struct SpaceTimeRasterDataset {
    session: Arc<Session>,
    location: String,
    mapset: String,
    name: String,
    info: Option<InfoMap>,
    raster_layers: Option<StrdsRasterLayers>,
    /// Result of the last query with a `where` clause.
    filtered_layers: Option<StrdsRasterLayers>,
}

impl SpaceTimeRasterDataset {
    pub(crate) fn new(session: Arc<Session>, location: &str, mapset: &str, name: &str) -> Self {
        Self {
            session,
            location: location.to_string(),
            mapset: mapset.to_string(),
            name: name.to_string(),
            info: None,
            raster_layers: None,
            filtered_layers: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn url(&self, sub: Option<&str>) -> String {
        let route = routes::strds(&self.location, &self.mapset, &self.name);
        match sub {
            Some(sub) => self.session.endpoint(&format!("{}/{}", route, sub)),
            None => self.session.endpoint(&route),
        }
    }

    /// Cached metadata of the dataset.
    pub async fn get_info(&mut self, force: bool) -> Result<&InfoMap, ActiniaError> {
        if force || self.info.is_none() {
            let res: ProcessResponse<InfoMap> = self.session.get(&self.url(None)).await?;
            self.info = Some(res.process_results);
        }
        Ok(self.info.get_or_insert_with(InfoMap::new))
    }

    async fn request_raster_layers(
        &self,
        r#where: Option<&str>,
    ) -> Result<StrdsRasterLayers, ActiniaError> {
        let url = self.url(Some("raster_layers"));
        let query = r#where.map(|w| [("where", w)]);
        let (status, body): (StatusCode, Value) = self
            .session
            .request_with_status(
                Method::GET,
                &url,
                query.as_ref().map(|q| q.as_slice()),
                LAYERS_ACCEPTED,
                Payload::Empty,
            )
            .await?;
        if status == StatusCode::OK {
            let res: ProcessResponse<Vec<Value>> = serde_json::from_value(body)
                .map_err(|source| ActiniaError::Decode { url, source })?;
            return Ok(if res.process_results.is_empty() {
                StrdsRasterLayers::Empty
            } else {
                StrdsRasterLayers::Populated(res.process_results)
            });
        }
        if is_empty_dataset(&body) {
            return Ok(StrdsRasterLayers::Empty);
        }
        Err(ActiniaError::Request {
            status,
            reason: status.canonical_reason().unwrap_or("unknown reason"),
            text: body.to_string(),
        })
    }

    /// Raster layers registered in this dataset.
    ///
    /// The full listing is cached. A `where` clause (without the `WHERE`
    /// keyword) always causes a new request, and its result is kept apart
    /// from the cached listing.
    pub async fn get_raster_layers(
        &mut self,
        r#where: Option<&str>,
        force: bool,
    ) -> Result<&StrdsRasterLayers, ActiniaError> {
        if r#where.is_some() {
            let layers = self.request_raster_layers(r#where).await?;
            return Ok(self.filtered_layers.insert(layers));
        }
        if force || self.raster_layers.is_none() {
            self.raster_layers = Some(self.request_raster_layers(None).await?);
        }
        Ok(self.raster_layers.get_or_insert(StrdsRasterLayers::Empty))
    }

    /// Register a raster layer with its validity period.
    pub async fn register_raster_layer(
        &self,
        name: &str,
        start_time: impl Into<TimeArg>,
        end_time: Option<TimeArg>,
    ) -> Result<(), ClientError> {
        let body = RegisterRasterLayer {
            name,
            start_time: start_time.into().render()?,
            end_time: end_time.map(|t| t.render()).transpose()?,
        };
        let _: Value = self
            .session
            .request_and_check(
                Method::PUT,
                &self.url(Some("raster_layers")),
                OK,
                Payload::json(&body)?,
            )
            .await?;
        Ok(())
    }

    pub async fn unregister_raster_layers(&self, names: &[&str]) -> Result<(), ClientError> {
        let _: Value = self
            .session
            .request_and_check(
                Method::DELETE,
                &self.url(Some("raster_layers")),
                OK,
                Payload::json(names)?,
            )
            .await?;
        Ok(())
    }

    /// Render the dataset. `params` must be an object with exactly the keys
    /// of [RenderParams], which is checked before any request is made.
    pub async fn render(&self, params: &Value) -> Result<Value, ClientError> {
        let params = RenderParams::try_from(params)?;
        self.render_params(&params).await
    }

    pub async fn render_params(&self, params: &RenderParams) -> Result<Value, ClientError> {
        let res = self
            .session
            .request_and_check(
                Method::GET,
                &self.url(Some("render")),
                OK,
                Payload::json(params)?,
            )
            .await?;
        Ok(res)
    }
}

use crate::client::routes;
use crate::client::session::{Payload, Session, OK};
use crate::constants::DEFAULT_JOB_NAME;
use crate::errors::{ActiniaError, ClientError};
use crate::models::data::{ProcessResponse, ProjectionInfo};
use crate::models::job::{start_job, start_registered_job};
use crate::models::layer::{Layer, LayerKind, Raster, RasterKind, Vector, VectorKind};
use crate::models::strds::SpaceTimeRasterDataset;
use crate::models::{Job, JobRegistry};
use crate::process_chain::ProcessChain;
use crate::requests::{timestamp_segment, CreateStrds, GeometryInput};
use crate::types::{JobStatus, MapsetTask, TemporalType};
use camino::Utf8Path;
use fs_err::tokio::File;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use time::PrimitiveDateTime;
use tokio_util::codec::{BytesCodec, FramedRead};

/// Lazily listed layers of one kind.
#[derive(Debug)]
struct LayerSet<K: LayerKind> {
    layers: Option<BTreeMap<String, Layer<K>>>,
}

impl<K: LayerKind> Default for LayerSet<K> {
    fn default() -> Self {
        Self { layers: None }
    }
}

impl<K: LayerKind> LayerSet<K> {
    async fn list(
        &mut self,
        session: &Arc<Session>,
        location: &str,
        mapset: &str,
        force: bool,
    ) -> Result<&mut BTreeMap<String, Layer<K>>, ActiniaError> {
        if force || self.layers.is_none() {
            let url = session.endpoint(&routes::mapset(location, mapset, Some(K::TASK)));
            let res: ProcessResponse<Vec<String>> = session.get(&url).await?;
            let layers = res
                .process_results
                .into_iter()
                .map(|name| {
                    let layer = Layer::new(Arc::clone(session), location, mapset, &name);
                    (name, layer)
                })
                .collect();
            self.layers = Some(layers);
        }
        Ok(self.layers.get_or_insert_with(BTreeMap::new))
    }

    async fn upload(
        &mut self,
        session: &Arc<Session>,
        location: &str,
        mapset: &str,
        name: &str,
        file: &Utf8Path,
    ) -> Result<(), ClientError> {
        let filename = file.file_name().unwrap_or(name).to_string();
        let content_length = fs_err::tokio::metadata(file).await?.len();
        let stream = FramedRead::new(File::open(file).await?, BytesCodec::new());
        // https://github.com/seanmonstar/reqwest/issues/646#issuecomment-616985015
        let part = Part::stream_with_length(Body::wrap_stream(stream), content_length)
            .file_name(filename);
        let form = Form::new().part("file", part);

        let url = session.endpoint(&routes::mapset_child(location, mapset, K::TASK, name));
        let job_name = format!("{}_upload_{}_{}_{}", K::LABEL, location, mapset, name);
        let job = start_job(session, &url, Payload::Form(form), job_name).await?;
        job.wait().await?;
        let status = job.status();
        if status != JobStatus::Finished {
            return Err(ClientError::JobFailed {
                status,
                message: job.message(),
            });
        }
        let layers = self.list(session, location, mapset, false).await?;
        layers.insert(
            name.to_string(),
            Layer::new(Arc::clone(session), location, mapset, name),
        );
        Ok(())
    }

    async fn delete(
        &mut self,
        session: &Arc<Session>,
        location: &str,
        mapset: &str,
        name: &str,
    ) -> Result<(), ClientError> {
        let url = session.endpoint(&routes::mapset_child(location, mapset, K::TASK, name));
        let _: Value = session
            .request_and_check(Method::DELETE, &url, OK, Payload::Empty)
            .await?;
        match self.layers.as_mut() {
            Some(layers) => {
                layers.remove(name);
            }
            None => {
                self.list(session, location, mapset, false).await?;
            }
        }
        log::info!("{} <{}> successfully deleted", K::LABEL, name);
        Ok(())
    }
}

/// A mapset: a directory of layers and datasets inside a location.
#[derive(Debug)]
pub struct Mapset {
    session: Arc<Session>,
    jobs: JobRegistry,
    location: String,
    name: String,
    info: Option<ProjectionInfo>,
    raster_layers: LayerSet<RasterKind>,
    vector_layers: LayerSet<VectorKind>,
    strds: Option<BTreeMap<String, SpaceTimeRasterDataset>>,
}

impl Mapset {
    pub(crate) fn new(session: Arc<Session>, jobs: JobRegistry, location: &str, name: &str) -> Self {
        Self {
            session,
            jobs,
            location: location.to_string(),
            name: name.to_string(),
            info: None,
            raster_layers: Default::default(),
            vector_layers: Default::default(),
            strds: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location_name(&self) -> &str {
        &self.location
    }

    fn url(&self, task: Option<MapsetTask>) -> String {
        self.session
            .endpoint(&routes::mapset(&self.location, &self.name, task))
    }

    fn strds_url(&self, strds: &str, sub: &str) -> String {
        let route = routes::strds(&self.location, &self.name, strds);
        self.session.endpoint(&format!("{}/{}", route, sub))
    }

    /// Projection and region of the mapset.
    pub async fn info(&mut self, force: bool) -> Result<&ProjectionInfo, ActiniaError> {
        if force || self.info.is_none() {
            let res: ProcessResponse<ProjectionInfo> =
                self.session.get(&self.url(Some(MapsetTask::Info))).await?;
            self.info = Some(res.process_results);
        }
        Ok(self.info.get_or_insert_with(Default::default))
    }

    // ==================================================
    //                 RASTER LAYERS
    // ==================================================

    pub async fn get_raster_layers(
        &mut self,
        force: bool,
    ) -> Result<&mut BTreeMap<String, Raster>, ActiniaError> {
        self.raster_layers
            .list(&self.session, &self.location, &self.name, force)
            .await
    }

    /// Upload a GeoTIFF as raster layer `name` and wait for the import job to finish.
    pub async fn upload_raster(&mut self, name: &str, file: &Utf8Path) -> Result<(), ClientError> {
        self.raster_layers
            .upload(&self.session, &self.location, &self.name, name, file)
            .await
    }

    pub async fn delete_raster(&mut self, name: &str) -> Result<(), ClientError> {
        self.raster_layers
            .delete(&self.session, &self.location, &self.name, name)
            .await
    }

    // ==================================================
    //                 VECTOR LAYERS
    // ==================================================

    pub async fn get_vector_layers(
        &mut self,
        force: bool,
    ) -> Result<&mut BTreeMap<String, Vector>, ActiniaError> {
        self.vector_layers
            .list(&self.session, &self.location, &self.name, force)
            .await
    }

    /// Upload a vector file (GeoJSON, GeoPackage, zipped shapefile) as vector
    /// layer `name` and wait for the import job to finish.
    pub async fn upload_vector(&mut self, name: &str, file: &Utf8Path) -> Result<(), ClientError> {
        self.vector_layers
            .upload(&self.session, &self.location, &self.name, name, file)
            .await
    }

    pub async fn delete_vector(&mut self, name: &str) -> Result<(), ClientError> {
        self.vector_layers
            .delete(&self.session, &self.location, &self.name, name)
            .await
    }

    // ==================================================
    //            SPACE-TIME RASTER DATASETS
    // ==================================================

    pub async fn get_strds(
        &mut self,
        force: bool,
    ) -> Result<&mut BTreeMap<String, SpaceTimeRasterDataset>, ActiniaError> {
        if force || self.strds.is_none() {
            let res: ProcessResponse<Vec<String>> =
                self.session.get(&self.url(Some(MapsetTask::Strds))).await?;
            let strds = res
                .process_results
                .into_iter()
                .map(|name| {
                    let strds = self.new_strds(&name);
                    (name, strds)
                })
                .collect();
            self.strds = Some(strds);
        }
        Ok(self.strds.get_or_insert_with(BTreeMap::new))
    }

    fn new_strds(&self, name: &str) -> SpaceTimeRasterDataset {
        SpaceTimeRasterDataset::new(Arc::clone(&self.session), &self.location, &self.name, name)
    }

    async fn check_strds_existence(&mut self, name: &str) -> Result<(), ClientError> {
        if self.get_strds(false).await?.contains_key(name) {
            Ok(())
        } else {
            Err(ClientError::NotFoundLocally(format!(
                "SpaceTimeRasterDataset <{}>",
                name
            )))
        }
    }

    /// Create a space-time raster dataset.
    ///
    /// An existing dataset of the same name is an error, unless `overwrite`
    /// is set, in which case it is deleted first.
    pub async fn create_strds(
        &mut self,
        name: &str,
        title: &str,
        description: &str,
        temporal_type: TemporalType,
        overwrite: bool,
    ) -> Result<&mut SpaceTimeRasterDataset, ClientError> {
        if self.get_strds(false).await?.contains_key(name) {
            if !overwrite {
                return Err(ClientError::AlreadyExists(format!(
                    "SpaceTimeRasterDataset <{}>",
                    name
                )));
            }
            log::info!("Overwriting STRDS <{}>", name);
            self.delete_strds(name).await?;
        }
        let body = CreateStrds {
            title,
            description,
            temporal_type,
        };
        let url = self
            .session
            .endpoint(&routes::strds(&self.location, &self.name, name));
        let _: Value = self
            .session
            .request_and_check(Method::POST, &url, OK, Payload::json(&body)?)
            .await?;
        let strds = self.new_strds(name);
        let cache = self.get_strds(false).await?;
        Ok(cache.entry(name.to_string()).or_insert(strds))
    }

    pub async fn delete_strds(&mut self, name: &str) -> Result<(), ClientError> {
        self.check_strds_existence(name).await?;
        let url = self
            .session
            .endpoint(&routes::strds(&self.location, &self.name, name));
        let _: Value = self
            .session
            .request_and_check(Method::DELETE, &url, OK, Payload::Empty)
            .await?;
        if let Some(strds) = self.strds.as_mut() {
            strds.remove(name);
        }
        log::info!("SpaceTimeRasterDataset <{}> successfully deleted", name);
        Ok(())
    }

    async fn sampling_request(
        &mut self,
        strds: &str,
        timestamp: Option<&PrimitiveDateTime>,
        input: GeometryInput,
        asynchronous: bool,
    ) -> Result<(String, Payload), ClientError> {
        self.check_strds_existence(strds).await?;
        let mut sub = match timestamp {
            Some(ts) => format!("timestamp/{}/", timestamp_segment(ts)?),
            None => String::new(),
        };
        sub.push_str(if asynchronous {
            "sampling_async"
        } else {
            "sampling_sync"
        });
        if input.is_file() {
            sub.push_str("_geojson");
        }
        let body = match timestamp {
            Some(_) => input.statistics_body().await?,
            None => input.sampling_body().await?,
        };
        Ok((self.strds_url(strds, &sub), Payload::Json(body)))
    }

    /// Sample a space-time raster dataset at point locations.
    pub async fn sample_strds(
        &mut self,
        strds: &str,
        points: impl Into<GeometryInput>,
    ) -> Result<Value, ClientError> {
        let (url, payload) = self
            .sampling_request(strds, None, points.into(), false)
            .await?;
        let res = self
            .session
            .request_and_check(Method::POST, &url, OK, payload)
            .await?;
        Ok(res)
    }

    /// Like [Mapset::sample_strds], but the server computes the samples in an asynchronous job.
    pub async fn sample_strds_async(
        &mut self,
        strds: &str,
        points: impl Into<GeometryInput>,
    ) -> Result<Job, ClientError> {
        let (url, payload) = self
            .sampling_request(strds, None, points.into(), true)
            .await?;
        let name = format!("sample_strds_{}", strds);
        Ok(start_job(&self.session, &url, payload, name).await?)
    }

    /// Compute statistics of a space-time raster dataset at a point in time
    /// within the area of a polygon.
    pub async fn compute_strds_statistics(
        &mut self,
        strds: &str,
        polygon: impl Into<GeometryInput>,
        timestamp: &PrimitiveDateTime,
    ) -> Result<Value, ClientError> {
        let (url, payload) = self
            .sampling_request(strds, Some(timestamp), polygon.into(), false)
            .await?;
        let res = self
            .session
            .request_and_check(Method::POST, &url, OK, payload)
            .await?;
        Ok(res)
    }

    pub async fn compute_strds_statistics_async(
        &mut self,
        strds: &str,
        polygon: impl Into<GeometryInput>,
        timestamp: &PrimitiveDateTime,
    ) -> Result<Job, ClientError> {
        let (url, payload) = self
            .sampling_request(strds, Some(timestamp), polygon.into(), true)
            .await?;
        let name = format!("strds_statistics_{}", strds);
        Ok(start_job(&self.session, &url, payload, name).await?)
    }

    // ==================================================
    //                 PROCESSING
    // ==================================================

    /// Start a process chain in this mapset. The job is added to the client-wide registry.
    pub async fn create_processing_job(
        &self,
        pc: impl Into<ProcessChain>,
        name: Option<&str>,
    ) -> Result<Job, ClientError> {
        let payload = pc.into().into_payload().await?;
        let url = self.url(Some(MapsetTask::ProcessingAsync));
        let job = start_registered_job(
            &self.session,
            &self.jobs,
            &url,
            payload,
            name,
            DEFAULT_JOB_NAME,
        )
        .await?;
        Ok(job)
    }
}

use crate::client::routes;
use crate::client::session::{Payload, Session, OK};
use crate::constants::{DEFAULT_JOB_NAME, DEFAULT_VALIDATION_JOB_NAME};
use crate::errors::{ActiniaError, ClientError};
use crate::models::data::{MessageResponse, ProcessResponse, ProjectionInfo, ValidationOutcome};
use crate::models::job::start_registered_job;
use crate::models::mapset::Mapset;
use crate::models::{Job, JobRegistry};
use crate::process_chain::ProcessChain;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

const VALIDATION_ACCEPTED: &[StatusCode] = &[StatusCode::OK, StatusCode::BAD_REQUEST];

/// A GRASS location (called "project" by newer actinia servers).
#[derive(Debug)]
pub struct Location {
    session: Arc<Session>,
    jobs: JobRegistry,
    name: String,
    info: Option<ProjectionInfo>,
    mapsets: Option<BTreeMap<String, Mapset>>,
}

impl Location {
    pub(crate) fn new(session: Arc<Session>, jobs: JobRegistry, name: &str) -> Self {
        Self {
            session,
            jobs,
            name: name.to_string(),
            info: None,
            mapsets: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn url(&self, task: &str) -> String {
        self.session
            .endpoint(&routes::location_task(&self.name, task))
    }

    /// Projection and region of the location.
    pub async fn get_info(&mut self, force: bool) -> Result<&ProjectionInfo, ActiniaError> {
        if force || self.info.is_none() {
            let res: ProcessResponse<ProjectionInfo> = self.session.get(&self.url("info")).await?;
            self.info = Some(res.process_results);
        }
        Ok(self.info.get_or_insert_with(Default::default))
    }

    async fn request_mapsets(&mut self) -> Result<(), ActiniaError> {
        let url = self.session.endpoint(&routes::mapsets(&self.name));
        let res: ProcessResponse<Vec<String>> = self.session.get(&url).await?;
        let mapsets = res
            .process_results
            .into_iter()
            .map(|name| {
                let mapset = self.new_mapset(&name);
                (name, mapset)
            })
            .collect();
        self.mapsets = Some(mapsets);
        Ok(())
    }

    fn new_mapset(&self, name: &str) -> Mapset {
        Mapset::new(
            Arc::clone(&self.session),
            self.jobs.clone(),
            &self.name,
            name,
        )
    }

    /// Mapsets of this location, fetched on first call or when `force` is set.
    pub async fn get_mapsets(
        &mut self,
        force: bool,
    ) -> Result<&mut BTreeMap<String, Mapset>, ActiniaError> {
        if force || self.mapsets.is_none() {
            self.request_mapsets().await?;
        }
        Ok(self.mapsets.get_or_insert_with(BTreeMap::new))
    }

    /// A mapset from the cached listing.
    pub fn mapset(&mut self, name: &str) -> Result<&mut Mapset, ClientError> {
        self.mapsets
            .as_mut()
            .and_then(|m| m.get_mut(name))
            .ok_or_else(|| ClientError::NotFoundLocally(format!("Mapset <{}>", name)))
    }

    /// Create a mapset. If it already exists, a warning is logged and the
    /// existing mapset is returned.
    pub async fn create_mapset(&mut self, name: &str) -> Result<&mut Mapset, ClientError> {
        if self.get_mapsets(true).await?.contains_key(name) {
            log::warn!("Mapset <{}> already exists.", name);
        } else {
            let url = self
                .session
                .endpoint(&routes::mapset(&self.name, name, None));
            let _: Value = self
                .session
                .request_and_check(Method::POST, &url, OK, Payload::Empty)
                .await?;
        }
        let mapset = self.new_mapset(name);
        let mapsets = self.get_mapsets(false).await?;
        Ok(mapsets.entry(name.to_string()).or_insert(mapset))
    }

    /// Delete a mapset. Deleting a mapset which does not exist only logs a warning.
    pub async fn delete_mapset(&mut self, name: &str) -> Result<(), ClientError> {
        if !self.get_mapsets(true).await?.contains_key(name) {
            log::warn!("Mapset <{}> does not exist and cannot be deleted.", name);
            return Ok(());
        }
        let url = self
            .session
            .endpoint(&routes::mapset(&self.name, name, None));
        let _: Value = self
            .session
            .request_and_check(Method::DELETE, &url, OK, Payload::Empty)
            .await?;
        if let Some(mapsets) = self.mapsets.as_mut() {
            mapsets.remove(name);
        }
        Ok(())
    }

    /// Validate a process chain synchronously.
    ///
    /// An invalid process chain is not an [Err]: the server's explanation is
    /// returned as [ValidationOutcome::Invalid].
    pub async fn validate_process_chain_sync(
        &self,
        pc: impl Into<ProcessChain>,
    ) -> Result<ValidationOutcome, ClientError> {
        let payload = pc.into().into_payload().await?;
        let (status, res): (StatusCode, MessageResponse) = self
            .session
            .request_with_status(
                Method::POST,
                &self.url("process_chain_validation_sync"),
                None,
                VALIDATION_ACCEPTED,
                payload,
            )
            .await?;
        if status == StatusCode::OK {
            log::info!("{}", res.message);
            Ok(ValidationOutcome::Valid(res.message))
        } else {
            log::error!("Validation error: {}", res.message);
            Ok(ValidationOutcome::Invalid(res.message))
        }
    }

    /// Validate a process chain in an asynchronous job.
    pub async fn validate_process_chain_async(
        &self,
        pc: impl Into<ProcessChain>,
        name: Option<&str>,
    ) -> Result<Job, ClientError> {
        let payload = pc.into().into_payload().await?;
        let job = start_registered_job(
            &self.session,
            &self.jobs,
            &self.url("process_chain_validation_async"),
            payload,
            name,
            DEFAULT_VALIDATION_JOB_NAME,
        )
        .await?;
        Ok(job)
    }

    /// Run a process chain in an ephemeral mapset and export its results.
    pub async fn create_processing_export_job(
        &self,
        pc: impl Into<ProcessChain>,
        name: Option<&str>,
    ) -> Result<Job, ClientError> {
        let payload = pc.into().into_payload().await?;
        let job = start_registered_job(
            &self.session,
            &self.jobs,
            &self.url("processing_async_export"),
            payload,
            name,
            DEFAULT_JOB_NAME,
        )
        .await?;
        Ok(job)
    }
}

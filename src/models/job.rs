//! Client-side handle of an asynchronous actinia resource.

use crate::client::routes;
use crate::client::session::{Payload, Session, OK};
use crate::errors::{ActiniaError, ClientError};
use crate::models::data::{JobState, JobUrls};
use crate::models::JobRegistry;
use crate::types::{JobStatus, ResourceId, UserId};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

/// Status codes of a poll which carry a job state. actinia answers
/// 400 when the job is in the `error` state.
const POLL_ACCEPTED: &[StatusCode] = &[StatusCode::OK, StatusCode::BAD_REQUEST];

/// An asynchronous job running on the actinia server.
///
/// Clones of a [Job] share their state: polling one clone updates all of them,
/// which is how the [crate::JobRegistry] stays current.
///
/// The state is never computed locally. Each poll replaces it wholesale with
/// the state reported by the server.
#[derive(Debug, Clone)]
pub struct Job {
    name: String,
    session: Arc<Session>,
    state: Arc<RwLock<JobState>>,
}

impl Job {
    pub(crate) fn new(name: impl Into<String>, session: Arc<Session>, state: JobState) -> Self {
        Self {
            name: name.into(),
            session,
            state: Arc::new(RwLock::new(state)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, JobState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, state: JobState) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *guard = state;
    }

    /// Display name given by the client. Not known to the server.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> JobStatus {
        self.read().status
    }

    pub fn message(&self) -> String {
        self.read().message.clone()
    }

    pub fn resource_id(&self) -> ResourceId {
        self.read().resource_id.clone()
    }

    pub fn urls(&self) -> JobUrls {
        self.read().urls.clone()
    }

    pub fn process_results(&self) -> Value {
        self.read().process_results.clone()
    }

    /// A copy of everything the server last told us about this job.
    pub fn state(&self) -> JobState {
        self.read().clone()
    }

    /// Fetch the current state of this job from its status URL.
    ///
    /// Polling a job which already reached a terminal status still performs
    /// the request, but logs a warning.
    pub async fn poll(&self) -> Result<(), ActiniaError> {
        self.poll_once(false).await
    }

    async fn poll_once(&self, quiet: bool) -> Result<(), ActiniaError> {
        let (previous, url) = {
            let state = self.read();
            (state.status, state.urls.status.clone())
        };
        if previous.is_terminal() {
            log::warn!(
                "The job {} is {} and polling it will not change it.",
                self.name,
                previous
            );
        }
        let state: JobState = self
            .session
            .request_and_check(Method::GET, url.as_str(), POLL_ACCEPTED, Payload::Empty)
            .await?;
        let status = state.status;
        self.replace(state);
        if !quiet {
            log::info!("Status of {} job is {}.", self.name, status);
        }
        Ok(())
    }

    /// Poll until the job reaches a terminal status, sleeping `interval` between polls.
    ///
    /// Returns `0` if the job finished, `1` if it ended in `error` or `terminated`.
    /// An unsuccessful job is not an [Err]: only failures to talk to the server are.
    ///
    /// Status changes are logged unless `quiet`.
    pub async fn poll_until_finished(
        &self,
        interval: Duration,
        quiet: bool,
    ) -> Result<i32, ActiniaError> {
        let mut last_logged: Option<JobStatus> = None;
        loop {
            self.poll_once(true).await?;
            let (status, message) = {
                let state = self.read();
                (state.status, state.message.clone())
            };
            if let Some(code) = status.exit_code() {
                let msg = format!("Status of {} job is {}: {}", self.name, status, message);
                if code == 0 {
                    log::info!("{}", msg);
                } else {
                    log::error!("{}", msg);
                }
                return Ok(code);
            }
            if !quiet && last_logged != Some(status) {
                last_logged = Some(status);
                log::info!("Status of {} job is {}: {}", self.name, status, message);
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// [Job::poll_until_finished] with the poll interval the client was configured with.
    pub async fn wait(&self) -> Result<i32, ActiniaError> {
        self.poll_until_finished(self.session.poll_interval, false)
            .await
    }

    /// Ask the server to cancel this job. Does not wait for it to stop.
    pub async fn terminate(&self) -> Result<(), ClientError> {
        let (user_id, resource_id) = {
            let state = self.read();
            (state.user_id.clone(), state.resource_id.clone())
        };
        let user_id = user_id
            .or_else(|| {
                self.session
                    .username()
                    .map(|u| UserId::new(u.to_string()))
            })
            .ok_or_else(|| {
                ClientError::Validation(format!(
                    "Cannot terminate job {}: user of resource {} is unknown",
                    self.name, resource_id
                ))
            })?;
        let url = self
            .session
            .endpoint(&routes::resource(&user_id, &resource_id));
        let _: Value = self
            .session
            .request_and_check(Method::DELETE, &url, OK, Payload::Empty)
            .await?;
        log::info!("Termination request for job {} committed.", resource_id);
        Ok(())
    }
}

/// Send a request which starts an asynchronous job on the server.
pub(crate) async fn start_job(
    session: &Arc<Session>,
    url: &str,
    payload: Payload,
    name: impl Into<String>,
) -> Result<Job, ActiniaError> {
    let state: JobState = session
        .request_and_check(Method::POST, url, OK, payload)
        .await?;
    Ok(Job::new(name, Arc::clone(session), state))
}

/// [start_job] and remember the job in the client-wide registry.
pub(crate) async fn start_registered_job(
    session: &Arc<Session>,
    jobs: &JobRegistry,
    url: &str,
    payload: Payload,
    name: Option<&str>,
    default_name: &str,
) -> Result<Job, ActiniaError> {
    let (display_name, key) = super::registry::job_names(name, default_name);
    let job = start_job(session, url, payload, display_name).await?;
    jobs.insert(key, job.clone());
    Ok(job)
}

//! Errors for this crate.
//! About anyhow: see https://github.com/TrueLayer/reqwest-middleware/issues/119

use crate::types::JobStatus;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

#[derive(thiserror::Error, Debug)]
pub enum InvalidActiniaUrl {
    #[error("Given URL does not start with \"http://\" or \"https://\": {0}")]
    Protocol(String),
}

aliri_braid::from_infallible!(InvalidActiniaUrl);

/// Errors representing failed interactions with an actinia server.
#[derive(thiserror::Error, Debug)]
pub enum ActiniaError {
    /// HTTP 401 from any endpoint. Always fatal.
    #[error("Wrong user or password. Please check your inputs. ({text})")]
    Authentication { text: String },

    /// Error response with a status code the caller did not expect.
    #[error("Error {status:?} ({reason}): {text}")]
    Request {
        status: StatusCode,
        reason: &'static str,
        text: String,
    },

    /// Response body is not the JSON we expected.
    #[error("Could not decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    /// Error without a response from actinia, e.g. connection refused or timeout.
    #[error(transparent)]
    Raw(#[from] reqwest::Error),

    /// Error from reqwest middleware function.
    #[error(transparent)]
    Middleware(anyhow::Error),
}

impl ActiniaError {
    /// HTTP status code of the response, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Authentication { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest_middleware::Error> for ActiniaError {
    fn from(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Middleware(e) => ActiniaError::Middleware(e),
            reqwest_middleware::Error::Reqwest(e) => ActiniaError::Raw(e),
        }
    }
}

/// Errors from operations on the client and its resource handles.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Actinia(#[from] ActiniaError),

    #[error("Authentication is not set.")]
    NotAuthenticated,

    /// Malformed input, detected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// A child resource which is not in the local cache.
    #[error("{0} does not exist")]
    NotFoundLocally(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    /// A job which this crate drove to completion ended unsuccessfully.
    #[error("{status}: {message}")]
    JobFailed { status: JobStatus, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<reqwest_middleware::Error> for ClientError {
    fn from(e: reqwest_middleware::Error) -> Self {
        ClientError::Actinia(e.into())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Actinia(ActiniaError::Raw(e))
    }
}

/// Check a response against the accepted status codes.
///
/// A 401 is always an [ActiniaError::Authentication], even if it was accepted.
pub(crate) async fn check(
    res: reqwest::Response,
    accepted: &[StatusCode],
) -> Result<reqwest::Response, ActiniaError> {
    let status = res.status();
    if status == StatusCode::UNAUTHORIZED {
        let text = res.text().await?;
        return Err(ActiniaError::Authentication { text });
    }
    if accepted.contains(&status) {
        return Ok(res);
    }
    let reason = status.canonical_reason().unwrap_or("unknown reason");
    let text = res.text().await?;
    Err(ActiniaError::Request {
        status,
        reason,
        text,
    })
}

/// Read the whole body and deserialize it as JSON.
pub(crate) async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ActiniaError> {
    let url = res.url().to_string();
    let text = res.text().await?;
    serde_json::from_str(&text).map_err(|source| ActiniaError::Decode { url, source })
}

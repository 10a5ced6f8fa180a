//! Shared connection state and the single request helper every handle goes through.

use crate::constants::JSON_CONTENT_TYPE;
use crate::errors::{check, decode, ActiniaError, ClientError};
use crate::types::{ApiUrl, Username};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

pub(crate) const OK: &[StatusCode] = &[StatusCode::OK];

/// Username and password for HTTP basic authentication.
#[derive(Clone)]
pub(crate) struct Credentials {
    pub username: Username,
    password: String,
}

impl Credentials {
    pub fn new(username: Username, password: String) -> Self {
        Self { username, password }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Request body.
#[derive(Debug)]
pub(crate) enum Payload {
    Empty,
    /// Already serialized JSON (or process chain text), sent as `application/json`.
    Json(String),
    Form(Form),
}

impl Payload {
    pub fn json<T: Serialize + ?Sized>(body: &T) -> Result<Self, ClientError> {
        serde_json::to_string(body)
            .map(Payload::Json)
            .map_err(|e| ClientError::Validation(format!("Cannot serialize request body: {}", e)))
    }
}

/// Configuration shared by the client and every resource handle it creates.
///
/// A handle keeps the [Session] it was created with: changing the credentials
/// of the client does not change the credentials of existing handles.
#[derive(Debug)]
pub(crate) struct Session {
    pub client: ClientWithMiddleware,
    pub url: ApiUrl,
    pub auth: Option<Credentials>,
    pub poll_interval: Duration,
}

impl Session {
    /// Same connection, different credentials.
    pub fn with_auth(&self, auth: Option<Credentials>) -> Self {
        Self {
            client: self.client.clone(),
            url: self.url.clone(),
            auth,
            poll_interval: self.poll_interval,
        }
    }

    /// Same connection, different API root.
    pub fn with_url(&self, url: ApiUrl) -> Self {
        Self {
            url,
            ..self.with_auth(self.auth.clone())
        }
    }

    /// Absolute URL of an endpoint under the API root.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url, path)
    }

    pub fn username(&self) -> Option<&Username> {
        self.auth.as_ref().map(|c| &c.username)
    }

    pub fn require_auth(&self) -> Result<&Credentials, ClientError> {
        self.auth.as_ref().ok_or(ClientError::NotAuthenticated)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.client.request(method, url);
        match &self.auth {
            Some(c) => req.basic_auth(&c.username, Some(&c.password)),
            None => req,
        }
    }

    /// Perform one request, check its status against `accepted` and decode the JSON body.
    /// Also returns the status code, for callers which accept more than one.
    pub async fn request_with_status<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        query: Option<&[(&str, &str)]>,
        accepted: &[StatusCode],
        payload: Payload,
    ) -> Result<(StatusCode, T), ActiniaError> {
        let mut req = self.request(method, url);
        if let Some(query) = query {
            req = req.query(query);
        }
        req = match payload {
            Payload::Empty => req,
            Payload::Json(body) => req.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(body),
            Payload::Form(form) => req.multipart(form),
        };
        let res = check(req.send().await?, accepted).await?;
        let status = res.status();
        Ok((status, decode(res).await?))
    }

    /// See [Session::request_with_status].
    pub async fn request_and_check<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        accepted: &[StatusCode],
        payload: Payload,
    ) -> Result<T, ActiniaError> {
        self.request_with_status(method, url, None, accepted, payload)
            .await
            .map(|(_, data)| data)
    }

    /// GET expecting HTTP 200.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ActiniaError> {
        self.request_and_check(Method::GET, url, OK, Payload::Empty)
            .await
    }
}

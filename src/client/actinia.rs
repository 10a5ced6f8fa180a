use crate::client::routes;
use crate::client::session::{Credentials, Payload, Session, OK};
use crate::constants::{DEFAULT_ACTINIA_URL, DEFAULT_API_VERSION, DEFAULT_POLL_INTERVAL};
use crate::errors::{ActiniaError, ClientError};
use crate::models::data::LocationsResponse;
use crate::models::{JobRegistry, Location};
use crate::requests;
use crate::types::{ActiniaUrl, ApiUrl, Username};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use reqwest_middleware::Middleware;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Configures and connects an [Actinia] client.
pub struct ActiniaBuilder {
    url: ActiniaUrl,
    api_version: String,
    credentials: Option<(Username, String)>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    poll_interval: Duration,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Default for ActiniaBuilder {
    fn default() -> Self {
        Self::new(ActiniaUrl::from_static(DEFAULT_ACTINIA_URL))
    }
}

impl ActiniaBuilder {
    pub fn new(url: ActiniaUrl) -> Self {
        Self {
            url,
            api_version: DEFAULT_API_VERSION.to_string(),
            credentials: None,
            connect_timeout: None,
            read_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            middleware: Vec::new(),
        }
    }

    /// API version selector, e.g. `"v3"`, `"api/v3"` or `"latest"`.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Log in as `username` after connecting.
    pub fn credentials(mut self, username: Username, password: impl Into<String>) -> Self {
        self.credentials = Some((username, password.into()));
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Timeout of every request, from connecting until the response body was read.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Default interval between polls of [crate::Job::wait].
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Add middleware to the HTTP client.
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    fn build_client(&self) -> Result<reqwest_middleware::ClientWithMiddleware, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut builder = reqwest::ClientBuilder::new().default_headers(headers);
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = self.read_timeout {
            builder = builder.timeout(timeout);
        }
        let client = self
            .middleware
            .iter()
            .fold(
                reqwest_middleware::ClientBuilder::new(builder.build()?),
                |client, m| client.with_arc(Arc::clone(m)),
            )
            .build();
        Ok(client)
    }

    /// Check that the server speaks the configured API version and log in,
    /// if credentials were given.
    pub async fn connect(self) -> Result<Actinia, ClientError> {
        let session = Session {
            client: self.build_client()?,
            url: ApiUrl::resolve(&self.url, &self.api_version),
            auth: None,
            poll_interval: self.poll_interval,
        };
        let session = handshake(session, &self.url).await?;
        let mut actinia = Actinia {
            session: Arc::new(session),
            base_url: self.url,
            locations: None,
            jobs: JobRegistry::default(),
        };
        if let Some((username, password)) = self.credentials {
            actinia.set_authentication(username, password).await?;
        }
        Ok(actinia)
    }
}

/// Verify the API root by requesting its version. Servers which moved their
/// API tell us where it went in `links`, in which case the root is corrected once.
async fn handshake(session: Session, base: &ActiniaUrl) -> Result<Session, ClientError> {
    let body = match session.get::<Value>(&session.endpoint(routes::VERSION)).await {
        Ok(body) => body,
        Err(ActiniaError::Request {
            status,
            reason,
            text,
        }) => match serde_json::from_str::<Value>(&text) {
            Ok(body) if body.get("links").is_some() => body,
            _ => {
                return Err(ActiniaError::Request {
                    status,
                    reason,
                    text,
                }
                .into())
            }
        },
        Err(e) => return Err(e.into()),
    };
    if body.get("version").is_some() || body.get("links").is_none() {
        log::debug!("{} is working and will be used.", session.url);
        return Ok(session);
    }
    let prefix = api_prefix_from_links(base, &body).ok_or_else(|| {
        ClientError::Validation(format!(
            "Connection to actinia server <{}> failed!",
            session.url
        ))
    })?;
    let session = session.with_url(ApiUrl::resolve(base, &prefix));
    log::warn!("Using actinia <{}>", session.url);
    let _: Value = session.get(&session.endpoint(routes::VERSION)).await?;
    Ok(session)
}

/// Find the API prefix in the first link of a version response,
/// e.g. `api/v3` in `https://actinia.mundialis.de/api/v3/version`.
fn api_prefix_from_links(base: &ActiniaUrl, body: &Value) -> Option<String> {
    let link = body.get("links")?.get(0)?.as_str()?;
    let host = base
        .as_str()
        .split_once("://")
        .map(|(_, host)| host)
        .unwrap_or(base.as_str())
        .trim_end_matches('/');
    let (_, after_host) = link.split_once(&format!("{}/", host))?;
    let (prefix, _) = after_host.split_once("/version")?;
    Some(prefix.to_string())
}

/// Client of an actinia deployment.
///
/// Holds the locations it listed or created and the registry of the jobs
/// it started.
///
/// Listing, creating and deleting locations requires credentials
/// ([ClientError::NotAuthenticated] otherwise). Every handle is reached
/// through these, and carries the credentials of the client it came from.
#[derive(Debug)]
pub struct Actinia {
    session: Arc<Session>,
    base_url: ActiniaUrl,
    locations: Option<BTreeMap<String, Location>>,
    jobs: JobRegistry,
}

impl Actinia {
    /// Create a client builder.
    pub fn builder(url: ActiniaUrl) -> ActiniaBuilder {
        ActiniaBuilder::new(url)
    }

    /// Connect to `url` with default settings and no credentials.
    pub async fn connect(url: ActiniaUrl) -> Result<Self, ClientError> {
        ActiniaBuilder::new(url).connect().await
    }

    /// Base URL of the deployment.
    pub fn base_url(&self) -> &ActiniaUrl {
        &self.base_url
    }

    /// API root every endpoint is relative to.
    pub fn url(&self) -> &ApiUrl {
        &self.session.url
    }

    pub fn username(&self) -> Option<&Username> {
        self.session.username()
    }

    /// Jobs started through this client.
    pub fn jobs(&self) -> &JobRegistry {
        &self.jobs
    }

    /// Versions of GRASS GIS, actinia core and its plugins.
    pub async fn get_version(&self) -> Result<Value, ActiniaError> {
        self.session
            .get(&self.session.endpoint(routes::VERSION))
            .await
    }

    /// Log in, checking the credentials against the location listing.
    ///
    /// If they are wrong, the client is left without credentials. Handles
    /// created before keep the credentials they were created with.
    pub async fn set_authentication(
        &mut self,
        username: Username,
        password: impl Into<String>,
    ) -> Result<(), ActiniaError> {
        log::debug!("Logging in as {}", username);
        let credentials = Credentials::new(username, password.into());
        let session = self.session.with_auth(Some(credentials));
        match session
            .get::<Value>(&session.endpoint(routes::LOCATIONS))
            .await
        {
            Ok(_) => {
                log::debug!("Logged in to {}", session.url);
                self.session = Arc::new(session);
                Ok(())
            }
            Err(e) => {
                self.session = Arc::new(self.session.with_auth(None));
                Err(e)
            }
        }
    }

    fn new_location(&self, name: &str) -> Location {
        Location::new(Arc::clone(&self.session), self.jobs.clone(), name)
    }

    async fn request_locations(&mut self) -> Result<(), ClientError> {
        self.session.require_auth()?;
        let res: LocationsResponse = self
            .session
            .get(&self.session.endpoint(routes::LOCATIONS))
            .await?;
        let names = res.into_names();
        if names.is_empty() {
            return Err(ClientError::NotAuthenticated);
        }
        let locations = names
            .into_iter()
            .map(|name| {
                let location = self.new_location(&name);
                (name, location)
            })
            .collect();
        self.locations = Some(locations);
        Ok(())
    }

    /// Locations (projects) visible to the logged in user, fetched on
    /// first call or when `force` is set.
    pub async fn get_locations(
        &mut self,
        force: bool,
    ) -> Result<&mut BTreeMap<String, Location>, ClientError> {
        if force || self.locations.is_none() {
            self.request_locations().await?;
        }
        Ok(self.locations.get_or_insert_with(BTreeMap::new))
    }

    /// A location from the cached listing.
    pub fn location(&mut self, name: &str) -> Result<&mut Location, ClientError> {
        self.locations
            .as_mut()
            .and_then(|l| l.get_mut(name))
            .ok_or_else(|| ClientError::NotFoundLocally(format!("Location <{}>", name)))
    }

    /// Create a location with the projection of an EPSG code.
    ///
    /// If a location of this name was already listed, a warning is logged
    /// and the cached location is returned.
    pub async fn create_location(
        &mut self,
        name: &str,
        epsg: &str,
    ) -> Result<&mut Location, ClientError> {
        self.session.require_auth()?;
        let exists = self
            .locations
            .as_ref()
            .map(|l| l.contains_key(name))
            .unwrap_or(false);
        if exists {
            log::warn!("Location <{}> already exists.", name);
        } else {
            let url = self.session.endpoint(&routes::location(name));
            let payload = Payload::json(&requests::create_location(epsg))?;
            let _: Value = self
                .session
                .request_and_check(Method::POST, &url, OK, payload)
                .await?;
        }
        let location = self.new_location(name);
        let locations = self.get_locations(false).await?;
        Ok(locations.entry(name.to_string()).or_insert(location))
    }

    pub async fn delete_location(&mut self, name: &str) -> Result<(), ClientError> {
        self.session.require_auth()?;
        let url = self.session.endpoint(&routes::location(name));
        let _: Value = self
            .session
            .request_and_check(Method::DELETE, &url, OK, Payload::Empty)
            .await?;
        if let Some(locations) = self.locations.as_mut() {
            locations.remove(name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    #[rstest]
    #[case("https://actinia.mundialis.de", "https://actinia.mundialis.de/api/v3/version", Some("api/v3"))]
    #[case("http://localhost:8088/", "http://localhost:8088/api/v1/version", Some("api/v1"))]
    #[case("http://localhost:8088", "http://elsewhere:8088/api/v1/version", None)]
    fn test_api_prefix_from_links(
        #[case] base: &str,
        #[case] link: &str,
        #[case] expected: Option<&str>,
    ) {
        let base = ActiniaUrl::try_from(base).unwrap();
        let body = json!({"links": [link]});
        assert_eq!(
            api_prefix_from_links(&base, &body).as_deref(),
            expected
        )
    }

    #[test]
    fn test_api_prefix_without_links() {
        let base = ActiniaUrl::from_static("http://localhost:8088");
        assert_eq!(api_prefix_from_links(&base, &json!({"links": []})), None);
        assert_eq!(api_prefix_from_links(&base, &json!({})), None);
    }
}

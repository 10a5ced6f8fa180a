#![allow(dead_code)]

use actinia::{Actinia, ActiniaUrl, Location, Mapset, Username};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type AnyResult = Result<(), Box<dyn std::error::Error>>;

pub const API: &str = "/api/v3";
pub const USER: &str = "testuser";
pub const PASSWORD: &str = "pw";
pub const LOCATION: &str = "nc_spm_08";
pub const MAPSET: &str = "test_mapset";

/// Path of an endpoint under the API root.
pub fn api_path(route: &str) -> String {
    format!("{}/{}", API, route)
}

pub fn mapset_path(route: &str) -> String {
    api_path(&format!("locations/{}/mapsets/{}/{}", LOCATION, MAPSET, route))
}

pub fn version_body() -> Value {
    json!({
        "grass_version": {"version": "8.2.0", "date": "2022"},
        "plugins": "actinia_statistic_plugin,actinia_satellite_plugin",
        "python_version": "3.8.10",
        "version": "1.2.1"
    })
}

/// A response frame of a job in the given state.
pub fn job_frame(server: &MockServer, resource_id: &str, status: &str, message: &str) -> Value {
    json!({
        "accept_datetime": "2022-05-24 18:22:42.343953",
        "accept_timestamp": 1653416562.3439503,
        "api_info": {
            "endpoint": "asyncephemeralresource",
            "method": "POST",
            "path": "/api/v3/locations/nc_spm_08/processing_async_export",
            "request_url": format!("{}/api/v3/locations/nc_spm_08/processing_async_export", server.uri())
        },
        "datetime": "2022-05-24 18:22:42.346947",
        "http_code": 200,
        "message": message,
        "process_chain_list": [],
        "process_results": {},
        "resource_id": resource_id,
        "status": status,
        "time_delta": 0.0030062198638916016,
        "timestamp": 1653416562.346946,
        "urls": {
            "resources": [],
            "status": status_url(server, resource_id)
        },
        "user_id": USER
    })
}

pub fn status_url(server: &MockServer, resource_id: &str) -> String {
    format!("{}{}", server.uri(), status_path(resource_id))
}

pub fn status_path(resource_id: &str) -> String {
    api_path(&format!("resources/{}/{}", USER, resource_id))
}

/// A finished synchronous response carrying `process_results`.
pub fn process_response(results: Value) -> Value {
    json!({
        "accept_datetime": "2022-05-24 18:22:42.343953",
        "http_code": 200,
        "message": "Processing successfully finished",
        "process_results": results,
        "resource_id": "resource_id-sync",
        "status": "finished",
        "urls": {"resources": [], "status": "http://localhost/api/v3/resources/testuser/resource_id-sync"},
        "user_id": USER
    })
}

/// Start a mock actinia which answers the version handshake.
pub async fn start_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("version")))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_body()))
        .mount(&server)
        .await;
    server
}

/// Mount the location and mapset listings.
pub async fn mount_listings(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(api_path("locations")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "locations": [LOCATION, "latlong_wgs84"]})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path(&format!("locations/{}/mapsets", LOCATION))))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(process_response(json!(["PERMANENT", MAPSET]))),
        )
        .mount(server)
        .await;
}

pub fn actinia_url(server: &MockServer) -> ActiniaUrl {
    ActiniaUrl::try_from(server.uri().as_str()).unwrap()
}

/// Connect to the mock with credentials and a short poll interval.
pub async fn connect(server: &MockServer) -> Actinia {
    Actinia::builder(actinia_url(server))
        .api_version("v3")
        .credentials(Username::from_static(USER), PASSWORD)
        .poll_interval(Duration::from_millis(10))
        .connect()
        .await
        .unwrap()
}

/// The test location, through the cached listing of the client.
pub async fn test_location(client: &mut Actinia) -> &mut Location {
    client
        .get_locations(false)
        .await
        .unwrap()
        .get_mut(LOCATION)
        .unwrap()
}

/// The test mapset, through the cached listings of the client.
pub async fn test_mapset(client: &mut Actinia) -> &mut Mapset {
    client
        .get_locations(false)
        .await
        .unwrap()
        .get_mut(LOCATION)
        .unwrap()
        .get_mapsets(false)
        .await
        .unwrap()
        .get_mut(MAPSET)
        .unwrap()
}

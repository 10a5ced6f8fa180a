use std::time::Duration;

use rstest::*;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use actinia::errors::{ActiniaError, ClientError};
use actinia::{Actinia, Username};
use helpers::*;

mod helpers;

#[tokio::test]
async fn test_connect_and_get_version() -> AnyResult {
    let server = start_server().await;
    let client = Actinia::builder(actinia_url(&server))
        .api_version("v3")
        .connect()
        .await?;
    assert_eq!(client.url().as_str(), format!("{}/api/v3", server.uri()));
    assert_eq!(client.get_version().await?, version_body());
    assert!(client.username().is_none());
    Ok(())
}

#[rstest]
#[case("latest", "/latest")]
#[case("api/v3", "/api/v3")]
#[case("v3", "/api/v3")]
#[tokio::test]
async fn test_api_version_selector(#[case] selector: &str, #[case] root: &str) -> AnyResult {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/version", root)))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_body()))
        .expect(1)
        .mount(&server)
        .await;
    let client = Actinia::builder(actinia_url(&server))
        .api_version(selector)
        .connect()
        .await?;
    assert_eq!(client.url().as_str(), format!("{}{}", server.uri(), root));
    Ok(())
}

#[tokio::test]
async fn test_version_links_fallback() -> AnyResult {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest/version"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"links": [format!("{}/api/v3/version", server.uri())]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_body()))
        .mount(&server)
        .await;

    let client = Actinia::connect(actinia_url(&server)).await?;
    assert_eq!(client.url().as_str(), format!("{}/api/v3", server.uri()));
    Ok(())
}

#[tokio::test]
async fn test_connect_fails_fast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/version"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;
    let err = Actinia::builder(actinia_url(&server))
        .api_version("v3")
        .connect()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Actinia(ActiniaError::Request { status, .. }) if status.as_u16() == 503
    ));
}

#[tokio::test]
async fn test_read_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/version"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(version_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let err = Actinia::builder(actinia_url(&server))
        .api_version("v3")
        .read_timeout(Duration::from_millis(100))
        .connect()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Actinia(ActiniaError::Raw(e)) if e.is_timeout()));
}

#[tokio::test]
async fn test_wrong_credentials() -> AnyResult {
    let server = start_server().await;
    Mock::given(method("GET"))
        .and(path(api_path("locations")))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized Access"))
        .mount(&server)
        .await;
    let mut client = Actinia::builder(actinia_url(&server))
        .api_version("v3")
        .connect()
        .await?;

    let err = client
        .set_authentication(Username::from_static("user"), "wrongpw")
        .await
        .unwrap_err();
    assert!(matches!(err, ActiniaError::Authentication { .. }));
    assert!(err.to_string().contains("Wrong user or password"));
    assert!(client.username().is_none());

    let err = client.get_locations(false).await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
    assert_eq!(err.to_string(), "Authentication is not set.");
    Ok(())
}

#[tokio::test]
async fn test_wrong_credentials_in_builder() {
    let server = start_server().await;
    Mock::given(method("GET"))
        .and(path(api_path("locations")))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized Access"))
        .mount(&server)
        .await;
    let err = Actinia::builder(actinia_url(&server))
        .api_version("v3")
        .credentials(Username::from_static(USER), "wrongpw")
        .connect()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Actinia(ActiniaError::Authentication { .. })
    ));
}

#[tokio::test]
async fn test_get_locations() -> AnyResult {
    let server = start_server().await;
    mount_listings(&server).await;
    let mut client = connect(&server).await;
    assert_eq!(client.username().unwrap().as_str(), USER);

    let names: Vec<String> = client.get_locations(false).await?.keys().cloned().collect();
    assert_eq!(names, vec!["latlong_wgs84", LOCATION]);
    assert!(client.location(LOCATION).is_ok());
    assert!(matches!(
        client.location("nope").unwrap_err(),
        ClientError::NotFoundLocally(_)
    ));
    Ok(())
}

#[tokio::test]
async fn test_get_projects() -> AnyResult {
    let server = start_server().await;
    Mock::given(method("GET"))
        .and(path(api_path("locations")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "success", "projects": ["nc_spm_08"]})),
        )
        .mount(&server)
        .await;
    let mut client = connect(&server).await;
    assert!(client.get_locations(false).await?.contains_key("nc_spm_08"));
    Ok(())
}

#[tokio::test]
async fn test_location_info() -> AnyResult {
    let server = start_server().await;
    mount_listings(&server).await;
    Mock::given(method("GET"))
        .and(path(api_path("locations/nc_spm_08/info")))
        .respond_with(ResponseTemplate::new(200).set_body_json(process_response(json!({
            "projection": "PROJCRS[\"NAD83(HARN) / North Carolina\"]",
            "region": {
                "b": 0.0, "cells": 29535, "cells3": 29535, "cols": 179, "cols3": 179,
                "depths": 1, "e": 639530.0, "ewres": 10.0, "ewres3": 10.0, "n": 221230.0,
                "nsres": 10.0, "nsres3": 10.0, "projection": 99, "rows": 165, "rows3": 165,
                "s": 219580.0, "t": 1.0, "tbres": 1.0, "w": 637740.0, "zone": 0
            }
        }))))
        .expect(1)
        .mount(&server)
        .await;
    let mut client = connect(&server).await;
    let location = client.get_locations(false).await?.get_mut(LOCATION).unwrap();
    let info = location.get_info(false).await?;
    assert_eq!(info.region.cells, Some(29535));
    assert!(info.projection.contains("North Carolina"));
    // cached
    location.get_info(false).await?;
    Ok(())
}

#[tokio::test]
async fn test_create_and_delete_location() -> AnyResult {
    let server = start_server().await;
    mount_listings(&server).await;
    Mock::given(method("POST"))
        .and(path(api_path("locations/test_location")))
        .and(body_string_contains("g.proj"))
        .and(body_string_contains("25832"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(process_response(json!({}))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(api_path("locations/test_location")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;
    let mut client = connect(&server).await;

    let location = client.create_location("test_location", "25832").await?;
    assert_eq!(location.name(), "test_location");
    let locations = client.get_locations(false).await?;
    assert!(locations.contains_key("test_location"));
    assert!(locations.contains_key(LOCATION));

    // second creation is answered from the cache
    client.create_location("test_location", "25832").await?;

    client.delete_location("test_location").await?;
    assert!(!client.get_locations(false).await?.contains_key("test_location"));
    Ok(())
}

#[tokio::test]
async fn test_location_changes_need_credentials() -> AnyResult {
    let server = start_server().await;
    Mock::given(method("POST"))
        .and(path(api_path("locations/test_location")))
        .respond_with(ResponseTemplate::new(200).set_body_json(process_response(json!({}))))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(api_path("locations/test_location")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(0)
        .mount(&server)
        .await;
    let mut client = Actinia::builder(actinia_url(&server))
        .api_version("v3")
        .connect()
        .await?;

    let err = client
        .create_location("test_location", "25832")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
    let err = client.delete_location("test_location").await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
    Ok(())
}

#[tokio::test]
async fn test_process_chain_validation() -> AnyResult {
    let server = start_server().await;
    mount_listings(&server).await;
    Mock::given(method("POST"))
        .and(path(api_path("locations/nc_spm_08/process_chain_validation_sync")))
        .and(body_string_contains("r.info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "finished", "message": "Validation successful"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("locations/nc_spm_08/process_chain_validation_sync")))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"status": "error", "message": "Module r.nope not found"})),
        )
        .mount(&server)
        .await;
    let mut client = connect(&server).await;
    let location = test_location(&mut client).await;

    let valid = actinia::ProcessChainBody::new(vec![actinia::ProcessChainItem::new(
        "1",
        "r.info",
        [("map", "elevation@PERMANENT")],
    )]);
    let outcome = location.validate_process_chain_sync(valid).await?;
    assert_eq!(
        outcome,
        actinia::ValidationOutcome::Valid("Validation successful".to_string())
    );

    let invalid = json!({"version": "1", "list": [{"id": "1", "module": "r.nope", "inputs": []}]});
    let outcome = location.validate_process_chain_sync(invalid).await?;
    assert!(!outcome.is_valid());
    Ok(())
}

#[tokio::test]
async fn test_process_chain_validation_async() -> AnyResult {
    let server = start_server().await;
    mount_listings(&server).await;
    Mock::given(method("POST"))
        .and(path(api_path("locations/nc_spm_08/process_chain_validation_async")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(job_frame(&server, "v1", "accepted", "Resource accepted")),
        )
        .mount(&server)
        .await;
    let mut client = connect(&server).await;
    let job = test_location(&mut client)
        .await
        .validate_process_chain_async("{\"version\": \"1\", \"list\": []}".to_string(), None)
        .await?;
    assert_eq!(job.name(), "unknown_validation_job");
    assert_eq!(client.jobs().find_by_name("unknown_validation_job").len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_processing_export_job() -> AnyResult {
    let server = start_server().await;
    mount_listings(&server).await;
    Mock::given(method("POST"))
        .and(path(api_path("locations/nc_spm_08/processing_async_export")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(job_frame(&server, "e1", "accepted", "Resource accepted")),
        )
        .mount(&server)
        .await;
    let mut client = connect(&server).await;
    let job = test_location(&mut client)
        .await
        .create_processing_export_job(json!({"version": "1", "list": []}), Some("export"))
        .await?;
    assert_eq!(job.name(), "export");
    assert_eq!(job.urls().status.as_str(), status_url(&server, "e1"));
    Ok(())
}

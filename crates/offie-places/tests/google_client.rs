//! Integration tests for `GoogleMapsClient` using wiremock HTTP mocks.
//!
//! Each test stands up a local server, so no real traffic reaches Google.

use offie_core::{CategoryTag, Coordinate, GeocodeError, RawPlaceRecord};
use offie_places::{GoogleMapsClient, PlacesError};
use offie_search::{GeocodingProvider, PlaceSearchProvider};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CENTRE: Coordinate = Coordinate::new(51.5007, -0.1246);

/// Test client with retries enabled but no back-off delay.
fn test_client(base_url: &str) -> GoogleMapsClient {
    GoogleMapsClient::with_base_url("test-key", 5, base_url)
        .expect("client construction should not fail")
        .with_retry_policy(2, 0)
}

fn supermarket() -> CategoryTag {
    CategoryTag::new("supermarket")
}

// ---------------------------------------------------------------------------
// nearby search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn nearby_search_sends_query_and_parses_places() {
    let server = MockServer::start().await;

    let body = json!({
        "status": "OK",
        "results": [
            {
                "place_id": "ChIJ-tesco",
                "name": "Tesco Express",
                "vicinity": "22 Whitehall, London",
                "rating": 3.9,
                "geometry": { "location": { "lat": 51.5049, "lng": -0.1263 } }
            },
            {
                "place_id": "ChIJ-sainsburys",
                "name": "Sainsbury's Local",
                "vicinity": "Strand, London",
                "geometry": { "location": { "lat": 51.5081, "lng": -0.1248 } }
            },
            {
                "name": "Unidentified kiosk",
                "geometry": { "location": { "lat": 51.5, "lng": -0.12 } }
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .and(query_param("key", "test-key"))
        .and(query_param("location", "51.500700,-0.124600"))
        .and(query_param("radius", "1000"))
        .and(query_param("type", "supermarket"))
        .and(query_param("opennow", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client
        .nearby_search(CENTRE, 1000, &supermarket())
        .await
        .expect("nearby search should succeed");

    assert_eq!(records.len(), 2, "record without place_id is skipped");
    assert_eq!(
        records[0],
        RawPlaceRecord {
            place_id: "ChIJ-tesco".to_string(),
            name: "Tesco Express".to_string(),
            address: "22 Whitehall, London".to_string(),
            rating: Some(3.9),
            location: Some(Coordinate::new(51.5049, -0.1263)),
        }
    );
    assert_eq!(records[1].rating, None);
}

#[tokio::test]
async fn nearby_search_omits_opennow_when_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .and(query_param_is_missing("opennow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_open_now(false);
    let records = client
        .nearby_search(CENTRE, 500, &supermarket())
        .await
        .expect("zero results is not an error");

    assert!(records.is_empty());
}

#[tokio::test]
async fn over_query_limit_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OVER_QUERY_LIMIT",
            "error_message": "You have exceeded your daily request quota for this API.",
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search_nearby(CENTRE, 1000, &supermarket())
        .await
        .expect_err("quota status should fail");

    assert_eq!(err.code, "OVER_QUERY_LIMIT");
    assert_eq!(
        err.message.as_deref(),
        Some("You have exceeded your daily request quota for this API.")
    );
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [{
                "place_id": "p1",
                "name": "Spar",
                "geometry": { "location": { "lat": 51.501, "lng": -0.125 } }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client
        .nearby_search(CENTRE, 1000, &supermarket())
        .await
        .expect("second attempt should succeed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, "");
}

#[tokio::test]
async fn persistent_server_error_gives_up_without_leaking_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .nearby_search(CENTRE, 1000, &supermarket())
        .await
        .expect_err("should fail after retries");

    match &err {
        PlacesError::UnexpectedStatus { status, url } => {
            assert_eq!(*status, 500);
            assert!(!url.contains("test-key"), "url must be redacted: {url}");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
    assert!(!err.to_string().contains("test-key"));
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .nearby_search(CENTRE, 1000, &supermarket())
        .await
        .expect_err("html is not json");

    assert!(matches!(err, PlacesError::Deserialize { .. }));
}

// ---------------------------------------------------------------------------
// geocoding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn geocode_returns_first_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("address", "SW1A 2AA"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [
                {
                    "formatted_address": "10 Downing St, London SW1A 2AA, UK",
                    "geometry": { "location": { "lat": 51.5034, "lng": -0.1276 } }
                },
                {
                    "formatted_address": "Somewhere else",
                    "geometry": { "location": { "lat": 0.0, "lng": 0.0 } }
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let location = client
        .resolve_address("SW1A 2AA")
        .await
        .expect("address should resolve");

    assert_eq!(location, Coordinate::new(51.5034, -0.1276));
}

#[tokio::test]
async fn geocode_zero_results_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.geocode("qwertyuiop").await.unwrap(), None);

    let err = client.resolve_address("qwertyuiop").await.unwrap_err();
    assert_eq!(
        err,
        GeocodeError::NotFound {
            address: "qwertyuiop".to_string()
        }
    );
}

#[tokio::test]
async fn geocode_denied_maps_to_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.resolve_address("Oxford").await.unwrap_err();

    assert_eq!(
        err,
        GeocodeError::Provider {
            code: "REQUEST_DENIED".to_string()
        }
    );
}

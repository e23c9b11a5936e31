//! HTTP-level tests for the fetch client.
//!
//! Every upstream failure mode is produced by a local mock server and
//! checked against the error it must map to.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use statline_fetch::{
    FetchClient, FetchContext, FetchSettings, GraphQlClient, HttpErrorKind, PipelineError,
    RequestOptions, is_critical,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

#[derive(Debug, Deserialize, PartialEq)]
struct Team {
    id: u64,
    name: String,
}

fn client(server: &MockServer) -> FetchClient {
    FetchClient::builder(server.uri())
        .timeout(Duration::from_secs(5))
        .build()
        .expect("client should build")
}

// ============================================================================
// Success Paths
// ============================================================================

#[tokio::test]
async fn test_get_validates_typed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teams"))
        .and(query_param("season", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Boston"},
            {"id": 2, "name": "Toronto"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let teams: Vec<Team> = client(&server)
        .get("teams", &RequestOptions::new().query("season", 2024))
        .await
        .unwrap();

    assert_eq!(teams.len(), 2);
    assert_eq!(teams[1].name, "Toronto");
}

#[tokio::test]
async fn test_default_and_request_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("x-league", "nba"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = FetchClient::builder(server.uri())
        .bearer_token("secret-token")
        .header("x-league", "nba")
        .build()
        .unwrap();

    let rows: Vec<serde_json::Value> = client
        .get("/standings", &RequestOptions::new().header("x-trace", "abc"))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_get_text_returns_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let text = client(&server)
        .get_text("page", &RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(text, "<html>ok</html>");
}

// ============================================================================
// Error Mapping
// ============================================================================

#[tokio::test]
async fn test_429_maps_to_rate_limit_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get::<Vec<Team>>("teams", &RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::RateLimit {
            retry_after_ms: Some(2000),
            ..
        }
    ));
}

#[tokio::test]
async fn test_429_without_header_leaves_retry_after_unset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client(&server)
        .get::<Vec<Team>>("teams", &RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::RateLimit {
            retry_after_ms: None,
            ..
        }
    ));
}

#[tokio::test]
async fn test_non_success_maps_to_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server)
        .get::<Vec<Team>>("teams", &RequestOptions::default())
        .await
        .unwrap_err();

    match &err {
        PipelineError::Http {
            status_code,
            method,
            kind,
            url,
        } => {
            assert_eq!(*status_code, 401);
            assert_eq!(method, "GET");
            assert_eq!(*kind, HttpErrorKind::Status);
            assert!(url.ends_with("/teams"));
        }
        other => panic!("expected Http, got {other:?}"),
    }
    assert!(!is_critical(&err));
}

#[tokio::test]
async fn test_malformed_body_maps_to_http_parse_subtype() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get::<Vec<Team>>("teams", &RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Http {
            status_code: 200,
            kind: HttpErrorKind::MalformedBody { .. },
            ..
        }
    ));
    assert!(!is_critical(&err));
}

#[tokio::test]
async fn test_shape_mismatch_maps_to_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "one"}])))
        .mount(&server)
        .await;

    let err = client(&server)
        .get::<Vec<Team>>("teams", &RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Parse { .. }));
    assert!(!is_critical(&err));
}

#[tokio::test]
async fn test_slow_response_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .get::<Vec<Team>>(
            "teams",
            &RequestOptions::new().timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PipelineError::Timeout {
            url: format!("{}/teams", server.uri()),
            timeout_ms: 50,
        }
    );
}

#[tokio::test]
async fn test_refused_connection_maps_to_network() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = FetchClient::builder(format!("http://127.0.0.1:{port}"))
        .build()
        .unwrap();
    let err = client
        .get::<Vec<Team>>("teams", &RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Network { .. }));
    assert!(err.is_transient());
    assert!(is_critical(&err));
}

// ============================================================================
// GraphQL
// ============================================================================

#[derive(Debug, Deserialize)]
struct TeamsData {
    teams: Vec<Team>,
}

#[tokio::test]
async fn test_graphql_returns_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({"variables": {"season": 2024}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"teams": [{"id": 7, "name": "Minnesota"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gql = GraphQlClient::new(client(&server), "graphql");
    let data: TeamsData = gql
        .query("query { teams { id name } }", json!({"season": 2024}))
        .await
        .unwrap();

    assert_eq!(
        data.teams,
        vec![Team {
            id: 7,
            name: "Minnesota".to_string()
        }]
    );
}

#[tokio::test]
async fn test_graphql_errors_array_is_graphql_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Cannot query field \"rosterz\"", "path": ["rosterz"]}]
        })))
        .mount(&server)
        .await;

    let gql = GraphQlClient::new(client(&server), "graphql");
    let err = gql
        .query::<TeamsData>("query { rosterz }", json!({}))
        .await
        .unwrap_err();

    match &err {
        PipelineError::GraphQl { messages, .. } => {
            assert_eq!(messages.len(), 1);
            assert!(messages[0].contains("rosterz"));
        }
        other => panic!("expected GraphQl, got {other:?}"),
    }
    assert!(!is_critical(&err));
}

#[tokio::test]
async fn test_graphql_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "boom"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = FetchContext::with_settings(FetchSettings {
        max_attempts: 4,
        retry_base_delay: Duration::from_millis(1),
        ..FetchSettings::default()
    });
    let gql = GraphQlClient::new(client(&server), "graphql");

    let result = ctx
        .call(|| gql.query::<TeamsData>("query { teams { id } }", json!({})))
        .await;
    assert!(matches!(result, Err(PipelineError::GraphQl { .. })));
}

// ============================================================================
// Retry Composition Against a Live Server
// ============================================================================

#[tokio::test]
async fn test_context_waits_out_rate_limit_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "A"}])))
        .mount(&server)
        .await;

    let ctx = FetchContext::new();
    let client = client(&server);
    let options = RequestOptions::default();
    let teams: Vec<Team> = ctx
        .call(|| client.get("teams", &options))
        .await
        .unwrap();

    assert_eq!(teams.len(), 1);
}

#[tokio::test]
async fn test_context_does_not_retry_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = FetchContext::new();
    let client = client(&server);
    let options = RequestOptions::default();
    let result = ctx
        .call(|| client.get::<Vec<Team>>("teams", &options))
        .await;

    assert!(matches!(
        result,
        Err(PipelineError::Http {
            status_code: 503,
            ..
        })
    ));
}

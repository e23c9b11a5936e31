//! HTTP-level tests for the concrete sources.
//!
//! Fetchers are built through the registry against a local mock server,
//! so configuration, auth headers and retries are exercised together.

use std::sync::Arc;

use serde_json::json;
use statline_core::SourceKind;
use statline_fetch::{FetchClient, FetchContext, PipelineError};
use statline_sources::{NbaFetcher, SourceFetcher, SourceRegistry};
use statline_store::{Config, SourceConfig};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param, query_param_is_missing},
};

fn config(server: &MockServer, kind: SourceKind) -> Config {
    let mut config = Config::default();
    config.fetch.retry_base_delay_ms = 0;
    config.fetch.retry_max_delay_ms = 0;
    config.fetch.rate_limit_default_wait_ms = 0;
    config.fetch.rate_limit_max_wait_ms = 0;
    config.sources.insert(
        kind.cli_name().to_string(),
        SourceConfig {
            base_url: Some(server.uri()),
            token: Some("test-token".to_string()),
            ..SourceConfig::default()
        },
    );
    config
}

fn fetcher(server: &MockServer, kind: SourceKind) -> Arc<dyn SourceFetcher> {
    SourceRegistry::build_fetcher_with(kind, &config(server, kind), |_| None)
        .expect("fetcher should build")
}

// ============================================================================
// NBA
// ============================================================================

#[tokio::test]
async fn test_nba_teams_keep_every_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teams"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 1, "abbreviation": "ATL", "city": "Atlanta"},
                {"id": 2, "abbreviation": "BOS", "city": "Boston"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let teams = fetcher(&server, SourceKind::Nba)
        .fetch_entity("2024", "teams")
        .await
        .unwrap();

    assert_eq!(teams.len(), 2);
    assert_eq!(teams[1], json!({"id": 2, "abbreviation": "BOS", "city": "Boston"}));
}

#[tokio::test]
async fn test_nba_games_follow_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("seasons[]", "2024"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 10}, {"id": 11}],
            "meta": {"next_cursor": 11, "per_page": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("cursor", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 12}],
            "meta": {"per_page": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let games = fetcher(&server, SourceKind::Nba)
        .fetch_entity("2024", "games")
        .await
        .unwrap();

    let ids: Vec<_> = games.iter().map(|g| g["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![10, 11, 12]);
}

#[tokio::test]
async fn test_nba_listing_past_page_limit_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1}],
            "meta": {"next_cursor": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/games"))
        .and(query_param("cursor", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 2}],
            "meta": {"next_cursor": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = FetchClient::builder(server.uri()).build().unwrap();
    let fetcher = NbaFetcher::new(client, FetchContext::new()).with_max_pages(2);
    let err = fetcher.fetch_entity("2024", "games").await.unwrap_err();

    match &err {
        PipelineError::Parse { cause, .. } => assert!(cause.contains("2 pages")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_nba_standings_without_team_id_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/standings"))
        .and(query_param("season", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"team": {"name": "Celtics"}, "wins": 61}]
        })))
        .mount(&server)
        .await;

    let err = fetcher(&server, SourceKind::Nba)
        .fetch_entity("2024", "standings")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Parse { .. }));
    assert!(!err.is_critical());
}

#[tokio::test]
async fn test_nba_team_details_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teams/14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 14, "full_name": "Los Angeles Lakers"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let team = fetcher(&server, SourceKind::Nba)
        .fetch_item("2024", "team_details", "14")
        .await
        .unwrap();

    assert_eq!(team, json!({"id": 14, "full_name": "Los Angeles Lakers"}));
}

#[tokio::test]
async fn test_nba_rate_limit_is_waited_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 1}]})))
        .mount(&server)
        .await;

    let teams = fetcher(&server, SourceKind::Nba)
        .fetch_entity("2024", "teams")
        .await
        .unwrap();

    assert_eq!(teams.len(), 1);
}

#[tokio::test]
async fn test_unknown_entity_is_recoverable() {
    let server = MockServer::start().await;

    let err = fetcher(&server, SourceKind::Nba)
        .fetch_entity("2024", "rosters")
        .await
        .unwrap_err();

    assert!(!err.is_critical());
}

// ============================================================================
// PWHL
// ============================================================================

#[tokio::test]
async fn test_pwhl_teams_query_sends_season_variable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({"variables": {"season": 2024}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"teams": [
                {"id": "1", "name": "Boston Fleet", "code": "BOS"},
                {"id": "3", "name": "Montreal Victoire", "code": "MTL"}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let teams = fetcher(&server, SourceKind::Pwhl)
        .fetch_entity("2024", "teams")
        .await
        .unwrap();

    assert_eq!(teams.len(), 2);
    assert_eq!(teams[1]["code"], "MTL");
}

#[tokio::test]
async fn test_pwhl_null_listing_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"schedule": null}})))
        .mount(&server)
        .await;

    let games = fetcher(&server, SourceKind::Pwhl)
        .fetch_entity("2025", "schedule")
        .await
        .unwrap();

    assert!(games.is_empty());
}

#[tokio::test]
async fn test_pwhl_missing_field_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"other": []}})))
        .mount(&server)
        .await;

    let err = fetcher(&server, SourceKind::Pwhl)
        .fetch_entity("2024", "players")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Parse { .. }));
}

#[tokio::test]
async fn test_pwhl_roster_fans_out_by_team() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({"variables": {"season": 2024, "teamId": "3"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"roster": {"teamId": "3", "players": [{"id": 77, "lastName": "Poulin"}]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let roster = fetcher(&server, SourceKind::Pwhl)
        .fetch_item("2024", "rosters", "3")
        .await
        .unwrap();

    assert_eq!(roster["teamId"], "3");
    assert_eq!(roster["players"][0]["lastName"], "Poulin");
}

#[tokio::test]
async fn test_pwhl_graphql_errors_surface() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "season not found"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(&server, SourceKind::Pwhl)
        .fetch_entity("1999", "standings")
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::GraphQl { .. }));
    assert!(!err.is_critical());
}

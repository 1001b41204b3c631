use super::*;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use shared::error::ErrorCode;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    analysis_requests: Arc<Mutex<Vec<AnalyzeBusinessRequest>>>,
    headline_requests: Arc<Mutex<Vec<RegenerateHeadlineQuery>>>,
    rating: Arc<Mutex<Option<f64>>>,
    fail_with: Arc<Mutex<Option<StatusCode>>>,
}

async fn handle_analysis(
    State(state): State<ServerState>,
    Json(payload): Json<AnalyzeBusinessRequest>,
) -> axum::response::Response {
    state.analysis_requests.lock().await.push(payload);
    if let Some(status) = *state.fail_with.lock().await {
        return (
            status,
            Json(ApiError::new(ErrorCode::Unavailable, "model warming up")),
        )
            .into_response();
    }
    let rating = state.rating.lock().await.unwrap_or(4.6);
    Json(serde_json::json!({
        "rating": rating,
        "reviews": 312,
        "headline": "Austin's Coziest Corner",
    }))
    .into_response()
}

async fn handle_headline(
    State(state): State<ServerState>,
    Query(query): Query<RegenerateHeadlineQuery>,
) -> axum::response::Response {
    let headline = format!("{}'s Hidden Gem", query.location);
    state.headline_requests.lock().await.push(query);
    if let Some(status) = *state.fail_with.lock().await {
        return status.into_response();
    }
    Json(HeadlineResponse { headline }).into_response()
}

async fn spawn_backend_server() -> std::io::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/business-data", post(handle_analysis))
        .route("/api/regenerate-headline", get(handle_headline))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

#[tokio::test]
async fn analyze_posts_query_and_decodes_payload() {
    let (server_url, state) = spawn_backend_server().await.expect("spawn server");
    let backend = HttpAnalysisBackend::new(&server_url, None).expect("backend");

    let analysis = backend
        .analyze(&BusinessQuery::new("Green Valley Cafe", "Austin"))
        .await
        .expect("analysis");

    assert_eq!(analysis.rating, 4.6);
    assert_eq!(analysis.reviews, 312);
    assert_eq!(analysis.headline, "Austin's Coziest Corner");
    let requests = state.analysis_requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].name, "Green Valley Cafe");
    assert_eq!(requests[0].location, "Austin");
}

#[tokio::test]
async fn regenerate_headline_encodes_query_parameters() {
    let (server_url, state) = spawn_backend_server().await.expect("spawn server");
    let backend = HttpAnalysisBackend::new(&server_url, None).expect("backend");

    let headline = backend
        .regenerate_headline(&BusinessQuery::new("Tom & Jerry's Diner", "St. Paul, MN"))
        .await
        .expect("headline");

    assert_eq!(headline, "St. Paul, MN's Hidden Gem");
    let requests = state.headline_requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].name, "Tom & Jerry's Diner");
    assert_eq!(requests[0].location, "St. Paul, MN");
}

#[tokio::test]
async fn non_success_status_carries_error_body() {
    let (server_url, state) = spawn_backend_server().await.expect("spawn server");
    *state.fail_with.lock().await = Some(StatusCode::SERVICE_UNAVAILABLE);
    let backend = HttpAnalysisBackend::new(&server_url, None).expect("backend");

    let err = backend
        .analyze(&BusinessQuery::new("Green Valley Cafe", "Austin"))
        .await
        .expect_err("must fail");

    match err {
        RequestFailure::Status {
            endpoint,
            status,
            detail,
        } => {
            assert_eq!(endpoint, Endpoint::Analysis);
            assert_eq!(status, 503);
            assert_eq!(detail.map(|d| d.message), Some("model warming up".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn headline_failure_without_body_maps_to_status() {
    let (server_url, state) = spawn_backend_server().await.expect("spawn server");
    *state.fail_with.lock().await = Some(StatusCode::INTERNAL_SERVER_ERROR);
    let backend = HttpAnalysisBackend::new(&server_url, None).expect("backend");

    let err = backend
        .regenerate_headline(&BusinessQuery::new("Green Valley Cafe", "Austin"))
        .await
        .expect_err("must fail");

    assert!(matches!(
        err,
        RequestFailure::Status {
            endpoint: Endpoint::Headline,
            status: 500,
            detail: None,
        }
    ));
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let (server_url, state) = spawn_backend_server().await.expect("spawn server");
    *state.rating.lock().await = Some(7.5);
    let backend = HttpAnalysisBackend::new(&server_url, None).expect("backend");

    let err = backend
        .analyze(&BusinessQuery::new("Green Valley Cafe", "Austin"))
        .await
        .expect_err("must fail");

    assert!(
        matches!(err, RequestFailure::InvalidPayload { endpoint: Endpoint::Analysis, .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let backend = HttpAnalysisBackend::new(&format!("http://{addr}"), Some(Duration::from_secs(5)))
        .expect("backend");

    let err = backend
        .analyze(&BusinessQuery::new("Green Valley Cafe", "Austin"))
        .await
        .expect_err("must fail");

    assert!(
        matches!(err, RequestFailure::Transport { endpoint: Endpoint::Analysis, .. }),
        "unexpected error: {err}"
    );
}

#[test]
fn endpoint_urls_keep_base_path_prefix() {
    let backend = HttpAnalysisBackend::new("https://intel.example.com/app", None).expect("backend");
    assert_eq!(
        backend.analysis_url().as_str(),
        "https://intel.example.com/app/api/business-data"
    );
    assert_eq!(
        backend.headline_url().as_str(),
        "https://intel.example.com/app/api/regenerate-headline"
    );
}

#[test]
fn rejects_unusable_base_urls() {
    assert!(matches!(
        HttpAnalysisBackend::new("not a url", None),
        Err(HttpBackendSetupError::BaseUrl { .. })
    ));
    assert!(matches!(
        HttpAnalysisBackend::new("ftp://intel.example.com", None),
        Err(HttpBackendSetupError::Scheme(_))
    ));
}

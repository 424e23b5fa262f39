// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. Read endpoints are public. Endpoints
// that mutate the scorer (register, simulate, clear) require a valid Bearer
// token checked via the `AuthBearer` extractor.
//
// CORS is configured permissively for development; tighten `allow_origin`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::api::auth::AuthBearer;
use crate::app_state::AppState;
use crate::report::{format_score, generate_html_report, group_by_classification};
use crate::risk::RiskThresholds;
use crate::runtime_config::RuntimeConfig;
use crate::signals::analytics::DEFAULT_ANOMALY_THRESHOLD;
use crate::signals::{MetricContribution, RiskWeights, ScoreTrend, DEFAULT_RECENT_COUNT};
use crate::simulation::{simulate_input, DEFAULT_SAMPLE_COUNT};
use crate::types::{Metrics, RiskBand, RiskReport, Signal};

/// Upper bound on a single `/simulate` request.
pub const MAX_SIMULATE_COUNT: usize = 10_000;

pub const DEFAULT_TREND_WINDOW: usize = 5;
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.3;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        .route("/api/v1/config", get(config))
        .route("/api/v1/report", get(report))
        .route("/api/v1/signals", get(list_signals).post(register_signal))
        .route("/api/v1/signals/recent", get(recent_signals))
        .route("/api/v1/signals/sorted", get(sorted_signals))
        .route("/api/v1/signals/grouped", get(grouped_signals))
        .route("/api/v1/signals/export", get(export_signals))
        .route("/api/v1/signals/report.html", get(html_report))
        .route("/api/v1/signals/anomalies", get(anomalous_signals))
        .route("/api/v1/signals/trend", get(score_trend))
        .route("/api/v1/score", post(score))
        // ── Authenticated ───────────────────────────────────────────
        .route("/api/v1/simulate", post(simulate))
        .route("/api/v1/signals/clear", post(clear_signals))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    signals: usize,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        signals: state.scorer.read().len(),
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Serialize)]
struct ConfigResponse {
    run: RuntimeConfig,
    thresholds: RiskThresholds,
    weights: RiskWeights,
}

async fn config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let scorer = state.scorer.read();
    Json(ConfigResponse {
        run: state.runtime_config.clone(),
        thresholds: *scorer.thresholds(),
        weights: *scorer.weights(),
    })
}

// =============================================================================
// Read endpoints
// =============================================================================

async fn report(State(state): State<Arc<AppState>>) -> Json<RiskReport> {
    Json(state.scorer.read().report())
}

#[derive(Deserialize)]
struct LevelQuery {
    level: Option<String>,
}

async fn list_signals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LevelQuery>,
) -> Json<Vec<Signal>> {
    let scorer = state.scorer.read();
    let signals = match query.level.as_deref() {
        Some(level) => scorer.filter_signals(level),
        None => scorer.signals().to_vec(),
    };
    Json(signals)
}

#[derive(Deserialize)]
struct RecentQuery {
    count: Option<usize>,
}

async fn recent_signals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<Signal>> {
    let count = query.count.unwrap_or(DEFAULT_RECENT_COUNT);
    Json(state.scorer.read().recent_signals(count))
}

#[derive(Deserialize)]
struct SortQuery {
    order: Option<String>,
}

async fn sorted_signals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SortQuery>,
) -> Result<Json<Vec<Signal>>, ApiError> {
    let order = query.order.map(|o| o.to_ascii_lowercase());
    let descending = match order.as_deref() {
        None | Some("desc") => true,
        Some("asc") => false,
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "Invalid order: '{other}'. Use 'asc' or 'desc'."
            )))
        }
    };
    Ok(Json(state.scorer.read().sort_signals_by_score(descending)))
}

async fn grouped_signals(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let groups = group_by_classification(state.scorer.read().signals());
    Json(groups)
}

async fn export_signals(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.scorer.read().export_signals();
    ([(header::CONTENT_TYPE, "application/json")], body)
}

async fn html_report(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(generate_html_report(state.scorer.read().signals()))
}

// =============================================================================
// Score analytics
// =============================================================================

#[derive(Deserialize)]
struct AnomalyQuery {
    threshold: Option<f64>,
}

async fn anomalous_signals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnomalyQuery>,
) -> Result<Json<Vec<Signal>>, ApiError> {
    let threshold = query.threshold.unwrap_or(DEFAULT_ANOMALY_THRESHOLD);
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ApiError::bad_request(
            "threshold must be a non-negative number",
        ));
    }
    Ok(Json(state.scorer.read().anomalous_signals(threshold)))
}

#[derive(Deserialize)]
struct TrendQuery {
    window: Option<usize>,
    alpha: Option<f64>,
}

async fn score_trend(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<ScoreTrend>, ApiError> {
    let window = query.window.unwrap_or(DEFAULT_TREND_WINDOW);
    let alpha = query.alpha.unwrap_or(DEFAULT_SMOOTHING_ALPHA);
    if window == 0 {
        return Err(ApiError::bad_request("window must be at least 1"));
    }
    if !(0.0..=1.0).contains(&alpha) {
        return Err(ApiError::bad_request("alpha must be within [0, 1]"));
    }
    Ok(Json(state.scorer.read().score_trend(window, alpha)))
}

// =============================================================================
// Stateless scoring
// =============================================================================

#[derive(Deserialize)]
struct NormalizeRequest {
    value: f64,
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct ScoreRequest {
    #[serde(default)]
    metrics: Metrics,
    #[serde(default)]
    normalize: Option<NormalizeRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreResponse {
    composite_score: f64,
    classification: RiskBand,
    formatted: String,
    contributions: Vec<MetricContribution>,
    /// Serialised as `null` when the range is degenerate (non-finite result).
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized: Option<f64>,
}

async fn score(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScoreRequest>,
) -> Json<ScoreResponse> {
    let scorer = state.scorer.read();
    let composite_score = scorer.calculate_composite_score(&req.metrics);

    Json(ScoreResponse {
        composite_score,
        classification: scorer.classify_score(composite_score),
        formatted: format_score(composite_score),
        contributions: scorer.weights().breakdown(&req.metrics),
        normalized: req
            .normalize
            .map(|n| scorer.normalize_signal(n.value, n.min, n.max)),
    })
}

// =============================================================================
// Mutating endpoints (authenticated)
// =============================================================================

#[derive(Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    metrics: Metrics,
}

async fn register_signal(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    let id = req
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let signal = state.scorer.write().register_signal(id, &req.metrics);
    state.increment_version();
    info!(
        id = %signal.id,
        score = signal.composite_score,
        classification = %signal.classification,
        "signal registered via API"
    );

    (StatusCode::CREATED, Json(signal))
}

fn default_simulate_count() -> usize {
    DEFAULT_SAMPLE_COUNT
}

#[derive(Deserialize)]
struct SimulateRequest {
    #[serde(default = "default_simulate_count")]
    count: usize,
}

#[derive(Serialize)]
struct SimulateResponse {
    registered: usize,
    total: usize,
}

async fn simulate(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    if req.count > MAX_SIMULATE_COUNT {
        return Err(ApiError::bad_request(format!(
            "count {} exceeds the limit of {}",
            req.count, MAX_SIMULATE_COUNT
        )));
    }

    let total = {
        let mut generator = state.generator.lock();
        let mut scorer = state.scorer.write();
        simulate_input(&mut scorer, &mut generator, req.count);
        scorer.len()
    };
    state.increment_version();

    Ok(Json(SimulateResponse {
        registered: req.count,
        total,
    }))
}

#[derive(Serialize)]
struct ClearResponse {
    cleared: usize,
    total: usize,
}

async fn clear_signals(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
) -> Json<ClearResponse> {
    let cleared = {
        let mut scorer = state.scorer.write();
        let n = scorer.len();
        scorer.clear_signals();
        n
    };
    state.increment_version();
    warn!(cleared, "signal store cleared via API");

    Json(ClearResponse { cleared, total: 0 })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalScorer;
    use crate::simulation::MetricsGenerator;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const TOKEN: &str = "test-token";

    fn app(token: Option<&str>) -> Router {
        let state = Arc::new(AppState::new(
            RuntimeConfig::default(),
            SignalScorer::new(),
            MetricsGenerator::new(Some(11)),
            token.map(str::to_string),
        ));
        router(state)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_req(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, body) = send(app, req).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    fn ones() -> serde_json::Value {
        serde_json::json!({
            "volatility": 1.0,
            "liquidity": 1.0,
            "txRate": 1.0,
            "walletDistribution": 1.0,
            "socialSentiment": 1.0
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = app(None);
        let (status, json) = send_json(&app, get_req("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"].as_str(), Some("ok"));
        assert_eq!(json["signals"].as_u64(), Some(0));
    }

    #[tokio::test]
    async fn config_exposes_fixed_constants() {
        let app = app(None);
        let (status, json) = send_json(&app, get_req("/api/v1/config")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["thresholds"]["highRisk"].as_f64(), Some(0.85));
        assert_eq!(json["weights"]["volatility"].as_f64(), Some(0.3));
        assert_eq!(json["run"]["sample_count"].as_u64(), Some(100));
    }

    #[tokio::test]
    async fn mutation_requires_token() {
        let app = app(Some(TOKEN));
        let body = serde_json::json!({ "id": "t1", "metrics": ones() });

        let (status, _) = send_json(&app, post_req("/api/v1/signals", None, body.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) =
            send_json(&app, post_req("/api/v1/signals", Some("wrong"), body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, report) = send_json(&app, get_req("/api/v1/report")).await;
        assert_eq!(report["total"].as_u64(), Some(0));
    }

    #[tokio::test]
    async fn mutation_rejected_when_no_token_configured() {
        let app = app(None);
        let (status, json) = send_json(
            &app,
            post_req("/api/v1/signals/clear", Some(TOKEN), serde_json::json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn register_then_report() {
        let app = app(Some(TOKEN));
        let body = serde_json::json!({ "id": "t1", "metrics": ones() });
        let (status, signal) = send_json(&app, post_req("/api/v1/signals", Some(TOKEN), body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(signal["id"].as_str(), Some("t1"));
        assert_eq!(signal["compositeScore"].as_f64(), Some(1.0));
        assert_eq!(signal["classification"].as_str(), Some("High Risk"));

        let (_, report) = send_json(&app, get_req("/api/v1/report")).await;
        assert_eq!(report["average"].as_str(), Some("1.0000"));
        assert_eq!(report["highRiskTxs"].as_u64(), Some(1));
        assert_eq!(report["total"].as_u64(), Some(1));
    }

    #[tokio::test]
    async fn register_without_id_gets_uuid() {
        let app = app(Some(TOKEN));
        let body = serde_json::json!({ "metrics": { "volatility": 0.5 } });
        let (status, signal) = send_json(&app, post_req("/api/v1/signals", Some(TOKEN), body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = signal["id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok(), "not a uuid: {id}");
        assert!((signal["compositeScore"].as_f64().unwrap() - 0.15).abs() < 1e-10);
        assert_eq!(signal["classification"].as_str(), Some("Very Low Risk"));
    }

    #[tokio::test]
    async fn simulate_then_query() {
        let app = app(Some(TOKEN));
        let (status, json) = send_json(
            &app,
            post_req("/api/v1/simulate", Some(TOKEN), serde_json::json!({ "count": 20 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["registered"].as_u64(), Some(20));
        assert_eq!(json["total"].as_u64(), Some(20));

        let (_, high) = send_json(&app, get_req("/api/v1/signals?level=High")).await;
        for s in high.as_array().unwrap() {
            assert_eq!(s["classification"].as_str(), Some("High Risk"));
        }

        let (_, recent) = send_json(&app, get_req("/api/v1/signals/recent?count=3")).await;
        let ids: Vec<&str> = recent
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["tx_18", "tx_19", "tx_20"]);

        let (_, sorted) = send_json(&app, get_req("/api/v1/signals/sorted")).await;
        let scores: Vec<f64> = sorted
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["compositeScore"].as_f64().unwrap())
            .collect();
        assert_eq!(scores.len(), 20);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let (_, all) = send_json(&app, get_req("/api/v1/signals")).await;
        let (status, export) = send(&app, get_req("/api/v1/signals/export")).await;
        assert_eq!(status, StatusCode::OK);
        let exported: serde_json::Value = serde_json::from_str(&export).unwrap();
        assert_eq!(exported, all);
    }

    #[tokio::test]
    async fn simulate_over_limit_is_bad_request() {
        let app = app(Some(TOKEN));
        let (status, json) = send_json(
            &app,
            post_req(
                "/api/v1/simulate",
                Some(TOKEN),
                serde_json::json!({ "count": MAX_SIMULATE_COUNT + 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("exceeds"));
    }

    #[tokio::test]
    async fn invalid_sort_order_is_bad_request() {
        let app = app(None);
        let (status, _) = send_json(&app, get_req("/api/v1/signals/sorted?order=sideways")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = send_json(&app, get_req("/api/v1/signals/sorted?order=ASC")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_empties_store() {
        let app = app(Some(TOKEN));
        send_json(
            &app,
            post_req("/api/v1/simulate", Some(TOKEN), serde_json::json!({ "count": 5 })),
        )
        .await;

        let (status, json) = send_json(
            &app,
            post_req("/api/v1/signals/clear", Some(TOKEN), serde_json::json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cleared"].as_u64(), Some(5));

        let (_, report) = send_json(&app, get_req("/api/v1/report")).await;
        assert_eq!(report["average"].as_str(), Some("0.0000"));
        assert_eq!(report["total"].as_u64(), Some(0));
    }

    #[tokio::test]
    async fn grouped_and_html_views() {
        let app = app(Some(TOKEN));
        let body = serde_json::json!({ "id": "<x>", "metrics": ones() });
        send_json(&app, post_req("/api/v1/signals", Some(TOKEN), body)).await;

        let (_, grouped) = send_json(&app, get_req("/api/v1/signals/grouped")).await;
        assert_eq!(grouped["High Risk"][0]["id"].as_str(), Some("<x>"));

        let response = app
            .clone()
            .oneshot(get_req("/api/v1/signals/report.html"))
            .await
            .unwrap();
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("<td>&lt;x&gt;</td><td>100.00%</td>"));
    }

    #[tokio::test]
    async fn anomalies_and_trend_views() {
        let app = app(Some(TOKEN));
        for (i, v) in [0.1, 0.12, 0.11, 0.09, 0.1, 0.95].iter().enumerate() {
            let body = serde_json::json!({
                "id": format!("tx_{}", i + 1),
                "metrics": {
                    "volatility": v,
                    "liquidity": v,
                    "txRate": v,
                    "walletDistribution": v,
                    "socialSentiment": v
                }
            });
            send_json(&app, post_req("/api/v1/signals", Some(TOKEN), body)).await;
        }

        let (status, anomalies) = send_json(&app, get_req("/api/v1/signals/anomalies")).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = anomalies
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["tx_6"]);

        let (status, trend) =
            send_json(&app, get_req("/api/v1/signals/trend?window=3&alpha=0.5")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(trend["window"].as_u64(), Some(3));
        assert_eq!(trend["movingAverage"].as_array().unwrap().len(), 4);
        assert_eq!(trend["smoothed"].as_array().unwrap().len(), 6);
        assert_eq!(trend["zScores"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn analytics_reject_bad_parameters() {
        let app = app(None);
        let (status, _) =
            send_json(&app, get_req("/api/v1/signals/anomalies?threshold=-1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_json(&app, get_req("/api/v1/signals/trend?window=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_json(&app, get_req("/api/v1/signals/trend?alpha=1.5")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, trend) = send_json(&app, get_req("/api/v1/signals/trend")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(trend["smoothed"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn score_is_stateless() {
        let app = app(None);
        let body = serde_json::json!({
            "metrics": ones(),
            "normalize": { "value": 2.0, "min": 2.0, "max": 2.0 }
        });
        let (status, json) = send_json(&app, post_req("/api/v1/score", None, body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["compositeScore"].as_f64(), Some(1.0));
        assert_eq!(json["classification"].as_str(), Some("High Risk"));
        assert_eq!(json["formatted"].as_str(), Some("100.00%"));
        assert_eq!(json["contributions"].as_array().unwrap().len(), 5);
        assert!(json["normalized"].is_null());

        let (_, health) = send_json(&app, get_req("/api/v1/health")).await;
        assert_eq!(health["signals"].as_u64(), Some(0));
    }
}

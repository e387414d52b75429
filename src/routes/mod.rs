//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - catalog, analysis, generation, execution and progress endpoints
/// - CORS from `[server].cors_origins` (`"*"` allows any origin)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(http::http_root))
        .route("/health", get(http::http_health))
        // Catalog
        .route("/patterns", get(http::http_list_patterns))
        .route("/patterns/:id", get(http::http_get_pattern))
        .route("/patterns/:id/statistics", get(http::http_pattern_statistics))
        // Analysis + generation
        .route("/ai/analyze", post(http::http_analyze))
        .route("/ai/enhanced-analysis", post(http::http_enhanced_analysis))
        .route("/ai/code-feedback", post(http::http_code_feedback))
        .route("/ai/generate-code", post(http::http_generate_code))
        .route("/ai/generate-detailed-code", post(http::http_generate_detailed_code))
        .route("/ai/code-explanation", post(http::http_code_explanation))
        .route("/ai/chat", post(http::http_chat))
        // Execution
        .route("/execute-code", post(http::http_execute_code))
        // Progress
        .route("/user/progress", post(http::http_save_progress))
        .route("/user/progress/:user_id", get(http::http_user_progress))
        .route("/leaderboard", get(http::http_leaderboard))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(target: "codepattern", origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(list))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use super::*;
    use crate::config::{AppConfig, ServerConfig};

    fn app() -> Router {
        build_router(Arc::new(AppState::offline(AppConfig::default())))
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        send(Request::builder().method(Method::GET).uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    #[tokio::test]
    async fn root_banner_lists_features() {
        let (status, body) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "CodePatternMaster API");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["features"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn patterns_can_be_filtered() {
        let (status, body) = get_json("/patterns?difficulty=EASY&limit=3").await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|p| p["difficulty"] == "easy"));

        let (_, diamonds) = get_json("/patterns?category=diamond").await;
        assert_eq!(diamonds.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_pattern_is_404() {
        let (status, body) = get_json("/patterns/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Pattern not found");

        let (status, body) = get_json("/patterns/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Right Triangle Pattern");
    }

    #[tokio::test]
    async fn detailed_code_by_name() {
        let (status, body) = post_json(
            "/ai/generate-detailed-code",
            json!({"pattern_name": "Right Triangle", "language": "python"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["generated_code"].as_str().unwrap().contains("for i in range(1, n + 1)"));
        assert_eq!(body["difficulty"], "easy");

        let (status, _) = post_json(
            "/ai/generate-detailed-code",
            json!({"pattern_name": "Invalid Pattern", "language": "python"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn execute_code_simulates_hello_world() {
        let (status, body) = post_json(
            "/execute-code",
            json!({"code": "console.log('Hello World');", "language": "javascript"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output"], "Hello World\n");
        assert_eq!(body["status"], "success");
        assert_eq!(body["language"], "javascript");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn execute_code_rejects_bad_input() {
        let (status, body) = post_json("/execute-code", json!({"code": "", "language": "python"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No code provided");

        let (status, _) = post_json("/execute-code", json!({"code": "puts 1", "language": "ruby"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn code_feedback_scores_submission() {
        let code = "n = 4\nfor i in range(n):\n    for j in range(n):\n        print('*', end='')\n    print()";
        let (status, body) = post_json(
            "/ai/code-feedback",
            json!({"pattern_id": 1, "user_code": code, "language": "python"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let score = body["correctness_score"].as_f64().unwrap();
        assert!((score - 0.8).abs() < 1e-6);

        let (status, _) = post_json(
            "/ai/code-feedback",
            json!({"pattern_id": 12345, "user_code": code, "language": "python"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn analysis_type_is_validated() {
        let (status, body) = post_json("/ai/analyze", json!({"pattern_id": 31, "analysis_type": "astrology"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid analysis type");

        let (status, body) = post_json("/ai/analyze", json!({"pattern_id": 31, "analysis_type": "visual"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"]["symmetry"], "symmetric");
    }

    #[tokio::test]
    async fn enhanced_analysis_falls_back_offline() {
        let (status, body) = post_json(
            "/ai/enhanced-analysis",
            json!({"pattern_id": 2, "user_code": "for i in range(4):\n  print('*' * i)"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model_used"], "Fallback");
        assert_eq!(body["database_saved"], false);
        assert_eq!(body["ai_analysis"]["ai_powered"], false);
    }

    #[tokio::test]
    async fn progress_endpoints_degrade_without_store() {
        let (status, body) = get_json("/user/progress/u-1?pattern_id=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], "u-1");
        assert_eq!(body["total_attempts"], 0);

        let (status, body) = get_json("/leaderboard?limit=5").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["leaderboard"].as_array().unwrap().is_empty());

        let (status, body) = get_json("/patterns/11/statistics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["statistics"]["total_attempts"], 0);
    }

    async fn allowed_origin(origins: &[&str], origin: &str) -> Option<String> {
        let config = AppConfig {
            server: ServerConfig { cors_origins: origins.iter().map(|o| o.to_string()).collect() },
            ..AppConfig::default()
        };
        let router = build_router(Arc::new(AppState::offline(config)));
        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/health")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn wildcard_origin_allows_any_caller() {
        let allowed = allowed_origin(&["*"], "http://anywhere.example").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn origin_list_skips_invalid_entries() {
        let origins = ["bad\norigin", "http://localhost:3000"];
        let allowed = allowed_origin(&origins, "http://localhost:3000").await;
        assert_eq!(allowed.as_deref(), Some("http://localhost:3000"));
        assert!(allowed_origin(&origins, "http://evil.example").await.is_none());
    }

    #[tokio::test]
    async fn blank_pattern_name_is_404() {
        let (status, _) = post_json(
            "/ai/generate-detailed-code",
            json!({"pattern_name": "  ", "language": "python"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn chat_replies_by_keyword() {
        let (status, body) = post_json("/ai/chat", json!({"message": "hello there"})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().starts_with("Hello!"));
        assert!(body["context"].is_null());
    }
}

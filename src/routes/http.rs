//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; submitted code is logged by length only.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info")]
pub async fn http_root() -> impl IntoResponse {
  Json(RootOut {
    message: "CodePatternMaster API",
    version: "1.0.0",
    status: "running",
    features: FEATURES.to_vec(),
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    status: "healthy",
    patterns: state.catalog.len(),
    model_enabled: state.model.is_some(),
    store_enabled: state.store.is_some(),
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_patterns(
  State(state): State<Arc<AppState>>,
  Query(q): Query<PatternQuery>,
) -> impl IntoResponse {
  let rows = list_patterns(&state, q);
  info!(target: "codepattern", count = rows.len(), "HTTP patterns listed");
  Json(rows)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_pattern(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u32>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(get_pattern(&state, id)?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_pattern_statistics(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u32>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(pattern_statistics(&state, id).await?))
}

#[instrument(level = "info", skip(state, body), fields(pattern_id = body.pattern_id, analysis_type = %body.analysis_type))]
pub async fn http_analyze(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnalyzeIn>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(analyze_pattern(&state, body)?))
}

#[instrument(level = "info", skip(state, body), fields(pattern_id = body.pattern_id))]
pub async fn http_enhanced_analysis(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnalyzeIn>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(enhanced_analysis(&state, body).await?))
}

#[instrument(level = "info", skip(state, body), fields(pattern_id = body.pattern_id, code_len = body.user_code.len()))]
pub async fn http_code_feedback(
  State(state): State<Arc<AppState>>,
  Json(body): Json<FeedbackIn>,
) -> Result<impl IntoResponse, ApiError> {
  let out = code_feedback(&state, body).await?;
  info!(target: "feedback", score = %format!("{:.2}", out.correctness_score), "HTTP code feedback served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(pattern_id = body.pattern_id, language = %body.language))]
pub async fn http_generate_code(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateCodeIn>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(generate_code(&state, body)?))
}

#[instrument(level = "info", skip(state, body), fields(pattern_name = %body.pattern_name, language = %body.language))]
pub async fn http_generate_detailed_code(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DetailedCodeIn>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(generate_detailed_code(&state, body)?))
}

#[instrument(level = "info", skip(state, body), fields(code_len = body.code.len()))]
pub async fn http_code_explanation(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ExplainIn>,
) -> impl IntoResponse {
  Json(explain_code(&state, body).await)
}

#[instrument(level = "info", skip(body), fields(message_len = body.message.len()))]
pub async fn http_chat(Json(body): Json<ChatIn>) -> impl IntoResponse {
  Json(chat(body))
}

#[instrument(level = "info", skip(state, body), fields(code_len = body.code.len(), language = %body.language))]
pub async fn http_execute_code(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ExecuteIn>,
) -> Result<impl IntoResponse, ApiError> {
  let out = execute_code(&state, body).await?;
  info!(target: "codepattern", status = ?out.status, execution_time = %out.execution_time, "HTTP execute-code served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(user_id = %body.user_id, pattern_id = body.pattern_id))]
pub async fn http_save_progress(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ProgressIn>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(save_progress(&state, body).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_user_progress(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  Query(q): Query<ProgressQuery>,
) -> impl IntoResponse {
  Json(user_progress(&state, user_id, q.pattern_id).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_leaderboard(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LeaderboardQuery>,
) -> impl IntoResponse {
  Json(leaderboard(&state, q.limit).await)
}

//! Learner progress persistence over a PostgREST endpoint (Supabase).
//!
//! Three tables: `user_progress`, `pattern_attempts`, `ai_analyses`.
//! Every public operation degrades instead of failing: writes report `false`,
//! reads come back empty or zeroed, and the cause is logged.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("store HTTP {status}: {message}")]
  Http { status: u16, message: String },
  #[error("store transport error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("invalid store credentials: {0}")]
  Credentials(String),
}

/// Client-supplied progress fields; anything missing takes its default.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProgressUpdate {
  pub progress: f64,
  pub time_spent: u64,
  pub attempts: u32,
  pub completed: bool,
  pub code: String,
  pub ai_feedback: Value,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct PatternStatistics {
  pub total_attempts: usize,
  pub success_rate: f64,
  pub average_time: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub difficulty_trend: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LeaderboardEntry {
  pub user_id: String,
  pub patterns_completed: usize,
  pub total_time: u64,
}

/// Minimal projections of stored rows used for aggregation.
#[derive(Clone, Debug, Deserialize)]
pub struct AttemptRow {
  #[serde(default)]
  pub success: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CompletionRow {
  pub user_id: String,
  pub pattern_id: u32,
  #[serde(default)]
  pub time_spent: Option<u64>,
}

#[derive(Clone)]
pub struct ProgressStore {
  client: reqwest::Client,
  base_url: String,
}

impl std::fmt::Debug for ProgressStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProgressStore").field("base_url", &self.base_url).finish_non_exhaustive()
  }
}

impl ProgressStore {
  /// Construct the store if SUPABASE_URL and SUPABASE_ANON_KEY are both set.
  pub fn from_env() -> Option<Self> {
    let url = std::env::var("SUPABASE_URL").ok()?;
    let key = std::env::var("SUPABASE_ANON_KEY").ok()?;
    match Self::new(&url, &key) {
      Ok(store) => {
        info!(target: "codepattern", base_url = %store.base_url, "Progress store configured");
        Some(store)
      }
      Err(e) => {
        error!(target: "codepattern", error = %e, "Failed to configure progress store");
        None
      }
    }
  }

  pub fn new(url: &str, key: &str) -> Result<Self, StoreError> {
    let mut headers = HeaderMap::new();
    let apikey = HeaderValue::from_str(key).map_err(|e| StoreError::Credentials(e.to_string()))?;
    let bearer = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| StoreError::Credentials(e.to_string()))?;
    headers.insert("apikey", apikey);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .default_headers(headers)
      .build()?;
    Ok(Self { client, base_url: format!("{}/rest/v1", url.trim_end_matches('/')) })
  }

  async fn insert(&self, table: &str, row: &Value) -> Result<(), StoreError> {
    let res = self.client
      .post(format!("{}/{}", self.base_url, table))
      .header("Prefer", "return=minimal")
      .json(row)
      .send()
      .await?;
    check(res).await.map(|_| ())
  }

  async fn select<T: for<'de> Deserialize<'de>>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>, StoreError> {
    let res = self.client.get(format!("{}/{}", self.base_url, table)).query(query).send().await?;
    Ok(check(res).await?.json::<Vec<T>>().await?)
  }

  #[instrument(level = "info", skip(self, update))]
  pub async fn save_user_progress(&self, user_id: &str, pattern_id: u32, update: &ProgressUpdate) -> bool {
    let row = json!({
      "user_id": user_id,
      "pattern_id": pattern_id,
      "progress_percentage": update.progress,
      "time_spent": update.time_spent,
      "attempts": update.attempts.max(1),
      "completed": update.completed,
      "last_attempt_at": Utc::now().to_rfc3339(),
      "code_submitted": update.code,
      "ai_feedback": if update.ai_feedback.is_null() { json!({}) } else { update.ai_feedback.clone() },
    });
    report("user_progress", self.insert("user_progress", &row).await)
  }

  /// Newest first; optionally narrowed to one pattern.
  #[instrument(level = "info", skip(self))]
  pub async fn get_user_progress(&self, user_id: &str, pattern_id: Option<u32>) -> Vec<Value> {
    let mut query = vec![
      ("select", "*".to_string()),
      ("user_id", format!("eq.{user_id}")),
      ("order", "last_attempt_at.desc".to_string()),
    ];
    if let Some(id) = pattern_id {
      query.push(("pattern_id", format!("eq.{id}")));
    }
    self.select::<Value>("user_progress", &query).await.unwrap_or_else(|e| {
      error!(target: "codepattern", error = %e, "Failed to read user progress");
      vec![]
    })
  }

  #[instrument(level = "info", skip(self, code), fields(code_len = code.len()))]
  pub async fn save_pattern_attempt(&self, user_id: &str, pattern_id: u32, code: &str, success: bool) -> bool {
    let row = json!({
      "user_id": user_id,
      "pattern_id": pattern_id,
      "code_submitted": code,
      "success": success,
      "attempted_at": Utc::now().to_rfc3339(),
      "ai_analysis": {},
    });
    report("pattern_attempts", self.insert("pattern_attempts", &row).await)
  }

  #[instrument(level = "info", skip(self))]
  pub async fn get_pattern_statistics(&self, pattern_id: u32) -> PatternStatistics {
    let query = [("select", "success".to_string()), ("pattern_id", format!("eq.{pattern_id}"))];
    match self.select::<AttemptRow>("pattern_attempts", &query).await {
      Ok(rows) => compute_statistics(&rows),
      Err(e) => {
        error!(target: "codepattern", error = %e, "Failed to read pattern statistics");
        PatternStatistics::default()
      }
    }
  }

  #[instrument(level = "info", skip(self))]
  pub async fn get_leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
    let query = [
      ("select", "user_id,pattern_id,time_spent".to_string()),
      ("completed", "eq.true".to_string()),
    ];
    match self.select::<CompletionRow>("user_progress", &query).await {
      Ok(rows) => build_leaderboard(&rows, limit),
      Err(e) => {
        error!(target: "codepattern", error = %e, "Failed to read leaderboard");
        vec![]
      }
    }
  }

  #[instrument(level = "info", skip(self, suggestions, explanation))]
  pub async fn save_ai_analysis(
    &self,
    user_id: &str,
    pattern_id: u32,
    analysis_type: &str,
    complexity_score: f32,
    suggestions: &[String],
    explanation: &str,
  ) -> bool {
    let row = json!({
      "user_id": user_id,
      "pattern_id": pattern_id,
      "analysis_type": analysis_type,
      "complexity_score": complexity_score,
      "suggestions": suggestions,
      "explanation": explanation,
      "analyzed_at": Utc::now().to_rfc3339(),
    });
    report("ai_analyses", self.insert("ai_analyses", &row).await)
  }
}

async fn check(res: reqwest::Response) -> Result<reqwest::Response, StoreError> {
  if res.status().is_success() {
    return Ok(res);
  }
  let status = res.status().as_u16();
  let message = res.text().await.unwrap_or_default();
  Err(StoreError::Http { status, message })
}

fn report(table: &str, res: Result<(), StoreError>) -> bool {
  match res {
    Ok(()) => {
      info!(target: "codepattern", %table, "Row saved");
      true
    }
    Err(e) => {
      warn!(target: "codepattern", %table, error = %e, "Failed to save row");
      false
    }
  }
}

/// Attempts for one pattern reduced to counts and a trend label.
pub fn compute_statistics(rows: &[AttemptRow]) -> PatternStatistics {
  if rows.is_empty() {
    return PatternStatistics::default();
  }
  let total = rows.len();
  let successes = rows.iter().filter(|r| r.success).count();
  let trend = if successes as f64 > total as f64 * 0.7 { "increasing" } else { "challenging" };
  PatternStatistics {
    total_attempts: total,
    success_rate: successes as f64 / total as f64,
    average_time: 0.0,
    difficulty_trend: Some(trend.to_string()),
  }
}

/// Distinct completed patterns per user; more completions first, then less time.
pub fn build_leaderboard(rows: &[CompletionRow], limit: usize) -> Vec<LeaderboardEntry> {
  let mut per_user: HashMap<&str, (Vec<u32>, u64)> = HashMap::new();
  for row in rows {
    let entry = per_user.entry(row.user_id.as_str()).or_default();
    if !entry.0.contains(&row.pattern_id) {
      entry.0.push(row.pattern_id);
    }
    entry.1 += row.time_spent.unwrap_or(0);
  }
  let mut board: Vec<LeaderboardEntry> = per_user
    .into_iter()
    .map(|(user, (patterns, time))| LeaderboardEntry {
      user_id: user.to_string(),
      patterns_completed: patterns.len(),
      total_time: time,
    })
    .collect();
  board.sort_by(|a, b| {
    b.patterns_completed
      .cmp(&a.patterns_completed)
      .then(a.total_time.cmp(&b.total_time))
      .then_with(|| a.user_id.cmp(&b.user_id))
  });
  board.truncate(limit);
  board
}

/// Label shown next to pattern statistics.
pub fn difficulty_assessment(success_rate: f64) -> &'static str {
  if success_rate < 0.5 {
    "challenging"
  } else if success_rate < 0.8 {
    "moderate"
  } else {
    "easy"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn completion(user: &str, pattern: u32, time: u64) -> CompletionRow {
    CompletionRow { user_id: user.into(), pattern_id: pattern, time_spent: Some(time) }
  }

  #[test]
  fn statistics_of_no_attempts_are_zeroed() {
    let s = compute_statistics(&[]);
    assert_eq!(s.total_attempts, 0);
    assert_eq!(s.success_rate, 0.0);
    assert!(s.difficulty_trend.is_none());
  }

  #[test]
  fn statistics_trend_follows_success_share() {
    let mostly_ok: Vec<AttemptRow> = (0..10).map(|i| AttemptRow { success: i < 8 }).collect();
    let s = compute_statistics(&mostly_ok);
    assert_eq!(s.total_attempts, 10);
    assert!((s.success_rate - 0.8).abs() < 1e-9);
    assert_eq!(s.difficulty_trend.as_deref(), Some("increasing"));

    let hard: Vec<AttemptRow> = (0..10).map(|i| AttemptRow { success: i < 7 }).collect();
    assert_eq!(compute_statistics(&hard).difficulty_trend.as_deref(), Some("challenging"));
  }

  #[test]
  fn leaderboard_counts_distinct_patterns_and_breaks_ties_on_time() {
    let rows = vec![
      completion("ana", 1, 100),
      completion("ana", 1, 50),
      completion("ana", 2, 100),
      completion("bo", 1, 60),
      completion("bo", 3, 60),
      completion("cy", 4, 10),
    ];
    let board = build_leaderboard(&rows, 10);
    assert_eq!(board[0].user_id, "bo");
    assert_eq!(board[0].patterns_completed, 2);
    assert_eq!(board[1].user_id, "ana");
    assert_eq!(board[1].total_time, 250);
    assert_eq!(board[2].user_id, "cy");

    assert_eq!(build_leaderboard(&rows, 1).len(), 1);
  }

  #[test]
  fn assessment_bands() {
    assert_eq!(difficulty_assessment(0.2), "challenging");
    assert_eq!(difficulty_assessment(0.5), "moderate");
    assert_eq!(difficulty_assessment(0.8), "easy");
  }

  #[test]
  fn progress_update_fills_missing_fields() {
    let u: ProgressUpdate = serde_json::from_str(r#"{"completed": true, "time_spent": 30}"#).expect("json");
    assert!(u.completed);
    assert_eq!(u.time_spent, 30);
    assert_eq!(u.attempts, 0);
    assert!(u.ai_feedback.is_null());
  }

  #[test]
  fn base_url_points_at_rest_root() {
    let store = ProgressStore::new("https://example.supabase.co/", "anon").expect("store");
    assert_eq!(store.base_url, "https://example.supabase.co/rest/v1");
  }
}

//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::PatternAnalysis;
use crate::analyzer::{AiCodeAnalysis, ComplexityAnalysis};
use crate::domain::{Difficulty, PatternRecord, RunStatus};
use crate::store::{LeaderboardEntry, PatternStatistics, ProgressUpdate};

fn default_language() -> String {
    "python".into()
}

fn default_analysis_type() -> String {
    "visual".into()
}

//
// Service
//

#[derive(Serialize)]
pub struct RootOut {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub features: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub patterns: usize,
    pub model_enabled: bool,
    pub store_enabled: bool,
}

//
// Catalog
//

#[derive(Debug, Default, Deserialize)]
pub struct PatternQuery {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct StatisticsOut {
    pub pattern_id: u32,
    pub statistics: PatternStatistics,
    pub difficulty_assessment: &'static str,
}

//
// Analysis
//

#[derive(Debug, Deserialize)]
pub struct AnalyzeIn {
    pub pattern_id: u32,
    #[serde(default)]
    pub user_code: Option<String>,
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
    /// Only read by `/ai/enhanced-analysis`, which stores the result under it.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeOut {
    pub analysis_type: String,
    pub results: PatternAnalysis,
    pub suggestions: Vec<String>,
    pub complexity_score: f32,
}

#[derive(Serialize)]
pub struct EnhancedAnalysisOut {
    pub pattern: PatternRecord,
    pub ai_analysis: AiCodeAnalysis,
    pub database_saved: bool,
    pub model_used: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackIn {
    pub pattern_id: u32,
    #[serde(default)]
    pub user_code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackOut {
    pub feedback: String,
    pub suggestions: Vec<String>,
    pub correctness_score: f32,
    pub hints: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExplainIn {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub pattern_name: String,
}

#[derive(Serialize)]
pub struct ExplainOut {
    pub code: String,
    pub pattern: String,
    pub explanation: String,
    pub complexity: ComplexityAnalysis,
    pub suggestions: Vec<String>,
    pub ai_powered: bool,
}

//
// Code generation
//

#[derive(Debug, Deserialize)]
pub struct GenerateCodeIn {
    pub pattern_id: u32,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Serialize)]
pub struct GenerateCodeOut {
    pub generated_code: String,
    pub explanation: String,
    pub pattern: PatternRecord,
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailedCodeIn {
    pub pattern_name: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct DetailedCodeOut {
    pub pattern: String,
    pub language: String,
    pub generated_code: String,
    pub explanation: String,
    pub difficulty: Difficulty,
    pub complexity: f32,
}

//
// Tutor
//

#[derive(Debug, Deserialize)]
pub struct ChatIn {
    pub message: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Serialize)]
pub struct ChatOut {
    pub response: &'static str,
    pub context: Option<String>,
}

//
// Execution
//

#[derive(Debug, Deserialize)]
pub struct ExecuteIn {
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct ExecuteOut {
    pub output: String,
    pub language: String,
    /// Wall-clock seconds, e.g. `"0.004s"`.
    pub execution_time: String,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

//
// Progress
//

#[derive(Debug, Deserialize)]
pub struct ProgressIn {
    pub user_id: String,
    pub pattern_id: u32,
    #[serde(default)]
    pub progress_data: ProgressUpdate,
}

#[derive(Serialize)]
pub struct ProgressSavedOut {
    pub success: bool,
    pub message: &'static str,
    pub user_id: String,
    pub pattern_id: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressQuery {
    pub pattern_id: Option<u32>,
}

#[derive(Serialize)]
pub struct ProgressOut {
    pub user_id: String,
    pub progress: Vec<Value>,
    pub total_attempts: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct LeaderboardOut {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub last_updated: String,
}

//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Pattern lookups, static analyses and code templates
//!   - Scoring submissions (and recording attempts when a user is known)
//!   - Model-backed code analysis with local fallbacks
//!   - Executing code (simulated or in a subprocess)
//!   - Progress, statistics and leaderboard reads/writes

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::analysis;
use crate::analyzer::analyze_code;
use crate::catalog::{complexity_score, PatternFilter};
use crate::config::ExecutionMode;
use crate::domain::{AnalysisType, Language, PatternRecord, RunStatus};
use crate::error::ApiError;
use crate::protocol::*;
use crate::runner::RunError;
use crate::scorer;
use crate::simulator::simulate;
use crate::state::AppState;
use crate::store::{difficulty_assessment, PatternStatistics};
use crate::templates::template;
use crate::tutor;

/// An attempt at or above this score is stored as successful.
const PASSING_SCORE: f32 = 0.8;
const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
const ANONYMOUS_USER: &str = "anonymous";

pub const FEATURES: [&str; 5] = [
  "AI Pattern Analysis",
  "Code Generation",
  "Educational Chat",
  "Pattern Recognition",
  "User Progress Tracking",
];

fn pattern_by_id(state: &AppState, id: u32) -> Result<&PatternRecord, ApiError> {
  state
    .catalog
    .lookup_id(id)
    .ok_or_else(|| ApiError::NotFound("Pattern not found".into()))
}

fn elapsed_label(start: Instant) -> String {
  format!("{:.3}s", start.elapsed().as_secs_f64())
}

pub fn list_patterns(state: &AppState, q: PatternQuery) -> Vec<PatternRecord> {
  let filter = PatternFilter { category: q.category, difficulty: q.difficulty, limit: q.limit };
  state.catalog.list(&filter)
}

pub fn get_pattern(state: &AppState, id: u32) -> Result<PatternRecord, ApiError> {
  pattern_by_id(state, id).cloned()
}

#[instrument(level = "info", skip(state, req), fields(pattern_id = req.pattern_id, analysis_type = %req.analysis_type))]
pub fn analyze_pattern(state: &AppState, req: AnalyzeIn) -> Result<AnalyzeOut, ApiError> {
  let pattern = pattern_by_id(state, req.pattern_id)?;
  let kind: AnalysisType = req.analysis_type.parse().map_err(ApiError::InvalidInput)?;
  Ok(AnalyzeOut {
    analysis_type: kind.as_str().to_string(),
    results: analysis::analyze(pattern, kind, req.user_code.as_deref()),
    suggestions: analysis::suggestions(pattern, kind),
    complexity_score: complexity_score(pattern),
  })
}

#[instrument(level = "info", skip(state, req), fields(pattern_id = req.pattern_id, code_len = req.user_code.as_deref().map_or(0, str::len)))]
pub async fn enhanced_analysis(state: &AppState, req: AnalyzeIn) -> Result<EnhancedAnalysisOut, ApiError> {
  let pattern = pattern_by_id(state, req.pattern_id)?.clone();
  let code = req.user_code.unwrap_or_default();
  let ai_analysis = analyze_code(state.model.as_ref(), &state.config.model, &code, &pattern.name).await;

  let database_saved = match &state.store {
    Some(store) => {
      let user_id = req.user_id.as_deref().unwrap_or(ANONYMOUS_USER);
      store
        .save_ai_analysis(
          user_id,
          pattern.id,
          &req.analysis_type,
          ai_analysis.complexity_analysis.complexity_score,
          &ai_analysis.improvement_suggestions,
          &ai_analysis.explanation,
        )
        .await
    }
    None => false,
  };

  let model_used = if ai_analysis.ai_powered { "Hugging Face" } else { "Fallback" };
  info!(target: "codepattern", pattern_id = pattern.id, %model_used, database_saved, "Enhanced analysis served");
  Ok(EnhancedAnalysisOut { pattern, ai_analysis, database_saved, model_used })
}

#[instrument(level = "info", skip(state, req), fields(pattern_id = req.pattern_id, code_len = req.user_code.len(), language = %req.language))]
pub async fn code_feedback(state: &AppState, req: FeedbackIn) -> Result<FeedbackOut, ApiError> {
  let pattern = pattern_by_id(state, req.pattern_id)?;
  let result = scorer::score(&req.user_code, pattern);
  info!(target: "feedback", pattern_id = pattern.id, score = %format!("{:.2}", result.correctness), "Submission scored");

  if let (Some(user_id), Some(store)) = (req.user_id.as_deref(), &state.store) {
    let success = result.correctness >= PASSING_SCORE;
    if !store.save_pattern_attempt(user_id, pattern.id, &req.user_code, success).await {
      warn!(target: "feedback", %user_id, pattern_id = pattern.id, "Attempt not recorded");
    }
  }

  Ok(FeedbackOut {
    feedback: result.feedback,
    suggestions: result.suggestions,
    correctness_score: result.correctness,
    hints: result.hints,
  })
}

#[instrument(level = "info", skip(state, req), fields(pattern_id = req.pattern_id, language = %req.language))]
pub fn generate_code(state: &AppState, req: GenerateCodeIn) -> Result<GenerateCodeOut, ApiError> {
  let pattern = pattern_by_id(state, req.pattern_id)?;
  let language = req.language.parse::<Language>().ok();
  let tpl = template(pattern, language);
  Ok(GenerateCodeOut {
    generated_code: tpl.code,
    explanation: tpl.explanation,
    pattern: pattern.clone(),
    language: language.map_or(req.language, |l| l.as_str().to_string()),
  })
}

#[instrument(level = "info", skip(state, req), fields(pattern_name = %req.pattern_name, language = %req.language))]
pub fn generate_detailed_code(state: &AppState, req: DetailedCodeIn) -> Result<DetailedCodeOut, ApiError> {
  let pattern = state
    .catalog
    .lookup_name(&req.pattern_name)
    .ok_or_else(|| ApiError::NotFound(format!("Pattern '{}' not found", req.pattern_name)))?;
  let language = req.language.parse::<Language>().ok();
  let tpl = template(pattern, language);
  debug!(target: "codepattern", pattern_id = pattern.id, code_len = tpl.code.len(), "Detailed code generated");
  Ok(DetailedCodeOut {
    pattern: pattern.name.clone(),
    language: language.map_or(req.language, |l| l.as_str().to_string()),
    generated_code: tpl.code,
    explanation: tpl.explanation,
    difficulty: pattern.difficulty,
    complexity: complexity_score(pattern),
  })
}

#[instrument(level = "info", skip(state, req), fields(code_len = req.code.len(), pattern_name = %req.pattern_name))]
pub async fn explain_code(state: &AppState, req: ExplainIn) -> ExplainOut {
  let a = analyze_code(state.model.as_ref(), &state.config.model, &req.code, &req.pattern_name).await;
  ExplainOut {
    code: req.code,
    pattern: req.pattern_name,
    explanation: a.explanation,
    complexity: a.complexity_analysis,
    suggestions: a.improvement_suggestions,
    ai_powered: a.ai_powered,
  }
}

#[instrument(level = "info", skip(req), fields(message_len = req.message.len()))]
pub fn chat(req: ChatIn) -> ChatOut {
  ChatOut { response: tutor::reply(&req.message), context: req.context }
}

#[instrument(level = "info", skip(state, req), fields(code_len = req.code.len(), language = %req.language, input_len = req.input.len()))]
pub async fn execute_code(state: &AppState, req: ExecuteIn) -> Result<ExecuteOut, ApiError> {
  if req.code.trim().is_empty() {
    return Err(ApiError::InvalidInput("No code provided".into()));
  }
  let language: Language = req.language.parse().map_err(ApiError::InvalidInput)?;
  let start = Instant::now();

  if state.config.execution.mode == ExecutionMode::Simulate {
    let sim = simulate(&req.code, language);
    debug!(target: "codepattern", lines = sim.lines().len(), status = ?sim.status, "Simulated execution");
    let error = match sim.status {
      RunStatus::Success => None,
      RunStatus::Error => Some(sim.output.trim_end().to_string()),
    };
    return Ok(ExecuteOut {
      output: sim.output,
      language: language.as_str().to_string(),
      execution_time: elapsed_label(start),
      status: sim.status,
      error,
    });
  }

  let (output, status, error) = match state.runner.run(&req.code, language, &req.input).await {
    Ok(out) if out.success() => (out.stdout, RunStatus::Success, None),
    Ok(out) => (out.stdout, RunStatus::Error, Some(out.stderr)),
    Err(RunError::CompilationFailed { stderr }) => (stderr, RunStatus::Error, Some("Compilation failed".to_string())),
    Err(e) => {
      error!(target: "runner", error = %e, "Code execution failed");
      (String::new(), RunStatus::Error, Some(e.to_string()))
    }
  };
  Ok(ExecuteOut {
    output,
    language: language.as_str().to_string(),
    execution_time: elapsed_label(start),
    status,
    error,
  })
}

#[instrument(level = "info", skip(state, req), fields(user_id = %req.user_id, pattern_id = req.pattern_id))]
pub async fn save_progress(state: &AppState, req: ProgressIn) -> Result<ProgressSavedOut, ApiError> {
  if req.user_id.trim().is_empty() {
    return Err(ApiError::InvalidInput("user_id is required".into()));
  }
  let success = match &state.store {
    Some(store) => store.save_user_progress(&req.user_id, req.pattern_id, &req.progress_data).await,
    None => {
      warn!(target: "codepattern", "Progress store not available, skipping progress save");
      false
    }
  };
  Ok(ProgressSavedOut {
    success,
    message: if success { "Progress saved successfully" } else { "Failed to save progress" },
    user_id: req.user_id,
    pattern_id: req.pattern_id,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn user_progress(state: &AppState, user_id: String, pattern_id: Option<u32>) -> ProgressOut {
  let progress = match &state.store {
    Some(store) => store.get_user_progress(&user_id, pattern_id).await,
    None => vec![],
  };
  ProgressOut { total_attempts: progress.len(), user_id, progress }
}

#[instrument(level = "info", skip(state))]
pub async fn pattern_statistics(state: &AppState, pattern_id: u32) -> Result<StatisticsOut, ApiError> {
  pattern_by_id(state, pattern_id)?;
  let statistics = match &state.store {
    Some(store) => store.get_pattern_statistics(pattern_id).await,
    None => PatternStatistics::default(),
  };
  Ok(StatisticsOut {
    pattern_id,
    difficulty_assessment: difficulty_assessment(statistics.success_rate),
    statistics,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn leaderboard(state: &AppState, limit: Option<usize>) -> LeaderboardOut {
  let limit = limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
  let leaderboard = match &state.store {
    Some(store) => store.get_leaderboard(limit).await,
    None => vec![],
  };
  LeaderboardOut { leaderboard, last_updated: Utc::now().to_rfc3339() }
}

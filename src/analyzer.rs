//! Code analysis backed by the hosted model, with deterministic fallbacks.
//!
//! The model is optional. Every model call that is skipped or fails drops to a
//! local heuristic so callers always get a complete `AiCodeAnalysis`.

use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::config::ModelConfig;
use crate::model::HostedModel;
use crate::util::{fill_template, trunc_for_log};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ComplexityAnalysis {
  pub complexity_score: f32,
  pub complexity_level: String,
  pub suggestions: Vec<String>,
  pub ai_confidence: f32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AiCodeAnalysis {
  pub complexity_analysis: ComplexityAnalysis,
  pub explanation: String,
  pub improvement_suggestions: Vec<String>,
  pub ai_powered: bool,
}

#[instrument(level = "info", skip(model, cfg, code), fields(code_len = code.len(), %pattern_name, has_model = model.is_some()))]
pub async fn analyze_code(
  model: Option<&HostedModel>,
  cfg: &ModelConfig,
  code: &str,
  pattern_name: &str,
) -> AiCodeAnalysis {
  let Some(m) = model else {
    return AiCodeAnalysis {
      complexity_analysis: fallback_complexity(code),
      explanation: fallback_explanation(pattern_name),
      improvement_suggestions: improvement_suggestions(code),
      ai_powered: false,
    };
  };

  let mut ai_powered = false;
  let complexity_analysis = match m.classify(code).await {
    Ok(labels) => {
      ai_powered = true;
      let mut base = fallback_complexity(code);
      if let Some(top) = labels.first() {
        if let Some(level) = level_from_label(&top.label) {
          base.complexity_level = level.to_string();
        }
        base.ai_confidence = top.score.clamp(0.0, 1.0);
      }
      base
    }
    Err(e) => {
      error!(target: "codepattern", error = %e, "Model classification failed; using heuristic complexity.");
      fallback_complexity(code)
    }
  };

  let prompt = fill_template(&cfg.explain_template, &[("pattern_name", pattern_name), ("code", code)]);
  let explanation = match m.generate(&prompt).await {
    Ok(text) => {
      ai_powered = true;
      debug!(target: "codepattern", explanation = %trunc_for_log(&text, 160), "Model explanation received");
      text
    }
    Err(e) => {
      error!(target: "codepattern", error = %e, "Model explanation failed; using canned explanation.");
      fallback_explanation(pattern_name)
    }
  };

  AiCodeAnalysis {
    complexity_analysis,
    explanation,
    improvement_suggestions: improvement_suggestions(code),
    ai_powered,
  }
}

fn level_from_label(label: &str) -> Option<&'static str> {
  match label.to_ascii_lowercase().as_str() {
    "low" | "simple" => Some("low"),
    "medium" | "moderate" => Some("medium"),
    "high" | "complex" => Some("high"),
    _ => None,
  }
}

/// Lines, loop and branch keywords weighted into a 0..1 score.
pub fn fallback_complexity(code: &str) -> ComplexityAnalysis {
  let lines = code.split('\n').count() as f32;
  let loops = (code.matches("for").count() + code.matches("while").count()) as f32;
  let conditions = (code.matches("if").count() + code.matches("else").count()) as f32;
  let score = (lines * 0.1 + loops * 0.2 + conditions * 0.15).min(1.0);
  let level = if score > 0.7 {
    "high"
  } else if score > 0.4 {
    "medium"
  } else {
    "low"
  };
  ComplexityAnalysis {
    complexity_score: score,
    complexity_level: level.into(),
    suggestions: vec![
      "Keep functions small and focused".into(),
      "Use meaningful variable names".into(),
      "Add comments for complex logic".into(),
    ],
    ai_confidence: 0.0,
  }
}

pub fn fallback_explanation(pattern_name: &str) -> String {
  format!(
    "This {pattern_name} pattern uses nested loops to create a visual pattern. The outer loop controls the rows, \
     while the inner loop controls the columns. Each iteration prints characters to form the desired shape."
  )
}

/// Rule-based review notes; the generic list is used when nothing specific fires.
pub fn improvement_suggestions(code: &str) -> Vec<String> {
  let mut out = vec![];
  let has_comment = code.contains('#') || code.contains("//");
  if !code.trim().is_empty() && !has_comment {
    out.push("Add comments to explain the logic".to_string());
  }
  if code.lines().any(|l| l.len() > 100) {
    out.push("Break long lines to keep the code readable".to_string());
  }
  if code.matches("for").count() + code.matches("while").count() > 3 {
    out.push("Consider breaking down deeply nested loops into helper functions".to_string());
  }
  if out.is_empty() {
    out = vec![
      "Add comments to explain the logic".into(),
      "Use descriptive variable names".into(),
      "Consider breaking down complex functions".into(),
      "Add error handling where appropriate".into(),
    ];
  }
  out
}

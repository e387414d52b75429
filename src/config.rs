//! Loading service configuration (CORS, code execution, model settings) from TOML.
//!
//! Secrets never live in the file: API tokens and database keys come from env
//! (see `model::HostedModel::from_env` and `store::ProgressStore::from_env`).

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub execution: ExecutionConfig,
  #[serde(default)]
  pub model: ModelConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  /// Allowed CORS origins. `"*"` allows any origin.
  pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      cors_origins: vec!["http://localhost:3000".into(), "http://127.0.0.1:3000".into()],
    }
  }
}

/// How `/execute-code` runs submissions.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
  /// Regex-based output prediction; nothing is spawned.
  #[default]
  Simulate,
  /// Real interpreters/compilers in a temp directory, bounded by `timeout_secs`.
  Subprocess,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
  pub mode: ExecutionMode,
  pub timeout_secs: u64,
  pub python: String,
  pub node: String,
  pub javac: String,
  pub java: String,
  pub cxx: String,
  /// Parent of the per-run temp directories; the system temp dir when unset.
  pub work_dir: Option<PathBuf>,
}

impl Default for ExecutionConfig {
  fn default() -> Self {
    Self {
      mode: ExecutionMode::Simulate,
      timeout_secs: 10,
      python: "python3".into(),
      node: "node".into(),
      javac: "javac".into(),
      java: "java".into(),
      cxx: "g++".into(),
      work_dir: None,
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
  pub classifier_model: String,
  pub generator_model: String,
  pub max_length: u32,
  /// Prompt for code explanations. Placeholders: `{pattern_name}`, `{code}`.
  pub explain_template: String,
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      classifier_model: "microsoft/codebert-base".into(),
      generator_model: "microsoft/DialoGPT-medium".into(),
      max_length: 150,
      explain_template: "Explain this {pattern_name} code in simple terms:\n{code}\nExplanation:".into(),
    }
  }
}

/// Parse a TOML document into `AppConfig`.
pub fn parse_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from CODEPATTERN_CONFIG_PATH. On any parsing/IO error,
/// or when the variable is unset, returns defaults.
pub fn load_config_from_env() -> AppConfig {
  let Ok(path) = std::env::var("CODEPATTERN_CONFIG_PATH") else {
    return AppConfig::default();
  };
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "codepattern", %path, "Loaded config (TOML)");
        cfg
      }
      Err(e) => {
        error!(target: "codepattern", %path, error = %e, "Failed to parse TOML config; using defaults");
        AppConfig::default()
      }
    },
    Err(e) => {
      error!(target: "codepattern", %path, error = %e, "Failed to read TOML config file; using defaults");
      AppConfig::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_file_keeps_defaults_for_missing_keys() {
    let cfg = parse_config(
      r#"
        [execution]
        mode = "subprocess"
        timeout_secs = 3

        [server]
        cors_origins = ["*"]
      "#,
    )
    .expect("valid toml");
    assert_eq!(cfg.execution.mode, ExecutionMode::Subprocess);
    assert_eq!(cfg.execution.timeout_secs, 3);
    assert_eq!(cfg.execution.python, "python3");
    assert_eq!(cfg.server.cors_origins, vec!["*".to_string()]);
    assert_eq!(cfg.model.max_length, 150);
  }

  #[test]
  fn empty_file_is_all_defaults() {
    let cfg = parse_config("").expect("empty toml");
    assert_eq!(cfg.execution.mode, ExecutionMode::Simulate);
    assert_eq!(cfg.execution.timeout_secs, 10);
    assert!(cfg.execution.work_dir.is_none());
    assert_eq!(cfg.server.cors_origins.len(), 2);
  }

  #[test]
  fn unknown_mode_is_rejected() {
    assert!(parse_config("[execution]\nmode = \"docker\"").is_err());
  }
}

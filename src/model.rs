//! Minimal Hugging Face Inference API client.
//!
//! Two calls only: text classification over submitted code and text generation
//! for explanations. Calls are instrumented and log model names, latencies and
//! response sizes (not contents).
//!
//! NOTE: We never log the API token.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::ModelConfig;

#[derive(Debug, Error)]
pub enum ModelError {
  #[error("model HTTP {status}: {message}")]
  Http { status: u16, message: String },
  #[error("model transport error: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("model response could not be decoded: {0}")]
  Decode(String),
  #[error("model returned no result")]
  Empty,
}

#[derive(Clone)]
pub struct HostedModel {
  pub client: reqwest::Client,
  pub api_token: String,
  pub base_url: String,
  pub classifier_model: String,
  pub generator_model: String,
  pub max_length: u32,
}

impl std::fmt::Debug for HostedModel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("HostedModel")
      .field("base_url", &self.base_url)
      .field("classifier_model", &self.classifier_model)
      .field("generator_model", &self.generator_model)
      .finish_non_exhaustive()
  }
}

/// One label from a text-classification pipeline.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ClassLabel {
  pub label: String,
  pub score: f32,
}

/// The classification endpoint answers either `[[...]]` or `[...]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
  Nested(Vec<Vec<ClassLabel>>),
  Flat(Vec<ClassLabel>),
}

impl ClassifyResponse {
  fn into_labels(self) -> Vec<ClassLabel> {
    match self {
      ClassifyResponse::Nested(v) => v.into_iter().next().unwrap_or_default(),
      ClassifyResponse::Flat(v) => v,
    }
  }
}

#[derive(Deserialize)]
struct Generated {
  generated_text: String,
}

impl HostedModel {
  /// Construct the client if we find HF_API_TOKEN; otherwise return None.
  pub fn from_env(cfg: &ModelConfig) -> Option<Self> {
    let api_token = std::env::var("HF_API_TOKEN").ok()?;
    let base_url = std::env::var("HF_BASE_URL")
      .unwrap_or_else(|_| "https://api-inference.huggingface.co".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self {
      client,
      api_token,
      base_url,
      classifier_model: cfg.classifier_model.clone(),
      generator_model: cfg.generator_model.clone(),
      max_length: cfg.max_length,
    })
  }

  /// POST `/models/{model}` and decode the JSON answer into `T`.
  #[instrument(level = "info", skip(self, body), fields(%model))]
  async fn infer<T: DeserializeOwned>(&self, model: &str, body: &InferenceRequest<'_>) -> Result<T, ModelError> {
    let url = format!("{}/models/{}", self.base_url.trim_end_matches('/'), model);
    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "codepattern-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
      .json(body).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_hf_error(&body).unwrap_or(body);
      error!(status, elapsed = ?start.elapsed(), "Model call failed");
      return Err(ModelError::Http { status, message });
    }

    let text = res.text().await?;
    info!(elapsed = ?start.elapsed(), bytes = text.len(), "Model response received");
    serde_json::from_str::<T>(&text).map_err(|e| ModelError::Decode(e.to_string()))
  }

  /// Classify `code`; labels come back sorted by descending score.
  #[instrument(level = "info", skip(self, code), fields(code_len = code.len(), model = %self.classifier_model))]
  pub async fn classify(&self, code: &str) -> Result<Vec<ClassLabel>, ModelError> {
    let body = InferenceRequest { inputs: code, parameters: None, options: Options::default() };
    let resp: ClassifyResponse = self.infer(&self.classifier_model, &body).await?;
    let mut labels = resp.into_labels();
    if labels.is_empty() {
      return Err(ModelError::Empty);
    }
    labels.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(labels)
  }

  /// Generate a continuation of `prompt` (prompt text not echoed back).
  #[instrument(level = "info", skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.generator_model))]
  pub async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
    let body = InferenceRequest {
      inputs: prompt,
      parameters: Some(Parameters { max_length: Some(self.max_length), return_full_text: Some(false) }),
      options: Options::default(),
    };
    let out: Vec<Generated> = self.infer(&self.generator_model, &body).await?;
    let text = out.into_iter().next().map(|g| g.generated_text.trim().to_string()).unwrap_or_default();
    if text.is_empty() { Err(ModelError::Empty) } else { Ok(text) }
  }
}

// --- Inference DTOs ---

#[derive(Serialize)]
struct InferenceRequest<'a> {
  inputs: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  parameters: Option<Parameters>,
  options: Options,
}

#[derive(Serialize)]
struct Parameters {
  #[serde(skip_serializing_if = "Option::is_none")]
  max_length: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  return_full_text: Option<bool>,
}

#[derive(Serialize)]
struct Options {
  wait_for_model: bool,
}

impl Default for Options {
  fn default() -> Self { Self { wait_for_model: true } }
}

/// Try to extract a clean error message from an inference error body.
fn extract_hf_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EObj { error: String }
  serde_json::from_str::<EObj>(body).ok().map(|e| e.error)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classification_accepts_nested_and_flat_shapes() {
    let nested: ClassifyResponse =
      serde_json::from_str(r#"[[{"label":"LABEL_1","score":0.8},{"label":"LABEL_0","score":0.2}]]"#).expect("nested");
    assert_eq!(nested.into_labels().len(), 2);

    let flat: ClassifyResponse = serde_json::from_str(r#"[{"label":"high","score":0.6}]"#).expect("flat");
    assert_eq!(flat.into_labels()[0].label, "high");
  }

  #[test]
  fn error_body_message_is_extracted() {
    let msg = extract_hf_error(r#"{"error":"Model is currently loading","estimated_time":20.0}"#);
    assert_eq!(msg.as_deref(), Some("Model is currently loading"));
    assert!(extract_hf_error("<html>502</html>").is_none());
  }

  #[test]
  fn generation_request_omits_empty_parameters() {
    let body = InferenceRequest { inputs: "x", parameters: None, options: Options::default() };
    let json = serde_json::to_value(&body).expect("json");
    assert!(json.get("parameters").is_none());
    assert_eq!(json["options"]["wait_for_model"], true);
  }
}

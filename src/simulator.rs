//! Heuristic output prediction for submitted code.
//!
//! This is not an interpreter. It looks for print calls with string literals,
//! loop keywords and a `n = <int>` assignment, and reproduces two shapes only:
//! literal prints (`print('Hello')`) and the solid square built from a lone
//! `'*'` print inside loops. Anything else falls through to a generic line.
//! Nested quotes, multi-line calls and f-/template strings are not understood.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::domain::{Language, RunStatus, SimulatedOutput};

/// Largest `n` the square heuristic will expand.
pub const MAX_SIMULATED_ROWS: u32 = 1000;

const GRID_FALLBACK: &str = "Simulated pattern output";
const LOOP_FALLBACK: &str = "Simulated pattern execution";
const GENERIC_SUCCESS: &str = "Code executed successfully";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
  #[error("Language '{0}' not supported for simulation")]
  Unsupported(Language),
  #[error("pattern size '{0}' is not a valid row count")]
  RowCount(String),
  #[error("pattern size {0} exceeds the simulation limit of {}", MAX_SIMULATED_ROWS)]
  TooManyRows(u32),
}

/// Per-language print-call matchers.
struct PrintRules {
  call: Regex,
  literal: Regex,
  lone_star: Regex,
}

impl PrintRules {
  fn new(call: &str) -> Self {
    Self {
      call: Regex::new(&format!(r"{call}\s*\(")).expect("static print-call regex"),
      literal: Regex::new(&format!(r#"{call}\s*\(\s*["'](.*?)["']"#)).expect("static literal regex"),
      lone_star: Regex::new(&format!(r#"{call}\s*\(\s*["']\*["']\s*[,)]"#)).expect("static lone-star regex"),
    }
  }
}

static PYTHON: Lazy<PrintRules> = Lazy::new(|| PrintRules::new(r"\bprint"));
static JAVASCRIPT: Lazy<PrintRules> = Lazy::new(|| PrintRules::new(r"\bconsole\.log"));
static JAVA: Lazy<PrintRules> = Lazy::new(|| PrintRules::new(r"\bSystem\.out\.print(?:ln)?"));

static LOOP_KEYWORD: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\b(?:for|while)\b").expect("static loop regex"));
static SIZE_ASSIGNMENT: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\bn\s*=\s*(\d+)").expect("static size regex"));

fn rules_for(language: Language) -> Result<&'static PrintRules, SimulationError> {
  match language {
    Language::Python => Ok(&*PYTHON),
    Language::Javascript => Ok(&*JAVASCRIPT),
    Language::Java => Ok(&*JAVA),
    Language::Cpp => Err(SimulationError::Unsupported(language)),
  }
}

/// Predict what `code` prints. Faults become `RunStatus::Error`; this never panics
/// on user input and never returns an error.
#[instrument(level = "debug", skip(code), fields(code_len = code.len(), %language))]
pub fn simulate(code: &str, language: Language) -> SimulatedOutput {
  match predict_lines(code, language) {
    Ok(lines) => {
      debug!(target: "simulator", lines = lines.len(), "Simulated output");
      let mut output = String::new();
      for line in lines {
        output.push_str(&line);
        output.push('\n');
      }
      SimulatedOutput { output, status: RunStatus::Success }
    }
    Err(e) => {
      warn!(target: "simulator", error = %e, "Simulation fault");
      SimulatedOutput { output: format!("Execution error: {e}\n"), status: RunStatus::Error }
    }
  }
}

fn predict_lines(code: &str, language: Language) -> Result<Vec<String>, SimulationError> {
  let rules = rules_for(language)?;
  let has_loop = LOOP_KEYWORD.is_match(code);

  if rules.call.is_match(code) {
    let literals: Vec<String> = rules
      .literal
      .captures_iter(code)
      .map(|c| c[1].to_string())
      .collect();

    if has_loop && rules.lone_star.is_match(code) {
      // The lone '*' prints are grid cells, not lines of their own.
      let mut lines: Vec<String> = literals.into_iter().filter(|l| l != "*").collect();
      lines.extend(star_grid(code)?);
      return Ok(lines);
    }
    if !literals.is_empty() {
      return Ok(literals);
    }
    return Ok(vec![GENERIC_SUCCESS.to_string()]);
  }

  if has_loop && code.contains('*') {
    return Ok(vec![LOOP_FALLBACK.to_string()]);
  }
  Ok(vec![GENERIC_SUCCESS.to_string()])
}

fn star_grid(code: &str) -> Result<Vec<String>, SimulationError> {
  let Some(caps) = SIZE_ASSIGNMENT.captures(code) else {
    return Ok(vec![GRID_FALLBACK.to_string()]);
  };
  let raw = &caps[1];
  let n: u32 = raw.parse().map_err(|_| SimulationError::RowCount(raw.to_string()))?;
  if n > MAX_SIMULATED_ROWS {
    return Err(SimulationError::TooManyRows(n));
  }
  let row = "*".repeat(n as usize);
  Ok(vec![row; n as usize])
}

//! Domain models used by the backend: patterns, target languages, analysis kinds,
//! and the transient results produced by the simulator and scorer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How hard a pattern is to implement.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Catalog grouping shown in the frontend.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
  BasicStar,
  Hollow,
  Diamond,
  Number,
  Special,
}

impl Category {
  pub fn as_str(&self) -> &'static str {
    match self {
      Category::BasicStar => "basic-star",
      Category::Hollow => "hollow",
      Category::Diamond => "diamond",
      Category::Number => "number",
      Category::Special => "special",
    }
  }
}

/// One ASCII-art exercise. Built once from the literal table in `catalog`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatternRecord {
  pub id: u32,
  pub name: String,
  pub category: Category,
  pub difficulty: Difficulty,
  pub description: String,
  pub preview: Vec<String>,
  pub rows: u32,
  pub popularity: u32,
  pub completion_rate: u32,
  pub formula: String,
  pub loops: u32,
  pub conditions: u32,
}

/// Target languages understood by templates, the simulator and the runner.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Language {
  Python,
  Javascript,
  Java,
  Cpp,
}

impl Language {
  pub fn as_str(&self) -> &'static str {
    match self {
      Language::Python => "python",
      Language::Javascript => "javascript",
      Language::Java => "java",
      Language::Cpp => "cpp",
    }
  }

  /// Line-comment prefix used in generated stubs.
  pub fn comment(&self) -> &'static str {
    match self {
      Language::Python => "#",
      _ => "//",
    }
  }

  /// Source file extension used by the runner.
  pub fn extension(&self) -> &'static str {
    match self {
      Language::Python => "py",
      Language::Javascript => "js",
      Language::Java => "java",
      Language::Cpp => "cpp",
    }
  }
}

impl fmt::Display for Language {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Language {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "python" | "py" => Ok(Language::Python),
      "javascript" | "js" | "node" => Ok(Language::Javascript),
      "java" => Ok(Language::Java),
      "cpp" | "c++" => Ok(Language::Cpp),
      other => Err(format!("Unsupported language: {other}")),
    }
  }
}

/// Which angle `/ai/analyze` looks at a pattern from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
  Visual,
  Mathematical,
  Logical,
  Implementation,
}

impl AnalysisType {
  pub fn as_str(&self) -> &'static str {
    match self {
      AnalysisType::Visual => "visual",
      AnalysisType::Mathematical => "mathematical",
      AnalysisType::Logical => "logical",
      AnalysisType::Implementation => "implementation",
    }
  }
}

impl FromStr for AnalysisType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "visual" => Ok(AnalysisType::Visual),
      "mathematical" => Ok(AnalysisType::Mathematical),
      "logical" => Ok(AnalysisType::Logical),
      "implementation" => Ok(AnalysisType::Implementation),
      _ => Err("Invalid analysis type".into()),
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
  Success,
  Error,
}

/// Predicted output of a submission. Each emitted line ends with `\n`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SimulatedOutput {
  pub output: String,
  pub status: RunStatus,
}

impl SimulatedOutput {
  pub fn lines(&self) -> Vec<&str> {
    self.output.lines().collect()
  }
}

/// Rubric result for one submission against one pattern.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SubmissionScore {
  pub correctness: f32,
  pub feedback: String,
  pub suggestions: Vec<String>,
  pub hints: Vec<String>,
}

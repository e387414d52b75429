//! Static analyses of a catalog pattern (`/ai/analyze`).

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{AnalysisType, Difficulty, PatternRecord};

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct VisualAnalysis {
  pub rows: u32,
  pub columns: usize,
  pub total_elements: usize,
  pub unique_elements: usize,
  pub symmetry: &'static str,
  pub density: f32,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MathematicalAnalysis {
  pub formula: String,
  pub complexity: &'static str,
  pub loops: u32,
  pub conditions: u32,
  pub growth_pattern: &'static str,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LogicalAnalysis {
  pub nested_loops: u32,
  pub conditions: u32,
  pub variables: Vec<&'static str>,
  pub approach: &'static str,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ImplementationAnalysis {
  pub code_structure: &'static str,
  pub variable_usage: &'static str,
  pub loop_structure: &'static str,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PatternAnalysis {
  Visual(VisualAnalysis),
  Mathematical(MathematicalAnalysis),
  Logical(LogicalAnalysis),
  Implementation(ImplementationAnalysis),
}

pub fn analyze(pattern: &PatternRecord, kind: AnalysisType, user_code: Option<&str>) -> PatternAnalysis {
  match kind {
    AnalysisType::Visual => PatternAnalysis::Visual(visual(pattern)),
    AnalysisType::Mathematical => PatternAnalysis::Mathematical(mathematical(pattern)),
    AnalysisType::Logical => PatternAnalysis::Logical(logical(pattern)),
    AnalysisType::Implementation => PatternAnalysis::Implementation(implementation(user_code)),
  }
}

fn visual(p: &PatternRecord) -> VisualAnalysis {
  let widths = p.preview.iter().map(|row| row.chars().count());
  let total: usize = widths.clone().sum();
  let filled: usize = p.preview.iter().map(|row| row.chars().filter(|c| *c != ' ').count()).sum();
  let unique: HashSet<char> = p.preview.iter().flat_map(|row| row.chars()).collect();
  let name = p.name.to_lowercase();
  VisualAnalysis {
    rows: p.rows,
    columns: widths.max().unwrap_or(0),
    total_elements: total,
    unique_elements: unique.len(),
    symmetry: if name.contains("diamond") || name.contains('x') { "symmetric" } else { "asymmetric" },
    density: if total == 0 { 0.0 } else { filled as f32 / total as f32 },
  }
}

fn mathematical(p: &PatternRecord) -> MathematicalAnalysis {
  let first = p.preview.first().map_or(0, |r| r.chars().count());
  let last = p.preview.last().map_or(0, |r| r.chars().count());
  MathematicalAnalysis {
    formula: p.formula.clone(),
    complexity: match p.difficulty {
      Difficulty::Easy => "O(n)",
      Difficulty::Medium => "O(n²)",
      Difficulty::Hard => "O(n³)",
    },
    loops: p.loops,
    conditions: p.conditions,
    growth_pattern: if first < last { "increasing" } else { "decreasing" },
  }
}

fn logical(p: &PatternRecord) -> LogicalAnalysis {
  LogicalAnalysis {
    nested_loops: p.loops,
    conditions: p.conditions,
    variables: vec!["i", "j", "spaces", "stars"],
    approach: match p.difficulty {
      Difficulty::Easy => "direct iteration",
      Difficulty::Medium => "conditional logic",
      Difficulty::Hard => "complex algorithms",
    },
  }
}

fn implementation(user_code: Option<&str>) -> ImplementationAnalysis {
  let code = user_code.unwrap_or_default();
  let has = |needle: &str| !code.is_empty() && code.contains(needle);
  ImplementationAnalysis {
    code_structure: if has("for") { "good" } else { "needs_improvement" },
    variable_usage: if has("i") { "appropriate" } else { "missing" },
    loop_structure: if has("range") { "correct" } else { "incorrect" },
  }
}

pub fn suggestions(pattern: &PatternRecord, kind: AnalysisType) -> Vec<String> {
  match kind {
    AnalysisType::Visual => vec![
      "Try to identify the symmetry in this pattern".into(),
      "Count the elements in each row to find the pattern".into(),
      "Notice how the pattern changes from row to row".into(),
    ],
    AnalysisType::Mathematical => vec![
      format!("Use the formula: {}", pattern.formula),
      format!("This pattern requires {} nested loops", pattern.loops),
      "Calculate spaces and stars for each row".into(),
    ],
    AnalysisType::Logical => vec![
      "Start with the outer loop for rows".into(),
      "Use inner loop for columns".into(),
      "Apply conditions for special cases".into(),
    ],
    AnalysisType::Implementation => vec![],
  }
}

//! Rubric scoring of a submission against the expected pattern.
//!
//! Every check is a plain substring test; the weights add up and are clipped to
//! [0, 1]. Suggestions mirror the rubric, most fundamental gap first, and hints
//! are progressive (only the first unmet stage is reported).

use tracing::{debug, instrument};

use crate::domain::{PatternRecord, SubmissionScore};

const W_LOOP: f32 = 0.3;
const W_NESTED: f32 = 0.3;
const W_OUTPUT: f32 = 0.2;
const W_CONDITION: f32 = 0.2;

const PRINT_TOKENS: [&str; 3] = ["print", "console.log", "System.out.print"];

/// Cheap textual facts about a submission.
#[derive(Debug, Clone, Copy)]
struct Signals {
  has_for: bool,
  loop_count: usize,
  has_output: bool,
  has_if: bool,
}

impl Signals {
  fn of(code: &str) -> Self {
    Self {
      has_for: code.contains("for"),
      loop_count: code.matches("for").count() + code.matches("while").count(),
      has_output: PRINT_TOKENS.iter().any(|t| code.contains(t)),
      has_if: code.contains("if"),
    }
  }
}

#[instrument(level = "debug", skip(code, expected), fields(code_len = code.len(), pattern_id = expected.id))]
pub fn score(code: &str, expected: &PatternRecord) -> SubmissionScore {
  if code.trim().is_empty() {
    return SubmissionScore {
      correctness: 0.0,
      feedback: "Please write some code to get feedback!".into(),
      suggestions: vec![
        "Start by creating a variable for the pattern size".into(),
        "Use a for loop to iterate through rows".into(),
      ],
      hints: vec![
        format!("Start with a variable n = {}", expected.rows),
        "Create a loop from 0 to n-1".into(),
        "Calculate spaces and stars for each row".into(),
        "Print spaces, then stars, then newline".into(),
      ],
    };
  }

  let s = Signals::of(code);
  let correctness = correctness(&s, expected);
  debug!(target: "feedback", correctness, loop_count = s.loop_count, "Submission scored");

  SubmissionScore {
    correctness,
    feedback: feedback_line(&s, expected),
    suggestions: suggestions(&s, expected),
    hints: hints(&s, expected),
  }
}

fn correctness(s: &Signals, expected: &PatternRecord) -> f32 {
  let mut total = 0.0;
  if s.has_for {
    total += W_LOOP;
  }
  if expected.loops > 1 && s.loop_count >= 2 {
    total += W_NESTED;
  }
  if s.has_output {
    total += W_OUTPUT;
  }
  if expected.conditions > 0 && s.has_if {
    total += W_CONDITION;
  }
  f32::min(total, 1.0)
}

fn feedback_line(s: &Signals, expected: &PatternRecord) -> String {
  let mut parts: Vec<&str> = vec![];
  parts.push(if s.has_for {
    "Good! You're using loops."
  } else {
    "Try using loops to iterate through rows."
  });
  parts.push(if s.has_output {
    "Great! You're printing output."
  } else {
    "Don't forget to print the pattern!"
  });
  if expected.loops > 1 {
    parts.push(if s.loop_count >= 2 {
      "Excellent! You're using nested loops correctly."
    } else {
      "This pattern needs nested loops."
    });
  }
  if expected.conditions > 0 && !s.has_if {
    parts.push("Some rows need special cases.");
  }
  parts.join(" ")
}

fn suggestions(s: &Signals, expected: &PatternRecord) -> Vec<String> {
  let mut out = vec![];
  if !s.has_for {
    out.push("Add a for loop to iterate through rows".to_string());
  }
  if (s.loop_count as u32) < expected.loops {
    out.push(format!("You need nested loops: this pattern uses {} loops", expected.loops));
  }
  if !s.has_output {
    out.push("Add print statements to display the pattern".to_string());
  }
  if expected.conditions > 0 && !s.has_if {
    out.push("Add conditional statements for special cases".to_string());
  }
  out
}

fn hints(s: &Signals, expected: &PatternRecord) -> Vec<String> {
  let stage: [&str; 2] = if !s.has_for {
    ["Add a for loop to iterate through rows", "Use range() or a counter for the loop"]
  } else if (s.loop_count as u32) < expected.loops {
    ["You need nested loops for this pattern", "Add an inner loop for columns"]
  } else {
    ["Great progress! Now add the print statements", "Make sure to print newline after each row"]
  };
  stage.iter().map(|h| h.to_string()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;

  fn pattern(id: u32) -> PatternRecord {
    Catalog::default().lookup_id(id).cloned().expect("pattern")
  }

  #[test]
  fn empty_code_scores_zero_for_every_pattern() {
    for p in Catalog::default().all() {
      let s = score("", p);
      assert_eq!(s.correctness, 0.0);
      assert_eq!(s.hints[0], format!("Start with a variable n = {}", p.rows));
      assert_eq!(score("  \n\t", p).correctness, 0.0);
    }
  }

  #[test]
  fn full_marks_for_nested_loops_with_output_and_condition() {
    let hollow = pattern(11);
    let code = "for i in range(n):\n  for j in range(n):\n    if i == 0:\n      print('*', end='')";
    let s = score(code, &hollow);
    assert!((s.correctness - 1.0).abs() < 1e-6);
    assert!(s.suggestions.is_empty());
  }

  #[test]
  fn condition_weight_only_counts_when_pattern_needs_it() {
    let square = pattern(1);
    let code = "for i in range(n):\n  for j in range(n):\n    if True:\n      print('*')";
    assert!((score(code, &square).correctness - 0.8).abs() < 1e-6);
  }

  #[test]
  fn suggestions_start_with_most_fundamental_gap() {
    let hollow = pattern(11);
    let s = score("x = 1", &hollow);
    assert_eq!(s.correctness, 0.0);
    assert_eq!(s.suggestions[0], "Add a for loop to iterate through rows");
    assert!(s.suggestions[1].starts_with("You need nested loops"));
    assert_eq!(s.suggestions[2], "Add print statements to display the pattern");
    assert_eq!(s.suggestions[3], "Add conditional statements for special cases");
  }

  #[test]
  fn single_loop_gets_nested_loop_hint() {
    let square = pattern(1);
    let s = score("for i in range(4):\n    print('****')", &square);
    assert!((s.correctness - 0.5).abs() < 1e-6);
    assert_eq!(s.hints[0], "You need nested loops for this pattern");
  }

  #[test]
  fn adding_a_loop_never_lowers_the_score() {
    let samples = [
      "", "x", "print('*')", "if x: print('*')", "while True: pass",
      "for i in range(3): print(i)", "console.log('*')", "System.out.println(1); if (a) {}",
    ];
    for p in Catalog::default().all() {
      for code in samples {
        let before = score(code, p).correctness;
        for extended in [format!("{code}\nfor"), format!("for {code}")] {
          let after = score(&extended, p).correctness;
          assert!(after >= before, "pattern {} code {code:?}: {before} -> {after}", p.id);
        }
      }
    }
  }
}

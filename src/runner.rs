//! Real subprocess execution of submissions (opt-in via `execution.mode = "subprocess"`).
//!
//! Each run gets a fresh directory under the system temp dir which is removed
//! afterwards. Every stage (compile, run) is bounded by the configured timeout;
//! on expiry the child is killed (`kill_on_drop`). This is not a sandbox.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::ExecutionConfig;
use crate::domain::Language;

#[derive(Debug, Error)]
pub enum RunError {
  #[error("Code execution timed out ({secs} seconds)")]
  Timeout { secs: u64 },
  #[error("Compilation failed")]
  CompilationFailed { stderr: String },
  #[error("Failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },
  #[error("Execution failed: {0}")]
  Io(#[from] std::io::Error),
}

/// Captured result of a program that ran to completion (any exit code).
#[derive(Debug, Clone)]
pub struct RunOutcome {
  pub stdout: String,
  pub stderr: String,
  pub exit_code: Option<i32>,
  pub elapsed: Duration,
}

impl RunOutcome {
  pub fn success(&self) -> bool {
    self.exit_code == Some(0)
  }
}

#[derive(Clone, Debug)]
pub struct CodeRunner {
  cfg: ExecutionConfig,
}

impl CodeRunner {
  pub fn new(cfg: ExecutionConfig) -> Self {
    Self { cfg }
  }

  fn limit(&self) -> Duration {
    Duration::from_secs(self.cfg.timeout_secs)
  }

  #[instrument(level = "info", skip(self, code, input), fields(%language, code_len = code.len(), input_len = input.len()))]
  pub async fn run(&self, code: &str, language: Language, input: &str) -> Result<RunOutcome, RunError> {
    let root = self.cfg.work_dir.clone().unwrap_or_else(std::env::temp_dir);
    let dir = root.join(format!("codepattern-{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await?;
    let started = Instant::now();
    let result = self.run_in(&dir, code, language, input).await;
    if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
      debug!(target: "runner", dir = %dir.display(), error = %e, "Temp dir cleanup failed");
    }
    match &result {
      Ok(out) => info!(target: "runner", exit_code = ?out.exit_code, run_elapsed = ?out.elapsed, elapsed = ?started.elapsed(), "Run finished"),
      Err(e) => warn!(target: "runner", error = %e, elapsed = ?started.elapsed(), "Run failed"),
    }
    result
  }

  async fn run_in(&self, dir: &Path, code: &str, language: Language, input: &str) -> Result<RunOutcome, RunError> {
    let source = dir.join(source_name(language));
    tokio::fs::write(&source, code).await?;
    let source_arg = source.to_string_lossy().to_string();

    match language {
      Language::Python => self.stage(&self.cfg.python, &[&source_arg], dir, Some(input)).await,
      Language::Javascript => self.stage(&self.cfg.node, &[&source_arg], dir, Some(input)).await,
      Language::Java => {
        self.compile(&self.cfg.javac, &[&source_arg], dir).await?;
        let class_path = dir.to_string_lossy().to_string();
        self.stage(&self.cfg.java, &["-cp", &class_path, "Main"], dir, Some(input)).await
      }
      Language::Cpp => {
        let binary: PathBuf = dir.join("main");
        let binary_arg = binary.to_string_lossy().to_string();
        self.compile(&self.cfg.cxx, &[&source_arg, "-o", &binary_arg], dir).await?;
        self.stage(&binary_arg, &[], dir, Some(input)).await
      }
    }
  }

  async fn compile(&self, command: &str, args: &[&str], dir: &Path) -> Result<(), RunError> {
    let out = self.stage(command, args, dir, None).await?;
    if out.success() {
      Ok(())
    } else {
      Err(RunError::CompilationFailed { stderr: out.stderr })
    }
  }

  /// Spawn `command args...` in `dir`, feed `input` and wait under the timeout.
  /// `command` may carry its own leading arguments (e.g. `"python3 -u"`).
  async fn stage(&self, command: &str, args: &[&str], dir: &Path, input: Option<&str>) -> Result<RunOutcome, RunError> {
    let mut parts = command.split_whitespace();
    let program = parts.next().unwrap_or(command).to_string();

    let mut cmd = Command::new(&program);
    cmd.args(parts)
      .args(args)
      .current_dir(dir)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);

    let started = Instant::now();
    let mut child = cmd.spawn().map_err(|source| RunError::Spawn { program: program.clone(), source })?;
    let stdin = child.stdin.take();
    let input = input.unwrap_or_default().to_string();

    // Fed from its own task so stdout/stderr are drained while stdin is written.
    let feeder = stdin.map(|mut pipe| {
      tokio::spawn(async move {
        // A program that never reads stdin closes the pipe early; that's fine.
        let _ = pipe.write_all(input.as_bytes()).await;
      })
    });
    let wait = child.wait_with_output();

    let waited = tokio::time::timeout(self.limit(), wait).await;
    if let Some(task) = feeder {
      task.abort();
    }
    let output: Output = match waited {
      Ok(res) => res?,
      Err(_) => return Err(RunError::Timeout { secs: self.cfg.timeout_secs }),
    };

    debug!(target: "runner", %program, status = ?output.status, "Stage finished");
    Ok(RunOutcome {
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
      exit_code: output.status.code(),
      elapsed: started.elapsed(),
    })
  }
}

fn source_name(language: Language) -> String {
  match language {
    // javac insists the file name match the public class.
    Language::Java => "Main.java".into(),
    other => format!("main.{}", other.extension()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn runner_with(python: &str, cxx: &str, timeout_secs: u64) -> CodeRunner {
    CodeRunner::new(ExecutionConfig {
      python: python.into(),
      cxx: cxx.into(),
      timeout_secs,
      ..ExecutionConfig::default()
    })
  }

  #[tokio::test]
  async fn captures_stdout_and_feeds_stdin() {
    let runner = runner_with("sh", "g++", 5);
    let out = runner
      .run("read x\necho \"got $x\"", Language::Python, "42\n")
      .await
      .expect("run");
    assert!(out.success());
    assert_eq!(out.stdout, "got 42\n");
  }

  #[tokio::test]
  async fn nonzero_exit_is_an_outcome_not_an_error() {
    let runner = runner_with("sh", "g++", 5);
    let out = runner.run("echo oops >&2\nexit 3", Language::Python, "").await.expect("run");
    assert_eq!(out.exit_code, Some(3));
    assert_eq!(out.stderr, "oops\n");
  }

  #[tokio::test]
  async fn slow_program_times_out() {
    let runner = runner_with("sh", "g++", 1);
    let err = runner.run("sleep 5", Language::Python, "").await.expect_err("timeout");
    assert!(matches!(err, RunError::Timeout { secs: 1 }));
    assert_eq!(err.to_string(), "Code execution timed out (1 seconds)");
  }

  #[tokio::test]
  async fn failing_compiler_reports_compilation_failure() {
    let runner = runner_with("sh", "false", 5);
    let err = runner.run("int main() {}", Language::Cpp, "").await.expect_err("compile");
    assert!(matches!(err, RunError::CompilationFailed { .. }));
  }

  #[tokio::test]
  async fn missing_program_is_a_spawn_error() {
    let runner = runner_with("definitely-not-an-interpreter-7f3a", "g++", 5);
    let err = runner.run("print(1)", Language::Python, "").await.expect_err("spawn");
    assert!(matches!(err, RunError::Spawn { .. }));
  }

  #[tokio::test]
  async fn work_dir_is_left_empty_after_every_outcome() {
    let root = std::env::temp_dir().join(format!("codepattern-runner-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&root).expect("test root");
    let runner = CodeRunner::new(ExecutionConfig {
      python: "sh".into(),
      cxx: "false".into(),
      timeout_secs: 1,
      work_dir: Some(root.clone()),
      ..ExecutionConfig::default()
    });

    let ok = runner.run("echo done", Language::Python, "").await.expect("run");
    assert!(ok.success());
    let compile = runner.run("int main() {}", Language::Cpp, "").await.expect_err("compile");
    assert!(matches!(compile, RunError::CompilationFailed { .. }));
    let slow = runner.run("sleep 5", Language::Python, "").await.expect_err("timeout");
    assert!(matches!(slow, RunError::Timeout { .. }));

    let leftovers = std::fs::read_dir(&root).expect("read root").count();
    std::fs::remove_dir_all(&root).expect("cleanup");
    assert_eq!(leftovers, 0);
  }

  #[tokio::test]
  async fn large_input_does_not_block_a_chatty_program() {
    let runner = runner_with("sh", "g++", 5);
    // Writes well past a pipe buffer before touching stdin.
    let code = "i=0\nwhile [ $i -lt 2000 ]; do echo 'line of output padding padding padding'; i=$((i+1)); done\nwc -c";
    let input = "x".repeat(1 << 20);
    let out = runner.run(code, Language::Python, &input).await.expect("run");
    assert!(out.success());
    assert_eq!(out.stdout.lines().last().map(str::trim), Some("1048576"));
  }

  #[test]
  fn java_source_is_named_after_main_class() {
    assert_eq!(source_name(Language::Java), "Main.java");
    assert_eq!(source_name(Language::Cpp), "main.cpp");
  }
}

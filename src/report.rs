use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

/// Outcome of a single collection step.
///
/// `Ok` and `Warning` are recorded and the run continues; `Fatal` aborts the
/// remaining pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "lowercase")]
pub enum StepResult {
    Ok,
    Warning(String),
    Fatal(String),
}

impl StepResult {
    pub fn warning(reason: impl Into<String>) -> Self {
        StepResult::Warning(reason.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, StepResult::Fatal(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: String,
    #[serde(flatten)]
    pub result: StepResult,
}

/// Structured step-result log for one run, decoupled from the console
/// rendering so tests can assert on it and support tooling can read it back
/// out of the bundle.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub collector_version: &'static str,
    pub hostname: String,
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
}

impl RunReport {
    pub fn new() -> Self {
        RunReport {
            collector_version: env!("CARGO_PKG_VERSION"),
            hostname: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".into()),
            started_at: Utc::now(),
            steps: Vec::new(),
        }
    }

    /// Record a step's outcome and narrate it to the operator.
    pub fn record(&mut self, step: &str, result: StepResult) {
        match &result {
            StepResult::Ok => {
                println!("{} {}", "ok".green().bold(), step);
            }
            StepResult::Warning(reason) => {
                println!("{} {}: {}", "!!".yellow().bold(), step, reason);
            }
            StepResult::Fatal(reason) => {
                println!("{} {}: {}", "xx".red().bold(), step, reason);
            }
        }
        self.steps.push(StepRecord {
            step: step.to_string(),
            result,
        });
    }

    pub fn fatal_reason(&self) -> Option<&str> {
        self.steps.iter().find_map(|r| match &r.result {
            StepResult::Fatal(reason) => Some(reason.as_str()),
            _ => None,
        })
    }

    pub fn warning_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|r| matches!(r.result, StepResult::Warning(_)))
            .count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// One-line wrap-up after the pipeline finishes.
    pub fn render_summary(&self) {
        let warnings = self.warning_count();
        if let Some(reason) = self.fatal_reason() {
            println!(
                "{} collection aborted: {} ({} steps recorded, {} warnings)",
                "xx".red().bold(),
                reason,
                self.steps.len(),
                warnings
            );
        } else if warnings > 0 {
            println!(
                "{} collection finished with {} warnings ({} steps)",
                "!!".yellow().bold(),
                warnings,
                self.steps.len()
            );
        } else {
            println!(
                "{} collection finished cleanly ({} steps)",
                "ok".green().bold(),
                self.steps.len()
            );
        }
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

//! Scenario execution
//!
//! The Runner builds a fresh event loop per scenario, captures its console
//! output and diagnostics, and compares the output with the expected order.

use crate::scenarios::Scenario;
use loop_runtime::{CaptureSink, Diagnostic, EventLoop, LoopConfig, RunSummary};
use serde::Serialize;

/// Outcome of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Which scenario ran
    pub scenario: Scenario,
    /// Console lines in the order they were written
    pub output: Vec<String>,
    /// Diagnostics reported by the loop
    pub diagnostics: Vec<Diagnostic>,
    /// Counters for the run
    pub summary: RunSummary,
    /// Set when the run stopped with an error
    pub error: Option<String>,
    /// Whether `output` equals the scenario's expected order
    pub matches_expected: bool,
}

impl ScenarioReport {
    /// Returns true if the run finished and printed the expected order.
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.matches_expected
    }
}

/// Runs scenarios with a fixed loop configuration
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: LoopConfig,
}

impl Runner {
    /// Create a runner
    ///
    /// # Example
    /// ```
    /// use loop_cli::{Runner, Scenario};
    /// use loop_runtime::LoopConfig;
    ///
    /// let runner = Runner::new(LoopConfig::default());
    /// let report = runner.run(Scenario::Mashup);
    /// assert_eq!(report.output, vec!["5", "1", "3", "4", "2"]);
    /// ```
    pub fn new(config: LoopConfig) -> Self {
        Self { config }
    }

    /// Run one scenario on a fresh event loop
    pub fn run(&self, scenario: Scenario) -> ScenarioReport {
        let sink = CaptureSink::new();
        let event_loop = EventLoop::builder()
            .with_config(self.config.clone())
            .with_sink(sink.clone())
            .build();

        tracing::info!(%scenario, "running scenario");
        let result = event_loop.run(scenario.script());

        let output = sink.lines();
        let matches_expected = output == scenario.expected_output();
        if !matches_expected {
            tracing::warn!(%scenario, ?output, "output differs from expected order");
        }

        ScenarioReport {
            scenario,
            output,
            diagnostics: event_loop.diagnostics(),
            summary: event_loop.summary(),
            error: result.err().map(|e| e.to_string()),
            matches_expected,
        }
    }

    /// Run several scenarios in order
    pub fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioReport> {
        scenarios.iter().map(|s| self.run(*s)).collect()
    }
}

/// Render a report the way `loopsim` prints it without `--json`
pub fn render_text(report: &ScenarioReport) -> String {
    let mut text = format!(
        "== {}: {} ==\n",
        report.scenario,
        report.scenario.description()
    );
    for line in &report.output {
        text.push_str(line);
        text.push('\n');
    }
    for diagnostic in &report.diagnostics {
        let line = match diagnostic {
            Diagnostic::UnhandledRejection { promise, reason } => {
                format!("!! unhandled rejection in {}: {}", promise, reason)
            }
            Diagnostic::RejectionHandled { promise } => {
                format!("!! rejection in {} handled late", promise)
            }
            Diagnostic::MicrotaskError { seq, error } => {
                format!("!! microtask {} threw: {}", seq, error)
            }
        };
        text.push_str(&line);
        text.push('\n');
    }
    if let Some(error) = &report.error {
        text.push_str(&format!("!! run aborted: {}\n", error));
    }

    let summary = &report.summary;
    let status = if report.passed() { "ok" } else { "MISMATCH" };
    text.push_str(&format!(
        "-- {} macrotasks, {} microtasks, t={}ms, {} unhandled rejections [{}]\n",
        summary.macrotasks_run,
        summary.microtasks_run,
        summary.final_time_ms,
        summary.unhandled_rejections,
        status
    ));
    text
}

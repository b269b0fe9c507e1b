//! End-to-End CLI Integration Tests
//!
//! Drives the bundled scenarios through the loop_cli Runner, the same path
//! the `loopsim` binary takes.

use loop_cli::runner::render_text;
use loop_cli::{Runner, Scenario};
use loop_runtime::{LoopConfig, RejectionPolicy};

/// Test: every bundled scenario prints its expected order
#[test]
fn test_e2e_all_scenarios_pass() {
    let runner = Runner::new(LoopConfig::default());
    for report in runner.run_all(&Scenario::ALL) {
        assert_eq!(
            report.output,
            report.scenario.expected_output(),
            "scenario {}",
            report.scenario
        );
        assert!(report.error.is_none());
    }
}

/// Test: scenarios are independent of each other
#[test]
fn test_e2e_repeated_runs_are_identical() {
    let runner = Runner::default();
    let first = runner.run(Scenario::UserFilter);
    let second = runner.run(Scenario::UserFilter);

    assert_eq!(first.output, second.output);
    assert_eq!(first.summary, second.summary);
}

/// Test: the clock starts where the config says
#[test]
fn test_e2e_start_time_from_config() {
    let config = LoopConfig::from_json_str(r#"{ "start_time_ms": 1000 }"#).unwrap();
    let report = Runner::new(config).run(Scenario::Mashup);

    assert!(report.passed());
    assert_eq!(report.summary.final_time_ms, 1010);
}

/// Test: only the unhandled-rejection scenario fails under the fatal policy
#[test]
fn test_e2e_fatal_policy_only_affects_rejections() {
    let config = LoopConfig {
        unhandled_rejections: RejectionPolicy::Fatal,
        ..LoopConfig::default()
    };
    let runner = Runner::new(config);

    let failed: Vec<Scenario> = runner
        .run_all(&Scenario::ALL)
        .into_iter()
        .filter(|r| !r.passed())
        .map(|r| r.scenario)
        .collect();
    assert_eq!(failed, vec![Scenario::UnhandledRejection]);
}

/// Test: JSON reports carry the console-style object formatting
#[test]
fn test_e2e_json_report_for_user_filter() {
    let reports = Runner::default().run_all(&[Scenario::UserFilter]);
    let json = serde_json::to_value(&reports).unwrap();

    assert_eq!(json[0]["scenario"], "user-filter");
    assert_eq!(
        json[0]["output"][0],
        r#"Filtering User: { name: "Haitam", username: "sch0penheimer" }"#
    );
    assert_eq!(json[0]["diagnostics"].as_array().unwrap().len(), 0);
}

/// Test: text report flags a mismatch
#[test]
fn test_e2e_text_report_flags_aborted_run() {
    let config = LoopConfig {
        max_macrotasks: Some(0),
        ..LoopConfig::default()
    };
    let text = render_text(&Runner::new(config).run(Scenario::PromiseInit));

    assert!(text.contains("!! run aborted: macrotask limit of 0 exceeded"));
    assert!(text.ends_with("[MISMATCH]\n"));
}

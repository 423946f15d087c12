// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::observation::ObservationSnapshot;
use crate::supervisor::{ScenarioId, ScenarioPhase};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Finished,
    Failed,
    Skipped,
}

/// What happened to one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: ScenarioId,
    pub number: u32,
    pub outcome: ScenarioOutcome,
    pub phases: Vec<ScenarioPhase>,
    pub duration_ms: u64,
    /// Failure message or skip reason
    pub detail: Option<String>,
    pub raw_file: Option<PathBuf>,
    /// Load errors abort the remaining scenarios
    #[serde(skip)]
    pub fatal: bool,
}

/// Outcome of a whole supervisor run.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorReport {
    pub scenarios: Vec<ScenarioReport>,
    pub aborted: bool,
    pub observation: ObservationSnapshot,
}

impl SupervisorReport {
    /// Every scenario finished or was skipped and nothing aborted the run.
    pub fn success(&self) -> bool {
        !self.aborted
            && self
                .scenarios
                .iter()
                .all(|s| s.outcome != ScenarioOutcome::Failed)
    }

    pub fn outcome_of(&self, id: ScenarioId) -> Option<ScenarioOutcome> {
        self.scenarios
            .iter()
            .find(|s| s.scenario == id)
            .map(|s| s.outcome)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json)
    }

    /// Print a human-readable summary table.
    pub fn print_summary(&self) {
        println!("Scenario summary");
        println!("{}", "─".repeat(60));
        for report in &self.scenarios {
            let marker = match report.outcome {
                ScenarioOutcome::Finished => "✅",
                ScenarioOutcome::Failed => "❌",
                ScenarioOutcome::Skipped => "⏭️",
            };
            let phases: Vec<&str> = report.phases.iter().map(|p| p.as_str()).collect();
            println!(
                "{} {} {:<45} {:>6} ms  [{}]",
                marker,
                report.scenario,
                report.scenario.title(),
                report.duration_ms,
                phases.join(" → ")
            );
            if let Some(detail) = &report.detail {
                println!("     {}", detail);
            }
        }
        println!("{}", "─".repeat(60));
        let obs = &self.observation;
        println!(
            "runs started/finished: {}/{}  data points: {}  threshold trips: {}  late callbacks: {}",
            obs.runs_started, obs.runs_finished, obs.data_points, obs.threshold_trips, obs.late_callbacks
        );
        if self.aborted {
            println!("Run aborted: the engine module could not be loaded");
        }
    }
}

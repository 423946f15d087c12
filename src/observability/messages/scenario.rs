// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for supervisor scenario events.
//!
//! This module contains message types for logging events related to:
//! * Scenario start, completion, failure and skip
//! * Phase transitions inside a scenario
//! * In-flight observations (plot inspection, listings, countdowns)
//! * Raw-file verification

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Scenario started.
///
/// # Example
/// ```
/// use ngspice_harness::observability::messages::scenario::ScenarioStarted;
///
/// let msg = ScenarioStarted {
///     scenario: 3,
///     title: "in-flight observation and parameter alter",
/// };
///
/// assert_eq!(msg.to_string(), "Scenario S3 started: in-flight observation and parameter alter");
/// ```
pub struct ScenarioStarted<'a> {
    pub scenario: u32,
    pub title: &'a str,
}

impl Display for ScenarioStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scenario S{} started: {}", self.scenario, self.title)
    }
}

impl StructuredLog for ScenarioStarted<'_> {
    fn log(&self) {
        tracing::info!(scenario = self.scenario, title = self.title, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("scenario", span_name = name, scenario = self.scenario)
    }
}

/// Scenario moved from one phase to the next.
pub struct ScenarioPhaseChanged<'a> {
    pub scenario: u32,
    pub from: &'a str,
    pub to: &'a str,
}

impl Display for ScenarioPhaseChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scenario S{}: {} -> {}", self.scenario, self.from, self.to)
    }
}

impl StructuredLog for ScenarioPhaseChanged<'_> {
    fn log(&self) {
        tracing::info!(
            scenario = self.scenario,
            from = self.from,
            to = self.to,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("phase", span_name = name, scenario = self.scenario, to = self.to)
    }
}

/// Scenario finished successfully.
pub struct ScenarioCompleted {
    pub scenario: u32,
    pub duration: Duration,
}

impl Display for ScenarioCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scenario S{} finished in {:?}", self.scenario, self.duration)
    }
}

impl StructuredLog for ScenarioCompleted {
    fn log(&self) {
        tracing::info!(
            scenario = self.scenario,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("scenario_completed", span_name = name, scenario = self.scenario)
    }
}

/// Scenario failed.
pub struct ScenarioFailed<'a> {
    pub scenario: u32,
    pub error: &'a dyn std::error::Error,
}

impl Display for ScenarioFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scenario S{} failed: {}", self.scenario, self.error)
    }
}

impl StructuredLog for ScenarioFailed<'_> {
    fn log(&self) {
        tracing::error!(scenario = self.scenario, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "scenario_failed",
            span_name = name,
            scenario = self.scenario,
            error = %self.error,
        )
    }
}

/// Scenario skipped; not a failure.
pub struct ScenarioSkipped<'a> {
    pub scenario: u32,
    pub reason: &'a str,
}

impl Display for ScenarioSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scenario S{} skipped: {}", self.scenario, self.reason)
    }
}

/// One tick of the pause countdown.
pub struct PauseCountdown {
    pub remaining_secs: u64,
}

impl Display for PauseCountdown {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pause for {} more second(s)", self.remaining_secs)
    }
}

/// Result of inspecting the current plot while the worker runs.
pub struct PlotInspected<'a> {
    pub plot: &'a str,
    pub vector_count: usize,
    pub first_vector: &'a str,
    pub length: usize,
}

impl Display for PlotInspected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Plot '{}' has {} vectors; '{}' holds {} points",
            self.plot, self.vector_count, self.first_vector, self.length
        )
    }
}

/// Output of the `listing` command captured after a halt.
pub struct ListingCaptured {
    pub line_count: usize,
}

impl Display for ListingCaptured {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Circuit listing captured ({} lines)", self.line_count)
    }
}

/// Halt signal arrived through the bridge.
pub struct HaltSignalReceived {
    pub scenario: u32,
}

impl Display for HaltSignalReceived {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scenario S{}: halt signal received, halting background run", self.scenario)
    }
}

/// Raw file read back and checked.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RawFileVerified<'a> {
    pub path: &'a str,
    pub vector: &'a str,
    pub points: usize,
    pub final_value: f64,
}

impl Display for RawFileVerified<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Raw file '{}' verified: {} points, final {} = {:.6}",
            self.path, self.points, self.vector, self.final_value
        )
    }
}

impl StructuredLog for RawFileVerified<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            vector = self.vector,
            points = self.points,
            final_value = self.final_value,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("raw_verified", span_name = name, path = self.path)
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scenario driver.
//!
//! The [`Supervisor`] owns the engine handle and the observer. It runs the
//! selected scenarios in order on the calling thread, re-instantiating the
//! engine where a scenario needs a fresh one. A module load failure aborts the
//! run; any other failure tears the engine down and moves on.

use crate::config::HarnessConfig;
use crate::errors::{EngineError, ScenarioError};
use crate::observability::messages::scenario::{
    HaltSignalReceived, ListingCaptured, PauseCountdown, PlotInspected, RawFileVerified,
    ScenarioCompleted, ScenarioFailed, ScenarioSkipped, ScenarioStarted,
};
use crate::observability::messages::StructuredLog;
use crate::observation::{Observer, WatchPolicy};
use crate::raw::RawFile;
use crate::signal::{directed_delivery_supported, SignalBridge};
use crate::supervisor::report::{ScenarioOutcome, ScenarioReport, SupervisorReport};
use crate::supervisor::scenario::{BAD_INCLUDE_CIRCUIT, RC_CIRCUIT};
use crate::supervisor::waits::{hold, wait_for_quiescence, wait_for_run_start, wait_until};
use crate::supervisor::{ScenarioId, ScenarioPhase, ScenarioTracker};
use crate::traits::{EngineFactory, Simulator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

enum Completion {
    Finished { raw_file: Option<PathBuf> },
    Skipped(String),
}

pub struct Supervisor {
    config: HarnessConfig,
    factory: Box<dyn EngineFactory>,
    observer: Arc<Observer>,
    engine: Option<Box<dyn Simulator>>,
    rc_loaded: bool,
}

impl Supervisor {
    pub fn new(config: HarnessConfig, factory: Box<dyn EngineFactory>) -> Self {
        let policy = WatchPolicy::new(config.watch.vector.clone(), config.watch.threshold)
            .with_yield(config.timing.break_yield());
        Self {
            config,
            factory,
            observer: Arc::new(Observer::new(policy)),
            engine: None,
            rc_loaded: false,
        }
    }

    pub fn observer(&self) -> &Arc<Observer> {
        &self.observer
    }

    /// Run every selected scenario and tear the engine down afterwards.
    pub async fn run(&mut self) -> SupervisorReport {
        let mut scenarios = Vec::new();
        let mut aborted = false;

        let selected: Vec<ScenarioId> = self
            .config
            .scenarios
            .iter()
            .filter_map(|&n| ScenarioId::from_number(n))
            .collect();
        for id in selected {
            let report = self.run_scenario(id).await;
            let fatal = report.fatal;
            scenarios.push(report);
            if fatal {
                aborted = true;
                break;
            }
        }

        self.teardown();
        SupervisorReport {
            scenarios,
            aborted,
            observation: self.observer.state().snapshot(),
        }
    }

    /// Run a single scenario against the current (or a fresh) engine.
    pub async fn run_scenario(&mut self, id: ScenarioId) -> ScenarioReport {
        let started = ScenarioStarted {
            scenario: id.number(),
            title: id.title(),
        };
        started.log();
        let span = started.span("run_scenario");

        self.observer.reset_for_scenario(id);
        let mut tracker = ScenarioTracker::new(id);
        let start = Instant::now();

        let result = async {
            match id {
                ScenarioId::AdderSourcing => self.adder_sourcing(&mut tracker).await,
                ScenarioId::ParseRecovery => self.parse_recovery(&mut tracker).await,
                ScenarioId::InFlightAlter => self.in_flight_alter(&mut tracker).await,
                ScenarioId::SignalHalt => self.signal_halt(&mut tracker).await,
            }
        }
        .instrument(span)
        .await;

        let duration = start.elapsed();
        let mut report = ScenarioReport {
            scenario: id,
            number: id.number(),
            outcome: ScenarioOutcome::Finished,
            phases: Vec::new(),
            duration_ms: duration.as_millis() as u64,
            detail: None,
            raw_file: None,
            fatal: false,
        };

        match result {
            Ok(Completion::Finished { raw_file }) => {
                if let Err(error) = tracker.advance(ScenarioPhase::Finished) {
                    report.outcome = ScenarioOutcome::Failed;
                    report.detail = Some(error.to_string());
                } else {
                    ScenarioCompleted {
                        scenario: id.number(),
                        duration,
                    }
                    .log();
                }
                report.raw_file = raw_file;
            }
            Ok(Completion::Skipped(reason)) => {
                tracing::warn!(
                    "{}",
                    ScenarioSkipped {
                        scenario: id.number(),
                        reason: &reason,
                    }
                );
                report.outcome = ScenarioOutcome::Skipped;
                report.detail = Some(reason);
            }
            Err(error) => {
                tracker.fail();
                ScenarioFailed {
                    scenario: id.number(),
                    error: &error,
                }
                .log();
                report.outcome = ScenarioOutcome::Failed;
                report.fatal = matches!(&error, ScenarioError::Engine(e) if e.is_load_error());
                report.detail = Some(error.to_string());
                self.teardown();
            }
        }

        self.observer.disarm_halt_signal();
        report.phases = tracker.history().to_vec();
        report
    }

    /// Stop the worker and release the current engine, if any.
    pub fn teardown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.unload();
        }
        self.rc_loaded = false;
    }

    fn fresh_engine(&mut self) -> Result<(), ScenarioError> {
        self.teardown();
        let engine = self.factory.instantiate(Arc::clone(&self.observer))?;
        self.engine = Some(engine);
        Ok(())
    }

    fn engine(&mut self) -> Result<&mut Box<dyn Simulator>, ScenarioError> {
        self.engine
            .as_mut()
            .ok_or_else(|| EngineError::Unloaded.into())
    }

    fn command(&mut self, text: &str) -> Result<i32, ScenarioError> {
        Ok(self.engine()?.command(text)?)
    }

    fn poll(&self) -> Duration {
        self.config.timing.poll_interval()
    }

    /// Issue `bg_run` or `bg_resume` and wait for the worker to report it started.
    async fn start_worker(&mut self, command: &str) -> Result<(), ScenarioError> {
        let since = self.observer.state().runs_started();
        if command == "bg_run" {
            self.observer.begin_run();
        }
        self.command(command)?;
        wait_for_run_start(
            &self.observer,
            self.poll(),
            self.config.timing.start_timeout(),
            since,
        )
        .await
    }

    async fn quiesce(&self) -> Result<(), ScenarioError> {
        wait_for_quiescence(&self.observer, self.poll(), self.config.timing.settle_timeout()).await
    }

    async fn countdown(&self, pause: Duration) -> Result<(), ScenarioError> {
        let mut remaining = pause;
        while !remaining.is_zero() {
            let secs = (remaining.as_millis() as u64).div_ceil(1000);
            tracing::info!("{}", PauseCountdown { remaining_secs: secs });
            let step = remaining.min(Duration::from_secs(1));
            hold(&self.observer, step).await?;
            remaining -= step;
        }
        Ok(())
    }

    fn write_raw(&mut self, file: &str, vector: &str) -> Result<PathBuf, ScenarioError> {
        let path = self.config.files.output_path(file);
        self.command(&format!("write {} {}", path.display(), vector))?;
        if !path.exists() {
            return Err(ScenarioError::RawFileMissing(path.display().to_string()));
        }
        Ok(path)
    }

    fn load_rc_circuit(&mut self) -> Result<(), ScenarioError> {
        self.engine()?.load_circuit(&RC_CIRCUIT)?;
        self.rc_loaded = true;
        Ok(())
    }

    /// S1: source a circuit, run it in the background, pause, resume and inspect
    /// the plot while it runs.
    async fn adder_sourcing(
        &mut self,
        tracker: &mut ScenarioTracker,
    ) -> Result<Completion, ScenarioError> {
        let timing = self.config.timing.clone();
        self.fresh_engine()?;

        let circuit = self.config.files.adder_circuit.display().to_string();
        self.command(&format!("source {}", circuit))?;
        self.start_worker("bg_run").await?;
        tracker.advance(ScenarioPhase::Running)?;

        hold(&self.observer, timing.run_before_halt()).await?;
        self.command("bg_halt")?;
        self.quiesce().await?;
        tracker.advance(ScenarioPhase::Paused)?;

        self.countdown(timing.pause()).await?;
        self.start_worker("bg_resume").await?;
        tracker.advance(ScenarioPhase::Resumed)?;

        hold(&self.observer, timing.resume_settle()).await?;
        self.inspect_current_plot()?;

        self.quiesce().await?;
        let files = self.config.files.clone();
        let path = self.write_raw(&files.s1_raw, &files.s1_vector)?;
        self.teardown();
        Ok(Completion::Finished {
            raw_file: Some(path),
        })
    }

    fn inspect_current_plot(&mut self) -> Result<(), ScenarioError> {
        let engine = self.engine()?;
        let plot = engine.current_plot()?;
        if plot.is_empty() {
            return Err(EngineError::NoData {
                operation: "current plot".to_string(),
            }
            .into());
        }
        let vectors = engine.all_vectors(&plot)?;
        let first = vectors.first().ok_or_else(|| EngineError::NoData {
            operation: format!("vectors of plot '{}'", plot),
        })?;
        let data = engine.vector_info(&format!("{}.{}", plot, first))?;
        if data.is_empty() {
            return Err(EngineError::NoData {
                operation: format!("samples of '{}'", first),
            }
            .into());
        }

        tracing::info!(
            "{}",
            PlotInspected {
                plot: &plot,
                vector_count: vectors.len(),
                first_vector: first,
                length: data.len(),
            }
        );
        Ok(())
    }

    /// S2: feed a circuit with a missing include line by line and unload once
    /// the engine asks for it.
    async fn parse_recovery(
        &mut self,
        tracker: &mut ScenarioTracker,
    ) -> Result<Completion, ScenarioError> {
        self.fresh_engine()?;
        // Parsing happens while the lines are submitted
        tracker.advance(ScenarioPhase::Running)?;

        for line in BAD_INCLUDE_CIRCUIT {
            if self.observer.state().pending_unload() {
                break;
            }
            self.command(&format!("circbyline {}", line))?;
        }

        wait_until(
            &self.observer,
            self.poll(),
            self.config.timing.exit_timeout(),
            "engine to request unload",
            |state| state.pending_unload(),
        )
        .await?;

        if let Some(exit) = self.observer.state().exit_request() {
            tracing::info!(kind = ?exit.kind, status = exit.status, "Unloading at engine request");
        }
        self.teardown();
        Ok(Completion::Finished { raw_file: None })
    }

    /// S3: run the RC circuit, halt when the watched vector crosses the
    /// threshold, alter the capacitor and resume.
    async fn in_flight_alter(
        &mut self,
        tracker: &mut ScenarioTracker,
    ) -> Result<Completion, ScenarioError> {
        self.fresh_engine()?;
        self.load_rc_circuit()?;
        self.start_worker("bg_run").await?;
        tracker.advance(ScenarioPhase::Running)?;

        let mut altered = false;
        loop {
            wait_until(
                &self.observer,
                self.poll(),
                self.config.timing.settle_timeout(),
                "threshold crossing or idle worker",
                |state| (state.break_reached() && !altered) || state.quiescent(),
            )
            .await?;

            if self.observer.state().break_reached() && !altered {
                self.command("bg_halt")?;
                self.quiesce().await?;
                tracker.advance(ScenarioPhase::Paused)?;

                let listing = self.engine()?.exec_command("listing")?;
                tracing::info!(
                    "{}",
                    ListingCaptured {
                        line_count: listing.len()
                    }
                );
                self.command("alter c1=2")?;
                tracker.advance(ScenarioPhase::Altered)?;

                self.start_worker("bg_resume").await?;
                tracker.advance(ScenarioPhase::Resumed)?;
                altered = true;
                continue;
            }
            break;
        }

        if !altered {
            return Err(ScenarioError::BreakpointNotReached {
                vector: self.config.watch.vector.clone(),
                threshold: self.config.watch.threshold,
            });
        }

        self.quiesce().await?;
        let file = self.config.files.s3_raw.clone();
        let path = self.write_and_verify_rc(&file)?;
        Ok(Completion::Finished {
            raw_file: Some(path),
        })
    }

    /// S4: the data callback raises the halt signal toward this thread; the
    /// bridge turns it into `bg_halt`.
    async fn signal_halt(
        &mut self,
        tracker: &mut ScenarioTracker,
    ) -> Result<Completion, ScenarioError> {
        if !directed_delivery_supported() {
            return Ok(Completion::Skipped(
                ScenarioError::SignalUnsupported.to_string(),
            ));
        }

        if self.engine.is_none() || !self.rc_loaded {
            self.fresh_engine()?;
            self.load_rc_circuit()?;
        }

        let bridge =
            SignalBridge::install(self.config.signal).map_err(ScenarioError::SignalInstall)?;
        self.observer.arm_halt_signal(bridge.target(), bridge.signal());
        let token = bridge.token();

        self.start_worker("bg_run").await?;
        tracker.advance(ScenarioPhase::Running)?;

        let signalled = tokio::select! {
            _ = token.cancelled() => true,
            settled = self.quiesce() => {
                settled?;
                // The bridge task may not have been polled yet
                bridge.received()
                    || tokio::time::timeout(self.poll(), token.cancelled()).await.is_ok()
            }
        };
        if !signalled {
            return Err(ScenarioError::SignalNotDelivered);
        }

        tracing::info!(
            "{}",
            HaltSignalReceived {
                scenario: ScenarioId::SignalHalt.number()
            }
        );
        self.command("bg_halt")?;
        self.quiesce().await?;
        tracker.advance(ScenarioPhase::Paused)?;

        self.command("echo alter command issued")?;
        self.command("alter c1=1")?;
        tracker.advance(ScenarioPhase::Altered)?;

        self.start_worker("bg_resume").await?;
        tracker.advance(ScenarioPhase::Resumed)?;

        self.quiesce().await?;
        let file = self.config.files.s4_raw.clone();
        let path = self.write_and_verify_rc(&file)?;
        Ok(Completion::Finished {
            raw_file: Some(path),
        })
    }

    fn write_and_verify_rc(&mut self, file: &str) -> Result<PathBuf, ScenarioError> {
        let vector = self.config.watch.vector.clone();
        let path = self.write_raw(file, &vector)?;
        verify_rc_raw(&path, &vector, self.config.watch.threshold)?;
        Ok(path)
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// The scale column never decreases and the watched vector ends finite and
/// above the threshold.
pub fn verify_rc_raw(path: &Path, vector: &str, threshold: f64) -> Result<(), ScenarioError> {
    let raw = RawFile::read(path)?;
    let scale = raw
        .scale()
        .ok_or_else(|| ScenarioError::RoundTrip("raw file has no scale column".to_string()))?;
    if !scale.is_non_decreasing() {
        return Err(ScenarioError::RoundTrip(format!(
            "scale column of '{}' decreases",
            path.display()
        )));
    }

    let column = raw.column(vector).ok_or_else(|| {
        ScenarioError::RoundTrip(format!("vector '{}' missing from '{}'", vector, path.display()))
    })?;
    let final_value = column
        .last()
        .ok_or_else(|| ScenarioError::RoundTrip(format!("vector '{}' has no samples", vector)))?;
    if !final_value.is_finite() || final_value <= threshold {
        return Err(ScenarioError::RoundTrip(format!(
            "final {} = {} is not a finite value above {}",
            vector, final_value, threshold
        )));
    }

    RawFileVerified {
        path: &path.display().to_string(),
        vector,
        points: column.len(),
        final_value,
    }
    .log();
    Ok(())
}

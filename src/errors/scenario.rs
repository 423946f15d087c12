// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::EngineError;
use crate::raw::RawFileError;
use crate::supervisor::ScenarioPhase;
use std::time::Duration;
use thiserror::Error;

/// Reasons a scenario can end in the `Failed` phase.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A readiness wait ran past its deadline.
    #[error("Timed out after {after:?} waiting for {waiting_for}")]
    Timeout {
        waiting_for: &'static str,
        after: Duration,
    },

    /// The engine asked to be unloaded while the scenario still needed it.
    #[error("Engine requested exit with status {status} during the scenario")]
    EngineExitRequested { status: i32 },

    /// Directed signal delivery is not available on this platform.
    #[error("Thread-directed signal delivery is not supported on this platform")]
    SignalUnsupported,

    /// The halt signal bridge could not be installed.
    #[error("Failed to install halt signal handler: {0}")]
    SignalInstall(#[source] std::io::Error),

    /// The run completed without the halt signal ever arriving.
    #[error("Halt signal was never delivered before the run completed")]
    SignalNotDelivered,

    /// The watched vector never crossed the threshold.
    #[error("Watched vector '{vector}' never exceeded {threshold}")]
    BreakpointNotReached { vector: String, threshold: f64 },

    /// A `write` command did not produce its file.
    #[error("Raw file '{0}' was not created")]
    RawFileMissing(String),

    #[error("Raw file could not be read: {0}")]
    RawFile(#[from] RawFileError),

    /// The raw file contradicts the expected waveform shape.
    #[error("Round-trip check failed: {0}")]
    RoundTrip(String),

    /// The phase machine refused a transition.
    #[error("Invalid phase transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: ScenarioPhase,
        to: ScenarioPhase,
    },
}

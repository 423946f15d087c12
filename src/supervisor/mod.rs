// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scenario supervision.
//!
//! The supervisor drives the engine through four scripted scenarios:
//!
//! 1. Source a circuit, run it in the background, pause, resume and query it
//! 2. Feed a circuit with a broken include and unload when the engine asks
//! 3. Halt on a threshold crossing, alter a capacitor and resume
//! 4. Halt through a signal raised from the data callback
//!
//! Each scenario walks a small phase machine ([`ScenarioPhase`]) and ends in
//! a [`ScenarioReport`]. Waits never spin: they wake on observer callbacks
//! and re-check at the configured poll interval.

mod phase;
mod report;
mod runner;
mod scenario;
pub mod waits;


pub use phase::{ScenarioPhase, ScenarioTracker};
pub use report::{ScenarioOutcome, ScenarioReport, SupervisorReport};
pub use runner::{verify_rc_raw, Supervisor};
pub use scenario::{ScenarioId, BAD_INCLUDE_CIRCUIT, RC_CIRCUIT};

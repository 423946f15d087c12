// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Circuit handed to `circbyline` in the parse-recovery scenario. The include
/// target does not exist, so parsing fails and the engine asks to be unloaded.
pub const BAD_INCLUDE_CIRCUIT: [&str; 6] = [
    "fail test",
    "V1 1 0 1",
    "R1 1 0 1",
    ".include xyz",
    ".dc V1 0 1 0.1",
    ".end",
];

/// RC charging circuit shared by the alter and signal scenarios.
pub const RC_CIRCUIT: [&str; 6] = [
    "test array",
    "V1 1 0 1",
    "R1 1 2 1",
    "C1 2 0 1 ic=0",
    ".tran 10u 3 uic",
    ".end",
];

/// Scripted scenarios, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioId {
    /// S1: run, pause, resume and query while running
    AdderSourcing,
    /// S2: recover from a failed parse by unloading
    ParseRecovery,
    /// S3: halt on threshold, alter, resume
    InFlightAlter,
    /// S4: halt through a signal raised from the data callback
    SignalHalt,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 4] = [
        ScenarioId::AdderSourcing,
        ScenarioId::ParseRecovery,
        ScenarioId::InFlightAlter,
        ScenarioId::SignalHalt,
    ];

    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(ScenarioId::AdderSourcing),
            2 => Some(ScenarioId::ParseRecovery),
            3 => Some(ScenarioId::InFlightAlter),
            4 => Some(ScenarioId::SignalHalt),
            _ => None,
        }
    }

    pub fn number(self) -> u32 {
        match self {
            ScenarioId::AdderSourcing => 1,
            ScenarioId::ParseRecovery => 2,
            ScenarioId::InFlightAlter => 3,
            ScenarioId::SignalHalt => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ScenarioId::AdderSourcing => "run, pause and resume a sourced circuit",
            ScenarioId::ParseRecovery => "parse failure recovery",
            ScenarioId::InFlightAlter => "in-flight observation and parameter alter",
            ScenarioId::SignalHalt => "signal-driven halt",
        }
    }

    /// The data callback raises the halt signal when this scenario's threshold trips.
    pub fn signals_on_break(self) -> bool {
        matches!(self, ScenarioId::SignalHalt)
    }
}

impl Display for ScenarioId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "S{}", self.number())
    }
}

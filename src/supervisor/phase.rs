// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ScenarioError;
use crate::observability::messages::scenario::ScenarioPhaseChanged;
use crate::observability::messages::StructuredLog;
use crate::supervisor::ScenarioId;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Phase of a scenario's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPhase {
    Submitted,
    Running,
    Paused,
    Altered,
    Resumed,
    Finished,
    Failed,
}

impl ScenarioPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioPhase::Submitted => "submitted",
            ScenarioPhase::Running => "running",
            ScenarioPhase::Paused => "paused",
            ScenarioPhase::Altered => "altered",
            ScenarioPhase::Resumed => "resumed",
            ScenarioPhase::Finished => "finished",
            ScenarioPhase::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ScenarioPhase::Finished | ScenarioPhase::Failed)
    }

    /// Whether the machine may move from `self` to `next`.
    pub fn can_advance_to(self, next: ScenarioPhase) -> bool {
        use ScenarioPhase::*;
        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }
        matches!(
            (self, next),
            (Submitted, Running)
                | (Submitted, Finished)
                | (Running, Paused)
                | (Running, Finished)
                | (Paused, Altered)
                | (Paused, Resumed)
                | (Altered, Resumed)
                | (Resumed, Finished)
        )
    }
}

impl Display for ScenarioPhase {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks one scenario's phase and the path it took.
#[derive(Debug, Clone)]
pub struct ScenarioTracker {
    id: ScenarioId,
    history: Vec<ScenarioPhase>,
}

impl ScenarioTracker {
    pub fn new(id: ScenarioId) -> Self {
        Self {
            id,
            history: vec![ScenarioPhase::Submitted],
        }
    }

    pub fn phase(&self) -> ScenarioPhase {
        *self.history.last().unwrap_or(&ScenarioPhase::Submitted)
    }

    pub fn history(&self) -> &[ScenarioPhase] {
        &self.history
    }

    pub fn advance(&mut self, next: ScenarioPhase) -> Result<(), ScenarioError> {
        let current = self.phase();
        if !current.can_advance_to(next) {
            return Err(ScenarioError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        ScenarioPhaseChanged {
            scenario: self.id.number(),
            from: current.as_str(),
            to: next.as_str(),
        }
        .log();
        self.history.push(next);
        Ok(())
    }

    /// Move to `Failed` unless already terminal.
    pub fn fail(&mut self) {
        if !self.phase().is_terminal() {
            let _ = self.advance(ScenarioPhase::Failed);
        }
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for events delivered through the engine callbacks.
//!
//! These are emitted from the engine's worker thread, so none of them do more
//! than format and hand off to `tracing`.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Which console stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// One console line from the engine.
pub struct ConsoleLine<'a> {
    pub engine_id: i32,
    pub stream: ConsoleStream,
    pub text: &'a str,
}

impl Display for ConsoleLine<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "[ngspice-{}] {}", self.engine_id, self.text)
    }
}

impl StructuredLog for ConsoleLine<'_> {
    fn log(&self) {
        match self.stream {
            ConsoleStream::Stdout => tracing::info!(engine_id = self.engine_id, "{}", self),
            ConsoleStream::Stderr => tracing::error!(engine_id = self.engine_id, "{}", self),
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("console", span_name = name, engine_id = self.engine_id)
    }
}

/// Progress status line.
pub struct StatusLine<'a> {
    pub engine_id: i32,
    pub text: &'a str,
}

impl Display for StatusLine<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "[ngspice-{}] status: {}", self.engine_id, self.text)
    }
}

/// Background worker started or stopped.
///
/// # Example
/// ```
/// use ngspice_harness::observability::messages::callback::BackgroundThreadChanged;
///
/// let msg = BackgroundThreadChanged { engine_id: 0, idle: true };
/// assert_eq!(msg.to_string(), "[ngspice-0] background thread stopped");
/// ```
pub struct BackgroundThreadChanged {
    pub engine_id: i32,
    pub idle: bool,
}

impl Display for BackgroundThreadChanged {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let state = if self.idle { "stopped" } else { "started" };
        write!(f, "[ngspice-{}] background thread {}", self.engine_id, state)
    }
}

impl StructuredLog for BackgroundThreadChanged {
    fn log(&self) {
        tracing::debug!(engine_id = self.engine_id, idle = self.idle, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("bg_thread", span_name = name, idle = self.idle)
    }
}

/// Vector table published for a new simulation.
pub struct VectorTablePublished<'a> {
    pub engine_id: i32,
    pub plot: &'a str,
    pub vector_count: usize,
}

impl Display for VectorTablePublished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "[ngspice-{}] plot '{}' initialized with {} vectors",
            self.engine_id, self.plot, self.vector_count
        )
    }
}

/// The watched vector was found in the table.
pub struct WatchVectorResolved<'a> {
    pub vector: &'a str,
    pub index: usize,
}

impl Display for WatchVectorResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Watching vector '{}' at index {}", self.vector, self.index)
    }
}

/// The watched vector is absent from the table.
pub struct WatchVectorMissing<'a> {
    pub vector: &'a str,
    pub plot: &'a str,
}

impl Display for WatchVectorMissing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Vector '{}' not present in plot '{}'; threshold disabled for this simulation",
            self.vector, self.plot
        )
    }
}

/// The watched vector exceeded the threshold.
///
/// # Log Level
/// `info!` - Drives the supervisor's halt/alter sequence
pub struct ThresholdCrossed<'a> {
    pub vector: &'a str,
    pub value: f64,
    pub threshold: f64,
}

impl Display for ThresholdCrossed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Vector '{}' reached {:.6} (> {})",
            self.vector, self.value, self.threshold
        )
    }
}

impl StructuredLog for ThresholdCrossed<'_> {
    fn log(&self) {
        tracing::info!(
            vector = self.vector,
            value = self.value,
            threshold = self.threshold,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("threshold", span_name = name, vector = self.vector)
    }
}

/// The engine asked the host to react to an exit.
pub struct ExitRequested {
    pub engine_id: i32,
    pub status: i32,
    pub immediate: bool,
    pub quit: bool,
}

impl Display for ExitRequested {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let kind = if self.quit {
            "quit"
        } else if self.immediate {
            "immediate unload"
        } else {
            "deferred unload"
        };
        write!(
            f,
            "[ngspice-{}] exit requested ({}), status={}",
            self.engine_id, kind, self.status
        )
    }
}

impl StructuredLog for ExitRequested {
    fn log(&self) {
        if self.quit {
            tracing::info!(
                engine_id = self.engine_id,
                status = self.status,
                immediate = self.immediate,
                quit = self.quit,
                "{}", self
            );
        } else {
            tracing::warn!(
                engine_id = self.engine_id,
                status = self.status,
                immediate = self.immediate,
                quit = self.quit,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("exit_requested", span_name = name, status = self.status)
    }
}

/// A callback arrived for an engine that was already unloaded.
pub struct LateCallback<'a> {
    pub callback: &'a str,
}

impl Display for LateCallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Callback '{}' invoked after engine unload", self.callback)
    }
}

/// Halt signal raised toward the supervisor thread.
pub struct HaltSignalRaised {
    pub signal: i32,
    pub delivered: bool,
}

impl Display for HaltSignalRaised {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.delivered {
            write!(f, "Raised signal {} toward supervisor thread", self.signal)
        } else {
            write!(f, "Failed to raise signal {} toward supervisor thread", self.signal)
        }
    }
}

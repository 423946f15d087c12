// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for engine binding lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Engine module loading and symbol resolution
//! * Engine initialization and version detection
//! * Command submission
//! * Engine teardown

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Engine module opened and all entry points resolved.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use ngspice_harness::observability::messages::engine::EngineLoaded;
///
/// let msg = EngineLoaded {
///     origin: "libngspice.so",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct EngineLoaded<'a> {
    pub origin: &'a str,
}

impl Display for EngineLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded engine module: {}", self.origin)
    }
}

impl StructuredLog for EngineLoaded<'_> {
    fn log(&self) {
        tracing::info!(origin = self.origin, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("engine_loaded", span_name = name, origin = self.origin)
    }
}

/// Engine module could not be loaded.
///
/// # Log Level
/// `error!` - Fatal for the run
pub struct EngineLoadFailed<'a> {
    pub origin: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for EngineLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to load engine '{}': {}", self.origin, self.error)
    }
}

impl StructuredLog for EngineLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(origin = self.origin, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "engine_load_failed",
            span_name = name,
            origin = self.origin,
            error = %self.error,
        )
    }
}

/// Callbacks registered with the engine.
///
/// # Log Level
/// `info!` - Important operational event
pub struct EngineInitialized<'a> {
    pub origin: &'a str,
}

impl Display for EngineInitialized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Engine initialized with callbacks: {}", self.origin)
    }
}

/// Version banner parsed from `version -f`.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use ngspice_harness::observability::messages::engine::EngineVersionDetected;
///
/// let msg = EngineVersionDetected {
///     version: Some(42),
///     extensions: &["XSPICE".to_string()],
/// };
///
/// assert_eq!(msg.to_string(), "Engine version ngspice-42 with extensions: XSPICE");
/// ```
pub struct EngineVersionDetected<'a> {
    pub version: Option<u32>,
    pub extensions: &'a [String],
}

impl Display for EngineVersionDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.version {
            Some(version) => write!(f, "Engine version ngspice-{}", version)?,
            None => write!(f, "Engine version unknown")?,
        }
        if self.extensions.is_empty() {
            write!(f, " without extensions")
        } else {
            write!(f, " with extensions: {}", self.extensions.join(", "))
        }
    }
}

impl StructuredLog for EngineVersionDetected<'_> {
    fn log(&self) {
        tracing::info!(
            version = ?self.version,
            extensions = ?self.extensions,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("engine_version", span_name = name, version = ?self.version)
    }
}

/// Command forwarded to the interpreter.
///
/// # Log Level
/// `debug!` - Diagnostic detail; the return status is advisory
pub struct CommandSubmitted<'a> {
    pub command: &'a str,
    pub status: i32,
}

impl Display for CommandSubmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Command '{}' returned {}", self.command, self.status)
    }
}

impl StructuredLog for CommandSubmitted<'_> {
    fn log(&self) {
        if self.status == 0 {
            tracing::debug!(command = self.command, status = self.status, "{}", self);
        } else {
            tracing::warn!(command = self.command, status = self.status, "{}", self);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("command", span_name = name, command = self.command)
    }
}

/// Command refused before reaching the engine.
///
/// # Log Level
/// `warn!` - The supervisor decides whether this is fatal
pub struct CommandRefused<'a> {
    pub command: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CommandRefused<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Command '{}' refused: {}", self.command, self.error)
    }
}

/// Engine released.
///
/// # Log Level
/// `info!` - Important operational event
pub struct EngineUnloaded<'a> {
    pub origin: &'a str,
    pub module_released: bool,
}

impl Display for EngineUnloaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.module_released {
            write!(f, "Engine stopped and module released: {}", self.origin)
        } else {
            write!(f, "Engine stopped (linked module stays resident): {}", self.origin)
        }
    }
}

impl StructuredLog for EngineUnloaded<'_> {
    fn log(&self) {
        tracing::info!(
            origin = self.origin,
            module_released = self.module_released,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("engine_unloaded", span_name = name, origin = self.origin)
    }
}

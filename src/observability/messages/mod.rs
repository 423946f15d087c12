// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for human-readable output. Messages
//! that carry useful fields also implement [`StructuredLog`], which emits the
//! event at its intended level with those fields attached.
//!
//! # Organization
//!
//! * `engine` - engine binding lifecycle and command submission
//! * `callback` - console, status, thread-state, vector and exit callbacks
//! * `scenario` - scenario lifecycle, phase changes and verification

use tracing::Span;

pub mod callback;
pub mod engine;
pub mod scenario;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its intended level.
    fn log(&self);

    /// Build a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging in the harness. Message types follow a struct-based pattern with a
//! `Display` implementation so that:
//!
//! * Log text is not scattered through the binding and supervisor as magic strings
//! * The same message can be emitted as plain text or with structured fields
//! * Output stays consistent between the engine callbacks and the supervisor
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - engine module loading, initialization, commands, teardown
//! * `messages::callback` - events delivered by the engine's callbacks
//! * `messages::scenario` - supervisor scenario lifecycle
//!
//! # Usage
//!
//! ```rust
//! use ngspice_harness::observability::messages::engine::CommandSubmitted;
//! use ngspice_harness::observability::messages::StructuredLog;
//!
//! let msg = CommandSubmitted {
//!     command: "bg_run",
//!     status: 0,
//! };
//!
//! msg.log();
//! ```

pub mod messages;

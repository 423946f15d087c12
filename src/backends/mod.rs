// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine backends for the harness.
//!
//! Each backend implements the [`Simulator`](crate::traits::Simulator) trait and
//! is created through an [`EngineFactory`](crate::traits::EngineFactory) so the
//! supervisor never depends on how an engine came to exist.
//!
//! # Available Backends
//!
//! ## ngspice Backend
//! The shared library driven through its C ABI:
//! - **Loaded**: module opened at runtime from a configured path
//! - **Linked**: module linked at build time (`linked` feature)
//! - **Callbacks**: console, status, vector data, thread state and exit
//!   requests are routed into one shared observer
//!
//! ## Stub Backend (Test-Only)
//! A scripted engine that simulates an RC transient on a worker thread and
//! answers the interpreter commands the scenarios issue. NOT available in
//! production builds.
//!
//! # Architecture
//!
//! ```text
//! Configuration → Factory → Simulator Instance → Supervisor
//!                              │
//!                              └── callbacks → Observer → ObservationState
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use ngspice_harness::backends::ngspice::NgspiceFactory;
//! use ngspice_harness::config::EngineConfig;
//! use ngspice_harness::observation::{Observer, WatchPolicy};
//! use ngspice_harness::traits::EngineFactory;
//! use std::sync::Arc;
//!
//! let observer = Arc::new(Observer::new(WatchPolicy::new("V(2)", 0.5)));
//! let factory = NgspiceFactory::new(EngineConfig::default());
//! let mut engine = factory.instantiate(observer)?;
//! engine.command("echo hello")?;
//! # Ok::<(), ngspice_harness::errors::EngineError>(())
//! ```

pub mod ngspice;
#[cfg(test)]
pub mod stub;

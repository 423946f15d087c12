// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! ngspice shared-library backend.
//!
//! * `ffi` - C layouts and entry-point types from `sharedspice.h`
//! * `binding` - the [`Engine`] handle and its two construction paths
//! * `callbacks` - trampolines the engine calls from its worker thread
//! * `vector` - vectors copied out of engine-owned storage
//! * `factory` - load, init and probe in one step

mod binding;
mod callbacks;
pub mod factory;
pub mod ffi;
mod library;
pub mod vector;

pub use binding::Engine;
pub use factory::{parse_version, EngineVersion, NgspiceFactory};
pub use library::default_library_path;
pub use vector::{VectorData, VectorValues};

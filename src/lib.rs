// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // engine bindings
pub mod config;        // harness configuration
pub mod errors;        // error handling
pub mod observability; // log message types
pub mod observation;   // callback registry + shared state
pub mod raw;           // raw-file reader
pub mod signal;        // halt signal bridge
pub mod supervisor;    // scenario driver
pub mod traits;        // engine abstractions

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod data;
pub mod observer;
pub mod state;

pub use data::{DataPoint, VectorDescriptor, VectorSample, VectorTable, VectorValue};
pub use observer::{split_console_line, ConsoleCapture, Observer, WatchPolicy};
pub use state::{ExitKind, ExitRequest, ObservationSnapshot, ObservationState};

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the engine binding.
//!
//! Load and symbol-resolution failures are fatal for the whole run; everything
//! else is scoped to the current engine handle.

use thiserror::Error;

/// Errors raised while loading, initializing or commanding an engine instance.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine module could not be opened.
    #[error("Failed to load engine module '{path}': {source}")]
    ModuleLoad {
        path: String,
        #[source]
        source: libloading::Error,
    },

    /// A required entry point is missing from the module.
    #[error("Engine module '{path}' does not export '{symbol}': {source}")]
    MissingSymbol {
        path: String,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// `ngSpice_Init` returned a non-zero status.
    #[error("Engine rejected initialization with status {0}")]
    InitRejected(i32),

    /// Command text longer than the interpreter accepts.
    #[error("Command is {length} characters long (max: {max})")]
    CommandTooLong { length: usize, max: usize },

    /// Text handed to the engine contained an interior NUL byte.
    #[error("String cannot cross the engine boundary: {0}")]
    InvalidString(#[from] std::ffi::NulError),

    /// The engine signalled an unrecoverable exit; only teardown is allowed.
    #[error("Engine requested exit (status {status}); only teardown is permitted")]
    Exited { status: i32 },

    /// A query returned a null pointer.
    #[error("Engine returned no data for {operation}")]
    NoData { operation: String },

    /// The handle was already unloaded.
    #[error("Engine handle has been unloaded")]
    Unloaded,

    /// The requested binding is not compiled into this build.
    #[error("Engine binding '{0}' is not available in this build")]
    Unsupported(String),
}

impl EngineError {
    /// True for failures that make any further instantiation pointless.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            EngineError::ModuleLoad { .. }
                | EngineError::MissingSymbol { .. }
                | EngineError::Unsupported(_)
        )
    }
}

/// Result alias for engine binding operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_classification() {
        assert!(EngineError::Unsupported("linked".to_string()).is_load_error());
        assert!(!EngineError::InitRejected(1).is_load_error());
        assert!(!EngineError::Exited { status: 1 }.is_load_error());
        assert!(!EngineError::Unloaded.is_load_error());
    }

    #[test]
    fn test_command_too_long_message() {
        let error = EngineError::CommandTooLong {
            length: 2000,
            max: 1023,
        };
        assert_eq!(error.to_string(), "Command is 2000 characters long (max: 1023)");
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Problems found while validating a harness configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A scenario id outside the known catalog
    UnknownScenario {
        /// The id that has no scenario behind it
        id: u32,
    },
    /// The same scenario id is selected twice
    DuplicateScenario {
        /// The repeated id
        id: u32,
    },
    /// The watched vector name is empty
    EmptyWatchVector,
    /// The threshold is NaN or infinite
    NonFiniteThreshold {
        /// The offending value
        threshold: f64,
    },
    /// A timing value that must be positive is zero
    ZeroDuration {
        /// Name of the timing field
        field: &'static str,
    },
    /// A timeout shorter than the poll interval can never be observed
    TimeoutBelowPoll {
        /// Name of the timeout field
        field: &'static str,
        timeout_ms: u64,
        poll_ms: u64,
    },
    /// A file or vector name that must not be empty
    EmptyName {
        /// Name of the field
        field: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownScenario { id } => {
                write!(f, "Unknown scenario id {} (known: 1, 2, 3, 4)", id)
            }
            ValidationError::DuplicateScenario { id } => {
                write!(f, "Scenario {} is selected more than once", id)
            }
            ValidationError::EmptyWatchVector => write!(f, "Watch vector name must not be empty"),
            ValidationError::NonFiniteThreshold { threshold } => {
                write!(f, "Watch threshold must be finite, got {}", threshold)
            }
            ValidationError::ZeroDuration { field } => {
                write!(f, "Timing value '{}' must be greater than zero", field)
            }
            ValidationError::TimeoutBelowPoll {
                field,
                timeout_ms,
                poll_ms,
            } => write!(
                f,
                "Timeout '{}' ({} ms) is shorter than the poll interval ({} ms)",
                field, timeout_ms, poll_ms
            ),
            ValidationError::EmptyName { field } => {
                write!(f, "Field '{}' must not be empty", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

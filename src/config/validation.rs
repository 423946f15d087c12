// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! All checks run even after the first failure so that a single pass reports
//! every problem in the file:
//!
//! 1. **Scenario selector**: ids must exist in the catalog and appear once
//! 2. **Watch policy**: non-empty vector name, finite threshold
//! 3. **Timing**: positive poll interval, timeouts no shorter than one poll
//! 4. **Files**: output and vector names must not be empty

use crate::config::HarnessConfig;
use crate::errors::ValidationError;
use crate::supervisor::ScenarioId;
use std::collections::HashSet;

/// Validate a configuration, returning every problem found.
pub fn validate_config(cfg: &HarnessConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_scenarios(&cfg.scenarios, &mut errors);
    validate_watch(cfg, &mut errors);
    validate_timing(cfg, &mut errors);
    validate_files(cfg, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_scenarios(ids: &[u32], errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for &id in ids {
        if ScenarioId::from_number(id).is_none() {
            errors.push(ValidationError::UnknownScenario { id });
        } else if !seen.insert(id) {
            errors.push(ValidationError::DuplicateScenario { id });
        }
    }
}

fn validate_watch(cfg: &HarnessConfig, errors: &mut Vec<ValidationError>) {
    if cfg.watch.vector.trim().is_empty() {
        errors.push(ValidationError::EmptyWatchVector);
    }
    if !cfg.watch.threshold.is_finite() {
        errors.push(ValidationError::NonFiniteThreshold {
            threshold: cfg.watch.threshold,
        });
    }
}

fn validate_timing(cfg: &HarnessConfig, errors: &mut Vec<ValidationError>) {
    let timing = &cfg.timing;
    let poll_ms = timing.poll_interval().as_millis() as u64;
    if poll_ms == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "poll_interval_ms",
        });
        return;
    }

    let timeouts = [
        ("start_timeout_ms", timing.start_timeout()),
        ("settle_timeout_ms", timing.settle_timeout()),
        ("exit_timeout_ms", timing.exit_timeout()),
    ];
    for (field, timeout) in timeouts {
        let timeout_ms = timeout.as_millis() as u64;
        if timeout_ms < poll_ms {
            errors.push(ValidationError::TimeoutBelowPoll {
                field,
                timeout_ms,
                poll_ms,
            });
        }
    }
}

fn validate_files(cfg: &HarnessConfig, errors: &mut Vec<ValidationError>) {
    let files = &cfg.files;
    let names = [
        ("files.s1_raw", files.s1_raw.as_str()),
        ("files.s1_vector", files.s1_vector.as_str()),
        ("files.s3_raw", files.s3_raw.as_str()),
        ("files.s4_raw", files.s4_raw.as_str()),
    ];
    for (field, value) in names {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyName { field });
        }
    }
    if files.adder_circuit.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyName {
            field: "files.adder_circuit",
        });
    }
}

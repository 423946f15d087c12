// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::binding::Engine;
use crate::config::{BindingKind, EngineConfig};
use crate::errors::EngineError;
use crate::observability::messages::engine::{EngineLoadFailed, EngineVersionDetected};
use crate::observability::messages::StructuredLog;
use crate::observation::Observer;
use crate::traits::{EngineFactory, Simulator};
use std::sync::Arc;

/// Version banner reported by `version -f`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineVersion {
    pub version: Option<u32>,
    pub extensions: Vec<String>,
}

/// Parse the `** ngspice-NN` banner and the compiled-in extensions.
pub fn parse_version(lines: &[String]) -> EngineVersion {
    let mut parsed = EngineVersion::default();
    for line in lines {
        if let Some(rest) = line.trim_start().strip_prefix("** ngspice-") {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(version) = digits.parse() {
                parsed.version = Some(version);
            }
        }
        if line.contains("** XSPICE") {
            parsed.extensions.push("XSPICE".to_string());
        }
        if line.contains("CIDER") {
            parsed.extensions.push("CIDER".to_string());
        }
    }
    parsed
}

/// Factory for ngspice engine instances.
///
/// Each call loads the module (or binds the linked one), registers the
/// callbacks, issues the configured init commands and optionally probes the
/// version. A rejected init releases the module before returning.
pub struct NgspiceFactory {
    config: EngineConfig,
}

impl NgspiceFactory {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    fn bind(&self, observer: Arc<Observer>) -> Result<Engine, EngineError> {
        match self.config.binding {
            BindingKind::Loaded => {
                let path = self.config.library_path();
                Engine::load(&path, observer).inspect_err(|error| {
                    EngineLoadFailed {
                        origin: &path.display().to_string(),
                        error,
                    }
                    .log();
                })
            }
            BindingKind::Linked => Engine::linked(observer).inspect_err(|error| {
                EngineLoadFailed {
                    origin: "linked libngspice",
                    error,
                }
                .log();
            }),
        }
    }
}

impl EngineFactory for NgspiceFactory {
    fn instantiate(&self, observer: Arc<Observer>) -> Result<Box<dyn Simulator>, EngineError> {
        let mut engine = self.bind(observer)?;
        if let Err(error) = engine.init() {
            engine.unload();
            return Err(error);
        }

        for command in &self.config.init_commands {
            engine.command(command)?;
        }

        if self.config.probe_version {
            match engine.exec_command("version -f") {
                Ok(lines) => {
                    let version = parse_version(&lines);
                    EngineVersionDetected {
                        version: version.version,
                        extensions: &version.extensions,
                    }
                    .log();
                }
                Err(error) => tracing::warn!(error = %error, "Engine version probe failed"),
            }
        }

        Ok(Box::new(engine))
    }
}

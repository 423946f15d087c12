// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_BREAK_YIELD_MS, DEFAULT_EXIT_TIMEOUT_MS, DEFAULT_PAUSE_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_RESUME_SETTLE_MS, DEFAULT_RUN_BEFORE_HALT_MS, DEFAULT_SCENARIOS,
    DEFAULT_SETTLE_TIMEOUT_MS, DEFAULT_START_TIMEOUT_MS, DEFAULT_WATCH_THRESHOLD,
    DEFAULT_WATCH_VECTOR, LIBRARY_ENV_VAR,
};
use crate::errors::ConfigError;
use crate::signal::HaltSignal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for the harness.
///
/// Every section is optional; an empty document (or no file at all) yields
/// the behaviour described by the built-in defaults.
///
/// # Example
/// ```yaml
/// engine:
///   library: /usr/local/lib/libngspice.so
///   binding: loaded
///   init_commands: ["set nomoremode"]
/// scenarios: [1, 2, 3, 4]
/// watch:
///   vector: V(2)
///   threshold: 0.5
/// timing:
///   poll_interval_ms: 100
///   run_before_halt_ms: 5000
/// signal: terminate
/// files:
///   adder_circuit: adder_mos.cir
///   output_dir: out
/// report: out/report.json
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default = "default_scenarios")]
    pub scenarios: Vec<u32>,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub signal: HaltSignal,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub report: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            scenarios: default_scenarios(),
            watch: WatchConfig::default(),
            timing: TimingConfig::default(),
            signal: HaltSignal::default(),
            files: FilesConfig::default(),
            report: None,
        }
    }
}

fn default_scenarios() -> Vec<u32> {
    DEFAULT_SCENARIOS.to_vec()
}

/// How the engine entry points are bound.
///
/// * `Loaded` - resolve symbols from a module opened at runtime
/// * `Linked` - use the module linked into the binary (requires the `linked` feature)
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    #[default]
    Loaded,
    Linked,
}

/// Engine module location and start-up behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Module path; the environment variable and platform default apply when absent
    #[serde(default)]
    pub library: Option<PathBuf>,
    #[serde(default)]
    pub binding: BindingKind,
    /// Commands issued right after a successful init
    #[serde(default = "default_init_commands")]
    pub init_commands: Vec<String>,
    /// Parse `version -f` after init
    #[serde(default = "default_true")]
    pub probe_version: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            library: None,
            binding: BindingKind::default(),
            init_commands: default_init_commands(),
            probe_version: true,
        }
    }
}

fn default_init_commands() -> Vec<String> {
    // Paged output blocks the interpreter waiting for a keypress
    vec!["set nomoremode".to_string()]
}

fn default_true() -> bool {
    true
}

impl EngineConfig {
    /// Resolve the module path: environment variable, then config, then platform default.
    pub fn library_path(&self) -> PathBuf {
        self.library_path_with(std::env::var_os(LIBRARY_ENV_VAR).map(PathBuf::from))
    }

    fn library_path_with(&self, from_env: Option<PathBuf>) -> PathBuf {
        from_env
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| self.library.clone())
            .unwrap_or_else(|| PathBuf::from(crate::backends::ngspice::default_library_path()))
    }
}

/// Watched vector and threshold for the in-flight observation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WatchConfig {
    #[serde(default = "default_watch_vector")]
    pub vector: String,
    #[serde(default = "default_watch_threshold")]
    pub threshold: f64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            vector: default_watch_vector(),
            threshold: default_watch_threshold(),
        }
    }
}

fn default_watch_vector() -> String {
    DEFAULT_WATCH_VECTOR.to_string()
}

fn default_watch_threshold() -> f64 {
    DEFAULT_WATCH_THRESHOLD
}

/// Supervisor timing. Values are in milliseconds; unset values use the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TimingConfig {
    pub poll_interval_ms: Option<u64>,
    pub run_before_halt_ms: Option<u64>,
    pub pause_ms: Option<u64>,
    pub resume_settle_ms: Option<u64>,
    pub start_timeout_ms: Option<u64>,
    pub settle_timeout_ms: Option<u64>,
    pub exit_timeout_ms: Option<u64>,
    pub break_yield_ms: Option<u64>,
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }

    pub fn run_before_halt(&self) -> Duration {
        Duration::from_millis(self.run_before_halt_ms.unwrap_or(DEFAULT_RUN_BEFORE_HALT_MS))
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms.unwrap_or(DEFAULT_PAUSE_MS))
    }

    pub fn resume_settle(&self) -> Duration {
        Duration::from_millis(self.resume_settle_ms.unwrap_or(DEFAULT_RESUME_SETTLE_MS))
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms.unwrap_or(DEFAULT_START_TIMEOUT_MS))
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms.unwrap_or(DEFAULT_SETTLE_TIMEOUT_MS))
    }

    pub fn exit_timeout(&self) -> Duration {
        Duration::from_millis(self.exit_timeout_ms.unwrap_or(DEFAULT_EXIT_TIMEOUT_MS))
    }

    pub fn break_yield(&self) -> Duration {
        Duration::from_millis(self.break_yield_ms.unwrap_or(DEFAULT_BREAK_YIELD_MS))
    }
}

/// Input circuit and output raw files used by the scenarios.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    /// Circuit sourced by S1
    #[serde(default = "default_adder_circuit")]
    pub adder_circuit: PathBuf,
    #[serde(default = "default_s1_raw")]
    pub s1_raw: String,
    #[serde(default = "default_s1_vector")]
    pub s1_vector: String,
    #[serde(default = "default_s3_raw")]
    pub s3_raw: String,
    #[serde(default = "default_s4_raw")]
    pub s4_raw: String,
    /// Directory the raw files are written into (engine working directory when absent)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            adder_circuit: default_adder_circuit(),
            s1_raw: default_s1_raw(),
            s1_vector: default_s1_vector(),
            s3_raw: default_s3_raw(),
            s4_raw: default_s4_raw(),
            output_dir: None,
        }
    }
}

impl FilesConfig {
    /// Full path of an output file, honouring `output_dir`.
    pub fn output_path(&self, file: &str) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }
}

fn default_adder_circuit() -> PathBuf {
    PathBuf::from("adder_mos.cir")
}

fn default_s1_raw() -> String {
    "test1.raw".to_string()
}

fn default_s1_vector() -> String {
    "V(5)".to_string()
}

fn default_s3_raw() -> String {
    "test3.raw".to_string()
}

fn default_s4_raw() -> String {
    "test4.raw".to_string()
}

/// Load a config from a YAML file, or TOML when the extension is `.toml`
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<HarnessConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let cfg = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(cfg)
}

/// Load a config and reject it if validation finds any problem
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<HarnessConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

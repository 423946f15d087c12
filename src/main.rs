// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use ngspice_harness::backends::ngspice::NgspiceFactory;
use ngspice_harness::config::{load_and_validate_config, validate_config, HarnessConfig};
use ngspice_harness::errors::ConfigError;
use ngspice_harness::supervisor::Supervisor;
use std::env;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

fn load(args: &[String]) -> Result<HarnessConfig> {
    match args.get(1) {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("Failed to load configuration from '{}'", path)),
        None => {
            let config = HarnessConfig::default();
            validate_config(&config).map_err(ConfigError::Invalid)?;
            Ok(config)
        }
    }
}

// The engine worker signals this thread directly, so everything stays on it.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 || args.iter().any(|a| a == "-h" || a == "--help") {
        let program = args.first().map(String::as_str).unwrap_or("ngspice-harness");
        eprintln!("Usage: {} [config.yaml|config.toml]", program);
        eprintln!("Example: {} configs/harness.yaml", program);
        return ExitCode::FAILURE;
    }

    let config = match load(&args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ {:#}", error);
            return ExitCode::FAILURE;
        }
    };

    println!("🔌 ngspice harness");
    println!("Engine module: {}", config.engine.library_path().display());
    println!("Scenarios: {:?}", config.scenarios);
    println!();

    let report_path = config.report.clone();
    let factory = NgspiceFactory::new(config.engine.clone());
    let mut supervisor = Supervisor::new(config, Box::new(factory));
    let report = supervisor.run().await;
    drop(supervisor);

    println!();
    report.print_summary();

    if let Some(path) = report_path {
        match report.write_json(&path) {
            Ok(()) => println!("📄 Report written to {}", path.display()),
            Err(error) => {
                eprintln!("❌ Failed to write report '{}': {}", path.display(), error);
                return ExitCode::FAILURE;
            }
        }
    }

    if report.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

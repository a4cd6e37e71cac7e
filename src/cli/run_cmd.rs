// Copyright 2024-2026 op-engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run CLI subcommands: run, compare, cleanup.
//!
//! `run` drives the engine under one strategy and prints its wall-clock time.
//! Target files are removed afterwards unless `--keep-files` is given.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{self, ConfigError, EnvConfig};
use crate::engine::{EngineError, OperationEngine, ParseStrategyError, RunSummary, Strategy};
use crate::ops::fileio;

/// Errors surfaced by the run subcommands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },

    #[error(transparent)]
    Strategy(#[from] ParseStrategyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Usage and configuration problems exit 2, runtime failures exit 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Engine(_) | Self::Json(_) => 1,
            _ => 2,
        }
    }
}

/// Options shared by `run`, `compare` and `cleanup`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub strategy: Option<Strategy>,
    pub config_path: Option<PathBuf>,
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
    pub work_dir: Option<PathBuf>,
    pub json: bool,
    pub keep_files: bool,
}

impl RunOptions {
    /// Parse the arguments following the subcommand name.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut options = Self::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--strategy" | "-s" => {
                    options.strategy = Some(next_value(&mut iter, arg)?.parse::<Strategy>()?);
                }
                "--config" | "-c" => {
                    options.config_path = Some(PathBuf::from(next_value(&mut iter, arg)?));
                }
                "--iterations" | "-n" => {
                    options.iterations = Some(parse_number(&mut iter, arg)?);
                }
                "--seed" => {
                    options.seed = Some(parse_number(&mut iter, arg)?);
                }
                "--work-dir" => {
                    options.work_dir = Some(PathBuf::from(next_value(&mut iter, arg)?));
                }
                "--json" => options.json = true,
                "--keep-files" => options.keep_files = true,
                other => return Err(CliError::UnknownOption(other.to_string())),
            }
        }

        Ok(options)
    }

    /// Load the file or environment configuration, then apply flag overrides.
    pub fn load_config(&self) -> Result<EnvConfig, CliError> {
        let config_path = self.config_path.clone().or_else(super::get_config_path);
        let mut config = match config_path {
            Some(path) => config::load_file(&path)?,
            None => config::load(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut EnvConfig) {
        if let Some(strategy) = self.strategy {
            config.engine.strategy = strategy;
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            config.engine.seed = Some(seed);
        }
        if let Some(dir) = &self.work_dir {
            config.engine.generator.work_dir = dir.clone();
        }
    }
}

fn next_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<&'a str, CliError> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| CliError::MissingValue(flag.to_string()))
}

fn parse_number<'a, T: std::str::FromStr>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<T, CliError> {
    let value = next_value(iter, flag)?;
    value.trim().parse().map_err(|_| CliError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

/// Build an engine for `strategy`, run every configured round, and stop it.
pub fn execute(config: &EnvConfig, strategy: Strategy) -> Result<RunSummary, CliError> {
    let mut engine_config = config.engine.clone();
    engine_config.strategy = strategy;

    let mut engine = OperationEngine::new(engine_config)?;
    let summary = engine.run(config.iterations);
    engine.shutdown();
    Ok(summary)
}

/// The timing line printed after a run.
pub fn format_summary(summary: &RunSummary) -> String {
    format!("{} - Execution time: {} ms", summary.strategy.label(), summary.elapsed_ms)
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
    } else {
        println!("{}", format_summary(summary));
    }
    Ok(())
}

fn cleanup(config: &EnvConfig) -> usize {
    let generator = &config.engine.generator;
    let removed = fileio::remove_target_files(&generator.work_dir, generator.max_file_index);
    tracing::debug!(removed, dir = %generator.work_dir.display(), "target files removed");
    removed
}

fn report(err: &CliError) -> i32 {
    eprintln!("Error: {}", err);
    err.exit_code()
}

/// Run `run`: one strategy, timing line, then cleanup.
///
/// Returns exit code: 0 on success, 1 on engine failure, 2 on bad options.
pub fn run_strategy(options: &RunOptions) -> i32 {
    let config = match options.load_config() {
        Ok(config) => config,
        Err(e) => return report(&e),
    };

    let result = execute(&config, config.engine.strategy)
        .and_then(|summary| print_summary(&summary, options.json));
    if !options.keep_files {
        cleanup(&config);
    }

    match result {
        Ok(()) => 0,
        Err(e) => report(&e),
    }
}

/// Run `compare`: every strategy back to back on fresh target files.
///
/// `--strategy` is ignored here.
pub fn run_compare(options: &RunOptions) -> i32 {
    let config = match options.load_config() {
        Ok(config) => config,
        Err(e) => return report(&e),
    };

    for strategy in Strategy::ALL {
        let result =
            execute(&config, strategy).and_then(|summary| print_summary(&summary, options.json));
        if !options.keep_files {
            cleanup(&config);
        }
        if let Err(e) = result {
            return report(&e);
        }
    }
    0
}

/// Run `cleanup`: remove leftover target files from the work directory.
pub fn run_cleanup(options: &RunOptions) -> i32 {
    match options.load_config() {
        Ok(config) => {
            let removed = cleanup(&config);
            println!(
                "Removed {} target file(s) from {}",
                removed,
                config.engine.generator.work_dir.display()
            );
            0
        }
        Err(e) => report(&e),
    }
}

// Copyright 2024-2026 op-engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for op-engine commands.
//!
//! Provides the run, compare, cleanup and config subcommands. Each returns a
//! process exit code instead of exiting so the entry point stays a thin match.
//!
//! ## Usage
//!
//! ```bash
//! op-engine-cli run --strategy pooled   # One timed run, then cleanup
//! op-engine-cli compare                 # All three strategies in turn
//! op-engine-cli cleanup                 # Remove leftover target files
//! op-engine-cli config show --json      # Effective configuration
//! ```

use std::path::PathBuf;

pub mod config_cmd;
pub mod run_cmd;

pub use run_cmd::{
    execute, format_summary, run_cleanup, run_compare, run_strategy, CliError, RunOptions,
};

/// Environment variable naming a TOML config file.
pub const CONFIG_PATH_ENV: &str = "OP_ENGINE_CONFIG";

/// Get the config file path from the environment, if set.
pub fn get_config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

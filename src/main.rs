//! op-engine entry point.
//!
//! Bootstraps logging, loads configuration and dispatches to a subcommand.
//! `main` is synchronous: the cooperative executor owns its own runtime and
//! blocks on it, which must not happen inside another runtime.
//!
//! ## CLI Subcommands
//!
//! - `op-engine-cli` or `op-engine-cli run` - One timed run (default)
//! - `op-engine-cli compare` - Run every strategy in turn
//! - `op-engine-cli cleanup` - Remove leftover target files
//! - `op-engine-cli config` - Show, list defaults or validate configuration

use std::process::ExitCode;

use op_engine::cli::{config_cmd, run_cleanup, run_compare, run_strategy, RunOptions};
use op_engine::telemetry::{init_logging, LogConfig};

/// Exit code for unknown commands, subcommands and options.
const USAGE_ERROR: i32 = 2;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if let Err(e) = init_logging(&LogConfig::from_env()) {
        eprintln!("Logging disabled: {}", e);
    }

    ExitCode::from(run_command(&args) as u8)
}

/// Split argv into the command name and its arguments.
///
/// Bare options imply `run`, except the help and version flags.
fn split_command(args: &[String]) -> (&str, &[String]) {
    match args.get(1).map(|s| s.as_str()) {
        None => ("run", &args[args.len()..]),
        Some(flag) if flag.starts_with('-') && !is_global_flag(flag) => ("run", &args[1..]),
        Some(command) => (command, &args[2..]),
    }
}

fn is_global_flag(flag: &str) -> bool {
    matches!(flag, "--help" | "-h" | "--version" | "-V")
}

/// Dispatch a full argv and return the process exit code.
fn run_command(args: &[String]) -> i32 {
    let (command, rest) = split_command(args);

    match command {
        "run" | "" => with_options(command, rest, run_strategy),
        "compare" => with_options(command, rest, run_compare),
        "cleanup" => with_options(command, rest, run_cleanup),
        "config" => {
            let subcommand = rest.first().map(|s| s.as_str()).unwrap_or("show");
            let options = rest.get(1..).unwrap_or_default();
            match subcommand {
                "show" => with_options("config", options, config_cmd::run_show),
                "defaults" => {
                    config_cmd::run_defaults();
                    0
                }
                "validate" => with_options("config", options, config_cmd::run_validate),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    USAGE_ERROR
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = rest.first() {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            0
        }
        "version" | "--version" | "-V" => {
            println!("op-engine {}", env!("CARGO_PKG_VERSION"));
            0
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            USAGE_ERROR
        }
    }
}

/// Parse options and run `handler`, or print the error and the command's help.
fn with_options(command: &str, args: &[String], handler: fn(&RunOptions) -> i32) -> i32 {
    match RunOptions::parse(args) {
        Ok(options) => handler(&options),
        Err(e) => {
            eprintln!("Error: {}", e);
            print_command_help(command);
            e.exit_code()
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "op-engine - Mixed file operation engine v{}

USAGE:
    op-engine-cli [COMMAND] [OPTIONS]

COMMANDS:
    run          Run the engine under one strategy (default)
    compare      Run sequential, pooled and cooperative in turn
    cleanup      Remove leftover target files
    config       Manage configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

OPTIONS:
    -s, --strategy S    sequential, pooled or cooperative
    -c, --config FILE   Load configuration from a TOML file
    -n, --iterations N  Number of rounds
    --seed N            Seed the operation generator
    --work-dir DIR      Directory for the target files
    --json              Print the run summary as JSON
    --keep-files        Do not remove target files afterwards

EXAMPLES:
    op-engine-cli                          # Pooled run with defaults
    op-engine-cli run --strategy coro      # Cooperative run
    op-engine-cli compare --seed 7         # Same workload, every strategy
    op-engine-cli config show --json       # Effective configuration

ENVIRONMENT:
    OP_ENGINE_CONFIG      TOML config file (overridden by OP_ENGINE_* variables)
    OP_ENGINE_LOG_FORMAT  Log format (pretty, json)
    OP_ENGINE_LOG_FILE    Write logs to this file instead of stderr
    RUST_LOG              Log level (debug, info, warn, error)

EXIT CODES:
    0  Success
    1  Failure
    2  Usage or configuration error
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "run" => {
            eprintln!(
                "op-engine-cli run - Run the engine

USAGE:
    op-engine-cli run [OPTIONS]

OPTIONS:
    -s, --strategy S    sequential, pooled or cooperative
    -c, --config FILE   Load configuration from a TOML file
    -n, --iterations N  Number of rounds
    --seed N            Seed the operation generator
    --work-dir DIR      Directory for the target files
    --json              Print the run summary as JSON
    --keep-files        Do not remove target files afterwards

DESCRIPTION:
    Fills a working set of random read, write and chunked write operations,
    runs the configured number of rounds, and prints the elapsed time as
    '<Strategy> - Execution time: <ms> ms'.

EXAMPLES:
    op-engine-cli run
    op-engine-cli run --strategy sequential --iterations 3
    op-engine-cli run --json --seed 42
"
            );
        }
        "compare" => {
            eprintln!(
                "op-engine-cli compare - Compare strategies

USAGE:
    op-engine-cli compare [OPTIONS]

DESCRIPTION:
    Runs every strategy back to back with the same configuration and
    prints one timing line per strategy. Target files are removed between
    runs unless --keep-files is given. --strategy is ignored.

EXAMPLES:
    op-engine-cli compare
    op-engine-cli compare --seed 7 --json
"
            );
        }
        "cleanup" => {
            eprintln!(
                "op-engine-cli cleanup - Remove target files

USAGE:
    op-engine-cli cleanup [--work-dir DIR] [--config FILE]

DESCRIPTION:
    Removes file_<i>.txt for every i below OP_ENGINE_MAX_FILE_INDEX from
    the work directory. Missing files are skipped.
"
            );
        }
        "config" => {
            eprintln!(
                "op-engine-cli config - Manage configuration

USAGE:
    op-engine-cli config <SUBCOMMAND> [OPTIONS]

SUBCOMMANDS:
    show           Show effective configuration
    validate       Validate configuration
    defaults       Show default configuration

OPTIONS:
    -c, --config FILE  Configuration file path
    --json             Output in JSON format (show only)

EXAMPLES:
    op-engine-cli config show
    op-engine-cli config validate --config op-engine.toml
    op-engine-cli config defaults
"
            );
        }
        _ => {
            eprintln!(
                "No detailed help available for '{}'. Use 'op-engine-cli help' for general usage.",
                command
            );
        }
    }
}

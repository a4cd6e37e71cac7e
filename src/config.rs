//! Engine configuration loading from environment variables and TOML files.
//!
//! All values are loaded from `OP_ENGINE_*` environment variables with
//! sensible defaults. Invalid values fall back to defaults without crashing.
//! A TOML file may provide the base values; environment variables override it.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `OP_ENGINE_STRATEGY` | pooled | sequential, pooled or cooperative |
//! | `OP_ENGINE_OPERATIONS` | 50 | Working set target size |
//! | `OP_ENGINE_ITERATIONS` | 10 | Rounds per run |
//! | `OP_ENGINE_MAX_FILE_INDEX` | 100 | Number of distinct target files |
//! | `OP_ENGINE_BUFFER_SIZE` | 5242880 | Shared buffer size (bytes) |
//! | `OP_ENGINE_WRITE_SPAN` | 1048576 | Bytes per write operation |
//! | `OP_ENGINE_MIN_CHUNKS` | 5 | Minimum pieces per chunked write |
//! | `OP_ENGINE_MAX_CHUNKS` | 9 | Maximum pieces per chunked write |
//! | `OP_ENGINE_WORKER_THREADS` | 4 | Scan worker threads (0 = auto) |
//! | `OP_ENGINE_WORK_DIR` | . | Directory of the target files |
//! | `OP_ENGINE_SEED` | unset | RNG seed (unset = OS entropy) |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{
    EngineConfig, Strategy, DEFAULT_BUFFER_SIZE, DEFAULT_ITERATIONS, DEFAULT_OPERATIONS,
};
use crate::ops::{
    GeneratorConfig, DEFAULT_MAX_CHUNKS, DEFAULT_MAX_FILE_INDEX, DEFAULT_MIN_CHUNKS,
    DEFAULT_WRITE_SPAN,
};
use crate::scheduler::DEFAULT_WORKER_THREADS;

/// Upper bound on the working set size.
const MAX_OPERATIONS: usize = 100_000;

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub strategy: Strategy,
    pub operations: usize,
    pub iterations: usize,
    pub max_file_index: usize,
    pub buffer_size: usize,
    pub write_span: usize,
    pub min_chunks: usize,
    pub max_chunks: usize,
    pub worker_threads: usize,
    pub work_dir: PathBuf,
    pub seed: Option<u64>,
}

/// Raw values as read from a TOML file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub strategy: Option<Strategy>,
    pub operations: Option<usize>,
    pub iterations: Option<usize>,
    pub max_file_index: Option<usize>,
    pub buffer_size: Option<usize>,
    pub write_span: Option<usize>,
    pub min_chunks: Option<usize>,
    pub max_chunks: Option<usize>,
    pub worker_threads: Option<usize>,
    pub work_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// All engine configuration.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub engine: EngineConfig,
    pub iterations: usize,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse an optional `u64` env var, returning `default` on missing or invalid.
fn parse_opt_u64(key: &str, default: Option<u64>) -> Option<u64> {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u64>().ok().or(default),
        Err(_) => default,
    }
}

/// Parse the strategy env var, returning `default` on missing or invalid.
fn parse_strategy(key: &str, default: Strategy) -> Strategy {
    match std::env::var(key) {
        Ok(val) => val.parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Load generator configuration, applying floors.
fn load_generator_config(file: &FileConfig) -> GeneratorConfig {
    let max_file_index = parse_usize(
        "OP_ENGINE_MAX_FILE_INDEX",
        file.max_file_index.unwrap_or(DEFAULT_MAX_FILE_INDEX),
    );
    let write_span = parse_usize("OP_ENGINE_WRITE_SPAN", file.write_span.unwrap_or(DEFAULT_WRITE_SPAN));
    let min_chunks = parse_usize("OP_ENGINE_MIN_CHUNKS", file.min_chunks.unwrap_or(DEFAULT_MIN_CHUNKS));
    let max_chunks = parse_usize("OP_ENGINE_MAX_CHUNKS", file.max_chunks.unwrap_or(DEFAULT_MAX_CHUNKS));
    let work_dir = std::env::var("OP_ENGINE_WORK_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| file.work_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let min_chunks = min_chunks.max(1);
    GeneratorConfig {
        work_dir,
        max_file_index: max_file_index.max(1),
        write_span: write_span.max(1),
        min_chunks,
        max_chunks: max_chunks.max(min_chunks),
    }
}

fn load_with(file: &FileConfig) -> EnvConfig {
    let generator = load_generator_config(file);
    let operations = parse_usize("OP_ENGINE_OPERATIONS", file.operations.unwrap_or(DEFAULT_OPERATIONS));
    let iterations = parse_usize("OP_ENGINE_ITERATIONS", file.iterations.unwrap_or(DEFAULT_ITERATIONS));
    let buffer_size = parse_usize("OP_ENGINE_BUFFER_SIZE", file.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE));
    let worker_threads = parse_usize(
        "OP_ENGINE_WORKER_THREADS",
        file.worker_threads.unwrap_or(DEFAULT_WORKER_THREADS),
    );

    // The buffer must leave room for at least one write offset.
    let buffer_size = buffer_size.max(generator.write_span + 1);

    EnvConfig {
        engine: EngineConfig {
            strategy: parse_strategy("OP_ENGINE_STRATEGY", file.strategy.unwrap_or_default()),
            operations: operations.clamp(1, MAX_OPERATIONS),
            buffer_size,
            worker_threads,
            seed: parse_opt_u64("OP_ENGINE_SEED", file.seed),
            generator,
        },
        iterations,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    load_with(&FileConfig::default())
}

/// Parse a TOML document into raw file values.
pub fn parse_file_config(contents: &str, path: &Path) -> Result<FileConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration from a TOML file, then apply environment overrides.
pub fn load_file(path: &Path) -> Result<EnvConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_file_config(&contents, path)?;
    Ok(load_with(&file))
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        let engine = &self.engine;
        EffectiveConfig {
            strategy: engine.strategy,
            operations: engine.operations,
            iterations: self.iterations,
            max_file_index: engine.generator.max_file_index,
            buffer_size: engine.buffer_size,
            write_span: engine.generator.write_span,
            min_chunks: engine.generator.min_chunks,
            max_chunks: engine.generator.max_chunks,
            worker_threads: engine.worker_threads,
            work_dir: engine.generator.work_dir.clone(),
            seed: engine.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid cross-test pollution.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "OP_ENGINE_STRATEGY",
        "OP_ENGINE_OPERATIONS",
        "OP_ENGINE_ITERATIONS",
        "OP_ENGINE_MAX_FILE_INDEX",
        "OP_ENGINE_BUFFER_SIZE",
        "OP_ENGINE_WRITE_SPAN",
        "OP_ENGINE_MIN_CHUNKS",
        "OP_ENGINE_MAX_CHUNKS",
        "OP_ENGINE_WORKER_THREADS",
        "OP_ENGINE_WORK_DIR",
        "OP_ENGINE_SEED",
    ];

    fn clear_env_vars() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn test_defaults_are_sensible() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let cfg = load();
        assert_eq!(cfg.engine.strategy, Strategy::Pooled);
        assert_eq!(cfg.engine.operations, 50);
        assert_eq!(cfg.iterations, 10);
        assert_eq!(cfg.engine.generator.max_file_index, 100);
        assert_eq!(cfg.engine.buffer_size, 5 * 1024 * 1024);
        assert_eq!(cfg.engine.generator.write_span, 1024 * 1024);
        assert_eq!(cfg.engine.generator.min_chunks, 5);
        assert_eq!(cfg.engine.generator.max_chunks, 9);
        assert_eq!(cfg.engine.worker_threads, 4);
        assert_eq!(cfg.engine.generator.work_dir, PathBuf::from("."));
        assert_eq!(cfg.engine.seed, None);
    }

    #[test]
    fn test_env_vars_override_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("OP_ENGINE_STRATEGY", "coro");
        std::env::set_var("OP_ENGINE_OPERATIONS", "8");
        std::env::set_var("OP_ENGINE_ITERATIONS", "3");
        std::env::set_var("OP_ENGINE_WORKER_THREADS", "2");
        std::env::set_var("OP_ENGINE_SEED", "1234");
        std::env::set_var("OP_ENGINE_WORK_DIR", "/tmp/ops");
        let cfg = load();
        assert_eq!(cfg.engine.strategy, Strategy::Cooperative);
        assert_eq!(cfg.engine.operations, 8);
        assert_eq!(cfg.iterations, 3);
        assert_eq!(cfg.engine.worker_threads, 2);
        assert_eq!(cfg.engine.seed, Some(1234));
        assert_eq!(cfg.engine.generator.work_dir, PathBuf::from("/tmp/ops"));
        clear_env_vars();
    }

    #[test]
    fn test_invalid_env_falls_back_to_default() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("OP_ENGINE_STRATEGY", "threads");
        std::env::set_var("OP_ENGINE_OPERATIONS", "many");
        std::env::set_var("OP_ENGINE_SEED", "-1");
        let cfg = load();
        assert_eq!(cfg.engine.strategy, Strategy::Pooled);
        assert_eq!(cfg.engine.operations, 50);
        assert_eq!(cfg.engine.seed, None);
        clear_env_vars();
    }

    #[test]
    fn test_floors_applied() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("OP_ENGINE_OPERATIONS", "0");
        std::env::set_var("OP_ENGINE_MAX_FILE_INDEX", "0");
        std::env::set_var("OP_ENGINE_MIN_CHUNKS", "0");
        std::env::set_var("OP_ENGINE_MAX_CHUNKS", "0");
        std::env::set_var("OP_ENGINE_WRITE_SPAN", "4096");
        std::env::set_var("OP_ENGINE_BUFFER_SIZE", "16");
        let cfg = load();
        assert_eq!(cfg.engine.operations, 1);
        assert_eq!(cfg.engine.generator.max_file_index, 1);
        assert_eq!(cfg.engine.generator.min_chunks, 1);
        assert_eq!(cfg.engine.generator.max_chunks, 1);
        assert!(cfg.engine.buffer_size > cfg.engine.generator.write_span);
        clear_env_vars();
    }

    #[test]
    fn test_toml_file_then_env_override() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("op-engine.toml");
        std::fs::write(
            &path,
            "strategy = \"sequential\"\noperations = 20\nseed = 7\nwork_dir = \"/var/tmp/ops\"\n",
        )
        .unwrap();

        let cfg = load_file(&path).unwrap();
        assert_eq!(cfg.engine.strategy, Strategy::Sequential);
        assert_eq!(cfg.engine.operations, 20);
        assert_eq!(cfg.engine.seed, Some(7));
        assert_eq!(cfg.engine.generator.work_dir, PathBuf::from("/var/tmp/ops"));

        std::env::set_var("OP_ENGINE_OPERATIONS", "30");
        let cfg = load_file(&path).unwrap();
        assert_eq!(cfg.engine.operations, 30);
        clear_env_vars();
    }

    #[test]
    fn test_toml_unknown_key_rejected() {
        let result = parse_file_config("threads = 3\n", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_reported() {
        let result = load_file(Path::new("/nonexistent/op-engine.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_effective_config_mirrors_values() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let cfg = load();
        let eff = cfg.effective_config();
        assert_eq!(eff.operations, cfg.engine.operations);
        assert_eq!(eff.iterations, cfg.iterations);
        assert_eq!(eff.write_span, cfg.engine.generator.write_span);
        assert!(eff.buffer_size > eff.write_span);
        assert!(eff.min_chunks <= eff.max_chunks);
    }
}

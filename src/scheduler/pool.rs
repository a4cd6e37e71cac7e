//! Thread pool configuration for scan workers.

/// Default number of worker threads for blocking file scans.
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Thread pool configuration for scan workers.
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of worker threads (0 = auto-detect).
    pub num_threads: usize,
    /// Stack size per thread in bytes (0 = platform default).
    pub stack_size: usize,
    /// Thread name prefix.
    pub thread_name_prefix: String,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: DEFAULT_WORKER_THREADS,
            stack_size: 0,
            thread_name_prefix: "op-worker".to_string(),
        }
    }
}

impl ThreadPoolConfig {
    /// Create config with specific thread count.
    pub fn with_threads(count: usize) -> Self {
        Self {
            num_threads: count,
            ..Default::default()
        }
    }

    /// Create config for the auxiliary pool of the cooperative scheduler.
    pub fn auxiliary(count: usize) -> Self {
        Self {
            num_threads: count,
            thread_name_prefix: "op-aux".to_string(),
            ..Default::default()
        }
    }

    /// Resolve the configured thread count, detecting cores when zero.
    pub fn resolved_threads(&self) -> usize {
        if self.num_threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.num_threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thread_count() {
        let config = ThreadPoolConfig::default();
        assert_eq!(config.num_threads, DEFAULT_WORKER_THREADS);
        assert_eq!(config.resolved_threads(), DEFAULT_WORKER_THREADS);
    }

    #[test]
    fn test_zero_threads_auto_detects() {
        let config = ThreadPoolConfig::with_threads(0);
        assert!(config.resolved_threads() >= 1);
    }

    #[test]
    fn test_auxiliary_prefix() {
        let config = ThreadPoolConfig::auxiliary(2);
        assert_eq!(config.num_threads, 2);
        assert_eq!(config.thread_name_prefix, "op-aux");
    }
}

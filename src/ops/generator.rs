//! Random operation generation with an explicit, seedable RNG.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::buffer::{ByteRange, SharedBuffer};
use super::fileio::target_path;
use super::operation::Operation;

/// Default number of distinct target files.
pub const DEFAULT_MAX_FILE_INDEX: usize = 100;
/// Default length of each write payload (1 MiB).
pub const DEFAULT_WRITE_SPAN: usize = 1024 * 1024;
pub const DEFAULT_MIN_CHUNKS: usize = 5;
pub const DEFAULT_MAX_CHUNKS: usize = 9;

/// Configuration for operation generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory holding the target files.
    pub work_dir: PathBuf,
    /// Targets are `file_<i>.txt` for `i < max_file_index`.
    pub max_file_index: usize,
    /// Payload length of writes, in bytes.
    pub write_span: usize,
    pub min_chunks: usize,
    pub max_chunks: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            max_file_index: DEFAULT_MAX_FILE_INDEX,
            write_span: DEFAULT_WRITE_SPAN,
            min_chunks: DEFAULT_MIN_CHUNKS,
            max_chunks: DEFAULT_MAX_CHUNKS,
        }
    }
}

/// Produces random operations against a shared buffer.
#[derive(Debug)]
pub struct OperationGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl OperationGenerator {
    /// Deterministic generator for a given seed.
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy(config: GeneratorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    fn with_rng(mut config: GeneratorConfig, rng: StdRng) -> Self {
        config.max_file_index = config.max_file_index.max(1);
        config.min_chunks = config.min_chunks.max(1);
        config.max_chunks = config.max_chunks.max(config.min_chunks);
        Self { config, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Mutable access to the RNG, e.g. to fill the shared buffer.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Produce one operation of a random kind.
    ///
    /// Write ranges are `write_span` bytes starting uniformly in
    /// `[0, buffer.len() - write_span)`, clamped to the buffer.
    pub fn next_operation(&mut self, buffer: &SharedBuffer) -> Operation {
        let dice = self.rng.gen_range(0..3u8);
        let index = self.rng.gen_range(0..self.config.max_file_index);
        let path = target_path(&self.config.work_dir, index);
        if dice == 0 {
            return Operation::Read { path };
        }

        let data = self.next_range(buffer);
        if dice == 1 {
            Operation::Write { path, data }
        } else {
            let chunks = self
                .rng
                .gen_range(self.config.min_chunks..=self.config.max_chunks);
            Operation::WriteChunked {
                path,
                data,
                chunks: NonZeroUsize::new(chunks).unwrap_or(NonZeroUsize::MIN),
            }
        }
    }

    fn next_range(&mut self, buffer: &SharedBuffer) -> ByteRange {
        let len = self.config.write_span.min(buffer.len());
        let slack = buffer.len() - len;
        let offset = if slack == 0 { 0 } else { self.rng.gen_range(0..slack) };
        ByteRange::new(offset, len)
    }
}

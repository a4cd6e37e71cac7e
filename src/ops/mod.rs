//! Operation model and the file primitives operations run against.
//!
//! Provides the operation variants, the shared payload arena, the random
//! operation generator, and the raw read/write helpers.

mod buffer;
pub mod fileio;
mod generator;
mod operation;

pub use buffer::{ByteRange, SharedBuffer};
pub use generator::{
    GeneratorConfig, OperationGenerator, DEFAULT_MAX_CHUNKS, DEFAULT_MAX_FILE_INDEX,
    DEFAULT_MIN_CHUNKS, DEFAULT_WRITE_SPAN,
};
pub use operation::{Operation, OperationKind};

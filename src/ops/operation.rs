//! Operation kinds processed by the engine.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use super::buffer::ByteRange;

/// One unit of synthetic I/O work.
///
/// Matched exhaustively by every execution strategy, so a new kind fails to
/// compile until each strategy handles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Count the digits in a file.
    Read { path: PathBuf },
    /// Append a range of the shared buffer to a file.
    Write { path: PathBuf, data: ByteRange },
    /// Write a range of the shared buffer at offset zero, split into pieces.
    WriteChunked {
        path: PathBuf,
        data: ByteRange,
        chunks: NonZeroUsize,
    },
}

/// Discriminant of an [`Operation`], for logging and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Read,
    Write,
    WriteChunked,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Read { .. } => OperationKind::Read,
            Self::Write { .. } => OperationKind::Write,
            Self::WriteChunked { .. } => OperationKind::WriteChunked,
        }
    }

    /// Target file of the operation.
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path } | Self::Write { path, .. } | Self::WriteChunked { path, .. } => {
                path
            }
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::WriteChunked => write!(f, "write_chunked"),
        }
    }
}

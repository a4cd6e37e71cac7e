//! Shared immutable byte arena for write payloads.
//!
//! Operations never hold borrowed slices. They carry a [`ByteRange`] that is
//! resolved against the arena when the bytes are needed.

use std::sync::Arc;

use rand::Rng;

/// Offset and length into a [`SharedBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub offset: usize,
    pub len: usize,
}

impl ByteRange {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// One past the last byte, or `None` on overflow.
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Read-only byte arena shared by every operation of an engine.
/// Cloning is cheap and shares the same allocation.
#[derive(Debug, Clone)]
pub struct SharedBuffer {
    bytes: Arc<[u8]>,
}

impl SharedBuffer {
    /// Wrap existing bytes.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// Fill `len` bytes with random uppercase ASCII letters.
    pub fn random_uppercase<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        let bytes: Vec<u8> = (0..len).map(|_| rng.gen_range(b'A'..=b'Z')).collect();
        Self::from_bytes(bytes)
    }

    /// Resolve a range, or `None` if it does not fit the arena.
    pub fn slice(&self, range: ByteRange) -> Option<&[u8]> {
        self.bytes.get(range.offset..range.end()?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

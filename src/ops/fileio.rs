//! File primitives used by every execution strategy.
//!
//! None of these return errors. Failures are folded into the result: a scan
//! of an unreadable file counts zero digits and a failed write reports
//! `false`. Each failure is logged.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Block size used when scanning files.
pub const SCAN_BLOCK_SIZE: usize = 4096;

/// Path of the target file with the given index inside `dir`.
pub fn target_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("file_{}.txt", index))
}

/// Open a file for scanning. `None` if it is missing or cannot be opened.
pub fn open_for_scan(path: &Path) -> Option<File> {
    match File::open(path) {
        Ok(file) => Some(file),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            // Indistinguishable from an empty file for the caller.
            tracing::debug!(path = %path.display(), "scan target does not exist");
            None
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "scan target cannot be opened");
            None
        }
    }
}

/// Count ASCII digits, reading in [`SCAN_BLOCK_SIZE`] blocks.
///
/// A read error ends the scan; the digits seen so far are returned.
pub fn count_digits_in<R: Read>(mut reader: R) -> usize {
    let mut block = [0u8; SCAN_BLOCK_SIZE];
    let mut count = 0;
    loop {
        match reader.read(&mut block) {
            Ok(0) => break,
            Ok(n) => count += block[..n].iter().filter(|b| b.is_ascii_digit()).count(),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!(error = %e, "scan aborted by read error");
                break;
            }
        }
    }
    count
}

/// Count the digits of a whole file, or 0 if it cannot be opened.
pub fn count_digits(path: &Path) -> usize {
    open_for_scan(path).map(count_digits_in).unwrap_or(0)
}

/// Completion predicate for reads.
pub fn is_valid_digit_count(count: usize) -> bool {
    count % 10 == 0
}

/// Write `data` at `offset`, or append when no offset is given.
///
/// Creates the file if needed. Returns whether every byte was written.
pub fn write_to_file(path: &Path, data: &[u8], offset: Option<u64>) -> bool {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(offset.is_none())
        .open(path);
    let mut file = match file {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "write: open failed");
            return false;
        }
    };

    if let Some(offset) = offset {
        if let Err(e) = file.seek(SeekFrom::Start(offset)) {
            tracing::warn!(path = %path.display(), offset, error = %e, "write: seek failed");
            return false;
        }
    }

    match file.write_all(data) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), len = data.len(), error = %e, "write: write failed");
            false
        }
    }
}

/// One piece of a chunked write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub offset: usize,
    pub len: usize,
}

/// Split `len` bytes into exactly `chunks` contiguous pieces.
///
/// Every piece but the last has `len / chunks` bytes; the last one absorbs
/// the remainder. The pieces partition `[0, len)` in order.
pub fn chunk_plan(len: usize, chunks: NonZeroUsize) -> Vec<Chunk> {
    let count = chunks.get();
    let size = len / count;
    (0..count)
        .map(|i| {
            let offset = i * size;
            let chunk_len = if i + 1 == count { len - offset } else { size };
            Chunk { offset, len: chunk_len }
        })
        .collect()
}

/// Write `data` at offset zero as `chunks` positional writes, in order.
///
/// Stops at the first piece that fails.
pub fn write_in_chunks(path: &Path, data: &[u8], chunks: NonZeroUsize) -> bool {
    for chunk in chunk_plan(data.len(), chunks) {
        let piece = &data[chunk.offset..chunk.offset + chunk.len];
        if !write_to_file(path, piece, Some(chunk.offset as u64)) {
            tracing::warn!(path = %path.display(), offset = chunk.offset, "chunked write failed");
            return false;
        }
    }
    true
}

/// Delete every target file `file_<i>.txt` for `i < max_file_index`.
///
/// Returns the number of files removed.
pub fn remove_target_files(dir: &Path, max_file_index: usize) -> usize {
    let mut removed = 0;
    for index in 0..max_file_index {
        let path = target_path(dir, index);
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "cleanup failed"),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_count_digits_in_spans_blocks() {
        let mut data = vec![b'x'; SCAN_BLOCK_SIZE - 2];
        data.extend_from_slice(b"12345");
        data.extend_from_slice(b"abc9");
        assert_eq!(count_digits_in(Cursor::new(data)), 6);
    }

    #[test]
    fn test_count_digits_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(count_digits(&dir.path().join("nope.txt")), 0);
    }

    #[test]
    fn test_valid_digit_count() {
        assert!(is_valid_digit_count(0));
        assert!(is_valid_digit_count(30));
        assert!(!is_valid_digit_count(7));
    }

    #[test]
    fn test_chunk_plan_even() {
        let plan = chunk_plan(100, nz(5));
        let offsets: Vec<usize> = plan.iter().map(|c| c.offset).collect();
        assert_eq!(offsets, vec![0, 20, 40, 60, 80]);
        assert!(plan.iter().all(|c| c.len == 20));
    }

    #[test]
    fn test_chunk_plan_last_absorbs_remainder() {
        let plan = chunk_plan(103, nz(5));
        assert_eq!(plan.len(), 5);
        assert_eq!(plan[4], Chunk { offset: 80, len: 23 });
        assert_eq!(plan.iter().map(|c| c.len).sum::<usize>(), 103);
    }

    #[test]
    fn test_chunk_plan_more_chunks_than_bytes() {
        let plan = chunk_plan(3, nz(5));
        assert_eq!(plan.len(), 5);
        assert_eq!(plan[4], Chunk { offset: 0, len: 3 });
        assert_eq!(plan.iter().map(|c| c.len).sum::<usize>(), 3);
    }

    #[test]
    fn test_write_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file_0.txt");
        assert!(write_to_file(&path, b"ABC", None));
        assert!(write_to_file(&path, b"DEF", None));
        assert_eq!(fs::read(&path).unwrap(), b"ABCDEF");
    }

    #[test]
    fn test_write_at_offset_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file_0.txt");
        assert!(write_to_file(&path, b"AAAAAA", None));
        assert!(write_to_file(&path, b"ZZ", Some(2)));
        assert_eq!(fs::read(&path).unwrap(), b"AAZZAA");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("file_0.txt");
        assert!(!write_to_file(&path, b"ABC", None));
        assert!(!write_in_chunks(&path, b"ABCDEF", nz(2)));
    }

    #[test]
    fn test_write_in_chunks_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file_1.txt");
        let data: Vec<u8> = (0..1000u32).map(|i| b'A' + (i % 26) as u8).collect();
        assert!(write_in_chunks(&path, &data, nz(7)));
        assert_eq!(fs::read(&path).unwrap(), data);
    }

    #[test]
    fn test_remove_target_files() {
        let dir = tempfile::tempdir().unwrap();
        for index in [0, 3, 9] {
            fs::write(target_path(dir.path(), index), b"x").unwrap();
        }
        fs::write(dir.path().join("keep.txt"), b"x").unwrap();

        assert_eq!(remove_target_files(dir.path(), 10), 3);
        assert!(dir.path().join("keep.txt").exists());
        assert!(!target_path(dir.path(), 3).exists());
    }
}

//! Exact and fuzzy-depth duplicate detection (§4.10 — component C12).

use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// A logged game's identifying hashes plus which input file it came from
/// (§3's `HashLog entry`).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HashLogEntry {
    pub final_hash: u64,
    pub cumulative_hash: u64,
    pub file_number: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DuplicateHit {
    /// Both `final_hash` and `cumulative_hash` matched an existing entry.
    Exact { originating_file: u32 },
    /// Only the fuzzy-depth hash (`fuzzy_duplicate_hash`) matched.
    Fuzzy { originating_file: u32 },
}

/// In-memory duplicate table, keyed by `final_hash % bucket_count` (§3/§4.10).
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct DuplicateTable {
    buckets: HashMap<u64, Vec<HashLogEntry>>,
}

impl DuplicateTable {
    /// Looks up `final_hash`/`cumulative_hash` (exact mode) or just
    /// `fuzzy_hash` (fuzzy mode, ignoring cumulative hash); inserts a new
    /// entry on first occurrence, otherwise reports the earlier file number
    /// without modifying the table (§4.10: "on subsequent, report the
    /// originating file").
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn check_and_insert(&mut self, final_hash: u64, cumulative_hash: u64, fuzzy: bool, file_number: u32) -> Option<DuplicateHit> {
        let bucket = self.buckets.entry(final_hash).or_default();
        let found = if fuzzy {
            bucket.iter().find(|e| e.final_hash == final_hash)
        } else {
            bucket.iter().find(|e| e.final_hash == final_hash && e.cumulative_hash == cumulative_hash)
        };
        if let Some(entry) = found {
            let originating_file = entry.file_number;
            return Some(if fuzzy { DuplicateHit::Fuzzy { originating_file } } else { DuplicateHit::Exact { originating_file } });
        }
        bucket.push(HashLogEntry { final_hash, cumulative_hash, file_number });
        None
    }
}

/// Fixed-record-size disk-backed duplicate table (§4.10's "external-file
/// mode"), for corpora too large to hold every hash in memory. Records are
/// written append-only and linked by the previous record's offset in the
/// same bucket, mirroring the source's prev-pointer linked lists; there is
/// only ever one writer so plain seek/read/write is safe (§5).
pub struct ExternalDuplicateFile {
    file: std::fs::File,
    bucket_heads: HashMap<u64, u64>,
}

const RECORD_SIZE: u64 = 8 + 8 + 4 + 8; // final_hash, cumulative_hash, file_number, prev offset

impl ExternalDuplicateFile {
    pub fn create(path: &std::path::Path) -> io::Result<Self> {
        let file = std::fs::OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
        Ok(Self { file, bucket_heads: HashMap::new() })
    }

    pub fn check_and_insert(&mut self, final_hash: u64, cumulative_hash: u64, fuzzy: bool, file_number: u32) -> io::Result<Option<DuplicateHit>> {
        let mut cursor = self.bucket_heads.get(&final_hash).copied();
        while let Some(offset) = cursor {
            let (rec_final, rec_cumulative, rec_file_number, prev) = self.read_record(offset)?;
            let is_match = if fuzzy { rec_final == final_hash } else { rec_final == final_hash && rec_cumulative == cumulative_hash };
            if is_match {
                return Ok(Some(if fuzzy { DuplicateHit::Fuzzy { originating_file: rec_file_number } } else { DuplicateHit::Exact { originating_file: rec_file_number } }));
            }
            cursor = if prev == u64::MAX { None } else { Some(prev) };
        }
        let new_offset = self.file.seek(SeekFrom::End(0))?;
        let prev = self.bucket_heads.get(&final_hash).copied().unwrap_or(u64::MAX);
        self.write_record(final_hash, cumulative_hash, file_number, prev)?;
        self.bucket_heads.insert(final_hash, new_offset);
        Ok(None)
    }

    fn read_record(&mut self, offset: u64) -> io::Result<(u64, u64, u32, u64)> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buf = [0u8; RECORD_SIZE as usize];
        self.file.read_exact(&mut buf)?;
        let final_hash = u64::from_le_bytes(buf[0..8].try_into().unwrap());
        let cumulative_hash = u64::from_le_bytes(buf[8..16].try_into().unwrap());
        let file_number = u32::from_le_bytes(buf[16..20].try_into().unwrap());
        let prev = u64::from_le_bytes(buf[20..28].try_into().unwrap());
        Ok((final_hash, cumulative_hash, file_number, prev))
    }

    fn write_record(&mut self, final_hash: u64, cumulative_hash: u64, file_number: u32, prev: u64) -> io::Result<()> {
        let mut buf = [0u8; RECORD_SIZE as usize];
        buf[0..8].copy_from_slice(&final_hash.to_le_bytes());
        buf[8..16].copy_from_slice(&cumulative_hash.to_le_bytes());
        buf[16..20].copy_from_slice(&file_number.to_le_bytes());
        buf[20..28].copy_from_slice(&prev.to_le_bytes());
        self.file.write_all(&buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_duplicate_reports_originating_file() {
        let mut table = DuplicateTable::default();
        assert_eq!(table.check_and_insert(10, 20, false, 1), None);
        assert_eq!(table.check_and_insert(10, 20, false, 2), Some(DuplicateHit::Exact { originating_file: 1 }));
    }

    #[test]
    fn fuzzy_duplicate_ignores_cumulative_hash() {
        let mut table = DuplicateTable::default();
        assert_eq!(table.check_and_insert(10, 20, true, 1), None);
        assert_eq!(table.check_and_insert(10, 999, true, 2), Some(DuplicateHit::Fuzzy { originating_file: 1 }));
    }

    #[test]
    fn distinct_final_hashes_never_collide() {
        let mut table = DuplicateTable::default();
        assert_eq!(table.check_and_insert(10, 20, false, 1), None);
        assert_eq!(table.check_and_insert(11, 20, false, 2), None);
    }
}

//! Per-SST in-memory index: the structure the level directory keeps resident
//! for every file on disk, and the positional-read helper that turns a hit
//! into actual value bytes.

use anyhow::Result;
use bloom::MembershipFilter;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::format::{self, Header, IndexRecord};

/// The in-memory index built from one SST's index segment: parallel key,
/// offset, and length vectors, a membership filter seeded by every key in
/// the file, and the file's `dataSegBias`.
///
/// Built once at discovery (or right after a flush/compaction writes a new
/// file) and held for the life of the store; it never touches the data
/// segment.
#[derive(Debug, Clone)]
pub struct SstIndex {
    keys: Vec<u64>,
    offsets: Vec<u32>,
    lens: Vec<u32>,
    filter: MembershipFilter,
    data_seg_bias: u32,
    file_size: u32,
}

/// The result of a successful [`SstIndex::find`]: where to read the value
/// from, and how many bytes to read. A `value_len` of 0 is a tombstone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub data_seg_bias: u32,
    pub value_offset: u32,
    pub value_len: u32,
}

impl SstIndex {
    /// Builds an index from a file's already-read header and index records.
    pub fn from_records(header: Header, records: Vec<IndexRecord>) -> Self {
        let mut keys = Vec::with_capacity(records.len());
        let mut offsets = Vec::with_capacity(records.len());
        let mut lens = Vec::with_capacity(records.len());
        let mut filter = MembershipFilter::new();
        for rec in records {
            keys.push(rec.key);
            offsets.push(rec.value_offset);
            lens.push(rec.value_len);
            filter.insert(rec.key);
        }
        Self {
            keys,
            offsets,
            lens,
            filter,
            data_seg_bias: header.data_seg_bias,
            file_size: header.size,
        }
    }

    /// Builds an index directly from the entries an SST was just encoded
    /// from, without re-reading the file — used right after a flush or a
    /// compaction write so the caller need not reopen the file it just
    /// produced.
    #[must_use]
    pub fn from_entries(entries: &[(u64, Vec<u8>)]) -> Self {
        let idx_bytes = entries.len() as u32 * format::INDEX_RECORD_BYTES;
        let data_seg_bias = format::HEADER_BYTES + idx_bytes;
        let mut keys = Vec::with_capacity(entries.len());
        let mut offsets = Vec::with_capacity(entries.len());
        let mut lens = Vec::with_capacity(entries.len());
        let mut filter = MembershipFilter::new();
        let mut running_offset: u32 = 0;
        for (key, value) in entries {
            keys.push(*key);
            offsets.push(running_offset);
            lens.push(value.len() as u32);
            filter.insert(*key);
            running_offset += value.len() as u32;
        }
        let file_size = data_seg_bias + running_offset;
        Self {
            keys,
            offsets,
            lens,
            filter,
            data_seg_bias,
            file_size,
        }
    }

    /// Opens an SST file at `path` and builds its index from the header and
    /// index segment, without loading the data segment.
    pub fn open(path: &Path) -> Result<Self> {
        use byteorder::{LittleEndian, ReadBytesExt};

        let mut file = File::open(path)?;
        let actual_len = file.metadata()?.len();
        let size = file.read_u32::<LittleEndian>()?;
        let data_seg_bias = file.read_u32::<LittleEndian>()?;
        anyhow::ensure!(
            actual_len as u32 == size,
            "sstable {:?}: header size {} does not match file length {} (I2 violation)",
            path,
            size,
            actual_len
        );
        anyhow::ensure!(
            data_seg_bias >= format::HEADER_BYTES && (data_seg_bias as u64) <= actual_len,
            "sstable {:?}: dataSegBias {} out of range for file length {}",
            path,
            data_seg_bias,
            actual_len
        );
        let header = Header { size, data_seg_bias };

        let idx_len = header.data_seg_bias - format::HEADER_BYTES;
        let mut idx_buf = vec![0u8; idx_len as usize];
        file.read_exact(&mut idx_buf)?;

        // read_index expects a buffer starting at offset 0 covering [8, bias).
        let mut full = Vec::with_capacity(header.data_seg_bias as usize);
        full.extend_from_slice(&size.to_le_bytes());
        full.extend_from_slice(&data_seg_bias.to_le_bytes());
        full.extend_from_slice(&idx_buf);
        let records = format::read_index(&full, header)?;

        Ok(Self::from_records(header, records))
    }

    /// Looks up `key`, returning the location of its value if present.
    ///
    /// Checks the membership filter first; on a negative, no binary search
    /// is performed. A positive binary-search hit with `value_len == 0` is a
    /// tombstone — the caller must surface that as "absent," not "present
    /// with an empty value."
    #[must_use]
    pub fn find(&self, key: u64) -> Option<Hit> {
        if !self.filter.may_contain(key) {
            return None;
        }
        let i = self.keys.binary_search(&key).ok()?;
        Some(Hit {
            data_seg_bias: self.data_seg_bias,
            value_offset: self.offsets[i],
            value_len: self.lens[i],
        })
    }

    /// The smallest key in this SST, or `None` if it is empty.
    #[must_use]
    pub fn low_bound(&self) -> Option<u64> {
        self.keys.first().copied()
    }

    /// The largest key in this SST, or `None` if it is empty.
    #[must_use]
    pub fn high_bound(&self) -> Option<u64> {
        self.keys.last().copied()
    }

    /// `true` if `[low, high]` (inclusive) overlaps this SST's key range.
    #[must_use]
    pub fn overlaps(&self, low: u64, high: u64) -> bool {
        match (self.low_bound(), self.high_bound()) {
            (Some(my_low), Some(my_high)) => my_low <= high && low <= my_high,
            _ => false,
        }
    }

    /// The file's `dataSegBias`.
    #[must_use]
    pub fn data_seg_bias(&self) -> u32 {
        self.data_seg_bias
    }

    /// The file's total serialized size.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.file_size
    }

    /// Number of entries indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Reads exactly `hit.value_len` bytes at `hit.data_seg_bias + hit.value_offset`
/// from the file at `path`.
///
/// A single positional seek + read, per spec — no buffering of the whole
/// file, no re-parsing of the index.
pub fn read_value(path: &Path, hit: Hit) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let pos = hit.data_seg_bias as u64 + hit.value_offset as u64;
    file.seek(SeekFrom::Start(pos))?;
    let mut buf = vec![0u8; hit.value_len as usize];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

//! SSTable binary layout: header, index segment, data segment.
//!
//! ```text
//! offset 0            : u32 size            -- total file bytes
//! offset 4            : u32 dataSegBias     -- offset of data segment
//! offset 8            : index segment       -- N * (key:u64, valueOffset:u32, valueLen:u32)
//! offset dataSegBias  : data segment        -- concatenated values, in index order
//! ```
//!
//! Every integer is little-endian. There is no footer, no magic number, no
//! checksum, and no embedded filter — the membership filter is rebuilt in
//! memory from the index segment whenever an SSTable is opened, never
//! persisted.

use anyhow::{bail, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// Header size: a 4-byte `size` field plus a 4-byte `dataSegBias` field.
pub const HEADER_BYTES: u32 = 8;

/// Per-entry index record size: an 8-byte key, a 4-byte value offset, and a
/// 4-byte value length.
pub const INDEX_RECORD_BYTES: u32 = 16;

/// The two header fields every SSTable file opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Total size of the file, in bytes.
    pub size: u32,
    /// Byte offset at which the data segment begins.
    pub data_seg_bias: u32,
}

/// A single index record: a key paired with where its value lives in the
/// data segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRecord {
    pub key: u64,
    pub value_offset: u32,
    pub value_len: u32,
}

/// Serializes an ascending, pairwise-distinct-key entry vector to the SST
/// binary layout described above.
///
/// Entries must already be in ascending key order — this function does not
/// sort them, matching the compactor and the memtable flush path, both of
/// which hand it already-ordered data.
#[must_use]
pub fn encode(entries: &[(u64, Vec<u8>)]) -> Vec<u8> {
    let idx_bytes = entries.len() as u32 * INDEX_RECORD_BYTES;
    let data_seg_bias = HEADER_BYTES + idx_bytes;
    let data_bytes: usize = entries.iter().map(|(_, v)| v.len()).sum();
    let size = data_seg_bias as usize + data_bytes;

    let mut buf = Vec::with_capacity(size);
    buf.write_u32::<LittleEndian>(size as u32).expect("vec write");
    buf.write_u32::<LittleEndian>(data_seg_bias).expect("vec write");

    let mut running_offset: u32 = 0;
    for (key, value) in entries {
        buf.write_u64::<LittleEndian>(*key).expect("vec write");
        buf.write_u32::<LittleEndian>(running_offset).expect("vec write");
        buf.write_u32::<LittleEndian>(value.len() as u32).expect("vec write");
        running_offset += value.len() as u32;
    }
    for (_, value) in entries {
        buf.extend_from_slice(value);
    }
    buf
}

/// Reads just the header (`size`, `dataSegBias`) from the front of an SST
/// buffer.
pub fn read_header(buf: &[u8]) -> Result<Header> {
    if buf.len() < HEADER_BYTES as usize {
        bail!("sstable buffer too small for header: {} bytes", buf.len());
    }
    let mut cursor = Cursor::new(buf);
    let size = cursor.read_u32::<LittleEndian>()?;
    let data_seg_bias = cursor.read_u32::<LittleEndian>()?;
    if data_seg_bias < HEADER_BYTES {
        bail!("dataSegBias {} precedes header", data_seg_bias);
    }
    if (size as usize) != buf.len() {
        bail!(
            "size field {} does not match buffer length {} (I2 violation)",
            size,
            buf.len()
        );
    }
    if data_seg_bias as usize > buf.len() {
        bail!("dataSegBias {} exceeds file size {}", data_seg_bias, size);
    }
    Ok(Header { size, data_seg_bias })
}

/// Returns the index segment `[8, dataSegBias)` as parsed [`IndexRecord`]s,
/// without touching the data segment.
///
/// This is the "index-only view" the level directory loads at open time: it
/// never reads the data segment into memory.
pub fn read_index(buf: &[u8], header: Header) -> Result<Vec<IndexRecord>> {
    let idx_start = HEADER_BYTES as usize;
    let idx_end = header.data_seg_bias as usize;
    if idx_end < idx_start || (idx_end - idx_start) % INDEX_RECORD_BYTES as usize != 0 {
        bail!("index segment length is not a multiple of the record size");
    }
    let mut cursor = Cursor::new(&buf[idx_start..idx_end]);
    let count = (idx_end - idx_start) / INDEX_RECORD_BYTES as usize;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let key = cursor.read_u64::<LittleEndian>()?;
        let value_offset = cursor.read_u32::<LittleEndian>()?;
        let value_len = cursor.read_u32::<LittleEndian>()?;
        records.push(IndexRecord {
            key,
            value_offset,
            value_len,
        });
    }
    Ok(records)
}

/// Decodes a full SST buffer back into `(key, value)` pairs, in the same
/// ascending-key order it was encoded with.
///
/// Exercised by the round-trip property: `decode(encode(v)) == v`.
pub fn decode(buf: &[u8]) -> Result<Vec<(u64, Vec<u8>)>> {
    let header = read_header(buf)?;
    let records = read_index(buf, header)?;
    let data_seg = &buf[header.data_seg_bias as usize..];
    let mut out = Vec::with_capacity(records.len());
    for rec in records {
        let start = rec.value_offset as usize;
        let end = start + rec.value_len as usize;
        if end > data_seg.len() {
            bail!(
                "index record for key {} points past the data segment",
                rec.key
            );
        }
        out.push((rec.key, data_seg[start..end].to_vec()));
    }
    Ok(out)
}

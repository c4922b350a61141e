//! # SSTable — Sorted String Table
//!
//! Immutable, on-disk storage files for the RiptideKV storage engine.
//!
//! When the in-memory [`memtable::Memtable`] exceeds its size threshold the
//! engine flushes it to disk as an SSTable. SSTables are *write-once,
//! read-many*: once created they are never modified, only replaced wholesale
//! during compaction.
//!
//! ## File layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ HEADER (8 bytes)                                          │
//! │   size (u32 LE)           -- total file bytes             │
//! │   dataSegBias (u32 LE)    -- offset of the data segment   │
//! ├──────────────────────────────────────────────────────────┤
//! │ INDEX SEGMENT (16 bytes per entry)                         │
//! │   key (u64 LE) | valueOffset (u32 LE) | valueLen (u32 LE)  │
//! │   ... one record per entry, ascending by key ...           │
//! ├──────────────────────────────────────────────────────────┤
//! │ DATA SEGMENT                                               │
//! │   concatenated values, in index order                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. There is no magic number, no footer, no
//! checksum, and no embedded filter — every membership filter is rebuilt in
//! memory from the index segment when a file is opened, per [`reader::SstIndex`].
//! A value length of zero at a matched key is a tombstone, not an empty
//! value; callers one layer up (the engine) are responsible for surfacing
//! that as "absent."

mod format;
mod merge;
mod reader;
mod writer;

pub use format::{decode, encode, read_header, read_index, Header, IndexRecord, HEADER_BYTES, INDEX_RECORD_BYTES};
pub use merge::merge_sources;
pub use reader::{read_value, Hit, SstIndex};
pub use writer::write_sst;

#[cfg(test)]
mod tests;

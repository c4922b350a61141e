//! # Config
//!
//! Tunable limits for the RiptideKV storage engine.
//!
//! These values are the constants spec.md fixes as part of the store's
//! design (the memtable byte budget, per-level SST capacity, and filter
//! size) wrapped in a small struct so the `engine` and `cli` crates share
//! one source of truth instead of scattering magic numbers. [`StoreConfig`]
//! implements [`Default`] with the spec-mandated values; callers that want
//! different limits (tests exercising flush/compaction with a small
//! dataset, for instance) construct their own.

/// Byte-footprint threshold that forces a memtable flush.
///
/// The default matches spec.md's `MEM_MAX = 2 MiB`.
pub const DEFAULT_MEM_MAX: usize = 2 * 1024 * 1024;

/// Maximum number of SSTables level 0 ("chaos") holds before a flush is
/// rejected and compaction is triggered.
pub const DEFAULT_LEVEL0_CAPACITY: usize = 4;

/// Multiplier `N` in the level-capacity formula `N * 2^L` for levels `L >= 1`.
pub const DEFAULT_LEVEL_FANOUT: usize = 4;

/// Per-entry index overhead in a serialized SSTable: an 8-byte key plus a
/// 4-byte value offset and a 4-byte value length.
pub const INDEX_RECORD_BYTES: usize = 8 + 4 + 4;

/// SSTable header size: a 4-byte `size` field plus a 4-byte `dataSegBias`
/// field.
pub const HEADER_BYTES: usize = 4 + 4;

/// Tunable limits shared by the engine's flush and compaction logic.
///
/// Construct with [`StoreConfig::default`] for the values spec.md fixes, or
/// override fields directly (all are plain `usize`s) for smaller-scale
/// tests that want to force a flush or compaction without writing
/// megabytes of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Memtable serialized-footprint threshold that forces a flush.
    pub mem_max: usize,
    /// Level 0 capacity (number of SSTs before a flush is rejected).
    pub level0_capacity: usize,
    /// Fan-out multiplier `N` for level capacities `N * 2^L`, `L >= 1`.
    pub level_fanout: usize,
}

impl StoreConfig {
    /// Returns the maximum number of SSTables level `level` may hold.
    ///
    /// Level 0 holds `level0_capacity`; level `L >= 1` holds
    /// `level_fanout * 2^L`, per spec.md §6.
    #[must_use]
    pub fn level_capacity(&self, level: u32) -> usize {
        if level == 0 {
            self.level0_capacity
        } else {
            self.level_fanout * (1usize << level)
        }
    }

    /// Computes the serialized size of `entry_count` index records plus
    /// `data_bytes` worth of values, using the same formula the memtable
    /// flush threshold and the compactor's SST-splitting step both use:
    /// `HEADER_BYTES + entry_count * INDEX_RECORD_BYTES + data_bytes`.
    #[must_use]
    pub fn serialized_size(entry_count: usize, data_bytes: usize) -> usize {
        HEADER_BYTES + entry_count * INDEX_RECORD_BYTES + data_bytes
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mem_max: DEFAULT_MEM_MAX,
            level0_capacity: DEFAULT_LEVEL0_CAPACITY,
            level_fanout: DEFAULT_LEVEL_FANOUT,
        }
    }
}

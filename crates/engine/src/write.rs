//! Write path: `put`, `remove`, and the internal flush/compaction trigger.

use anyhow::Result;

use crate::compaction;
use crate::Engine;

impl Engine {
    /// Inserts or overwrites `key` with `value`.
    ///
    /// Returns `true` if the write completed without triggering compaction,
    /// `false` if it did. The return value is advisory — callers may ignore
    /// it.
    ///
    /// If the memtable's projected serialized footprint now meets or
    /// exceeds `MEM_MAX`, it is frozen into an SST and handed to the level
    /// directory. If level 0 has no room, compaction runs before this call
    /// returns.
    pub fn put(&mut self, key: u64, value: Vec<u8>) -> Result<bool> {
        self.mem.put(key, value);
        self.maybe_flush()
    }

    /// Deletes `key` by writing a tombstone.
    ///
    /// Returns `true` if the key was present beforehand (in the memtable or
    /// on disk), `false` if it was already absent or already tombstoned.
    /// Per the policy documented in the design notes, removing an
    /// already-tombstoned key is a no-op that reports `false` regardless of
    /// whether the tombstone lives in the memtable or on disk.
    pub fn remove(&mut self, key: u64) -> Result<bool> {
        if let Some(existing) = self.mem.get(key) {
            if existing.is_empty() {
                return Ok(false);
            }
            self.mem.put(key, Vec::new());
            self.maybe_flush()?;
            return Ok(true);
        }

        match self.levels.find(key) {
            Some((path, hit)) if hit.value_len > 0 => {
                let _ = path; // only the presence/length matters here
                self.mem.put(key, Vec::new());
                self.maybe_flush()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Flushes the memtable if its projected size has crossed `MEM_MAX`.
    ///
    /// Returns `true` if no compaction occurred (either no flush was
    /// needed, or the flush fit in level 0); `false` if a flush ran and
    /// level 0 had no room, so compaction absorbed it.
    fn maybe_flush(&mut self) -> Result<bool> {
        let projected = config::StoreConfig::serialized_size(self.mem.size(), self.mem.data_size());
        if projected < self.config.mem_max {
            return Ok(true);
        }
        self.flush()
    }

    /// Unconditionally freezes the memtable into an SST and routes it
    /// through the level directory, resetting the memtable afterward.
    ///
    /// A no-op that returns `true` if the memtable is empty.
    pub(crate) fn flush(&mut self) -> Result<bool> {
        if self.mem.is_empty() {
            return Ok(true);
        }
        let entries = self.mem.ordered_entries();
        let no_compaction = if self.levels.level0_is_full(&self.config) {
            compaction::absorb_and_cascade(&mut self.levels, &self.config, entries)?;
            false
        } else {
            self.levels.push_level0(&entries)?;
            true
        };
        self.mem.reset();
        Ok(no_compaction)
    }
}

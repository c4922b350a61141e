//! # Level directory
//!
//! Catalogs which SSTable files exist in the store directory, which level
//! each belongs to, and in what order. Level 0 ("chaos") holds SSTables in
//! arrival order and may have overlapping key ranges; levels `L >= 1`
//! ("ordered") hold pairwise key-disjoint SSTables sorted by key range.
//!
//! ## File naming
//!
//! Files are named `<level>-<inLevel>.bin`. The separator is load-bearing:
//! without it, level 0 slot 10 and level 1 slot 0 would both stringify to
//! `10.bin`. (The reference implementation this store is modeled on
//! concatenates the two numbers with no separator and relies on each level
//! staying under 10 slots — that invariant silently breaks the moment a
//! level reaches `4 * 2^2 = 16` capacity.)
//!
//! ## Discovery
//!
//! At open time, each level is probed starting from slot 0: if slot 0 is
//! missing, discovery stops (there are no higher levels to find, since
//! levels are only ever created in order). If slot 0 is present, every
//! subsequent slot is probed until one is missing. This is a strict
//! two-state walk — unlike a probe that keeps re-entering level 0 on an
//! empty store, it terminates in exactly `(levels discovered) + 1` failed
//! lookups.

use anyhow::{Context, Result};
use sstable::SstIndex;
use std::fs;
use std::path::{Path, PathBuf};

use config::StoreConfig;

/// One cataloged SSTable: its filename (relative to the store directory)
/// and its in-memory index.
#[derive(Debug)]
pub struct LevelEntry {
    pub filename: String,
    pub index: SstIndex,
}

/// Tracks every SSTable on disk, organized into level 0 ("chaos") and
/// levels `1..` ("ordered"), and owns the file-naming scheme.
#[derive(Debug)]
pub struct LevelDirectory {
    dir: PathBuf,
    /// Level 0, oldest first / newest last.
    chaos: Vec<LevelEntry>,
    /// `ordered[i]` is level `i + 1`, sorted ascending by key range.
    ordered: Vec<Vec<LevelEntry>>,
}

fn filename(level: usize, in_level: usize) -> String {
    format!("{}-{}.bin", level, in_level)
}

impl LevelDirectory {
    /// Opens `dir` (which must already exist) and discovers every SSTable
    /// file already present, per the two-state walk described above.
    pub fn discover(dir: &Path) -> Result<Self> {
        let mut chaos = Vec::new();
        let mut ordered: Vec<Vec<LevelEntry>> = Vec::new();

        let mut level = 0usize;
        loop {
            let slot0 = dir.join(filename(level, 0));
            if !slot0.exists() {
                break;
            }

            let mut slots = Vec::new();
            let mut in_level = 0usize;
            loop {
                let path = dir.join(filename(level, in_level));
                if !path.exists() {
                    break;
                }
                let index = SstIndex::open(&path)
                    .with_context(|| format!("discovering {:?}", path))?;
                slots.push(LevelEntry {
                    filename: filename(level, in_level),
                    index,
                });
                in_level += 1;
            }

            if level == 0 {
                chaos = slots;
            } else {
                ordered.push(slots);
            }
            level += 1;
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            chaos,
            ordered,
        })
    }

    /// Removes every file this directory tracks and forgets all in-memory
    /// state, without touching the directory itself.
    pub fn clear(&mut self) -> Result<()> {
        for entry in &self.chaos {
            let _ = fs::remove_file(self.dir.join(&entry.filename));
        }
        for level in &self.ordered {
            for entry in level {
                let _ = fs::remove_file(self.dir.join(&entry.filename));
            }
        }
        self.chaos.clear();
        self.ordered.clear();
        Ok(())
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn level0_len(&self) -> usize {
        self.chaos.len()
    }

    #[must_use]
    pub fn level0_is_full(&self, config: &StoreConfig) -> bool {
        self.chaos.len() >= config.level_capacity(0)
    }

    /// Level-0 entries oldest-to-newest, as stored.
    #[must_use]
    pub fn chaos(&self) -> &[LevelEntry] {
        &self.chaos
    }

    /// Writes `entries` to a fresh level-0 slot and catalogs it.
    ///
    /// Callers must check [`level0_is_full`](Self::level0_is_full) first;
    /// this never rejects.
    pub fn push_level0(&mut self, entries: &[(u64, Vec<u8>)]) -> Result<()> {
        let name = filename(0, self.chaos.len());
        let path = self.dir.join(&name);
        let index = sstable::write_sst(&path, entries)?;
        self.chaos.push(LevelEntry { filename: name, index });
        Ok(())
    }

    /// Deletes every level-0 file and forgets them, without touching any
    /// other level.
    pub fn clear_level0(&mut self) -> Result<()> {
        for entry in self.chaos.drain(..) {
            fs::remove_file(self.dir.join(&entry.filename))?;
        }
        Ok(())
    }

    #[must_use]
    pub fn level_exists(&self, level: usize) -> bool {
        debug_assert!(level >= 1);
        self.ordered.len() >= level
    }

    #[must_use]
    pub fn level_len(&self, level: usize) -> usize {
        debug_assert!(level >= 1);
        self.ordered.get(level - 1).map_or(0, Vec::len)
    }

    /// Ensures level `level` (`>= 1`) exists as an (possibly empty) slot,
    /// creating every intermediate level as needed.
    pub fn ensure_level(&mut self, level: usize) {
        debug_assert!(level >= 1);
        while self.ordered.len() < level {
            self.ordered.push(Vec::new());
        }
    }

    /// Removes every SST at level `level` whose key range intersects
    /// `[low, high]`, deletes their files, renumbers the survivors'
    /// filenames to stay contiguous from slot 0, and returns the removed
    /// entries' decoded contents (for re-merging).
    ///
    /// This full-overlap gather is what keeps (I3) true: a correct
    /// implementation must never leave a retained SST on `level` that
    /// overlaps a freshly written one, so every SST whose range intersects
    /// the incoming batch is pulled into the merge first rather than only
    /// the ones the writer happens to collide with.
    pub fn gather_overlap(
        &mut self,
        level: usize,
        low: u64,
        high: u64,
    ) -> Result<Vec<Vec<(u64, Vec<u8>)>>> {
        debug_assert!(level >= 1);
        self.ensure_level(level);
        let slots = &mut self.ordered[level - 1];

        let mut retained = Vec::new();
        let mut removed = Vec::new();
        for entry in slots.drain(..) {
            if entry.index.overlaps(low, high) {
                removed.push(entry);
            } else {
                retained.push(entry);
            }
        }

        let mut overlapping_entries = Vec::with_capacity(removed.len());
        for entry in &removed {
            let path = self.dir.join(&entry.filename);
            let bytes = fs::read(&path)?;
            overlapping_entries.push(sstable::decode(&bytes)?);
        }
        for entry in &removed {
            fs::remove_file(self.dir.join(&entry.filename))?;
        }

        // Renumber survivors to 0..len-1, preserving relative (ascending
        // key-range) order.
        for (slot, entry) in retained.iter_mut().enumerate() {
            let new_name = filename(level, slot);
            if new_name != entry.filename {
                fs::rename(self.dir.join(&entry.filename), self.dir.join(&new_name))?;
                entry.filename = new_name;
            }
        }

        *self.ordered.get_mut(level - 1).expect("ensured above") = retained;
        Ok(overlapping_entries)
    }

    /// Splices `chunks` (ascending by key, each already known not to
    /// overlap any retained SST on `level`) into `level` at the position
    /// that keeps the level's SSTs sorted ascending by key range, writing
    /// each chunk to a freshly numbered slot.
    pub fn splice_in(&mut self, level: usize, chunks: &[Vec<(u64, Vec<u8>)>]) -> Result<()> {
        debug_assert!(level >= 1);
        if chunks.is_empty() {
            return Ok(());
        }
        self.ensure_level(level);

        let high = chunks
            .iter()
            .flat_map(|c| c.last().map(|(k, _)| *k))
            .max()
            .unwrap_or(0);

        let slots = &self.ordered[level - 1];
        let split_at = slots
            .iter()
            .position(|e| e.index.low_bound().map_or(false, |lb| lb > high))
            .unwrap_or(slots.len());

        // Write new chunks as temporary files first (names appended after
        // the current tail), then rebuild the slot vector in sorted order
        // and renumber everything to 0..len-1 on disk.
        let mut written = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            if chunk.is_empty() {
                continue;
            }
            let tmp_name = format!("{}-new{}.bin", level, i);
            let path = self.dir.join(&tmp_name);
            let index = sstable::write_sst(&path, chunk)?;
            written.push(LevelEntry {
                filename: tmp_name,
                index,
            });
        }

        let slots = &mut self.ordered[level - 1];
        let tail = slots.split_off(split_at);
        slots.extend(written);
        slots.extend(tail);

        // Renumbering in a single ascending pass is unsafe: when a survivor
        // shifts up to a slot number some other not-yet-moved survivor
        // currently occupies, `fs::rename` would silently overwrite it
        // before it gets its turn. Stage every entry whose name doesn't
        // already match its final slot through a unique intermediate name
        // first, so no target name is ever still held by an unmoved file;
        // only then rename everything into its final `<level>-<slot>.bin`
        // name.
        for (slot, entry) in slots.iter_mut().enumerate() {
            let final_name = filename(level, slot);
            if entry.filename != final_name {
                let staging_name = format!("{}-stage-{}.bin", level, slot);
                fs::rename(self.dir.join(&entry.filename), self.dir.join(&staging_name))?;
                entry.filename = staging_name;
            }
        }
        for (slot, entry) in slots.iter_mut().enumerate() {
            let final_name = filename(level, slot);
            if entry.filename != final_name {
                fs::rename(self.dir.join(&entry.filename), self.dir.join(&final_name))?;
                entry.filename = final_name;
            }
        }

        Ok(())
    }

    /// Searches level 0 (newest-to-oldest) then levels `1, 2, ...` in
    /// order for `key`, returning the owning file's path and the located
    /// value's position.
    #[must_use]
    pub fn find(&self, key: u64) -> Option<(PathBuf, sstable::Hit)> {
        for entry in self.chaos.iter().rev() {
            if let Some(hit) = entry.index.find(key) {
                return Some((self.dir.join(&entry.filename), hit));
            }
        }
        for level in &self.ordered {
            for entry in level {
                if let Some(hit) = entry.index.find(key) {
                    return Some((self.dir.join(&entry.filename), hit));
                }
            }
        }
        None
    }

    /// Total number of levels `>= 1` currently tracked (not counting level 0).
    #[must_use]
    pub fn ordered_level_count(&self) -> usize {
        self.ordered.len()
    }
}

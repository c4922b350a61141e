//! Compaction: absorbing a full level 0 into the level hierarchy.
//!
//! Triggered when the level directory refuses a new level-0 SSTable. The
//! triggering SSTable is never actually written to level 0 — its entries are
//! merged in memory alongside the existing level-0 files, which are then
//! cleared from disk. This sidesteps the question of what to do with an
//! orphaned level-0 file if the process crashes mid-absorb: there is none.
//!
//! The merged stream is split into `MEM_MAX`-sized chunks and pushed down
//! into level 1. If level 1 already holds SSTs whose key ranges intersect
//! the incoming batch, every intersecting SST (not just the ones a naive
//! writer would collide with) is pulled into the merge first — this is what
//! keeps the disjoint-range invariant true after compaction, rather than
//! merely after the compaction that happened to notice an overlap.
//! Whatever does not fit in level L+1's remaining capacity cascades to
//! L+2, and so on.

use anyhow::Result;

use crate::levels::LevelDirectory;
use config::StoreConfig;

/// Runs a full level-0 absorb: merges `trigger` (the entries that would
/// have been the next level-0 flush) with every current level-0 SSTable,
/// clears level 0, and cascades the result down into level 1 and beyond.
pub fn absorb_and_cascade(
    levels: &mut LevelDirectory,
    config: &StoreConfig,
    trigger: Vec<(u64, Vec<u8>)>,
) -> Result<()> {
    let mut sources = Vec::with_capacity(1 + levels.level0_len());
    sources.push(trigger);
    for entry in levels.chaos().iter().rev() {
        let path = levels.dir().join(&entry.filename);
        let bytes = std::fs::read(&path)?;
        sources.push(sstable::decode(&bytes)?);
    }

    let merged = sstable::merge_sources(&sources);
    levels.clear_level0()?;

    cascade(levels, config, 1, merged)
}

/// Pushes `entries` into `level`, gathering and re-merging any overlapping
/// SSTs already there, then recurses into `level + 1` with whatever does
/// not fit.
fn cascade(
    levels: &mut LevelDirectory,
    config: &StoreConfig,
    level: usize,
    entries: Vec<(u64, Vec<u8>)>,
) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }

    let bmin = entries.first().expect("checked non-empty").0;
    let bmax = entries.last().expect("checked non-empty").0;

    let entries = if levels.level_exists(level) {
        let overlapping = levels.gather_overlap(level, bmin, bmax)?;
        if overlapping.is_empty() {
            entries
        } else {
            let mut sources = Vec::with_capacity(1 + overlapping.len());
            sources.push(entries);
            sources.extend(overlapping);
            sstable::merge_sources(&sources)
        }
    } else {
        levels.ensure_level(level);
        entries
    };

    let chunks = split_into_chunks(&entries, config.mem_max);

    let retained_len = levels.level_len(level);
    let capacity = config.level_capacity(level);
    let rem_avail = capacity.saturating_sub(retained_len).min(chunks.len());

    if rem_avail > 0 {
        let split_at = chunks.len() - rem_avail;
        levels.splice_in(level, &chunks[split_at..])?;
        if split_at > 0 {
            let leftover: Vec<(u64, Vec<u8>)> =
                chunks[..split_at].iter().flatten().cloned().collect();
            return cascade(levels, config, level + 1, leftover);
        }
        Ok(())
    } else {
        let leftover: Vec<(u64, Vec<u8>)> = chunks.iter().flatten().cloned().collect();
        cascade(levels, config, level + 1, leftover)
    }
}

/// Repartitions an ascending-key entry stream into chunks whose serialized
/// SST size (header + per-entry index overhead + value bytes) stays under
/// `mem_max`, using the same formula the memtable flush threshold uses.
fn split_into_chunks(
    entries: &[(u64, Vec<u8>)],
    mem_max: usize,
) -> Vec<Vec<(u64, Vec<u8>)>> {
    let mut chunks = Vec::new();
    let mut current: Vec<(u64, Vec<u8>)> = Vec::new();
    let mut data_bytes = 0usize;

    for (key, value) in entries {
        if !current.is_empty() {
            let would_count = current.len() + 1;
            let would_bytes = data_bytes + value.len();
            if StoreConfig::serialized_size(would_count, would_bytes) > mem_max {
                chunks.push(std::mem::take(&mut current));
                data_bytes = 0;
            }
        }
        current.push((*key, value.clone()));
        data_bytes += value.len();
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

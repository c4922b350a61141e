//! Multi-way merge over already-resident entry vectors.
//!
//! Produces a single ascending-key stream with exactly one entry per key.
//! When a key appears in more than one source, the entry from the **newer**
//! source wins; entries from older sources at the same key are dropped.
//!
//! "Newer" here is purely positional: callers pass sources ordered
//! newest-first (index 0 is newest). This is how the compactor expresses
//! both of the version-ordering rules in one shape — the trigger SST and
//! level 0 newest-to-oldest for a level-0 absorb, or a single retained SST
//! ahead of a freshly split one for an intra-level re-merge.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct HeapEntry {
    key: u64,
    /// Index into `sources`; lower index means newer.
    source: usize,
    /// Index into `sources[source]`.
    pos: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.source == other.source
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse the key comparison so the
        // smallest key surfaces first. On a key tie, prefer the newer
        // source (the smaller source index).
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Merges `sources` (newest-first) into one ascending-key, duplicate-free
/// stream.
///
/// Each source must already be sorted in ascending key order with distinct
/// keys within itself, matching both an SST's on-disk order and a
/// memtable's `ordered_entries()`.
#[must_use]
pub fn merge_sources(sources: &[Vec<(u64, Vec<u8>)>]) -> Vec<(u64, Vec<u8>)> {
    let mut heap = BinaryHeap::new();
    for (source, entries) in sources.iter().enumerate() {
        if !entries.is_empty() {
            heap.push(HeapEntry {
                key: entries[0].0,
                source,
                pos: 0,
            });
        }
    }

    let mut out = Vec::new();
    while let Some(top) = heap.pop() {
        let key = top.key;
        let mut best_source = top.source;
        let mut best_pos = top.pos;

        if let Some(next_pos) = top.pos.checked_add(1) {
            if next_pos < sources[top.source].len() {
                heap.push(HeapEntry {
                    key: sources[top.source][next_pos].0,
                    source: top.source,
                    pos: next_pos,
                });
            }
        }

        // Drain every other entry at this key; the smallest source index
        // (newest) wins.
        while let Some(peek) = heap.peek() {
            if peek.key != key {
                break;
            }
            let dup = heap.pop().unwrap();
            if dup.source < best_source {
                best_source = dup.source;
                best_pos = dup.pos;
            }
            if let Some(next_pos) = dup.pos.checked_add(1) {
                if next_pos < sources[dup.source].len() {
                    heap.push(HeapEntry {
                        key: sources[dup.source][next_pos].0,
                        source: dup.source,
                        pos: next_pos,
                    });
                }
            }
        }

        out.push(sources[best_source][best_pos].clone());
    }
    out
}

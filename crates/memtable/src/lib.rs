//! # Memtable
//!
//! An in-memory, sorted, mutable write buffer for the RiptideKV storage engine.
//!
//! The memtable is the first point of contact for every write operation. It
//! buffers recent puts and removes in a sorted structure (`BTreeMap`) before
//! they are flushed to an immutable on-disk SSTable.
//!
//! ## Key properties
//! - **Sorted order**: `ordered_entries` always yields ascending-key order
//!   (required for SSTable flush).
//! - **Tombstone support**: a value of zero length marks a key as deleted.
//!   This is the only representation of deletion the store has; it is the
//!   caller's job (the `engine` crate) to translate "delete" into "put the
//!   empty value."
//! - **Exact size tracking**: `data_size` sums the byte length of every
//!   stored value (key bytes are fixed-width and accounted for by the
//!   engine's flush-size formula, not here), driving the engine's flush
//!   threshold decision.
//!
//! ## Example
//! ```rust
//! use memtable::Memtable;
//!
//! let mut m = Memtable::new();
//! m.put(1, b"hello".to_vec());
//! assert_eq!(m.get(1), Some(b"hello".as_slice()));
//!
//! m.put(1, Vec::new()); // tombstone
//! assert_eq!(m.get(1), Some(b"".as_slice()));
//! ```

use std::collections::BTreeMap;

/// An ordered, in-memory write buffer backed by a `BTreeMap<u64, Vec<u8>>`.
///
/// Each key maps to at most one value. An empty value is a tombstone: it
/// shadows any older on-disk version of the key but the engine reports it to
/// callers as "absent." The memtable itself does not interpret emptiness —
/// it just stores whatever bytes it is given — so `get` and `ordered_entries`
/// return tombstones like any other entry.
#[derive(Debug, Default)]
pub struct Memtable {
    map: BTreeMap<u64, Vec<u8>>,
    data_bytes: usize,
}

impl Memtable {
    /// Creates a new, empty memtable.
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
            data_bytes: 0,
        }
    }

    /// Inserts or overwrites `key` with `value`, returning the memtable's new
    /// `data_size()`.
    ///
    /// Overwriting an existing key adjusts `data_bytes` by the length delta
    /// between the old and new value.
    pub fn put(&mut self, key: u64, value: Vec<u8>) -> usize {
        let new_len = value.len();
        match self.map.insert(key, value) {
            Some(old) => {
                self.data_bytes = self.data_bytes - old.len() + new_len;
            }
            None => {
                self.data_bytes += new_len;
            }
        }
        self.data_bytes
    }

    /// Returns the value stored for `key`, if present.
    ///
    /// A present-but-empty value is a tombstone; this method does not filter
    /// it out — callers that need "deleted" semantics should check
    /// `value.is_empty()` or go through the `engine` crate's `get`.
    #[must_use]
    pub fn get(&self, key: u64) -> Option<&[u8]> {
        self.map.get(&key).map(|v| v.as_slice())
    }

    /// Removes `key` outright, returning `true` if it was present.
    ///
    /// This is a genuine removal — the key disappears from the memtable
    /// entirely, as if it had never been written. The engine does **not**
    /// use this to implement its own `remove` operation (a delete is
    /// recorded as a tombstone via `put`, so that it can shadow an
    /// on-disk version of the key); this method exists for completeness of
    /// the ordered-map contract and is used where a key's absence, not its
    /// deletion, needs to be recorded.
    pub fn remove(&mut self, key: u64) -> bool {
        match self.map.remove(&key) {
            Some(old) => {
                self.data_bytes -= old.len();
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `key` has an entry (including a tombstone).
    #[must_use]
    pub fn contains_key(&self, key: u64) -> bool {
        self.map.contains_key(&key)
    }

    /// Returns the number of entries, including tombstones.
    #[must_use]
    pub fn size(&self) -> usize {
        self.map.len()
    }

    /// Returns the total byte length of all stored values.
    ///
    /// Used by the engine to decide when the memtable's projected serialized
    /// footprint crosses the flush threshold.
    #[must_use]
    pub fn data_size(&self) -> usize {
        self.data_bytes
    }

    /// Returns `true` if the memtable holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns every `(key, value)` pair in ascending-key order.
    ///
    /// This is the form the SST codec consumes when flushing the memtable to
    /// disk; the ordering guarantee comes from the underlying `BTreeMap`.
    #[must_use]
    pub fn ordered_entries(&self) -> Vec<(u64, Vec<u8>)> {
        self.map.iter().map(|(&k, v)| (k, v.clone())).collect()
    }

    /// Removes every entry and resets `data_size()` to zero.
    ///
    /// Called after a successful flush to disk.
    pub fn reset(&mut self) {
        self.map.clear();
        self.data_bytes = 0;
    }
}

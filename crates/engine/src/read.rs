//! Read path: `get`.
//!
//! Checks the memtable first (freshest data, including tombstones), then
//! probes the level directory: level 0 newest-to-oldest, then level 1, 2,
//! ... in order. A tombstone anywhere along the way — an entry with a
//! zero-length value — is reported as "absent," not as a present empty
//! value.

use anyhow::Result;

use crate::Engine;

impl Engine {
    /// Looks up `key`, returning its value or an empty vector if the key is
    /// absent or has been removed.
    ///
    /// Per the public interface, there is no way to distinguish "present
    /// with an empty value" from "absent" — the store's only representation
    /// of deletion, the tombstone, is itself the empty value.
    pub fn get(&self, key: u64) -> Result<Vec<u8>> {
        if let Some(value) = self.mem.get(key) {
            return Ok(value.to_vec());
        }

        match self.levels.find(key) {
            Some((path, hit)) if hit.value_len > 0 => sstable::read_value(&path, hit),
            _ => Ok(Vec::new()),
        }
    }
}

//! # Membership filter
//!
//! A fixed-size probabilistic set-membership structure over 64-bit keys.
//!
//! A membership filter can tell you with certainty that a key is **not** in
//! the set (no false negatives), but may occasionally report that a key **is**
//! in the set when it isn't (false positives). Unlike a general-purpose bloom
//! filter, the size of this one is not tuned per item count: it is a fixed
//! `NUM_BITS`-bit array with exactly three hash functions, matching the
//! parameters every SSTable's in-memory index seeds its filter with.
//!
//! ## Usage in RiptideKV
//!
//! Each level index builds one of these from the keys of its SSTable. During
//! point lookups the level index checks the filter first -- if it says "not
//! present", the binary search over the key vector is skipped entirely.
//!
//! ## Example
//!
//! ```rust
//! use bloom::MembershipFilter;
//!
//! let mut f = MembershipFilter::new();
//! f.insert(42);
//! assert!(f.may_contain(42));
//! assert!(!f.may_contain(7));
//! ```

/// Number of bits in the filter's bit array.
pub const NUM_BITS: u64 = 10_000;

const WORDS: usize = ((NUM_BITS + 63) / 64) as usize;

/// A fixed-size bit array seeded with three hash functions over a `u64` key.
///
/// Insert sets three bits (one per hash function); a query reports "possibly
/// present" only if all three are set. False positives are expected and
/// acceptable; false negatives must never occur.
#[derive(Debug, Clone)]
pub struct MembershipFilter {
    bits: [u64; WORDS],
}

impl MembershipFilter {
    /// Creates an empty filter (no bits set).
    pub fn new() -> Self {
        Self { bits: [0u64; WORDS] }
    }

    /// Rebuilds a filter by seeding it with every key in `keys`.
    ///
    /// This is how a level index constructs its filter when loading (or
    /// reconstructing from) an SSTable's index segment: the filter is never
    /// itself persisted, it is rebuilt from the key list every time.
    pub fn from_keys<I: IntoIterator<Item = u64>>(keys: I) -> Self {
        let mut f = Self::new();
        for k in keys {
            f.insert(k);
        }
        f
    }

    /// Inserts `key` into the filter, setting all three of its hash bits.
    pub fn insert(&mut self, key: u64) {
        for h in Self::hashes(key) {
            self.set_bit(h);
        }
    }

    /// Returns `true` if `key` **might** be in the set, `false` if it is
    /// **definitely not**.
    #[must_use]
    pub fn may_contain(&self, key: u64) -> bool {
        Self::hashes(key).into_iter().all(|h| self.get_bit(h))
    }

    fn set_bit(&mut self, bit_index: u64) {
        let (word, offset) = Self::locate(bit_index);
        self.bits[word] |= 1u64 << offset;
    }

    fn get_bit(&self, bit_index: u64) -> bool {
        let (word, offset) = Self::locate(bit_index);
        (self.bits[word] >> offset) & 1 == 1
    }

    fn locate(bit_index: u64) -> (usize, u32) {
        ((bit_index / 64) as usize, (bit_index % 64) as u32)
    }

    /// Computes the filter's three bit indices for `key`: `h1(x) = x`,
    /// `h2(x) = x ^ mix(x, {16,32,48})`, `h3(x) = x ^ mix(x, {8,24,40})`,
    /// each reduced mod `NUM_BITS`.
    fn hashes(key: u64) -> [u64; 3] {
        let h1 = key;
        let h2 = key ^ rotate_shift_mix(key, [16, 32, 48]);
        let h3 = key ^ rotate_shift_mix(key, [8, 24, 40]);
        [h1 % NUM_BITS, h2 % NUM_BITS, h3 % NUM_BITS]
    }
}

impl Default for MembershipFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// XORs `x` shifted left and right by each amount in `shifts`.
fn rotate_shift_mix(x: u64, shifts: [u32; 3]) -> u64 {
    let mut acc = 0u64;
    for s in shifts {
        acc ^= x.wrapping_shl(s) ^ x.wrapping_shr(s);
    }
    acc
}

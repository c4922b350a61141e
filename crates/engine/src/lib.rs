//! # Engine — RiptideKV Storage Engine
//!
//! The central orchestrator tying the [`memtable`], [`sstable`], and
//! [`levels`] modules into a complete embedded LSM-tree key-value store.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                   ENGINE                      │
//! │                                               │
//! │ write.rs → Memtable put/tombstone              │
//! │              |                                │
//! │              |  (MEM_MAX exceeded?)            │
//! │              v                                │
//! │           flush() → new SST → level 0         │
//! │              |                                │
//! │              |  (level 0 full?)                │
//! │              v                                │
//! │         compaction.rs → absorb + cascade       │
//! │                                               │
//! │ read.rs  → Memtable → level 0 → level 1, 2, …  │
//! │            (first match wins)                  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module responsibilities
//!
//! | Module        | Purpose                                                |
//! |---------------|---------------------------------------------------------|
//! | [`lib`]       | `Engine` struct, `open`/`close`/`reset`, `Drop`          |
//! | [`levels`]    | Level directory: discovery, file naming, catalog        |
//! | [`write`]     | `put`, `remove`, internal `flush`                       |
//! | [`read`]      | `get`                                                    |
//! | [`compaction`]| Absorb level 0, multi-way merge, split, cascade          |
//!
//! ## Crash safety
//!
//! There is no WAL and no manifest: the level directory is rebuilt purely
//! by scanning the store directory at open time (see [`levels`]). SSTable
//! files are written atomically (temp file + fsync + rename), so a crash
//! mid-write never corrupts an existing file — at worst it leaves an
//! orphaned `.bin.tmp` that discovery never looks at. A crash mid-compaction
//! can leave the directory in a state where some of the old files have been
//! deleted and not all of the new ones are written yet; there is no journal
//! to recover that case, matching the reference design's "best-effort
//! discovery" recovery model.

mod compaction;
mod levels;
mod read;
mod write;

use anyhow::Result;
pub use config::StoreConfig;
use levels::LevelDirectory;
use memtable::Memtable;
use std::path::{Path, PathBuf};

/// The embedded LSM-tree key-value store.
///
/// Single-threaded and synchronous: every operation either completes or
/// returns an error, and compaction (when triggered) runs to completion
/// inside the `put`/`remove` call that found level 0 full.
pub struct Engine {
    pub(crate) mem: Memtable,
    pub(crate) levels: LevelDirectory,
    pub(crate) config: StoreConfig,
    dir: PathBuf,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("dir", &self.dir)
            .field("mem_max", &self.config.mem_max)
            .field("memtable_entries", &self.mem.size())
            .field("memtable_data_bytes", &self.mem.data_size())
            .field("level0_count", &self.levels.level0_len())
            .field("ordered_level_count", &self.levels.ordered_level_count())
            .finish()
    }
}

impl Engine {
    /// Opens a store rooted at `dir`, creating it if missing, and
    /// rebuilding the level directory by scanning whatever `.bin` files are
    /// already there.
    pub fn open<P: AsRef<Path>>(dir: P, config: StoreConfig) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let levels = LevelDirectory::discover(&dir)?;
        Ok(Self {
            mem: Memtable::new(),
            levels,
            config,
            dir,
        })
    }

    /// Opens a store with the default [`StoreConfig`].
    pub fn open_default<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::open(dir, StoreConfig::default())
    }

    /// Flushes any pending writes (and runs compaction if that flush
    /// overflows level 0) before the store goes out of scope.
    ///
    /// A single `flush()` call is sufficient: a flush that triggers
    /// compaction runs the cascade to completion before returning, so
    /// there is nothing left to re-flush afterward.
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        Ok(())
    }

    /// Clears the memtable and the entire level directory, then deletes and
    /// recreates the store directory.
    pub fn reset(&mut self) -> Result<()> {
        self.mem.reset();
        self.levels.clear()?;
        std::fs::remove_dir_all(&self.dir)?;
        std::fs::create_dir_all(&self.dir)?;
        self.levels = LevelDirectory::discover(&self.dir)?;
        Ok(())
    }

    /// The store's configuration (flush threshold, level capacities).
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of entries currently buffered in the memtable.
    #[must_use]
    pub fn memtable_len(&self) -> usize {
        self.mem.size()
    }

    /// Number of SSTables currently in level 0.
    #[must_use]
    pub fn level0_count(&self) -> usize {
        self.levels.level0_len()
    }

    /// Number of ordered levels (`>= 1`) currently populated.
    #[must_use]
    pub fn ordered_level_count(&self) -> usize {
        self.levels.ordered_level_count()
    }
}

/// Best-effort flush on drop: if the caller didn't call [`Engine::close`],
/// any buffered writes are still flushed (and compacted, if needed) so they
/// are not silently lost when the value goes out of scope. Errors during
/// this best-effort flush are swallowed — `Drop` cannot propagate them.
impl Drop for Engine {
    fn drop(&mut self) {
        if !self.mem.is_empty() {
            let _ = self.flush();
        }
    }
}

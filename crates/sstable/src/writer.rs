use anyhow::{bail, Result};
use std::fs::{rename, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::format::encode;
use crate::reader::SstIndex;

/// Writes `entries` to a new, immutable SST file at `path`.
///
/// The write is crash-safe: the encoded bytes land in a temporary file next
/// to `path`, are fsynced, and are then atomically renamed into place. A
/// crash mid-write leaves only an orphaned `.tmp` file; it never corrupts an
/// existing `.bin`.
///
/// Returns the [`SstIndex`] for the file just written, built directly from
/// `entries` rather than by reopening and re-parsing the file.
///
/// # Errors
///
/// Returns an error if `entries` is empty (an empty SST is never a useful
/// artifact — callers should not flush or compact down to nothing) or on
/// I/O failure.
pub fn write_sst(path: &Path, entries: &[(u64, Vec<u8>)]) -> Result<SstIndex> {
    if entries.is_empty() {
        bail!("refusing to write an empty SSTable at {:?}", path);
    }

    let tmp_path = path.with_extension("bin.tmp");
    let bytes = encode(entries);

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp_path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);

    rename(&tmp_path, path)?;

    if let Some(parent) = path.parent() {
        if let Ok(dir) = std::fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(SstIndex::from_entries(entries))
}

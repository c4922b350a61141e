use super::*;
use tempfile::tempdir;

// -------------------- codec round-trip (P7) --------------------

#[test]
fn round_trip_preserves_entries_and_order() {
    let entries = vec![
        (1u64, b"a".to_vec()),
        (5, b"bb".to_vec()),
        (9, Vec::new()), // tombstone
        (42, b"ddddd".to_vec()),
    ];
    let bytes = encode(&entries);
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, entries);
}

#[test]
fn round_trip_of_single_entry() {
    let entries = vec![(7u64, b"solo".to_vec())];
    let bytes = encode(&entries);
    assert_eq!(decode(&bytes).unwrap(), entries);
}

#[test]
fn round_trip_of_all_tombstones() {
    let entries = vec![(1u64, Vec::new()), (2, Vec::new()), (3, Vec::new())];
    let bytes = encode(&entries);
    assert_eq!(decode(&bytes).unwrap(), entries);
}

#[test]
fn header_size_field_matches_file_length() {
    let entries = vec![(1u64, b"x".to_vec()), (2, b"yz".to_vec())];
    let bytes = encode(&entries);
    let header = read_header(&bytes).unwrap();
    assert_eq!(header.size as usize, bytes.len());
    assert_eq!(header.data_seg_bias, HEADER_BYTES + 2 * INDEX_RECORD_BYTES);
}

#[test]
fn read_header_rejects_size_mismatch() {
    let entries = vec![(1u64, b"x".to_vec())];
    let mut bytes = encode(&entries);
    bytes.push(0); // corrupt: trailing byte not reflected in `size`
    assert!(read_header(&bytes).is_err());
}

#[test]
fn index_only_view_does_not_require_data_segment() {
    let entries = vec![(1u64, b"abc".to_vec()), (2, b"d".to_vec())];
    let bytes = encode(&entries);
    let header = read_header(&bytes).unwrap();
    let idx_only = &bytes[..header.data_seg_bias as usize];
    let records = read_index(idx_only, header).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key, 1);
    assert_eq!(records[1].key, 2);
}

// -------------------- SstIndex --------------------

#[test]
fn sst_index_from_entries_finds_present_keys() {
    let entries = vec![(1u64, b"a".to_vec()), (2, b"bb".to_vec()), (3, b"ccc".to_vec())];
    let idx = SstIndex::from_entries(&entries);
    let hit = idx.find(2).unwrap();
    assert_eq!(hit.value_offset, 1); // after "a"
    assert_eq!(hit.value_len, 2);
}

#[test]
fn sst_index_reports_tombstone_length_as_zero() {
    let entries = vec![(1u64, b"a".to_vec()), (2, Vec::new())];
    let idx = SstIndex::from_entries(&entries);
    let hit = idx.find(2).unwrap();
    assert_eq!(hit.value_len, 0);
}

#[test]
fn sst_index_missing_key_returns_none() {
    let entries = vec![(1u64, b"a".to_vec()), (10, b"b".to_vec())];
    let idx = SstIndex::from_entries(&entries);
    assert!(idx.find(5).is_none());
}

#[test]
fn sst_index_bounds() {
    let entries = vec![(3u64, b"a".to_vec()), (7, b"b".to_vec()), (20, b"c".to_vec())];
    let idx = SstIndex::from_entries(&entries);
    assert_eq!(idx.low_bound(), Some(3));
    assert_eq!(idx.high_bound(), Some(20));
}

#[test]
fn sst_index_overlap_detection() {
    let entries = vec![(10u64, b"a".to_vec()), (20, b"b".to_vec())];
    let idx = SstIndex::from_entries(&entries);
    assert!(idx.overlaps(15, 25));
    assert!(idx.overlaps(0, 10));
    assert!(idx.overlaps(20, 30));
    assert!(!idx.overlaps(21, 30));
    assert!(!idx.overlaps(0, 9));
}

#[test]
fn sst_index_open_matches_from_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("0.bin");
    let entries = vec![(1u64, b"a".to_vec()), (2, b"bb".to_vec())];
    let built = write_sst(&path, &entries).unwrap();

    let opened = SstIndex::open(&path).unwrap();
    assert_eq!(opened.len(), built.len());
    assert_eq!(opened.low_bound(), built.low_bound());
    assert_eq!(opened.high_bound(), built.high_bound());
    assert_eq!(opened.data_seg_bias(), built.data_seg_bias());
    assert_eq!(opened.find(2), built.find(2));
}

// -------------------- writer + positional read (P9, I2) --------------------

#[test]
fn write_sst_then_read_value_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("0.bin");
    let entries = vec![(1u64, b"hello".to_vec()), (2, b"world!".to_vec())];
    let idx = write_sst(&path, &entries).unwrap();

    let hit = idx.find(2).unwrap();
    let value = read_value(&path, hit).unwrap();
    assert_eq!(value, b"world!");
}

#[test]
fn write_sst_rejects_empty_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("0.bin");
    assert!(write_sst(&path, &[]).is_err());
}

#[test]
fn write_sst_leaves_no_temp_file_on_success() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("0.bin");
    write_sst(&path, &[(1u64, b"a".to_vec())]).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("bin.tmp").exists());
}

// -------------------- filter soundness (P9) --------------------

#[test]
fn filter_never_produces_a_false_negative() {
    let entries: Vec<(u64, Vec<u8>)> = (0..500).map(|k| (k * 7, b"v".to_vec())).collect();
    let idx = SstIndex::from_entries(&entries);
    for (k, _) in &entries {
        assert!(idx.find(*k).is_some(), "false negative for key {}", k);
    }
}

// -------------------- merge --------------------

#[test]
fn merge_orders_ascending_by_key() {
    let a = vec![(3u64, b"a3".to_vec()), (1, b"a1".to_vec())];
    // note: inputs must already be sorted per-source; sort first
    let mut a = a;
    a.sort_by_key(|(k, _)| *k);
    let merged = merge_sources(&[a]);
    let keys: Vec<u64> = merged.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![1, 3]);
}

#[test]
fn merge_prefers_newer_source_on_key_collision() {
    let newer = vec![(1u64, b"new".to_vec())];
    let older = vec![(1u64, b"old".to_vec())];
    let merged = merge_sources(&[newer, older]);
    assert_eq!(merged, vec![(1, b"new".to_vec())]);
}

#[test]
fn merge_newer_tombstone_shadows_older_value() {
    let newer = vec![(1u64, Vec::new())];
    let older = vec![(1u64, b"old".to_vec())];
    let merged = merge_sources(&[newer, older]);
    assert_eq!(merged, vec![(1, Vec::new())]);
}

#[test]
fn merge_merges_disjoint_sources() {
    let a = vec![(1u64, b"a".to_vec()), (3, b"c".to_vec())];
    let b = vec![(2u64, b"b".to_vec()), (4, b"d".to_vec())];
    let merged = merge_sources(&[a, b]);
    let keys: Vec<u64> = merged.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![1, 2, 3, 4]);
}

#[test]
fn merge_of_three_sources_resolves_by_source_order() {
    // source 0 is newest.
    let s0 = vec![(5u64, b"newest".to_vec())];
    let s1 = vec![(5u64, b"middle".to_vec()), (6, b"only-in-1".to_vec())];
    let s2 = vec![(5u64, b"oldest".to_vec())];
    let merged = merge_sources(&[s0, s1, s2]);
    assert_eq!(
        merged,
        vec![(5, b"newest".to_vec()), (6, b"only-in-1".to_vec())]
    );
}

#[test]
fn merge_of_empty_sources_is_empty() {
    let sources: Vec<Vec<(u64, Vec<u8>)>> = vec![Vec::new(), Vec::new()];
    assert!(merge_sources(&sources).is_empty());
}

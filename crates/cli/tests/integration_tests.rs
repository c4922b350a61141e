//! Integration tests for the RiptideKV CLI, driven through the compiled
//! binary via stdin/stdout. Covers basic ops, auto-flush, compaction, and
//! persistence across restarts.

use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Runs a batch of CLI commands against a store directory and returns the
/// captured stdout.
fn run_cli_command(dir: &Path, mem_max: &str, command: &str) -> String {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut child = Command::new("cargo")
        .args(["run", "-p", "cli", "--"])
        .env("RIPTIDEKV_DIR", dir.to_str().unwrap())
        .env("RIPTIDEKV_MEM_MAX", mem_max)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn cli");

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        stdin
            .write_all(command.as_bytes())
            .expect("failed to write to stdin");
        stdin.write_all(b"EXIT\n").expect("failed to write EXIT");
    }

    let output = child.wait_with_output().expect("failed to read output");
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_basic_put_get() {
    let dir = tempdir().unwrap();
    let output = run_cli_command(dir.path(), "2097152", "PUT 1 value1\nGET 1\n");

    assert!(output.contains("OK"));
    assert!(output.contains("value1"));
}

#[test]
fn test_multiple_keys() {
    let dir = tempdir().unwrap();
    let commands = "PUT 1 one\nPUT 2 two\nPUT 3 three\nGET 1\nGET 2\nGET 3\n";
    let output = run_cli_command(dir.path(), "2097152", commands);

    assert!(output.contains("one"));
    assert!(output.contains("two"));
    assert!(output.contains("three"));
}

#[test]
fn test_overwrite_key() {
    let dir = tempdir().unwrap();
    let commands = "PUT 1 oldvalue\nGET 1\nPUT 1 newvalue\nGET 1\n";
    let output = run_cli_command(dir.path(), "2097152", commands);

    assert!(output.contains("oldvalue"));
    assert!(output.contains("newvalue"));
}

#[test]
fn test_delete_key() {
    let dir = tempdir().unwrap();
    let commands = "PUT 1 value\nGET 1\nDEL 1\nGET 1\nDEL 1\n";
    let output = run_cli_command(dir.path(), "2097152", commands);

    assert!(output.contains("value"));
    assert!(output.contains("(nil)"));
}

#[test]
fn test_invalid_key_is_rejected() {
    let dir = tempdir().unwrap();
    let commands = "PUT notanumber value\nGET 1\n";
    let output = run_cli_command(dir.path(), "2097152", commands);

    assert!(output.contains("ERR key must be a u64"));
}

#[test]
fn test_auto_flush_to_sstable() {
    let dir = tempdir().unwrap();
    // Small mem_max to force a flush well before 10k small entries would
    // naturally cross the default 2 MiB threshold.
    let mut commands = String::new();
    for i in 0..200u64 {
        commands.push_str(&format!("PUT {} value_with_some_padding_{}\n", i, i));
    }
    let output = run_cli_command(dir.path(), "4096", &commands);
    assert!(!output.contains("ERR"));

    let sst_files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "bin").unwrap_or(false))
        .collect();

    assert!(!sst_files.is_empty(), "flush should create at least one SSTable");
}

#[test]
fn test_compaction_preserves_all_keys() {
    let dir = tempdir().unwrap();
    // mem_max small enough, and enough distinct keys, to force level 0 to
    // overflow and cascade into level 1.
    let mut commands = String::new();
    for i in 0..2000u64 {
        commands.push_str(&format!("PUT {} v{}\n", i, i));
    }
    for i in 0..2000u64 {
        commands.push_str(&format!("GET {}\n", i));
    }
    let output = run_cli_command(dir.path(), "4096", &commands);

    assert!(output.contains("v0"));
    assert!(output.contains("v1999"));
    assert!(!output.contains("(nil)"));
}

#[test]
fn test_reset_clears_store() {
    let dir = tempdir().unwrap();
    let commands = "PUT 1 a\nPUT 2 b\nRESET\nGET 1\nGET 2\n";
    let output = run_cli_command(dir.path(), "2097152", commands);

    assert_eq!(output.matches("(nil)").count(), 2, "both gets after RESET should miss");

    let sst_files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "bin").unwrap_or(false))
        .collect();
    assert!(sst_files.is_empty());
}

#[test]
fn test_stats_output() {
    let dir = tempdir().unwrap();
    let commands = "PUT 1 x\nPUT 2 y\nSTATS\n";
    let output = run_cli_command(dir.path(), "2097152", commands);

    assert!(output.contains("Engine"));
}

#[test]
fn test_quit_command() {
    let dir = tempdir().unwrap();
    let commands = "PUT 1 bar\nQUIT\n";
    let output = run_cli_command(dir.path(), "2097152", commands);

    assert!(output.contains("OK"));
    assert!(output.contains("bye"));
}

#[test]
fn test_persistence_across_restarts() {
    let dir = tempdir().unwrap();

    run_cli_command(dir.path(), "2097152", "PUT 42 persisted\n");
    let output = run_cli_command(dir.path(), "2097152", "GET 42\n");

    assert!(output.contains("persisted"));
}

#[test]
fn test_large_value() {
    let dir = tempdir().unwrap();
    let large_value = "x".repeat(500);
    let commands = format!("PUT 7 {}\nGET 7\n", large_value);
    let output = run_cli_command(dir.path(), "2097152", &commands);

    assert!(output.contains(&large_value));
}

#[test]
fn test_mixed_operations_stress() {
    let dir = tempdir().unwrap();
    let mut commands = String::new();

    for i in 0..30u64 {
        match i % 3 {
            0 => commands.push_str(&format!("PUT {} v{}\n", i, i)),
            1 => commands.push_str(&format!("GET {}\n", i)),
            _ => commands.push_str(&format!("DEL {}\n", i.saturating_sub(2))),
        }
    }

    let output = run_cli_command(dir.path(), "4096", &commands);
    assert!(!output.is_empty());
}

//! # CLI - RiptideKV Interactive Shell
//!
//! A REPL-style command-line interface for the RiptideKV storage engine.
//! Reads commands from stdin, executes them against the engine, and prints
//! results to stdout. Designed for both interactive use and scripted testing
//! (pipe commands via stdin).
//!
//! ## Commands
//!
//! ```text
//! PUT key value      Insert or update a key-value pair
//! GET key            Look up a key (prints value or "(nil)")
//! DEL key            Delete a key (writes a tombstone)
//! RESET              Wipe the store directory and start over
//! STATS              Print engine debug info
//! EXIT / QUIT        Shut down gracefully (flushes before exit)
//! ```
//!
//! Keys are parsed as `u64`; a key that fails to parse is rejected with an
//! `ERR` line rather than panicking the REPL. There is no `SCAN` or
//! `COMPACT` command — range scans are out of scope (spec.md §1) and
//! compaction is always synchronous with the `put`/`remove` that triggers
//! it, so there is nothing for a manual trigger to do.
//!
//! ## Configuration
//!
//! All settings are controlled via environment variables:
//!
//! ```text
//! RIPTIDEKV_DIR       store directory          (default: "data")
//! RIPTIDEKV_MEM_MAX   flush threshold in bytes (default: 2097152 = 2 MiB)
//! ```
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p cli
//! RiptideKV started (dir=data, mem_max=2097152, level0=0, levels=0)
//! > PUT 1 Alice
//! OK
//! > GET 1
//! Alice
//! > DEL 1
//! OK
//! > GET 1
//! (nil)
//! > EXIT
//! bye
//! ```

use anyhow::Result;
use config::StoreConfig;
use engine::Engine;
use std::io::{self, BufRead, Write};

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn main() -> Result<()> {
    // Configuration via environment variables with sensible defaults.
    //
    //  RIPTIDEKV_DIR     - store directory          (default: "data")
    //  RIPTIDEKV_MEM_MAX - flush threshold in bytes (default: 2097152 = 2 MiB)
    let dir = env_or("RIPTIDEKV_DIR", "data");
    let default_mem_max = StoreConfig::default().mem_max;
    let mem_max: usize = env_or("RIPTIDEKV_MEM_MAX", &default_mem_max.to_string())
        .parse()
        .unwrap_or(default_mem_max);

    let config = StoreConfig {
        mem_max,
        ..StoreConfig::default()
    };
    let mut engine = Engine::open(&dir, config)?;

    println!(
        "RiptideKV started (dir={}, mem_max={}, level0={}, levels={})",
        dir,
        mem_max,
        engine.level0_count(),
        engine.ordered_level_count()
    );
    println!("Commands: PUT key value | GET key | DEL key | RESET | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "PUT" | "SET" => match parts.next().map(str::parse::<u64>) {
                    Some(Ok(key)) => {
                        let value: String = parts.collect::<Vec<&str>>().join(" ");
                        if value.is_empty() {
                            println!("ERR usage: PUT key value");
                        } else {
                            match engine.put(key, value.into_bytes()) {
                                Ok(_) => println!("OK"),
                                Err(e) => println!("ERR put failed: {}", e),
                            }
                        }
                    }
                    Some(Err(_)) => println!("ERR key must be a u64"),
                    None => println!("ERR usage: PUT key value"),
                },
                "GET" => match parts.next().map(str::parse::<u64>) {
                    Some(Ok(key)) => match engine.get(key) {
                        Ok(value) if value.is_empty() => println!("(nil)"),
                        Ok(value) => println!("{}", String::from_utf8_lossy(&value)),
                        Err(e) => println!("ERR get failed: {}", e),
                    },
                    Some(Err(_)) => println!("ERR key must be a u64"),
                    None => println!("ERR usage: GET key"),
                },
                "DEL" | "REMOVE" => match parts.next().map(str::parse::<u64>) {
                    Some(Ok(key)) => match engine.remove(key) {
                        Ok(true) => println!("OK"),
                        Ok(false) => println!("(nil)"),
                        Err(e) => println!("ERR del failed: {}", e),
                    },
                    Some(Err(_)) => println!("ERR key must be a u64"),
                    None => println!("ERR usage: DEL key"),
                },
                "RESET" => match engine.reset() {
                    Ok(()) => println!("OK"),
                    Err(e) => println!("ERR reset failed: {}", e),
                },
                "STATS" => {
                    println!("{:?}", engine);
                }
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    engine.close()?;
    Ok(())
}

//! Push Fight Reachability Scan
//!
//! Counts permutations that pass the reachability heuristic over a range of
//! indices. Interruptible with Ctrl-C and resumable from a checkpoint.
//!
//! Usage: scan [--start N] [--end N] [--checkpoint PATH] [--fresh]

mod checkpoint;
mod scanner;
mod stats;

use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use pushfight_core::TOTAL_PERMS;

use crate::checkpoint::{Checkpoint, ScanState};
use crate::scanner::Scanner;

struct Options {
    start: u64,
    end: u64,
    checkpoint_path: PathBuf,
    fresh: bool,
}

fn usage() -> ! {
    eprintln!("Usage: scan [--start N] [--end N] [--checkpoint PATH] [--fresh]");
    eprintln!("  Indices are in [0, {}].", TOTAL_PERMS);
    process::exit(2);
}

fn parse_args() -> Options {
    let mut options = Options {
        start: 0,
        end: TOTAL_PERMS,
        checkpoint_path: PathBuf::from("data/scan.bin"),
        fresh: false,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--start" | "--end" => {
                let value = args.next().and_then(|v| v.parse::<u64>().ok());
                match (arg.as_str(), value) {
                    ("--start", Some(v)) => options.start = v,
                    ("--end", Some(v)) => options.end = v,
                    _ => {
                        eprintln!("{} needs a non-negative integer", arg);
                        usage();
                    }
                }
            }
            "--checkpoint" => match args.next() {
                Some(path) => options.checkpoint_path = PathBuf::from(path),
                None => usage(),
            },
            "--fresh" => options.fresh = true,
            "-h" | "--help" => usage(),
            other => {
                eprintln!("Unknown argument: {}", other);
                usage();
            }
        }
    }

    if options.start > options.end || options.end > TOTAL_PERMS {
        eprintln!(
            "Invalid range [{}, {}): must satisfy start <= end <= {}",
            options.start, options.end, TOTAL_PERMS
        );
        process::exit(2);
    }
    options
}

fn main() {
    let options = parse_args();

    println!("Push Fight Reachability Scan");
    println!("============================");
    println!("Range: [{}, {})", options.start, options.end);
    println!();

    // Set up SIGINT handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, saving checkpoint...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let checkpoint_interval_secs = 60;
    let log_interval_secs = 10;

    if let Some(parent) = options.checkpoint_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let mut state = ScanState::new(options.start, options.end);
    if !options.fresh && options.checkpoint_path.exists() {
        println!("Loading checkpoint from {:?}...", options.checkpoint_path);
        match Checkpoint::load(&options.checkpoint_path) {
            Ok(saved) if saved.start == options.start && saved.end == options.end => {
                println!(
                    "Resuming at index {} ({} reachable so far)\n",
                    saved.next, saved.reachable
                );
                state = saved;
            }
            Ok(saved) => {
                println!(
                    "Warning: checkpoint covers [{}, {}), not the requested range.",
                    saved.start, saved.end
                );
                println!("Starting fresh.\n");
            }
            Err(e) => {
                println!("Warning: Failed to load checkpoint: {}", e);
                println!("Starting fresh.\n");
            }
        }
    }

    println!("Checkpoint: {:?} every {}s", options.checkpoint_path, checkpoint_interval_secs);
    println!("Log interval: {}s\n", log_interval_secs);

    let start = Instant::now();
    let mut scanner = Scanner::new(state);
    let result = scanner.run(
        &running,
        checkpoint_interval_secs,
        log_interval_secs,
        &options.checkpoint_path,
    );

    println!("\n============================");
    match result {
        Ok(true) => println!("Scan complete!"),
        Ok(false) => println!("Scan interrupted at index {}.", scanner.state.next),
        Err(e) => {
            eprintln!("Scan failed: {}", e);
            process::exit(1);
        }
    }
    println!("============================");
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());
    scanner.stats.print_summary(&scanner.state);
}

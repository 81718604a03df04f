//! Print a position given by permutation index or position string.
//!
//! Usage:
//!   print_perm [--compact] [--coords] [--succ] [--pred] 123
//!   print_perm [--compact] [--coords] [--succ] [--pred] .OX.....oxY....Oox.....OX.

use std::env;
use std::process;

use pushfight_core::{Color, Perm, Position, Validity};

struct Options {
    compact: bool,
    coords: bool,
    successors: bool,
    predecessors: bool,
}

fn print_usage() {
    println!("Usage:");
    println!("  print_perm [options] 123");
    println!("  print_perm [options] .OX.....oxY....Oox.....OX.");
    println!();
    println!("Options:");
    println!("  --compact: print positions on a single line");
    println!("  --coords: include coordinates in output");
    println!("  --succ: print successors");
    println!("  --pred: print predecessors");
}

fn render(position: &Position, options: &Options) -> String {
    if options.compact {
        position.to_string()
    } else {
        position.pretty(options.coords)
    }
}

fn print_index(position: &Position) {
    match position.validate() {
        Validity::InProgress { index, .. } => println!("{}", index),
        other => println!("{}", other),
    }
}

fn dump(perm: &Perm, options: &Options) {
    let position = perm.to_position();
    println!("{}", perm.index());
    println!("{}", render(&position, options));
    println!(
        "This position is {} reachable.",
        if perm.is_reachable() { "likely" } else { "NOT" }
    );
    if let Ok((index, rotated)) = perm.min_index() {
        println!(
            "Minimized index: {}{}",
            index,
            if rotated { " (rotated)" } else { "" }
        );
    }

    let successors = position.successors(Color::Red);
    if options.successors {
        println!("\nSuccessors:\n");
        for s in &successors {
            println!("{}", s.turn);
            print_index(&s.position);
            println!("{}", render(&s.position, options));
            if options.compact {
                println!();
            }
        }
    }

    if options.predecessors {
        println!("\nPredecessors:\n");
        for p in position.predecessors() {
            print_index(&p);
            println!("{}", render(&p, options));
            if options.compact {
                println!();
            }
        }
    }

    // Red wins by pushing a blue piece off and loses if every turn pushes a
    // red piece off (or there is no turn at all).
    let verdict = if successors.iter().any(|s| s.eliminated == Some(Color::Blue)) {
        "win"
    } else if successors.iter().all(|s| s.eliminated == Some(Color::Red)) {
        "loss"
    } else {
        "indeterminate"
    };
    println!("Verdict: {}", verdict);
}

fn main() {
    let mut options = Options {
        compact: false,
        coords: false,
        successors: false,
        predecessors: false,
    };
    let args: Vec<String> = env::args().skip(1).collect();
    let mut inputs = Vec::new();
    for arg in &args {
        match arg.as_str() {
            "--compact" => options.compact = true,
            "--coords" => options.coords = true,
            "--succ" => options.successors = true,
            "--pred" => options.predecessors = true,
            "-h" | "--help" => {
                print_usage();
                return;
            }
            flag if flag.starts_with("--") => {
                eprintln!("Unknown option: {}", flag);
                print_usage();
                process::exit(2);
            }
            input => inputs.push(input),
        }
    }

    if inputs.is_empty() {
        print_usage();
        process::exit(2);
    }

    let mut failed = false;
    for (i, input) in inputs.iter().enumerate() {
        if i > 0 {
            println!();
        }
        match input.parse::<Perm>() {
            Ok(perm) => dump(&perm, &options),
            Err(e) => {
                eprintln!("{}: {}", input, e);
                failed = true;
            }
        }
    }
    if failed {
        process::exit(1);
    }
}

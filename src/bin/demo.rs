//! Tiny CLI around [`submatch::Pattern`]: compile one pattern from the command line, then test
//! every line read from stdin against it.
//!
//! This binary exists to exercise the library end to end, not to be a production regex tool.
//! No streaming, no multi-pattern sets, no output formatting options.

use std::io::{self, BufRead};

use clap::Parser as ClapParser;
use submatch::Pattern;

/// Test stdin lines against a compiled pattern.
#[derive(Debug, ClapParser)]
#[command(name = "submatch-demo", about = "Match lines from stdin against a submatch pattern")]
struct Opt {
    /// The pattern source, e.g. `^[a-z]+\d*$`.
    pattern: String,

    /// Require the whole line to match instead of any substring.
    #[arg(short, long)]
    full: bool,
}

fn main() {
    env_logger::init();
    let opt = Opt::parse();

    let pattern = match Pattern::new(&opt.pattern) {
        Ok(pattern) => pattern,
        Err(err) => {
            eprintln!("could not compile pattern {:?}: {}", opt.pattern, err);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("error reading stdin: {}", err);
                break;
            }
        };

        let matched = if opt.full { pattern.full_match(&line) } else { pattern.partial_match(&line) };
        println!("{}\t{}", if matched { "match" } else { "no match" }, line);
    }
}

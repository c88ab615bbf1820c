//! Convert bracketed trees, one per line, to typed dependencies
//!
//! cargo run --release --example convert -- [basic|enhanced|enhanced++] < trees.mrg

use std::io::{self, BufRead, Write};
use treedeps::{Converter, Profile, Tree};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let profile: Profile = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => Profile::default(),
    };
    let converter = Converter::english()?.with_profile(profile);

    let mut trees = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match Tree::from_bracketed(&line) {
            Ok(tree) => trees.push(tree),
            Err(e) => eprintln!("skipping tree: {}", e),
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for result in converter.convert_all(&trees) {
        match result {
            Ok(conversion) => {
                for diagnostic in &conversion.diagnostics {
                    eprintln!("warning: {}", diagnostic);
                }
                for line in conversion.enhanced.lines() {
                    writeln!(out, "{}", line)?;
                }
                writeln!(out)?;
            }
            Err(e) => eprintln!("{}", e),
        }
    }
    Ok(())
}

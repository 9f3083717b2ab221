//! Effects Engine CLI
//!
//! A streaming event-log processor that reads CSV input and outputs
//! final per-account positions.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- events.csv > positions.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use effects_engine::{EffectsEngine, EngineError, Result};
use log::debug;
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let input_path = env::args()
        .nth(1)
        .ok_or(EngineError::MissingArgument)?;

    debug!("Reading events from {}", input_path);
    let file = File::open(&input_path)?;

    let mut engine = EffectsEngine::new();
    engine.process_csv(BufReader::new(file))?;

    engine.write_output(io::stdout().lock())
}

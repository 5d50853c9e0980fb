//! Payments Ledger CLI
//!
//! Reads transaction records from a CSV file and writes final client account
//! states to stdout. Rejected records are reported on stderr.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- transactions.csv > accounts.csv
//! cargo run -- --two-pass transactions.csv > accounts.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: defaults to `warn`; `debug` traces every record, `error` hides rejections

use clap::Parser;
use env_logger::Env;
use payments_ledger::{run, CliArgs, Config, Result};
use std::io;
use std::process;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = Config::from(CliArgs::parse());

    if let Err(e) = try_main(&config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn try_main(config: &Config) -> Result<()> {
    let stdout = io::stdout();
    let handle = stdout.lock();
    run(config, handle)?;

    Ok(())
}

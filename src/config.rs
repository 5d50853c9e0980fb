//! Command-line configuration.

use clap::Parser;
use std::path::PathBuf;

/// Which [`TransactionRegistry`](crate::registry::TransactionRegistry) backs the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryMode {
    /// Keep metadata for every accepted transaction. Reads the input once.
    #[default]
    Retained,

    /// Scan the input for referenced ids first, then process it with a
    /// registry that keeps metadata only for those.
    TwoPass,
}

/// Replay transaction records into final client account states
#[derive(Parser, Debug)]
#[command(name = "payments-ledger")]
#[command(about = "Replay transaction records into final client account states", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing transaction records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    #[arg(
        long = "two-pass",
        help = "Scan the input for disputed ids first to keep less transaction metadata"
    )]
    pub two_pass: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub registry: RegistryMode,
}

impl From<CliArgs> for Config {
    fn from(args: CliArgs) -> Self {
        let registry = if args.two_pass {
            RegistryMode::TwoPass
        } else {
            RegistryMode::Retained
        };

        Config {
            input: args.input_file,
            registry,
        }
    }
}

//! # Payments Ledger
//!
//! A single-pass ledger simulator. It replays deposits, withdrawals,
//! disputes, resolves and chargebacks for many clients, in the order given,
//! and reports the final state of every account.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: 4 decimal places via `rust_decimal`
//! - **All-or-nothing records**: a bad record is logged and skipped, never half-applied
//! - **Strict invariants**: `total == available + held` after every record
//! - **Deterministic output**: Accounts sorted by client ID
//!
//! ## Example
//!
//! ```
//! use payments_ledger::Engine;
//! use std::io::Cursor;
//!
//! let csv = "type,client,tx,amount\ndeposit,1,1,100.0\n";
//! let mut engine = Engine::new();
//! engine.process_csv(Cursor::new(csv)).unwrap();
//! engine.write_output(std::io::stdout()).unwrap();
//! ```

pub mod account;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod input;
pub mod ledger;
pub mod registry;
pub mod transaction;

pub use account::Account;
pub use config::{CliArgs, Config, RegistryMode};
pub use decimal::Decimal4;
pub use engine::{Engine, ProcessingSummary};
pub use error::{EngineError, NormalizeError, Rejection, Result};
pub use ledger::LedgerStore;
pub use registry::{DisputeScopedRegistry, InMemoryRegistry, TransactionRegistry};
pub use transaction::{ClientId, DisputeState, Record, TransactionMeta, TxId, TxKind};

use log::info;
use std::fs::File;
use std::io::{BufReader, Read, Write};

/// Processes the configured input file and writes the account summary.
///
/// Nothing is written unless the whole input could be read.
pub fn run<W: Write>(config: &Config, writer: W) -> Result<ProcessingSummary> {
    let file = File::open(&config.input)?;

    match config.registry {
        RegistryMode::Retained => finish(Engine::new(), BufReader::new(file), writer),
        RegistryMode::TwoPass => {
            let referenced = input::referenced_tx_ids(BufReader::new(file))?;
            info!("{} transaction ids referenced by disputes", referenced.len());

            let engine = Engine::with_registry(DisputeScopedRegistry::new(referenced));
            let file = File::open(&config.input)?;
            finish(engine, BufReader::new(file), writer)
        }
    }
}

fn finish<R, Rd, W>(mut engine: Engine<R>, reader: Rd, writer: W) -> Result<ProcessingSummary>
where
    R: TransactionRegistry,
    Rd: Read,
    W: Write,
{
    let summary = engine.process_csv(reader)?;
    info!(
        "Applied {} records, rejected {}, {} accounts, {} transaction ids retained",
        summary.applied,
        summary.rejected,
        engine.ledger().len(),
        engine.registry().len()
    );

    engine.write_output(writer)?;
    Ok(summary)
}

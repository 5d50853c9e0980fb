//! Core transaction engine.
//!
//! Applies records strictly in input order. Each record is fully applied or
//! fully rejected; a rejection is logged and processing continues with the
//! next record.
//!
//! Per transaction the engine runs this state machine:
//!
//! ```text
//! Normal --dispute--> Disputed --resolve----> Resolved
//!                              \--chargeback--> ChargedBack
//! ```

use crate::decimal::Decimal4;
use crate::error::{Rejection, Result};
use crate::input::RecordReader;
use crate::ledger::LedgerStore;
use crate::registry::{InMemoryRegistry, TransactionRegistry};
use crate::transaction::{ClientId, DisputeState, Record, TransactionMeta, TxId, TxKind};
use csv::WriterBuilder;
use log::{debug, error, warn};
use std::io::{Read, Write};

/// Counts of records seen by [`Engine::process_csv`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub applied: usize,
    pub rejected: usize,
}

/// The transaction processing engine.
///
/// Owns the [`LedgerStore`] and a [`TransactionRegistry`]. Locked accounts
/// are not skipped: the lock is reported in the output but later valid
/// records for that client still apply.
pub struct Engine<R = InMemoryRegistry> {
    ledger: LedgerStore,
    registry: R,
}

impl Engine<InMemoryRegistry> {
    /// Creates an engine that retains every accepted transaction.
    pub fn new() -> Self {
        Engine::with_registry(InMemoryRegistry::new())
    }
}

impl Default for Engine<InMemoryRegistry> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TransactionRegistry> Engine<R> {
    pub fn with_registry(registry: R) -> Self {
        Engine {
            ledger: LedgerStore::new(),
            registry,
        }
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Processes every row of `reader` in order.
    ///
    /// Only I/O failures on the input are returned as errors. Rows that fail
    /// to normalize and records the engine rejects are logged and counted.
    pub fn process_csv<Rd: Read>(&mut self, reader: Rd) -> Result<ProcessingSummary> {
        let rows = RecordReader::from_reader(reader)?;
        debug!("Column mapping: {:?}", rows.fields());

        let mut summary = ProcessingSummary::default();
        for row in rows {
            let row = row?;
            let record = match row.record {
                Ok(record) => record,
                Err(e) => {
                    warn!("row {}: {}", row.line, e);
                    summary.rejected += 1;
                    continue;
                }
            };

            match self.apply(&record) {
                Ok(()) => {
                    debug!("row {}: applied {:?}", row.line, record);
                    summary.applied += 1;
                }
                Err(e) => {
                    report_rejection(&record, &e);
                    summary.rejected += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Applies a single record on top of the current state.
    ///
    /// The client's account is created first, so a rejected record still
    /// leaves a zeroed account behind. Balances are never partially updated.
    pub fn apply(&mut self, record: &Record) -> std::result::Result<(), Rejection> {
        self.ledger.get_or_create(record.client());

        match *record {
            Record::Deposit { client, tx, amount } => self.deposit(client, tx, amount),
            Record::Withdrawal { client, tx, amount } => self.withdraw(client, tx, amount),
            Record::Dispute { client, tx } => self.dispute(client, tx),
            Record::Resolve { client, tx } => self.resolve(client, tx),
            Record::Chargeback { client, tx } => self.chargeback(client, tx),
        }
    }

    fn deposit(
        &mut self,
        client: ClientId,
        tx: TxId,
        amount: Decimal4,
    ) -> std::result::Result<(), Rejection> {
        self.ensure_new(tx, amount)?;
        self.ledger.get_or_create(client).deposit(amount)?;
        self.register(tx, client, TxKind::Deposit, amount)
    }

    fn withdraw(
        &mut self,
        client: ClientId,
        tx: TxId,
        amount: Decimal4,
    ) -> std::result::Result<(), Rejection> {
        self.ensure_new(tx, amount)?;
        self.ledger.get_or_create(client).withdraw(amount)?;
        self.register(tx, client, TxKind::Withdrawal, amount)
    }

    /// Only deposits can be disputed: their amount moves from available to held.
    fn dispute(&mut self, client: ClientId, tx: TxId) -> std::result::Result<(), Rejection> {
        let meta = self.referenced(client, tx)?;
        if meta.kind != TxKind::Deposit {
            return Err(Rejection::NotDisputable);
        }
        ensure_transition(&meta, DisputeState::Disputed)?;

        self.ledger.get_or_create(client).hold(meta.amount)?;
        self.registry.advance_state(tx, DisputeState::Disputed)
    }

    fn resolve(&mut self, client: ClientId, tx: TxId) -> std::result::Result<(), Rejection> {
        let meta = self.referenced(client, tx)?;
        ensure_transition(&meta, DisputeState::Resolved)?;

        self.ledger.get_or_create(client).release(meta.amount)?;
        self.registry.advance_state(tx, DisputeState::Resolved)
    }

    fn chargeback(&mut self, client: ClientId, tx: TxId) -> std::result::Result<(), Rejection> {
        let meta = self.referenced(client, tx)?;
        ensure_transition(&meta, DisputeState::ChargedBack)?;

        self.ledger.get_or_create(client).chargeback(meta.amount)?;
        self.registry.advance_state(tx, DisputeState::ChargedBack)
    }

    fn ensure_new(&self, tx: TxId, amount: Decimal4) -> std::result::Result<(), Rejection> {
        if self.registry.contains(tx) {
            return Err(Rejection::DuplicateTx);
        }
        if amount.is_negative() {
            return Err(Rejection::NegativeAmount(amount));
        }
        Ok(())
    }

    fn register(
        &mut self,
        tx: TxId,
        client: ClientId,
        kind: TxKind,
        amount: Decimal4,
    ) -> std::result::Result<(), Rejection> {
        if self.registry.try_register(tx, client, kind, amount) {
            Ok(())
        } else {
            Err(Rejection::Invariant("transaction registered twice"))
        }
    }

    /// Looks up the transaction a dispute operation points at.
    fn referenced(
        &self,
        client: ClientId,
        tx: TxId,
    ) -> std::result::Result<TransactionMeta, Rejection> {
        let meta = self.registry.lookup(tx).ok_or(Rejection::UnknownTx)?;
        if meta.client != client {
            return Err(Rejection::ClientMismatch { owner: meta.client });
        }
        Ok(meta)
    }

    /// Writes final account states as CSV.
    ///
    /// Output is sorted by client ID in ascending order. The header is written
    /// even when there are no accounts.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);

        csv_writer.write_record(["client", "available", "held", "total", "locked"])?;
        for account in self.ledger.snapshot() {
            csv_writer.serialize(&account)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn ensure_transition(
    meta: &TransactionMeta,
    next: DisputeState,
) -> std::result::Result<(), Rejection> {
    if meta.state.can_advance_to(next) {
        Ok(())
    } else {
        Err(Rejection::InvalidTransition {
            from: meta.state,
            to: next,
        })
    }
}

fn report_rejection(record: &Record, rejection: &Rejection) {
    let amount = record
        .amount()
        .map(|amount| format!(" of {}", amount))
        .unwrap_or_default();
    let message = format!(
        "tx_id {}, client_id {}, failed to apply {}{}: {}",
        record.tx(),
        record.client(),
        record.type_name(),
        amount,
        rejection
    );

    match rejection {
        Rejection::Invariant(_) => error!("{}", message),
        _ => warn!("{}", message),
    }
}

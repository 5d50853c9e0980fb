//! Error types for the ledger.
//!
//! [`EngineError`] is fatal and stops the run. [`Rejection`] describes why a
//! single record was discarded; it never escapes the record being processed.

use crate::decimal::Decimal4;
use crate::transaction::{ClientId, DisputeState};
use thiserror::Error;

/// Result type alias for fatal engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that end the run.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error that prevents reading further input or writing output
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Why a row could not be turned into a [`Record`](crate::transaction::Record).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("malformed row: {0}")]
    Malformed(String),

    #[error("expected at most {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("missing {0} field")]
    MissingField(&'static str),

    #[error("unknown record type '{0}'")]
    UnknownType(String),

    #[error("invalid client id '{0}'")]
    InvalidClient(String),

    #[error("invalid tx id '{0}'")]
    InvalidTx(String),

    #[error("{0} requires an amount")]
    MissingAmount(&'static str),

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
}

/// Why a record was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("duplicates existing tx_id")]
    DuplicateTx,

    #[error("tx not found")]
    UnknownTx,

    #[error("tx belongs to client_id {owner}")]
    ClientMismatch { owner: ClientId },

    #[error("tx is not a deposit")]
    NotDisputable,

    #[error("tx is {from}, cannot become {to}")]
    InvalidTransition { from: DisputeState, to: DisputeState },

    #[error("nsf: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal4,
        requested: Decimal4,
    },

    #[error("amount {0} is negative")]
    NegativeAmount(Decimal4),

    #[error("balance overflow")]
    Overflow,

    /// Bookkeeping went wrong inside the engine; input validation should make this unreachable.
    #[error("ledger invariant violated: {0}")]
    Invariant(&'static str),
}

//! CSV input: header-driven column mapping and row normalization.
//!
//! The first row is inspected once. If any of its cells names a known field
//! (`type`, `client`, `tx`, `amount`) it is taken as the header and defines
//! which column holds which field; otherwise the default order
//! `type, client, tx, amount` is assumed and the row is processed as data.

use crate::decimal::Decimal4;
use crate::error::{NormalizeError, Result};
use crate::transaction::{ClientId, Record, TxId};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use std::collections::HashSet;
use std::io::Read;
use std::str::FromStr;

/// Column index of each logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    kind: usize,
    client: usize,
    tx: usize,
    amount: usize,
    width: usize,
}

impl Default for FieldMap {
    fn default() -> Self {
        FieldMap {
            kind: 0,
            client: 1,
            tx: 2,
            amount: 3,
            width: 4,
        }
    }
}

impl FieldMap {
    /// Builds a mapping from a header row.
    ///
    /// Returns `None` if no cell names a known field. When a name appears more
    /// than once the last occurrence wins. Fields the header does not name
    /// keep their default position.
    pub fn from_header(row: &StringRecord) -> Option<FieldMap> {
        let mut fields = FieldMap {
            width: row.len(),
            ..FieldMap::default()
        };
        let mut recognized = false;

        for (idx, name) in row.iter().enumerate() {
            let slot = match name.trim().to_lowercase().as_str() {
                "type" => &mut fields.kind,
                "client" => &mut fields.client,
                "tx" => &mut fields.tx,
                "amount" => &mut fields.amount,
                _ => continue,
            };
            *slot = idx;
            recognized = true;
        }

        recognized.then_some(fields)
    }

    /// Turns one row into a typed record. Business rules are not checked here.
    pub fn normalize(&self, row: &StringRecord) -> std::result::Result<Record, NormalizeError> {
        if row.len() > self.width {
            return Err(NormalizeError::ColumnCount {
                expected: self.width,
                found: row.len(),
            });
        }

        let kind = RowType::from_str(field(row, self.kind, "type")?)?;

        let client_raw = field(row, self.client, "client")?;
        let client = client_raw
            .parse::<ClientId>()
            .map_err(|_| NormalizeError::InvalidClient(client_raw.to_string()))?;

        let tx_raw = field(row, self.tx, "tx")?;
        let tx = tx_raw
            .parse::<TxId>()
            .map_err(|_| NormalizeError::InvalidTx(tx_raw.to_string()))?;

        let record = match kind {
            RowType::Deposit => Record::Deposit {
                client,
                tx,
                amount: self.amount(row, "deposit")?,
            },
            RowType::Withdrawal => Record::Withdrawal {
                client,
                tx,
                amount: self.amount(row, "withdrawal")?,
            },
            RowType::Dispute => Record::Dispute { client, tx },
            RowType::Resolve => Record::Resolve { client, tx },
            RowType::Chargeback => Record::Chargeback { client, tx },
        };

        Ok(record)
    }

    fn amount(
        &self,
        row: &StringRecord,
        type_name: &'static str,
    ) -> std::result::Result<Decimal4, NormalizeError> {
        let raw = field(row, self.amount, "amount")
            .map_err(|_| NormalizeError::MissingAmount(type_name))?;
        Decimal4::from_str(raw).map_err(|_| NormalizeError::InvalidAmount(raw.to_string()))
    }
}

fn field<'r>(
    row: &'r StringRecord,
    idx: usize,
    name: &'static str,
) -> std::result::Result<&'r str, NormalizeError> {
    row.get(idx)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(NormalizeError::MissingField(name))
}

enum RowType {
    Deposit,
    Withdrawal,
    Dispute,
    Resolve,
    Chargeback,
}

impl FromStr for RowType {
    type Err = NormalizeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Ok(RowType::Deposit),
            "withdrawal" => Ok(RowType::Withdrawal),
            "dispute" => Ok(RowType::Dispute),
            "resolve" => Ok(RowType::Resolve),
            "chargeback" => Ok(RowType::Chargeback),
            other => Err(NormalizeError::UnknownType(other.to_string())),
        }
    }
}

/// One input row after normalization.
#[derive(Debug)]
pub struct InputRow {
    /// 1-indexed line in the input.
    pub line: u64,
    pub record: std::result::Result<Record, NormalizeError>,
}

/// Streams normalized rows from CSV input.
///
/// Yields `Err` only for I/O failures; everything else about a bad row is
/// reported through [`InputRow::record`].
pub struct RecordReader<R> {
    records: StringRecordsIntoIter<R>,
    fields: FieldMap,
    pending: Option<csv::Result<StringRecord>>,
    rows: u64,
}

impl<R: Read> RecordReader<R> {
    /// Reads the first row to resolve the column mapping.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut records = ReaderBuilder::new()
            .has_headers(false)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader)
            .into_records();

        let mut fields = FieldMap::default();
        let mut pending = None;
        let mut rows = 0;

        match records.next() {
            Some(Ok(first)) => match FieldMap::from_header(&first) {
                Some(header) => {
                    fields = header;
                    rows = 1;
                }
                None => pending = Some(Ok(first)),
            },
            Some(Err(e)) if e.is_io_error() => return Err(e.into()),
            Some(Err(e)) => pending = Some(Err(e)),
            None => {}
        }

        Ok(RecordReader {
            records,
            fields,
            pending,
            rows,
        })
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    fn normalize(&self, result: csv::Result<StringRecord>) -> Result<InputRow> {
        match result {
            Ok(row) => Ok(InputRow {
                line: row.position().map_or(self.rows, |p| p.line()),
                record: self.fields.normalize(&row),
            }),
            Err(e) if e.is_io_error() => Err(e.into()),
            Err(e) => Ok(InputRow {
                line: e.position().map_or(self.rows, |p| p.line()),
                record: Err(NormalizeError::Malformed(e.to_string())),
            }),
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<InputRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = match self.pending.take() {
            Some(result) => result,
            None => self.records.next()?,
        };
        self.rows += 1;
        Some(self.normalize(result))
    }
}

/// Collects the ids referenced by dispute, resolve and chargeback records.
///
/// Rows that fail to normalize are skipped silently; the processing pass
/// reports them.
pub fn referenced_tx_ids<R: Read>(reader: R) -> Result<HashSet<TxId>> {
    let mut referenced = HashSet::new();

    for row in RecordReader::from_reader(reader)? {
        if let Ok(record) = row?.record {
            if record.is_reference() {
                referenced.insert(record.tx());
            }
        }
    }

    Ok(referenced)
}

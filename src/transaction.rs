//! Record and transaction models.
//!
//! A [`Record`] is one normalized input row. Only deposits and withdrawals
//! become transactions; disputes, resolves and chargebacks are operations that
//! address an existing transaction by id.

use crate::decimal::Decimal4;
use std::fmt;

/// Client identifier.
pub type ClientId = u64;

/// Transaction identifier, unique across all clients.
pub type TxId = u64;

/// A normalized input record, carrying only the fields its kind needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Credit funds to the client's available balance.
    Deposit {
        client: ClientId,
        tx: TxId,
        amount: Decimal4,
    },

    /// Debit funds from the client's available balance.
    Withdrawal {
        client: ClientId,
        tx: TxId,
        amount: Decimal4,
    },

    /// Contest a prior deposit; its amount moves from available to held.
    Dispute { client: ClientId, tx: TxId },

    /// Release disputed funds back to available.
    Resolve { client: ClientId, tx: TxId },

    /// Remove disputed funds for good and lock the account.
    Chargeback { client: ClientId, tx: TxId },
}

impl Record {
    /// The client this record applies to.
    pub fn client(&self) -> ClientId {
        match self {
            Record::Deposit { client, .. }
            | Record::Withdrawal { client, .. }
            | Record::Dispute { client, .. }
            | Record::Resolve { client, .. }
            | Record::Chargeback { client, .. } => *client,
        }
    }

    /// The transaction id carried (or referenced) by this record.
    pub fn tx(&self) -> TxId {
        match self {
            Record::Deposit { tx, .. }
            | Record::Withdrawal { tx, .. }
            | Record::Dispute { tx, .. }
            | Record::Resolve { tx, .. }
            | Record::Chargeback { tx, .. } => *tx,
        }
    }

    /// The amount, for deposits and withdrawals.
    pub fn amount(&self) -> Option<Decimal4> {
        match self {
            Record::Deposit { amount, .. } | Record::Withdrawal { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    /// Lowercase record type, as written in the input.
    pub fn type_name(&self) -> &'static str {
        match self {
            Record::Deposit { .. } => "deposit",
            Record::Withdrawal { .. } => "withdrawal",
            Record::Dispute { .. } => "dispute",
            Record::Resolve { .. } => "resolve",
            Record::Chargeback { .. } => "chargeback",
        }
    }

    /// Returns `true` for records that reference an earlier transaction.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Record::Dispute { .. } | Record::Resolve { .. } | Record::Chargeback { .. }
        )
    }
}

/// Kind of a registered transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Deposit,
    Withdrawal,
}

/// Dispute lifecycle of a registered transaction.
///
/// `Normal -> Disputed -> {Resolved, ChargedBack}`. The last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisputeState {
    #[default]
    Normal,
    Disputed,
    Resolved,
    ChargedBack,
}

impl DisputeState {
    /// Returns `true` if moving from `self` to `next` is a forward transition.
    pub fn can_advance_to(self, next: DisputeState) -> bool {
        matches!(
            (self, next),
            (DisputeState::Normal, DisputeState::Disputed)
                | (DisputeState::Disputed, DisputeState::Resolved)
                | (DisputeState::Disputed, DisputeState::ChargedBack)
        )
    }
}

impl fmt::Display for DisputeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisputeState::Normal => "normal",
            DisputeState::Disputed => "disputed",
            DisputeState::Resolved => "resolved",
            DisputeState::ChargedBack => "charged back",
        };
        f.write_str(name)
    }
}

/// Registry entry for an accepted deposit or withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionMeta {
    /// Client who owns this transaction
    pub client: ClientId,

    pub kind: TxKind,

    /// Original transaction amount
    pub amount: Decimal4,

    pub state: DisputeState,
}

impl TransactionMeta {
    /// Creates an entry in the `Normal` state.
    pub fn new(client: ClientId, kind: TxKind, amount: Decimal4) -> Self {
        TransactionMeta {
            client,
            kind,
            amount,
            state: DisputeState::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_record_accessors() {
        let deposit = Record::Deposit {
            client: 3,
            tx: 40,
            amount: Decimal4::from_str("1.5").unwrap(),
        };
        assert_eq!(deposit.client(), 3);
        assert_eq!(deposit.tx(), 40);
        assert_eq!(deposit.amount().unwrap().to_string(), "1.5000");
        assert_eq!(deposit.type_name(), "deposit");
        assert!(!deposit.is_reference());

        let chargeback = Record::Chargeback { client: 9, tx: 1 };
        assert_eq!(chargeback.amount(), None);
        assert_eq!(chargeback.type_name(), "chargeback");
        assert!(chargeback.is_reference());
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(DisputeState::Normal.can_advance_to(DisputeState::Disputed));
        assert!(DisputeState::Disputed.can_advance_to(DisputeState::Resolved));
        assert!(DisputeState::Disputed.can_advance_to(DisputeState::ChargedBack));
    }

    #[test]
    fn test_skipping_or_reverting_is_not_allowed() {
        use DisputeState::*;

        assert!(!Normal.can_advance_to(Resolved));
        assert!(!Normal.can_advance_to(ChargedBack));
        assert!(!Disputed.can_advance_to(Normal));
        assert!(!Disputed.can_advance_to(Disputed));
        for terminal in [Resolved, ChargedBack] {
            for next in [Normal, Disputed, Resolved, ChargedBack] {
                assert!(!terminal.can_advance_to(next));
            }
        }
    }

    #[test]
    fn test_new_meta_starts_normal() {
        let meta = TransactionMeta::new(1, TxKind::Withdrawal, Decimal4::ZERO);
        assert_eq!(meta.state, DisputeState::Normal);
    }
}

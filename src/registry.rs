//! Transaction registry: every accepted deposit and withdrawal, by id.
//!
//! The registry is the only duplicate-id gate and the only source of the
//! metadata dispute operations need. Both implementations hold at least one
//! entry per accepted transaction for the whole run, so memory grows with the
//! number of distinct transaction ids in the input.
//!
//! - [`InMemoryRegistry`] keeps full [`TransactionMeta`] for every id.
//! - [`DisputeScopedRegistry`] is fed the ids that dispute, resolve and
//!   chargeback records reference (found by a first pass over the input). It
//!   keeps full metadata only for those and a bare id set for the rest.

use crate::decimal::Decimal4;
use crate::error::Rejection;
use crate::transaction::{ClientId, DisputeState, TransactionMeta, TxId, TxKind};
use std::collections::{HashMap, HashSet};

/// Storage behind the transaction engine.
pub trait TransactionRegistry {
    /// Registers a new transaction in the `Normal` state.
    ///
    /// Returns `false`, leaving the registry untouched, if `tx` is already known.
    fn try_register(
        &mut self,
        tx: TxId,
        client: ClientId,
        kind: TxKind,
        amount: Decimal4,
    ) -> bool;

    /// Returns `true` if `tx` was registered before.
    fn contains(&self, tx: TxId) -> bool;

    /// Metadata for `tx`, if it is a known transaction that can be referenced.
    fn lookup(&self, tx: TxId) -> Option<TransactionMeta>;

    /// Moves `tx` forward to `state`.
    fn advance_state(&mut self, tx: TxId, state: DisputeState) -> Result<(), Rejection>;

    /// Number of transaction ids retained.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn advance(meta: &mut TransactionMeta, state: DisputeState) -> Result<(), Rejection> {
    if !meta.state.can_advance_to(state) {
        return Err(Rejection::InvalidTransition {
            from: meta.state,
            to: state,
        });
    }
    meta.state = state;
    Ok(())
}

/// Keeps full metadata for every accepted transaction.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    transactions: HashMap<TxId, TransactionMeta>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        InMemoryRegistry {
            transactions: HashMap::new(),
        }
    }
}

impl TransactionRegistry for InMemoryRegistry {
    fn try_register(
        &mut self,
        tx: TxId,
        client: ClientId,
        kind: TxKind,
        amount: Decimal4,
    ) -> bool {
        if self.transactions.contains_key(&tx) {
            return false;
        }
        self.transactions
            .insert(tx, TransactionMeta::new(client, kind, amount));
        true
    }

    fn contains(&self, tx: TxId) -> bool {
        self.transactions.contains_key(&tx)
    }

    fn lookup(&self, tx: TxId) -> Option<TransactionMeta> {
        self.transactions.get(&tx).copied()
    }

    fn advance_state(&mut self, tx: TxId, state: DisputeState) -> Result<(), Rejection> {
        let meta = self
            .transactions
            .get_mut(&tx)
            .ok_or(Rejection::UnknownTx)?;
        advance(meta, state)
    }

    fn len(&self) -> usize {
        self.transactions.len()
    }
}

/// Keeps full metadata only for ids that some later record references.
///
/// Ids outside the referenced set are remembered for duplicate detection
/// only. `lookup` returns `None` for them, which is indistinguishable from
/// the retained registry as long as the referenced set came from the same input.
#[derive(Debug, Default)]
pub struct DisputeScopedRegistry {
    referenced: HashSet<TxId>,
    tracked: HashMap<TxId, TransactionMeta>,
    seen: HashSet<TxId>,
}

impl DisputeScopedRegistry {
    /// Creates a registry that tracks metadata for `referenced` ids only.
    pub fn new(referenced: HashSet<TxId>) -> Self {
        DisputeScopedRegistry {
            referenced,
            tracked: HashMap::new(),
            seen: HashSet::new(),
        }
    }

    /// Number of transactions whose full metadata is kept.
    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }
}

impl TransactionRegistry for DisputeScopedRegistry {
    fn try_register(
        &mut self,
        tx: TxId,
        client: ClientId,
        kind: TxKind,
        amount: Decimal4,
    ) -> bool {
        if self.contains(tx) {
            return false;
        }
        if self.referenced.contains(&tx) {
            self.tracked
                .insert(tx, TransactionMeta::new(client, kind, amount));
        } else {
            self.seen.insert(tx);
        }
        true
    }

    fn contains(&self, tx: TxId) -> bool {
        self.tracked.contains_key(&tx) || self.seen.contains(&tx)
    }

    fn lookup(&self, tx: TxId) -> Option<TransactionMeta> {
        self.tracked.get(&tx).copied()
    }

    fn advance_state(&mut self, tx: TxId, state: DisputeState) -> Result<(), Rejection> {
        let meta = self.tracked.get_mut(&tx).ok_or(Rejection::UnknownTx)?;
        advance(meta, state)
    }

    fn len(&self) -> usize {
        self.tracked.len() + self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal4 {
        Decimal4::from_str(s).unwrap()
    }

    #[test]
    fn test_register_rejects_duplicate_regardless_of_client_or_kind() {
        let mut registry = InMemoryRegistry::new();
        assert!(registry.try_register(1, 1, TxKind::Deposit, dec("10")));
        assert!(!registry.try_register(1, 2, TxKind::Withdrawal, dec("99")));

        let meta = registry.lookup(1).unwrap();
        assert_eq!(meta.client, 1);
        assert_eq!(meta.kind, TxKind::Deposit);
        assert_eq!(meta.amount, dec("10"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_advance_state_moves_forward_only() {
        let mut registry = InMemoryRegistry::new();
        registry.try_register(5, 1, TxKind::Deposit, dec("1"));

        assert_eq!(
            registry.advance_state(5, DisputeState::Resolved),
            Err(Rejection::InvalidTransition {
                from: DisputeState::Normal,
                to: DisputeState::Resolved,
            })
        );
        registry.advance_state(5, DisputeState::Disputed).unwrap();
        registry.advance_state(5, DisputeState::ChargedBack).unwrap();
        assert!(registry.advance_state(5, DisputeState::Disputed).is_err());
        assert_eq!(registry.lookup(5).unwrap().state, DisputeState::ChargedBack);
    }

    #[test]
    fn test_advance_unknown_tx() {
        let mut registry = InMemoryRegistry::new();
        assert_eq!(
            registry.advance_state(42, DisputeState::Disputed),
            Err(Rejection::UnknownTx)
        );
    }

    #[test]
    fn test_scoped_registry_tracks_only_referenced_ids() {
        let mut registry = DisputeScopedRegistry::new(HashSet::from([2]));
        assert!(registry.try_register(1, 1, TxKind::Deposit, dec("1")));
        assert!(registry.try_register(2, 1, TxKind::Deposit, dec("2")));

        assert!(registry.lookup(1).is_none());
        assert_eq!(registry.lookup(2).unwrap().amount, dec("2"));
        assert_eq!(registry.tracked_len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_scoped_registry_still_detects_duplicates() {
        let mut registry = DisputeScopedRegistry::new(HashSet::from([2]));
        registry.try_register(1, 1, TxKind::Deposit, dec("1"));
        registry.try_register(2, 1, TxKind::Withdrawal, dec("1"));

        assert!(registry.contains(1));
        assert!(!registry.try_register(1, 3, TxKind::Deposit, dec("5")));
        assert!(!registry.try_register(2, 3, TxKind::Deposit, dec("5")));
        assert!(!registry.contains(3));
    }

    #[test]
    fn test_scoped_registry_advances_tracked_ids() {
        let mut registry = DisputeScopedRegistry::new(HashSet::from([9]));
        registry.try_register(9, 4, TxKind::Deposit, dec("3"));

        registry.advance_state(9, DisputeState::Disputed).unwrap();
        assert_eq!(registry.lookup(9).unwrap().state, DisputeState::Disputed);
        assert_eq!(
            registry.advance_state(10, DisputeState::Disputed),
            Err(Rejection::UnknownTx)
        );
    }
}

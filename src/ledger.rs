//! Ledger store: the authoritative client to account mapping.

use crate::account::Account;
use crate::transaction::ClientId;
use std::collections::HashMap;

/// Owns every [`Account`] seen during a run.
///
/// Accounts are created lazily and never removed.
#[derive(Debug, Default)]
pub struct LedgerStore {
    accounts: HashMap<ClientId, Account>,
}

impl LedgerStore {
    pub fn new() -> Self {
        LedgerStore {
            accounts: HashMap::new(),
        }
    }

    /// Returns the account for `client`, creating a zeroed one if needed.
    pub fn get_or_create(&mut self, client: ClientId) -> &mut Account {
        self.accounts
            .entry(client)
            .or_insert_with(|| Account::new(client))
    }

    pub fn get(&self, client: ClientId) -> Option<&Account> {
        self.accounts.get(&client)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Every account, sorted by client id ascending for deterministic output.
    pub fn snapshot(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.values().cloned().collect();
        accounts.sort_by_key(|a| a.client());
        accounts
    }
}

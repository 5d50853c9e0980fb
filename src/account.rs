//! Client account model and balance mutation rules.
//!
//! `total` is stored and kept equal to `available + held` by every operation.
//! Each operation computes all new balances with checked arithmetic first and
//! only then assigns, so a failed operation leaves the account untouched.

use crate::decimal::Decimal4;
use crate::error::Rejection;
use crate::transaction::ClientId;
use serde::{Serialize, Serializer};

/// A client's account state.
///
/// # Locking
///
/// `locked` is set by a chargeback and never cleared. It is advisory state for
/// consumers of the summary: operations keep applying to a locked account.
///
/// # Negative Available Balance
///
/// `available` may become negative when a deposit is disputed after some or all
/// of it was withdrawn. `held` may never become negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    client: ClientId,
    available: Decimal4,
    held: Decimal4,
    total: Decimal4,
    locked: bool,
}

impl Account {
    /// Creates a new account for a client with zero balances.
    pub fn new(client: ClientId) -> Self {
        Account {
            client,
            available: Decimal4::ZERO,
            held: Decimal4::ZERO,
            total: Decimal4::ZERO,
            locked: false,
        }
    }

    pub fn client(&self) -> ClientId {
        self.client
    }

    /// Funds usable for withdrawal.
    pub fn available(&self) -> Decimal4 {
        self.available
    }

    /// Funds frozen by open disputes.
    pub fn held(&self) -> Decimal4 {
        self.held
    }

    /// `available + held`.
    pub fn total(&self) -> Decimal4 {
        self.total
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Credits `amount` to available funds.
    pub fn deposit(&mut self, amount: Decimal4) -> Result<(), Rejection> {
        let available = self
            .available
            .checked_add(amount)
            .ok_or(Rejection::Overflow)?;
        let total = self.total.checked_add(amount).ok_or(Rejection::Overflow)?;

        self.available = available;
        self.total = total;
        Ok(())
    }

    /// Debits `amount` from available funds.
    ///
    /// Fails with [`Rejection::InsufficientFunds`] if `available < amount`.
    pub fn withdraw(&mut self, amount: Decimal4) -> Result<(), Rejection> {
        if self.available < amount {
            return Err(Rejection::InsufficientFunds {
                available: self.available,
                requested: amount,
            });
        }
        let available = self
            .available
            .checked_sub(amount)
            .ok_or(Rejection::Overflow)?;
        let total = self.total.checked_sub(amount).ok_or(Rejection::Overflow)?;

        self.available = available;
        self.total = total;
        Ok(())
    }

    /// Moves `amount` from available to held. Total is unchanged.
    pub fn hold(&mut self, amount: Decimal4) -> Result<(), Rejection> {
        let available = self
            .available
            .checked_sub(amount)
            .ok_or(Rejection::Overflow)?;
        let held = self.held.checked_add(amount).ok_or(Rejection::Overflow)?;

        self.available = available;
        self.held = held;
        Ok(())
    }

    /// Moves `amount` from held back to available. Total is unchanged.
    pub fn release(&mut self, amount: Decimal4) -> Result<(), Rejection> {
        let held = self.reduced_held(amount)?;
        let available = self
            .available
            .checked_add(amount)
            .ok_or(Rejection::Overflow)?;

        self.held = held;
        self.available = available;
        Ok(())
    }

    /// Removes `amount` from held funds and locks the account.
    pub fn chargeback(&mut self, amount: Decimal4) -> Result<(), Rejection> {
        let held = self.reduced_held(amount)?;
        let total = self.total.checked_sub(amount).ok_or(Rejection::Overflow)?;

        self.held = held;
        self.total = total;
        self.locked = true;
        Ok(())
    }

    fn reduced_held(&self, amount: Decimal4) -> Result<Decimal4, Rejection> {
        if self.held < amount {
            return Err(Rejection::Invariant("held funds would become negative"));
        }
        self.held.checked_sub(amount).ok_or(Rejection::Overflow)
    }
}

#[derive(Serialize)]
struct AccountRow {
    client: ClientId,
    available: Decimal4,
    held: Decimal4,
    total: Decimal4,
    locked: bool,
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        AccountRow {
            client: self.client,
            available: self.available,
            held: self.held,
            total: self.total,
            locked: self.locked,
        }
        .serialize(serializer)
    }
}

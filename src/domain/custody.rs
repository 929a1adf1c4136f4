//! Stake custody collaborator.
//!
//! The ledger never moves tokens itself: joining debits the caller through
//! [`Custody`] and payouts credit it back. [`InMemoryCustody`] keeps plain
//! balances for development, tests and single-node deployments; a chain or
//! bank adapter implements the same trait.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use super::{Address, Amount};
use crate::error::LedgerError;

/// Balance bookkeeping owned outside the ledger.
pub trait Custody: Send + Sync + fmt::Debug {
    /// Returns the balance held for `account`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Internal`] if the backing store is unusable.
    fn balance_of(&self, account: &Address) -> Result<Amount, LedgerError>;

    /// Removes `amount` from `account`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientStake`] when the balance is short.
    fn debit(&self, account: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Adds `amount` to `account`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Internal`] on overflow or store failure.
    fn credit(&self, account: &Address, amount: Amount) -> Result<(), LedgerError>;
}

/// Process-local custody with a balance per address.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    balances: Mutex<HashMap<Address, Amount>>,
}

impl InMemoryCustody {
    /// Creates custody with no balances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Faucet deposit used by development tooling.
    ///
    /// # Errors
    ///
    /// Same as [`Custody::credit`].
    pub fn deposit(&self, account: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.credit(account, amount)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Address, Amount>>, LedgerError> {
        self.balances
            .lock()
            .map_err(|_| LedgerError::Internal("custody lock poisoned".to_string()))
    }
}

impl Custody for InMemoryCustody {
    fn balance_of(&self, account: &Address) -> Result<Amount, LedgerError> {
        Ok(self.lock()?.get(account).copied().unwrap_or_default())
    }

    fn debit(&self, account: &Address, amount: Amount) -> Result<(), LedgerError> {
        let mut balances = self.lock()?;
        let available = balances.get(account).copied().unwrap_or_default();
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientStake {
                required: amount,
                available,
            })?;
        balances.insert(*account, remaining);
        Ok(())
    }

    fn credit(&self, account: &Address, amount: Amount) -> Result<(), LedgerError> {
        let mut balances = self.lock()?;
        let current = balances.get(account).copied().unwrap_or_default();
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Internal(format!("balance overflow for {account}")))?;
        balances.insert(*account, updated);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        let mut bytes = [0u8; Address::LEN];
        if let Some(last) = bytes.last_mut() {
            *last = b;
        }
        Address::from_bytes(bytes)
    }

    #[test]
    fn unknown_account_has_zero_balance() {
        let custody = InMemoryCustody::new();
        assert_eq!(custody.balance_of(&addr(1)), Ok(Amount::ZERO));
    }

    #[test]
    fn debit_within_balance() {
        let custody = InMemoryCustody::new();
        let _ = custody.deposit(&addr(1), Amount::new(100));
        assert!(custody.debit(&addr(1), Amount::new(40)).is_ok());
        assert_eq!(custody.balance_of(&addr(1)), Ok(Amount::new(60)));
    }

    #[test]
    fn debit_beyond_balance_leaves_it_untouched() {
        let custody = InMemoryCustody::new();
        let _ = custody.deposit(&addr(1), Amount::new(5));
        let err = custody.debit(&addr(1), Amount::new(10));
        assert_eq!(
            err,
            Err(LedgerError::InsufficientStake {
                required: Amount::new(10),
                available: Amount::new(5),
            })
        );
        assert_eq!(custody.balance_of(&addr(1)), Ok(Amount::new(5)));
    }

    #[test]
    fn credit_overflow_is_rejected() {
        let custody = InMemoryCustody::new();
        let _ = custody.deposit(&addr(2), Amount::new(u128::MAX));
        assert!(custody.credit(&addr(2), Amount::new(1)).is_err());
    }
}

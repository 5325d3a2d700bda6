//! Token movement.

use std::collections::BTreeMap;

use crate::error::{LbpError, Result};

/// Balance keeper the engine moves tokens through.
///
/// `transfer` must either move the full amount or fail with
/// [`LbpError::InsufficientFunds`] and move nothing.
pub trait Ledger {
    fn balance(&self, address: &str, denom: &str) -> u128;

    fn transfer(&mut self, from: &str, to: &str, denom: &str, amount: u64) -> Result<()>;
}

/// Check that `from` can cover every `(denom, amount)` before any transfer
/// runs, so a multi-transfer operation never stops half way.
pub fn ensure_funds<L: Ledger + ?Sized>(ledger: &L, from: &str, needs: &[(&str, u64)]) -> Result<()> {
    let mut totals: BTreeMap<&str, u128> = BTreeMap::new();
    for (denom, amount) in needs {
        *totals.entry(*denom).or_default() += *amount as u128;
    }
    for (denom, required) in totals {
        let available = ledger.balance(from, denom);
        if available < required {
            return Err(LbpError::InsufficientFunds {
                address: from.to_string(),
                denom: denom.to_string(),
                available,
                required,
            });
        }
    }
    Ok(())
}

/// In-memory [`Ledger`].
#[derive(Debug, Clone, Default)]
pub struct MemLedger {
    balances: BTreeMap<(String, String), u128>,
}

impl MemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `denom` to `address` out of thin air.
    pub fn mint(&mut self, address: &str, denom: &str, amount: u128) {
        *self
            .balances
            .entry((address.to_string(), denom.to_string()))
            .or_default() += amount;
    }
}

impl Ledger for MemLedger {
    fn balance(&self, address: &str, denom: &str) -> u128 {
        self.balances
            .get(&(address.to_string(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, from: &str, to: &str, denom: &str, amount: u64) -> Result<()> {
        let amount = amount as u128;
        let available = self.balance(from, denom);
        if available < amount {
            return Err(LbpError::InsufficientFunds {
                address: from.to_string(),
                denom: denom.to_string(),
                available,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance(to, denom)
            .checked_add(amount)
            .ok_or(LbpError::MathOverflow)?;

        self.balances
            .insert((from.to_string(), denom.to_string()), available - amount);
        self.balances
            .insert((to.to_string(), denom.to_string()), to_balance);
        Ok(())
    }
}

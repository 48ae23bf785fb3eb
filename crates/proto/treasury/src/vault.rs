use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::TreasuryError;

/// Fungible balances held by an account, keyed by denomination.
///
/// All units of a denomination aggregate into one balance, so a deposit
/// followed by a withdrawal of the same amount nets to exactly the
/// starting state.
#[derive(Debug, Clone, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct Vault {
    balances: BTreeMap<String, u64>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, denom: &str) -> u64 {
        self.balances.get(denom).copied().unwrap_or(0)
    }

    pub fn denom_count(&self) -> usize {
        self.balances.len()
    }

    pub(crate) fn credit(&mut self, denom: &str, amount: u64) -> Result<(), TreasuryError> {
        let balance = self.balances.entry(denom.to_owned()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TreasuryError::BalanceOverflow {
                denom: denom.to_owned(),
            })?;
        Ok(())
    }

    pub(crate) fn debit(&mut self, denom: &str, amount: u64) -> Result<(), TreasuryError> {
        let have = self.balance(denom);
        if have < amount {
            return Err(TreasuryError::InsufficientFunds {
                denom: denom.to_owned(),
                have,
                need: amount,
            });
        }
        let remaining = have - amount;
        if remaining == 0 {
            self.balances.remove(denom);
        } else {
            self.balances.insert(denom.to_owned(), remaining);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_credit_debit() {
        let mut vault = Vault::new();
        vault.credit("iron", 100).unwrap();
        vault.credit("iron", 20).unwrap();
        assert_eq!(vault.balance("iron"), 120);

        vault.debit("iron", 120).unwrap();
        assert_eq!(vault.balance("iron"), 0);
        // Zeroed balances drop out of the map entirely.
        assert_eq!(vault.denom_count(), 0);
    }

    #[test]
    fn test_debit_insufficient() {
        let mut vault = Vault::new();
        vault.credit("iron", 10).unwrap();

        let err = vault.debit("iron", 11).unwrap_err();
        assert_eq!(
            err,
            TreasuryError::InsufficientFunds {
                denom: "iron".to_owned(),
                have: 10,
                need: 11,
            }
        );
    }

    #[test]
    fn test_credit_overflow() {
        let mut vault = Vault::new();
        vault.credit("iron", u64::MAX).unwrap();

        let err = vault.credit("iron", 1).unwrap_err();
        assert_eq!(
            err,
            TreasuryError::BalanceOverflow {
                denom: "iron".to_owned(),
            }
        );
    }

    proptest! {
        /// Join-then-split is the identity on a balance.
        #[test]
        fn prop_credit_then_debit_roundtrip(start in 0u64..1 << 40, moved in 0u64..1 << 40) {
            let mut vault = Vault::new();
            vault.credit("iron", start).unwrap();
            vault.credit("iron", moved).unwrap();
            vault.debit("iron", moved).unwrap();
            prop_assert_eq!(vault.balance("iron"), start);
        }
    }
}

use crate::core::currency::Currency;
use crate::core::party::PartyId;
use crate::exchange::transfer::{CurrencyTransfer, TransferError};
use crate::exchange::Transactional;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// In-memory balances, transfer authorizations and the coordinator's custody.
///
/// Stands in for real token contracts in tests, benchmarks and the CLI.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustody {
    balances: HashMap<PartyId, HashMap<Currency, Decimal>>,
    allowances: HashMap<PartyId, HashMap<Currency, Decimal>>,
    custody: HashMap<Currency, Decimal>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a party out of thin air.
    pub fn mint(&mut self, party: &PartyId, currency: &Currency, amount: Decimal) {
        *entry(&mut self.balances, party, currency) += amount;
    }

    /// Authorize the coordinator to collect up to `amount` from `party`.
    pub fn approve(&mut self, party: &PartyId, currency: &Currency, amount: Decimal) {
        *entry(&mut self.allowances, party, currency) = amount;
    }

    /// Seed the coordinator's own holdings, e.g. to back pool liquidity.
    pub fn fund_custody(&mut self, currency: &Currency, amount: Decimal) {
        *self.custody.entry(currency.clone()).or_insert(Decimal::ZERO) += amount;
    }

    pub fn balance(&self, party: &PartyId, currency: &Currency) -> Decimal {
        read(&self.balances, party, currency)
    }

    pub fn allowance(&self, party: &PartyId, currency: &Currency) -> Decimal {
        read(&self.allowances, party, currency)
    }

    pub fn custody_balance(&self, currency: &Currency) -> Decimal {
        self.custody.get(currency).copied().unwrap_or(Decimal::ZERO)
    }
}

fn entry<'m>(
    map: &'m mut HashMap<PartyId, HashMap<Currency, Decimal>>,
    party: &PartyId,
    currency: &Currency,
) -> &'m mut Decimal {
    map.entry(party.clone())
        .or_default()
        .entry(currency.clone())
        .or_insert(Decimal::ZERO)
}

fn read(
    map: &HashMap<PartyId, HashMap<Currency, Decimal>>,
    party: &PartyId,
    currency: &Currency,
) -> Decimal {
    map.get(party)
        .and_then(|m| m.get(currency))
        .copied()
        .unwrap_or(Decimal::ZERO)
}

impl Transactional for InMemoryCustody {
    type Checkpoint = InMemoryCustody;

    fn checkpoint(&self) -> Self::Checkpoint {
        self.clone()
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        *self = checkpoint;
    }
}

impl CurrencyTransfer for InMemoryCustody {
    fn collect(
        &mut self,
        currency: &Currency,
        from: &PartyId,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        let available = self.balance(from, currency);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                party: from.clone(),
                currency: currency.clone(),
                available,
                required: amount,
            });
        }
        if !currency.is_native() {
            let authorized = self.allowance(from, currency);
            if authorized < amount {
                return Err(TransferError::InsufficientAllowance {
                    party: from.clone(),
                    currency: currency.clone(),
                    authorized,
                    required: amount,
                });
            }
            *entry(&mut self.allowances, from, currency) -= amount;
        }
        *entry(&mut self.balances, from, currency) -= amount;
        self.fund_custody(currency, amount);
        debug!("collected {} {} from {}", amount, currency, from);
        Ok(())
    }

    fn pay(
        &mut self,
        currency: &Currency,
        to: &PartyId,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        let available = self.custody_balance(currency);
        if available < amount {
            return Err(TransferError::CustodyShortfall {
                currency: currency.clone(),
                available,
                required: amount,
            });
        }
        *self.custody.entry(currency.clone()).or_insert(Decimal::ZERO) -= amount;
        self.mint(to, currency, amount);
        debug!("paid {} {} to {}", amount, currency, to);
        Ok(())
    }
}

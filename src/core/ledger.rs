use crate::core::currency::Currency;
use crate::core::party::PartyId;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Transient signed debt/credit book of one routing session.
///
/// Each entry is keyed by (party, currency).
/// A positive entry means the coordinator owes the party.
/// A negative entry means the party owes the coordinator.
///
/// No tokens move here; the ledger only records who owes whom until the
/// session settles. Entries are remembered in the order they were first
/// touched so that an unsettled session reports a deterministic leg.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: HashMap<(PartyId, Currency), Decimal>,
    touched: Vec<(PartyId, Currency)>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the entry, creating it at zero if absent.
    ///
    /// Returns the entry's new value.
    pub fn adjust(&mut self, party: &PartyId, currency: &Currency, amount: Decimal) -> Decimal {
        let key = (party.clone(), currency.clone());
        if !self.entries.contains_key(&key) {
            self.touched.push(key.clone());
        }
        let entry = self.entries.entry(key).or_insert(Decimal::ZERO);
        *entry += amount;
        debug!("ledger {}:{} {:+} -> {}", party, currency, amount, entry);
        *entry
    }

    /// Current value of the entry; untouched entries read as zero.
    pub fn read(&self, party: &PartyId, currency: &Currency) -> Decimal {
        self.entries
            .get(&(party.clone(), currency.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Every entry touched so far, in first-touch order.
    pub fn entries(&self) -> impl Iterator<Item = (&PartyId, &Currency, Decimal)> + '_ {
        self.touched.iter().map(move |key| {
            let amount = self.entries.get(key).copied().unwrap_or(Decimal::ZERO);
            (&key.0, &key.1, amount)
        })
    }

    /// First touched entry that is not zero.
    pub fn first_unsettled(&self) -> Option<(&PartyId, &Currency, Decimal)> {
        self.entries().find(|(_, _, amount)| !amount.is_zero())
    }

    /// Whether every touched entry has returned to zero.
    pub fn is_settled(&self) -> bool {
        self.first_unsettled().is_none()
    }

    /// Number of entries currently not zero.
    pub fn open_entries(&self) -> usize {
        self.entries.values().filter(|v| !v.is_zero()).count()
    }

    /// Total the coordinator still owes across all entries.
    pub fn total_credit(&self) -> Decimal {
        self.entries.values().filter(|v| **v > Decimal::ZERO).sum()
    }

    /// Total still owed to the coordinator across all entries, as a positive number.
    pub fn total_debt(&self) -> Decimal {
        -self
            .entries
            .values()
            .filter(|v| **v < Decimal::ZERO)
            .sum::<Decimal>()
    }
}

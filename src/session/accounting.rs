use crate::core::currency::Currency;
use crate::core::ledger::Ledger;
use crate::core::party::PartyId;
use crate::core::pool::PoolKey;
use crate::exchange::adapter::{AmountSpecified, BalanceDelta, ExchangeAdapter};
use crate::routing::error::RouterError;
use crate::session::guard::SessionLock;
use log::{debug, info};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The atomic scope of one top-level routing call.
///
/// Owns the ledger for its lifetime. Every exchange and every settlement
/// leg goes through the session so the ledger sees all of them. A session
/// ends either through [`Session::close`], which fails unless the ledger is
/// flat, or through [`Session::abandon`] when the caller is discarding all
/// effects anyway.
#[derive(Debug)]
pub struct Session<'g> {
    id: Uuid,
    party: PartyId,
    ledger: Ledger,
    _lock: SessionLock<'g>,
}

impl<'g> Session<'g> {
    pub(crate) fn new(party: PartyId, lock: SessionLock<'g>) -> Self {
        let id = Uuid::new_v4();
        info!("session {} opened for {}", id, party);
        Self {
            id,
            party,
            ledger: Ledger::new(),
            _lock: lock,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn party(&self) -> &PartyId {
        &self.party
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The session party's entry for `currency`.
    pub fn delta(&self, currency: &Currency) -> Decimal {
        self.ledger.read(&self.party, currency)
    }

    /// Run one exchange and book both pool slots against the session party.
    pub fn exchange<E: ExchangeAdapter + ?Sized>(
        &mut self,
        adapter: &mut E,
        pool: &PoolKey,
        zero_for_one: bool,
        amount: AmountSpecified,
        hook_data: &[u8],
    ) -> Result<BalanceDelta, RouterError> {
        debug!(
            "session {} exchange on {} zero_for_one={} {}",
            self.id, pool, zero_for_one, amount
        );
        let delta = adapter.exchange(pool, zero_for_one, amount, hook_data)?;
        self.ledger.adjust(&self.party, pool.currency0(), delta.amount0);
        self.ledger.adjust(&self.party, pool.currency1(), delta.amount1);
        Ok(delta)
    }

    /// Book a payment of `amount` out of custody to the party.
    pub fn record_payment(&mut self, currency: &Currency, amount: Decimal) -> Decimal {
        self.ledger.adjust(&self.party, currency, -amount)
    }

    /// Book a collection of `amount` from the party into custody.
    pub fn record_collection(&mut self, currency: &Currency, amount: Decimal) -> Decimal {
        self.ledger.adjust(&self.party, currency, amount)
    }

    /// End the session, failing on the first entry that did not net to zero.
    pub fn close(self) -> Result<(), RouterError> {
        if let Some((party, currency, amount)) = self.ledger.first_unsettled() {
            return Err(RouterError::UnsettledDebt {
                party: party.clone(),
                currency: currency.clone(),
                amount,
            });
        }
        info!("session {} closed clean", self.id);
        Ok(())
    }

    /// End the session without checking the ledger.
    ///
    /// Only valid when the caller rolls back every effect of the session.
    pub fn abandon(self) {
        debug!(
            "session {} abandoned with {} open entries (credit {}, debt {})",
            self.id,
            self.ledger.open_entries(),
            self.ledger.total_credit(),
            self.ledger.total_debt()
        );
    }
}

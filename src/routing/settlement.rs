use crate::core::currency::Currency;
use crate::core::party::PartyId;
use crate::exchange::transfer::CurrencyTransfer;
use crate::routing::error::RouterError;
use crate::routing::path::ResolvedPath;
use crate::session::accounting::Session;
use log::{debug, info};
use rust_decimal::Decimal;

/// Native value sent along with a call and already held in custody.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallValue {
    supplied: Decimal,
    spent: Decimal,
}

impl CallValue {
    pub fn new(supplied: Decimal) -> Self {
        Self {
            supplied,
            spent: Decimal::ZERO,
        }
    }

    pub fn supplied(&self) -> Decimal {
        self.supplied
    }

    pub fn remaining(&self) -> Decimal {
        self.supplied - self.spent
    }

    fn spend(&mut self, amount: Decimal) -> Result<(), RouterError> {
        if amount > self.remaining() {
            return Err(RouterError::InsufficientValue {
                required: amount,
                supplied: self.supplied,
            });
        }
        self.spent += amount;
        Ok(())
    }
}

/// Nets a resolved route out against the caller with exactly two legs.
///
/// The input currency is collected from the payer and the output currency
/// is paid to the recipient. Intermediate currencies never move: the path
/// resolver already left them flat on the ledger.
pub struct SettlementEngine<'a, T: CurrencyTransfer + ?Sized> {
    transfers: &'a mut T,
}

impl<'a, T: CurrencyTransfer + ?Sized> SettlementEngine<'a, T> {
    pub fn new(transfers: &'a mut T) -> Self {
        Self { transfers }
    }

    pub fn settle(
        &mut self,
        session: &mut Session<'_>,
        resolved: &ResolvedPath,
        payer: &PartyId,
        recipient: &PartyId,
        value: &mut CallValue,
    ) -> Result<(), RouterError> {
        self.collect(
            session,
            &resolved.currency_in,
            payer,
            resolved.amount_in,
            value,
        )?;
        self.pay(session, &resolved.currency_out, recipient, resolved.amount_out)?;
        info!(
            "session {} settled: collected {} {} from {}, paid {} {} to {}",
            session.id(),
            resolved.amount_in,
            resolved.currency_in,
            payer,
            resolved.amount_out,
            resolved.currency_out,
            recipient
        );
        Ok(())
    }

    fn collect(
        &mut self,
        session: &mut Session<'_>,
        currency: &Currency,
        payer: &PartyId,
        amount: Decimal,
        value: &mut CallValue,
    ) -> Result<(), RouterError> {
        if currency.is_native() {
            value.spend(amount)?;
            debug!("collected {} native from call value", amount);
        } else {
            self.transfers.collect(currency, payer, amount)?;
        }
        session.record_collection(currency, amount);
        Ok(())
    }

    fn pay(
        &mut self,
        session: &mut Session<'_>,
        currency: &Currency,
        recipient: &PartyId,
        amount: Decimal,
    ) -> Result<(), RouterError> {
        self.transfers.pay(currency, recipient, amount)?;
        session.record_payment(currency, amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::path::SwapMode;
    use crate::session::guard::SessionGuard;
    use crate::simulation::custody::InMemoryCustody;
    use rust_decimal_macros::dec;

    fn resolved(currency_in: Currency, amount_in: Decimal, amount_out: Decimal) -> ResolvedPath {
        ResolvedPath {
            mode: SwapMode::ExactInput,
            currency_in,
            amount_in,
            currency_out: Currency::token("USDC"),
            amount_out,
            hops: Vec::new(),
        }
    }

    #[test]
    fn test_settle_clears_both_legs() {
        let alice = PartyId::new("alice");
        let dai = Currency::token("DAI");
        let usdc = Currency::token("USDC");
        let mut custody = InMemoryCustody::new();
        custody.mint(&alice, &dai, dec!(1000));
        custody.approve(&alice, &dai, dec!(1000));
        custody.fund_custody(&usdc, dec!(1000));

        let guard = SessionGuard::new();
        let mut session = guard.open(alice.clone()).unwrap();
        // what the hops would have booked
        session.record_payment(&dai, dec!(100));
        session.record_collection(&usdc, dec!(99));

        let path = resolved(dai.clone(), dec!(100), dec!(99));
        SettlementEngine::new(&mut custody)
            .settle(&mut session, &path, &alice, &alice, &mut CallValue::default())
            .unwrap();
        session.close().unwrap();

        assert_eq!(custody.balance(&alice, &dai), dec!(900));
        assert_eq!(custody.balance(&alice, &usdc), dec!(99));
    }

    #[test]
    fn test_native_input_draws_on_call_value() {
        let alice = PartyId::new("alice");
        let mut custody = InMemoryCustody::new();
        custody.fund_custody(&Currency::token("USDC"), dec!(1000));

        let guard = SessionGuard::new();
        let mut session = guard.open(alice.clone()).unwrap();
        let mut value = CallValue::new(dec!(50));

        let path = resolved(Currency::Native, dec!(80), dec!(10));
        let err = SettlementEngine::new(&mut custody)
            .settle(&mut session, &path, &alice, &alice, &mut value)
            .unwrap_err();
        assert_eq!(
            err,
            RouterError::InsufficientValue {
                required: dec!(80),
                supplied: dec!(50),
            }
        );

        let mut value = CallValue::new(dec!(100));
        let path = resolved(Currency::Native, dec!(80), dec!(10));
        SettlementEngine::new(&mut custody)
            .settle(&mut session, &path, &alice, &alice, &mut value)
            .unwrap();
        assert_eq!(value.remaining(), dec!(20));
        session.abandon();
    }
}

use crate::core::currency::Currency;
use crate::core::party::PartyId;
use crate::exchange::Transactional;
use rust_decimal::Decimal;
use thiserror::Error;

/// Failures moving tokens in or out of the coordinator's custody.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("{party} holds {available} {currency}, needs {required}")]
    InsufficientBalance {
        party: PartyId,
        currency: Currency,
        available: Decimal,
        required: Decimal,
    },
    #[error("{party} authorized {authorized} {currency}, needs {required}")]
    InsufficientAllowance {
        party: PartyId,
        currency: Currency,
        authorized: Decimal,
        required: Decimal,
    },
    #[error("custody holds {available} {currency}, cannot pay {required}")]
    CustodyShortfall {
        currency: Currency,
        available: Decimal,
        required: Decimal,
    },
}

/// Token movement between parties and the coordinator's custody.
///
/// Native-asset aware: collecting the native currency consumes call value
/// and needs no prior authorization.
pub trait CurrencyTransfer: Transactional {
    /// Move `amount` of `currency` from `from` into custody.
    fn collect(
        &mut self,
        currency: &Currency,
        from: &PartyId,
        amount: Decimal,
    ) -> Result<(), TransferError>;

    /// Move `amount` of `currency` out of custody to `to`.
    fn pay(&mut self, currency: &Currency, to: &PartyId, amount: Decimal)
        -> Result<(), TransferError>;
}

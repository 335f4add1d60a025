use crate::core::currency::Currency;
use crate::core::pool::{HookId, PoolId, PoolKey};
use crate::exchange::Transactional;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Trade intent for a single pool exchange.
///
/// The external protocol encodes intent in the sign of one amount field:
/// negative for an exact input, positive for an exact output. Routing code
/// works with the named variants and only converts at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountSpecified {
    /// Exactly this much of the source currency is given.
    ExactIn(Decimal),
    /// Exactly this much of the destination currency must be received.
    ExactOut(Decimal),
}

impl AmountSpecified {
    /// Signed wire form of the amount.
    pub fn to_signed(self) -> Decimal {
        match self {
            Self::ExactIn(amount) => -amount,
            Self::ExactOut(amount) => amount,
        }
    }

    /// Decode the signed wire form. Zero decodes as an exact input of zero.
    pub fn from_signed(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Self::ExactOut(amount)
        } else {
            Self::ExactIn(-amount)
        }
    }

    pub fn amount(self) -> Decimal {
        match self {
            Self::ExactIn(amount) | Self::ExactOut(amount) => amount,
        }
    }

    pub fn is_exact_in(self) -> bool {
        matches!(self, Self::ExactIn(_))
    }
}

impl fmt::Display for AmountSpecified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactIn(amount) => write!(f, "exact-in {}", amount),
            Self::ExactOut(amount) => write!(f, "exact-out {}", amount),
        }
    }
}

/// Signed balance change of one exchange, per pool slot.
///
/// Negative: the session now owes the pool that amount.
/// Positive: the pool now owes the session that amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub amount0: Decimal,
    pub amount1: Decimal,
}

impl BalanceDelta {
    pub fn new(amount0: Decimal, amount1: Decimal) -> Self {
        Self { amount0, amount1 }
    }

    /// The delta of `currency` within `pool`, zero if the pool does not hold it.
    pub fn for_currency(&self, pool: &PoolKey, currency: &Currency) -> Decimal {
        if pool.currency0() == currency {
            self.amount0
        } else if pool.currency1() == currency {
            self.amount1
        } else {
            Decimal::ZERO
        }
    }
}

/// Failures reported by a pool exchange. Routing propagates them unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("pool {0} is not initialized")]
    PoolNotFound(PoolId),
    #[error("pool {pool} cannot deliver {requested} {currency}")]
    InsufficientLiquidity {
        pool: PoolId,
        currency: Currency,
        requested: Decimal,
    },
    #[error("arithmetic overflow while pricing pool {0}")]
    Overflow(PoolId),
    #[error("hook {hooks} rejected the exchange: {reason}")]
    HookRejected { hooks: HookId, reason: String },
    #[error("pool {pool} returned delta {delta} for {currency} with the wrong sign")]
    InconsistentDelta {
        pool: PoolId,
        currency: Currency,
        delta: Decimal,
    },
}

/// The pairwise exchange primitive routing is built on.
///
/// Implementations own pool pricing and liquidity; they never touch the
/// session ledger themselves. The session applies the returned delta to
/// its ledger as part of the same call.
pub trait ExchangeAdapter: Transactional {
    /// Execute one exchange against `pool`.
    ///
    /// `zero_for_one` trades slot A for slot B. The returned delta is signed
    /// per slot: negative amounts are owed to the pool, positive amounts are
    /// owed by it.
    fn exchange(
        &mut self,
        pool: &PoolKey,
        zero_for_one: bool,
        amount: AmountSpecified,
        hook_data: &[u8],
    ) -> Result<BalanceDelta, ExchangeError>;
}

use crate::core::currency::Currency;
use crate::core::party::PartyId;
use crate::exchange::adapter::ExchangeError;
use crate::exchange::transfer::TransferError;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Why a route was rejected before any exchange ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDefect {
    /// The hop list is empty.
    Empty,
    /// More hops than the router is configured to walk.
    TooManyHops { hops: usize, max: usize },
    /// Hop `index` trades a currency for itself.
    SameCurrency { index: usize, currency: Currency },
    /// A single-pool call named a pool whose slots are not strictly ordered.
    NonCanonicalPool,
}

impl fmt::Display for RouteDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "route has no hops"),
            Self::TooManyHops { hops, max } => {
                write!(f, "route has {} hops, limit is {}", hops, max)
            }
            Self::SameCurrency { index, currency } => {
                write!(f, "hop {} trades {} for itself", index, currency)
            }
            Self::NonCanonicalPool => write!(f, "pool currencies are not in slot order"),
        }
    }
}

/// Which slippage bound a realized amount violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slippage {
    /// Exact-input route realized less than the caller's minimum.
    TooLittleReceived { minimum: Decimal, received: Decimal },
    /// Exact-output route needs more than the caller's maximum.
    TooMuchRequested { maximum: Decimal, required: Decimal },
}

impl fmt::Display for Slippage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLittleReceived { minimum, received } => {
                write!(f, "received {} below minimum {}", received, minimum)
            }
            Self::TooMuchRequested { maximum, required } => {
                write!(f, "required {} above maximum {}", required, maximum)
            }
        }
    }
}

/// Errors aborting a routing call. Every variant means the call had no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("invalid route: {0}")]
    InvalidRoute(RouteDefect),
    #[error("invalid amount {amount}: amounts must be whole, non-negative units")]
    InvalidAmount { amount: Decimal },
    #[error("slippage exceeded: {0}")]
    SlippageExceeded(Slippage),
    #[error("session closed with {amount} {currency} unsettled for {party}")]
    UnsettledDebt {
        party: PartyId,
        currency: Currency,
        amount: Decimal,
    },
    #[error("a routing session is already open")]
    Reentrant,
    #[error("exchange failed: {0}")]
    AdapterFailure(#[from] ExchangeError),
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
    #[error("native input needs {required}, call value was {supplied}")]
    InsufficientValue { required: Decimal, supplied: Decimal },
}

use crate::core::currency::Currency;
use crate::core::hop::Hop;
use crate::core::pool::PoolKey;
use crate::routing::error::{RouteDefect, RouterError};
use rust_decimal::Decimal;

/// Reject hop lists the resolver cannot walk.
///
/// `anchor` is the currency the walk starts from: the input currency of an
/// exact-input route, the final output currency of an exact-output route.
/// Both encodings chain the same way, each hop's currency sharing a pool
/// with the previous running currency.
pub fn validate_hops(anchor: &Currency, hops: &[Hop], max_hops: usize) -> Result<(), RouterError> {
    if hops.is_empty() {
        return Err(RouterError::InvalidRoute(RouteDefect::Empty));
    }
    if hops.len() > max_hops {
        return Err(RouterError::InvalidRoute(RouteDefect::TooManyHops {
            hops: hops.len(),
            max: max_hops,
        }));
    }
    let mut running = anchor;
    for (index, hop) in hops.iter().enumerate() {
        if hop.currency == *running {
            return Err(RouterError::InvalidRoute(RouteDefect::SameCurrency {
                index,
                currency: hop.currency.clone(),
            }));
        }
        running = &hop.currency;
    }
    Ok(())
}

/// Exact-output hops are written source-first and walked from the end.
pub fn validate_reverse_hops(
    final_currency: &Currency,
    hops: &[Hop],
    max_hops: usize,
) -> Result<(), RouterError> {
    if hops.is_empty() {
        return Err(RouterError::InvalidRoute(RouteDefect::Empty));
    }
    if hops.len() > max_hops {
        return Err(RouterError::InvalidRoute(RouteDefect::TooManyHops {
            hops: hops.len(),
            max: max_hops,
        }));
    }
    let mut running = final_currency;
    for (index, hop) in hops.iter().enumerate().rev() {
        if hop.currency == *running {
            return Err(RouterError::InvalidRoute(RouteDefect::SameCurrency {
                index,
                currency: hop.currency.clone(),
            }));
        }
        running = &hop.currency;
    }
    Ok(())
}

pub fn validate_pool(pool: &PoolKey) -> Result<(), RouterError> {
    if pool.is_canonical() {
        Ok(())
    } else {
        Err(RouterError::InvalidRoute(RouteDefect::NonCanonicalPool))
    }
}

/// Amounts the caller fixes exactly must be whole and strictly positive.
pub fn validate_exact_amount(amount: Decimal) -> Result<(), RouterError> {
    if amount <= Decimal::ZERO || amount.fract() != Decimal::ZERO {
        return Err(RouterError::InvalidAmount { amount });
    }
    Ok(())
}

/// Slippage bounds and call value may be zero but must be whole.
pub fn validate_bound(amount: Decimal) -> Result<(), RouterError> {
    if amount < Decimal::ZERO || amount.fract() != Decimal::ZERO {
        return Err(RouterError::InvalidAmount { amount });
    }
    Ok(())
}

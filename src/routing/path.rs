//! Path resolution: walking a route hop by hop through the exchange adapter.
//!
//! Exact-input routes are walked forwards from the known input amount;
//! exact-output routes are walked backwards from the known output amount.
//! Each hop books its deltas on the session ledger, so after a successful
//! walk every intermediate currency is already flat and only the route's
//! input debt and output credit remain.

use crate::core::currency::Currency;
use crate::core::hop::Hop;
use crate::core::pool::{PoolId, PoolKey};
use crate::exchange::adapter::{AmountSpecified, ExchangeAdapter, ExchangeError};
use crate::routing::error::{RouterError, Slippage};
use crate::session::accounting::Session;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the route the caller fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapMode {
    ExactInput,
    ExactOutput,
}

impl fmt::Display for SwapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactInput => write!(f, "exact-input"),
            Self::ExactOutput => write!(f, "exact-output"),
        }
    }
}

/// Realized amounts of one exchange within a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopExecution {
    pub pool: PoolId,
    pub zero_for_one: bool,
    pub currency_in: Currency,
    pub currency_out: Currency,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
}

/// Outcome of walking a route: what the caller owes and is owed.
///
/// `hops` is always in route order (input side first), also for
/// exact-output routes that were walked backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPath {
    pub mode: SwapMode,
    pub currency_in: Currency,
    pub amount_in: Decimal,
    pub currency_out: Currency,
    pub amount_out: Decimal,
    pub hops: Vec<HopExecution>,
}

impl ResolvedPath {
    /// Inclusive lower bound on the realized output.
    pub fn ensure_min_out(&self, minimum: Decimal) -> Result<(), RouterError> {
        if self.amount_out < minimum {
            return Err(RouterError::SlippageExceeded(Slippage::TooLittleReceived {
                minimum,
                received: self.amount_out,
            }));
        }
        Ok(())
    }

    /// Inclusive upper bound on the realized input.
    pub fn ensure_max_in(&self, maximum: Decimal) -> Result<(), RouterError> {
        if self.amount_in > maximum {
            return Err(RouterError::SlippageExceeded(Slippage::TooMuchRequested {
                maximum,
                required: self.amount_in,
            }));
        }
        Ok(())
    }
}

/// Walks routes against one exchange adapter.
pub struct PathResolver<'a, E: ExchangeAdapter + ?Sized> {
    adapter: &'a mut E,
}

impl<'a, E: ExchangeAdapter + ?Sized> PathResolver<'a, E> {
    pub fn new(adapter: &'a mut E) -> Self {
        Self { adapter }
    }

    /// Forward walk: spend exactly `amount_in` of `start`, each hop's output
    /// becoming the next hop's exact input.
    pub fn exact_input(
        &mut self,
        session: &mut Session<'_>,
        start: &Currency,
        hops: &[Hop],
        amount_in: Decimal,
    ) -> Result<ResolvedPath, RouterError> {
        let mut current_currency = start.clone();
        let mut current_amount = amount_in;
        let mut executions = Vec::with_capacity(hops.len());

        for hop in hops {
            let (pool, zero_for_one) = hop.pool_and_direction(&current_currency);
            let execution = self.step(
                session,
                &pool,
                zero_for_one,
                AmountSpecified::ExactIn(current_amount),
                &hop.hook_data,
            )?;
            current_amount = execution.amount_out;
            current_currency = hop.currency.clone();
            executions.push(execution);
        }

        Ok(ResolvedPath {
            mode: SwapMode::ExactInput,
            currency_in: start.clone(),
            amount_in: first_input(&executions, amount_in),
            currency_out: current_currency,
            amount_out: current_amount,
            hops: executions,
        })
    }

    /// Backward walk: receive exactly `amount_out` of `final_currency`, each
    /// hop's required input becoming the previous hop's exact output.
    ///
    /// `hops[i].currency` is the source currency of hop `i`, so the route's
    /// input currency is `hops[0].currency`.
    pub fn exact_output(
        &mut self,
        session: &mut Session<'_>,
        final_currency: &Currency,
        hops: &[Hop],
        amount_out: Decimal,
    ) -> Result<ResolvedPath, RouterError> {
        let mut current_currency = final_currency.clone();
        let mut current_amount = amount_out;
        let mut executions = Vec::with_capacity(hops.len());

        for hop in hops.iter().rev() {
            let (pool, out_is_zero) = hop.pool_and_direction(&current_currency);
            let execution = self.step(
                session,
                &pool,
                !out_is_zero,
                AmountSpecified::ExactOut(current_amount),
                &hop.hook_data,
            )?;
            current_amount = execution.amount_in;
            current_currency = hop.currency.clone();
            executions.push(execution);
        }
        executions.reverse();

        let realized_out = executions
            .last()
            .map(|e| e.amount_out)
            .unwrap_or(amount_out);
        Ok(ResolvedPath {
            mode: SwapMode::ExactOutput,
            currency_in: current_currency,
            amount_in: current_amount,
            currency_out: final_currency.clone(),
            amount_out: realized_out,
            hops: executions,
        })
    }

    /// One exchange on a caller-named pool, spending exactly `amount_in`.
    pub fn exact_input_single(
        &mut self,
        session: &mut Session<'_>,
        pool: &PoolKey,
        zero_for_one: bool,
        amount_in: Decimal,
        hook_data: &[u8],
    ) -> Result<ResolvedPath, RouterError> {
        let execution = self.step(
            session,
            pool,
            zero_for_one,
            AmountSpecified::ExactIn(amount_in),
            hook_data,
        )?;
        Ok(single(SwapMode::ExactInput, execution))
    }

    /// One exchange on a caller-named pool, receiving exactly `amount_out`.
    pub fn exact_output_single(
        &mut self,
        session: &mut Session<'_>,
        pool: &PoolKey,
        zero_for_one: bool,
        amount_out: Decimal,
        hook_data: &[u8],
    ) -> Result<ResolvedPath, RouterError> {
        let execution = self.step(
            session,
            pool,
            zero_for_one,
            AmountSpecified::ExactOut(amount_out),
            hook_data,
        )?;
        Ok(single(SwapMode::ExactOutput, execution))
    }

    fn step(
        &mut self,
        session: &mut Session<'_>,
        pool: &PoolKey,
        zero_for_one: bool,
        amount: AmountSpecified,
        hook_data: &[u8],
    ) -> Result<HopExecution, RouterError> {
        let delta = session.exchange(&mut *self.adapter, pool, zero_for_one, amount, hook_data)?;
        let (currency_in, currency_out) = pool.currencies_for(zero_for_one);

        // The source slot must be owed to the pool and the destination slot
        // owed by it; anything else cannot be threaded into the next hop.
        let owed = delta.for_currency(pool, currency_in);
        if owed > Decimal::ZERO {
            return Err(inconsistent(pool, currency_in, owed));
        }
        let received = delta.for_currency(pool, currency_out);
        if received < Decimal::ZERO {
            return Err(inconsistent(pool, currency_out, received));
        }

        debug!(
            "hop {}: {} {} -> {} {}",
            pool,
            -owed,
            currency_in,
            received,
            currency_out
        );
        Ok(HopExecution {
            pool: pool.id(),
            zero_for_one,
            currency_in: currency_in.clone(),
            currency_out: currency_out.clone(),
            amount_in: -owed,
            amount_out: received,
        })
    }
}

fn single(mode: SwapMode, execution: HopExecution) -> ResolvedPath {
    ResolvedPath {
        mode,
        currency_in: execution.currency_in.clone(),
        amount_in: execution.amount_in,
        currency_out: execution.currency_out.clone(),
        amount_out: execution.amount_out,
        hops: vec![execution],
    }
}

fn first_input(executions: &[HopExecution], fallback: Decimal) -> Decimal {
    executions.first().map(|e| e.amount_in).unwrap_or(fallback)
}

fn inconsistent(pool: &PoolKey, currency: &Currency, delta: Decimal) -> RouterError {
    RouterError::AdapterFailure(ExchangeError::InconsistentDelta {
        pool: pool.id(),
        currency: currency.clone(),
        delta,
    })
}

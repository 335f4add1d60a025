use crate::core::currency::Currency;
use crate::core::hop::Hop;
use crate::core::party::PartyId;
use crate::core::pool::PoolKey;
use crate::exchange::adapter::ExchangeAdapter;
use crate::exchange::transfer::CurrencyTransfer;
use crate::routing::error::RouterError;
use crate::routing::path::{HopExecution, PathResolver, ResolvedPath, SwapMode};
use crate::routing::request::{CallContext, SwapRequest};
use crate::routing::settlement::{CallValue, SettlementEngine};
use crate::routing::validation::validate_bound;
use crate::session::guard::SessionGuard;
use chrono::{DateTime, Utc};
use log::{info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Party that quote-only sessions are accounted under.
pub const QUOTER: &str = "quoter";

/// Router tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Longest route accepted.
    pub max_hops: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_hops: 8,
        }
    }
}

/// What a routing call realized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub session_id: Uuid,
    pub mode: SwapMode,
    pub currency_in: Currency,
    pub amount_in: Decimal,
    pub currency_out: Currency,
    pub amount_out: Decimal,
    pub hops: Vec<HopExecution>,
    /// Native call value returned to the caller.
    pub refunded: Decimal,
    pub executed_at: DateTime<Utc>,
}

impl SwapReceipt {
    fn new(session_id: Uuid, resolved: ResolvedPath, refunded: Decimal) -> Self {
        Self {
            session_id,
            mode: resolved.mode,
            currency_in: resolved.currency_in,
            amount_in: resolved.amount_in,
            currency_out: resolved.currency_out,
            amount_out: resolved.amount_out,
            hops: resolved.hops,
            refunded,
            executed_at: Utc::now(),
        }
    }

    /// Output units received per input unit spent.
    pub fn effective_price(&self) -> f64 {
        if self.amount_in.is_zero() {
            return 0.0;
        }
        let price = self.amount_out / self.amount_in;
        price.to_string().parse::<f64>().unwrap_or(0.0)
    }
}

impl std::fmt::Display for SwapReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Swap Receipt ===")?;
        writeln!(f, "Session:        {}", self.session_id)?;
        writeln!(f, "Mode:           {}", self.mode)?;
        writeln!(f, "In:             {} {}", self.amount_in, self.currency_in)?;
        writeln!(f, "Out:            {} {}", self.amount_out, self.currency_out)?;
        writeln!(f, "Price:          {:.6}", self.effective_price())?;
        if !self.refunded.is_zero() {
            writeln!(f, "Refunded:       {} {}", self.refunded, Currency::Native)?;
        }
        for (i, hop) in self.hops.iter().enumerate() {
            writeln!(
                f,
                "  Hop {}: {} {} -> {} {} via {}",
                i, hop.amount_in, hop.currency_in, hop.amount_out, hop.currency_out, hop.pool
            )?;
        }
        Ok(())
    }
}

/// Multi-hop router with flash accounting.
///
/// Each call opens one session, walks the route through the exchange
/// adapter, checks the caller's slippage bound, settles the net input and
/// output with exactly one collection and one payment, and closes the
/// session. Any failure rolls both collaborators back to the state they
/// had before the call.
///
/// # Examples
///
/// ```
/// use flash_router::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let (a, b) = (Currency::token("A"), Currency::token("B"));
/// let pool = PoolKey::new(a.clone(), b.clone(), 3000, 60, None);
///
/// let mut pools = InMemoryPoolManager::new();
/// pools.initialize(pool.clone(), dec!(1_000_000_000), dec!(1_000_000_000));
/// let mut custody = InMemoryCustody::new();
/// custody.fund_custody(&b, dec!(1_000_000_000));
/// let alice = PartyId::new("alice");
/// custody.mint(&alice, &a, dec!(1000));
/// custody.approve(&alice, &a, dec!(1000));
///
/// let mut router = Router::new(pools, custody);
/// let out = router
///     .exact_input_single(&CallContext::new(alice), &pool, true, dec!(1000), dec!(990), &[])
///     .unwrap();
/// assert!(out >= dec!(990) && out <= dec!(1000));
/// ```
pub struct Router<E, T> {
    exchange: E,
    transfers: T,
    guard: SessionGuard,
    config: RouterConfig,
}

impl<E, T> Router<E, T>
where
    E: ExchangeAdapter,
    T: CurrencyTransfer,
{
    pub fn new(exchange: E, transfers: T) -> Self {
        Self::with_config(exchange, transfers, RouterConfig::default())
    }

    pub fn with_config(exchange: E, transfers: T, config: RouterConfig) -> Self {
        Self {
            exchange,
            transfers,
            guard: SessionGuard::new(),
            config,
        }
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    pub fn exchange_mut(&mut self) -> &mut E {
        &mut self.exchange
    }

    pub fn transfers(&self) -> &T {
        &self.transfers
    }

    pub fn transfers_mut(&mut self) -> &mut T {
        &mut self.transfers
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    pub fn into_parts(self) -> (E, T) {
        (self.exchange, self.transfers)
    }

    /// Spend exactly `amount_in` on one pool; returns the output received.
    pub fn exact_input_single(
        &mut self,
        ctx: &CallContext,
        pool: &PoolKey,
        zero_for_one: bool,
        amount_in: Decimal,
        min_amount_out: Decimal,
        hook_data: &[u8],
    ) -> Result<Decimal, RouterError> {
        let request = SwapRequest::ExactInputSingle {
            pool: pool.clone(),
            zero_for_one,
            amount_in,
            min_amount_out,
            hook_data: hook_data.to_vec(),
        };
        self.execute(ctx, &request).map(|r| r.amount_out)
    }

    /// Receive exactly `amount_out` from one pool; returns the input spent.
    pub fn exact_output_single(
        &mut self,
        ctx: &CallContext,
        pool: &PoolKey,
        zero_for_one: bool,
        amount_out: Decimal,
        max_amount_in: Decimal,
        hook_data: &[u8],
    ) -> Result<Decimal, RouterError> {
        let request = SwapRequest::ExactOutputSingle {
            pool: pool.clone(),
            zero_for_one,
            amount_out,
            max_amount_in,
            hook_data: hook_data.to_vec(),
        };
        self.execute(ctx, &request).map(|r| r.amount_in)
    }

    /// Spend exactly `amount_in` of `currency_in` along `hops`; returns the
    /// output received.
    pub fn exact_input_path(
        &mut self,
        ctx: &CallContext,
        currency_in: &Currency,
        hops: &[Hop],
        amount_in: Decimal,
        min_amount_out: Decimal,
    ) -> Result<Decimal, RouterError> {
        let request = SwapRequest::ExactInput {
            currency_in: currency_in.clone(),
            hops: hops.to_vec(),
            amount_in,
            min_amount_out,
        };
        self.execute(ctx, &request).map(|r| r.amount_out)
    }

    /// Receive exactly `amount_out` of `currency_out`; `hops` name source
    /// currencies. Returns the input spent.
    pub fn exact_output_path(
        &mut self,
        ctx: &CallContext,
        currency_out: &Currency,
        hops: &[Hop],
        amount_out: Decimal,
        max_amount_in: Decimal,
    ) -> Result<Decimal, RouterError> {
        let request = SwapRequest::ExactOutput {
            currency_out: currency_out.clone(),
            hops: hops.to_vec(),
            amount_out,
            max_amount_in,
        };
        self.execute(ctx, &request).map(|r| r.amount_in)
    }

    /// Run any call shape to completion and return the full receipt.
    pub fn execute(
        &mut self,
        ctx: &CallContext,
        request: &SwapRequest,
    ) -> Result<SwapReceipt, RouterError> {
        request.validate(self.config.max_hops)?;
        validate_bound(ctx.value)?;

        let exchange_checkpoint = self.exchange.checkpoint();
        let transfer_checkpoint = self.transfers.checkpoint();
        match self.run_session(ctx, request) {
            Ok(receipt) => {
                info!(
                    "{} swap {} {} -> {} {} for {}",
                    receipt.mode,
                    receipt.amount_in,
                    receipt.currency_in,
                    receipt.amount_out,
                    receipt.currency_out,
                    ctx.caller
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!("rolling back {} call from {}: {}", request.mode(), ctx.caller, err);
                self.exchange.rollback(exchange_checkpoint);
                self.transfers.rollback(transfer_checkpoint);
                Err(err)
            }
        }
    }

    /// Resolve a request without settling it; pool state is left untouched.
    ///
    /// No slippage bound is applied and no tokens move.
    pub fn quote(&mut self, request: &SwapRequest) -> Result<SwapReceipt, RouterError> {
        request.validate(self.config.max_hops)?;

        let checkpoint = self.exchange.checkpoint();
        let outcome = self.quote_session(request);
        self.exchange.rollback(checkpoint);
        outcome
    }

    pub fn quote_exact_input_single(
        &mut self,
        pool: &PoolKey,
        zero_for_one: bool,
        amount_in: Decimal,
        hook_data: &[u8],
    ) -> Result<SwapReceipt, RouterError> {
        self.quote(&SwapRequest::ExactInputSingle {
            pool: pool.clone(),
            zero_for_one,
            amount_in,
            min_amount_out: Decimal::ZERO,
            hook_data: hook_data.to_vec(),
        })
    }

    pub fn quote_exact_output_single(
        &mut self,
        pool: &PoolKey,
        zero_for_one: bool,
        amount_out: Decimal,
        hook_data: &[u8],
    ) -> Result<SwapReceipt, RouterError> {
        self.quote(&SwapRequest::ExactOutputSingle {
            pool: pool.clone(),
            zero_for_one,
            amount_out,
            max_amount_in: Decimal::MAX,
            hook_data: hook_data.to_vec(),
        })
    }

    pub fn quote_exact_input_path(
        &mut self,
        currency_in: &Currency,
        hops: &[Hop],
        amount_in: Decimal,
    ) -> Result<SwapReceipt, RouterError> {
        self.quote(&SwapRequest::ExactInput {
            currency_in: currency_in.clone(),
            hops: hops.to_vec(),
            amount_in,
            min_amount_out: Decimal::ZERO,
        })
    }

    pub fn quote_exact_output_path(
        &mut self,
        currency_out: &Currency,
        hops: &[Hop],
        amount_out: Decimal,
    ) -> Result<SwapReceipt, RouterError> {
        self.quote(&SwapRequest::ExactOutput {
            currency_out: currency_out.clone(),
            hops: hops.to_vec(),
            amount_out,
            max_amount_in: Decimal::MAX,
        })
    }

    fn run_session(
        &mut self,
        ctx: &CallContext,
        request: &SwapRequest,
    ) -> Result<SwapReceipt, RouterError> {
        let Self {
            exchange,
            transfers,
            guard,
            ..
        } = self;

        let mut session = guard.open(ctx.caller.clone())?;
        let mut value = CallValue::new(ctx.value);
        if !ctx.value.is_zero() {
            transfers.collect(&Currency::Native, &ctx.caller, ctx.value)?;
        }

        let resolved = request.resolve(&mut PathResolver::new(exchange), &mut session)?;
        request.check_slippage(&resolved)?;

        SettlementEngine::new(transfers).settle(
            &mut session,
            &resolved,
            &ctx.caller,
            ctx.recipient(),
            &mut value,
        )?;
        let session_id = session.id();
        session.close()?;

        // unused call value always goes back to the caller
        let refunded = value.remaining();
        if !refunded.is_zero() {
            transfers.pay(&Currency::Native, &ctx.caller, refunded)?;
        }
        Ok(SwapReceipt::new(session_id, resolved, refunded))
    }

    fn quote_session(&mut self, request: &SwapRequest) -> Result<SwapReceipt, RouterError> {
        let Self {
            exchange, guard, ..
        } = self;

        let mut session = guard.open(PartyId::new(QUOTER))?;
        let session_id = session.id();
        let resolved = request.resolve(&mut PathResolver::new(exchange), &mut session);
        session.abandon();
        Ok(SwapReceipt::new(session_id, resolved?, Decimal::ZERO))
    }
}

use crate::core::currency::Currency;
use crate::core::hop::Hop;
use crate::core::party::PartyId;
use crate::core::pool::PoolKey;
use crate::exchange::adapter::ExchangeAdapter;
use crate::routing::error::RouterError;
use crate::routing::path::{PathResolver, ResolvedPath, SwapMode};
use crate::routing::validation::{
    validate_bound, validate_exact_amount, validate_hops, validate_pool, validate_reverse_hops,
};
use crate::session::accounting::Session;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Who is calling, who receives the output, and how much native value came
/// with the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: PartyId,
    #[serde(default)]
    pub recipient: Option<PartyId>,
    #[serde(default)]
    pub value: Decimal,
}

impl CallContext {
    pub fn new(caller: PartyId) -> Self {
        Self {
            caller,
            recipient: None,
            value: Decimal::ZERO,
        }
    }

    pub fn with_recipient(mut self, recipient: PartyId) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = value;
        self
    }

    /// Party the output is paid to.
    pub fn recipient(&self) -> &PartyId {
        self.recipient.as_ref().unwrap_or(&self.caller)
    }
}

/// One of the four call shapes the router accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwapRequest {
    ExactInputSingle {
        pool: PoolKey,
        zero_for_one: bool,
        amount_in: Decimal,
        #[serde(default)]
        min_amount_out: Decimal,
        #[serde(default)]
        hook_data: Vec<u8>,
    },
    ExactOutputSingle {
        pool: PoolKey,
        zero_for_one: bool,
        amount_out: Decimal,
        #[serde(default = "unbounded")]
        max_amount_in: Decimal,
        #[serde(default)]
        hook_data: Vec<u8>,
    },
    ExactInput {
        currency_in: Currency,
        hops: Vec<Hop>,
        amount_in: Decimal,
        #[serde(default)]
        min_amount_out: Decimal,
    },
    ExactOutput {
        currency_out: Currency,
        hops: Vec<Hop>,
        amount_out: Decimal,
        #[serde(default = "unbounded")]
        max_amount_in: Decimal,
    },
}

fn unbounded() -> Decimal {
    Decimal::MAX
}

impl SwapRequest {
    pub fn mode(&self) -> SwapMode {
        match self {
            Self::ExactInputSingle { .. } | Self::ExactInput { .. } => SwapMode::ExactInput,
            Self::ExactOutputSingle { .. } | Self::ExactOutput { .. } => SwapMode::ExactOutput,
        }
    }

    /// Reject malformed routes and amounts before any exchange runs.
    pub fn validate(&self, max_hops: usize) -> Result<(), RouterError> {
        match self {
            Self::ExactInputSingle {
                pool,
                amount_in,
                min_amount_out,
                ..
            } => {
                validate_pool(pool)?;
                validate_exact_amount(*amount_in)?;
                validate_bound(*min_amount_out)
            }
            Self::ExactOutputSingle {
                pool,
                amount_out,
                max_amount_in,
                ..
            } => {
                validate_pool(pool)?;
                validate_exact_amount(*amount_out)?;
                validate_bound(*max_amount_in)
            }
            Self::ExactInput {
                currency_in,
                hops,
                amount_in,
                min_amount_out,
            } => {
                validate_hops(currency_in, hops, max_hops)?;
                validate_exact_amount(*amount_in)?;
                validate_bound(*min_amount_out)
            }
            Self::ExactOutput {
                currency_out,
                hops,
                amount_out,
                max_amount_in,
            } => {
                validate_reverse_hops(currency_out, hops, max_hops)?;
                validate_exact_amount(*amount_out)?;
                validate_bound(*max_amount_in)
            }
        }
    }

    /// Walk the request's route inside `session`.
    pub fn resolve<E: ExchangeAdapter + ?Sized>(
        &self,
        resolver: &mut PathResolver<'_, E>,
        session: &mut Session<'_>,
    ) -> Result<ResolvedPath, RouterError> {
        match self {
            Self::ExactInputSingle {
                pool,
                zero_for_one,
                amount_in,
                hook_data,
                ..
            } => resolver.exact_input_single(session, pool, *zero_for_one, *amount_in, hook_data),
            Self::ExactOutputSingle {
                pool,
                zero_for_one,
                amount_out,
                hook_data,
                ..
            } => resolver.exact_output_single(session, pool, *zero_for_one, *amount_out, hook_data),
            Self::ExactInput {
                currency_in,
                hops,
                amount_in,
                ..
            } => resolver.exact_input(session, currency_in, hops, *amount_in),
            Self::ExactOutput {
                currency_out,
                hops,
                amount_out,
                ..
            } => resolver.exact_output(session, currency_out, hops, *amount_out),
        }
    }

    /// Apply the caller's slippage bound to a resolved route.
    pub fn check_slippage(&self, resolved: &ResolvedPath) -> Result<(), RouterError> {
        match self {
            Self::ExactInputSingle { min_amount_out, .. }
            | Self::ExactInput { min_amount_out, .. } => resolved.ensure_min_out(*min_amount_out),
            Self::ExactOutputSingle { max_amount_in, .. }
            | Self::ExactOutput { max_amount_in, .. } => resolved.ensure_max_in(*max_amount_in),
        }
    }
}

use crate::core::currency::Currency;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fee denominator: fees are expressed in hundredths of a basis point.
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Identity of an extension hook attached to a pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookId(String);

impl HookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical identity of a liquidity pool.
///
/// The two currencies are always stored in slot order
/// (`currency0 < currency1`); every trade direction is derived by comparing
/// the input currency against `currency0`.
///
/// # Examples
///
/// ```
/// use flash_router::core::currency::Currency;
/// use flash_router::core::pool::PoolKey;
///
/// let key = PoolKey::new(Currency::token("WETH"), Currency::token("USDC"), 3000, 60, None);
/// assert_eq!(key.currency0(), &Currency::token("USDC"));
/// assert!(!key.zero_for_one(&Currency::token("WETH")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    currency0: Currency,
    currency1: Currency,
    /// Fee tier in hundredths of a basis point.
    fee: u32,
    /// Price granularity of the pool.
    tick_spacing: i32,
    #[serde(default)]
    hooks: Option<HookId>,
}

impl PoolKey {
    /// Build a pool key, ordering the two currencies into their slots.
    pub fn new(
        a: Currency,
        b: Currency,
        fee: u32,
        tick_spacing: i32,
        hooks: Option<HookId>,
    ) -> Self {
        let (currency0, currency1) = Currency::sort_pair(a, b);
        Self {
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
        }
    }

    pub fn currency0(&self) -> &Currency {
        &self.currency0
    }

    pub fn currency1(&self) -> &Currency {
        &self.currency1
    }

    pub fn fee(&self) -> u32 {
        self.fee
    }

    pub fn tick_spacing(&self) -> i32 {
        self.tick_spacing
    }

    pub fn hooks(&self) -> Option<&HookId> {
        self.hooks.as_ref()
    }

    /// Whether the slots hold two distinct currencies in ascending order.
    ///
    /// Keys built through [`PoolKey::new`] are ordered, but keys arriving
    /// through deserialization are not normalized.
    pub fn is_canonical(&self) -> bool {
        self.currency0 < self.currency1
    }

    /// Trade direction when `currency_in` is the currency given to the pool.
    pub fn zero_for_one(&self, currency_in: &Currency) -> bool {
        *currency_in == self.currency0
    }

    /// Currencies (in, out) for a trade in the given direction.
    pub fn currencies_for(&self, zero_for_one: bool) -> (&Currency, &Currency) {
        if zero_for_one {
            (&self.currency0, &self.currency1)
        } else {
            (&self.currency1, &self.currency0)
        }
    }

    pub fn contains(&self, currency: &Currency) -> bool {
        self.currency0 == *currency || self.currency1 == *currency
    }

    pub fn id(&self) -> PoolId {
        PoolId(self.to_string())
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.currency0, self.currency1, self.fee, self.tick_spacing
        )?;
        if let Some(hooks) = &self.hooks {
            write!(f, "/{}", hooks)?;
        }
        Ok(())
    }
}

/// Stable printable identifier derived from a [`PoolKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(String);

impl PoolId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Constant-product reference pools implementing [`ExchangeAdapter`].
//!
//! Used by tests, benchmarks and the CLI. Pricing is `x * y = k` with the
//! fee taken from the input side. Every rounding favors the pool: outputs
//! round down and required inputs round up, so a forward quote fed back
//! into an exact-output exchange never asks for more than the original
//! input.

use crate::core::pool::{HookId, PoolId, PoolKey, FEE_DENOMINATOR};
use crate::exchange::adapter::{AmountSpecified, BalanceDelta, ExchangeAdapter, ExchangeError};
use crate::exchange::Transactional;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserves of one initialized pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub key: PoolKey,
    pub reserve0: Decimal,
    pub reserve1: Decimal,
}

impl PoolState {
    /// Spot price of slot A in units of slot B, ignoring fees.
    pub fn spot_price(&self) -> f64 {
        let price = self.reserve1 / self.reserve0;
        price.to_string().parse::<f64>().unwrap_or(0.0)
    }
}

/// Hook data a hooked pool received, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCall {
    pub pool: PoolId,
    pub hooks: HookId,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPoolManager {
    pools: HashMap<PoolId, PoolState>,
    blocked_hooks: HashMap<HookId, String>,
    hook_calls: Vec<HookCall>,
    exchange_count: usize,
}

impl InMemoryPoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or reset) a pool with the given reserves.
    ///
    /// # Panics
    ///
    /// Panics if the key is not canonical, a reserve is not positive or the
    /// fee is not below 100%.
    pub fn initialize(&mut self, key: PoolKey, reserve0: Decimal, reserve1: Decimal) {
        assert!(key.is_canonical(), "pool {} must hold two distinct currencies", key);
        assert!(
            reserve0 > Decimal::ZERO && reserve1 > Decimal::ZERO,
            "pool reserves must be positive, got {} / {}",
            reserve0,
            reserve1
        );
        assert!(key.fee() < FEE_DENOMINATOR, "pool fee must be below 100%");
        self.pools.insert(
            key.id(),
            PoolState {
                key,
                reserve0,
                reserve1,
            },
        );
    }

    pub fn pool(&self, key: &PoolKey) -> Option<&PoolState> {
        self.pools.get(&key.id())
    }

    pub fn pools(&self) -> impl Iterator<Item = &PoolState> {
        self.pools.values()
    }

    pub fn pool_keys(&self) -> Vec<PoolKey> {
        let mut keys: Vec<PoolKey> = self.pools.values().map(|p| p.key.clone()).collect();
        keys.sort_by_key(|k| k.id());
        keys
    }

    /// Make every exchange on pools carrying `hooks` fail with `reason`.
    pub fn block_hook(&mut self, hooks: HookId, reason: impl Into<String>) {
        self.blocked_hooks.insert(hooks, reason.into());
    }

    pub fn hook_calls(&self) -> &[HookCall] {
        &self.hook_calls
    }

    /// Number of exchanges executed (including ones later rolled back by a
    /// checkpoint taken before them).
    pub fn exchange_count(&self) -> usize {
        self.exchange_count
    }

    fn run_hook(&mut self, key: &PoolKey, hook_data: &[u8]) -> Result<(), ExchangeError> {
        let Some(hooks) = key.hooks() else {
            return Ok(());
        };
        if let Some(reason) = self.blocked_hooks.get(hooks) {
            return Err(ExchangeError::HookRejected {
                hooks: hooks.clone(),
                reason: reason.clone(),
            });
        }
        self.hook_calls.push(HookCall {
            pool: key.id(),
            hooks: hooks.clone(),
            data: hook_data.to_vec(),
        });
        Ok(())
    }
}

/// Output for an exact input: the fee is taken from the input and rounded
/// up, the output is rounded down.
pub fn amount_out(
    reserve_in: Decimal,
    reserve_out: Decimal,
    fee: u32,
    amount_in: Decimal,
) -> Option<Decimal> {
    let fee_amount = amount_in
        .checked_mul(Decimal::from(fee))?
        .checked_div(Decimal::from(FEE_DENOMINATOR))?
        .ceil();
    let effective_in = amount_in.checked_sub(fee_amount)?;
    let numerator = reserve_out.checked_mul(effective_in)?;
    let denominator = reserve_in.checked_add(effective_in)?;
    Some(numerator.checked_div(denominator)?.floor())
}

/// Input required for an exact output, rounded up before and after the
/// fee gross-up. `None` when the pool cannot deliver `amount_out`.
pub fn amount_in(
    reserve_in: Decimal,
    reserve_out: Decimal,
    fee: u32,
    amount_out: Decimal,
) -> Option<Decimal> {
    if amount_out >= reserve_out {
        return None;
    }
    let net = reserve_in
        .checked_mul(amount_out)?
        .checked_div(reserve_out - amount_out)?
        .ceil();
    let gross = net
        .checked_mul(Decimal::from(FEE_DENOMINATOR))?
        .checked_div(Decimal::from(FEE_DENOMINATOR - fee))?
        .ceil();
    Some(gross)
}

/// Pool reserves and the length of the hook trace at checkpoint time.
#[derive(Debug, Clone)]
pub struct PoolCheckpoint {
    pools: HashMap<PoolId, PoolState>,
    hook_calls: usize,
}

impl Transactional for InMemoryPoolManager {
    type Checkpoint = PoolCheckpoint;

    fn checkpoint(&self) -> Self::Checkpoint {
        PoolCheckpoint {
            pools: self.pools.clone(),
            hook_calls: self.hook_calls.len(),
        }
    }

    /// Restores reserves and drops hook calls made after the checkpoint.
    /// `exchange_count` is not rolled back.
    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        self.pools = checkpoint.pools;
        self.hook_calls.truncate(checkpoint.hook_calls);
    }
}

impl ExchangeAdapter for InMemoryPoolManager {
    fn exchange(
        &mut self,
        pool: &PoolKey,
        zero_for_one: bool,
        amount: AmountSpecified,
        hook_data: &[u8],
    ) -> Result<BalanceDelta, ExchangeError> {
        let id = pool.id();
        let state = self
            .pools
            .get(&id)
            .cloned()
            .ok_or_else(|| ExchangeError::PoolNotFound(id.clone()))?;
        self.run_hook(pool, hook_data)?;

        let (reserve_in, reserve_out) = if zero_for_one {
            (state.reserve0, state.reserve1)
        } else {
            (state.reserve1, state.reserve0)
        };
        let (_, currency_out) = pool.currencies_for(zero_for_one);

        let (paid_in, paid_out) = match amount {
            AmountSpecified::ExactIn(given) => {
                let out = amount_out(reserve_in, reserve_out, pool.fee(), given)
                    .ok_or_else(|| ExchangeError::Overflow(id.clone()))?;
                (given, out)
            }
            AmountSpecified::ExactOut(wanted) => {
                if wanted >= reserve_out {
                    return Err(ExchangeError::InsufficientLiquidity {
                        pool: id,
                        currency: currency_out.clone(),
                        requested: wanted,
                    });
                }
                let needed = amount_in(reserve_in, reserve_out, pool.fee(), wanted)
                    .ok_or_else(|| ExchangeError::Overflow(id.clone()))?;
                (needed, wanted)
            }
        };

        let new_in = reserve_in
            .checked_add(paid_in)
            .ok_or_else(|| ExchangeError::Overflow(id.clone()))?;
        let new_out = reserve_out - paid_out;
        let entry = self
            .pools
            .get_mut(&id)
            .ok_or_else(|| ExchangeError::PoolNotFound(id.clone()))?;
        if zero_for_one {
            entry.reserve0 = new_in;
            entry.reserve1 = new_out;
        } else {
            entry.reserve1 = new_in;
            entry.reserve0 = new_out;
        }
        self.exchange_count += 1;
        debug!("pool {} took {} gave {} ({})", id, paid_in, paid_out, amount);

        Ok(if zero_for_one {
            BalanceDelta::new(-paid_in, paid_out)
        } else {
            BalanceDelta::new(paid_out, -paid_in)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::Currency;
    use rust_decimal_macros::dec;

    fn key() -> PoolKey {
        PoolKey::new(Currency::token("A"), Currency::token("B"), 3000, 60, None)
    }

    #[test]
    fn test_exact_in_one_to_one_pool() {
        let mut pm = InMemoryPoolManager::new();
        pm.initialize(key(), dec!(1_000_000_000), dec!(1_000_000_000));

        let delta = pm
            .exchange(&key(), true, AmountSpecified::ExactIn(dec!(1000)), &[])
            .unwrap();
        // 1000 - 3 fee = 997 in, slightly less out
        assert_eq!(delta, BalanceDelta::new(dec!(-1000), dec!(996)));
        let state = pm.pool(&key()).unwrap();
        assert_eq!(state.reserve0, dec!(1_000_001_000));
        assert_eq!(state.reserve1, dec!(999_999_004));
    }

    #[test]
    fn test_exact_out_one_for_zero() {
        let mut pm = InMemoryPoolManager::new();
        pm.initialize(key(), dec!(1_000_000), dec!(1_000_000));

        let delta = pm
            .exchange(&key(), false, AmountSpecified::ExactOut(dec!(1000)), &[])
            .unwrap();
        assert_eq!(delta.amount0, dec!(1000));
        assert!(delta.amount1 < dec!(-1000));
    }

    #[test]
    fn test_exact_out_never_exceeds_forward_input() {
        let (r_in, r_out) = (dec!(5_000_000), dec!(7_000_000));
        for given in [dec!(1), dec!(999), dec!(123_457), dec!(2_000_000)] {
            let out = amount_out(r_in, r_out, 3000, given).unwrap();
            if out > Decimal::ZERO {
                let back = amount_in(r_in, r_out, 3000, out).unwrap();
                assert!(back <= given, "{} needs {} > {}", out, back, given);
            }
        }
    }

    #[test]
    fn test_unknown_pool() {
        let mut pm = InMemoryPoolManager::new();
        let err = pm
            .exchange(&key(), true, AmountSpecified::ExactIn(dec!(1)), &[])
            .unwrap_err();
        assert_eq!(err, ExchangeError::PoolNotFound(key().id()));
    }

    #[test]
    fn test_exact_out_beyond_reserves() {
        let mut pm = InMemoryPoolManager::new();
        pm.initialize(key(), dec!(100), dec!(100));
        let err = pm
            .exchange(&key(), true, AmountSpecified::ExactOut(dec!(100)), &[])
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InsufficientLiquidity { .. }));
    }

    #[test]
    fn test_hooks_see_data_and_can_reject() {
        let hooked = PoolKey::new(
            Currency::token("A"),
            Currency::token("B"),
            3000,
            60,
            Some(HookId::new("oracle")),
        );
        let mut pm = InMemoryPoolManager::new();
        pm.initialize(hooked.clone(), dec!(1000), dec!(1000));

        pm.exchange(&hooked, true, AmountSpecified::ExactIn(dec!(10)), b"ping")
            .unwrap();
        assert_eq!(pm.hook_calls()[0].data, b"ping".to_vec());

        pm.block_hook(HookId::new("oracle"), "paused");
        let err = pm
            .exchange(&hooked, true, AmountSpecified::ExactIn(dec!(10)), &[])
            .unwrap_err();
        assert!(matches!(err, ExchangeError::HookRejected { .. }));
    }

    #[test]
    fn test_rollback_drops_later_hook_calls() {
        let hooked = PoolKey::new(
            Currency::token("A"),
            Currency::token("B"),
            3000,
            60,
            Some(HookId::new("oracle")),
        );
        let mut pm = InMemoryPoolManager::new();
        pm.initialize(hooked.clone(), dec!(1000), dec!(1000));
        pm.exchange(&hooked, true, AmountSpecified::ExactIn(dec!(10)), b"kept")
            .unwrap();

        let checkpoint = pm.checkpoint();
        pm.exchange(&hooked, true, AmountSpecified::ExactIn(dec!(10)), b"undone")
            .unwrap();
        assert_eq!(pm.hook_calls().len(), 2);

        pm.rollback(checkpoint);
        assert_eq!(pm.hook_calls().len(), 1);
        assert_eq!(pm.hook_calls()[0].data, b"kept".to_vec());
        assert_eq!(pm.exchange_count(), 2);
    }

    #[test]
    fn test_spot_price() {
        let mut pm = InMemoryPoolManager::new();
        pm.initialize(key(), dec!(1000), dec!(2500));
        approx::assert_relative_eq!(pm.pool(&key()).unwrap().spot_price(), 2.5);
    }
}

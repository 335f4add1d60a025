//! Scenario files and random scenario generation.
//!
//! A scenario describes pools, funded accounts and optionally one swap
//! request; it builds a ready-to-use in-memory router. The CLI reads
//! scenarios from JSON and benchmarks generate them.

use crate::core::currency::Currency;
use crate::core::hop::Hop;
use crate::core::party::PartyId;
use crate::core::pool::{HookId, PoolKey};
use crate::routing::discovery::PoolGraph;
use crate::routing::request::{CallContext, SwapRequest};
use crate::routing::router::{Router, RouterConfig};
use crate::simulation::custody::InMemoryCustody;
use crate::simulation::pool_manager::InMemoryPoolManager;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// A pool and its starting reserves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSpec {
    pub currency0: Currency,
    pub currency1: Currency,
    pub fee: u32,
    pub tick_spacing: i32,
    #[serde(default)]
    pub hooks: Option<HookId>,
    pub reserve0: Decimal,
    pub reserve1: Decimal,
}

impl PoolSpec {
    pub fn key(&self) -> PoolKey {
        PoolKey::new(
            self.currency0.clone(),
            self.currency1.clone(),
            self.fee,
            self.tick_spacing,
            self.hooks.clone(),
        )
    }

    /// Reserves in slot order, whatever order the file listed them in.
    fn ordered_reserves(&self) -> (Decimal, Decimal) {
        if self.currency0 <= self.currency1 {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }
}

/// A funded account. The allowance defaults to the whole balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSpec {
    pub party: PartyId,
    pub currency: Currency,
    pub balance: Decimal,
    #[serde(default)]
    pub allowance: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub router: RouterConfig,
    pub pools: Vec<PoolSpec>,
    #[serde(default)]
    pub accounts: Vec<AccountSpec>,
    #[serde(default)]
    pub call: Option<CallContext>,
    #[serde(default)]
    pub swap: Option<SwapRequest>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.check()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check(&self) -> Result<(), ScenarioError> {
        for pool in &self.pools {
            if pool.currency0 == pool.currency1 {
                return Err(ScenarioError::Invalid(format!(
                    "pool pairs {} with itself",
                    pool.currency0
                )));
            }
            if pool.reserve0 <= Decimal::ZERO || pool.reserve1 <= Decimal::ZERO {
                return Err(ScenarioError::Invalid(format!(
                    "pool {} needs positive reserves",
                    pool.key()
                )));
            }
            if pool.fee >= crate::core::pool::FEE_DENOMINATOR {
                return Err(ScenarioError::Invalid(format!(
                    "pool {} fee must be below 100%",
                    pool.key()
                )));
            }
        }
        Ok(())
    }

    pub fn pool_keys(&self) -> Vec<PoolKey> {
        self.pools.iter().map(PoolSpec::key).collect()
    }

    pub fn pool_graph(&self) -> PoolGraph {
        PoolGraph::from_pools(&self.pool_keys())
    }

    /// Build a router whose custody backs every pool's reserves and whose
    /// accounts are funded as listed.
    pub fn build(&self) -> Router<InMemoryPoolManager, InMemoryCustody> {
        let mut pools = InMemoryPoolManager::new();
        let mut custody = InMemoryCustody::new();
        for spec in &self.pools {
            let key = spec.key();
            let (reserve0, reserve1) = spec.ordered_reserves();
            custody.fund_custody(key.currency0(), reserve0);
            custody.fund_custody(key.currency1(), reserve1);
            pools.initialize(key, reserve0, reserve1);
        }
        for account in &self.accounts {
            custody.mint(&account.party, &account.currency, account.balance);
            custody.approve(
                &account.party,
                &account.currency,
                account.allowance.unwrap_or(account.balance),
            );
        }
        Router::with_config(pools, custody, self.router.clone())
    }
}

/// Shape of a randomly generated scenario.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Currencies to connect; the first is the swap's input.
    pub currencies: Vec<Currency>,
    /// Extra pools beyond the chain that links every currency in order.
    pub extra_pools: usize,
    pub min_reserve: Decimal,
    pub max_reserve: Decimal,
    pub fee_tiers: Vec<u32>,
    /// Party funded with the input currency.
    pub caller: PartyId,
    pub amount_in: Decimal,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            currencies: ["A", "B", "C", "D"].iter().map(|c| Currency::token(*c)).collect(),
            extra_pools: 2,
            min_reserve: Decimal::from(1_000_000),
            max_reserve: Decimal::from(100_000_000),
            fee_tiers: vec![100, 500, 3000, 10_000],
            caller: PartyId::new("trader"),
            amount_in: Decimal::from(10_000),
        }
    }
}

fn tick_spacing_for(fee: u32) -> i32 {
    match fee {
        0..=100 => 1,
        101..=500 => 10,
        501..=3000 => 60,
        _ => 200,
    }
}

/// Generate pools chaining every configured currency plus random extra
/// pools, a funded caller, and an exact-input swap across the whole chain.
pub fn generate_scenario(config: &ScenarioConfig) -> Scenario {
    let mut rng = rand::thread_rng();
    let mut pools = Vec::new();
    let fee_tiers = if config.fee_tiers.is_empty() {
        vec![3000]
    } else {
        config.fee_tiers.clone()
    };

    let random_pool = |a: &Currency, b: &Currency, rng: &mut rand::rngs::ThreadRng| {
        let fee = fee_tiers[rng.gen_range(0..fee_tiers.len())];
        let min = config.min_reserve.max(Decimal::ONE);
        let max = config.max_reserve.max(min);
        let span = (max - min).trunc();
        let pick = |rng: &mut rand::rngs::ThreadRng| {
            let offset = if span > Decimal::ZERO {
                let scaled = rng.gen_range(0.0..1.0f64);
                (span * Decimal::try_from(scaled).unwrap_or(Decimal::ZERO)).trunc()
            } else {
                Decimal::ZERO
            };
            (min + offset).trunc()
        };
        PoolSpec {
            currency0: a.clone(),
            currency1: b.clone(),
            fee,
            tick_spacing: tick_spacing_for(fee),
            hooks: None,
            reserve0: pick(rng),
            reserve1: pick(rng),
        }
    };

    for pair in config.currencies.windows(2) {
        pools.push(random_pool(&pair[0], &pair[1], &mut rng));
    }
    if config.currencies.len() > 2 {
        for _ in 0..config.extra_pools {
            let i = rng.gen_range(0..config.currencies.len());
            let mut j = rng.gen_range(0..config.currencies.len());
            while j == i {
                j = rng.gen_range(0..config.currencies.len());
            }
            pools.push(random_pool(
                &config.currencies[i],
                &config.currencies[j],
                &mut rng,
            ));
        }
    }

    let chain: Vec<Hop> = pools
        .iter()
        .take(config.currencies.len().saturating_sub(1))
        .map(|p| Hop::new(p.currency1.clone(), p.fee, p.tick_spacing))
        .collect();

    let mut accounts = Vec::new();
    let swap = config.currencies.first().map(|input| {
        accounts.push(AccountSpec {
            party: config.caller.clone(),
            currency: input.clone(),
            balance: config.amount_in,
            allowance: None,
        });
        SwapRequest::ExactInput {
            currency_in: input.clone(),
            hops: chain,
            amount_in: config.amount_in,
            min_amount_out: Decimal::ZERO,
        }
    });

    Scenario {
        router: RouterConfig::default(),
        pools,
        accounts,
        call: Some(CallContext::new(config.caller.clone())),
        swap,
    }
}

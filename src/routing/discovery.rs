//! Fewest-hop route discovery over a set of known pools.
//!
//! Currencies are nodes and pools are undirected edges. When several pools
//! join the same pair the cheapest fee tier is used.

use crate::core::currency::Currency;
use crate::core::hop::Hop;
use crate::core::pool::PoolKey;
use log::debug;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("no pool touches {0}")]
    UnknownCurrency(Currency),
    #[error("no route from {from} to {to}")]
    NoRoute { from: Currency, to: Currency },
    #[error("source and destination are both {0}")]
    SameCurrency(Currency),
}

/// Currency graph built from pool keys.
#[derive(Debug, Clone, Default)]
pub struct PoolGraph {
    graph: UnGraph<Currency, PoolKey>,
    nodes: HashMap<Currency, NodeIndex>,
}

impl PoolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pools<'a>(pools: impl IntoIterator<Item = &'a PoolKey>) -> Self {
        let mut graph = Self::new();
        for pool in pools {
            graph.add_pool(pool.clone());
        }
        debug!(
            "pool graph: {} currencies, {} pools",
            graph.currency_count(),
            graph.pool_count()
        );
        graph
    }

    pub fn add_pool(&mut self, pool: PoolKey) {
        let a = self.node(pool.currency0().clone());
        let b = self.node(pool.currency1().clone());
        self.graph.add_edge(a, b, pool);
    }

    pub fn currency_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn pool_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn node(&mut self, currency: Currency) -> NodeIndex {
        if let Some(idx) = self.nodes.get(&currency) {
            return *idx;
        }
        let idx = self.graph.add_node(currency.clone());
        self.nodes.insert(currency, idx);
        idx
    }

    /// Exact-input hops from `from` to `to` using as few pools as possible.
    pub fn find_route(&self, from: &Currency, to: &Currency) -> Result<Vec<Hop>, DiscoveryError> {
        if from == to {
            return Err(DiscoveryError::SameCurrency(from.clone()));
        }
        let start = *self
            .nodes
            .get(from)
            .ok_or_else(|| DiscoveryError::UnknownCurrency(from.clone()))?;
        let goal = *self
            .nodes
            .get(to)
            .ok_or_else(|| DiscoveryError::UnknownCurrency(to.clone()))?;

        let (_, path) = astar(&self.graph, start, |n| n == goal, |_| 1u32, |_| 0u32).ok_or_else(
            || DiscoveryError::NoRoute {
                from: from.clone(),
                to: to.clone(),
            },
        )?;

        let mut hops = Vec::with_capacity(path.len().saturating_sub(1));
        for pair in path.windows(2) {
            let pool = self
                .graph
                .edges_connecting(pair[0], pair[1])
                .map(|e| e.weight())
                .min_by_key(|p| p.fee())
                .ok_or_else(|| DiscoveryError::NoRoute {
                    from: from.clone(),
                    to: to.clone(),
                })?;
            let mut hop = Hop::new(self.graph[pair[1]].clone(), pool.fee(), pool.tick_spacing());
            hop.hooks = pool.hooks().cloned();
            hops.push(hop);
        }
        debug!("discovered {} hop route {} -> {}", hops.len(), from, to);
        Ok(hops)
    }
}

/// Build a graph from `pools` and search it once.
pub fn find_route(
    pools: &[PoolKey],
    from: &Currency,
    to: &Currency,
) -> Result<Vec<Hop>, DiscoveryError> {
    PoolGraph::from_pools(pools).find_route(from, to)
}

//! # flash-router
//!
//! Multi-hop exchange routing with flash accounting.
//!
//! A caller chains several pairwise exchanges across different pools and
//! settles only the net result: one collection of the input currency and
//! one payment of the output currency. Intermediate currencies never move;
//! they net to zero on a per-session ledger that must be flat before the
//! session may close.
//!
//! ## Architecture
//!
//! - **core**: Currencies, parties, pool keys, hops and the signed ledger
//! - **exchange**: Interfaces of the exchange primitive and custody transfers
//! - **session**: Session guard and the per-call accounting scope
//! - **routing**: Forward/backward path resolution, settlement, the router
//! - **simulation**: In-memory pools and custody, scenario files

pub mod core;
pub mod exchange;
pub mod routing;
pub mod session;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::currency::Currency;
    pub use crate::core::hop::Hop;
    pub use crate::core::ledger::Ledger;
    pub use crate::core::party::PartyId;
    pub use crate::core::pool::{HookId, PoolKey};
    pub use crate::exchange::adapter::{AmountSpecified, BalanceDelta, ExchangeAdapter};
    pub use crate::exchange::transfer::CurrencyTransfer;
    pub use crate::routing::error::{RouteDefect, RouterError, Slippage};
    pub use crate::routing::request::{CallContext, SwapRequest};
    pub use crate::routing::router::{Router, RouterConfig, SwapReceipt};
    pub use crate::simulation::custody::InMemoryCustody;
    pub use crate::simulation::pool_manager::InMemoryPoolManager;
}

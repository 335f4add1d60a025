use crate::core::currency::Currency;
use crate::core::pool::{HookId, PoolKey};
use serde::{Deserialize, Serialize};

/// One step of a multi-hop route.
///
/// `currency` is the other side of the pool used by this step: the
/// destination currency on an exact-input route, the source currency on an
/// exact-output route. Together with the running currency of the route it
/// identifies exactly one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub currency: Currency,
    pub fee: u32,
    pub tick_spacing: i32,
    #[serde(default)]
    pub hooks: Option<HookId>,
    /// Opaque bytes forwarded to the pool's hook.
    #[serde(default)]
    pub hook_data: Vec<u8>,
}

impl Hop {
    pub fn new(currency: Currency, fee: u32, tick_spacing: i32) -> Self {
        Self {
            currency,
            fee,
            tick_spacing,
            hooks: None,
            hook_data: Vec::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: HookId) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn with_hook_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.hook_data = data.into();
        self
    }

    /// The pool joining `running` and this hop's currency, and whether
    /// `running` sits in slot A.
    ///
    /// On an exact-input route `running` is the currency being spent; on an
    /// exact-output route it is the currency being bought, and the caller
    /// flips the flag to get the trade direction.
    pub fn pool_and_direction(&self, running: &Currency) -> (PoolKey, bool) {
        let key = PoolKey::new(
            running.clone(),
            self.currency.clone(),
            self.fee,
            self.tick_spacing,
            self.hooks.clone(),
        );
        let running_is_zero = key.zero_for_one(running);
        (key, running_is_zero)
    }
}

/// Re-encode an exact-input route (hops name destinations, starting from
/// `start`) as the exact-output form (hops name sources, ending at the last
/// destination). Pool parameters stay with the pool they describe.
pub fn to_exact_output(start: &Currency, hops: &[Hop]) -> Vec<Hop> {
    let mut source = start;
    hops.iter()
        .map(|hop| {
            let reversed = Hop {
                currency: source.clone(),
                ..hop.clone()
            };
            source = &hop.currency;
            reversed
        })
        .collect()
}

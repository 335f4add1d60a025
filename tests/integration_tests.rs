use flash_router::core::hop::to_exact_output;
use flash_router::exchange::adapter::ExchangeError;
use flash_router::exchange::Transactional;
use flash_router::prelude::*;
use flash_router::routing::discovery::find_route;
use flash_router::routing::path::SwapMode;
use flash_router::simulation::pool_manager::{PoolCheckpoint, PoolState};
use flash_router::simulation::scenario::Scenario;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

const DEPTH: Decimal = dec!(1_000_000_000);

fn token(id: &str) -> Currency {
    Currency::token(id)
}

fn alice() -> PartyId {
    PartyId::new("alice")
}

/// Pools at a 1:1 nominal rate, each backed by custody, with alice holding
/// and approving `balance` of every token involved.
fn market(keys: &[PoolKey], balance: Decimal) -> Router<InMemoryPoolManager, InMemoryCustody> {
    let mut pools = InMemoryPoolManager::new();
    let mut custody = InMemoryCustody::new();
    let mut funded = HashSet::new();
    for key in keys {
        pools.initialize(key.clone(), DEPTH, DEPTH);
        for currency in [key.currency0(), key.currency1()] {
            custody.fund_custody(currency, DEPTH);
            if funded.insert(currency.clone()) {
                custody.mint(&alice(), currency, balance);
                custody.approve(&alice(), currency, balance);
            }
        }
    }
    Router::new(pools, custody)
}

fn snapshot(router: &Router<InMemoryPoolManager, InMemoryCustody>) -> (Vec<PoolState>, InMemoryCustody) {
    let mut pools: Vec<PoolState> = router.exchange().pools().cloned().collect();
    pools.sort_by_key(|p| p.key.id());
    (pools, router.transfers().clone())
}

fn assert_custody_eq(a: &InMemoryCustody, b: &InMemoryCustody, parties: &[PartyId], currencies: &[Currency]) {
    for currency in currencies {
        assert_eq!(a.custody_balance(currency), b.custody_balance(currency));
        for party in parties {
            assert_eq!(a.balance(party, currency), b.balance(party, currency));
            assert_eq!(a.allowance(party, currency), b.allowance(party, currency));
        }
    }
}

/// One pool at 1:1, 1000 in with a 0.3% fee lands in [990, 1000]; a minimum
/// of 1001 on the same state is rejected and changes nothing.
#[test]
fn single_pool_example_scenario() {
    let pool = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let mut router = market(&[pool.clone()], dec!(10_000));
    let ctx = CallContext::new(alice());

    let before = snapshot(&router);
    let err = router
        .exact_input_single(&ctx, &pool, true, dec!(1000), dec!(1001), &[])
        .unwrap_err();
    assert!(matches!(err, RouterError::SlippageExceeded(Slippage::TooLittleReceived { .. })));
    let after = snapshot(&router);
    assert_eq!(before.0, after.0);
    assert_custody_eq(&before.1, &after.1, &[alice()], &[token("A"), token("B")]);

    let out = router
        .exact_input_single(&ctx, &pool, true, dec!(1000), dec!(990), &[])
        .unwrap();
    assert!(out >= dec!(990) && out <= dec!(1000));
    assert_eq!(router.transfers().balance(&alice(), &token("A")), dec!(9000));
    assert_eq!(router.transfers().balance(&alice(), &token("B")), dec!(10_000) + out);
}

/// Exact output of 100 C over A -> B -> C, then the input it required spent
/// forward on the same state buys at least 100 C.
#[test]
fn two_hop_exact_output_then_exact_input() {
    let ab = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let bc = PoolKey::new(token("B"), token("C"), 500, 10, None);
    let mut router = market(&[ab, bc], dec!(10_000));
    let ctx = CallContext::new(alice());

    let forward = vec![Hop::new(token("B"), 3000, 60), Hop::new(token("C"), 500, 10)];
    let backward = to_exact_output(&token("A"), &forward);

    let quote = router
        .quote_exact_output_path(&token("C"), &backward, dec!(100))
        .unwrap();
    assert_eq!(quote.currency_in, token("A"));
    assert_eq!(quote.amount_out, dec!(100));

    let out = router
        .exact_input_path(&ctx, &token("A"), &forward, quote.amount_in, dec!(100))
        .unwrap();
    assert!(out >= dec!(100));
}

#[test]
fn exact_output_path_settles_net_amounts_only() {
    let ab = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let bc = PoolKey::new(token("B"), token("C"), 3000, 60, None);
    let mut router = market(&[ab, bc], dec!(10_000));
    let ctx = CallContext::new(alice());
    let hops = vec![Hop::new(token("A"), 3000, 60), Hop::new(token("B"), 3000, 60)];

    let receipt = router
        .execute(
            &ctx,
            &SwapRequest::ExactOutput {
                currency_out: token("C"),
                hops,
                amount_out: dec!(500),
                max_amount_in: dec!(600),
            },
        )
        .unwrap();
    assert_eq!(receipt.mode, SwapMode::ExactOutput);
    assert_eq!(receipt.amount_out, dec!(500));
    assert_eq!(receipt.hops.len(), 2);
    assert_eq!(receipt.hops[0].currency_in, token("A"));
    assert_eq!(receipt.hops[1].currency_out, token("C"));
    // the intermediate leg is matched exactly
    assert_eq!(receipt.hops[0].amount_out, receipt.hops[1].amount_in);

    let custody = router.transfers();
    assert_eq!(custody.balance(&alice(), &token("A")), dec!(10_000) - receipt.amount_in);
    assert_eq!(custody.balance(&alice(), &token("B")), dec!(10_000));
    assert_eq!(custody.balance(&alice(), &token("C")), dec!(10_500));
    // B custody backs two pools and never moved
    assert_eq!(custody.custody_balance(&token("B")), DEPTH * dec!(2));
}

#[test]
fn max_in_bound_is_inclusive() {
    let pool = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let mut router = market(&[pool.clone()], dec!(10_000));
    let ctx = CallContext::new(alice());

    let required = router
        .quote_exact_output_single(&pool, true, dec!(250), &[])
        .unwrap()
        .amount_in;
    let err = router
        .exact_output_single(&ctx, &pool, true, dec!(250), required - dec!(1), &[])
        .unwrap_err();
    assert!(matches!(err, RouterError::SlippageExceeded(Slippage::TooMuchRequested { .. })));

    let spent = router
        .exact_output_single(&ctx, &pool, true, dec!(250), required, &[])
        .unwrap();
    assert_eq!(spent, required);
}

#[test]
fn empty_route_makes_no_exchange_calls() {
    let pool = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let mut router = market(&[pool], dec!(10_000));
    let ctx = CallContext::new(alice());

    let err = router
        .exact_input_path(&ctx, &token("A"), &[], dec!(100), Decimal::ZERO)
        .unwrap_err();
    assert_eq!(err, RouterError::InvalidRoute(RouteDefect::Empty));
    let err = router
        .exact_output_path(&ctx, &token("B"), &[], dec!(100), Decimal::MAX)
        .unwrap_err();
    assert_eq!(err, RouterError::InvalidRoute(RouteDefect::Empty));
    assert_eq!(router.exchange().exchange_count(), 0);
}

#[test]
fn hop_back_to_same_currency_is_invalid() {
    let pool = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let mut router = market(&[pool], dec!(10_000));
    let hops = vec![Hop::new(token("B"), 3000, 60), Hop::new(token("B"), 3000, 60)];

    let err = router
        .exact_input_path(&CallContext::new(alice()), &token("A"), &hops, dec!(100), Decimal::ZERO)
        .unwrap_err();
    assert!(matches!(
        err,
        RouterError::InvalidRoute(RouteDefect::SameCurrency { index: 1, .. })
    ));
    assert_eq!(router.exchange().exchange_count(), 0);
}

#[test]
fn hook_rejection_mid_route_rolls_back_earlier_hops() {
    let ab = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let guarded = HookId::new("kyc");
    let bc = PoolKey::new(token("B"), token("C"), 3000, 60, Some(guarded.clone()));
    let mut router = market(&[ab.clone(), bc], dec!(10_000));
    router.exchange_mut().block_hook(guarded.clone(), "caller not allow-listed");

    let hops = vec![
        Hop::new(token("B"), 3000, 60),
        Hop::new(token("C"), 3000, 60).with_hooks(guarded),
    ];
    let before = snapshot(&router);
    let err = router
        .exact_input_path(&CallContext::new(alice()), &token("A"), &hops, dec!(1000), Decimal::ZERO)
        .unwrap_err();

    assert!(matches!(
        err,
        RouterError::AdapterFailure(ExchangeError::HookRejected { .. })
    ));
    // the first hop ran and was undone
    assert_eq!(router.exchange().exchange_count(), 1);
    let after = snapshot(&router);
    assert_eq!(before.0, after.0);
    assert_custody_eq(&before.1, &after.1, &[alice()], &[token("A"), token("B"), token("C")]);
}

#[test]
fn hook_data_reaches_each_hooked_pool() {
    let hooks = HookId::new("oracle");
    let ab = PoolKey::new(token("A"), token("B"), 3000, 60, Some(hooks.clone()));
    let bc = PoolKey::new(token("B"), token("C"), 3000, 60, None);
    let mut router = market(&[ab.clone(), bc], dec!(10_000));

    let hops = vec![
        Hop::new(token("B"), 3000, 60)
            .with_hooks(hooks.clone())
            .with_hook_data(vec![0xde, 0xad]),
        Hop::new(token("C"), 3000, 60),
    ];
    router
        .exact_input_path(&CallContext::new(alice()), &token("A"), &hops, dec!(100), Decimal::ZERO)
        .unwrap();

    let calls = router.exchange().hook_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].pool, ab.id());
    assert_eq!(calls[0].hooks, hooks);
    assert_eq!(calls[0].data, vec![0xde, 0xad]);
}

#[test]
fn failed_route_leaves_no_hook_trace() {
    let oracle = HookId::new("oracle");
    let kyc = HookId::new("kyc");
    let ab = PoolKey::new(token("A"), token("B"), 3000, 60, Some(oracle.clone()));
    let bc = PoolKey::new(token("B"), token("C"), 3000, 60, Some(kyc.clone()));
    let mut router = market(&[ab, bc], dec!(10_000));
    router.exchange_mut().block_hook(kyc.clone(), "paused");

    let hops = vec![
        Hop::new(token("B"), 3000, 60).with_hooks(oracle).with_hook_data(vec![7]),
        Hop::new(token("C"), 3000, 60).with_hooks(kyc),
    ];
    let err = router
        .exact_input_path(&CallContext::new(alice()), &token("A"), &hops, dec!(100), Decimal::ZERO)
        .unwrap_err();

    assert!(matches!(
        err,
        RouterError::AdapterFailure(ExchangeError::HookRejected { .. })
    ));
    assert!(router.exchange().hook_calls().is_empty());
}

#[test]
fn native_input_refunds_unspent_value() {
    let pool = PoolKey::new(Currency::Native, token("USDC"), 500, 10, None);
    let mut router = market(&[pool.clone()], dec!(10_000));
    let ctx = CallContext::new(alice()).with_value(dec!(5000));

    let receipt = router
        .execute(
            &ctx,
            &SwapRequest::ExactInputSingle {
                pool,
                zero_for_one: true,
                amount_in: dec!(1000),
                min_amount_out: dec!(990),
                hook_data: Vec::new(),
            },
        )
        .unwrap();

    assert_eq!(receipt.currency_in, Currency::Native);
    assert_eq!(receipt.refunded, dec!(4000));
    let custody = router.transfers();
    assert_eq!(custody.balance(&alice(), &Currency::Native), dec!(9000));
    assert_eq!(custody.custody_balance(&Currency::Native), DEPTH + dec!(1000));
}

#[test]
fn native_input_without_enough_value_fails_cleanly() {
    let pool = PoolKey::new(Currency::Native, token("USDC"), 500, 10, None);
    let mut router = market(&[pool.clone()], dec!(10_000));
    let ctx = CallContext::new(alice()).with_value(dec!(500));

    let before = snapshot(&router);
    let err = router
        .exact_input_single(&ctx, &pool, true, dec!(1000), Decimal::ZERO, &[])
        .unwrap_err();
    assert_eq!(
        err,
        RouterError::InsufficientValue {
            required: dec!(1000),
            supplied: dec!(500),
        }
    );
    let after = snapshot(&router);
    assert_eq!(before.0, after.0);
    assert_custody_eq(&before.1, &after.1, &[alice()], &[Currency::Native, token("USDC")]);
}

#[test]
fn exact_output_native_input_refunds_unspent_value() {
    let pool = PoolKey::new(Currency::Native, token("USDC"), 500, 10, None);
    let mut router = market(&[pool.clone()], dec!(10_000));
    let ctx = CallContext::new(alice()).with_value(dec!(5000));

    let receipt = router
        .execute(
            &ctx,
            &SwapRequest::ExactOutputSingle {
                pool,
                zero_for_one: true,
                amount_out: dec!(1000),
                max_amount_in: dec!(5000),
                hook_data: Vec::new(),
            },
        )
        .unwrap();

    assert!(receipt.amount_in > dec!(1000) && receipt.amount_in < dec!(1010));
    assert_eq!(receipt.refunded, dec!(5000) - receipt.amount_in);
    let custody = router.transfers();
    assert_eq!(
        custody.balance(&alice(), &Currency::Native),
        dec!(10_000) - receipt.amount_in
    );
    assert_eq!(custody.balance(&alice(), &token("USDC")), dec!(11_000));
    // custody keeps exactly what the pool took, nothing of the call value
    assert_eq!(
        custody.custody_balance(&Currency::Native),
        DEPTH + receipt.amount_in
    );
}

#[test]
fn native_output_pays_recipient() {
    let pool = PoolKey::new(Currency::Native, token("USDC"), 500, 10, None);
    let mut router = market(&[pool.clone()], dec!(10_000));
    let bob = PartyId::new("bob");
    let ctx = CallContext::new(alice()).with_recipient(bob.clone());

    let out = router
        .exact_input_single(&ctx, &pool, false, dec!(2000), dec!(1900), &[])
        .unwrap();

    let custody = router.transfers();
    assert_eq!(custody.balance(&bob, &Currency::Native), out);
    assert_eq!(custody.balance(&alice(), &Currency::Native), dec!(10_000));
    assert_eq!(custody.balance(&alice(), &token("USDC")), dec!(8000));
}

#[test]
fn missing_allowance_aborts_without_moving_pools() {
    let pool = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let mut router = market(&[pool.clone()], dec!(10_000));
    router.transfers_mut().approve(&alice(), &token("A"), dec!(10));

    let before = snapshot(&router);
    let err = router
        .exact_input_single(&CallContext::new(alice()), &pool, true, dec!(1000), Decimal::ZERO, &[])
        .unwrap_err();
    assert!(matches!(err, RouterError::TransferFailed(_)));
    assert_eq!(before.0, snapshot(&router).0);
}

#[test]
fn unknown_pool_is_an_adapter_failure() {
    let pool = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let mut router = market(&[pool], dec!(10_000));
    let hops = vec![Hop::new(token("B"), 500, 10)];

    let err = router
        .exact_input_path(&CallContext::new(alice()), &token("A"), &hops, dec!(100), Decimal::ZERO)
        .unwrap_err();
    assert!(matches!(
        err,
        RouterError::AdapterFailure(ExchangeError::PoolNotFound(_))
    ));
}

#[test]
fn quotes_leave_state_untouched() {
    let pool = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let mut router = market(&[pool.clone()], dec!(10_000));
    let before = snapshot(&router);

    let first = router.quote_exact_input_single(&pool, true, dec!(5000), &[]).unwrap();
    let second = router.quote_exact_input_single(&pool, true, dec!(5000), &[]).unwrap();
    assert_eq!(first.amount_out, second.amount_out);
    assert_eq!(before.0, snapshot(&router).0);
    assert!(!router.guard().is_open());
}

#[test]
fn discovered_route_executes() {
    let keys = vec![
        PoolKey::new(token("A"), token("B"), 3000, 60, None),
        PoolKey::new(token("B"), token("C"), 500, 10, None),
        PoolKey::new(token("C"), token("D"), 100, 1, None),
    ];
    let mut router = market(&keys, dec!(10_000));
    let hops = find_route(&router.exchange().pool_keys(), &token("A"), &token("D")).unwrap();
    assert_eq!(hops.len(), 3);

    let receipt = router
        .execute(
            &CallContext::new(alice()),
            &SwapRequest::ExactInput {
                currency_in: token("A"),
                hops,
                amount_in: dec!(1000),
                min_amount_out: dec!(990),
            },
        )
        .unwrap();
    assert_eq!(receipt.currency_out, token("D"));

    let json = serde_json::to_string(&receipt).unwrap();
    assert!(json.contains("\"mode\":\"exact_input\""));
    assert!(json.contains(&receipt.session_id.to_string()));
}

#[test]
fn scenario_file_round_trip_through_router() {
    let json = r#"{
        "router": { "max_hops": 2 },
        "pools": [
            { "currency0": "A", "currency1": "B", "fee": 3000, "tick_spacing": 60,
              "reserve0": "1000000", "reserve1": "1000000" },
            { "currency0": "B", "currency1": "C", "fee": 3000, "tick_spacing": 60,
              "reserve0": "1000000", "reserve1": "1000000" },
            { "currency0": "C", "currency1": "D", "fee": 3000, "tick_spacing": 60,
              "reserve0": "1000000", "reserve1": "1000000" }
        ],
        "accounts": [ { "party": "alice", "currency": "A", "balance": "1000" } ]
    }"#;
    let scenario = Scenario::from_json(json).unwrap();
    let mut router = scenario.build();
    let hops = scenario.pool_graph().find_route(&token("A"), &token("D")).unwrap();

    let err = router
        .exact_input_path(&CallContext::new(alice()), &token("A"), &hops, dec!(100), Decimal::ZERO)
        .unwrap_err();
    assert_eq!(
        err,
        RouterError::InvalidRoute(RouteDefect::TooManyHops { hops: 3, max: 2 })
    );
}

/// Wraps the reference pools but delivers one unit less than asked on every
/// exact-output exchange.
struct ShortChanging(InMemoryPoolManager);

impl Transactional for ShortChanging {
    type Checkpoint = PoolCheckpoint;

    fn checkpoint(&self) -> Self::Checkpoint {
        self.0.checkpoint()
    }

    fn rollback(&mut self, checkpoint: Self::Checkpoint) {
        self.0.rollback(checkpoint)
    }
}

impl ExchangeAdapter for ShortChanging {
    fn exchange(
        &mut self,
        pool: &PoolKey,
        zero_for_one: bool,
        amount: AmountSpecified,
        hook_data: &[u8],
    ) -> Result<BalanceDelta, ExchangeError> {
        let mut delta = self.0.exchange(pool, zero_for_one, amount, hook_data)?;
        if !amount.is_exact_in() {
            if zero_for_one {
                delta.amount1 -= Decimal::ONE;
            } else {
                delta.amount0 -= Decimal::ONE;
            }
        }
        Ok(delta)
    }
}

#[test]
fn short_delivery_leaves_unsettled_debt_and_rolls_back() {
    let ab = PoolKey::new(token("A"), token("B"), 3000, 60, None);
    let bc = PoolKey::new(token("B"), token("C"), 3000, 60, None);
    let mut pools = InMemoryPoolManager::new();
    let mut custody = InMemoryCustody::new();
    for key in [&ab, &bc] {
        pools.initialize(key.clone(), DEPTH, DEPTH);
        custody.fund_custody(key.currency0(), DEPTH);
        custody.fund_custody(key.currency1(), DEPTH);
    }
    custody.mint(&alice(), &token("A"), dec!(10_000));
    custody.approve(&alice(), &token("A"), dec!(10_000));
    let mut router = Router::new(ShortChanging(pools), custody);

    let hops = vec![Hop::new(token("A"), 3000, 60), Hop::new(token("B"), 3000, 60)];
    let err = router
        .exact_output_path(&CallContext::new(alice()), &token("C"), &hops, dec!(100), Decimal::MAX)
        .unwrap_err();

    match err {
        RouterError::UnsettledDebt { party, currency, .. } => {
            assert_eq!(party, alice());
            assert_eq!(currency, token("B"));
        }
        other => panic!("expected unsettled debt, got {:?}", other),
    }
    assert_eq!(router.transfers().balance(&alice(), &token("A")), dec!(10_000));
    assert_eq!(router.exchange().0.pool(&ab).map(|p| p.reserve0), Some(DEPTH));
    assert_eq!(router.exchange().0.pool(&bc).map(|p| p.reserve1), Some(DEPTH));
}

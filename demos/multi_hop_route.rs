//! Multi-hop routing with flash accounting.
//!
//! Discovers a route across three pools, quotes it in both directions and
//! executes an exact-output swap paid with native value.

use flash_router::core::hop::to_exact_output;
use flash_router::prelude::*;
use flash_router::routing::discovery::find_route;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  flash-router: Multi-Hop Route Example   ║");
    println!("╚══════════════════════════════════════════╝\n");

    let native = Currency::Native;
    let usdc = Currency::token("USDC");
    let dai = Currency::token("DAI");
    let wbtc = Currency::token("WBTC");

    let keys = vec![
        PoolKey::new(native.clone(), usdc.clone(), 500, 10, None),
        PoolKey::new(usdc.clone(), dai.clone(), 100, 1, None),
        PoolKey::new(dai.clone(), wbtc.clone(), 3000, 60, None),
    ];

    let mut pools = InMemoryPoolManager::new();
    let mut custody = InMemoryCustody::new();
    for key in &keys {
        pools.initialize(key.clone(), dec!(50_000_000), dec!(50_000_000));
        custody.fund_custody(key.currency0(), dec!(50_000_000));
        custody.fund_custody(key.currency1(), dec!(50_000_000));
    }

    let bob = PartyId::new("bob");
    custody.mint(&bob, &native, dec!(10_000));

    // --- Scenario 1: discover and quote ---
    println!("━━━ Scenario 1: Route NATIVE → WBTC ━━━\n");
    let hops = find_route(&keys, &native, &wbtc).expect("route");
    let mut running = native.clone();
    for (i, hop) in hops.iter().enumerate() {
        println!("  Hop {}: {} → {} (fee {})", i, running, hop.currency, hop.fee);
        running = hop.currency.clone();
    }

    let mut router = Router::new(pools, custody);
    let forward = router
        .quote_exact_input_path(&native, &hops, dec!(5_000))
        .expect("quote");
    println!("\n5000 NATIVE buys:   {} WBTC", forward.amount_out);

    let reverse = to_exact_output(&native, &hops);
    let backward = router
        .quote_exact_output_path(&wbtc, &reverse, forward.amount_out)
        .expect("quote");
    println!("Buying it back costs {} NATIVE\n", backward.amount_in);

    // --- Scenario 2: exact output paid with native value ---
    println!("━━━ Scenario 2: Buy 1,000 WBTC with native value ━━━\n");
    let ctx = CallContext::new(bob.clone()).with_value(dec!(2_000));
    let receipt = router
        .execute(
            &ctx,
            &SwapRequest::ExactOutput {
                currency_out: wbtc.clone(),
                hops: reverse,
                amount_out: dec!(1_000),
                max_amount_in: dec!(2_000),
            },
        )
        .expect("swap");
    println!("{}", receipt);
    println!(
        "Bob now holds {} NATIVE and {} WBTC",
        router.transfers().balance(&bob, &native),
        router.transfers().balance(&bob, &wbtc)
    );
    println!(
        "Intermediate custody: {} USDC, {} DAI (never moved)",
        router.transfers().custody_balance(&usdc),
        router.transfers().custody_balance(&dai)
    );
}

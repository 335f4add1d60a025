//! Single-pool swaps in both directions.
//!
//! Shows an exact-input swap, an exact-output swap, and a slippage bound
//! that rejects a swap without touching any balance.

use flash_router::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  flash-router: Single Pool Swap Example  ║");
    println!("╚══════════════════════════════════════════╝\n");

    let usdc = Currency::token("USDC");
    let weth = Currency::token("WETH");
    let pool = PoolKey::new(usdc.clone(), weth.clone(), 3000, 60, None);

    let mut pools = InMemoryPoolManager::new();
    pools.initialize(pool.clone(), dec!(2_000_000_000), dec!(1_000_000));
    let mut custody = InMemoryCustody::new();
    custody.fund_custody(&usdc, dec!(2_000_000_000));
    custody.fund_custody(&weth, dec!(1_000_000));

    let alice = PartyId::new("alice");
    custody.mint(&alice, &usdc, dec!(100_000));
    custody.approve(&alice, &usdc, dec!(100_000));

    let mut router = Router::new(pools, custody);
    let ctx = CallContext::new(alice.clone());

    // --- Scenario 1: exact input ---
    println!("━━━ Scenario 1: Spend exactly 20,000 USDC ━━━\n");
    let quote = router
        .quote_exact_input_single(&pool, true, dec!(20_000), &[])
        .expect("quote");
    println!("Quoted output:      {} WETH", quote.amount_out);
    let out = router
        .exact_input_single(&ctx, &pool, true, dec!(20_000), quote.amount_out, &[])
        .expect("swap");
    println!("Received:           {} WETH", out);
    println!(
        "Alice now holds:    {} USDC / {} WETH\n",
        router.transfers().balance(&alice, &usdc),
        router.transfers().balance(&alice, &weth)
    );

    // --- Scenario 2: exact output ---
    println!("━━━ Scenario 2: Buy exactly 5 WETH ━━━\n");
    let spent = router
        .exact_output_single(&ctx, &pool, true, dec!(5), dec!(20_000), &[])
        .expect("swap");
    println!("Spent:              {} USDC", spent);
    println!(
        "Alice now holds:    {} USDC / {} WETH\n",
        router.transfers().balance(&alice, &usdc),
        router.transfers().balance(&alice, &weth)
    );

    // --- Scenario 3: slippage bound ---
    println!("━━━ Scenario 3: Demand more than the pool gives ━━━\n");
    let before = router.exchange().pool(&pool).cloned();
    match router.exact_input_single(&ctx, &pool, true, dec!(1_000), dec!(1_000), &[]) {
        Ok(out) => println!("Unexpectedly received {}", out),
        Err(e) => println!("Rejected:           {}", e),
    }
    let unchanged = before.as_ref() == router.exchange().pool(&pool);
    println!("Pool untouched:     {}", unchanged);
}

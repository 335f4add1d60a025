//! flash-router CLI
//!
//! Quote and execute routed swaps against a scenario file.
//!
//! # Usage
//!
//! ```bash
//! # Quote the scenario's swap without settling it
//! flash-router quote --input scenario.json
//!
//! # Execute it and print the receipt as JSON
//! flash-router swap --input scenario.json --format json
//!
//! # Find the shortest route between two currencies
//! flash-router route --input scenario.json --from A --to D --amount 10000
//!
//! # Generate a random scenario for testing
//! flash-router generate --currencies A,B,C,D --extra-pools 3
//! ```

use flash_router::core::currency::Currency;
use flash_router::core::party::PartyId;
use flash_router::routing::router::SwapReceipt;
use flash_router::simulation::scenario::{generate_scenario, Scenario, ScenarioConfig};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"flash-router — multi-hop exchange routing with flash accounting

USAGE:
    flash-router <COMMAND> [OPTIONS]

COMMANDS:
    quote       Resolve the scenario's swap without moving any balances
    swap        Execute the scenario's swap and settle it
    route       Find the fewest-hop route between two currencies
    generate    Generate a random scenario (for testing)
    help        Show this message

OPTIONS (quote, swap, route):
    --input <FILE>      Path to JSON scenario file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (route):
    --from <CURRENCY>   Currency to spend
    --to <CURRENCY>     Currency to receive
    --amount <N>        Also quote an exact-input swap of N along the route

OPTIONS (generate):
    --currencies <LIST> Comma-separated currencies to chain (default: A,B,C,D)
    --extra-pools <N>   Pools beyond the chain (default: 2)
    --amount <N>        Input amount of the generated swap (default: 10000)
    --caller <PARTY>    Funded caller (default: trader)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    flash-router quote --input scenario.json
    flash-router swap --input scenario.json --format json
    flash-router route --input scenario.json --from A --to D --amount 500
    flash-router generate --currencies NATIVE,USDC,WBTC --output test.json"#
    );
}

/// Options shared by the commands that read a scenario.
struct ScenarioArgs {
    input: Option<String>,
    format: String,
    from: Option<String>,
    to: Option<String>,
    amount: Option<Decimal>,
}

fn next_value(args: &[String], i: usize, what: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{}", what);
        process::exit(1);
    })
}

fn parse_amount(raw: &str) -> Decimal {
    raw.parse().unwrap_or_else(|e| {
        eprintln!("Invalid amount '{}': {}", raw, e);
        process::exit(1);
    })
}

fn parse_scenario_args(args: &[String], allow_route: bool) -> ScenarioArgs {
    let mut parsed = ScenarioArgs {
        input: None,
        format: "text".to_string(),
        from: None,
        to: None,
        amount: None,
    };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                parsed.input = Some(next_value(args, i, "--input requires a file path"));
            }
            "--format" => {
                i += 1;
                parsed.format = next_value(args, i, "--format requires 'text' or 'json'");
            }
            "--from" if allow_route => {
                i += 1;
                parsed.from = Some(next_value(args, i, "--from requires a currency"));
            }
            "--to" if allow_route => {
                i += 1;
                parsed.to = Some(next_value(args, i, "--to requires a currency"));
            }
            "--amount" if allow_route => {
                i += 1;
                parsed.amount = Some(parse_amount(&next_value(
                    args,
                    i,
                    "--amount requires a number",
                )));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }
    parsed
}

fn load_scenario(args: &ScenarioArgs) -> Scenario {
    let path = args.input.as_deref().unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    Scenario::load(path).unwrap_or_else(|e| {
        eprintln!("Error loading '{}': {}", path, e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "pools": [
    {{ "currency0": "A", "currency1": "B", "fee": 3000, "tick_spacing": 60,
      "reserve0": "1000000", "reserve1": "1000000" }}
  ],
  "accounts": [ {{ "party": "alice", "currency": "A", "balance": "5000" }} ],
  "call": {{ "caller": "alice" }},
  "swap": {{ "kind": "exact_input", "currency_in": "A",
            "hops": [ {{ "currency": "B", "fee": 3000, "tick_spacing": 60 }} ],
            "amount_in": "1000", "min_amount_out": "990" }}
}}"#
        );
        process::exit(1);
    })
}

fn to_json<S: serde::Serialize>(value: &S) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    })
}

fn print_receipt(receipt: &SwapReceipt, format: &str) {
    if format == "json" {
        println!("{}", to_json(receipt));
    } else {
        println!("{}", receipt);
    }
}

fn cmd_quote(args: &[String]) {
    let args = parse_scenario_args(args, false);
    let scenario = load_scenario(&args);
    let request = scenario.swap.as_ref().unwrap_or_else(|| {
        eprintln!("Error: scenario has no \"swap\" to quote");
        process::exit(1);
    });

    let mut router = scenario.build();
    match router.quote(request) {
        Ok(receipt) => print_receipt(&receipt, &args.format),
        Err(e) => {
            eprintln!("Quote failed: {}", e);
            process::exit(2);
        }
    }
}

fn cmd_swap(args: &[String]) {
    let args = parse_scenario_args(args, false);
    let scenario = load_scenario(&args);
    let (call, request) = match (scenario.call.as_ref(), scenario.swap.as_ref()) {
        (Some(call), Some(request)) => (call, request),
        _ => {
            eprintln!("Error: scenario needs both \"call\" and \"swap\" to execute");
            process::exit(1);
        }
    };

    let mut router = scenario.build();
    let receipt = router.execute(call, request).unwrap_or_else(|e| {
        eprintln!("Swap failed: {}", e);
        process::exit(2);
    });
    print_receipt(&receipt, &args.format);

    if args.format != "json" {
        let custody = router.transfers();
        println!("Balances after settlement:");
        for party in [Some(&call.caller), call.recipient.as_ref()].into_iter().flatten() {
            for currency in [&receipt.currency_in, &receipt.currency_out] {
                println!(
                    "  {:<12} {:<8} {}",
                    party,
                    currency,
                    custody.balance(party, currency)
                );
            }
        }
    }
}

fn cmd_route(args: &[String]) {
    let args = parse_scenario_args(args, true);
    let scenario = load_scenario(&args);
    let (from, to) = match (args.from.as_deref(), args.to.as_deref()) {
        (Some(from), Some(to)) => (Currency::parse(from), Currency::parse(to)),
        _ => {
            eprintln!("Error: --from and --to are required");
            process::exit(1);
        }
    };

    let graph = scenario.pool_graph();
    let hops = graph.find_route(&from, &to).unwrap_or_else(|e| {
        eprintln!("Route search failed: {}", e);
        process::exit(2);
    });

    let quote = args.amount.map(|amount| {
        let mut router = scenario.build();
        router
            .quote_exact_input_path(&from, &hops, amount)
            .unwrap_or_else(|e| {
                eprintln!("Quote failed: {}", e);
                process::exit(2);
            })
    });

    if args.format == "json" {
        #[derive(serde::Serialize)]
        struct RouteOutput<'a> {
            currency_in: &'a Currency,
            currency_out: &'a Currency,
            hops: &'a [flash_router::core::hop::Hop],
            quote: Option<&'a SwapReceipt>,
        }
        println!(
            "{}",
            to_json(&RouteOutput {
                currency_in: &from,
                currency_out: &to,
                hops: &hops,
                quote: quote.as_ref(),
            })
        );
    } else {
        let mut running = from.clone();
        println!(
            "Searched {} pools across {} currencies",
            graph.pool_count(),
            graph.currency_count()
        );
        println!("Route {} -> {} ({} hops)", from, to, hops.len());
        for (i, hop) in hops.iter().enumerate() {
            let (pool, _) = hop.pool_and_direction(&running);
            println!("  Hop {}: {} -> {} via {}", i, running, hop.currency, pool);
            running = hop.currency.clone();
        }
        if let Some(receipt) = quote {
            println!();
            print!("{}", receipt);
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = ScenarioConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--currencies" => {
                i += 1;
                let list = next_value(args, i, "--currencies requires a comma-separated list");
                config.currencies = list.split(',').map(|s| Currency::parse(s.trim())).collect();
            }
            "--extra-pools" => {
                i += 1;
                config.extra_pools = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--extra-pools requires a number");
                        process::exit(1);
                    });
            }
            "--amount" => {
                i += 1;
                config.amount_in = parse_amount(&next_value(args, i, "--amount requires a number"));
            }
            "--caller" => {
                i += 1;
                config.caller = PartyId::new(&next_value(args, i, "--caller requires a name"));
            }
            "--output" => {
                i += 1;
                output_path = Some(next_value(args, i, "--output requires a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    if config.currencies.len() < 2 {
        eprintln!("--currencies needs at least two entries");
        process::exit(1);
    }

    let scenario = generate_scenario(&config);
    let json = scenario.to_json().unwrap_or_else(|e| {
        eprintln!("Error serializing scenario: {}", e);
        process::exit(1);
    });

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} pools across {} currencies → {}",
            scenario.pools.len(),
            config.currencies.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "quote" => cmd_quote(rest),
        "swap" => cmd_swap(rest),
        "route" => cmd_route(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}

//! Print a router quote and the slippage-adjusted minimum the flow would send.

use alloy_primitives::utils::{format_ether, parse_ether};
use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;

use dexbot_signals::config::Config;
use dexbot_signals::wallet::slippage::apply_slippage;
use dexbot_signals::wallet::{quote_price, RouterQuoter};

#[derive(Parser, Debug)]
#[command(name = "quote")]
struct Args {
    /// Token contract address
    token: Address,

    /// Amount in, in ether units
    #[arg(short, long, default_value = "1")]
    amount: String,

    /// Quote token → asset is the default; this quotes asset → quote token
    #[arg(long)]
    sell: bool,

    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let cfg = match Config::load_optional(&args.config)? {
        Some(cfg) => cfg,
        None => {
            tracing::warn!(path = %args.config, "config file not found, using defaults");
            Config::default()
        }
    };
    let quote_token: Address = cfg.chain.quote_token.parse()?;
    let amount_in = parse_ether(&args.amount).with_context(|| format!("bad amount {}", args.amount))?;

    let path = if args.sell {
        vec![args.token, quote_token]
    } else {
        vec![quote_token, args.token]
    };

    let quoter = RouterQuoter::connect(&cfg.chain).await?;
    let start = Instant::now();
    let amounts = quoter.amounts_out(amount_in, path).await?;
    let quote_ms = start.elapsed().as_millis();

    let out = amounts.get(1).copied().context("router returned no output amount")?;
    let min_out = apply_slippage(out, cfg.chain.slippage_bps);

    println!("in:      {}", format_ether(amount_in));
    println!("out:     {}", format_ether(out));
    println!("min out: {} ({} bps)", format_ether(min_out), cfg.chain.slippage_bps);
    if let Some(price) = quote_price(&amounts) {
        println!("price:   {price}");
    }
    println!("quote:   {quote_ms}ms");
    Ok(())
}

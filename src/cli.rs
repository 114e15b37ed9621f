use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::state::SortSpec;

/// Price prediction signals, contract status and trading-bot buy/sell.
#[derive(Parser, Debug)]
#[command(name = "dexbot-signals", version)]
pub struct Cli {
    /// Config file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log at trace level
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the signal table once
    Signals(SearchArgs),
    /// Live dashboard: signals, accuracy and contract status
    Watch(SearchArgs),
    /// Contract status events
    Status {
        /// Keep polling
        #[arg(short, long)]
        watch: bool,
    },
    /// Model accuracy
    Accuracy,
    /// Write the visible signals to an .xlsx file
    Export {
        #[command(flatten)]
        search: SearchArgs,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Buy a token with the contract's quote-token deposit
    Buy {
        /// Token contract address
        token: String,
        /// Token name, registered with the contract when the asset is new
        name: String,
    },
    /// Sell the contract's whole balance of a token
    Sell {
        /// Token contract address
        token: String,
    },
    /// Display zone / country
    Zone {
        #[command(subcommand)]
        action: ZoneAction,
    },
    /// Saved table sorting
    Sort {
        #[command(subcommand)]
        action: SortAction,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Case-insensitive pair filter, e.g. `cake`
    #[arg(short, long, default_value = "")]
    pub search: String,
}

#[derive(Subcommand, Debug)]
pub enum ZoneAction {
    Show,
    /// Select a country by ISO code, e.g. `DE`
    Set {
        id: String,
        /// One of the country's IANA zones; defaults to its primary zone
        #[arg(short, long)]
        timezone: Option<String>,
    },
    Clear,
    /// Re-detect from IP geolocation
    Detect,
}

#[derive(Subcommand, Debug)]
pub enum SortAction {
    /// Columns in priority order: `id` ascending, `id:desc` descending
    Set {
        #[arg(required = true)]
        columns: Vec<String>,
    },
    Clear,
}

/// `id` or `id:desc` / `id:asc`.
pub fn parse_sort_arg(arg: &str) -> Option<SortSpec> {
    let (id, dir) = match arg.split_once(':') {
        Some((id, dir)) => (id, dir),
        None => (arg, "asc"),
    };
    if id.trim().is_empty() {
        return None;
    }
    let desc = match dir.to_ascii_lowercase().as_str() {
        "asc" => false,
        "desc" => true,
        _ => return None,
    };
    Some(SortSpec {
        id: id.trim().to_string(),
        desc,
    })
}

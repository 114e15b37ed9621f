use alloy_primitives::Address;
use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

use dexbot_signals::api::ApiClient;
use dexbot_signals::cli::{parse_sort_arg, Cli, Command, SortAction, ZoneAction};
use dexbot_signals::config::{Config, PRIVATE_KEY_ENV};
use dexbot_signals::dashboard::{Control, Dashboard};
use dexbot_signals::events::Event;
use dexbot_signals::export::{build_export, write_xlsx};
use dexbot_signals::feeds::{self, clock};
use dexbot_signals::present::{clock_line, contract_table, signal_table, summary_line, ContractRow};
use dexbot_signals::signals::{prepare, SignalRow, SignalSummary, TokenDirectory};
use dexbot_signals::state::{countries, SelectedCountry, Session, SettingsStore};
use dexbot_signals::wallet::{
    run_buy, run_sell, BuyRequest, EvmTradingBot, FlowStage, SellRequest, TradeError,
    TradeSettings,
};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

struct App {
    cfg: Config,
    client: ApiClient,
    session: Session,
    tokens: TokenDirectory,
}

#[tokio::main]
async fn main() -> Result<()> {
    // secrets live in .env, not config.toml
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let loaded = Config::load_optional(&cli.config)?;
    let found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();
    init_logging(&cfg.general.log_level, cli.verbose, cli.debug);
    if !found {
        tracing::warn!(path = %cli.config, "config file not found, using defaults");
    }

    let client = ApiClient::new(cfg.endpoints.clone()).context("failed to build HTTP client")?;
    let session = Session::open(
        SettingsStore::new(&cfg.general.settings_path),
        cfg.general.default_timezone.clone(),
    );
    tracing::debug!(
        signed_in = session.settings().is_signed_in(),
        zone = session.zone_name(),
        "settings loaded"
    );
    let tokens = match &cfg.tokens.directory_path {
        Some(path) => TokenDirectory::with_file(path)?,
        None => TokenDirectory::builtin(),
    };

    let mut app = App {
        cfg,
        client,
        session,
        tokens,
    };

    match cli.command {
        Command::Signals(args) => signals_command(&mut app, &args.search).await,
        Command::Watch(args) => watch_command(&mut app, &args.search).await,
        Command::Status { watch } => status_command(&app, watch).await,
        Command::Accuracy => accuracy_command(&app).await,
        Command::Export { search, out } => export_command(&mut app, &search.search, &out).await,
        Command::Buy { token, name } => buy_command(&app, &token, name).await,
        Command::Sell { token } => sell_command(&app, &token).await,
        Command::Zone { action } => zone_command(&mut app, action).await,
        Command::Sort { action } => sort_command(&mut app, action),
    }
}

/// `RUST_LOG` wins; otherwise the config level, raised by the flags.
fn init_logging(config_level: &str, verbose: bool, debug: bool) {
    let level = if debug {
        "trace"
    } else if verbose {
        "debug"
    } else {
        config_level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Seed the display zone from geolocation the first time round.
async fn ensure_zone(app: &mut App) {
    if app.session.has_country() {
        return;
    }
    match app.client.fetch_location().await {
        Ok(Some(location)) => {
            if let Err(e) = app.session.seed_from_location(&location) {
                tracing::warn!(error = %e, "could not save detected country");
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "location lookup failed, using default zone"),
    }
}

async fn fetch_rows(app: &App, search: &str) -> Result<Vec<SignalRow>> {
    let signals = app.client.fetch_signals().await?;
    Ok(prepare(signals, search, &app.tokens, app.session.zone()))
}

async fn signals_command(app: &mut App, search: &str) -> Result<()> {
    ensure_zone(app).await;
    let zone = app.session.zone();
    println!("{}", clock_line(Utc::now(), zone, app.session.settings().country_name()));

    let mut rows = match fetch_rows(app, search).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "signal fetch failed");
            println!("{}", dexbot_signals::present::FETCH_FAILED);
            return Ok(());
        }
    };
    let table = signal_table();
    let sorting = table.valid_sorting(&app.session.settings().table_sorting);
    table.sort(&mut rows, &sorting);

    println!("{}\n", summary_line(&SignalSummary::from_rows(&rows)));
    print!("{}", table.render(&rows, &sorting));
    Ok(())
}

async fn watch_command(app: &mut App, search: &str) -> Result<()> {
    ensure_zone(app).await;
    let polling = app.cfg.polling.clone();

    let (tx, mut rx) = mpsc::channel::<Event>(100);
    clock::spawn_shutdown(tx.clone());
    clock::spawn(tx.clone());
    feeds::spawn_contract_status(
        app.client.clone(),
        Duration::from_secs(polling.contract_status_secs),
        tx.clone(),
    );
    feeds::spawn_accuracy(
        app.client.clone(),
        Duration::from_secs(polling.accuracy_secs),
        tx.clone(),
    );
    feeds::fetch_signals_once(app.client.clone(), tx.clone());

    let mut dashboard = Dashboard::new(
        app.tokens.clone(),
        app.session.zone(),
        app.session.settings().country_name(),
        search,
        app.session.settings().table_sorting.clone(),
        polling.signals_refresh_secs,
    );

    tracing::info!("dashboard running, ctrl+c to quit");
    while let Some(event) = rx.recv().await {
        let redraw = matches!(event, Event::Tick | Event::Signals(_));
        tracing::trace!(event = event.name(), "event");
        match dashboard.apply(event) {
            Control::Quit => break,
            Control::Refetch => {
                feeds::fetch_signals_once(app.client.clone(), tx.clone());
            }
            Control::Continue => {}
        }
        if redraw {
            print!("{CLEAR_SCREEN}{}", dashboard.render(Utc::now()));
        }
    }
    println!("Shutting down...");
    Ok(())
}

async fn status_command(app: &App, watch: bool) -> Result<()> {
    let zone = app.session.zone();
    let table = contract_table();

    if !watch {
        let events = app.client.fetch_contract_status().await?;
        print!("{}", table.render(&ContractRow::from_events(events, zone), &[]));
        return Ok(());
    }

    let (tx, mut rx) = mpsc::channel::<Event>(16);
    clock::spawn_shutdown(tx.clone());
    feeds::spawn_contract_status(
        app.client.clone(),
        Duration::from_secs(app.cfg.polling.contract_status_secs),
        tx,
    );
    while let Some(event) = rx.recv().await {
        match event {
            Event::ContractStatus(Ok(events)) => {
                let rows = ContractRow::from_events(events, zone);
                print!("{CLEAR_SCREEN}{}", table.render(&rows, &[]));
            }
            Event::ContractStatus(Err(_)) => {
                print!("{CLEAR_SCREEN}{}", table.render(&[], &[]));
            }
            Event::Shutdown => break,
            _ => {}
        }
    }
    Ok(())
}

async fn accuracy_command(app: &App) -> Result<()> {
    let stats = app.client.fetch_accuracy().await?;
    println!("{}", stats.line());
    Ok(())
}

async fn export_command(app: &mut App, search: &str, out: &Path) -> Result<()> {
    ensure_zone(app).await;
    let rows = fetch_rows(app, search).await?;
    let sheet = build_export(&rows);
    let path = write_xlsx(&sheet, out)?;
    println!("Exported {} rows to {}", sheet.rows.len(), path.display());
    Ok(())
}

async fn connect_wallet(app: &App) -> Result<(EvmTradingBot, TradeSettings), TradeError> {
    let key = std::env::var(PRIVATE_KEY_ENV).ok();
    let bot = EvmTradingBot::connect(&app.cfg.chain, key.as_deref()).await?;
    let settings = TradeSettings::from_chain(&app.cfg.chain).map_err(|source| TradeError::Step {
        stage: FlowStage::WalletConnect,
        source,
    })?;
    Ok((bot, settings))
}

fn report_trade_error(side: &str, e: &TradeError) -> anyhow::Error {
    tracing::error!(side, error = %e, "trade failed");
    anyhow!(e.user_message())
}

async fn buy_command(app: &App, token: &str, name: String) -> Result<()> {
    let token_address = token
        .parse::<Address>()
        .with_context(|| format!("{token} is not a token address"))?;
    let (bot, settings) = connect_wallet(app)
        .await
        .map_err(|e| report_trade_error("buy", &e))?;

    let req = BuyRequest {
        token_name: name,
        token_address,
    };
    let status = &app.session.status;
    run_buy(&bot, &settings, status, &req)
        .await
        .map_err(|e| report_trade_error("buy", &e))?;

    let s = status.snapshot();
    println!("Token bought successfully!");
    println!("  token:   {} ({})", s.token_name, s.token_address);
    println!("  balance: {}", s.user_balance);
    println!("  price:   {}", s.price_bought);
    println!("  tx:      {}", s.tx_hash);
    Ok(())
}

async fn sell_command(app: &App, token: &str) -> Result<()> {
    let token_address = token
        .parse::<Address>()
        .with_context(|| format!("{token} is not a token address"))?;
    let (bot, settings) = connect_wallet(app)
        .await
        .map_err(|e| report_trade_error("sell", &e))?;

    let status = &app.session.status;
    run_sell(&bot, &settings, status, &SellRequest { token_address })
        .await
        .map_err(|e| report_trade_error("sell", &e))?;

    println!("Token sold successfully!");
    println!("  tx: {}", status.snapshot().tx_hash);
    Ok(())
}

async fn zone_command(app: &mut App, action: ZoneAction) -> Result<()> {
    match action {
        ZoneAction::Show => {}
        ZoneAction::Set { id, timezone } => {
            let country = countries::choose(&id, timezone.as_deref())?;
            app.session.select_country(country)?;
        }
        ZoneAction::Clear => app.session.clear_country()?,
        ZoneAction::Detect => {
            let location = app
                .client
                .fetch_location()
                .await?
                .ok_or_else(|| anyhow!("location service could not place this host"))?;
            app.session.select_country(SelectedCountry {
                id: location.country_code,
                name: location.country,
                timezone: Some(location.timezone),
            })?;
        }
    }
    let settings = app.session.settings();
    println!(
        "{}",
        clock_line(Utc::now(), app.session.zone(), settings.country_name())
    );
    Ok(())
}

fn sort_command(app: &mut App, action: SortAction) -> Result<()> {
    let sorting = match action {
        SortAction::Clear => Vec::new(),
        SortAction::Set { columns } => {
            let mut specs = Vec::with_capacity(columns.len());
            for arg in &columns {
                match parse_sort_arg(arg) {
                    Some(spec) => specs.push(spec),
                    None => bail!("bad sort column {arg:?}, expected `id` or `id:desc`"),
                }
            }
            let valid = signal_table().valid_sorting(&specs);
            if valid.len() != specs.len() {
                tracing::warn!(
                    dropped = specs.len() - valid.len(),
                    "ignoring unknown or unsortable columns"
                );
            }
            valid
        }
    };
    app.session.set_sorting(sorting.clone())?;
    if sorting.is_empty() {
        println!("Sorting cleared");
    } else {
        let shown: Vec<String> = sorting
            .iter()
            .map(|s| format!("{}{}", s.id, if s.desc { " (desc)" } else { "" }))
            .collect();
        println!("Sorting by {}", shown.join(", "));
    }
    Ok(())
}

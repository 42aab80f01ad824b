use activity::{ActivityLog, FeedStatus};
use anyhow::Context;
use api_client::{create_feed, PriceFeed, SyntheticFeed};
use clap::{Parser, Subcommand};
use configuration::{init_tracing, load_settings, BotConfig, FeedSource, Settings};
use control::Command;
use engine::{seed_market, ExecutionEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;
use report::{history_table, positions_table, Summary};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

mod activity;
mod control;
mod report;

/// Seed used by `simulate` when neither the CLI nor the settings provide one.
const DEFAULT_SIMULATION_SEED: u64 = 42;
/// How often, in ticks, `run` prints an account status line.
const STATUS_EVERY_TICKS: u64 = 30;

/// The main entry point for the Harmonic simulated trading bot.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load HARMONIC__* overrides from a .env file, if one exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref()).context("Failed to load settings")?;
    let _log_guard = init_tracing(&settings.logging).context("Failed to initialise logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Run(args) => handle_run(settings, args).await,
        Commands::Simulate(args) => handle_simulate(settings, args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A simulated harmonic-pattern trading bot. No real orders are ever placed.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file. Defaults to ./config.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine in real time against a price feed until Ctrl-C.
    ///
    /// While running, type `start`, `stop`, `strategy <gartley|butterfly|bat>`,
    /// `panic` or `status` followed by Enter.
    Run(RunArgs),
    /// Run a fast, fully offline simulation and print a report.
    Simulate(SimulateArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Start with the strategy engine switched on.
    #[arg(long)]
    start: bool,

    /// Override the configured price feed.
    #[arg(long, value_enum)]
    feed: Option<FeedSource>,
}

#[derive(Parser)]
struct SimulateArgs {
    /// Number of engine ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seed for the market, the feed and the pattern scanner.
    #[arg(long)]
    seed: Option<u64>,

    /// Starting balance in USDT. Defaults to the configured initial balance.
    #[arg(long)]
    start_balance: Option<Decimal>,

    /// Feed update cadence, in ticks.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    feed_every: u64,

    /// Print the final snapshot as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

/// Real-time loop. The tick timer, the feed timer and console commands share one
/// task, so neither a feed update nor a command can land in the middle of a tick.
async fn handle_run(mut settings: Settings, args: RunArgs) -> anyhow::Result<()> {
    if let Some(source) = args.feed {
        settings.feed.source = source;
    }
    let mut config = settings.bot.with_running(settings.bot.is_running || args.start);
    let starting_balance = settings.engine.initial_balance;
    let universe = settings.feed.symbols.clone();

    let market = seed_market(&universe, &mut rng_from(settings.engine.rng_seed));
    let feed = create_feed(&settings.feed, &market, settings.engine.rng_seed)
        .context("Failed to create the price feed")?;
    let mut engine =
        ExecutionEngine::with_seed(market, starting_balance, config.clone(), settings.engine.rng_seed);
    let mut activity = ActivityLog::new(settings.logging.max_log_window);
    let mut feed_status = FeedStatus::Connecting;

    tracing::info!(
        feed = feed.name(),
        symbols = universe.len(),
        running = config.is_running,
        strategy = %config.strategy,
        "Harmonic bot started. Press Ctrl-C for an emergency stop."
    );
    tracing::info!(strategy = %config.strategy, "{}", config.strategy.description());

    let mut tick_timer = tokio::time::interval(Duration::from_millis(settings.engine.tick_interval_ms));
    tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut feed_timer = tokio::time::interval(Duration::from_millis(settings.feed.poll_interval_ms));
    feed_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut commands = control::spawn_stdin_reader();
    let mut console_open = true;

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C, stopping.");
                }
                break;
            }
            line = commands.recv(), if console_open => {
                match line {
                    Some(line) => apply_command(&line, &mut config, &mut engine, &mut activity),
                    None => {
                        tracing::debug!("Console closed; only Ctrl-C can stop the bot now.");
                        console_open = false;
                    }
                }
            }
            _ = feed_timer.tick() => {
                let status = poll_feed(feed.as_ref(), &universe, &mut engine).await;
                if let Some(status) = status {
                    if status != feed_status {
                        tracing::info!(feed = feed.name(), %status, "Feed status changed.");
                    }
                    if let Some(entry) = feed_status.transition_log(status, feed.name()) {
                        activity.record(entry);
                    }
                    feed_status = status;
                }
            }
            _ = tick_timer.tick() => {
                engine.update_config(config.clone());
                let snapshot = engine.tick();
                activity.record_all(snapshot.logs.iter().cloned());
                ticks += 1;
                if ticks % STATUS_EVERY_TICKS == 0 {
                    tracing::info!(
                        ticks,
                        balance = %snapshot.balance,
                        equity = %snapshot.equity().round_dp(2),
                        open = snapshot.positions.len(),
                        closed = snapshot.history.len(),
                        feed = %feed_status,
                        "Status."
                    );
                }
            }
        }
    }

    // Emergency stop: switch the strategy off first, then flatten the book.
    config = config.with_running(false);
    engine.update_config(config);
    activity.record(engine.close_all_positions());

    print_report(starting_balance, &engine, Some(&activity));
    Ok(())
}

/// Applies one console line between ticks. Bad input is reported and ignored.
fn apply_command(line: &str, config: &mut BotConfig, engine: &mut ExecutionEngine, activity: &mut ActivityLog) {
    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!(input = line, "{}", e);
            return;
        }
    };
    tracing::info!(?command, "Console command received.");

    if let Some((next, entry)) = command.reconfigure(config) {
        *config = next;
        engine.update_config(config.clone());
        activity.record(entry);
    }
    match command {
        Command::Panic => activity.record(engine.close_all_positions()),
        Command::Status => {
            let snapshot = engine.snapshot();
            tracing::info!(
                running = config.is_running,
                strategy = %config.strategy,
                balance = %snapshot.balance,
                equity = %snapshot.equity().round_dp(2),
                open = snapshot.positions.len(),
                closed = snapshot.history.len(),
                "Status."
            );
        }
        _ => {}
    }
}

/// Pulls one feed reading into the engine. A failed or empty read leaves the
/// engine on its last prices. Returns the observed status, if any.
async fn poll_feed(
    feed: &dyn PriceFeed,
    universe: &[String],
    engine: &mut ExecutionEngine,
) -> Option<FeedStatus> {
    match feed.fetch_tickers(universe).await {
        Ok(tickers) if tickers.is_empty() => {
            tracing::warn!(feed = feed.name(), "Feed returned no usable tickers; keeping last prices.");
            None
        }
        Ok(tickers) => {
            engine.set_market_data(tickers);
            Some(FeedStatus::Connected)
        }
        Err(e) => {
            tracing::warn!(feed = feed.name(), error = %e, "Feed update failed; keeping last prices.");
            Some(FeedStatus::Error)
        }
    }
}

// ==============================================================================
// Simulate Command Logic
// ==============================================================================

async fn handle_simulate(settings: Settings, args: SimulateArgs) -> anyhow::Result<()> {
    let seed = args.seed.or(settings.engine.rng_seed).unwrap_or(DEFAULT_SIMULATION_SEED);
    let starting_balance = args.start_balance.unwrap_or(settings.engine.initial_balance);
    if starting_balance.is_sign_negative() {
        anyhow::bail!("--start-balance cannot be negative, got {}", starting_balance);
    }
    let universe = settings.feed.symbols.clone();
    let config = settings.bot.with_running(true);

    let market = seed_market(&universe, &mut rng_from(Some(seed)));
    let feed = SyntheticFeed::from_market(&market, Some(seed.wrapping_add(1)));
    let mut engine = ExecutionEngine::with_seed(market, starting_balance, config, Some(seed));
    let mut activity = ActivityLog::new(settings.logging.max_log_window);

    tracing::info!(ticks = args.ticks, seed, balance = %starting_balance, "Starting offline simulation.");

    for tick in 1..=args.ticks {
        if tick % args.feed_every == 0 {
            // The synthetic feed never fails.
            poll_feed(&feed, &universe, &mut engine).await;
        }
        let snapshot = engine.tick();
        activity.record_all(snapshot.logs);
    }

    if args.json {
        activity.record(engine.close_all_positions());
        let mut snapshot = engine.snapshot();
        snapshot.logs = activity.entries().cloned().collect();
        println!("{}", snapshot.to_json().context("Failed to serialise the final snapshot")?);
        return Ok(());
    }

    println!("\nOpen positions after {} ticks", args.ticks);
    println!("{}", positions_table(engine.positions()));
    activity.record(engine.close_all_positions());
    print_report(starting_balance, &engine, Some(&activity));
    Ok(())
}

// ==============================================================================
// Reporting
// ==============================================================================

fn print_report(starting_balance: Decimal, engine: &ExecutionEngine, activity: Option<&ActivityLog>) {
    let snapshot = engine.snapshot();
    println!("\nTrade history (newest first)");
    println!("{}", history_table(&snapshot.history));
    println!("\nSummary");
    println!("{}", Summary::from_snapshot(starting_balance, &snapshot).to_table());
    if let Some(activity) = activity {
        println!("\nRecent activity");
        for entry in activity.entries() {
            println!("{}", entry);
        }
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

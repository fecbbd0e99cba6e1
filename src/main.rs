//! Liquidity Pool Simulator CLI
//!
//! Command-line front end for the constant-product pool simulator.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lp_simulator::{
    analytics::logger::{print_summary, SimulationLogger},
    config::{defaults, PoolConfig},
    simulation::{
        orchestrator::QuickConfig, Orchestrator, SessionResults, SessionScript, SimulatedPool,
        TradeIntent,
    },
};

#[derive(Parser)]
#[command(name = "lp-sim")]
#[command(author = "SecureLiquidPool Team")]
#[command(version = "0.1.0")]
#[command(about = "Constant-Product Liquidity Pool Simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session
    Run {
        /// JSON session script
        #[arg(short, long)]
        script: PathBuf,

        /// JSON pool config, overrides the script's config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for results
        #[arg(short, long, default_value = "output")]
        output: String,

        /// Print the summary only
        #[arg(long)]
        no_save: bool,
    },

    /// Run random trade batches against a pool
    Quick {
        /// Number of batches
        #[arg(short, long, default_value = "10")]
        batches: u32,

        /// Trades per batch
        #[arg(short, long, default_value = "3")]
        trades_per_batch: u32,

        /// Minimum trade size in token1
        #[arg(long, default_value = "0.01")]
        min_amount: f64,

        /// Maximum trade size in token1
        #[arg(long, default_value = "0.5")]
        max_amount: f64,

        /// JSON pool config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Preview a single trade
    Quote {
        #[arg(short, long, value_enum)]
        kind: QuoteKind,

        /// Input amount (token1 for buy, token2 for sell)
        #[arg(short, long)]
        amount: f64,

        /// JSON pool config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the summary of saved session results
    Report {
        /// Input JSON file with session results
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print configuration info
    Info,
}

#[derive(Clone, Copy, ValueEnum)]
enum QuoteKind {
    Buy,
    Sell,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            script,
            config,
            output,
            no_save,
        } => {
            let results = run_session(&script, config.as_deref())?;
            print_summary(&results);

            if !no_save {
                let logger = SimulationLogger::new(&output);
                let json_path = logger.save_results(&results)?;
                logger.save_summary(&results)?;

                println!();
                println!("📁 Results saved to: {}", json_path);
                println!();
            }
        }

        Commands::Quick {
            batches,
            trades_per_batch,
            min_amount,
            max_amount,
            config,
        } => {
            let quick = QuickConfig {
                batches,
                trades_per_batch,
                min_amount,
                max_amount,
            };
            let results = Orchestrator::new(load_config(config.as_deref())?)?.run_quick(&quick);
            print_summary(&results);
        }

        Commands::Quote { kind, amount, config } => {
            print_quote(kind, amount, config.as_deref())?;
        }

        Commands::Report { input } => {
            info!("Loading results from: {:?}", input);
            let results = SimulationLogger::load_results(&input)?;
            print_summary(&results);
        }

        Commands::Info => {
            print_info();
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PoolConfig> {
    match path {
        Some(path) => PoolConfig::load(path),
        None => Ok(PoolConfig::default()),
    }
}

fn run_session(script_path: &Path, config_path: Option<&Path>) -> Result<SessionResults> {
    let script = SessionScript::load(script_path)?;

    let config = match config_path {
        Some(path) => PoolConfig::load(path)?,
        None => script.config.clone().unwrap_or_default(),
    };

    info!("Configuration:");
    info!("  Pair:            {}/{}", config.token1_symbol, config.token2_symbol);
    info!("  Reserves:        {} / {}", config.token1_reserve, config.token2_reserve);
    info!("  Reference Price: ${}", config.token1_price);
    info!("  Total Supply:    {}", config.token2_total_supply);

    let orchestrator = Orchestrator::new(config).context("Cannot start session")?;
    Ok(orchestrator.run(&script.steps))
}

fn print_quote(kind: QuoteKind, amount: f64, config_path: Option<&Path>) -> Result<()> {
    let pool = SimulatedPool::new(load_config(config_path)?)?;
    let state = pool.current();

    let intent = match kind {
        QuoteKind::Buy => TradeIntent::buy(amount),
        QuoteKind::Sell => TradeIntent::sell(amount),
    };
    let (input_token, output_token) = match kind {
        QuoteKind::Buy => (&state.token1_symbol, &state.token2_symbol),
        QuoteKind::Sell => (&state.token2_symbol, &state.token1_symbol),
    };

    if let QuoteKind::Sell = kind {
        if let Err(err) = state.validate_token2_amount(amount, lp_simulator::utils::Token2Operation::Sell) {
            println!("⚠ {}", err);
        }
    }

    let quote = pool.quote_trade(intent);

    println!();
    println!("  Input:          {:.4} {}", amount, input_token);
    println!("  Output:         {:.4} {}", quote.output_amount, output_token);
    println!("  Price Impact:   {:.2}%", quote.price_impact);
    println!("  Rate:           1 {} = {:.4} {}", input_token, quote.effective_rate, output_token);
    println!(
        "  Pool Rate:      1 {} = {:.2} {}",
        state.token1_symbol,
        state.current_price(),
        state.token2_symbol
    );
    println!();

    Ok(())
}

fn print_info() {
    println!();
    println!("══════════════════════════════════════════════════════════════");
    println!("  Liquidity Pool Simulator - Info");
    println!("══════════════════════════════════════════════════════════════");
    println!();
    println!("Zero-fee constant-product pool: x * y = k.");
    println!();
    println!("DEFAULT POOL:");
    println!("  {} reserve:      {}", defaults::TOKEN1_SYMBOL, defaults::TOKEN1_RESERVE);
    println!("  {} reserve:     {}", defaults::TOKEN2_SYMBOL, defaults::TOKEN2_RESERVE);
    println!("  {} price:        ${}", defaults::TOKEN1_SYMBOL, defaults::TOKEN1_PRICE);
    println!("  {} supply:      {}", defaults::TOKEN2_SYMBOL, defaults::TOKEN2_TOTAL_SUPPLY);
    println!();
    println!("FORMULAS:");
    println!("  output       = out_reserve - k / (in_reserve + amount)");
    println!("  price        = token2_reserve / token1_reserve");
    println!("  price (USD)  = token1_price / price");
    println!();
    println!("USAGE:");
    println!("  lp-sim run --script session.json     # Run a scripted session");
    println!("  lp-sim quick --batches 20            # Random trade batches");
    println!("  lp-sim quote --kind buy --amount 1   # Preview a trade");
    println!("  lp-sim report -i results.json        # Re-print saved results");
    println!();
}

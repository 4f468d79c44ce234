//! Command line interface of the CLMM autopilot.
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use clmm_autopilot_data::Database;
use clmm_autopilot_execution::config::AutomatorConfig;
use clmm_autopilot_execution::context::AutomatorContext;
use clmm_autopilot_execution::lifecycle::{CycleReport, PipelineReport};
use clmm_autopilot_execution::report;
use clmm_autopilot_execution::scheduler::Automator;
use clmm_autopilot_protocols::cache::{Clock, SystemClock};
use clmm_autopilot_protocols::coingecko::{CoinGeckoOracle, DEFAULT_PRICE_API_URL};
use clmm_autopilot_protocols::jupiter::{
    DEFAULT_SWAP_API_URL, DEFAULT_TOKEN_LIST_URL, JupiterAggregator, JupiterTokenRegistry,
};
use clmm_autopilot_protocols::orca::WhirlpoolClient;
use clmm_autopilot_protocols::rpc::{RpcProvider, RpcTokenAccounts, WalletSubmitter};
use clmm_autopilot_protocols::{TokenRegistry, TransactionSubmitter};
use dotenv::dotenv;
use prettytable::{Table, format, row};
use solana_sdk::signature::read_keypair_file;
use solana_sdk::signer::Signer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clmm-autopilot")]
#[command(about = "Automated liquidity provisioning for Orca Whirlpools", long_about = None)]
struct Cli {
    /// Path to the TOML configuration
    #[arg(short, long, env = "CONFIG_PATH", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one cycle over every configured position
    Run,
    /// Run cycles until interrupted
    Work,
    /// Print the state of every configured position
    State,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AutomatorConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let ctx = build_context(&config).await?;
    let automator = Automator::new(ctx, config);

    match cli.command {
        Commands::Run => {
            let report = automator.run_cycle().await;
            report::log_cycle(&report);
            print_states(&report);
        }
        Commands::Work => {
            automator
                .work(async {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Interrupted, finishing the current cycle");
                })
                .await;
        }
        Commands::State => {
            let report = automator.inspect().await;
            print_states(&report);
        }
    }

    Ok(())
}

/// Wires the Solana, Orca, Jupiter, CoinGecko and PostgreSQL adapters.
async fn build_context(config: &AutomatorConfig) -> Result<Arc<AutomatorContext>> {
    let rpc_url = config.require_rpc_url()?;
    let wallet_path = config.require_wallet_path()?;
    let database_url = config.require_database_url()?;

    let keypair = read_keypair_file(wallet_path)
        .map_err(|err| anyhow!("reading keypair {wallet_path}: {err}"))?;
    let wallet = keypair.pubkey();
    info!(%wallet, rpc = rpc_url, "Loaded wallet");

    let database = Database::connect(database_url)
        .await
        .context("connecting to the database")?;
    database
        .migrate()
        .await
        .context("running database migrations")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ttl = config.token_cache_ttl();
    let provider = Arc::new(RpcProvider::new(rpc_url));
    let submitter: Arc<dyn TransactionSubmitter> =
        Arc::new(WalletSubmitter::new(provider.clone(), Arc::new(keypair)));
    let tokens: Arc<dyn TokenRegistry> = Arc::new(JupiterTokenRegistry::new(
        config.token_list_url.as_deref().unwrap_or(DEFAULT_TOKEN_LIST_URL),
        ttl,
        clock.clone(),
    ));
    let prices = Arc::new(CoinGeckoOracle::new(
        config.price_api_url.as_deref().unwrap_or(DEFAULT_PRICE_API_URL),
        tokens.clone(),
        ttl,
        clock.clone(),
    ));
    let swaps = Arc::new(JupiterAggregator::new(
        config.swap_api_url.as_deref().unwrap_or(DEFAULT_SWAP_API_URL),
        config.swap_slippage_bps,
    ));

    Ok(Arc::new(AutomatorContext {
        pools: Arc::new(WhirlpoolClient::new(provider.clone(), wallet)),
        token_accounts: Arc::new(RpcTokenAccounts::new(provider, submitter.clone())),
        submitter,
        prices,
        tokens,
        swaps,
        store: Arc::new(database.positions()),
        clock,
        settings: config.settings(),
    }))
}

fn print_states(report: &CycleReport) {
    for pipeline in &report.pipelines {
        print_state(pipeline);
    }
}

fn print_state(pipeline: &PipelineReport) {
    let tokens = pipeline.tokens.as_deref().unwrap_or("?");
    match &pipeline.state {
        Ok(Some(state)) => {
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
            table.set_titles(row!["field", "value"]);
            for (label, value) in state.rows() {
                table.add_row(row![r->label, value]);
            }
            table.printstd();
        }
        Ok(None) => println!("{tokens} ({}): no open position", pipeline.pool),
        Err(err) => println!("{tokens} ({}): {err}", pipeline.pool),
    }
}

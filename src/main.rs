use analytics::{AnalyticsEngine, PerformanceReport, load_equity_curve};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{Config, SimulationOverrides};
use core_types::{RiskInputs, RiskOutputs};
use indicatif::{ProgressBar, ProgressStyle};
use simulator::{DistributionSummary, MonteCarloSimulator};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// The main entry point for the RiskDesk application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load RUST_LOG and RISKDESK__* overrides from a .env file, if present.
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let cli = Cli::parse();
    let config = configuration::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Estimate(args) => handle_estimate(args),
        Commands::Simulate(args) => handle_simulate(args, config).await,
    }
}

/// Logs to stderr and to a daily-rolling file under `logs/`.
fn init_tracing() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", "riskdesk.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    guard
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Trading-account drawdown simulation and ruin-risk estimation.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard HTTP/WebSocket server.
    Serve(ServeArgs),
    /// Estimate ruin risk for a given drawdown population.
    Estimate(EstimateArgs),
    /// Simulate drawdowns from an equity-curve export and estimate ruin risk.
    Simulate(SimulateArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to listen on, overriding `[server]` in the config (e.g., "127.0.0.1:8080").
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[derive(Parser)]
struct EstimateArgs {
    /// Fraction of the recommended capital you are willing to lose (e.g., 0.1).
    #[arg(long)]
    accepted_risk: f64,

    /// Worst simulated drawdown, in account currency (e.g., -1000).
    #[arg(long, allow_negative_numbers = true)]
    max_drawdown: f64,

    /// Average simulated drawdown, in account currency.
    #[arg(long, allow_negative_numbers = true)]
    avg_drawdown: f64,

    /// Average monthly result, in account currency.
    #[arg(long, allow_negative_numbers = true)]
    avg_monthly_return: f64,

    /// File with one drawdown sample per line.
    #[arg(long)]
    samples: Option<PathBuf>,
}

#[derive(Parser)]
struct SimulateArgs {
    /// CSV export with `timestamp,equity` columns.
    #[arg(long)]
    equity: PathBuf,

    /// Fraction of the recommended capital you are willing to lose.
    /// Defaults to `risk.default_accepted_risk`.
    #[arg(long)]
    accepted_risk: Option<f64>,

    #[command(flatten)]
    overrides: SimulationOverrides,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(addr) = args.addr {
        config.server.host = addr.ip().to_string();
        config.server.port = addr.port();
    }
    web_server::run_server(config).await
}

fn handle_estimate(args: EstimateArgs) -> anyhow::Result<()> {
    let samples = match &args.samples {
        Some(path) => read_samples(path)?,
        None => Vec::new(),
    };
    let inputs = RiskInputs {
        accepted_risk: args.accepted_risk,
        max_drawdown: args.max_drawdown,
        avg_drawdown: args.avg_drawdown,
        avg_monthly_return: args.avg_monthly_return,
    };
    risk::validate_request(&inputs, &samples)?;

    let outputs = risk::estimate_ruin(&inputs, &samples);
    println!("{}", risk_table(&outputs, samples.len()));
    Ok(())
}

async fn handle_simulate(args: SimulateArgs, config: Config) -> anyhow::Result<()> {
    let accepted_risk = args.accepted_risk.unwrap_or(config.risk.default_accepted_risk);
    if !accepted_risk.is_finite() {
        bail!("--accepted-risk must be a finite number");
    }

    let curve = load_equity_curve(&args.equity)
        .with_context(|| format!("failed to load {}", args.equity.display()))?;
    tracing::info!(points = curve.len(), "Loaded equity curve.");
    let report = AnalyticsEngine::new().calculate(&curve)?;
    println!("{}", history_table(&report));

    let settings = config.simulation.with_overrides(&args.overrides);
    let simulator = MonteCarloSimulator::new(settings)?;
    let history = report.monthly_results_f64()?;

    let progress_bar = ProgressBar::new(simulator.settings().runs as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message("Simulating paths...");

    let pb = progress_bar.clone();
    let distribution =
        tokio::task::spawn_blocking(move || simulator.run_with_progress(&history, Some(&pb))).await??;
    progress_bar.finish_with_message("Simulation complete!");

    let outputs = risk::estimate_ruin(&distribution.risk_inputs(accepted_risk), &distribution.samples);

    println!("{}", distribution_table(&distribution.summary()));
    println!("Accepted risk: {:.2}%", accepted_risk * 100.0);
    println!("{}", risk_table(&outputs, distribution.samples.len()));
    Ok(())
}

/// Reads one number per line, ignoring blank lines.
fn read_samples(path: &Path) -> anyhow::Result<Vec<f64>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.trim()
                .parse::<f64>()
                .with_context(|| format!("{}:{}: invalid drawdown sample '{}'", path.display(), i + 1, line.trim()))
        })
        .collect()
}

fn history_table(report: &PerformanceReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Historical metric", "Value"]);
    table.add_row(vec!["Net profit".to_string(), report.total_net_profit.round_dp(2).to_string()]);
    table.add_row(vec![
        "Total return %".to_string(),
        report
            .total_return_pct
            .map(|v| v.round_dp(2).to_string())
            .unwrap_or_else(|| "n/a".to_string()),
    ]);
    table.add_row(vec!["Max drawdown".to_string(), report.max_drawdown.round_dp(2).to_string()]);
    table.add_row(vec!["Max drawdown %".to_string(), report.max_drawdown_pct.round_dp(2).to_string()]);
    table.add_row(vec!["Avg drawdown".to_string(), report.avg_drawdown.round_dp(2).to_string()]);
    table.add_row(vec!["Drawdown episodes".to_string(), report.drawdown_episodes.to_string()]);
    table.add_row(vec!["Months".to_string(), report.monthly_results.len().to_string()]);
    table.add_row(vec![
        "Winning / losing months".to_string(),
        format!("{} / {}", report.winning_months, report.losing_months),
    ]);
    table.add_row(vec!["Avg monthly result".to_string(), report.avg_monthly_return.round_dp(2).to_string()]);
    table
}

fn distribution_table(summary: &DistributionSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Simulated drawdowns", "Value"]);
    table.add_row(vec!["Runs".to_string(), summary.runs.to_string()]);
    table.add_row(vec!["Horizon (months)".to_string(), summary.horizon_months.to_string()]);
    table.add_row(vec!["Seed".to_string(), summary.seed.to_string()]);
    table.add_row(vec!["Worst".to_string(), format!("{:.2}", summary.max_drawdown)]);
    table.add_row(vec!["Average".to_string(), format!("{:.2}", summary.avg_drawdown)]);
    table.add_row(vec!["5th percentile".to_string(), format!("{:.2}", summary.percentile_5)]);
    table.add_row(vec!["Median".to_string(), format!("{:.2}", summary.median)]);
    table.add_row(vec!["95th percentile".to_string(), format!("{:.2}", summary.percentile_95)]);
    table
}

fn risk_table(outputs: &RiskOutputs, sample_count: usize) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Risk estimate", "Value"]);
    table.add_row(vec!["Recommended capital".to_string(), outputs.recommended_capital.to_string()]);
    table.add_row(vec![
        "Est. monthly return %".to_string(),
        format!("{:.2}", outputs.estimated_monthly_return),
    ]);
    table.add_row(vec!["Est. ruin risk %".to_string(), format!("{:.2}", outputs.estimated_ruin_risk)]);
    table.add_row(vec![
        "Ruin occurrences".to_string(),
        format!("{} of {}", outputs.ruin_occurrences, sample_count),
    ]);
    table
}

//! `fonda`: fundamental health screen and intrinsic valuation of a listed company.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use fonda::{
    CompanySnapshot, FondaError, FundamentalAnalyzer, PeriodType, ProviderRegistry, Result,
    StaticProvider, ValuationConfig,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod report;

use report::TextReport;

/// Fundamental health screen and intrinsic valuation of a listed company.
#[derive(Parser, Debug)]
#[command(name = "fonda", version, about)]
struct Args {
    /// Ticker or company name; defaults to the symbol of --snapshot
    query: Option<String>,

    /// Peer tickers or company names, comma-separated
    #[arg(long, value_delimiter = ',')]
    peers: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Analyze a JSON snapshot file instead of fetching from Yahoo Finance
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Peer snapshot file (repeatable)
    #[arg(long = "peer-snapshot", value_name = "FILE")]
    peer_snapshots: Vec<PathBuf>,

    /// Valuation parameters as a JSON file
    #[arg(long, env = "FONDA_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use quarterly instead of annual statements
    #[arg(long)]
    quarterly: bool,

    /// Risk-free rate, as a decimal
    #[arg(long, value_name = "RATE")]
    risk_free_rate: Option<f64>,

    /// Perpetual growth rate after the forecast, as a decimal
    #[arg(long, value_name = "RATE")]
    terminal_growth: Option<f64>,

    /// Discount applied to the fair value to get the entry price
    #[arg(long, value_name = "FRACTION")]
    margin_of_safety: Option<f64>,

    /// Discount rate to use instead of the WACC estimate
    #[arg(long, value_name = "RATE")]
    wacc: Option<f64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: &Args) -> Result<String> {
    let config = load_config(args)?;
    let main_snapshot = args
        .snapshot
        .as_ref()
        .map(CompanySnapshot::from_json_file)
        .transpose()?;

    let query = match (&args.query, &main_snapshot) {
        (Some(query), _) => query.clone(),
        (None, Some(snapshot)) => snapshot.symbol.to_string(),
        (None, None) => {
            return Err(FondaError::InvalidParameter(
                "a query or --snapshot is required".to_string(),
            ));
        }
    };

    let mut peers: Vec<String> = args
        .peers
        .iter()
        .map(|peer| peer.trim().to_string())
        .filter(|peer| !peer.is_empty())
        .collect();

    let mut offline = StaticProvider::new();
    for path in &args.peer_snapshots {
        let peer = CompanySnapshot::from_json_file(path)?;
        peers.push(peer.symbol.to_string());
        offline.insert(peer);
    }

    let fetch_online = main_snapshot.is_none();
    if let Some(snapshot) = main_snapshot {
        offline.insert(snapshot);
    }

    let mut registry = ProviderRegistry::new();
    if !offline.is_empty() {
        registry.register_snapshot(Arc::new(offline));
    }
    if fetch_online {
        let period = if args.quarterly {
            PeriodType::Quarterly
        } else {
            PeriodType::Annual
        };
        registry = registry.with_yahoo(period);
    }
    debug!(?registry, query = %query, peers = ?peers, "Starting analysis");

    let report = FundamentalAnalyzer::new(registry)
        .with_config(config)
        .analyze(&query, &peers)
        .await?;

    if args.json {
        serde_json::to_string_pretty(&report).map_err(|e| FondaError::Other(e.to_string()))
    } else {
        Ok(TextReport(&report).to_string())
    }
}

/// Defaults, then the config file, then the individual flags.
fn load_config(args: &Args) -> Result<ValuationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "Loading valuation config");
            ValuationConfig::from_json_file(path)?
        }
        None => ValuationConfig::default(),
    };

    if let Some(rate) = args.risk_free_rate {
        config = config.with_risk_free_rate(rate);
    }
    if let Some(growth) = args.terminal_growth {
        config = config.with_terminal_growth(growth);
    }
    if let Some(margin) = args.margin_of_safety {
        config = config.with_margin_of_safety(margin);
    }
    if let Some(wacc) = args.wacc {
        config = config.with_wacc_override(wacc);
    }

    config.validate()?;
    Ok(config)
}

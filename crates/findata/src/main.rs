//! `findata` command line.
//!
//! ```bash
//! # Download Apple's statements into the current directory
//! findata download AAPL
//!
//! # Hong Kong listing, with a table preview in the terminal
//! findata download 0700 --exchange hkex --preview
//!
//! # Look a company up in the listing directory
//! findata search tencent
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use findata::{
    ChromeOptions, ChromeSession, CompanyDirectory, DirectoryLoader, JobLauncher, JobRequest,
    ScrapeConfig, XlsxWriter,
};

const DEFAULT_LOG_FILTER: &str =
    "findata=info,findata_alphaspread=info,findata_directory=info,findata_export=info";

#[derive(Debug, Parser)]
#[command(name = "findata")]
#[command(about = "Download financial statements from AlphaSpread into Excel", long_about = None)]
#[command(version)]
struct Cli {
    /// Local listing directory CSV, tried before the remote one
    #[arg(long, global = true, value_name = "CSV")]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download all statements of a ticker
    Download {
        /// Ticker symbol (e.g. AAPL, 0700)
        ticker: String,

        /// Site exchange slug (e.g. nasdaq, hkex); looked up in the directory by default
        #[arg(short, long)]
        exchange: Option<String>,

        /// Company name used to guess alternate symbols
        #[arg(short, long)]
        company: Option<String>,

        /// Directory the workbook is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Wait after each period switch, in milliseconds
        #[arg(long)]
        settle_ms: Option<u64>,

        /// Show the browser window
        #[arg(long, default_value = "false")]
        headful: bool,

        /// Print every fetched table
        #[arg(long, default_value = "false")]
        preview: bool,
    },

    /// Search the listing directory by symbol or company name
    Search {
        /// Symbol or name fragment
        query: String,

        /// Only listings on this exchange code (e.g. NASDAQ, HKEX)
        #[arg(short, long)]
        exchange: Option<String>,
    },
}

async fn load_directory(local: Option<PathBuf>) -> CompanyDirectory {
    let mut loader = DirectoryLoader::new();
    if let Some(path) = local {
        loader = loader.with_local(path);
    }
    loader = match loader.with_remote() {
        Ok(loader) => loader,
        Err(e) => {
            warn!(error = %e, "Remote directory unavailable");
            return CompanyDirectory::from_entries(Vec::new());
        }
    };

    loader.load().await.unwrap_or_else(|e| {
        warn!(error = %e, "Continuing without a listing directory");
        CompanyDirectory::from_entries(Vec::new())
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let directory = load_directory(cli.directory).await;

    match cli.command {
        Commands::Search { query, exchange } => {
            let matches = directory.search(&query, exchange.as_deref());
            if matches.is_empty() {
                println!("No listings match '{query}'");
            }
            for entry in matches {
                println!(
                    "{:<12} {:<10} {}",
                    entry.symbol, entry.exchange_code, entry.name
                );
            }
        }
        Commands::Download {
            ticker,
            exchange,
            company,
            output_dir,
            settle_ms,
            headful,
            preview,
        } => {
            let mut config = ScrapeConfig::from_env()?;
            if let Some(ms) = settle_ms {
                config = config.with_settle_delay(Duration::from_millis(ms));
            }

            let options = ChromeOptions::default().with_headful(headful);
            let launcher = JobLauncher::new(
                move || ChromeSession::launch(&options),
                Arc::new(directory),
                Arc::new(XlsxWriter::new()),
            )
            .with_config(config);

            let mut status = launcher.subscribe();
            tokio::spawn(async move {
                while status.changed().await.is_ok() {
                    let current = status.borrow_and_update().clone();
                    info!(percent = current.progress_percent, "{}", current.message);
                }
            });

            let mut request = JobRequest::new(ticker, output_dir);
            if let Some(exchange) = exchange {
                request = request.with_exchange(exchange);
            }
            if let Some(company) = company {
                request = request.with_company_name(company);
            }
            let outcome = launcher.launch(request)?.await??;

            if preview {
                for (key, table) in outcome.result.tables.iter() {
                    println!("\n{key}");
                    println!("{}", table.to_frame()?);
                }
                for section in &outcome.result.breakdown.sections {
                    println!("\nRevenue breakdown by {} (total {:.0}M)", section.name, section.total);
                    for item in &section.items {
                        println!(
                            "  {:<40} {:>12.0} {:>6.1}%",
                            item.name,
                            item.value,
                            section.share(item) * 100.0
                        );
                    }
                }
            }

            println!("Saved to {}", outcome.output_path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
        let cli = Cli::parse_from(["findata", "download", "0700", "--exchange", "hkex"]);
        assert!(matches!(
            cli.command,
            Commands::Download { ref ticker, ref exchange, .. }
                if ticker == "0700" && exchange.as_deref() == Some("hkex")
        ));
    }

    #[test]
    fn test_default_filter_covers_every_crate() {
        for target in ["findata", "findata_alphaspread", "findata_directory", "findata_export"] {
            let directive = format!("{target}=info");
            assert!(DEFAULT_LOG_FILTER.split(',').any(|d| d == directive));
        }
    }
}

//! Ledgerlink fetcher
//!
//! Command-line entry point for pulling trial balances and journals from the
//! accounting platform.

use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerlink_core::journals::validate_journal_lines;
use ledgerlink_core::trial_balance::validate_trial_balance_rows;
use ledgerlink_shared::AppConfig;
use ledgerlink_xero::{
    FetchError, JournalsRequest, TrialBalanceRequest, XeroFetcher, XeroHttpClient,
};

#[derive(Parser)]
#[command(
    name = "ledgerlink",
    version,
    about = "Fetch trial balances and journals from the accounting platform"
)]
struct Cli {
    /// Tenant to query. Defaults to the configured tenant, then the first connection.
    #[arg(long, global = true, env = "LEDGERLINK_TENANT")]
    tenant: Option<String>,

    /// Print results as JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    /// Run consistency checks on the fetched data
    #[arg(long, global = true)]
    validate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the trial balance as of a date
    #[command(alias = "tb")]
    TrialBalance {
        /// Report date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// Fetch journal lines posted within a date range
    Journals {
        /// First posting date (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last posting date (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        /// Account code to restrict to; repeatable
        #[arg(long = "nominal")]
        nominals: Vec<String>,
        /// Page size
        #[arg(long)]
        page_size: Option<u32>,
        /// Starting offset
        #[arg(long)]
        offset: Option<u64>,
        /// Fetch only this zero-indexed page
        #[arg(long, conflicts_with = "offset")]
        page: Option<u32>,
    },
    /// Fetch the trial balance and the journals behind it
    Snapshot {
        /// First posting date (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Report and last posting date (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
    /// List tenants the access token can reach
    Connections,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerlink=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<FetchError>() {
                Some(fetch_err) => {
                    eprintln!("error [{}]: {fetch_err}", fetch_err.error_code());
                    eprintln!("hint: {}", fetch_err.user_hint());
                }
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling fetch");
            on_signal.cancel();
        }
    });

    let client = XeroHttpClient::new(&config.xero)?;
    let fetcher = XeroFetcher::new(client, &config).with_cancellation(cancel);

    if let Commands::Connections = cli.command {
        let connections = fetcher.list_connections().await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&connections)?);
        } else {
            for connection in &connections {
                println!(
                    "{}\t{}",
                    connection.tenant_id,
                    connection.tenant_name.as_deref().unwrap_or("-")
                );
            }
        }
        return Ok(());
    }

    let tenant_id = resolve_tenant(cli.tenant, &config, &fetcher).await?;
    info!(tenant_id = %tenant_id, "Using tenant");

    match cli.command {
        Commands::TrialBalance { date } => {
            let result = fetcher
                .fetch_trial_balance(&TrialBalanceRequest::new(&tenant_id, date))
                .await?;
            if cli.validate {
                validate_trial_balance_rows(&result.rows).map_err(FetchError::from)?;
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "Retrieved {} trial balance rows ({} skipped)",
                    result.rows.len(),
                    result.skipped
                );
            }
        }
        Commands::Journals {
            from,
            to,
            nominals,
            page_size,
            offset,
            page,
        } => {
            let mut request = JournalsRequest::new(&tenant_id, from, to).with_nominals(nominals);
            request.page_size = page_size;
            request.offset = offset;

            if let Some(page) = page {
                let result = fetcher.fetch_journals_page(&request, page).await?;
                if cli.validate {
                    validate_journal_lines(&result.lines).map_err(FetchError::from)?;
                }
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    println!(
                        "Retrieved {} journal lines on page {page} (more: {}, estimated pages: {})",
                        result.lines.len(),
                        result.has_more,
                        result.total_pages
                    );
                }
                return Ok(());
            }

            let result = fetcher.fetch_journals(&request).await?;
            if cli.validate {
                validate_journal_lines(&result.lines).map_err(FetchError::from)?;
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "Retrieved {} journal lines from {} pages ({} skipped, {} journals out of range){}",
                    result.lines.len(),
                    result.pages,
                    result.stats.lines_skipped(),
                    result.stats.journals_out_of_range,
                    if result.truncated {
                        "; stopped at the offset limit"
                    } else {
                        ""
                    }
                );
            }
        }
        Commands::Snapshot { from, to } => {
            let snapshot = fetcher.fetch_ledger_snapshot(&tenant_id, from, to).await?;
            if cli.validate {
                validate_trial_balance_rows(&snapshot.trial_balance.rows)
                    .map_err(FetchError::from)?;
                validate_journal_lines(&snapshot.journals).map_err(FetchError::from)?;
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!(
                    "Trial balance: {} accounts ({} rows skipped)",
                    snapshot.trial_balance.rows.len(),
                    snapshot.trial_balance.skipped
                );
                println!(
                    "Journals: {} lines across {} accounts",
                    snapshot.journals.len(),
                    snapshot.journals_by_account.len()
                );
            }
        }
        Commands::Connections => {}
    }

    Ok(())
}

async fn resolve_tenant(
    explicit: Option<String>,
    config: &AppConfig,
    fetcher: &XeroFetcher<XeroHttpClient>,
) -> anyhow::Result<String> {
    if let Some(tenant) = explicit.or_else(|| config.xero.tenant_id.clone())
        && !tenant.trim().is_empty()
    {
        return Ok(tenant);
    }

    let connections = fetcher.list_connections().await?;
    connections
        .into_iter()
        .next()
        .map(|c| c.tenant_id)
        .context("No tenant configured and the access token has no connections")
}

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use claims_core::{ClaimsPage, HttpClaimSource, render::table_text};
use claims_viewer::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, load_schema};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "claims_cli", about = "Browse and process insurance claims")]
struct Cli {
    #[arg(long, env = "CLAIMS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// JSON file describing field kinds
    #[arg(long)]
    schema: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List claim numbers in backend order
    List,
    /// Show the fields of one claim
    Show { claim_number: String },
    /// Ask the backend to process one claim
    Process { claim_number: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = HttpClaimSource::new(&cli.api_url, Some(Duration::from_secs(cli.timeout_secs)))?;
    let page = ClaimsPage::new(Arc::new(source), load_schema(cli.schema.as_deref())?);

    match cli.command {
        Command::List => {
            let selection = page.init().await?;
            for claim_number in selection.claim_numbers() {
                println!("{claim_number}");
            }
        }
        Command::Show { claim_number } => {
            page.init().await?;
            let view = page.view(Some(&claim_number), None).await;
            if !view.table.is_visible() {
                bail!("claim {claim_number} not found");
            }
            println!("{}", table_text(&view.table));
        }
        Command::Process { claim_number } => {
            let notice = page.process(Some(&claim_number)).await;
            if !notice.is_success() {
                bail!("{notice}");
            }
            println!("{notice}");
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

mod api;
mod cache;
mod config;
mod dedup;
mod error;
mod extract;
mod hunter;
mod locale;
mod models;
mod processor;
mod query;
mod search;
mod store;
mod strategy;

use models::{HuntRequest, MAX_LEAD_COUNT, MIN_LEAD_COUNT, Strategy};

#[derive(Parser)]
#[command(author, version, about = "Hunts verified customer leads from public search results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single hunt and print the report as JSON
    Hunt {
        /// Business/service description ("أنا دكتور أسنان", ...)
        #[arg(short, long)]
        description: String,

        /// Target city or area
        #[arg(short, long)]
        locality: String,

        /// Number of leads to hunt for
        #[arg(short, long, default_value_t = 20)]
        count: usize,

        /// Hunting channel strategy
        #[arg(short, long, value_enum, default_value_t = Strategy::SocialMedia)]
        strategy: Strategy,

        /// Explicit country code override (resolved from locality if omitted)
        #[arg(long)]
        country: Option<String>,

        /// Drop contact-less results even when they show customer intent
        #[arg(long, default_value_t = false)]
        no_potential: bool,

        /// User the dedup lookup and persistence are scoped to
        #[arg(short, long, default_value = "default", env = "LEAD_SLEUTH_USER")]
        user: String,
    },
    /// Process a JSON file containing hunt requests
    Process {
        /// Path to the input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// User the dedup lookup and persistence are scoped to
        #[arg(short, long, default_value = "default", env = "LEAD_SLEUTH_USER")]
        user: String,

        /// Number of concurrent hunts
        #[arg(short, long, default_value_t = 2)]
        workers: usize,
    },
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8080, env = "LEAD_SLEUTH_PORT")]
        port: u16,
    },
    /// Print the stored leads for a user as JSON
    Leads {
        /// User whose leads to list
        #[arg(short, long, default_value = "default", env = "LEAD_SLEUTH_USER")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    once_cell::sync::Lazy::force(&config::CONFIG);

    let cli = Cli::parse();

    match cli.command {
        Commands::Hunt {
            description,
            locality,
            count,
            strategy,
            country,
            no_potential,
            user,
        } => {
            let mut request = HuntRequest::new(description, locality);
            request.count = count;
            request.strategy = strategy;
            request.country = country;
            request.include_potential = !no_potential;
            clamp_with_warning(&mut request);

            let hunter = Arc::new(hunter::LeadHunter::new()?);
            let store = open_store()?;
            let report = processor::process_request(hunter, store, &user, request).await?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Process {
            input,
            output,
            user,
            workers,
        } => {
            info!(
                "Processing hunt requests from {} to {}",
                input.display(),
                output.display()
            );
            process_file(input, output, user, workers).await?;
        }
        Commands::Serve { port } => {
            info!("Starting API server on port {}", port);
            let hunter = Arc::new(hunter::LeadHunter::new()?);
            let store = open_store()?;
            api::start_api_server(port, hunter, store).await?;
        }
        Commands::Leads { user } => {
            let store = store::JsonLeadStore::open(&config::CONFIG.leads_file)?;
            println!("{}", serde_json::to_string_pretty(store.leads_for(&user))?);
        }
    }

    Ok(())
}

fn open_store() -> Result<Arc<Mutex<store::JsonLeadStore>>> {
    let leads_file = config::CONFIG.leads_file.trim();
    if leads_file.is_empty() {
        return Err(error::AppError::Config("leads_file must not be empty".to_string()).into());
    }
    let store = store::JsonLeadStore::open(leads_file)?;
    Ok(Arc::new(Mutex::new(store)))
}

/// Outer surfaces clamp out-of-range counts instead of failing; the
/// pipeline itself rejects them.
fn clamp_with_warning(request: &mut HuntRequest) {
    let original = request.count;
    request.clamp_count();
    if request.count != original {
        tracing::warn!(
            "Requested count {} outside {}..={}, clamped to {}",
            original,
            MIN_LEAD_COUNT,
            MAX_LEAD_COUNT,
            request.count
        );
    }
}

async fn process_file(input: PathBuf, output: PathBuf, user: String, workers: usize) -> Result<()> {
    let input_data = std::fs::read_to_string(&input)?;
    let mut requests: Vec<HuntRequest> = serde_json::from_str(&input_data)?;
    for request in &mut requests {
        clamp_with_warning(request);
    }

    info!("Loaded {} hunt requests from {}", requests.len(), input.display());

    let hunter = Arc::new(hunter::LeadHunter::new()?);
    let store = open_store()?;

    let progress_bar = indicatif::ProgressBar::new(requests.len() as u64);
    progress_bar.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let results = processor::process_batch(
        hunter,
        store,
        &user,
        requests,
        workers,
        progress_bar.clone(),
    )
    .await;

    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => tracing::error!("Hunt failed: {}", e),
        }
    }

    progress_bar.finish_with_message("Processing complete");

    let output_data = serde_json::to_string_pretty(&reports)?;
    std::fs::write(&output, output_data)?;

    info!("Wrote {} reports to {}", reports.len(), output.display());

    Ok(())
}

//! Inspecta CLI: run observation enhancement and photo QA against the
//! configured inference service.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inspecta_ai::{HttpInferenceClient, InferenceConfig};
use inspecta_core::{FieldTag, Observation, Photo};
use inspecta_host::{ElapsedTicker, MemoryHost};
use inspecta_review::{
    AdoptOutcome, EnhanceOutcome, EnhancementSession, PhotoQaAnalyzer, ReviewConfig, ScanOutcome,
};
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod display;

#[derive(Parser, Debug)]
#[command(name = "inspecta")]
#[command(about = "AI assistance for inspection report observations and photos")]
#[command(version)]
struct Cli {
    /// Base URL of the inference functions
    #[arg(
        long,
        env = "INSPECTA_INFERENCE_URL",
        default_value = "http://localhost:54321/functions/v1"
    )]
    inference_url: String,

    /// Bearer key for the inference service
    #[arg(long, env = "INSPECTA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "INSPECTA_TIMEOUT_SECS", default_value_t = 240)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Suggest an improved classification, description and citations for an observation
    Enhance {
        /// Observation JSON file
        observation: PathBuf,

        /// Apply every suggested change in one update
        #[arg(long, conflicts_with = "accept")]
        accept_all: bool,

        /// Apply individual fields (code, description, recommendation, regulations)
        #[arg(long, value_name = "FIELD")]
        accept: Vec<FieldTag>,
    },

    /// Check a photo's classification with AI
    ScanPhoto {
        /// Photo JSON file
        photo: PathBuf,

        /// Confirm sending the photo for analysis
        #[arg(long)]
        yes: bool,

        /// Observation JSON the photo evidences, for --adopt
        #[arg(long)]
        observation: Option<PathBuf>,

        /// Apply a suggested code to the observation
        #[arg(long, requires = "observation")]
        adopt: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!("inspecta v{}", env!("CARGO_PKG_VERSION"));

    let config = InferenceConfig::new(&cli.inference_url)
        .with_api_key(cli.api_key.clone())
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let client = HttpInferenceClient::new(config).context("building inference client")?;

    match cli.command {
        Command::Enhance {
            observation,
            accept_all,
            accept,
        } => enhance(client, &observation, accept_all, &accept).await,
        Command::ScanPhoto {
            photo,
            yes,
            observation,
            adopt,
        } => scan_photo(client, &photo, yes, observation.as_deref(), adopt).await,
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

async fn enhance(
    client: HttpInferenceClient,
    path: &Path,
    accept_all: bool,
    accept: &[FieldTag],
) -> Result<()> {
    let observation: Observation = read_json(path)?;
    let id = observation.id.clone();
    let host = Arc::new(MemoryHost::from_iter([observation]));
    let session = EnhancementSession::new(client, host.clone(), ReviewConfig::default());

    let ticker = ElapsedTicker::spawn(session.subscribe());
    let elapsed = ticker.subscribe();
    let mut stages = session.subscribe();
    let reporter = tokio::spawn(async move {
        while stages.changed().await.is_ok() {
            let stage = *stages.borrow_and_update();
            eprintln!("  {} ({}s)", stage.as_str(), *elapsed.borrow());
        }
    });

    let outcome = session.enhance(&id).await;
    reporter.abort();
    let outcome = outcome.with_context(|| format!("enhancing observation {id}"))?;
    let EnhanceOutcome::Ready { generation, bundle } = outcome else {
        bail!("enhancement of {id} was superseded");
    };
    eprintln!("  took {}s", ticker.seconds());

    display::print_bundle(&bundle);
    let statuses: Vec<_> = FieldTag::ALL
        .into_iter()
        .filter_map(|tag| session.field_status(tag).map(|s| (tag, s)))
        .collect();
    display::print_statuses(&statuses);

    if accept_all {
        let summary = session.accept_all(generation)?;
        println!("\n{summary}");
    } else if !accept.is_empty() {
        for &tag in accept {
            let outcome = session.accept_field(generation, tag)?;
            println!("  {tag}: {outcome}");
        }
        if let Some(progress) = session.acceptance_progress() {
            println!("\n{progress}");
        }
    } else {
        return Ok(());
    }

    let updated = host
        .get(&id)
        .with_context(|| format!("observation {id} disappeared"))?;
    println!("{}", serde_json::to_string_pretty(&updated)?);
    Ok(())
}

async fn scan_photo(
    client: HttpInferenceClient,
    path: &Path,
    yes: bool,
    observation: Option<&Path>,
    adopt: bool,
) -> Result<()> {
    let photo: Photo = read_json(path)?;
    let analyzer = PhotoQaAnalyzer::new(client);
    let confirmation = analyzer.request_scan(photo);
    eprintln!("{}", confirmation.prompt());
    if !yes {
        bail!("scan not confirmed; re-run with --yes to send the photo for analysis");
    }

    let photo_id = confirmation.photo().id.clone();
    let outcome = analyzer
        .scan(confirmation.confirm())
        .await
        .with_context(|| format!("scanning photo {photo_id}"))?;
    let ScanOutcome::Completed(review) = outcome else {
        bail!("scan of {photo_id} was superseded");
    };
    display::print_review(&review);

    if adopt {
        let Some(path) = observation else {
            bail!("--adopt needs --observation");
        };
        let observation: Observation = read_json(path)?;
        let id = observation.id.clone();
        let host = MemoryHost::from_iter([observation]);
        match analyzer.adopt_suggestion(&photo_id, &host)? {
            AdoptOutcome::Applied(code) => {
                println!("\nObservation {id} reclassified as {code}");
                let updated = host
                    .get(&id)
                    .with_context(|| format!("observation {id} disappeared"))?;
                println!("{}", serde_json::to_string_pretty(&updated)?);
            }
            AdoptOutcome::NoChange => println!("\nObservation {id} unchanged"),
            AdoptOutcome::ManualReview => println!("\nLeft for manual review"),
        }
    }
    Ok(())
}

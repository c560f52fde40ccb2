//! ShortGen worker binary.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*};

use shortgen_ai::{AiConfig, CredentialPool};
use shortgen_models::{Job, JobId, ShortId};
use shortgen_upload::{
    BatchUploadManager, CredentialResolver, GoogleIdentityProvider, InMemoryStore, JobStore,
    TempSweeper, UploadConfig, UploadCoordinator, YouTubeClient,
};
use shortgen_worker::{logging, ShortPreparer, WorkerConfig};

const USAGE: &str = "usage: shortgen-worker <command>

commands:
  job <youtube_url> <title>                 register a job, print its id
  analyze <text>                            score a segment
  prepare <job_id> <output_path> <text>     generate metadata, add a pending short
  upload <job_id> <account>                 upload the job's pending shorts
  reset <short_id>                          move a failed short back to pending
  progress <job_id>                         per-status counts for a job
  sweep                                     remove stale temp files";

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let store = Arc::new(match &config.state_file {
        Some(path) => InMemoryStore::open(path)
            .await
            .with_context(|| format!("failed to open state file {}", path.display()))?,
        None => InMemoryStore::new(),
    });
    let sweeper = TempSweeper::new(&config.temp_dir).with_max_age(config.temp_max_age);

    match (command.as_str(), rest) {
        ("job", [url, title]) => {
            let job = Job::new(url.as_str(), title.as_str());
            store.insert_job(job.clone()).await?;
            println!("{}", job.id);
        }
        ("analyze", [text]) => {
            let preparer = preparer(Arc::clone(&store))?;
            print_json(&preparer.score(text).await)?;
        }
        ("prepare", [job_id, output_path, text]) => {
            let job = store
                .get_job(&JobId::from_string(job_id.as_str()))
                .await?
                .ok_or_else(|| anyhow!("job {job_id} not found"))?;
            let record = preparer(Arc::clone(&store))?
                .prepare(&job, text, output_path.as_str())
                .await?;
            print_json(&record)?;
        }
        ("upload", [job_id, account]) => {
            let manager = upload_manager(Arc::clone(&store), sweeper)?;
            let report = manager
                .upload_pending(&JobId::from_string(job_id.as_str()), account)
                .await?;
            print_json(&report)?;
            if !report.is_success() {
                std::process::exit(2);
            }
        }
        ("reset", [short_id]) => {
            let manager = upload_manager(Arc::clone(&store), sweeper)?;
            let record = manager
                .reset_failed(&ShortId::from_string(short_id.as_str()))
                .await?;
            print_json(&record)?;
        }
        ("progress", [job_id]) => {
            let manager = upload_manager(Arc::clone(&store), sweeper)?;
            print_json(&manager.progress(&JobId::from_string(job_id.as_str())).await?)?;
        }
        ("sweep", []) => {
            println!("{}", sweeper.sweep().await);
        }
        _ => bail!("unrecognized arguments\n\n{USAGE}"),
    }

    Ok(())
}

/// Colored output for dev, JSON for production.
fn init_tracing() -> Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = logging::env_filter()?;

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

fn preparer(store: Arc<InMemoryStore>) -> Result<ShortPreparer> {
    let pool = Arc::new(CredentialPool::from_env());
    info!(keys = pool.len(), "Loaded Gemini API keys");
    Ok(ShortPreparer::new(&AiConfig::from_env(), pool, store)?)
}

fn upload_manager(store: Arc<InMemoryStore>, sweeper: TempSweeper) -> Result<BatchUploadManager> {
    let config = UploadConfig::from_env();
    let provider = Arc::new(GoogleIdentityProvider::new(&config)?);
    let resolver = CredentialResolver::new(store.clone(), provider);
    let host = Arc::new(YouTubeClient::new(&config)?);
    let coordinator = UploadCoordinator::new(store.clone(), resolver, host);
    Ok(BatchUploadManager::new(store, coordinator).with_sweeper(sweeper))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

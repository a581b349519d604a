use axum::{
    routing::{get, post},
    Extension, Router,
};
use sentiment_cluster::config::Settings;
use sentiment_cluster::coordinator::handlers::{
    handle_ping as handle_coordinator_ping, handle_report_result, handle_run_job,
};
use sentiment_cluster::coordinator::protocol::{
    RunJobRequest, RunJobResponse, ENDPOINT_PING, ENDPOINT_REPORT_RESULT, ENDPOINT_RUN_JOB,
};
use sentiment_cluster::coordinator::service::CoordinatorService;
use sentiment_cluster::scoring::vocabulary::Vocabulary;
use sentiment_cluster::worker::handlers::{
    handle_aggregate, handle_ping as handle_worker_ping, handle_submit_task,
};
use sentiment_cluster::worker::protocol::{ENDPOINT_AGGREGATE, ENDPOINT_SUBMIT_TASK};
use sentiment_cluster::worker::service::WorkerService;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut role: Option<String> = None;
    let mut node_index: Option<usize> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                config_path = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--role" => {
                role = Some(args[i + 1].clone());
                i += 2;
            }
            "--node-index" => {
                node_index = Some(args[i + 1].parse()?);
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let (Some(config_path), Some(role)) = (config_path, role) else {
        eprintln!(
            "Usage: {} --config <path> --role coordinator|worker|client [--node-index <n>]",
            args[0]
        );
        eprintln!(
            "Example: {} --config sentiment.json --role coordinator",
            args[0]
        );
        eprintln!(
            "Example: {} --config sentiment.json --role worker --node-index 0",
            args[0]
        );
        std::process::exit(1);
    };

    let settings = Settings::load(&config_path)?;

    match role.as_str() {
        "coordinator" => run_coordinator(settings).await,
        "worker" => {
            let node_index = node_index
                .ok_or_else(|| anyhow::anyhow!("--node-index is required for the worker role"))?;
            run_worker(settings, node_index).await
        }
        "client" => run_client(settings).await,
        other => {
            eprintln!("Unknown role: {}", other);
            std::process::exit(1);
        }
    }
}

async fn run_coordinator(settings: Settings) -> anyhow::Result<()> {
    let service = CoordinatorService::new(&settings);

    let app = Router::new()
        .route(ENDPOINT_PING, get(handle_coordinator_ping))
        .route(ENDPOINT_RUN_JOB, post(handle_run_job))
        .route(ENDPOINT_REPORT_RESULT, post(handle_report_result))
        .layer(Extension(service));

    tracing::info!("Starting the coordinator on {}", settings.coordinator_addr);
    tracing::info!("Worker pool: {:?}", settings.workers);

    let listener = tokio::net::TcpListener::bind(settings.coordinator_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_worker(settings: Settings, node_index: usize) -> anyhow::Result<()> {
    let bind_addr = settings.worker_addr(node_index)?;

    let vocab = Arc::new(Vocabulary::load(
        &settings.vocab_positive,
        &settings.vocab_negative,
    )?);
    tracing::info!(
        "Vocabulary loaded: {} positive / {} negative tokens",
        vocab.positives.len(),
        vocab.negatives.len()
    );

    let service = WorkerService::new(&settings, node_index, vocab)?;

    let app = Router::new()
        .route(ENDPOINT_PING, get(handle_worker_ping))
        .route(ENDPOINT_SUBMIT_TASK, post(handle_submit_task))
        .route(ENDPOINT_AGGREGATE, post(handle_aggregate))
        .layer(Extension(service));

    tracing::info!("Starting worker node {} on {}", node_index, bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Client role: enumerate the input directory, run one job against the
/// coordinator, and print the ranked output.
async fn run_client(settings: Settings) -> anyhow::Result<()> {
    let mut documents = Vec::new();
    for entry in std::fs::read_dir(&settings.input_path)? {
        let path = entry?.path();
        if path.is_file() {
            documents.push(path.canonicalize()?.to_string_lossy().into_owned());
        }
    }
    documents.sort();

    if documents.is_empty() {
        anyhow::bail!(
            "No input documents found in {}",
            settings.input_path.display()
        );
    }

    let base = format!("http://{}", settings.coordinator_addr);
    let client = reqwest::Client::new();

    let alive: bool = client
        .get(format!("{}{}", base, ENDPOINT_PING))
        .send()
        .await?
        .json()
        .await?;
    tracing::info!("Coordinator ping: {}", alive);

    tracing::info!("Submitting job with {} documents", documents.len());
    let response = client
        .post(format!("{}{}", base, ENDPOINT_RUN_JOB))
        .json(&RunJobRequest { documents })
        .send()
        .await?;

    if !response.status().is_success() {
        anyhow::bail!("Job failed: {}", response.status());
    }

    let body: RunJobResponse = response.json().await?;
    tracing::info!(
        "Job complete: {} results in {} ms",
        body.completed,
        body.elapsed_ms
    );

    println!("!*=====================*! Sentiment Analysis Output !*=====================*!");
    let output = tokio::fs::read_to_string(&body.output_location).await?;
    print!("{}", output);

    Ok(())
}

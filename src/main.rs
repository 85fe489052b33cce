//! Gatekeeper HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use gatekeeper::config::Config;
use gatekeeper::corpus::Corpus;
use gatekeeper::gateway::{HandlerState, create_router_with_state};
use gatekeeper::retrieval::{STUB_INDEX_DIM, build_matrix, build_service, load_embedder};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_HEALTH_CHECK_PORT: u16 = 8003;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    if std::env::args().any(|arg| arg == "--build-index") {
        return build_index(&config).await;
    }

    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        corpus = %config.corpus_path.display(),
        embeddings = %config.embeddings_path.display(),
        "Gatekeeper starting"
    );

    let loader_config = config.clone();
    let state = match tokio::task::spawn_blocking(move || build_service(&loader_config)).await? {
        Ok(service) => HandlerState::ready(Arc::new(service)),
        Err(e) => {
            tracing::error!(error = %e, "Initialization failed, serving 503 until restart");
            HandlerState::unavailable(e.to_string())
        }
    };

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gatekeeper shutdown complete");
    Ok(())
}

/// Embeds every corpus question and writes the matrix the server loads at startup.
async fn build_index(config: &Config) -> anyhow::Result<()> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let corpus = Corpus::load(&config.corpus_path)?;
        let embedder = load_embedder(&config, STUB_INDEX_DIM)?;

        tracing::info!(
            entries = corpus.len(),
            dim = embedder.embedding_dim(),
            stub = embedder.is_stub(),
            "Building corpus matrix"
        );

        let matrix = build_matrix(&corpus, embedder.as_ref())?;
        matrix.save(&config.embeddings_path, &config.embeddings_key)?;

        tracing::info!(
            path = %config.embeddings_path.display(),
            rows = matrix.len(),
            dim = matrix.dim(),
            "Corpus matrix written"
        );
        Ok(())
    })
    .await?
}

async fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_HEALTH_CHECK_PORT);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

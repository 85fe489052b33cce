//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gatekeeper::corpus::Corpus;
use gatekeeper::embedding::{BertEmbedder, Embedder};
use gatekeeper::gateway::{HandlerState, create_router_with_state};
use gatekeeper::policy::GateConfig;
use gatekeeper::rerank::{CrossEncoderReranker, Reranker};
use gatekeeper::retrieval::{RetrievalService, build_matrix};
use gatekeeper::verify::{MaxSimVerifier, Verifier};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::fixtures::repair_corpus;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

/// Stub dimension used by the harness; large enough that unrelated words rarely collide.
pub const TEST_EMBEDDING_DIM: usize = 256;

pub struct TestServerConfig {
    pub corpus: Corpus,
    pub gate: GateConfig,
    /// `None` uses a MaxSim verifier over the stub embedder.
    pub verifier: Option<Arc<dyn Verifier>>,
    /// `None` uses the stub cross-encoder.
    pub reranker: Option<Arc<dyn Reranker>>,
    /// Serve 503 for every retrieval, as after a failed startup.
    pub init_error: Option<String>,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            corpus: repair_corpus(),
            gate: GateConfig::default(),
            verifier: None,
            reranker: None,
            init_error: None,
        }
    }
}

impl TestServerConfig {
    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn uninitialized(reason: impl Into<String>) -> Self {
        Self {
            init_error: Some(reason.into()),
            ..Self::default()
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

fn startup_failed(e: impl std::fmt::Display) -> ServerStartupError {
    ServerStartupError::StartupFailed(e.to_string())
}

fn build_state(config: TestServerConfig) -> Result<HandlerState, ServerStartupError> {
    if let Some(reason) = config.init_error {
        return Ok(HandlerState::unavailable(reason));
    }

    let embedder: Arc<dyn Embedder> =
        Arc::new(BertEmbedder::stub(TEST_EMBEDDING_DIM).map_err(startup_failed)?);
    let matrix = build_matrix(&config.corpus, embedder.as_ref()).map_err(startup_failed)?;

    let verifier: Arc<dyn Verifier> = match config.verifier {
        Some(verifier) => verifier,
        None => Arc::new(MaxSimVerifier::new(Arc::clone(&embedder)).with_cache_capacity(1_000)),
    };
    let reranker: Arc<dyn Reranker> = match config.reranker {
        Some(reranker) => reranker,
        None => Arc::new(CrossEncoderReranker::stub().map_err(startup_failed)?),
    };

    let service = RetrievalService::new(
        config.corpus,
        matrix,
        embedder,
        verifier,
        reranker,
        config.gate,
    )
    .map_err(startup_failed)?;

    Ok(HandlerState::ready(Arc::new(service)))
}

/// Spawns a server on an ephemeral port with stub models.
///
/// | Component | Default                          |
/// |-----------|----------------------------------|
/// | Embedder  | Stub (`TEST_EMBEDDING_DIM`)      |
/// | Matrix    | Built from the corpus at startup |
/// | Verifier  | MaxSim over the stub embedder    |
/// | Reranker  | Stub cross-encoder               |
///
/// ```ignore
/// let server = spawn_test_server(TestServerConfig::default()).await?;
/// let client = TestClient::new(server.url());
/// let (body, status) = client.retrieve("How to replace the Nook HD battery?").await?;
/// ```
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let app = create_router_with_state(build_state(config)?);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

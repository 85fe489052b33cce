//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `GATEKEEPER_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::policy::GateConfig;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `GATEKEEPER_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8003`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Corpus JSON file. Default: `./data/corpus.json`.
    pub corpus_path: PathBuf,

    /// Precomputed embedding matrix, `.npy` or `.npz`. Default: `./data/embeddings.npy`.
    pub embeddings_path: PathBuf,

    /// Array name looked up inside an `.npz` matrix. Default: `embeddings`.
    pub embeddings_key: String,

    /// Encoder model directory. `None` runs the embedder in stub mode.
    pub model_path: Option<PathBuf>,

    /// Base URL of an HTTP rerank service. `None` uses the local cross-encoder.
    pub reranker_url: Option<String>,

    /// Model name sent to the rerank service. Default: `Qwen3-Reranker-8B`.
    pub reranker_model: String,

    /// Local cross-encoder model directory. `None` runs it in stub mode.
    pub reranker_path: Option<PathBuf>,

    /// Upper bound on a single rerank call. Default: 10s.
    pub reranker_timeout: Duration,

    /// `genai` model used to translate non-Latin queries. `None` disables translation.
    pub translator_model: Option<String>,

    /// Max cached `(query, document)` MaxSim scores. Default: `10_000`.
    pub verifier_cache_capacity: u64,

    /// Gate thresholds and candidate count.
    pub gate: GateConfig,
}

/// Array name used when `GATEKEEPER_EMBEDDINGS_KEY` is not set.
pub const DEFAULT_EMBEDDINGS_KEY: &str = "embeddings";

/// Model name sent when `GATEKEEPER_RERANKER_MODEL` is not set.
pub const DEFAULT_RERANKER_MODEL: &str = "Qwen3-Reranker-8B";

/// Timeout used when `GATEKEEPER_RERANKER_TIMEOUT_MS` is not set.
pub const DEFAULT_RERANKER_TIMEOUT_MS: u64 = 10_000;

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8003,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            corpus_path: PathBuf::from("./data/corpus.json"),
            embeddings_path: PathBuf::from("./data/embeddings.npy"),
            embeddings_key: DEFAULT_EMBEDDINGS_KEY.to_string(),
            model_path: None,
            reranker_url: None,
            reranker_model: DEFAULT_RERANKER_MODEL.to_string(),
            reranker_path: None,
            reranker_timeout: Duration::from_millis(DEFAULT_RERANKER_TIMEOUT_MS),
            translator_model: None,
            verifier_cache_capacity: 10_000,
            gate: GateConfig::default(),
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "GATEKEEPER_PORT";
    const ENV_BIND_ADDR: &'static str = "GATEKEEPER_BIND_ADDR";
    const ENV_CORPUS_PATH: &'static str = "GATEKEEPER_CORPUS_PATH";
    const ENV_EMBEDDINGS_PATH: &'static str = "GATEKEEPER_EMBEDDINGS_PATH";
    const ENV_EMBEDDINGS_KEY: &'static str = "GATEKEEPER_EMBEDDINGS_KEY";
    const ENV_MODEL_PATH: &'static str = "GATEKEEPER_MODEL_PATH";
    const ENV_RERANKER_URL: &'static str = "GATEKEEPER_RERANKER_URL";
    const ENV_RERANKER_MODEL: &'static str = "GATEKEEPER_RERANKER_MODEL";
    const ENV_RERANKER_PATH: &'static str = "GATEKEEPER_RERANKER_PATH";
    const ENV_RERANKER_TIMEOUT_MS: &'static str = "GATEKEEPER_RERANKER_TIMEOUT_MS";
    const ENV_TRANSLATOR_MODEL: &'static str = "GATEKEEPER_TRANSLATOR_MODEL";
    const ENV_VERIFIER_CACHE_CAPACITY: &'static str = "GATEKEEPER_VERIFIER_CACHE_CAPACITY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let corpus_path = parse_path_from_env(Self::ENV_CORPUS_PATH, defaults.corpus_path);
        let embeddings_path =
            parse_path_from_env(Self::ENV_EMBEDDINGS_PATH, defaults.embeddings_path);
        let embeddings_key = parse_optional_from_env(Self::ENV_EMBEDDINGS_KEY)
            .unwrap_or(defaults.embeddings_key);
        let model_path = parse_optional_from_env(Self::ENV_MODEL_PATH).map(PathBuf::from);
        let reranker_url = parse_optional_from_env(Self::ENV_RERANKER_URL);
        let reranker_model = parse_optional_from_env(Self::ENV_RERANKER_MODEL)
            .unwrap_or(defaults.reranker_model);
        let reranker_path = parse_optional_from_env(Self::ENV_RERANKER_PATH).map(PathBuf::from);
        let timeout_ms: u64 =
            parse_number_from_env(Self::ENV_RERANKER_TIMEOUT_MS, DEFAULT_RERANKER_TIMEOUT_MS)?;
        let translator_model = parse_optional_from_env(Self::ENV_TRANSLATOR_MODEL);
        let verifier_cache_capacity = parse_number_from_env(
            Self::ENV_VERIFIER_CACHE_CAPACITY,
            defaults.verifier_cache_capacity,
        )?;
        let gate = GateConfig::from_env()?;

        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RERANKER_TIMEOUT_MS,
                value: "0".to_string(),
                reason: "timeout must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            port,
            bind_addr,
            corpus_path,
            embeddings_path,
            embeddings_key,
            model_path,
            reranker_url,
            reranker_model,
            reranker_path,
            reranker_timeout: Duration::from_millis(timeout_ms),
            translator_model,
            verifier_cache_capacity,
            gate,
        })
    }

    /// Validates paths, the reranker URL and gate thresholds.
    ///
    /// Data files may be absent (they are produced by `--build-index` or mounted later);
    /// only a path of the wrong kind is rejected. Model directories, when configured,
    /// must exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_file_if_present(&self.corpus_path)?;
        check_file_if_present(&self.embeddings_path)?;

        if let Some(ref path) = self.model_path {
            check_dir(path)?;
        }

        if let Some(ref path) = self.reranker_path {
            check_dir(path)?;
        }

        if let Some(ref url) = self.reranker_url {
            let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
                value: url.clone(),
                reason: e.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl {
                    value: url.clone(),
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
        }

        self.gate.validate()
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }
}

fn check_file_if_present(path: &Path) -> Result<(), ConfigError> {
    if path.exists() && !path.is_file() {
        return Err(ConfigError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn check_dir(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
    env::var(var_name).map(PathBuf::from).unwrap_or(default)
}

/// Trimmed value, `None` when unset or blank.
fn parse_optional_from_env(var_name: &str) -> Option<String> {
    env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a numeric variable; unset or blank means `default`, garbage is an error.
pub(crate) fn parse_number_from_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match parse_optional_from_env(name) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

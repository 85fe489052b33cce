use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_gatekeeper_env() {
    let keys: Vec<String> = env::vars()
        .map(|(k, _)| k)
        .filter(|k| k.starts_with("GATEKEEPER_"))
        .collect();
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for key in keys {
        unsafe { env::remove_var(key) };
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8003);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.corpus_path, PathBuf::from("./data/corpus.json"));
    assert_eq!(config.embeddings_path, PathBuf::from("./data/embeddings.npy"));
    assert_eq!(config.embeddings_key, "embeddings");
    assert!(config.model_path.is_none());
    assert!(config.reranker_url.is_none());
    assert_eq!(config.reranker_model, "Qwen3-Reranker-8B");
    assert_eq!(config.reranker_timeout, Duration::from_secs(10));
    assert!(config.translator_model.is_none());
    assert_eq!(config.gate, GateConfig::default());
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8003");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");

    let config = Config {
        bind_addr: "::1".parse().unwrap(),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "[::1]:8003");
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_gatekeeper_env();

    let config = Config::from_env().expect("should parse");
    assert_eq!(config.port, 8003);
    assert_eq!(config.verifier_cache_capacity, 10_000);
}

#[test]
#[serial]
fn test_from_env_custom_port() {
    clear_gatekeeper_env();

    with_env_vars(&[("GATEKEEPER_PORT", "3000")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.port, 3000);
    });
}

#[test]
#[serial]
fn test_from_env_ipv6_bind_addr() {
    clear_gatekeeper_env();

    with_env_vars(&[("GATEKEEPER_BIND_ADDR", "::1")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(
            config.bind_addr,
            IpAddr::V6(std::net::Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    });
}

#[test]
#[serial]
fn test_from_env_paths_and_models() {
    clear_gatekeeper_env();

    with_env_vars(
        &[
            ("GATEKEEPER_CORPUS_PATH", "/data/train_data_all.json"),
            ("GATEKEEPER_EMBEDDINGS_PATH", "/data/all_embeddings_bgem3.npz"),
            ("GATEKEEPER_EMBEDDINGS_KEY", "key_b"),
            ("GATEKEEPER_MODEL_PATH", "/models/bge-m3"),
            ("GATEKEEPER_RERANKER_URL", "http://localhost:8002"),
            ("GATEKEEPER_RERANKER_MODEL", "bge-reranker-v2-m3"),
            ("GATEKEEPER_RERANKER_TIMEOUT_MS", "2500"),
            ("GATEKEEPER_TRANSLATOR_MODEL", "gpt-4o-mini"),
        ],
        || {
            let config = Config::from_env().expect("should parse");

            assert_eq!(config.corpus_path, PathBuf::from("/data/train_data_all.json"));
            assert_eq!(
                config.embeddings_path,
                PathBuf::from("/data/all_embeddings_bgem3.npz")
            );
            assert_eq!(config.embeddings_key, "key_b");
            assert_eq!(config.model_path, Some(PathBuf::from("/models/bge-m3")));
            assert_eq!(config.reranker_url.as_deref(), Some("http://localhost:8002"));
            assert_eq!(config.reranker_model, "bge-reranker-v2-m3");
            assert_eq!(config.reranker_timeout, Duration::from_millis(2500));
            assert_eq!(config.translator_model.as_deref(), Some("gpt-4o-mini"));
        },
    );
}

#[test]
#[serial]
fn test_blank_optional_values_are_unset() {
    clear_gatekeeper_env();

    with_env_vars(
        &[
            ("GATEKEEPER_MODEL_PATH", "   "),
            ("GATEKEEPER_RERANKER_URL", ""),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert!(config.model_path.is_none());
            assert!(config.reranker_url.is_none());
        },
    );
}

#[test]
#[serial]
fn test_from_env_gate_thresholds() {
    clear_gatekeeper_env();

    with_env_vars(
        &[
            ("GATEKEEPER_VECTOR_THRESHOLD", "0.5"),
            ("GATEKEEPER_RERANK_AMBIGUOUS_THRESHOLD", "0.97"),
            ("GATEKEEPER_TOP_K", "8"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.gate.vector_threshold, 0.5);
            assert_eq!(config.gate.rerank_ambiguous_threshold, 0.97);
            assert_eq!(config.gate.top_k, 8);
            assert_eq!(config.gate.rerank_threshold, 0.85);
        },
    );
}

#[test]
#[serial]
fn test_invalid_threshold_is_an_error() {
    clear_gatekeeper_env();

    with_env_vars(&[("GATEKEEPER_RERANK_THRESHOLD", "high")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "GATEKEEPER_RERANK_THRESHOLD",
                ..
            }
        ));
    });

    with_env_vars(&[("GATEKEEPER_RERANK_THRESHOLD", "1.2")], || {
        assert!(Config::from_env().is_err());
    });
}

#[test]
#[serial]
fn test_zero_top_k_is_an_error() {
    clear_gatekeeper_env();

    with_env_vars(&[("GATEKEEPER_TOP_K", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("top_k"));
    });
}

#[test]
#[serial]
fn test_zero_timeout_is_an_error() {
    clear_gatekeeper_env();

    with_env_vars(&[("GATEKEEPER_RERANKER_TIMEOUT_MS", "0")], || {
        assert!(matches!(
            Config::from_env().unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    });
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_gatekeeper_env();

    with_env_vars(&[("GATEKEEPER_PORT", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("invalid port"));
    });
}

#[test]
#[serial]
fn test_invalid_port_not_number() {
    clear_gatekeeper_env();

    with_env_vars(&[("GATEKEEPER_PORT", "not_a_port")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::PortParseError { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_gatekeeper_env();

    with_env_vars(&[("GATEKEEPER_BIND_ADDR", "not.an.ip.address")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    });
}

#[test]
fn test_validate_success_with_defaults() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_corpus_path_is_directory() {
    let config = Config {
        corpus_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src"),
        ..Default::default()
    };
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::NotAFile { .. }
    ));
}

#[test]
fn test_validate_nonexistent_model_path() {
    let config = Config {
        model_path: Some(PathBuf::from("/nonexistent/path/to/bge-m3")),
        ..Default::default()
    };
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::PathNotFound { .. }
    ));
}

#[test]
fn test_validate_reranker_path_is_file() {
    let config = Config {
        reranker_path: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")),
        ..Default::default()
    };
    assert!(matches!(
        config.validate().unwrap_err(),
        ConfigError::NotADirectory { .. }
    ));
}

#[test]
fn test_validate_reranker_url() {
    let bad = Config {
        reranker_url: Some("not a url".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        bad.validate().unwrap_err(),
        ConfigError::InvalidUrl { .. }
    ));

    let wrong_scheme = Config {
        reranker_url: Some("ftp://localhost:8002".to_string()),
        ..Default::default()
    };
    assert!(wrong_scheme.validate().is_err());

    let good = Config {
        reranker_url: Some("http://localhost:8002".to_string()),
        ..Default::default()
    };
    assert!(good.validate().is_ok());
}

#[test]
fn test_validate_success_with_valid_paths() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let config = Config {
        corpus_path: manifest_dir.join("Cargo.toml"),
        model_path: Some(manifest_dir.join("src")),
        reranker_path: Some(manifest_dir.join("src")),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = ConfigError::InvalidPort {
        value: "0".to_string(),
    };
    assert!(err.to_string().contains("1 and 65535"));

    let err = ConfigError::PathNotFound {
        path: PathBuf::from("/some/path"),
    };
    assert!(err.to_string().contains("/some/path"));

    let err = ConfigError::InvalidValue {
        name: "GATEKEEPER_TOP_K",
        value: "x".to_string(),
        reason: "bad".to_string(),
    };
    assert!(err.to_string().contains("GATEKEEPER_TOP_K"));
}

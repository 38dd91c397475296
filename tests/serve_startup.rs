#![cfg(feature = "server")]

use std::path::PathBuf;

use titanic_predictor::config::{Config, ModelConfig, ServerConfig};
use titanic_predictor::model::loader;
use titanic_predictor::server;

#[test]
fn test_serve_refuses_to_start_without_a_model() {
    let dir = tempfile::tempdir().unwrap();
    let missing: PathBuf = dir.path().join("titanic_survival_model.json");
    let config = Config {
        server: ServerConfig {
            bind: "127.0.0.1:0".to_string(),
            workers: 1,
        },
        model: ModelConfig {
            path: missing.clone(),
            sha256: None,
        },
    };

    let err = server::serve(&config).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("refusing to serve"), "{chain}");
    assert!(chain.contains("failed to read model artifact"), "{chain}");

    // The process-wide cache was created for this path and stays empty.
    let cache = loader::global(&missing, None);
    assert_eq!(cache.path(), missing.as_path());
    assert!(!cache.is_loaded());
}

#![allow(dead_code)]
use std::path::Path;

use renewcast::config::{
    CacheConfig, Config, EntsoeConfig, LoggingConfig, ModelsConfig, PipelineConfig, ServerConfig,
    StorageConfig,
};

/// Configuration rooted in `root` with every output inside it.
pub fn test_config(root: &Path, token: Option<&str>) -> Config {
    Config {
        entsoe: EntsoeConfig {
            token: token.map(str::to_string),
            base_url: "http://127.0.0.1:9/api".to_string(),
            http_timeout_seconds: 5,
        },
        models: ModelsConfig {
            dir: root.join("models"),
            metadata_file: "metadata.json".to_string(),
        },
        storage: StorageConfig {
            predictions_dir: root.join("data/predictions"),
            logs_dir: root.join("data/logs"),
        },
        cache: CacheConfig::default(),
        pipeline: PipelineConfig::default(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 5,
        },
        logging: LoggingConfig::default(),
    }
}

/// Writes `<CC>_v<N>.json` linear models holding the last value, plus metadata.
pub fn write_models(dir: &Path, models: &[(&str, usize)]) {
    std::fs::create_dir_all(dir).unwrap();
    let mut entries = Vec::new();
    for (name, input_sequence) in models {
        let mut coefficients = vec![0.0; input_sequence - 1];
        if let Some(last) = coefficients.last_mut() {
            *last = 1.0;
        }
        let model = serde_json::json!({"type": "linear", "coefficients": coefficients, "intercept": 0.0});
        std::fs::write(dir.join(format!("{name}.json")), model.to_string()).unwrap();
        let country = name.split('_').next().unwrap();
        entries.push(serde_json::json!({
            "name": name,
            "country": country,
            "input_sequence": input_sequence,
        }));
    }
    let metadata = serde_json::json!({ "models": entries });
    std::fs::write(dir.join("metadata.json"), metadata.to_string()).unwrap();
}

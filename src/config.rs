use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub entsoe: EntsoeConfig,
    pub models: ModelsConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntsoeConfig {
    #[serde(default)]
    pub token: Option<String>,
    pub base_url: String,
    pub http_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    pub dir: PathBuf,
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
}

impl ModelsConfig {
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(&self.metadata_file)
    }
}

fn default_metadata_file() -> String {
    "metadata.json".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub predictions_dir: PathBuf,
    pub logs_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub key_suffix: String,
    pub time_interval_minutes: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_suffix: "_forecast".to_string(),
            time_interval_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub history_days: i64,
    pub lookahead_days: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_days: 5,
            lookahead_days: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Loads `.config`/`.env` into the environment, then layers the TOML file,
    /// `RENEWCAST__` variables and the legacy `ENTSOE_TOKEN` / `PREDICTIONS_REDIS_URL`.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::from_filename(".config").ok();
        dotenvy::dotenv().ok();
        Ok(Self::figment(path.as_ref()).extract()?)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("RENEWCAST__").split("__"))
            .merge(Env::raw().only(&["ENTSOE_TOKEN"]).map(|_| "entsoe.token".into()))
            .merge(
                Env::raw()
                    .only(&["PREDICTIONS_REDIS_URL"])
                    .map(|_| "cache.redis_url".into()),
            )
    }

    /// Token with blank values treated as absent.
    pub fn entsoe_token(&self) -> Option<&str> {
        self.entsoe
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    const MINIMAL: &str = r#"
        [entsoe]
        base_url = "https://web-api.tp.entsoe.eu/api"
        http_timeout_seconds = 30

        [models]
        dir = "./models"

        [storage]
        predictions_dir = "./data/predictions"
        logs_dir = "./data/logs"

        [server]
        host = "127.0.0.1"
        port = 8080
        request_timeout_secs = 10
    "#;

    #[test]
    fn test_defaults_fill_optional_sections() {
        Jail::expect_with(|jail| {
            jail.create_file("renewcast.toml", MINIMAL)?;
            let cfg: Config = Config::figment(Path::new("renewcast.toml")).extract()?;
            assert_eq!(cfg.pipeline.history_days, 5);
            assert_eq!(cfg.pipeline.lookahead_days, 2);
            assert_eq!(cfg.cache.key_suffix, "_forecast");
            assert_eq!(cfg.models.metadata_path(), PathBuf::from("./models/metadata.json"));
            assert!(cfg.entsoe_token().is_none());
            Ok(())
        });
    }

    #[test]
    fn test_legacy_env_variables_are_mapped() {
        Jail::expect_with(|jail| {
            jail.create_file("renewcast.toml", MINIMAL)?;
            jail.set_env("ENTSOE_TOKEN", "abc-123");
            jail.set_env("PREDICTIONS_REDIS_URL", "redis://cache:6379");
            jail.set_env("RENEWCAST__SERVER__PORT", "9090");
            let cfg: Config = Config::figment(Path::new("renewcast.toml")).extract()?;
            assert_eq!(cfg.entsoe_token(), Some("abc-123"));
            assert_eq!(cfg.cache.redis_url.as_deref(), Some("redis://cache:6379"));
            assert_eq!(cfg.server.port, 9090);
            Ok(())
        });
    }

    #[test]
    fn test_partial_env_sections_keep_remaining_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("renewcast.toml", MINIMAL)?;
            jail.set_env("PREDICTIONS_REDIS_URL", "redis://cache:6379");
            jail.set_env("RENEWCAST__PIPELINE__HISTORY_DAYS", "9");
            let cfg: Config = Config::figment(Path::new("renewcast.toml")).extract()?;
            assert_eq!(cfg.cache.redis_url.as_deref(), Some("redis://cache:6379"));
            assert_eq!(cfg.cache.key_suffix, "_forecast");
            assert_eq!(cfg.cache.time_interval_minutes, 60);
            assert_eq!(cfg.pipeline.history_days, 9);
            assert_eq!(cfg.pipeline.lookahead_days, 2);
            Ok(())
        });
    }

    #[test]
    fn test_blank_token_counts_as_missing() {
        Jail::expect_with(|jail| {
            jail.create_file("renewcast.toml", MINIMAL)?;
            jail.set_env("ENTSOE_TOKEN", "   ");
            let cfg: Config = Config::figment(Path::new("renewcast.toml")).extract()?;
            assert!(cfg.entsoe_token().is_none());
            Ok(())
        });
    }
}

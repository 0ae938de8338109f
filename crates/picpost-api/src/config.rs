//! Application configuration loaded from the environment.
//!
//! [`AppConfig`] is built once at startup and passed explicitly to whatever
//! needs it. Variable names are matched case-insensitively.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use picpost_core::{defaults, Error, Result};
use picpost_db::PoolConfig;
use picpost_inference::OpenAIConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging settings (`LOG_FORMAT`, `LOG_FILE`, `LOG_ANSI`).
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Daily-rotated log file; stdout when unset.
    pub file: Option<PathBuf>,
    /// Force ANSI colors on or off; auto-detected when unset.
    pub ansi: Option<bool>,
}

/// OpenAI-compatible provider settings for the indexing helper.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiSettings {
    /// The helper is disabled when no key is configured.
    pub api_key: Option<String>,
    pub base_url: String,
    pub embed_model: String,
    pub vision_model: String,
}

impl OpenAiSettings {
    /// Backend configuration, or `None` when no API key is set.
    pub fn backend_config(&self) -> Option<OpenAIConfig> {
        let api_key = self.api_key.clone()?;
        Some(OpenAIConfig {
            base_url: self.base_url.clone(),
            api_key: Some(api_key),
            embed_model: self.embed_model.clone(),
            vision_model: self.vision_model.clone(),
            ..Default::default()
        })
    }
}

/// Runtime configuration for the server and admin tool.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub app_name: String,
    pub app_version: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Version prefix, always starting with `/` and without a trailing slash.
    pub api_prefix: String,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub storage_timeout: Duration,
    pub db_timeout: Duration,
    pub db_max_connections: u32,
    /// `None` disables the background orphan sweep.
    pub orphan_sweep_interval: Option<Duration>,
    pub orphan_min_age: Duration,
    pub openai: OpenAiSettings,
    pub log: LogSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: defaults::APP_NAME.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            debug: false,
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            cors_origins: parse_cors_origins(defaults::CORS_ORIGINS),
            api_prefix: defaults::API_PREFIX.to_string(),
            database_url: defaults::DATABASE_URL.to_string(),
            upload_dir: PathBuf::from(defaults::UPLOAD_DIR),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            storage_timeout: Duration::from_secs(defaults::STORAGE_TIMEOUT_SECS),
            db_timeout: Duration::from_secs(defaults::DB_TIMEOUT_SECS),
            db_max_connections: defaults::DB_MAX_CONNECTIONS,
            orphan_sweep_interval: Some(Duration::from_secs(defaults::ORPHAN_SWEEP_INTERVAL_SECS)),
            orphan_min_age: Duration::from_secs(defaults::ORPHAN_MIN_AGE_SECS),
            openai: OpenAiSettings {
                api_key: None,
                base_url: defaults::OPENAI_URL.to_string(),
                embed_model: defaults::EMBED_MODEL.to_string(),
                vision_model: defaults::VISION_MODEL.to_string(),
            },
            log: LogSettings {
                format: LogFormat::Text,
                file: None,
                ansi: None,
            },
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars()
            .map(|(k, v)| (k.to_ascii_uppercase(), v))
            .collect();
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Load from an arbitrary lookup keyed by upper-case variable name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let text = |key: &str, default: String| lookup(key).unwrap_or(default);

        let sweep_secs: u64 = parse_var(
            &lookup,
            "ORPHAN_SWEEP_INTERVAL_SECS",
            defaults::ORPHAN_SWEEP_INTERVAL_SECS,
        )?;

        let log_format = match lookup("LOG_FORMAT").map(|v| v.trim().to_ascii_lowercase()) {
            None => LogFormat::Text,
            Some(v) if v.is_empty() || v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(other) => {
                return Err(Error::Config(format!(
                    "LOG_FORMAT must be \"text\" or \"json\", got {:?}",
                    other
                )))
            }
        };

        let config = Self {
            app_name: text("APP_NAME", d.app_name),
            app_version: text("APP_VERSION", d.app_version),
            debug: parse_bool(&lookup, "DEBUG", false)?,
            host: text("HOST", d.host),
            port: parse_var(&lookup, "PORT", d.port)?,
            cors_origins: lookup("CORS_ORIGINS")
                .map(|v| parse_cors_origins(&v))
                .unwrap_or(d.cors_origins),
            api_prefix: normalize_prefix(&text("API_V1_PREFIX", d.api_prefix))?,
            database_url: text("DATABASE_URL", d.database_url),
            upload_dir: lookup("UPLOAD_DIR").map(PathBuf::from).unwrap_or(d.upload_dir),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", d.max_upload_bytes)?,
            storage_timeout: Duration::from_secs(parse_var(
                &lookup,
                "STORAGE_TIMEOUT_SECS",
                defaults::STORAGE_TIMEOUT_SECS,
            )?),
            db_timeout: Duration::from_secs(parse_var(
                &lookup,
                "DB_TIMEOUT_SECS",
                defaults::DB_TIMEOUT_SECS,
            )?),
            db_max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS", d.db_max_connections)?,
            orphan_sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            orphan_min_age: Duration::from_secs(parse_var(
                &lookup,
                "ORPHAN_MIN_AGE_SECS",
                defaults::ORPHAN_MIN_AGE_SECS,
            )?),
            openai: OpenAiSettings {
                api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
                base_url: text("OPENAI_BASE_URL", d.openai.base_url),
                embed_model: text("OPENAI_EMBED_MODEL", d.openai.embed_model),
                vision_model: text("OPENAI_VISION_MODEL", d.openai.vision_model),
            },
            log: LogSettings {
                format: log_format,
                file: lookup("LOG_FILE")
                    .filter(|v| !v.trim().is_empty())
                    .map(PathBuf::from),
                ansi: match lookup("LOG_ANSI").filter(|v| !v.trim().is_empty()) {
                    Some(_) => Some(parse_bool(&lookup, "LOG_ANSI", false)?),
                    None => None,
                },
            },
        };

        if config.db_max_connections == 0 {
            return Err(Error::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
        }
        if config.storage_timeout.is_zero() || config.db_timeout.is_zero() {
            return Err(Error::Config("Timeouts must be at least 1 second".to_string()));
        }
        Ok(config)
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings derived from this configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new()
            .max_connections(self.db_max_connections)
            .acquire_timeout(self.db_timeout)
    }
}

/// Split a comma-separated origin list, dropping blank entries.
pub fn parse_cors_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_prefix(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 {
        return Err(Error::Config(format!(
            "API_V1_PREFIX must be a non-root path starting with '/', got {:?}",
            raw
        )));
    }
    Ok(trimmed.to_string())
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {}={:?}: {}", key, raw, e))),
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(Error::Config(format!("Invalid {}={:?}: expected a boolean", key, v))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.app_name, "HelloWorld FastAPI");
        assert_eq!(config.app_version, "0.1.0");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.storage_timeout, Duration::from_secs(30));
        assert!(!config.debug);
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("APP_NAME", "Gallery"),
            ("APP_VERSION", "2.3.4"),
            ("PORT", "9090"),
            ("DEBUG", "True"),
            ("UPLOAD_DIR", "/srv/blobs"),
            ("LOG_FORMAT", "JSON"),
            ("LOG_ANSI", "0"),
        ])
        .unwrap();
        assert_eq!(config.app_name, "Gallery");
        assert_eq!(config.app_version, "2.3.4");
        assert_eq!(config.port, 9090);
        assert!(config.debug);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/blobs"));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.ansi, Some(false));
        assert_eq!(config.bind_addr(), "0.0.0.0:9090");
    }

    #[test]
    fn test_cors_origins_parsing() {
        assert_eq!(
            parse_cors_origins(" http://a.test , ,https://b.test,"),
            vec!["http://a.test", "https://b.test"]
        );
        assert!(parse_cors_origins("  ").is_empty());
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_invalid_bool_is_config_error() {
        let err = config_from(&[("DEBUG", "maybe")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_prefix_normalized() {
        let config = config_from(&[("API_V1_PREFIX", "/api/v2/")]).unwrap();
        assert_eq!(config.api_prefix, "/api/v2");
    }

    #[test]
    fn test_root_prefix_rejected() {
        assert!(config_from(&[("API_V1_PREFIX", "/")]).is_err());
        assert!(config_from(&[("API_V1_PREFIX", "api")]).is_err());
    }

    #[test]
    fn test_zero_sweep_interval_disables_sweep() {
        let config = config_from(&[("ORPHAN_SWEEP_INTERVAL_SECS", "0")]).unwrap();
        assert!(config.orphan_sweep_interval.is_none());
    }

    #[test]
    fn test_blank_openai_key_is_unset() {
        let config = config_from(&[("OPENAI_API_KEY", "  ")]).unwrap();
        assert!(config.openai.backend_config().is_none());

        let config = config_from(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        let backend = config.openai.backend_config().unwrap();
        assert_eq!(backend.api_key.as_deref(), Some("sk-test"));
        assert_eq!(backend.embed_dimension, 1536);
    }

    #[test]
    fn test_pool_config_follows_db_settings() {
        let config = config_from(&[("DB_MAX_CONNECTIONS", "4"), ("DB_TIMEOUT_SECS", "7")]).unwrap();
        let pool = config.pool_config();
        assert_eq!(pool.max_connections, 4);
        assert_eq!(pool.acquire_timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(config_from(&[("DB_TIMEOUT_SECS", "0")]).is_err());
    }
}

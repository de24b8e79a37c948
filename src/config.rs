use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const ENV_PREFIX: &str = "CLIENTS_API";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub query_timeout_ms: u64,
    /// Enforce uniqueness of `(email, title, content, mailing_id)` among live rows.
    pub unique_customers: bool,
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

/// Shared-secret header check applied to every route.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub header: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracingConfig {
    /// Header carrying the per-request correlation id.
    pub header: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanupConfig {
    pub interval_ms: u64,
    pub max_age_secs: u64,
}

impl CleanupConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub dir: String,
    pub file_prefix: String,
}

impl LoggingConfig {
    /// Creates the log directory; the rolling file writer cannot do without it.
    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| format!("cannot create log directory {}", self.dir))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub tracing: TracingConfig,
    pub cleanup: CleanupConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

/// Loads the configuration: embedded defaults -> clients-api.toml -> $CLIENTS_API_CONFIG -> env.
pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    load_with_env(environment())
}

/// Environment source used by [`load`]: `CLIENTS_API__SERVER__PORT=3000` and friends.
pub fn environment() -> ::config::Environment {
    ::config::Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__").try_parsing(true)
}

pub fn load_with_env(env: ::config::Environment) -> anyhow::Result<AppConfig> {
    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: clients-api.toml (in CWD)
        .add_source(::config::File::with_name("clients-api").required(false));

    if let Ok(custom_path) = std::env::var("CLIENTS_API_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(env);

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }
    if cfg.server.body_limit_bytes == 0 {
        return Err(anyhow::anyhow!("server.body_limit_bytes must be > 0"));
    }

    if cfg.database.max_connections == 0 {
        return Err(anyhow::anyhow!("database.max_connections must be > 0"));
    }
    if cfg.database.query_timeout_ms == 0 {
        return Err(anyhow::anyhow!("database.query_timeout_ms must be > 0"));
    }

    if cfg.auth.header.trim().is_empty() {
        return Err(anyhow::anyhow!("auth.header must not be empty"));
    }
    if cfg.auth.token.is_empty() {
        return Err(anyhow::anyhow!("auth.token must not be empty"));
    }
    if cfg.tracing.header.trim().is_empty() {
        return Err(anyhow::anyhow!("tracing.header must not be empty"));
    }

    if cfg.cleanup.interval_ms == 0 {
        return Err(anyhow::anyhow!("cleanup.interval_ms must be > 0"));
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        // Strip query parameters such as ?mode=rwc
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path == ":memory:" {
            return Ok(());
        }
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory holding the daily `<DD-MM-YY>.log` files.
    pub dir: PathBuf,
    /// Mirror every line to stdout.
    pub console: bool,
    /// Add the log files to `gitignore_path` on startup.
    pub gitignore: bool,
    /// The pattern is anchored at this file's directory; skipped when `dir`
    /// lies outside it.
    pub gitignore_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            console: true,
            gitignore: true,
            gitignore_path: PathBuf::from(".gitignore"),
        }
    }
}

impl AppConfig {
    /// Defaults, then the optional file named by `CONFIG_PATH`, then
    /// `DAYLOG_*` variables (e.g. `DAYLOG_LOGGING__DIR`), then `HOST`/`PORT`.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CONFIG_PATH")
            .unwrap_or_else(|_| "config/default".to_string());

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(
                config::Environment::with_prefix("DAYLOG")
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Ok(host) = std::env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port.parse::<u16>()?)?;
        }

        let settings = builder.build()?;
        let config: AppConfig = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

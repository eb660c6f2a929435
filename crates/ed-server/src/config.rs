use std::env;
use std::time::Duration;

use crate::error::ServerError;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub url_prefix: String,
    pub annotate_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 9000,
            url_prefix: "/".to_string(),
            annotate_delay: Duration::ZERO,
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, ServerError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(ServerError::Config {
                    key: ".env",
                    reason: e.to_string(),
                });
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ServerError::Config {
                key: "PORT",
                reason: format!("{:?}: {}", raw, e),
            })?,
            None => defaults.port,
        };

        let annotate_delay = match lookup("ED_ANNOTATE_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse::<u64>().map_err(|e| ServerError::Config {
                key: "ED_ANNOTATE_DELAY_MS",
                reason: format!("{:?}: {}", raw, e),
            })?),
            None => defaults.annotate_delay,
        };

        Ok(Self {
            port,
            url_prefix: lookup("ED_URL_PREFIX").unwrap_or(defaults.url_prefix),
            annotate_delay,
        })
    }
}

use std::env;
use std::str::FromStr;
use std::time::Duration;

use ed_core::job_path;
use serde::Deserialize;

use crate::error::AppError;

/// The page configuration blob the hosting server injects (`ED_PAGE_CONFIG`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    #[serde(default)]
    pub greeting: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            url_prefix: default_url_prefix(),
            greeting: None,
            username: None,
        }
    }
}

fn default_url_prefix() -> String {
    "/".to_string()
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub page: PageConfig,
    pub poll_interval: Duration,
    pub max_dimension: f32,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Read `.env` if there is one, then the process environment.
    pub fn load() -> Result<Self, AppError> {
        match dotenvy::dotenv() {
            Ok(path) => log::info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(AppError::Config {
                    key: ".env",
                    reason: e.to_string(),
                });
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let page = match lookup("ED_PAGE_CONFIG") {
            Some(blob) => serde_json::from_str(&blob).map_err(|e| AppError::Config {
                key: "ED_PAGE_CONFIG",
                reason: e.to_string(),
            })?,
            None => PageConfig::default(),
        };

        let poll_interval = Duration::from_millis(parse_or(&lookup, "ED_POLL_INTERVAL_MS", 1000)?);
        if poll_interval.is_zero() {
            return Err(AppError::Config {
                key: "ED_POLL_INTERVAL_MS",
                reason: "must be at least 1".to_string(),
            });
        }

        let max_dimension: f32 = parse_or(&lookup, "ED_MAX_DIMENSION", 600.0)?;
        if !max_dimension.is_finite() || max_dimension <= 0.0 {
            return Err(AppError::Config {
                key: "ED_MAX_DIMENSION",
                reason: format!("{} is not a positive size", max_dimension),
            });
        }

        let request_timeout = Duration::from_secs(parse_or(&lookup, "ED_REQUEST_TIMEOUT_SECS", 10)?);
        if request_timeout.is_zero() {
            return Err(AppError::Config {
                key: "ED_REQUEST_TIMEOUT_SECS",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            backend_url: lookup("ED_BACKEND_URL").unwrap_or_else(|| "http://127.0.0.1:9000".to_string()),
            page,
            poll_interval,
            max_dimension,
            request_timeout,
        })
    }

    /// Absolute URL of the job endpoint.
    pub fn job_url(&self) -> String {
        format!("{}{}", self.backend_url.trim_end_matches('/'), job_path(&self.page.url_prefix))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| AppError::Config {
            key,
            reason: format!("{:?}: {}", raw, e),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
        assert_eq!(config.max_dimension, 600.0);
        assert_eq!(config.page, PageConfig::default());
        assert_eq!(config.job_url(), "http://127.0.0.1:9000/job");
    }

    #[test]
    fn test_page_blob() {
        let config = config(&[
            ("ED_BACKEND_URL", "http://edge.local/"),
            ("ED_PAGE_CONFIG", r#"{"urlPrefix": "/user/ana/", "username": "ana"}"#),
        ])
        .unwrap();

        assert_eq!(config.page.username.as_deref(), Some("ana"));
        assert_eq!(config.page.greeting, None);
        assert_eq!(config.job_url(), "http://edge.local/user/ana/job");
    }

    #[test]
    fn test_bad_interval() {
        let err = config(&[("ED_POLL_INTERVAL_MS", "soon")]).unwrap_err();
        assert!(matches!(err, AppError::Config { key: "ED_POLL_INTERVAL_MS", .. }));
    }

    #[test]
    fn test_zero_interval() {
        let err = config(&[("ED_POLL_INTERVAL_MS", "0")]).unwrap_err();
        assert!(matches!(err, AppError::Config { key: "ED_POLL_INTERVAL_MS", .. }));

        let err = config(&[("ED_REQUEST_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, AppError::Config { key: "ED_REQUEST_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn test_bad_max_dimension() {
        for raw in ["0", "-600", "NaN", "inf"] {
            let err = config(&[("ED_MAX_DIMENSION", raw)]).unwrap_err();
            assert!(matches!(err, AppError::Config { key: "ED_MAX_DIMENSION", .. }), "{}", raw);
        }

        let config = config(&[("ED_MAX_DIMENSION", "320.5")]).unwrap();
        assert_eq!(config.max_dimension, 320.5);
    }

    #[test]
    fn test_bad_blob() {
        let err = config(&[("ED_PAGE_CONFIG", "{urlPrefix")]).unwrap_err();
        assert!(matches!(err, AppError::Config { key: "ED_PAGE_CONFIG", .. }));
    }
}

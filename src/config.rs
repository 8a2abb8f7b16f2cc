//! Runtime configuration, read from the environment (and `.env`, if present).

use crate::error::{AppError, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro-latest";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PAGES_URL_TEMPLATE: &str = "https://{owner}.github.io/{repo}/";

const REQUIRED_VARS: [&str; 3] = ["MY_SECRET", "GITHUB_TOKEN", "GOOGLE_API_KEY"];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_mb: usize,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub api_url: String,
    pub pages_url_template: String,
}

/// Retry tuning for the Pages probe and the evaluation callback.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub pages_poll_attempts: u32,
    pub pages_poll_interval: Duration,
    pub notify_max_attempts: u32,
    pub notify_initial_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub dir: Option<String>,
    pub format: LogFormat,
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret: String,
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub github: GitHubConfig,
    pub retry: RetryConfig,
    pub log: LogConfig,
}

impl Config {
    /// Loads `.env` (if any) and builds the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            error!("Missing required environment variables: {:?}", missing);
            return Err(AppError::Config(format!(
                "Missing one or more required environment variables: {}",
                missing.join(", ")
            )));
        }

        let required = |key: &str| get(key).unwrap_or_default();

        Ok(Self {
            secret: required("MY_SECRET"),
            server: ServerConfig {
                host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: parse_or(&get, "PORT", DEFAULT_PORT)?,
                max_body_mb: parse_or(&get, "MAX_BODY_MB", 25)?,
            },
            gemini: GeminiConfig {
                api_key: required("GOOGLE_API_KEY"),
                api_url: trim_url(get("GEMINI_API_URL"), DEFAULT_GEMINI_API_URL),
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
            github: GitHubConfig {
                token: required("GITHUB_TOKEN"),
                api_url: trim_url(get("GITHUB_API_URL"), DEFAULT_GITHUB_API_URL),
                pages_url_template: get("PAGES_URL_TEMPLATE")
                    .unwrap_or_else(|| DEFAULT_PAGES_URL_TEMPLATE.to_string()),
            },
            retry: RetryConfig {
                pages_poll_attempts: parse_or(&get, "PAGES_POLL_ATTEMPTS", 15)?,
                pages_poll_interval: Duration::from_secs(parse_or(
                    &get,
                    "PAGES_POLL_INTERVAL_SECS",
                    10,
                )?),
                notify_max_attempts: parse_or(&get, "NOTIFY_MAX_ATTEMPTS", 5)?,
                notify_initial_delay: Duration::from_secs(parse_or(
                    &get,
                    "NOTIFY_INITIAL_DELAY_SECS",
                    1,
                )?),
            },
            log: LogConfig {
                dir: get("LOG_DIR"),
                format: match get("LOG_FORMAT") {
                    Some(raw) => raw.parse().map_err(AppError::Config)?,
                    None => LogFormat::Text,
                },
            },
        })
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| {
            AppError::Config(format!("Invalid value for {}: '{}' ({})", key, raw, e))
        }),
        None => Ok(default),
    }
}

fn trim_url(value: Option<String>, default: &str) -> String {
    value
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

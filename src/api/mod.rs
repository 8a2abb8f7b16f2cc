//! Provides clients for the external services the deployer talks to.
//!
//! Includes:
//! - `gemini`: Client for the Gemini `generateContent` API.
//! - `github`: Client for the GitHub REST API (repos, contents, Pages).
//! - `pages`: Liveness probe for a published GitHub Pages site.
//! - `evaluation`: Callback notifier with exponential backoff.

mod evaluation;
mod gemini;
mod github;
mod pages;


pub use evaluation::*;
pub use gemini::*;
pub use github::*;
pub use pages::*;

use crate::error::{AppError, Result};
use reqwest::Response;
use tracing::error;

/// Passes 2xx responses through; turns anything else into `AppError::Upstream`
/// carrying the status and response body.
pub(crate) async fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    error!(
        "{} request to {} failed with status {}: {}",
        service,
        url,
        status,
        truncate(&body, 200)
    );
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        error!("Received 401/403 from {}. Check the configured credentials.", service);
    }

    Err(AppError::Upstream {
        service,
        status: status.as_u16(),
        body,
    })
}

/// First `max` characters of `s` (char-boundary safe).
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("µg/m³", 2), "µg");
    }
}

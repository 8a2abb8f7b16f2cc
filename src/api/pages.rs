//! Polls a GitHub Pages URL until the site responds.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{error, info};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct PagesProbe {
    client: Client,
    attempts: u32,
    interval: Duration,
}

impl PagesProbe {
    pub fn new(client: Client, attempts: u32, interval: Duration) -> Self {
        Self {
            client,
            attempts,
            interval,
        }
    }

    /// Returns `true` as soon as `url` answers 200, `false` once all attempts are spent.
    pub async fn wait_until_live(&self, url: &str) -> bool {
        info!("Waiting for Pages site to go live at {}...", url);
        for attempt in 1..=self.attempts {
            match self.client.get(url).timeout(PROBE_TIMEOUT).send().await {
                Ok(resp) if resp.status() == StatusCode::OK => {
                    info!(
                        "Attempt {}/{}: Pages site is LIVE!",
                        attempt, self.attempts
                    );
                    return true;
                },
                Ok(resp) => info!(
                    "Attempt {}/{}: Status code {}. Site not ready.",
                    attempt,
                    self.attempts,
                    resp.status().as_u16()
                ),
                Err(e) => info!(
                    "Attempt {}/{}: Connection failed ({}). Retrying...",
                    attempt, self.attempts, e
                ),
            }
            tokio::time::sleep(self.interval).await;
        }

        error!("GitHub Pages did not become active in time.");
        false
    }
}

//! Reports deployment results to the evaluation callback URL.

use crate::api::truncate;
use crate::models::NotificationPayload;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(15);

/// Delays between attempts: `initial`, then doubling, clamped at `Duration::MAX`.
pub(crate) fn backoff_schedule(initial: Duration) -> impl Iterator<Item = Duration> {
    std::iter::successors(Some(initial), |delay| Some(delay.saturating_mul(2)))
}

/// POSTs a `NotificationPayload`, retrying with exponential backoff until a 200 arrives.
#[derive(Clone)]
pub struct EvaluationNotifier {
    client: Client,
    max_attempts: u32,
    initial_delay: Duration,
}

impl EvaluationNotifier {
    pub fn new(client: Client, max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            client,
            max_attempts,
            initial_delay,
        }
    }

    /// Returns whether the callback accepted the payload. Failures are logged, never raised.
    pub async fn notify(&self, url: &str, payload: &NotificationPayload) -> bool {
        info!("Notifying evaluation API at {}", url);
        if let Ok(pretty) = serde_json::to_string_pretty(payload) {
            debug!("Payload: {}", pretty);
        }

        let delays = backoff_schedule(self.initial_delay);
        for (attempt, delay) in (1..=self.max_attempts).zip(delays) {
            match self
                .client
                .post(url)
                .json(payload)
                .timeout(NOTIFY_TIMEOUT)
                .send()
                .await
            {
                Ok(resp) if resp.status() == StatusCode::OK => {
                    info!("Successfully notified evaluation API (Status 200).");
                    return true;
                },
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    warn!(
                        "Attempt {}/{}: API returned status {}. Body: {}... Retrying...",
                        attempt,
                        self.max_attempts,
                        status,
                        truncate(&body, 100)
                    );
                },
                Err(e) => warn!(
                    "Attempt {}/{}: Failed to connect to API. Error: {}. Retrying...",
                    attempt, self.max_attempts, e
                ),
            }
            tokio::time::sleep(delay).await;
        }

        error!("Failed to notify evaluation API after multiple retries.");
        false
    }
}

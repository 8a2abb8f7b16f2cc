use crate::pipeline::Deployer;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

#[derive(Clone)]
pub struct AppState {
    pub secret: Arc<str>,
    pub deployer: Arc<Deployer>,
    /// Deployments started by `/build-my-app`; drained before the process exits.
    pub jobs: TaskTracker,
}

impl AppState {
    pub fn new(secret: impl Into<Arc<str>>, deployer: Deployer) -> Self {
        Self {
            secret: secret.into(),
            deployer: Arc::new(deployer),
            jobs: TaskTracker::new(),
        }
    }
}

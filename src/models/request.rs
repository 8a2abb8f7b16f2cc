use serde::{Deserialize, Serialize};

/// A file shipped with a project request, encoded as a data URI
/// (`data:<mime>;base64,<payload>`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// Body of `POST /build-my-app`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProjectRequest {
    pub email: String,
    pub secret: String,
    pub task: String,
    pub round: i64,
    pub nonce: String,
    pub brief: String,
    pub checks: Vec<String>,
    pub evaluation_url: String,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

/// Generic `{status, message}` body returned by the service.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn new(status: &str, message: &str) -> Self {
        Self {
            status: status.to_string(),
            message: message.to_string(),
        }
    }
}

/// Error body: `{"detail": "..."}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Report sent to the evaluation callback once a deployment is done.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NotificationPayload {
    pub email: String,
    pub task: String,
    pub round: i64,
    pub nonce: String,
    pub repo_url: String,
    pub commit_sha: String,
    pub pages_url: String,
}

/// Ordered set of files to commit, keyed by repository path.
///
/// Inserting a path that is already present replaces its content but keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedFiles {
    files: Vec<(String, String)>,
}

impl GeneratedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        match self.files.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = content,
            None => self.files.push((path, content)),
        }
    }

    /// Inserts every file from `other`, overriding paths that already exist.
    pub fn extend(&mut self, other: GeneratedFiles) {
        for (path, content) in other.files {
            self.insert(path, content);
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|(p, _)| p.as_str()).collect()
    }
}

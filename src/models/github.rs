//! Wire types for the subset of the GitHub REST API the publisher uses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Owner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRepoRequest<'a> {
    pub name: &'a str,
    pub private: bool,
}

/// Metadata returned by `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub sha: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PutFileRequest<'a> {
    pub message: &'a str,
    /// Base64-encoded file content.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PutFileResponse {
    pub commit: CommitRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PagesRequest<'a> {
    pub source: PagesSource<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PagesSource<'a> {
    pub branch: &'a str,
    pub path: &'a str,
}

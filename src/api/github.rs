//! Provides a client for the GitHub REST API.
//!
//! Only the calls needed to publish a static site are covered: resolving the
//! authenticated user, creating or looking up a repository, writing files
//! through the contents API and switching on GitHub Pages.

use crate::api::ensure_success;
use crate::config::GitHubConfig;
use crate::error::{AppError, Result};
use crate::models::{
    ContentFile, CreateRepoRequest, GitHubUser, PagesRequest, PagesSource, PutFileRequest,
    PutFileResponse, Repository,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, error, info};

const USER_AGENT: &str = concat!("app-deployer/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// An asynchronous client for the GitHub REST API, authenticated with a token.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    token: String,
    base_url: String,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` from configuration.
    pub fn new(client: Client, config: &GitHubConfig) -> Self {
        Self {
            client,
            token: config.token.clone(),
            base_url: config.api_url.clone(),
        }
    }

    /// Creates a client against a custom base URL (e.g. a mock server).
    #[cfg(test)]
    pub fn new_with_base_url(token: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        builder.send().await.map_err(|e| {
            error!("Error calling GitHub: {}", e);
            AppError::from(e)
        })
    }

    /// `GET /user`
    pub async fn authenticated_user(&self) -> Result<GitHubUser> {
        let response = self.send(self.request(reqwest::Method::GET, "/user")).await?;
        let user: GitHubUser = ensure_success("github", response).await?.json().await?;
        debug!("Authenticated to GitHub as {}", user.login);
        Ok(user)
    }

    /// `POST /user/repos` creating a public repository.
    pub async fn create_repo(&self, name: &str) -> Result<Repository> {
        let response = self
            .send(
                self.request(reqwest::Method::POST, "/user/repos")
                    .json(&CreateRepoRequest {
                        name,
                        private: false,
                    }),
            )
            .await?;
        let repo: Repository = ensure_success("github", response).await?.json().await?;
        info!("Repo '{}' created successfully", repo.full_name);
        Ok(repo)
    }

    /// `GET /repos/{owner}/{name}`
    pub async fn get_repo(&self, owner: &str, name: &str) -> Result<Repository> {
        let path = format!("/repos/{}/{}", owner, name);
        let response = self.send(self.request(reqwest::Method::GET, &path)).await?;
        Ok(ensure_success("github", response).await?.json().await?)
    }

    /// Blob SHA of `path` in `full_name`, or `None` if the file does not exist yet.
    pub async fn get_file_sha(&self, full_name: &str, path: &str) -> Result<Option<String>> {
        let url_path = format!("/repos/{}/contents/{}", full_name, path);
        let response = self
            .send(self.request(reqwest::Method::GET, &url_path))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let file: ContentFile = ensure_success("github", response).await?.json().await?;
        Ok(Some(file.sha))
    }

    /// Creates or (when `sha` is given) updates `path`, returning the new commit SHA.
    pub async fn put_file(
        &self,
        full_name: &str,
        path: &str,
        message: &str,
        content: &str,
        sha: Option<&str>,
    ) -> Result<String> {
        let url_path = format!("/repos/{}/contents/{}", full_name, path);
        let body = PutFileRequest {
            message,
            content: STANDARD.encode(content.as_bytes()),
            sha,
        };
        let response = self
            .send(self.request(reqwest::Method::PUT, &url_path).json(&body))
            .await?;
        let put: PutFileResponse = ensure_success("github", response).await?.json().await?;
        Ok(put.commit.sha)
    }

    /// `POST /repos/{full_name}/pages` serving the root of `main`.
    pub async fn enable_pages(&self, full_name: &str) -> Result<()> {
        let path = format!("/repos/{}/pages", full_name);
        let body = PagesRequest {
            source: PagesSource {
                branch: "main",
                path: "/",
            },
        };
        let response = self
            .send(self.request(reqwest::Method::POST, &path).json(&body))
            .await?;
        ensure_success("github", response).await?;
        Ok(())
    }
}

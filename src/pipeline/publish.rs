//! Pushes generated files to a GitHub repository and switches on Pages.

use crate::api::GitHubClient;
use crate::error::Result;
use crate::models::{GeneratedFiles, Repository};
use chrono::{Datelike, Utc};
use tracing::{error, info, warn};

/// A repository after all files have been committed.
#[derive(Debug, Clone)]
pub struct PublishedRepo {
    pub repo: Repository,
    pub commit_sha: String,
}

pub fn mit_license(year: i32) -> String {
    format!(
        "MIT License

Copyright (c) {year}

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
"
    )
}

pub fn readme(repo_name: &str, brief: &str) -> String {
    format!(
        "# {}\n\n## Project Brief\n{}\n\n## Setup\nNo setup required.\n\n## License\nMIT License.",
        repo_name, brief
    )
}

/// `LICENSE` and `README.md` first, then the generated files (which win on a path clash).
pub fn files_to_commit(repo_name: &str, brief: &str, generated: GeneratedFiles) -> GeneratedFiles {
    let mut files = GeneratedFiles::new();
    files.insert("LICENSE", mit_license(Utc::now().year()));
    files.insert("README.md", readme(repo_name, brief));
    files.extend(generated);
    files
}

/// Renders `{owner}` and `{repo}` into the Pages URL template.
pub fn render_pages_url(template: &str, owner: &str, repo: &str) -> String {
    template.replace("{owner}", owner).replace("{repo}", repo)
}

#[derive(Clone)]
pub struct RepoPublisher {
    github: GitHubClient,
    pages_url_template: String,
}

impl RepoPublisher {
    pub fn new(github: GitHubClient, pages_url_template: impl Into<String>) -> Self {
        Self {
            github,
            pages_url_template: pages_url_template.into(),
        }
    }

    /// Creates the repository, or reuses it if the authenticated user already owns one by that name.
    async fn create_or_reuse(&self, repo_name: &str) -> Result<Repository> {
        info!("Creating/Updating GitHub repo: {}", repo_name);
        match self.github.create_repo(repo_name).await {
            Ok(repo) => {
                info!("Repo URL: {}", repo.html_url);
                Ok(repo)
            },
            Err(e) if e.is_repo_name_taken() => {
                warn!("Repo '{}' already exists. Will update it.", repo_name);
                let user = self.github.authenticated_user().await?;
                self.github.get_repo(&user.login, repo_name).await
            },
            Err(e) => {
                error!(
                    "FATAL GitHub Creation Error (status {:?}): {}",
                    e.upstream_status(),
                    e
                );
                Err(e)
            },
        }
    }

    /// Commits every file (one commit per file) and returns the SHA of the last commit.
    pub async fn publish(
        &self,
        repo_name: &str,
        generated: GeneratedFiles,
        brief: &str,
        commit_message: &str,
    ) -> Result<PublishedRepo> {
        let repo = self.create_or_reuse(repo_name).await?;
        let files = files_to_commit(repo_name, brief, generated);

        info!("Committing {} files: {:?}", files.len(), files.paths());
        let mut commit_sha = String::new();
        for (path, content) in files.iter() {
            let existing = self.github.get_file_sha(&repo.full_name, path).await?;
            let updating = existing.is_some();
            commit_sha = self
                .github
                .put_file(
                    &repo.full_name,
                    path,
                    commit_message,
                    content,
                    existing.as_deref(),
                )
                .await?;
            if updating {
                info!("  -> Updated {}", path);
            } else {
                info!("  -> Created {}", path);
            }
            info!("Current SHA: {}", commit_sha);
        }

        Ok(PublishedRepo { repo, commit_sha })
    }

    /// Switches Pages on (best effort) and returns the site URL.
    pub async fn enable_pages(&self, repo: &Repository) -> String {
        info!("Enabling GitHub Pages...");
        match self.github.enable_pages(&repo.full_name).await {
            Ok(()) => info!("Pages source set to 'main' branch, root directory."),
            Err(e) => warn!(
                "Could not enable GitHub pages automatically (may already be on): {}",
                e
            ),
        }
        render_pages_url(&self.pages_url_template, &repo.owner.login, &repo.name)
    }
}

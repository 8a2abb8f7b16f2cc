use crate::api::{EvaluationNotifier, GeminiClient, GitHubClient, PagesProbe};
use crate::config::Config;
use crate::error::Result;
use crate::models::{NotificationPayload, ProjectRequest};
use crate::pipeline::{CodeGenerator, RepoPublisher};
use tracing::{error, info, warn};

/// What a background deployment achieved.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployOutcome {
    /// The repo could not be created or written; nothing was reported.
    PublishFailed(String),
    Completed {
        repo_url: String,
        commit_sha: String,
        pages_url: String,
        pages_live: bool,
        notified: bool,
    },
}

/// Runs a project request end to end: generate, publish, wait for Pages, report.
#[derive(Clone)]
pub struct Deployer {
    generator: CodeGenerator,
    publisher: RepoPublisher,
    probe: PagesProbe,
    notifier: EvaluationNotifier,
}

impl Deployer {
    pub fn new(
        generator: CodeGenerator,
        publisher: RepoPublisher,
        probe: PagesProbe,
        notifier: EvaluationNotifier,
    ) -> Self {
        Self {
            generator,
            publisher,
            probe,
            notifier,
        }
    }

    /// Wires all collaborators from configuration, sharing one HTTP connection pool.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::new(
            CodeGenerator::new(GeminiClient::new(http.clone(), &config.gemini)),
            RepoPublisher::new(
                GitHubClient::new(http.clone(), &config.github),
                config.github.pages_url_template.clone(),
            ),
            PagesProbe::new(
                http.clone(),
                config.retry.pages_poll_attempts,
                config.retry.pages_poll_interval,
            ),
            EvaluationNotifier::new(
                http,
                config.retry.notify_max_attempts,
                config.retry.notify_initial_delay,
            ),
        ))
    }

    pub async fn process(&self, req: ProjectRequest) -> DeployOutcome {
        info!("{}", "=".repeat(40));
        info!("--- STARTING BACKGROUND PROJECT PROCESS ---");
        info!("Task: {} | Round: {}", req.task, req.round);
        info!("Evaluation URL: {}", req.evaluation_url);

        let files = self
            .generator
            .generate(&req.brief, req.attachments.as_deref(), req.round)
            .await;

        let commit_message = format!("feat: Handle round {} requirements", req.round);
        let published = match self
            .publisher
            .publish(&req.task, files, &req.brief, &commit_message)
            .await
        {
            Ok(published) => published,
            Err(e) => {
                error!(
                    "FATAL: Could not create or populate GitHub repo. Aborting. Error: {}",
                    e
                );
                return DeployOutcome::PublishFailed(e.to_string());
            },
        };

        let pages_url = self.publisher.enable_pages(&published.repo).await;
        let pages_live = self.probe.wait_until_live(&pages_url).await;
        if !pages_live {
            warn!("Reporting {} even though it is not serving yet", pages_url);
        }

        let payload = NotificationPayload {
            email: req.email.clone(),
            task: req.task.clone(),
            round: req.round,
            nonce: req.nonce.clone(),
            repo_url: published.repo.html_url.clone(),
            commit_sha: published.commit_sha.clone(),
            pages_url: pages_url.clone(),
        };
        let notified = self.notifier.notify(&req.evaluation_url, &payload).await;

        info!("--- PROJECT PROCESS FINISHED ---");
        info!("Final Repo URL: {}", published.repo.html_url);
        info!("Final Pages URL: {}", pages_url);
        info!("{}", "=".repeat(40));

        DeployOutcome::Completed {
            repo_url: published.repo.html_url,
            commit_sha: published.commit_sha,
            pages_url,
            pages_live,
            notified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attachment;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use std::time::Duration;

    /// Every collaborator pointed at one mock server.
    fn deployer_for(server: &ServerGuard) -> Deployer {
        let url = server.url();
        Deployer::new(
            CodeGenerator::new(GeminiClient::new_with_base_url(
                "g-key",
                "gemini-pro-latest",
                &url,
            )),
            RepoPublisher::new(
                GitHubClient::new_with_base_url("t", &url),
                format!("{}/pages/{{owner}}/{{repo}}/", url),
            ),
            PagesProbe::new(reqwest::Client::new(), 2, Duration::ZERO),
            EvaluationNotifier::new(reqwest::Client::new(), 2, Duration::ZERO),
        )
    }

    fn request(server: &ServerGuard) -> ProjectRequest {
        ProjectRequest {
            email: "student@example.com".to_string(),
            secret: "s3cret".to_string(),
            task: "sum-of-sales".to_string(),
            round: 1,
            nonce: "n-1".to_string(),
            brief: "Sum the sales column of data.csv".to_string(),
            checks: vec!["Page shows total".to_string()],
            evaluation_url: format!("{}/evaluate", server.url()),
            attachments: Some(vec![Attachment {
                name: "data.csv".to_string(),
                url: "data:text/csv;base64,c2FsZXMKMTAKMjA=".to_string(),
            }]),
        }
    }

    async fn mock_github(server: &mut ServerGuard) -> Vec<mockito::Mock> {
        vec![
            server
                .mock("POST", "/user/repos")
                .with_status(201)
                .with_body(
                    json!({
                        "name": "sum-of-sales",
                        "full_name": "octo/sum-of-sales",
                        "html_url": "https://github.com/octo/sum-of-sales",
                        "owner": {"login": "octo"}
                    })
                    .to_string(),
                )
                .create_async()
                .await,
            server
                .mock("GET", Matcher::Regex("^/repos/octo/sum-of-sales/contents/".to_string()))
                .with_status(404)
                .create_async()
                .await,
            server
                .mock(
                    "PUT",
                    Matcher::Regex(
                        r"^/repos/octo/sum-of-sales/contents/(LICENSE|README\.md)$".to_string(),
                    ),
                )
                .with_status(201)
                .with_body(r#"{"commit":{"sha":"deadbeef"}}"#)
                .create_async()
                .await,
            server
                .mock("POST", "/repos/octo/sum-of-sales/pages")
                .with_status(201)
                .create_async()
                .await,
        ]
    }

    #[tokio::test]
    async fn full_run_reports_to_evaluator() {
        let mut server = Server::new_async().await;
        let gemini = server
            .mock("POST", "/v1beta/models/gemini-pro-latest:generateContent")
            .match_body(Matcher::Regex("sales\\\\n10\\\\n20".to_string()))
            .with_status(200)
            .with_body(
                json!({"candidates": [{"content": {"parts": [{"text": "```json\n{\"index.html\": \"<p>30</p>\"}\n```"}]}}]})
                    .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let _github = mock_github(&mut server).await;
        let index = server
            .mock("PUT", "/repos/octo/sum-of-sales/contents/index.html")
            .match_body(Matcher::PartialJson(json!({"content": "PHA+MzA8L3A+"})))
            .with_status(201)
            .with_body(r#"{"commit":{"sha":"final-sha"}}"#)
            .expect(1)
            .create_async()
            .await;
        let _pages = server
            .mock("GET", "/pages/octo/sum-of-sales/")
            .with_status(200)
            .create_async()
            .await;
        let evaluate = server
            .mock("POST", "/evaluate")
            .match_body(Matcher::Json(json!({
                "email": "student@example.com",
                "task": "sum-of-sales",
                "round": 1,
                "nonce": "n-1",
                "repo_url": "https://github.com/octo/sum-of-sales",
                "commit_sha": "final-sha",
                "pages_url": format!("{}/pages/octo/sum-of-sales/", server.url())
            })))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let outcome = deployer_for(&server).process(request(&server)).await;

        assert_eq!(
            outcome,
            DeployOutcome::Completed {
                repo_url: "https://github.com/octo/sum-of-sales".to_string(),
                commit_sha: "final-sha".to_string(),
                pages_url: format!("{}/pages/octo/sum-of-sales/", server.url()),
                pages_live: true,
                notified: true,
            }
        );
        gemini.assert_async().await;
        index.assert_async().await;
        evaluate.assert_async().await;
    }

    #[tokio::test]
    async fn llm_failure_commits_error_page_and_still_reports() {
        let mut server = Server::new_async().await;
        let _gemini = server
            .mock("POST", "/v1beta/models/gemini-pro-latest:generateContent")
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;
        let _github = mock_github(&mut server).await;
        let error_page = server
            .mock("PUT", "/repos/octo/sum-of-sales/contents/index.html")
            .match_body(Matcher::Any)
            .with_status(201)
            .with_body(r#"{"commit":{"sha":"err-sha"}}"#)
            .expect(1)
            .create_async()
            .await;
        let _pages = server
            .mock("GET", "/pages/octo/sum-of-sales/")
            .with_status(404)
            .create_async()
            .await;
        let evaluate = server
            .mock("POST", "/evaluate")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let outcome = deployer_for(&server).process(request(&server)).await;

        match outcome {
            DeployOutcome::Completed {
                commit_sha,
                pages_live,
                notified,
                ..
            } => {
                assert_eq!(commit_sha, "err-sha");
                assert!(!pages_live);
                assert!(notified);
            },
            other => panic!("unexpected outcome: {:?}", other),
        }
        error_page.assert_async().await;
        evaluate.assert_async().await;
    }

    #[tokio::test]
    async fn publish_failure_skips_notification() {
        let mut server = Server::new_async().await;
        let _gemini = server
            .mock("POST", "/v1beta/models/gemini-pro-latest:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"{\"index.html\":\"x\"}"}]}}]}"#)
            .create_async()
            .await;
        let _create = server
            .mock("POST", "/user/repos")
            .with_status(403)
            .with_body(r#"{"message":"Resource not accessible by integration"}"#)
            .create_async()
            .await;
        let evaluate = server
            .mock("POST", "/evaluate")
            .expect(0)
            .create_async()
            .await;

        let outcome = deployer_for(&server).process(request(&server)).await;

        assert!(matches!(outcome, DeployOutcome::PublishFailed(ref msg) if msg.contains("403")));
        evaluate.assert_async().await;
    }
}

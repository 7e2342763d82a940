use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::types::{FileChange, FileStatus, PrState, PrUrl, PullRequest};
use super::{PrError, PrSource};
use crate::config::Config;

/// The files endpoint stops returning entries after this many files.
pub const MAX_FILES: usize = 3000;

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
    login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiBranch {
    #[serde(rename = "ref")]
    name: String,
}

/// Subset of `GET /repos/{owner}/{repo}/pulls/{number}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiPull {
    number: u64,
    title: String,
    state: String,
    #[serde(default)]
    merged: bool,
    user: Option<ApiUser>,
    base: ApiBranch,
    head: ApiBranch,
    pub(crate) html_url: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

/// One entry of `GET /repos/{owner}/{repo}/pulls/{number}/files`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiFile {
    filename: String,
    status: FileStatus,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    sha: Option<String>,
    patch: Option<String>,
    previous_filename: Option<String>,
}

impl From<ApiFile> for FileChange {
    fn from(file: ApiFile) -> Self {
        FileChange {
            filename: file.filename,
            previous_filename: file.previous_filename,
            status: file.status,
            additions: file.additions,
            deletions: file.deletions,
            sha: file.sha,
            patch: file.patch,
        }
    }
}

impl ApiPull {
    pub(crate) fn into_pull_request(self, pr_url: &PrUrl, files: Vec<FileChange>) -> PullRequest {
        let state = if self.merged {
            PrState::Merged
        } else if self.state == "closed" {
            PrState::Closed
        } else {
            PrState::Open
        };

        PullRequest {
            owner: pr_url.owner.clone(),
            repo: pr_url.repo.clone(),
            number: self.number,
            title: self.title,
            author: self
                .user
                .map(|u| u.login)
                .unwrap_or_else(|| "unknown".to_string()),
            state,
            base_branch: self.base.name,
            head_branch: self.head.name,
            html_url: self.html_url,
            files,
            total_additions: self.additions,
            total_deletions: self.deletions,
        }
    }
}

/// Loads a pull request from the GitHub REST API.
pub struct GitHubSource {
    pr_url: PrUrl,
    token: Option<String>,
    api_url: String,
    per_page: u32,
    client: reqwest::Client,
}

impl GitHubSource {
    pub fn new(pr_url: PrUrl, config: &Config) -> Self {
        Self {
            pr_url,
            token: config.github_token(),
            api_url: config.api_url().trim_end_matches('/').to_string(),
            per_page: config.per_page(),
            client: reqwest::Client::new(),
        }
    }

    fn pull_endpoint(&self) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, self.pr_url.owner, self.pr_url.repo, self.pr_url.number
        )
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(USER_AGENT, "pr-cart")
            .header(ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, PrError> {
        let response = self.request(url).query(query).send().await?;
        let response = check_status(response, &self.pr_url)?;
        Ok(response.json::<T>().await?)
    }

    async fn fetch_metadata(&self) -> Result<ApiPull, PrError> {
        debug!("fetching PR metadata from GitHub API");
        let pull: ApiPull = self.get_json(&self.pull_endpoint(), &[]).await?;
        debug!(title = %pull.title, "received PR metadata");
        Ok(pull)
    }

    async fn fetch_files(&self) -> Result<Vec<FileChange>, PrError> {
        let url = format!("{}/files", self.pull_endpoint());
        let mut files = Vec::new();
        let mut page = 1u32;
        loop {
            let batch: Vec<ApiFile> = self
                .get_json(
                    &url,
                    &[
                        ("per_page", self.per_page.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            let fetched = batch.len();
            files.extend(batch.into_iter().map(FileChange::from));
            debug!(page, fetched, total = files.len(), "received file page");

            if is_last_page(fetched, self.per_page, files.len()) {
                break;
            }
            page += 1;
        }

        if files.len() >= MAX_FILES {
            warn!(files = files.len(), "file list hit the API limit; later files are missing");
        }
        Ok(files)
    }
}

#[async_trait]
impl PrSource for GitHubSource {
    fn describe(&self) -> String {
        format!(
            "github.com/{}/{}#{}",
            self.pr_url.owner, self.pr_url.repo, self.pr_url.number
        )
    }

    #[instrument(skip(self), fields(owner = %self.pr_url.owner, repo = %self.pr_url.repo, pr = self.pr_url.number))]
    async fn load(&self) -> Result<PullRequest, PrError> {
        if self.token.is_none() {
            warn!("no GitHub token configured; unauthenticated requests are heavily rate limited");
        }

        let (pull, files) = tokio::try_join!(self.fetch_metadata(), self.fetch_files())?;
        debug!(files = files.len(), "fetched PR file list");

        Ok(pull.into_pull_request(&self.pr_url, files))
    }
}

/// Map error statuses to the specific failures callers can act on.
fn check_status(response: Response, pr_url: &PrUrl) -> Result<Response, PrError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(PrError::NotFound(format!(
            "{}/{}#{}",
            pr_url.owner, pr_url.repo, pr_url.number
        )));
    }

    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        if header("x-ratelimit-remaining").as_deref() == Some("0") {
            let reset = header("x-ratelimit-reset").and_then(|v| v.parse().ok());
            return Err(PrError::RateLimited { reset });
        }
    }

    Ok(response.error_for_status()?)
}

fn is_last_page(fetched: usize, per_page: u32, total: usize) -> bool {
    fetched < per_page as usize || total >= MAX_FILES
}

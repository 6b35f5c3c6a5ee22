use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use storyline_engine::{HostError, PullRequestHost};
use storyline_protocol::{ChangedFile, PullRequestRef};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Fixed latency budget per fetch; the content host is untrusted for latency.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded retry for the fatal-path GETs (metadata, file list) on transient
/// failures only. Raw-content fetches are not retried; their contract is
/// empty-string-on-failure.
const MAX_RETRIES: u32 = 1;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// GitHub rejects requests without a User-Agent.
const USER_AGENT: &str = concat!("storyline/", env!("CARGO_PKG_VERSION"));

/// GitHub REST implementation of [`PullRequestHost`].
pub struct GitHubHost {
    client: reqwest::Client,
    api_base: String,
    raw_base: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct PullRequestDetail {
    base: BaseRef,
}

#[derive(Deserialize)]
struct BaseRef {
    sha: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl GitHubHost {
    /// Create a client against the public GitHub endpoints.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("HTTP client construction");
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            token: None,
        }
    }

    /// Authenticate API requests with a bearer token (raises rate limits).
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Override the REST API base URL (GitHub Enterprise, tests).
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Override the raw-content base URL.
    #[must_use]
    pub fn with_raw_base(mut self, base: impl Into<String>) -> Self {
        self.raw_base = base.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HostError> {
        let mut attempt = 0;
        loop {
            match self.try_get_json(url).await {
                Err(err) if attempt < MAX_RETRIES && err.is_transient() => {
                    attempt += 1;
                    log::warn!("transient failure fetching {url}, retrying: {err}");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                other => return other,
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HostError> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HostError::upstream(0, e.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(HostError::NotFound);
        }
        if !status.is_success() {
            let message = response
                .json::<ApiError>()
                .await
                .map(|e| e.message)
                .unwrap_or_else(|_| format!("GitHub API HTTP error: {status}"));
            return Err(HostError::upstream(status.as_u16(), message));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| HostError::upstream(status.as_u16(), e.to_string()))
    }

    /// Fetch a body as text, mapping every failure to the empty string.
    async fn fetch_text(&self, url: &str) -> String {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                log::debug!("content fetch failed for {url}: {err}");
                return String::new();
            }
        };
        if !response.status().is_success() {
            log::debug!("content fetch for {url} returned {}", response.status());
            return String::new();
        }
        response.text().await.unwrap_or_default()
    }
}

impl Default for GitHubHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PullRequestHost for GitHubHost {
    async fn pull_request_base(&self, pr: &PullRequestRef) -> Result<String, HostError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_base, pr.owner, pr.repo, pr.number
        );
        let detail: PullRequestDetail = self.get_json(&url).await?;
        Ok(detail.base.sha)
    }

    async fn changed_files(&self, pr: &PullRequestRef) -> Result<Vec<ChangedFile>, HostError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/files?per_page=100",
            self.api_base, pr.owner, pr.repo, pr.number
        );
        self.get_json(&url).await
    }

    async fn content_at(&self, pr: &PullRequestRef, path: &str, revision: &str) -> String {
        let url = format!(
            "{}/{}/{}/{}/{}",
            self.raw_base, pr.owner, pr.repo, revision, path
        );
        self.fetch_text(&url).await
    }

    async fn raw_content(&self, url: &str) -> String {
        if url.is_empty() {
            return String::new();
        }
        self.fetch_text(url).await
    }
}

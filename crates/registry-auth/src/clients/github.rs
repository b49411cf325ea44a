//! GitHub identity lookup client.
//!
//! Resolves a bearer access token to the account handle and its
//! organization memberships through the GitHub REST API.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{AuthError, AuthResult};

/// Default GitHub API base URL.
const GITHUB_API_BASE: &str = "https://api.github.com";

/// Request timeout for GitHub API calls.
const GITHUB_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity lookup capability: bearer token to account handle and
/// organization memberships.
#[async_trait]
pub trait GitHubLookup: Send + Sync {
    /// Resolve the token to the authenticated account's login.
    async fn authenticated_user(&self, access_token: &str) -> AuthResult<String>;

    /// List the logins of organizations the account belongs to.
    async fn organizations(&self, access_token: &str) -> AuthResult<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    login: String,
}

/// GitHub REST API client.
#[derive(Clone)]
pub struct GitHubApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubApiClient {
    /// Create a client against the public GitHub API.
    pub fn new() -> Self {
        Self::with_base_url(GITHUB_API_BASE)
    }

    /// Create a client against a custom base URL (GitHub Enterprise,
    /// tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(GITHUB_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, path: &str, access_token: &str, context: &str) -> AuthResult<reqwest::Response> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "registry-auth")
            .send()
            .await
            .map_err(|e| AuthError::Upstream(format!("GitHub {} failed: {}", context, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AuthError::ProofRejected(
                "GitHub rejected the access token".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(AuthError::Upstream(format!(
                "GitHub {} returned status {}",
                context, status
            )));
        }
        Ok(response)
    }
}

impl Default for GitHubApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitHubLookup for GitHubApiClient {
    #[instrument(skip(self, access_token))]
    async fn authenticated_user(&self, access_token: &str) -> AuthResult<String> {
        debug!("Resolving GitHub access token to account");

        let response = self.get("/user", access_token, "user lookup").await?;
        let account: AccountResponse = response.json().await.map_err(|e| {
            AuthError::Upstream(format!("Malformed GitHub user response: {}", e))
        })?;
        Ok(account.login)
    }

    #[instrument(skip(self, access_token))]
    async fn organizations(&self, access_token: &str) -> AuthResult<Vec<String>> {
        debug!("Fetching GitHub organization memberships");

        let response = self
            .get("/user/orgs", access_token, "organization lookup")
            .await?;
        let orgs: Vec<AccountResponse> = response.json().await.map_err(|e| {
            AuthError::Upstream(format!("Malformed GitHub organization response: {}", e))
        })?;
        Ok(orgs.into_iter().map(|org| org.login).collect())
    }
}

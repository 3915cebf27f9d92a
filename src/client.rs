//! Release metadata client for GitHub-style hosting APIs.
//!
//! Talks to the `/repos/{owner}/{name}` endpoints: paginated tag listing
//! and release-by-tag lookup. Configuration is an explicit value passed
//! into the constructor, never ambient state, so clients for the public
//! instance and a custom enterprise instance coexist in one process.
//!
//! Metadata calls are never retried here; retry policy belongs to the
//! caller.

use std::time::Duration;

use serde::Deserialize;

use crate::error::FetchError;
use crate::repo::GitHubRepo;

/// Default HTTP timeout in seconds
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Tags fetched per page; the API caps page size at 100.
const TAGS_PER_PAGE: usize = 100;

/// A single release asset (downloadable file), as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    /// Exact upstream filename; downloads are written under this name.
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    /// Size in bytes when the API reports one.
    pub size: Option<u64>,
}

/// A release: a tag plus its ordered asset list.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: concat!("relfetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Build a config honoring `RELFETCH_HTTP_TIMEOUT` (seconds, clamped
    /// to 5-300).
    pub fn from_env() -> Self {
        let secs = std::env::var("RELFETCH_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        Self {
            timeout: Duration::from_secs(secs.clamp(5, 300)),
            ..Self::default()
        }
    }
}

/// Client for release metadata lookups.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    config: ClientConfig,
}

impl ReleaseClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build an API request with media type, user agent, and optional
    /// bearer auth.
    fn api_request(&self, repo: &GitHubRepo, url: &str) -> ureq::Request {
        let mut request = ureq::get(url)
            .timeout(self.config.timeout)
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", &self.config.user_agent);

        if let Some(token) = &repo.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        request
    }

    /// Map an API error response onto the fetch taxonomy.
    fn api_error(&self, context: &str, err: ureq::Error) -> FetchError {
        match err {
            ureq::Error::Status(404, _) => FetchError::NotFound(context.to_string()),
            ureq::Error::Status(401, _) => FetchError::Auth(context.to_string()),
            ureq::Error::Status(403, resp) | ureq::Error::Status(429, resp) => {
                // The API signals throttling with an exhausted rate-limit
                // header; a plain 403 is an authorization failure.
                if resp.header("x-ratelimit-remaining") == Some("0") {
                    FetchError::RateLimit(context.to_string())
                } else {
                    FetchError::Auth(context.to_string())
                }
            }
            other => FetchError::Http(format!("{}: {}", context, other)),
        }
    }

    /// List every tag of a repository, newest first.
    ///
    /// Pages through the full tag set so `latest` and constraint
    /// resolution never operate on a truncated list.
    pub fn list_tags(&self, repo: &GitHubRepo) -> Result<Vec<String>, FetchError> {
        let mut tags = Vec::new();

        for page in 1usize.. {
            let url = format!(
                "{}/repos/{}/{}/tags?per_page={}&page={}",
                repo.api_root(),
                repo.owner,
                repo.name,
                TAGS_PER_PAGE,
                page
            );

            let response = self
                .api_request(repo, &url)
                .call()
                .map_err(|e| self.api_error(&repo.slug(), e))?;

            let entries: Vec<TagEntry> = response
                .into_json()
                .map_err(|e| FetchError::Http(format!("failed to parse tag list: {}", e)))?;

            let count = entries.len();
            tags.extend(entries.into_iter().map(|t| t.name));

            if count < TAGS_PER_PAGE {
                break;
            }
        }

        Ok(tags)
    }

    /// Fetch a release, including its asset list, by tag.
    pub fn get_release(&self, repo: &GitHubRepo, tag: &str) -> Result<Release, FetchError> {
        let url = format!(
            "{}/repos/{}/{}/releases/tags/{}",
            repo.api_root(),
            repo.owner,
            repo.name,
            tag
        );

        let context = format!("release '{}' in {}", tag, repo.slug());
        let response = self
            .api_request(repo, &url)
            .call()
            .map_err(|e| self.api_error(&context, e))?;

        response
            .into_json()
            .map_err(|e| FetchError::Http(format!("failed to parse release metadata: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{parse_repo, GitHubInstance};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_repo(server: &MockServer) -> GitHubRepo {
        let inst = GitHubInstance {
            base_url: server.uri(),
            api_url: server.uri(),
        };
        parse_repo("owner/repo", None, Some(&inst)).unwrap()
    }

    fn tag_body(names: &[&str]) -> serde_json::Value {
        serde_json::Value::Array(
            names
                .iter()
                .map(|n| serde_json::json!({"name": n, "commit": {}}))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_list_tags_single_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/tags"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(tag_body(&["v0.0.3", "v0.0.2", "v0.0.1"])),
            )
            .mount(&server)
            .await;

        let client = ReleaseClient::new(ClientConfig::default());
        let tags = client.list_tags(&test_repo(&server)).unwrap();
        assert_eq!(tags, vec!["v0.0.3", "v0.0.2", "v0.0.1"]);
    }

    #[tokio::test]
    async fn test_list_tags_pages_through_everything() {
        let server = MockServer::start().await;

        let first: Vec<String> = (0..100).map(|i| format!("v1.0.{}", 199 - i)).collect();
        let first_refs: Vec<&str> = first.iter().map(String::as_str).collect();

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/tags"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tag_body(&first_refs)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/tags"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tag_body(&["v1.0.0"])))
            .mount(&server)
            .await;

        let client = ReleaseClient::new(ClientConfig::default());
        let tags = client.list_tags(&test_repo(&server)).unwrap();
        assert_eq!(tags.len(), 101);
        assert_eq!(tags.first().map(String::as_str), Some("v1.0.199"));
        assert_eq!(tags.last().map(String::as_str), Some("v1.0.0"));
    }

    #[tokio::test]
    async fn test_list_tags_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/tags"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ReleaseClient::new(ClientConfig::default());
        let result = client.list_tags(&test_repo(&server));
        assert!(matches!(result, Err(FetchError::NotFound(ctx)) if ctx == "owner/repo"));
    }

    #[tokio::test]
    async fn test_list_tags_auth_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/tags"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = ReleaseClient::new(ClientConfig::default());
        assert!(matches!(
            client.list_tags(&test_repo(&server)),
            Err(FetchError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_list_tags_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/tags"))
            .respond_with(
                ResponseTemplate::new(403).insert_header("x-ratelimit-remaining", "0"),
            )
            .mount(&server)
            .await;

        let client = ReleaseClient::new(ClientConfig::default());
        assert!(matches!(
            client.list_tags(&test_repo(&server)),
            Err(FetchError::RateLimit(_))
        ));
    }

    #[tokio::test]
    async fn test_forbidden_without_rate_limit_header_is_auth() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/tags"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = ReleaseClient::new(ClientConfig::default());
        assert!(matches!(
            client.list_tags(&test_repo(&server)),
            Err(FetchError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_get_release_parses_assets() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/releases/tags/v0.0.3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tag_name": "v0.0.3",
                "assets": [
                    {
                        "name": "tool_linux_amd64",
                        "browser_download_url": "https://example.com/tool_linux_amd64",
                        "size": 1234
                    },
                    {
                        "name": "tool_darwin_amd64",
                        "browser_download_url": "https://example.com/tool_darwin_amd64"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = ReleaseClient::new(ClientConfig::default());
        let release = client.get_release(&test_repo(&server), "v0.0.3").unwrap();

        assert_eq!(release.tag, "v0.0.3");
        assert_eq!(release.assets.len(), 2);
        assert_eq!(release.assets[0].name, "tool_linux_amd64");
        assert_eq!(release.assets[0].size, Some(1234));
        assert_eq!(release.assets[1].size, None);
    }

    #[tokio::test]
    async fn test_get_release_missing_tag() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/releases/tags/v9.9.9"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ReleaseClient::new(ClientConfig::default());
        let result = client.get_release(&test_repo(&server), "v9.9.9");
        assert!(matches!(result, Err(FetchError::NotFound(ctx)) if ctx.contains("v9.9.9")));
    }

    #[test]
    fn test_config_timeout_default_is_reasonable() {
        let config = ClientConfig::default();
        assert!(config.timeout.as_secs() >= 5);
        assert!(config.timeout.as_secs() <= 120);
    }

    #[test]
    fn test_config_user_agent_names_tool() {
        assert!(ClientConfig::default().user_agent.starts_with("relfetch/"));
    }
}

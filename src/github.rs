use serde::{Deserialize, Serialize};
use tracing::debug;
use ureq::Agent;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("formula-bump/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Repository metadata needed to clone it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub clone_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Body of a pull-request creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
    pub maintainer_can_modify: bool,
}

/// A pull request as returned by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}

/// Repository and pull-request operations of the hosting platform.
pub trait Hosting {
    /// Looks up `owner/repo`.
    fn repository(&self, owner: &str, repo: &str) -> Result<Repository>;

    /// Opens a pull request on `owner/repo`.
    fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest>;
}

/// Blocking GitHub REST client authenticated with a token.
pub struct GitHubClient {
    agent: Agent,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn repo_url(&self, owner: &str, repo: &str, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            suffix
        )
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl Hosting for GitHubClient {
    fn repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        let lookup_error = |reason: String| Error::RepositoryLookup {
            owner: owner.to_string(),
            repo: repo.to_string(),
            reason,
        };

        let url = self.repo_url(owner, repo, "");
        debug!("GET {}", url);
        let mut response = self
            .agent
            .get(&url)
            .header("Accept", ACCEPT)
            .header("Authorization", self.bearer())
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .call()
            .map_err(|e| lookup_error(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(lookup_error(describe_failure(status, &body)));
        }

        response
            .body_mut()
            .read_json::<Repository>()
            .map_err(|e| lookup_error(format!("unexpected response: {}", e)))
    }

    fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest> {
        let url = self.repo_url(owner, repo, "/pulls");
        debug!("POST {} ({} -> {})", url, request.head, request.base);
        let mut response = self
            .agent
            .post(&url)
            .header("Accept", ACCEPT)
            .header("Authorization", self.bearer())
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send_json(request)
            .map_err(|e| Error::PullRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(Error::PullRequest(describe_failure(status, &body)));
        }

        response
            .body_mut()
            .read_json::<PullRequest>()
            .map_err(|e| Error::PullRequest(format!("unexpected response: {}", e)))
    }
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Turns a failed API response into a one-line reason.
///
/// Uses the JSON `message` (and any per-field error details) GitHub returns,
/// falling back to the raw body.
fn describe_failure(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(api) => {
            let details: Vec<&str> = api
                .errors
                .iter()
                .filter_map(|d| d.message.as_deref().or(d.code.as_deref()))
                .collect();
            if details.is_empty() {
                format!("HTTP {}: {}", status, api.message)
            } else {
                format!("HTTP {}: {} ({})", status, api.message, details.join("; "))
            }
        }
        Err(_) => {
            let raw = body.trim();
            if raw.is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GitHubClient, NewPullRequest, PullRequest, Repository, describe_failure};

    #[test]
    fn repo_url_trims_trailing_slash_and_encodes() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/", "t");
        assert_eq!(
            client.repo_url("yodamad", "homebrew-tools", "/pulls"),
            "https://ghe.example.com/api/v3/repos/yodamad/homebrew-tools/pulls"
        );
        assert_eq!(
            client.repo_url("a b", "c", ""),
            "https://ghe.example.com/api/v3/repos/a%20b/c"
        );
    }

    #[test]
    fn message_only_failure() {
        let body = r#"{"message":"Not Found","documentation_url":"https://docs.github.com"}"#;
        assert_eq!(describe_failure(404, body), "HTTP 404: Not Found");
    }

    #[test]
    fn failure_with_details() {
        let body = r#"{"message":"Validation Failed","errors":[{"resource":"PullRequest","code":"custom","message":"A pull request already exists for o:pr-1.3.0."}]}"#;
        assert_eq!(
            describe_failure(422, body),
            "HTTP 422: Validation Failed (A pull request already exists for o:pr-1.3.0.)"
        );
    }

    #[test]
    fn detail_without_message_uses_code() {
        let body = r#"{"message":"Validation Failed","errors":[{"resource":"PullRequest","field":"head","code":"invalid"}]}"#;
        assert_eq!(describe_failure(422, body), "HTTP 422: Validation Failed (invalid)");
    }

    #[test]
    fn non_json_failure_uses_raw_body() {
        assert_eq!(describe_failure(502, "Bad gateway\n"), "HTTP 502: Bad gateway");
        assert_eq!(describe_failure(500, ""), "HTTP 500");
    }

    #[test]
    fn new_pull_request_serializes_all_fields() {
        let pr = NewPullRequest {
            title: String::from("Update Formula/tool.rb to 1.3.0"),
            head: String::from("pr-1.3.0"),
            base: String::from("main"),
            body: String::from("Update Formula/tool.rb formula version and sha256"),
            maintainer_can_modify: true,
        };
        let v = serde_json::to_value(&pr).unwrap();
        assert_eq!(v["head"], "pr-1.3.0");
        assert_eq!(v["base"], "main");
        assert_eq!(v["maintainer_can_modify"], true);
    }

    #[test]
    fn responses_deserialize_from_api_shape() {
        let repo: Repository = serde_json::from_str(
            r#"{"id":1,"name":"homebrew-tools","clone_url":"https://github.com/yodamad/homebrew-tools.git","default_branch":"main","private":false}"#,
        )
        .unwrap();
        assert_eq!(repo.clone_url, "https://github.com/yodamad/homebrew-tools.git");
        assert_eq!(repo.default_branch.as_deref(), Some("main"));

        let pr: PullRequest = serde_json::from_str(
            r#"{"number":7,"html_url":"https://github.com/yodamad/homebrew-tools/pull/7","state":"open"}"#,
        )
        .unwrap();
        assert_eq!(pr.number, 7);
    }
}

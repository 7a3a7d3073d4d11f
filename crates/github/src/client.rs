//! GitHub HTTP Client Implementation
//!
//! Real HTTP client for the organization team endpoints under
//! `{api_url}/orgs/{org}/teams`.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    qualify_repository, GitHubConfig, GitHubError, NewTeam, TeamApi, TeamSummary, PAGE_SIZE,
};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("areapod/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct MemberItem {
    login: String,
}

#[derive(Debug, Serialize)]
struct MembershipBody {
    role: &'static str,
}

/// Real GitHub HTTP client for the team API.
pub struct GitHubTeamClient {
    http: reqwest::Client,
    org: String,
    teams_url: String,
}

impl GitHubTeamClient {
    /// Create a new team API client from configuration.
    pub fn new(config: GitHubConfig) -> Result<Self, GitHubError> {
        if config.token.trim().is_empty() {
            return Err(GitHubError::Configuration(
                "a bearer token is required".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| GitHubError::Configuration(format!("invalid token: {}", e)))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GitHubError::Configuration(e.to_string()))?;

        let teams_url = format!(
            "{}/orgs/{}/teams",
            config.api_url.trim_end_matches('/'),
            config.org
        );

        Ok(Self {
            http,
            org: config.org,
            teams_url,
        })
    }

    fn team_url(&self, slug: &str) -> String {
        format!("{}/{}", self.teams_url, slug)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, GitHubError> {
        let response = request
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: Response) -> Result<Response, GitHubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read response body".to_string());
    Err(GitHubError::Status {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

/// Prefer the API's `message` field over the raw body
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            } else {
                body.to_string()
            }
        })
}

#[async_trait::async_trait]
impl TeamApi for GitHubTeamClient {
    async fn list_teams_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<TeamSummary>, GitHubError> {
        tracing::debug!(page, per_page, "Listing organization teams");

        let response = self
            .send(
                self.http
                    .get(&self.teams_url)
                    .query(&[("per_page", per_page), ("page", page)]),
            )
            .await?;

        response
            .json::<Vec<TeamSummary>>()
            .await
            .map_err(|e| GitHubError::Response(format!("Failed to parse team listing: {}", e)))
    }

    async fn create_team(&self, team: &NewTeam) -> Result<TeamSummary, GitHubError> {
        tracing::debug!(team = %team.name, "Creating team");

        let response = self.send(self.http.post(&self.teams_url).json(team)).await?;

        response
            .json::<TeamSummary>()
            .await
            .map_err(|e| GitHubError::Response(format!("Failed to parse created team: {}", e)))
    }

    async fn list_members(&self, slug: &str) -> Result<Vec<String>, GitHubError> {
        let url = format!("{}/members", self.team_url(slug));
        let mut members = Vec::new();

        for page in 1.. {
            tracing::debug!(slug, page, "Listing team members");

            let response = self
                .send(
                    self.http
                        .get(&url)
                        .query(&[("per_page", PAGE_SIZE), ("page", page)]),
                )
                .await?;

            let items = response.json::<Vec<MemberItem>>().await.map_err(|e| {
                GitHubError::Response(format!("Failed to parse team members: {}", e))
            })?;

            if items.is_empty() {
                break;
            }
            members.extend(items.into_iter().map(|item| item.login));
        }

        Ok(members)
    }

    async fn add_membership(&self, slug: &str, login: &str) -> Result<(), GitHubError> {
        let url = format!("{}/memberships/{}", self.team_url(slug), login);
        tracing::debug!(slug, login, "Adding team membership");

        self.send(self.http.put(&url).json(&MembershipBody { role: "member" }))
            .await?;
        Ok(())
    }

    async fn remove_membership(&self, slug: &str, login: &str) -> Result<(), GitHubError> {
        let url = format!("{}/memberships/{}", self.team_url(slug), login);
        tracing::debug!(slug, login, "Removing team membership");

        self.send(self.http.delete(&url)).await?;
        Ok(())
    }

    async fn add_repository(&self, slug: &str, repository: &str) -> Result<(), GitHubError> {
        let repository = qualify_repository(&self.org, repository);
        let url = format!("{}/repos/{}", self.team_url(slug), repository);
        tracing::debug!(slug, repository = %repository, "Granting team repository access");

        self.send(self.http.put(&url)).await?;
        Ok(())
    }
}

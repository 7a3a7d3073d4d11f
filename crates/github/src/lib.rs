//! AreaPod GitHub Team Service
//!
//! Provides access to the organization team API with support for:
//! - Reqwest-backed client for the GitHub REST API in production
//! - In-memory mock team API for testing and development
//! - Explicit transient/permanent failure classification per call

pub mod client;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used for every paginated listing
pub const PAGE_SIZE: u32 = 100;

/// Visibility requested for teams created by the tool
pub const TEAM_PRIVACY_CLOSED: &str = "closed";

/// Whether retrying the same call could plausibly succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transient,
    Permanent,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GitHubError {
    #[error("GitHub configuration error: {0}")]
    Configuration(String),

    #[error("GitHub request error: {0}")]
    Request(String),

    #[error("GitHub API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("GitHub response error: {0}")]
    Response(String),
}

impl GitHubError {
    /// Failure classification: transport errors, rate limiting and server
    /// errors are transient, everything else is permanent.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Request(_) => FailureKind::Transient,
            Self::Status { status, .. } if *status == 429 || *status >= 500 => {
                FailureKind::Transient
            }
            Self::Status { .. } | Self::Configuration(_) | Self::Response(_) => {
                FailureKind::Permanent
            }
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == FailureKind::Transient
    }

    /// HTTP status of the failed call, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The caller lacks the rights for the operation. GitHub answers 404
    /// instead of 403 for teams the token cannot administer.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.status(), Some(401 | 403 | 404))
    }
}

/// A team as listed by the organization team directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub name: String,
    pub slug: String,
}

/// Body of a create-team request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTeam {
    pub name: String,
    pub description: String,
    pub maintainers: Vec<String>,
    pub privacy: String,
}

impl NewTeam {
    /// Closed (organization-visible) team with the given maintainers
    pub fn closed(name: String, description: String, maintainers: Vec<String>) -> Self {
        Self {
            name,
            description,
            maintainers,
            privacy: TEAM_PRIVACY_CLOSED.to_string(),
        }
    }
}

/// Team API configuration
#[derive(Clone)]
pub struct GitHubConfig {
    /// API root, e.g. `https://api.github.com`
    pub api_url: String,
    /// Organization owning the teams
    pub org: String,
    /// Bearer token
    pub token: String,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("org", &self.org)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl GitHubConfig {
    pub fn new(api_url: impl Into<String>, org: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            org: org.into(),
            token: token.into(),
        }
    }
}

/// Team API operations used by reconciliation.
///
/// Every call is a single suspension point; callers issue them sequentially.
#[async_trait::async_trait]
pub trait TeamApi: Send + Sync {
    /// One page of the organization team listing (pages start at 1)
    async fn list_teams_page(&self, page: u32, per_page: u32)
        -> Result<Vec<TeamSummary>, GitHubError>;

    /// Create a team, returning it with its platform-assigned slug
    async fn create_team(&self, team: &NewTeam) -> Result<TeamSummary, GitHubError>;

    /// Logins of every member of the team
    async fn list_members(&self, slug: &str) -> Result<Vec<String>, GitHubError>;

    /// Add (or keep) a member; idempotent on the platform side
    async fn add_membership(&self, slug: &str, login: &str) -> Result<(), GitHubError>;

    async fn remove_membership(&self, slug: &str, login: &str) -> Result<(), GitHubError>;

    /// Grant the team access to a repository (`owner/repo`, or a bare name
    /// inside the organization)
    async fn add_repository(&self, slug: &str, repository: &str) -> Result<(), GitHubError>;
}

/// Qualify a bare repository name with the organization
pub fn qualify_repository(org: &str, repository: &str) -> String {
    if repository.contains('/') {
        repository.to_string()
    } else {
        format!("{}/{}", org, repository)
    }
}

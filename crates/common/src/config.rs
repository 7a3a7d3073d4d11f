//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Command-line flags may
//! override individual values after loading.

use std::env;

use crate::error::{Error, Result};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_ORG: &str = "dotnet";
pub const DEFAULT_ROSTER_REPO: &str = "runtime";
pub const DEFAULT_ROSTER_BRANCH: &str = "main";

#[derive(Clone)]
pub struct Config {
    /// Bearer token for the team API (may be supplied later via `--token`)
    pub github_token: Option<String>,

    /// Team API location and organization
    pub github_api_url: String,
    pub github_org: String,

    /// Where the area-owners roster lives
    pub roster_repo: String,
    pub roster_branch: String,
    pub roster_url: Option<String>,

    /// Runtime configuration
    pub rust_log: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("github_api_url", &self.github_api_url)
            .field("github_org", &self.github_org)
            .field("roster_repo", &self.roster_repo)
            .field("roster_branch", &self.roster_branch)
            .field("roster_url", &self.roster_url)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_org: DEFAULT_GITHUB_ORG.to_string(),
            roster_repo: DEFAULT_ROSTER_REPO.to_string(),
            roster_branch: DEFAULT_ROSTER_BRANCH.to_string(),
            roster_url: None,
            rust_log: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            github_token: non_empty_var("GITHUB_TOKEN"),
            github_api_url: env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| DEFAULT_GITHUB_API_URL.to_string()),
            github_org: env::var("GITHUB_ORG").unwrap_or_else(|_| DEFAULT_GITHUB_ORG.to_string()),
            roster_repo: env::var("ROSTER_REPO")
                .unwrap_or_else(|_| DEFAULT_ROSTER_REPO.to_string()),
            roster_branch: env::var("ROSTER_BRANCH")
                .unwrap_or_else(|_| DEFAULT_ROSTER_BRANCH.to_string()),
            roster_url: non_empty_var("ROSTER_URL"),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        };

        if config.github_org.trim().is_empty() {
            return Err(Error::Configuration("GITHUB_ORG cannot be empty".to_string()));
        }

        Ok(config)
    }

    /// URL of the area-owners roster document
    pub fn roster_url(&self) -> String {
        match &self.roster_url {
            Some(url) => url.clone(),
            None => format!(
                "https://raw.githubusercontent.com/{}/{}/{}/docs/area-owners.md",
                self.github_org, self.roster_repo, self.roster_branch
            ),
        }
    }

    /// Token to authenticate with, failing when none was configured
    pub fn require_token(&self) -> Result<&str> {
        self.github_token
            .as_deref()
            .ok_or_else(|| Error::Usage("a token is required (--token or GITHUB_TOKEN)".to_string()))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

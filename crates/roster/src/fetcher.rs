//! Bounded-retry retrieval of the roster document.
//!
//! A 404 means the roster is deliberately absent and is returned at once.
//! Every other failure is treated as transient and retried after a fixed
//! delay until the attempt budget is spent.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::RosterError;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Result of fetching the roster document
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The document body
    Found(String),
    /// The server reported that the document does not exist
    NotFound,
    /// Every attempt failed with a transient error
    Unreachable { attempts: u32, last_error: String },
}

impl FetchOutcome {
    pub fn into_content(self) -> Option<String> {
        match self {
            FetchOutcome::Found(content) => Some(content),
            FetchOutcome::NotFound | FetchOutcome::Unreachable { .. } => None,
        }
    }
}

enum AttemptError {
    NotFound,
    Transient(String),
}

/// Roster document fetcher with a fixed-delay retry policy
#[derive(Debug, Clone)]
pub struct RosterFetcher {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl RosterFetcher {
    pub fn new(policy: RetryPolicy) -> Result<Self, RosterError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("areapod/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RosterError::Configuration(e.to_string()))?;
        Ok(Self { http, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch the document at `url`, retrying transient failures.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let mut last_error = String::new();

        for attempt in 1..=self.policy.max_attempts {
            match self.attempt(url).await {
                Ok(content) => {
                    if attempt > 1 {
                        debug!(url, attempt, "Roster fetched after retries");
                    }
                    return FetchOutcome::Found(content);
                }
                Err(AttemptError::NotFound) => {
                    debug!(url, "Roster document does not exist");
                    return FetchOutcome::NotFound;
                }
                Err(AttemptError::Transient(error)) => {
                    debug!(
                        url,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %error,
                        "Roster fetch failed, treating as transient"
                    );
                    last_error = error;
                }
            }

            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        warn!(
            url,
            attempts = self.policy.max_attempts,
            error = %last_error,
            "Roster unreachable after retries"
        );
        FetchOutcome::Unreachable {
            attempts: self.policy.max_attempts,
            last_error,
        }
    }

    async fn attempt(&self, url: &str) -> Result<String, AttemptError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AttemptError::NotFound);
        }
        if !status.is_success() {
            return Err(AttemptError::Transient(format!("server returned {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| AttemptError::Transient(e.to_string()))
    }
}

//! Mock Team API Implementation
//!
//! In-memory organization used by tests and dry development runs:
//! - `MockTeamApi`: teams, members and repository grants held in memory
//! - `RecordedCall`: every call is recorded for test assertions
//! - `MockFailure`: programmable failures per operation and target
//!
//! Thread-safe via `Arc<Mutex<>>`.

use crate::{GitHubError, NewTeam, TeamApi, TeamSummary};
use std::sync::{Arc, Mutex, MutexGuard};

/// Operations the mock can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOperation {
    ListTeams,
    CreateTeam,
    ListMembers,
    AddMembership,
    RemoveMembership,
    AddRepository,
}

/// A call received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ListTeamsPage { page: u32, per_page: u32 },
    CreateTeam { name: String, maintainers: Vec<String> },
    ListMembers { slug: String },
    AddMembership { slug: String, login: String },
    RemoveMembership { slug: String, login: String },
    AddRepository { slug: String, repository: String },
}

impl RecordedCall {
    /// Whether the call would change remote state
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            RecordedCall::ListTeamsPage { .. } | RecordedCall::ListMembers { .. }
        )
    }
}

/// A programmed failure. `target` is matched case-insensitively against the
/// login (memberships), team name (creation), slug (member listing), page
/// number (team listing) or repository; `None` matches every call.
#[derive(Debug, Clone)]
pub struct MockFailure {
    pub operation: MockOperation,
    pub target: Option<String>,
    pub error: GitHubError,
}

/// A team held by the mock
#[derive(Debug, Clone)]
pub struct MockTeam {
    pub summary: TeamSummary,
    pub members: Vec<String>,
    pub repositories: Vec<String>,
}

#[derive(Debug, Default)]
struct MockState {
    teams: Vec<MockTeam>,
    calls: Vec<RecordedCall>,
    failures: Vec<MockFailure>,
}

/// Mock team API with programmable failures and call recording
#[derive(Debug, Clone, Default)]
pub struct MockTeamApi {
    state: Arc<Mutex<MockState>>,
}

/// Slug the platform would assign to a team name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

impl MockTeamApi {
    /// Create an empty mock organization.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing team with the given members.
    pub fn with_team(self, name: &str, members: &[&str]) -> Self {
        self.lock().teams.push(MockTeam {
            summary: TeamSummary {
                name: name.to_string(),
                slug: slugify(name),
            },
            members: members.iter().map(|m| m.to_string()).collect(),
            repositories: Vec::new(),
        });
        self
    }

    /// Program a failure for matching calls.
    pub fn with_failure(
        self,
        operation: MockOperation,
        target: Option<&str>,
        error: GitHubError,
    ) -> Self {
        self.lock().failures.push(MockFailure {
            operation,
            target: target.map(str::to_string),
            error,
        });
        self
    }

    /// Return all recorded calls.
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Return recorded calls that would have changed remote state.
    pub fn mutating_calls(&self) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.is_mutating())
            .cloned()
            .collect()
    }

    /// Current members of a team, if it exists.
    pub fn team_members(&self, slug: &str) -> Option<Vec<String>> {
        self.lock()
            .teams
            .iter()
            .find(|team| team.summary.slug == slug)
            .map(|team| team.members.clone())
    }

    /// Repositories granted to a team, if it exists.
    pub fn team_repositories(&self, slug: &str) -> Option<Vec<String>> {
        self.lock()
            .teams
            .iter()
            .find(|team| team.summary.slug == slug)
            .map(|team| team.repositories.clone())
    }

    pub fn team_count(&self) -> usize {
        self.lock().teams.len()
    }

    /// Clear recorded calls, keeping teams and failures.
    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .expect("mock state lock poisoned; a prior test panicked")
    }

    fn state(&self) -> Result<MutexGuard<'_, MockState>, GitHubError> {
        self.state
            .lock()
            .map_err(|e| GitHubError::Request(format!("mock state lock poisoned: {e}")))
    }
}

impl MockState {
    fn failure_for(&self, operation: MockOperation, target: &str) -> Option<GitHubError> {
        self.failures
            .iter()
            .find(|failure| {
                failure.operation == operation
                    && failure
                        .target
                        .as_deref()
                        .map_or(true, |t| t.eq_ignore_ascii_case(target))
            })
            .map(|failure| failure.error.clone())
    }

    fn team_mut(&mut self, slug: &str) -> Result<&mut MockTeam, GitHubError> {
        self.teams
            .iter_mut()
            .find(|team| team.summary.slug == slug)
            .ok_or_else(|| not_found(slug))
    }
}

fn not_found(slug: &str) -> GitHubError {
    GitHubError::Status {
        status: 404,
        message: format!("Not Found: team {}", slug),
    }
}

#[async_trait::async_trait]
impl TeamApi for MockTeamApi {
    async fn list_teams_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<TeamSummary>, GitHubError> {
        let mut state = self.state()?;
        state.calls.push(RecordedCall::ListTeamsPage { page, per_page });
        if let Some(error) = state.failure_for(MockOperation::ListTeams, &page.to_string()) {
            return Err(error);
        }

        let skip = page.saturating_sub(1) as usize * per_page as usize;
        Ok(state
            .teams
            .iter()
            .skip(skip)
            .take(per_page as usize)
            .map(|team| team.summary.clone())
            .collect())
    }

    async fn create_team(&self, team: &NewTeam) -> Result<TeamSummary, GitHubError> {
        let mut state = self.state()?;
        state.calls.push(RecordedCall::CreateTeam {
            name: team.name.clone(),
            maintainers: team.maintainers.clone(),
        });
        if let Some(error) = state.failure_for(MockOperation::CreateTeam, &team.name) {
            return Err(error);
        }
        if state
            .teams
            .iter()
            .any(|existing| existing.summary.name.eq_ignore_ascii_case(&team.name))
        {
            return Err(GitHubError::Status {
                status: 422,
                message: "Validation Failed: name must be unique for this org".to_string(),
            });
        }

        tracing::debug!(team = %team.name, "Mock team API: creating team");
        let summary = TeamSummary {
            name: team.name.clone(),
            slug: slugify(&team.name),
        };
        state.teams.push(MockTeam {
            summary: summary.clone(),
            members: team.maintainers.clone(),
            repositories: Vec::new(),
        });
        Ok(summary)
    }

    async fn list_members(&self, slug: &str) -> Result<Vec<String>, GitHubError> {
        let mut state = self.state()?;
        state.calls.push(RecordedCall::ListMembers {
            slug: slug.to_string(),
        });
        if let Some(error) = state.failure_for(MockOperation::ListMembers, slug) {
            return Err(error);
        }
        Ok(state.team_mut(slug)?.members.clone())
    }

    async fn add_membership(&self, slug: &str, login: &str) -> Result<(), GitHubError> {
        let mut state = self.state()?;
        state.calls.push(RecordedCall::AddMembership {
            slug: slug.to_string(),
            login: login.to_string(),
        });
        if let Some(error) = state.failure_for(MockOperation::AddMembership, login) {
            return Err(error);
        }

        let team = state.team_mut(slug)?;
        if !team.members.iter().any(|m| m.eq_ignore_ascii_case(login)) {
            team.members.push(login.to_string());
        }
        Ok(())
    }

    async fn remove_membership(&self, slug: &str, login: &str) -> Result<(), GitHubError> {
        let mut state = self.state()?;
        state.calls.push(RecordedCall::RemoveMembership {
            slug: slug.to_string(),
            login: login.to_string(),
        });
        if let Some(error) = state.failure_for(MockOperation::RemoveMembership, login) {
            return Err(error);
        }

        state
            .team_mut(slug)?
            .members
            .retain(|m| !m.eq_ignore_ascii_case(login));
        Ok(())
    }

    async fn add_repository(&self, slug: &str, repository: &str) -> Result<(), GitHubError> {
        let mut state = self.state()?;
        state.calls.push(RecordedCall::AddRepository {
            slug: slug.to_string(),
            repository: repository.to_string(),
        });
        if let Some(error) = state.failure_for(MockOperation::AddRepository, repository) {
            return Err(error);
        }

        state.team_mut(slug)?.repositories.push(repository.to_string());
        Ok(())
    }
}

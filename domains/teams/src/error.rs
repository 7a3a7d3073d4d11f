//! Reconciliation error taxonomy
//!
//! Only `DirectoryUnavailable` is run-fatal. Every other variant is scoped to
//! the team being reconciled and is folded into its `ReconciliationResult`.

use areapod_github::GitHubError;
use thiserror::Error;

use crate::domain::state::StateError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamsError {
    #[error("Team directory unavailable (page {page}): {source}")]
    DirectoryUnavailable { page: u32, source: GitHubError },

    #[error("Team name {name} matches {matches} remote teams")]
    AmbiguousTeam { name: String, matches: usize },

    #[error("Could not create team {team}: {source}")]
    Creation { team: String, source: GitHubError },

    #[error("Could not list members of {team} ({slug}): {source}")]
    MemberListing {
        team: String,
        slug: String,
        source: GitHubError,
    },

    #[error("Could not add {member} to {team} ({slug}): {source}")]
    AddMember {
        team: String,
        slug: String,
        member: String,
        source: GitHubError,
    },

    #[error("Could not remove {member} from {team} ({slug}): {source}")]
    RemoveMember {
        team: String,
        slug: String,
        member: String,
        source: GitHubError,
    },

    #[error("Could not grant {team} ({slug}) access to {repository}: {source}")]
    RepositoryGrant {
        team: String,
        slug: String,
        repository: String,
        source: GitHubError,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    State(#[from] StateError),
}

impl TeamsError {
    /// Whether the whole run must stop rather than just this team
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, TeamsError::DirectoryUnavailable { .. })
    }

    /// Underlying platform error, when the failure came from an API call
    pub fn api_error(&self) -> Option<&GitHubError> {
        match self {
            TeamsError::DirectoryUnavailable { source, .. }
            | TeamsError::Creation { source, .. }
            | TeamsError::MemberListing { source, .. }
            | TeamsError::AddMember { source, .. }
            | TeamsError::RemoveMember { source, .. }
            | TeamsError::RepositoryGrant { source, .. } => Some(source),
            TeamsError::AmbiguousTeam { .. }
            | TeamsError::InvalidOperation(_)
            | TeamsError::Validation(_)
            | TeamsError::State(_) => None,
        }
    }

    /// The token lacks rights for the attempted operation
    pub fn is_permission_denied(&self) -> bool {
        self.api_error()
            .is_some_and(GitHubError::is_permission_denied)
    }
}

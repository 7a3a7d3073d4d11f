//! Domain entities for the teams domain
//!
//! `AreaTeam` is the desired state for one roster entry, `RemoteTeam` the
//! platform's view of it, and `ReconciliationResult` what one pass did.

use areapod_common::{normalize_identifier, IdentifierSet};
use areapod_github::FailureKind;
use serde::Serialize;

use crate::error::TeamsError;

/// Prefix of the placeholder slug reported for teams created in a dry run
pub const DRY_RUN_SLUG_PREFIX: &str = "dry-run/";

/// Desired state of an area team
#[derive(Debug, Clone, PartialEq)]
pub struct AreaTeam {
    name: String,
    maintainers: IdentifierSet,
    members: IdentifierSet,
}

impl AreaTeam {
    /// Create a desired team; duplicate identifiers collapse case-insensitively
    pub fn new<M, N, S, T>(name: impl Into<String>, maintainers: M, members: N) -> Result<Self, TeamsError>
    where
        M: IntoIterator<Item = S>,
        N: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(TeamsError::Validation(
                "Team name cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            name,
            maintainers: maintainers.into_iter().collect(),
            members: members.into_iter().collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn maintainers(&self) -> &IdentifierSet {
        &self.maintainers
    }

    pub fn members(&self) -> &IdentifierSet {
        &self.members
    }

    /// Description sent when the team is created
    pub fn description(&self) -> String {
        format!("Area owners for {}", self.name)
    }
}

/// A team as known to the platform
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTeam {
    name: String,
    slug: Option<String>,
}

impl RemoteTeam {
    /// A team the platform does not know yet
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
        }
    }

    /// A team listed by the directory
    pub fn existing(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: Some(slug.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    /// Slug of the team; calling this before one is known is a contract violation
    pub fn require_slug(&self) -> Result<&str, TeamsError> {
        self.slug.as_deref().ok_or_else(|| {
            TeamsError::InvalidOperation(format!(
                "Team slug cannot be empty. Team name: {}",
                self.name
            ))
        })
    }

    /// Set the slug exactly once
    pub fn assign_slug(&mut self, slug: impl Into<String>) -> Result<(), TeamsError> {
        if let Some(existing) = &self.slug {
            return Err(TeamsError::InvalidOperation(format!(
                "Team {} already has slug {}",
                self.name, existing
            )));
        }
        self.slug = Some(slug.into());
        Ok(())
    }

    /// Whether this team is called `name` (case-insensitive exact match).
    /// The slug never takes part: another team may be named like this slug.
    pub fn matches(&self, name: &str) -> bool {
        normalize_identifier(&self.name) == normalize_identifier(name)
    }
}

/// The member whose addition failed and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddFailure {
    pub member: String,
    pub reason: String,
    pub permission_denied: bool,
    /// A later run may succeed without any change in rights
    pub transient: bool,
}

impl AddFailure {
    pub fn from_error(member: impl Into<String>, error: &TeamsError) -> Self {
        Self {
            member: member.into(),
            reason: error.to_string(),
            permission_denied: error.is_permission_denied(),
            transient: error
                .api_error()
                .is_some_and(|source| source.kind() == FailureKind::Transient),
        }
    }
}

/// A repository grant that did not go through
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryFailure {
    pub repository: String,
    pub reason: String,
}

/// Outcome of reconciling one area team
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReconciliationResult {
    pub team_name: String,
    pub slug: Option<String>,
    pub created: bool,
    pub dry_run: bool,
    pub members_added: Vec<String>,
    pub members_removed: Vec<String>,
    /// Desired members never attempted because an earlier addition failed
    pub failed_adds: Vec<String>,
    pub add_failure: Option<AddFailure>,
    pub repositories_added: Vec<String>,
    pub repository_failures: Vec<RepositoryFailure>,
    pub aborted: bool,
    pub error: Option<String>,
}

impl ReconciliationResult {
    pub fn new(team_name: impl Into<String>, dry_run: bool) -> Self {
        Self {
            team_name: team_name.into(),
            dry_run,
            ..Self::default()
        }
    }

    /// Mark the team as aborted by a team-fatal error
    pub fn abort(&mut self, error: &TeamsError) {
        self.aborted = true;
        self.error = Some(error.to_string());
    }

    /// Converged without an abort or a failed addition
    pub fn is_success(&self) -> bool {
        !self.aborted && self.add_failure.is_none()
    }

    /// Whether anything was (or, in a dry run, would be) changed
    pub fn has_changes(&self) -> bool {
        self.created
            || !self.members_added.is_empty()
            || !self.members_removed.is_empty()
            || !self.repositories_added.is_empty()
    }
}

//! Team reconciliation
//!
//! Converges one remote team toward one desired `AreaTeam`:
//! - creates the team when the directory does not know it
//! - adds missing members in roster order, stopping at the first failure
//! - optionally removes stale members, aborting the team on any failure
//! - optionally grants repository access
//!
//! Creation and removal failures abort the team; an addition failure only
//! stops further additions. A directory failure aborts the whole run and is
//! the only error returned as `Err`.

use std::sync::Arc;

use areapod_common::{normalize_identifier, IdentifierSet};
use areapod_github::{NewTeam, TeamApi};

use crate::domain::entities::{
    AddFailure, AreaTeam, ReconciliationResult, RemoteTeam, RepositoryFailure,
    DRY_RUN_SLUG_PREFIX,
};
use crate::domain::state::{TeamEvent, TeamGuardContext, TeamState, TeamStateMachine};
use crate::error::TeamsError;
use crate::repository::{MembershipClient, RemoteTeamDirectory};

/// Run-wide reconciliation policy
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Compute and report changes without mutating calls
    pub dry_run: bool,
    /// Remove members that are neither desired members nor maintainers
    pub remove_old_members: bool,
    /// Repositories to grant every reconciled team access to
    pub repositories: Vec<String>,
}

/// Per-run reconciliation context.
///
/// Owns the memoized directory for the duration of the run; construct one
/// per run and feed it the roster's teams in order.
pub struct TeamReconciler {
    api: Arc<dyn TeamApi>,
    directory: RemoteTeamDirectory,
    memberships: MembershipClient,
    options: ReconcileOptions,
}

impl TeamReconciler {
    pub fn new(api: Arc<dyn TeamApi>, options: ReconcileOptions) -> Self {
        Self {
            directory: RemoteTeamDirectory::new(api.clone()),
            memberships: MembershipClient::new(api.clone()),
            api,
            options,
        }
    }

    /// Converge the remote team to `desired`.
    pub async fn reconcile(
        &mut self,
        desired: &AreaTeam,
    ) -> Result<ReconciliationResult, TeamsError> {
        let mut result = ReconciliationResult::new(desired.name(), self.options.dry_run);

        let existing = match self.lookup(desired.name()).await? {
            Ok(existing) => existing,
            Err(error) => return Ok(abort(result, TeamState::Absent, error)),
        };

        let (remote, baseline, state) = match existing {
            Some(remote) => {
                tracing::info!(
                    team = %remote.name(),
                    slug = remote.slug().unwrap_or_default(),
                    "Team already exists"
                );
                let baseline = match self.memberships.list_members(&remote).await {
                    Ok(members) => members,
                    Err(error) => {
                        result.slug = remote.slug().map(str::to_string);
                        return Ok(abort(result, TeamState::Present, error));
                    }
                };
                (remote, baseline, TeamState::Present)
            }
            None => {
                let remote = match self.create(desired).await {
                    Ok(remote) => remote,
                    Err(error) => return Ok(abort(result, TeamState::Absent, error)),
                };
                let state = match transition(TeamState::Absent, TeamEvent::Create, &remote) {
                    Ok(state) => state,
                    Err(error) => return Ok(abort(result, TeamState::Absent, error)),
                };
                result.created = true;
                // Maintainers join through the creation request itself.
                (remote, desired.maintainers().clone(), state)
            }
        };
        result.slug = remote.slug().map(str::to_string);

        let to_add = desired.members().missing_from(&[&baseline]);
        if let Err(error) = self.add_in_order(&remote, to_add, &mut result).await {
            return Ok(abort(result, state, error));
        }

        if self.options.remove_old_members {
            if let Err(error) = self
                .remove_stale(desired, &remote, &baseline, &mut result)
                .await
            {
                return Ok(abort(result, state, error));
            }
        }

        self.grant_repositories(&remote, &mut result).await;

        if let Err(error) = transition(state, TeamEvent::Converge, &remote) {
            return Ok(abort(result, state, error));
        }
        Ok(result)
    }

    /// Add `members` to an existing team without any other convergence.
    pub async fn add_members(
        &mut self,
        desired: &AreaTeam,
        members: &IdentifierSet,
    ) -> Result<ReconciliationResult, TeamsError> {
        let mut result = ReconciliationResult::new(desired.name(), self.options.dry_run);

        let remote = match self.lookup(desired.name()).await? {
            Ok(Some(remote)) => remote,
            Ok(None) => {
                let error = TeamsError::InvalidOperation(format!(
                    "Team {} does not exist; members can only be added to existing teams",
                    desired.name()
                ));
                return Ok(abort(result, TeamState::Absent, error));
            }
            Err(error) => return Ok(abort(result, TeamState::Absent, error)),
        };
        result.slug = remote.slug().map(str::to_string);

        let baseline = match self.memberships.list_members(&remote).await {
            Ok(baseline) => baseline,
            Err(error) => return Ok(abort(result, TeamState::Present, error)),
        };

        let to_add = members.missing_from(&[&baseline]);
        if let Err(error) = self.add_in_order(&remote, to_add, &mut result).await {
            return Ok(abort(result, TeamState::Present, error));
        }

        self.grant_repositories(&remote, &mut result).await;

        if let Err(error) = transition(TeamState::Present, TeamEvent::Converge, &remote) {
            return Ok(abort(result, TeamState::Present, error));
        }
        Ok(result)
    }

    /// Directory lookup split into run-fatal (outer `Err`) and team-scoped
    /// (inner `Err`) failures.
    async fn lookup(
        &mut self,
        name: &str,
    ) -> Result<Result<Option<RemoteTeam>, TeamsError>, TeamsError> {
        match self.directory.find_by_slug_or_name(name).await {
            Ok(found) => Ok(Ok(found)),
            Err(error) if error.is_run_fatal() => Err(error),
            Err(error) => Ok(Err(error)),
        }
    }

    async fn create(&self, desired: &AreaTeam) -> Result<RemoteTeam, TeamsError> {
        let mut remote = RemoteTeam::absent(desired.name());

        if self.options.dry_run {
            let placeholder = format!(
                "{}{}",
                DRY_RUN_SLUG_PREFIX,
                normalize_identifier(desired.name())
            );
            tracing::info!(team = %desired.name(), slug = %placeholder, "Dry run: would create team");
            remote.assign_slug(placeholder)?;
            return Ok(remote);
        }

        let request = NewTeam::closed(
            desired.name().to_string(),
            desired.description(),
            desired.maintainers().to_vec(),
        );
        let created = self
            .api
            .create_team(&request)
            .await
            .map_err(|source| TeamsError::Creation {
                team: desired.name().to_string(),
                source,
            })?;

        tracing::info!(
            team = %desired.name(),
            slug = %created.slug,
            maintainers = ?request.maintainers,
            "Team created"
        );
        remote.assign_slug(created.slug)?;
        Ok(remote)
    }

    /// Fail-fast additions. A failed addition is recorded on the result and
    /// ends the loop; only contract violations are returned as errors.
    async fn add_in_order(
        &self,
        remote: &RemoteTeam,
        to_add: Vec<String>,
        result: &mut ReconciliationResult,
    ) -> Result<(), TeamsError> {
        for (index, member) in to_add.iter().enumerate() {
            if self.options.dry_run {
                result.members_added.push(member.clone());
                continue;
            }

            match self.memberships.add_member(remote, member).await {
                Ok(()) => result.members_added.push(member.clone()),
                Err(error @ TeamsError::InvalidOperation(_)) => return Err(error),
                Err(error) => {
                    tracing::warn!(
                        team = %remote.name(),
                        member = %member,
                        error = %error,
                        "Could not add member; skipping remaining additions"
                    );
                    result.add_failure = Some(AddFailure::from_error(member.as_str(), &error));
                    result.failed_adds = to_add[index + 1..].to_vec();
                    break;
                }
            }
        }

        if !result.members_added.is_empty() {
            tracing::info!(
                team = %remote.name(),
                members = ?result.members_added,
                dry_run = self.options.dry_run,
                "Added members"
            );
        }
        Ok(())
    }

    /// Remove baseline members that are neither desired nor maintainers.
    async fn remove_stale(
        &self,
        desired: &AreaTeam,
        remote: &RemoteTeam,
        baseline: &IdentifierSet,
        result: &mut ReconciliationResult,
    ) -> Result<(), TeamsError> {
        let stale = baseline.missing_from(&[desired.members(), desired.maintainers()]);

        for member in stale {
            if !self.options.dry_run {
                self.memberships.remove_member(remote, &member).await?;
            }
            result.members_removed.push(member);
        }

        if !result.members_removed.is_empty() {
            tracing::info!(
                team = %remote.name(),
                members = ?result.members_removed,
                dry_run = self.options.dry_run,
                "Removed members"
            );
        }
        Ok(())
    }

    /// Repository grants never abort the team.
    async fn grant_repositories(&self, remote: &RemoteTeam, result: &mut ReconciliationResult) {
        for repository in &self.options.repositories {
            if self.options.dry_run {
                result.repositories_added.push(repository.clone());
                continue;
            }

            match self.memberships.add_repository(remote, repository).await {
                Ok(()) => result.repositories_added.push(repository.clone()),
                Err(error) => {
                    tracing::warn!(
                        team = %remote.name(),
                        repository = %repository,
                        error = %error,
                        "Could not grant repository access"
                    );
                    result.repository_failures.push(RepositoryFailure {
                        repository: repository.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }
    }
}

fn transition(
    current: TeamState,
    event: TeamEvent,
    remote: &RemoteTeam,
) -> Result<TeamState, TeamsError> {
    let context = TeamGuardContext {
        slug_known: remote.slug().is_some(),
    };
    Ok(TeamStateMachine::transition(current, event, Some(&context))?)
}

fn abort(
    mut result: ReconciliationResult,
    state: TeamState,
    error: TeamsError,
) -> ReconciliationResult {
    let reached = TeamStateMachine::transition(state, TeamEvent::Abort, None)
        .unwrap_or(TeamState::Aborted);
    tracing::error!(
        team = %result.team_name,
        from = %state,
        state = %reached,
        error = %error,
        "Reconciliation aborted"
    );
    result.abort(&error);
    result
}

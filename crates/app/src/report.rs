//! Run report
//!
//! Human-readable per-team lines printed after a run, and the process exit
//! status derived from them.

use std::fmt;

use areapod_teams::ReconciliationResult;

const DRY_RUN_PREFIX: &str = "[dry-run] ";

/// What happened to the roster document
#[derive(Debug, Clone, PartialEq)]
pub enum RosterStatus {
    Loaded { total: usize, selected: usize },
    NotFound { url: String },
    Unreachable {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

/// Reconciliation outcome for one area team
#[derive(Debug, Clone)]
pub struct TeamOutcome {
    pub maintainers: Vec<String>,
    /// Members passed with `--addMember`, when the run only adds
    pub requested_members: Option<Vec<String>>,
    pub result: ReconciliationResult,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub dry_run: bool,
    pub roster: RosterStatus,
    pub teams: Vec<TeamOutcome>,
}

impl RunReport {
    /// Every team converged without an abort or a failed addition
    pub fn is_success(&self) -> bool {
        self.teams.iter().all(|team| team.result.is_success())
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn failed_count(&self) -> usize {
        self.teams
            .iter()
            .filter(|team| !team.result.is_success())
            .count()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.roster_line()];
        for team in &self.teams {
            lines.extend(team_lines(team));
        }
        lines.push(format!(
            "{} team(s) processed, {} with failures.",
            self.teams.len(),
            self.failed_count()
        ));

        if self.dry_run {
            lines
                .into_iter()
                .map(|line| format!("{}{}", DRY_RUN_PREFIX, line))
                .collect()
        } else {
            lines
        }
    }

    fn roster_line(&self) -> String {
        match &self.roster {
            RosterStatus::Loaded { total, selected } => {
                format!("Selected {} of {} areas.", selected, total)
            }
            RosterStatus::NotFound { url } => {
                format!("Area owners document {} not found; no areas to reconcile.", url)
            }
            RosterStatus::Unreachable {
                url,
                attempts,
                last_error,
            } => format!(
                "Area owners document {} unreachable after {} attempt(s) ({}); no areas to reconcile.",
                url, attempts, last_error
            ),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

fn team_lines(team: &TeamOutcome) -> Vec<String> {
    let result = &team.result;
    let label = match &result.slug {
        Some(slug) => format!("{} ({})", result.team_name, slug),
        None => result.team_name.clone(),
    };
    let mut lines = Vec::new();

    if result.created {
        lines.push(format!(
            "Team {} was created. Maintainers: {}",
            label,
            team.maintainers.join(",")
        ));
    } else if result.slug.is_some() && team.requested_members.is_none() {
        lines.push(format!("Team {} already exists.", label));
    }

    if !result.members_added.is_empty() {
        lines.push(format!(
            "Added members to {}: {}",
            label,
            result.members_added.join(",")
        ));
    }

    if let Some(failure) = &result.add_failure {
        if failure.permission_denied {
            lines.push(format!(
                "Could not add members to {}. You must be a team maintainer.",
                label
            ));
        } else if failure.transient {
            lines.push(format!("{} (temporary failure; re-run to retry)", failure.reason));
        } else {
            lines.push(failure.reason.clone());
        }
    }

    if !result.failed_adds.is_empty() {
        lines.push(format!(
            "Skipped members for {}: {}",
            label,
            result.failed_adds.join(",")
        ));
    }

    if !result.members_removed.is_empty() {
        lines.push(format!(
            "Removed members from {}: {}",
            label,
            result.members_removed.join(",")
        ));
    }

    if !result.repositories_added.is_empty() {
        lines.push(format!(
            "Granted {} access to: {}",
            label,
            result.repositories_added.join(",")
        ));
    }
    for failure in &result.repository_failures {
        lines.push(failure.reason.clone());
    }

    if result.aborted {
        lines.push(format!(
            "Aborted {}: {}",
            label,
            result.error.as_deref().unwrap_or("unknown error")
        ));
    } else if team.requested_members.is_some()
        && result.members_added.is_empty()
        && result.add_failure.is_none()
    {
        lines.push(format!("No members to add to {}.", label));
    }

    lines
}

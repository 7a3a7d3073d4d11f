//! Run loop
//!
//! Fetches the roster, selects areas, and reconciles each area team in
//! roster order with one `TeamReconciler` per run.

use std::sync::Arc;

use areapod_common::{Config, IdentifierSet};
use areapod_github::client::GitHubTeamClient;
use areapod_github::{GitHubConfig, TeamApi};
use areapod_roster::{parse_area_owners, AreaEntry, AreaFilter, FetchOutcome, RetryPolicy, RosterFetcher};
use areapod_teams::{AreaTeam, ReconcileOptions, TeamReconciler, TeamsError};
use tracing::{info, warn};

use crate::report::{RosterStatus, RunReport, TeamOutcome};

/// Everything a run needs besides the remote endpoints
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    pub filter: AreaFilter,
    /// Maintainer of every team; each area's own lead when absent
    pub maintainer: Option<String>,
    /// Explicit additions replace convergence when present
    pub add_members: Option<IdentifierSet>,
    pub options: ReconcileOptions,
    pub retry: RetryPolicy,
}

/// Build the desired team for every selected roster entry
pub fn desired_teams(entries: &[AreaEntry], maintainer: Option<&str>) -> Vec<AreaTeam> {
    entries
        .iter()
        .filter_map(|entry| {
            let lead = maintainer.unwrap_or(&entry.lead);
            match AreaTeam::new(&entry.area_label, [lead], entry.owners.iter().cloned()) {
                Ok(team) => Some(team),
                Err(error) => {
                    warn!(area = %entry.area_label, error = %error, "Skipping roster entry");
                    None
                }
            }
        })
        .collect()
}

/// Fetch the roster and reconcile every selected area against `config`.
pub async fn run(plan: &RunPlan, config: &Config) -> anyhow::Result<RunReport> {
    let token = config.require_token()?;
    let api = GitHubTeamClient::new(GitHubConfig::new(
        config.github_api_url.as_str(),
        config.github_org.as_str(),
        token,
    ))?;

    let fetcher = RosterFetcher::new(plan.retry.clone())?;
    let url = config.roster_url();
    info!(url = %url, "Fetching area owners");
    let roster = fetcher.fetch(&url).await;

    Ok(execute(plan, &url, roster, Arc::new(api)).await?)
}

/// Reconcile the selected areas of an already fetched roster.
///
/// Only a run-fatal failure is returned as an error; every team-scoped
/// failure is part of the report.
pub async fn execute(
    plan: &RunPlan,
    roster_url: &str,
    roster: FetchOutcome,
    api: Arc<dyn TeamApi>,
) -> Result<RunReport, TeamsError> {
    let (status, entries) = match roster {
        FetchOutcome::Found(content) => {
            let parsed = parse_area_owners(&content);
            let total = parsed.len();
            let selected = plan.filter.apply(parsed);
            info!(total, selected = selected.len(), "Parsed area owners");
            (
                RosterStatus::Loaded {
                    total,
                    selected: selected.len(),
                },
                selected,
            )
        }
        FetchOutcome::NotFound => {
            warn!(url = %roster_url, "Area owners document not found");
            (
                RosterStatus::NotFound {
                    url: roster_url.to_string(),
                },
                Vec::new(),
            )
        }
        FetchOutcome::Unreachable {
            attempts,
            last_error,
        } => {
            warn!(url = %roster_url, attempts, error = %last_error, "Area owners document unreachable");
            (
                RosterStatus::Unreachable {
                    url: roster_url.to_string(),
                    attempts,
                    last_error,
                },
                Vec::new(),
            )
        }
    };

    let mut reconciler = TeamReconciler::new(api, plan.options.clone());
    let mut outcomes = Vec::new();

    for team in desired_teams(&entries, plan.maintainer.as_deref()) {
        let result = match &plan.add_members {
            Some(members) => reconciler.add_members(&team, members).await?,
            None => reconciler.reconcile(&team).await?,
        };
        outcomes.push(TeamOutcome {
            maintainers: team.maintainers().to_vec(),
            requested_members: plan.add_members.as_ref().map(IdentifierSet::to_vec),
            result,
        });
    }

    Ok(RunReport {
        dry_run: plan.options.dry_run,
        roster: status,
        teams: outcomes,
    })
}

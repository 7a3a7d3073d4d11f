//! Command-line interface
//!
//! Flag names follow the historical camel-case spelling (`--includeArea`);
//! the all-lowercase spelling is accepted as an alias.

use clap::Parser;

use areapod_common::{Config, Error, IdentifierSet, Result};
use areapod_roster::AreaFilter;
use areapod_teams::ReconcileOptions;

use crate::runner::RunPlan;

/// AreaPod - keep area teams in line with the area-owners roster
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "areapod")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Only reconcile areas led by this account; also the maintainer of every team
    #[arg(long, value_name = "LEAD")]
    pub lead: Option<String>,

    /// Reconcile areas whose label contains this text (repeatable)
    #[arg(long = "includeArea", alias = "includearea", value_name = "AREA")]
    pub include_area: Vec<String>,

    /// Skip areas whose label contains this text (repeatable)
    #[arg(long = "excludeArea", alias = "excludearea", value_name = "AREA")]
    pub exclude_area: Vec<String>,

    /// Add this account to every selected existing team instead of converging (repeatable)
    #[arg(
        long = "addMember",
        alias = "addmember",
        value_name = "MEMBER",
        conflicts_with = "remove_old_members"
    )]
    pub add_member: Vec<String>,

    /// Remove members that are not area owners or maintainers
    #[arg(long = "removeOldMembers", alias = "removeoldmembers")]
    pub remove_old_members: bool,

    /// Report what would change without changing anything
    #[arg(long = "dryrun", alias = "dry-run")]
    pub dry_run: bool,

    /// Grant every selected team access to this repository (repeatable)
    #[arg(long = "addRepository", alias = "addrepository", value_name = "REPO")]
    pub add_repository: Vec<String>,

    /// API token; overrides GITHUB_TOKEN
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Organization owning the teams and the roster; overrides GITHUB_ORG
    #[arg(long, value_name = "ORG")]
    pub org: Option<String>,
}

impl Cli {
    /// Reject invocations that select no areas at all
    pub fn validate(&self) -> Result<()> {
        if self.lead.is_none() && self.include_area.is_empty() {
            return Err(Error::Usage(
                "either --lead or --includeArea must be given".to_string(),
            ));
        }
        if !self.add_member.is_empty() && self.remove_old_members {
            return Err(Error::Usage(
                "--addMember cannot be combined with --removeOldMembers".to_string(),
            ));
        }
        Ok(())
    }

    /// Fold command-line overrides into the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(token) = self.token.as_ref().filter(|t| !t.trim().is_empty()) {
            config.github_token = Some(token.clone());
        }
        if let Some(org) = self.org.as_ref().filter(|o| !o.trim().is_empty()) {
            config.github_org = org.clone();
        }
    }

    /// Validate and translate the invocation into a run plan
    pub fn to_plan(&self) -> Result<RunPlan> {
        self.validate()?;

        let members: IdentifierSet = self.add_member.iter().cloned().collect();
        Ok(RunPlan {
            filter: AreaFilter {
                lead: self.lead.clone(),
                include: self.include_area.clone(),
                exclude: self.exclude_area.clone(),
            },
            maintainer: self.lead.clone(),
            add_members: (!members.is_empty()).then_some(members),
            options: ReconcileOptions {
                dry_run: self.dry_run,
                remove_old_members: self.remove_old_members,
                repositories: self.add_repository.clone(),
            },
            ..RunPlan::default()
        })
    }
}

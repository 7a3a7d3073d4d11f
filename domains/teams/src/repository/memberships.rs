//! Membership client
//!
//! Reads and changes the members of one remote team. Every call needs the
//! team's slug; calling with an absent slug is a contract violation.

use std::sync::Arc;

use areapod_common::IdentifierSet;
use areapod_github::TeamApi;

use crate::domain::entities::RemoteTeam;
use crate::error::TeamsError;

#[derive(Clone)]
pub struct MembershipClient {
    api: Arc<dyn TeamApi>,
}

impl MembershipClient {
    pub fn new(api: Arc<dyn TeamApi>) -> Self {
        Self { api }
    }

    /// Current members of the team
    pub async fn list_members(&self, team: &RemoteTeam) -> Result<IdentifierSet, TeamsError> {
        let slug = team.require_slug()?;
        let members = self
            .api
            .list_members(slug)
            .await
            .map_err(|source| TeamsError::MemberListing {
                team: team.name().to_string(),
                slug: slug.to_string(),
                source,
            })?;

        Ok(members.into_iter().collect())
    }

    /// Add one member
    pub async fn add_member(&self, team: &RemoteTeam, member: &str) -> Result<(), TeamsError> {
        let slug = team.require_slug()?;
        self.api
            .add_membership(slug, member)
            .await
            .map_err(|source| TeamsError::AddMember {
                team: team.name().to_string(),
                slug: slug.to_string(),
                member: member.to_string(),
                source,
            })
    }

    /// Remove one member; failures are always reported, never swallowed
    pub async fn remove_member(&self, team: &RemoteTeam, member: &str) -> Result<(), TeamsError> {
        let slug = team.require_slug()?;
        self.api
            .remove_membership(slug, member)
            .await
            .map_err(|source| TeamsError::RemoveMember {
                team: team.name().to_string(),
                slug: slug.to_string(),
                member: member.to_string(),
                source,
            })
    }

    /// Grant the team access to a repository
    pub async fn add_repository(
        &self,
        team: &RemoteTeam,
        repository: &str,
    ) -> Result<(), TeamsError> {
        let slug = team.require_slug()?;
        self.api
            .add_repository(slug, repository)
            .await
            .map_err(|source| TeamsError::RepositoryGrant {
                team: team.name().to_string(),
                slug: slug.to_string(),
                repository: repository.to_string(),
                source,
            })
    }
}

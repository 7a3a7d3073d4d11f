//! Remote team directory
//!
//! Read-through cache of every team in the organization. The listing is
//! fetched page by page on first use and memoized for the rest of the run;
//! it is never invalidated and never returned partially.

use std::sync::Arc;

use areapod_github::{TeamApi, PAGE_SIZE};

use crate::domain::entities::RemoteTeam;
use crate::error::TeamsError;

pub struct RemoteTeamDirectory {
    api: Arc<dyn TeamApi>,
    teams: Option<Vec<RemoteTeam>>,
}

impl RemoteTeamDirectory {
    pub fn new(api: Arc<dyn TeamApi>) -> Self {
        Self { api, teams: None }
    }

    /// Whether the listing has been fetched
    pub fn is_loaded(&self) -> bool {
        self.teams.is_some()
    }

    /// Every team in the organization, in page order
    pub async fn list_all(&mut self) -> Result<&[RemoteTeam], TeamsError> {
        if self.teams.is_none() {
            let teams = self.fetch_all().await?;
            self.teams = Some(teams);
        }
        Ok(self.teams.as_deref().unwrap_or_default())
    }

    /// Find the team called `name` (case-insensitive exact name match).
    ///
    /// No match means the team does not exist yet; more than one match is a
    /// contract violation.
    pub async fn find_by_slug_or_name(
        &mut self,
        name: &str,
    ) -> Result<Option<RemoteTeam>, TeamsError> {
        let matches: Vec<&RemoteTeam> = self
            .list_all()
            .await?
            .iter()
            .filter(|team| team.matches(name))
            .collect();

        match matches.as_slice() {
            [] => Ok(None),
            [team] => Ok(Some((*team).clone())),
            _ => Err(TeamsError::AmbiguousTeam {
                name: name.to_string(),
                matches: matches.len(),
            }),
        }
    }

    async fn fetch_all(&self) -> Result<Vec<RemoteTeam>, TeamsError> {
        let mut teams = Vec::new();

        for page in 1.. {
            let listed = self
                .api
                .list_teams_page(page, PAGE_SIZE)
                .await
                .map_err(|source| {
                    tracing::error!(page, error = %source, "Failed to list organization teams");
                    TeamsError::DirectoryUnavailable { page, source }
                })?;

            if listed.is_empty() {
                break;
            }

            teams.extend(
                listed
                    .into_iter()
                    .map(|summary| RemoteTeam::existing(summary.name, summary.slug)),
            );
        }

        tracing::info!(count = teams.len(), "Loaded organization team directory");
        Ok(teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use areapod_github::mock::{MockOperation, MockTeamApi, RecordedCall};
    use areapod_github::GitHubError;

    fn org_with_teams(count: usize) -> MockTeamApi {
        let mut api = MockTeamApi::new();
        for i in 0..count {
            api = api.with_team(&format!("area-{:03}", i), &[]);
        }
        api
    }

    fn page_requests(api: &MockTeamApi) -> Vec<u32> {
        api.recorded_calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::ListTeamsPage { page, .. } => Some(page),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_list_all_pages_until_empty_page() {
        let api = org_with_teams(250);
        let mut directory = RemoteTeamDirectory::new(Arc::new(api.clone()));

        let teams = directory.list_all().await.unwrap();
        assert_eq!(teams.len(), 250);
        assert_eq!(teams[0].name(), "area-000");
        assert_eq!(teams[249].name(), "area-249");

        // ceil(250 / 100) pages plus the final empty one
        assert_eq!(page_requests(&api), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_exact_multiple_of_page_size() {
        let api = org_with_teams(200);
        let mut directory = RemoteTeamDirectory::new(Arc::new(api.clone()));

        assert_eq!(directory.list_all().await.unwrap().len(), 200);
        assert_eq!(page_requests(&api), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_organization_needs_one_request() {
        let api = MockTeamApi::new();
        let mut directory = RemoteTeamDirectory::new(Arc::new(api.clone()));

        assert!(directory.list_all().await.unwrap().is_empty());
        assert_eq!(page_requests(&api), vec![1]);
    }

    #[tokio::test]
    async fn test_listing_is_memoized() {
        let api = org_with_teams(3);
        let mut directory = RemoteTeamDirectory::new(Arc::new(api.clone()));
        assert!(!directory.is_loaded());

        directory.list_all().await.unwrap();
        directory.find_by_slug_or_name("area-001").await.unwrap();
        directory.find_by_slug_or_name("area-404").await.unwrap();

        assert!(directory.is_loaded());
        assert_eq!(page_requests(&api), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_failed_page_is_fatal_and_not_partial() {
        let api = org_with_teams(150).with_failure(
            MockOperation::ListTeams,
            Some("2"),
            GitHubError::Status {
                status: 500,
                message: "Server Error".to_string(),
            },
        );
        let mut directory = RemoteTeamDirectory::new(Arc::new(api));

        let err = directory.list_all().await.unwrap_err();
        assert!(err.is_run_fatal());
        assert!(matches!(err, TeamsError::DirectoryUnavailable { page: 2, .. }));
        assert!(!directory.is_loaded());
    }

    #[tokio::test]
    async fn test_find_is_case_insensitive() {
        let api = MockTeamApi::new().with_team("area-System.IO", &[]);
        let mut directory = RemoteTeamDirectory::new(Arc::new(api));

        let found = directory
            .find_by_slug_or_name("AREA-system.io")
            .await
            .unwrap()
            .expect("team should be found");
        assert_eq!(found.slug(), Some("area-system-io"));
    }

    #[tokio::test]
    async fn test_slug_alone_does_not_match() {
        let api = MockTeamApi::new().with_team("area-System.IO", &[]);
        let mut directory = RemoteTeamDirectory::new(Arc::new(api));

        assert!(directory
            .find_by_slug_or_name("area-system-io")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_name_equal_to_other_slug_is_not_ambiguous() {
        // "area-io" slugs to "area-io"; "area.io" also slugs to "area-io"
        let api = MockTeamApi::new()
            .with_team("area-io", &[])
            .with_team("area.io", &[]);
        let mut directory = RemoteTeamDirectory::new(Arc::new(api));

        let found = directory
            .find_by_slug_or_name("area-io")
            .await
            .unwrap()
            .expect("team should be found");
        assert_eq!(found.name(), "area-io");
    }

    #[tokio::test]
    async fn test_missing_team_is_not_an_error() {
        let api = MockTeamApi::new().with_team("area-Meta", &[]);
        let mut directory = RemoteTeamDirectory::new(Arc::new(api));

        assert!(directory
            .find_by_slug_or_name("area-io")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_names_are_ambiguous() {
        let api = MockTeamApi::new()
            .with_team("area-io", &[])
            .with_team("AREA-IO", &[]);
        let mut directory = RemoteTeamDirectory::new(Arc::new(api));

        let err = directory.find_by_slug_or_name("area-io").await.unwrap_err();
        assert_eq!(
            err,
            TeamsError::AmbiguousTeam {
                name: "area-io".to_string(),
                matches: 2
            }
        );
        assert!(!err.is_run_fatal());
    }
}

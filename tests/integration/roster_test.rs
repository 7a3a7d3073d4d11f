//! Roster retrieval and area selection in a full run

use areapod_app::{run, RosterStatus};
use areapod_teams::ReconcileOptions;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::*;

async fn expect_no_team_api_calls(server: &MockServer) {
    Mock::given(path_regex(r"^/orgs/.*"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

#[test_log::test(tokio::test)]
async fn test_missing_roster_means_zero_areas() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROSTER_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    expect_no_team_api_calls(&server).await;

    let report = run(&plan("alice", ReconcileOptions::default()), &config_for(&server))
        .await
        .unwrap();

    assert!(matches!(report.roster, RosterStatus::NotFound { .. }));
    assert!(report.teams.is_empty());
    assert_eq!(report.exit_code(), 0);
}

#[test_log::test(tokio::test)]
async fn test_unreachable_roster_is_retried_then_means_zero_areas() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROSTER_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    expect_no_team_api_calls(&server).await;

    let report = run(&plan("alice", ReconcileOptions::default()), &config_for(&server))
        .await
        .unwrap();

    match &report.roster {
        RosterStatus::Unreachable { attempts, .. } => assert_eq!(*attempts, 2),
        other => panic!("expected unreachable roster, got {:?}", other),
    }
    assert!(report.teams.is_empty());
    assert!(report.lines()[0].contains("unreachable after 2 attempt(s)"));
}

#[test_log::test(tokio::test)]
async fn test_include_and_exclude_select_areas() {
    let server = MockServer::start().await;
    mount_roster(
        &server,
        roster_table(&[
            ("area-System.IO", "@alice", "@alice"),
            ("area-System.IO.Compression", "@alice", "@alice"),
            ("area-Meta", "@alice", "@alice"),
            ("area-Codegen", "@zoe", "@zoe"),
        ]),
    )
    .await;
    mount_teams(
        &server,
        &[
            ("area-System.IO", "area-system-io"),
            ("area-System.IO.Compression", "area-system-io-compression"),
            ("area-Meta", "area-meta"),
            ("area-Codegen", "area-codegen"),
        ],
    )
    .await;
    mount_members(&server, "area-system-io", &["alice"]).await;

    let mut plan = plan("alice", ReconcileOptions::default());
    plan.filter.include = vec!["system.io".to_string()];
    plan.filter.exclude = vec!["compression".to_string()];

    let report = run(&plan, &config_for(&server)).await.unwrap();

    let names: Vec<&str> = report
        .teams
        .iter()
        .map(|team| team.result.team_name.as_str())
        .collect();
    assert_eq!(names, vec!["area-System.IO"]);
    assert_eq!(
        report.roster,
        RosterStatus::Loaded {
            total: 4,
            selected: 1
        }
    );
    assert!(report.is_success());
}

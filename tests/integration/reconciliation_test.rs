//! End-to-end reconciliation against a wiremock team API

use areapod_app::run;
use areapod_teams::{ReconcileOptions, TeamsError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::*;

#[test_log::test(tokio::test)]
async fn test_absent_team_is_created_then_owners_added() {
    let server = MockServer::start().await;
    mount_roster(
        &server,
        roster_table(&[("area-io", "@alice", "@alice @bob")]),
    )
    .await;
    mount_teams(&server, &[]).await;

    Mock::given(method("POST"))
        .and(path(teams_path()))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(body_partial_json(json!({
            "name": "area-io",
            "description": "Area owners for area-io",
            "maintainers": ["alice"],
            "privacy": "closed"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "name": "area-io", "slug": "area-io" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    expect_membership(&server, "PUT", "area-io", "bob", 1).await;
    expect_membership(&server, "PUT", "area-io", "alice", 0).await;

    let report = run(&plan("alice", ReconcileOptions::default()), &config_for(&server))
        .await
        .unwrap();

    assert_eq!(report.teams.len(), 1);
    let result = &report.teams[0].result;
    assert!(result.created);
    assert_eq!(result.slug.as_deref(), Some("area-io"));
    assert_eq!(result.members_added, vec!["bob"]);
    assert_eq!(report.exit_code(), 0);
    assert!(report
        .lines()
        .contains(&"Team area-io (area-io) was created. Maintainers: alice".to_string()));
}

#[test_log::test(tokio::test)]
async fn test_stale_member_removed_from_existing_team() {
    let server = MockServer::start().await;
    mount_roster(
        &server,
        roster_table(&[("area-io", "@alice", "@alice @bob")]),
    )
    .await;
    mount_teams(&server, &[("area-io", "area-io")]).await;
    mount_members(&server, "area-io", &["alice", "bob", "carol"]).await;

    expect_membership(&server, "DELETE", "area-io", "carol", 1).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let options = ReconcileOptions {
        remove_old_members: true,
        ..ReconcileOptions::default()
    };
    let report = run(&plan("alice", options), &config_for(&server))
        .await
        .unwrap();

    let result = &report.teams[0].result;
    assert!(!result.created);
    assert!(result.members_added.is_empty());
    assert_eq!(result.members_removed, vec!["carol"]);
    assert!(report.is_success());
}

#[test_log::test(tokio::test)]
async fn test_dry_run_issues_no_mutating_requests() {
    let server = MockServer::start().await;
    mount_roster(
        &server,
        roster_table(&[
            ("area-io", "@alice", "@alice @bob @frank"),
            ("area-Meta", "@alice", "@dan"),
        ]),
    )
    .await;
    mount_teams(&server, &[("area-io", "area-io")]).await;
    mount_members(&server, "area-io", &["alice", "bob", "carol"]).await;

    for verb in ["POST", "PUT", "DELETE", "PATCH"] {
        Mock::given(method(verb))
            .and(path_regex(r"^/orgs/.*"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
    }

    let options = ReconcileOptions {
        dry_run: true,
        remove_old_members: true,
        repositories: vec!["runtime".to_string()],
    };
    let report = run(&plan("alice", options), &config_for(&server))
        .await
        .unwrap();

    let io = &report.teams[0].result;
    assert_eq!(io.members_added, vec!["frank"]);
    assert_eq!(io.members_removed, vec!["carol"]);
    assert_eq!(io.repositories_added, vec!["runtime"]);

    let meta = &report.teams[1].result;
    assert!(meta.created);
    assert_eq!(meta.slug.as_deref(), Some("dry-run/area-meta"));
    assert_eq!(meta.members_added, vec!["dan"]);

    assert!(report.lines().iter().all(|line| line.starts_with("[dry-run] ")));
}

#[test_log::test(tokio::test)]
async fn test_directory_failure_aborts_whole_run() {
    let server = MockServer::start().await;
    mount_roster(
        &server,
        roster_table(&[("area-io", "@alice", "@alice @bob"), ("area-Meta", "@alice", "@dan")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(teams_path()))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({ "message": "Bad Gateway" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = run(&plan("alice", ReconcileOptions::default()), &config_for(&server))
        .await
        .unwrap_err();

    let teams_error = err
        .downcast_ref::<TeamsError>()
        .expect("run-fatal teams error");
    assert!(teams_error.is_run_fatal());
}

#[test_log::test(tokio::test)]
async fn test_failed_addition_does_not_block_next_team() {
    let server = MockServer::start().await;
    mount_roster(
        &server,
        roster_table(&[
            ("area-io", "@alice", "@alice @bob @carol"),
            ("area-Meta", "@alice", "@alice @dave"),
        ]),
    )
    .await;
    mount_teams(&server, &[("area-io", "area-io"), ("area-Meta", "area-meta")]).await;
    mount_members(&server, "area-io", &["alice"]).await;
    mount_members(&server, "area-meta", &["alice"]).await;

    Mock::given(method("PUT"))
        .and(path(membership_path("area-io", "bob")))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "message": "Must have admin rights" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    expect_membership(&server, "PUT", "area-io", "carol", 0).await;
    expect_membership(&server, "PUT", "area-meta", "dave", 1).await;

    let report = run(&plan("alice", ReconcileOptions::default()), &config_for(&server))
        .await
        .unwrap();

    let io = &report.teams[0].result;
    assert!(io.members_added.is_empty());
    assert_eq!(io.failed_adds, vec!["carol"]);
    assert!(io.add_failure.as_ref().is_some_and(|f| f.permission_denied));

    let meta = &report.teams[1].result;
    assert_eq!(meta.members_added, vec!["dave"]);
    assert!(meta.is_success());

    assert_eq!(report.exit_code(), 1);
    assert!(report.lines().contains(
        &"Could not add members to area-io (area-io). You must be a team maintainer.".to_string()
    ));
}

#[test_log::test(tokio::test)]
async fn test_repository_grant_uses_org_qualified_name() {
    let server = MockServer::start().await;
    mount_roster(
        &server,
        roster_table(&[("area-io", "@alice", "@alice")]),
    )
    .await;
    mount_teams(&server, &[("area-io", "area-io")]).await;
    mount_members(&server, "area-io", &["alice"]).await;

    Mock::given(method("PUT"))
        .and(path(format!("{}/area-io/repos/{}/runtime", teams_path(), ORG)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let options = ReconcileOptions {
        repositories: vec!["runtime".to_string()],
        ..ReconcileOptions::default()
    };
    let report = run(&plan("alice", options), &config_for(&server))
        .await
        .unwrap();

    assert_eq!(report.teams[0].result.repositories_added, vec!["runtime"]);
    assert!(report.is_success());
}

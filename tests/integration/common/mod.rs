//! Shared fixtures for end-to-end runs
//!
//! One wiremock server plays both the roster host and the team API:
//! - `config_for` points a `Config` at it
//! - `mount_*` helpers stub the roster, team directory and member listings
//! - `plan` builds a run plan with a fast retry policy

#![allow(dead_code)]

use std::time::Duration;

use areapod_app::RunPlan;
use areapod_common::Config;
use areapod_roster::{AreaFilter, RetryPolicy};
use areapod_teams::ReconcileOptions;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ORG: &str = "dotnet";
pub const TOKEN: &str = "ghp_integration";
pub const ROSTER_PATH: &str = "/docs/area-owners.md";

/// Markdown area-owners table with one row per `(label, lead, owners)`
pub fn roster_table(rows: &[(&str, &str, &str)]) -> String {
    let mut table = String::from("| Area | Lead | Owners | Notes |\n|------|------|--------|-------|\n");
    for (label, lead, owners) in rows {
        table.push_str(&format!("| {} | {} | {} | |\n", label, lead, owners));
    }
    table
}

pub fn config_for(server: &MockServer) -> Config {
    Config {
        github_token: Some(TOKEN.to_string()),
        github_api_url: server.uri(),
        github_org: ORG.to_string(),
        roster_url: Some(format!("{}{}", server.uri(), ROSTER_PATH)),
        ..Config::default()
    }
}

pub fn plan(lead: &str, options: ReconcileOptions) -> RunPlan {
    RunPlan {
        filter: AreaFilter {
            lead: Some(lead.to_string()),
            ..AreaFilter::default()
        },
        maintainer: Some(lead.to_string()),
        options,
        retry: RetryPolicy::new(2, Duration::from_millis(10)),
        ..RunPlan::default()
    }
}

pub fn teams_path() -> String {
    format!("/orgs/{}/teams", ORG)
}

pub fn membership_path(slug: &str, login: &str) -> String {
    format!("/orgs/{}/teams/{}/memberships/{}", ORG, slug, login)
}

pub async fn mount_roster(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path(ROSTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Directory with every team on page 1 and an empty page 2
pub async fn mount_teams(server: &MockServer, teams: &[(&str, &str)]) {
    let listed: Vec<Value> = teams
        .iter()
        .map(|(name, slug)| json!({ "name": name, "slug": slug }))
        .collect();
    mount_pages(server, &teams_path(), listed).await;
}

pub async fn mount_members(server: &MockServer, slug: &str, members: &[&str]) {
    let listed: Vec<Value> = members.iter().map(|login| json!({ "login": login })).collect();
    mount_pages(server, &format!("{}/{}/members", teams_path(), slug), listed).await;
}

async fn mount_pages(server: &MockServer, listing: &str, items: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(listing))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(listing))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

/// Accept membership changes for `login` in `slug`, expecting `times` calls
pub async fn expect_membership(
    server: &MockServer,
    verb: &str,
    slug: &str,
    login: &str,
    times: u64,
) {
    Mock::given(method(verb))
        .and(path(membership_path(slug, login)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "active" })))
        .expect(times)
        .mount(server)
        .await;
}

//! AreaPod application composition root
//!
//! Wires the roster, the team API client and the reconciler into one run.

pub mod cli;
pub mod report;
pub mod runner;

pub use cli::Cli;
pub use report::{RosterStatus, RunReport, TeamOutcome};
pub use runner::{desired_teams, execute, run, RunPlan};

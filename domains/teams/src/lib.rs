//! Teams domain: desired area teams, the remote team directory, memberships
//! and the reconciler that converges one onto the other

pub mod domain;
pub mod error;
pub mod reconciler;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::state::{
    StateError, TeamEvent, TeamGuardContext, TeamState, TeamStateMachine,
};
pub use error::TeamsError;
pub use reconciler::{ReconcileOptions, TeamReconciler};
pub use repository::{MembershipClient, RemoteTeamDirectory};

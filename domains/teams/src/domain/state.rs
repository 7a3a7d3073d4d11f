//! State machine for a team under reconciliation
//!
//! Every desired team starts either `Absent` (no remote team with its name)
//! or `Present` (the directory knows its slug). Creation moves an absent team
//! to `Present`; convergence and fatal errors end in `Converged` or `Aborted`.
//! Transitions that need a slug are guarded on one being known.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot transition from {from} to {to} via {event}")]
    InvalidTransition {
        from: String,
        to: String,
        event: String,
    },

    #[error("Guard condition failed: {0}")]
    GuardFailed(String),

    #[error("Terminal state: {0} is a terminal state and cannot transition")]
    TerminalState(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamState {
    Absent,
    Present,
    Converged,
    Aborted,
}

impl TeamState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged | Self::Aborted)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [TeamState] {
        match self {
            Self::Absent => &[Self::Present, Self::Aborted],
            Self::Present => &[Self::Converged, Self::Aborted],
            Self::Converged => &[],
            Self::Aborted => &[],
        }
    }
}

impl std::fmt::Display for TeamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Present => write!(f, "present"),
            Self::Converged => write!(f, "converged"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Events that trigger team state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeamEvent {
    /// The team was created (or its creation simulated)
    Create,
    /// Membership changes were applied
    Converge,
    /// A team-fatal error stopped processing
    Abort,
}

impl std::fmt::Display for TeamEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Converge => write!(f, "converge"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Guard context for team transitions
#[derive(Debug, Clone)]
pub struct TeamGuardContext {
    /// Whether the team has a slug to address it by
    pub slug_known: bool,
}

/// Team state machine
pub struct TeamStateMachine;

impl TeamStateMachine {
    /// Attempt a state transition with guard conditions
    pub fn transition(
        current: TeamState,
        event: TeamEvent,
        context: Option<&TeamGuardContext>,
    ) -> Result<TeamState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let slug_known = context.map_or(false, |ctx| ctx.slug_known);

        let next = match (&current, &event) {
            (TeamState::Absent, TeamEvent::Create) => {
                if !slug_known {
                    return Err(StateError::GuardFailed(
                        "A created team must have a slug".to_string(),
                    ));
                }
                TeamState::Present
            }
            (TeamState::Present, TeamEvent::Converge) => {
                if !slug_known {
                    return Err(StateError::GuardFailed(
                        "Cannot converge membership without a slug".to_string(),
                    ));
                }
                TeamState::Converged
            }
            (TeamState::Absent | TeamState::Present, TeamEvent::Abort) => TeamState::Aborted,

            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    to: "unknown".to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(
        current: TeamState,
        event: &TeamEvent,
        context: Option<&TeamGuardContext>,
    ) -> bool {
        Self::transition(current, *event, context).is_ok()
    }
}

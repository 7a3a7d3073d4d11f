//! Teams domain layer: entities and the team lifecycle state machine

pub mod entities;
pub mod state;

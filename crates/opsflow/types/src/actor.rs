//! Actors and the viewer context
//!
//! Every notification audience test and several lifecycle guards
//! depend on who is looking. The host supplies a [`Viewer`] per active
//! session; the engine is re-evaluated per viewer.

use crate::ActorId;
use serde::{Deserialize, Serialize};

/// The role of an actor in the system
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Oversees the team: sees all task and invoice traffic, confirms
    /// invoice uploads, answers escalations
    Manager,
    /// Works assigned tasks and raises escalations
    Agent,
}

impl Role {
    pub fn is_manager(&self) -> bool {
        matches!(self, Self::Manager)
    }
}

/// The identity and role of the active viewer session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: ActorId,
    pub role: Role,
}

impl Viewer {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: ActorId::new(id),
            role,
        }
    }

    pub fn manager(id: impl Into<String>) -> Self {
        Self::new(id, Role::Manager)
    }

    pub fn agent(id: impl Into<String>) -> Self {
        Self::new(id, Role::Agent)
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// Check whether this viewer is the given actor
    pub fn is(&self, actor: &ActorId) -> bool {
        &self.id == actor
    }
}

//! Escalations: issues raised by agents against tasks
//!
//! An escalation carries an append-only message history between the
//! raising agent and a manager. While any escalation on a task is not
//! CLOSED, the task is flagged escalated and the automation engine
//! refuses to auto-complete it. Closed escalations are retained as
//! history; a task may accumulate several over its lifetime.

use crate::{ActorId, EscalationId, Role, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The lifecycle state of an escalation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EscalationStatus {
    /// Waiting on a manager reply
    #[default]
    Pending,
    /// A manager has replied; the ball is with the agent
    Responded,
    /// Resolved by the raising agent — terminal
    Closed,
}

impl EscalationStatus {
    /// Check if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for EscalationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::Responded => "RESPONDED",
            Self::Closed => "CLOSED",
        };
        write!(f, "{label}")
    }
}

/// One message in an escalation thread
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationMessage {
    pub author_id: ActorId,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl EscalationMessage {
    pub fn new(author_id: ActorId, role: Role, text: impl Into<String>) -> Self {
        Self {
            author_id,
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An issue raised by an agent against a task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    /// Unique escalation identifier
    pub id: EscalationId,
    /// The task this escalation is about
    pub task_id: TaskId,
    /// The agent who raised it — the only actor allowed to close it
    pub agent_id: ActorId,
    /// Append-only message thread, oldest first
    pub history: Vec<EscalationMessage>,
    /// Current lifecycle state
    pub status: EscalationStatus,
    /// When the escalation was raised
    pub created_at: DateTime<Utc>,
    /// When the thread last changed
    pub updated_at: DateTime<Utc>,
}

impl Escalation {
    /// Open a new escalation in PENDING with the raising agent's
    /// initial message
    pub fn open(task_id: TaskId, agent_id: ActorId, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EscalationId::generate(),
            task_id,
            agent_id: agent_id.clone(),
            history: vec![EscalationMessage::new(agent_id, Role::Agent, text)],
            status: EscalationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// An escalation is active while it is not CLOSED
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// The most recent message in the thread
    pub fn last_message(&self) -> Option<&EscalationMessage> {
        self.history.last()
    }

    /// Check if the given actor raised this escalation
    pub fn raised_by(&self, actor: &ActorId) -> bool {
        &self.agent_id == actor
    }

    /// True once at least one reply follows the initial message
    pub fn has_reply(&self) -> bool {
        self.history.len() > 1
    }
}

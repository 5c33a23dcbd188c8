//! Tasks: the primary unit of work
//!
//! A task moves through a four-state lifecycle. Two kinds — AUGMENTING
//! and QA — are inventory-driven: they reach DONE only when the engine
//! observes every linked inventory item finished, never by direct user
//! action.

use crate::{ActorId, InventoryFileId, InventoryItemId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The lifecycle state of a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    /// Not yet started
    #[default]
    Todo,
    /// Being worked
    InProgress,
    /// Parked, with a reason note on the task
    OnHold,
    /// Finished — terminal, no outgoing transitions
    Done,
}

impl TaskStatus {
    /// Check if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::OnHold => "ON_HOLD",
            Self::Done => "DONE",
        };
        write!(f, "{label}")
    }
}

/// What kind of work a task represents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Data augmentation over an inventory item set
    Augmenting,
    /// Quality assurance over an inventory item set
    Qa,
    /// Dead-link sweep
    Check404,
    /// Companion task derived from an invoice
    InvoiceProcessing,
    /// Periodic data refresh
    DataRefresher,
}

impl TaskKind {
    /// Kinds completed by the automation engine from inventory state.
    /// These never transition to DONE by direct user action.
    pub fn auto_completed(&self) -> bool {
        matches!(self, Self::Augmenting | Self::Qa)
    }
}

/// How urgent a task is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// A note on a task — ordered, append-only
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNote {
    pub author_id: ActorId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl TaskNote {
    pub fn new(author_id: ActorId, text: impl Into<String>) -> Self {
        Self {
            author_id,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A file attached to a task or invoice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A unit of work assigned to an agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier
    pub id: TaskId,
    /// Short human-readable title
    pub title: String,
    /// The agent responsible for this task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<ActorId>,
    /// Current lifecycle state
    pub status: TaskStatus,
    /// Urgency
    pub priority: TaskPriority,
    /// What kind of work this is
    pub kind: TaskKind,
    /// When the work is due
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// When the task reached DONE (if it has)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// The inventory file auto-completion watches (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_file_id: Option<InventoryFileId>,
    /// The items within that file this task covers
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub inventory_item_ids: BTreeSet<InventoryItemId>,
    /// True iff at least one non-CLOSED escalation references this task
    pub is_escalated: bool,
    /// Ordered notes, including ON_HOLD reasons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<TaskNote>,
    /// Attached files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Task {
    /// Create a new TODO task
    pub fn new(id: TaskId, title: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            id,
            title: title.into(),
            assignee_id: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::default(),
            kind,
            due_date: None,
            created_at: Utc::now(),
            completed_at: None,
            inventory_file_id: None,
            inventory_item_ids: BTreeSet::new(),
            is_escalated: false,
            notes: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn with_assignee(mut self, assignee: ActorId) -> Self {
        self.assignee_id = Some(assignee);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_inventory(
        mut self,
        file: InventoryFileId,
        items: impl IntoIterator<Item = InventoryItemId>,
    ) -> Self {
        self.inventory_file_id = Some(file);
        self.inventory_item_ids = items.into_iter().collect();
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Check if the task is finished
    pub fn is_done(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check if the given actor is the assignee
    pub fn is_assigned_to(&self, actor: &ActorId) -> bool {
        self.assignee_id.as_ref() == Some(actor)
    }

    /// Append a note
    pub fn add_note(&mut self, note: TaskNote) {
        self.notes.push(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new(TaskId::new("t1"), "Augment batch 12", TaskKind::Augmenting);
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(!task.is_done());
        assert!(!task.is_escalated);
        assert!(task.assignee_id.is_none());
        assert!(task.inventory_item_ids.is_empty());
    }

    #[test]
    fn test_auto_completed_kinds() {
        assert!(TaskKind::Augmenting.auto_completed());
        assert!(TaskKind::Qa.auto_completed());
        assert!(!TaskKind::Check404.auto_completed());
        assert!(!TaskKind::InvoiceProcessing.auto_completed());
        assert!(!TaskKind::DataRefresher.auto_completed());
    }

    #[test]
    fn test_terminal_status() {
        assert!(TaskStatus::Done.is_terminal());
        assert!(!TaskStatus::Todo.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(!TaskStatus::OnHold.is_terminal());
    }

    #[test]
    fn test_assignment() {
        let task = Task::new(TaskId::new("t1"), "Check links", TaskKind::Check404)
            .with_assignee(ActorId::new("agent-1"));
        assert!(task.is_assigned_to(&ActorId::new("agent-1")));
        assert!(!task.is_assigned_to(&ActorId::new("agent-2")));
    }

    #[test]
    fn test_inventory_links() {
        let task = Task::new(TaskId::new("t1"), "QA batch", TaskKind::Qa).with_inventory(
            InventoryFileId::new("file-1"),
            [InventoryItemId::new("i1"), InventoryItemId::new("i2")],
        );
        assert_eq!(task.inventory_item_ids.len(), 2);
        assert!(task.inventory_file_id.is_some());
    }

    #[test]
    fn test_notes_are_ordered() {
        let mut task = Task::new(TaskId::new("t1"), "Refresh", TaskKind::DataRefresher);
        task.add_note(TaskNote::new(ActorId::new("a"), "first"));
        task.add_note(TaskNote::new(ActorId::new("a"), "second"));
        assert_eq!(task.notes[0].text, "first");
        assert_eq!(task.notes[1].text, "second");
    }

    #[test]
    fn test_serde_roundtrip() {
        let task = Task::new(TaskId::new("t1"), "Augment", TaskKind::Augmenting)
            .with_priority(TaskPriority::High);
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, back);
    }
}

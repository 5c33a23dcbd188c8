//! Invoices and their derived tasks
//!
//! An invoice owns at most two tasks with deterministic ids: a
//! companion processing task created alongside it, and a
//! manager-review task created once, on the edge into COMPLETED.
//! Both are maintained by the automation rules, never by hand.

use crate::{ActorId, Attachment, InvoiceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The lifecycle state of an invoice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InvoiceStatus {
    /// Received, not yet assigned
    #[default]
    Pending,
    /// Assigned to an agent with dates set
    Assigned,
    /// Processing finished with a deliverable attached
    Completed,
    /// Final deliverable confirmed uploaded by a manager — terminal
    Uploaded,
}

impl InvoiceStatus {
    /// Check if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Uploaded)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::Assigned => "ASSIGNED",
            Self::Completed => "COMPLETED",
            Self::Uploaded => "UPLOADED",
        };
        write!(f, "{label}")
    }
}

/// A billing record moving through processing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique invoice identifier
    pub id: InvoiceId,
    /// Human-readable reference
    pub reference_name: String,
    /// Current lifecycle state
    pub status: InvoiceStatus,
    /// The agent processing this invoice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<ActorId>,
    /// When processing is due
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// When the invoice was created
    pub created_at: DateTime<Utc>,
    /// When the invoice reached COMPLETED (if it has)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Attached files, mirrored onto the companion task
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Invoice {
    /// Create a new PENDING invoice
    pub fn new(id: InvoiceId, reference_name: impl Into<String>) -> Self {
        Self {
            id,
            reference_name: reference_name.into(),
            status: InvoiceStatus::Pending,
            assignee_id: None,
            due_date: None,
            created_at: Utc::now(),
            completed_at: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assignee(mut self, assignee: ActorId) -> Self {
        self.assignee_id = Some(assignee);
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Check if processing has finished (COMPLETED or UPLOADED)
    pub fn is_processed(&self) -> bool {
        matches!(self.status, InvoiceStatus::Completed | InvoiceStatus::Uploaded)
    }
}

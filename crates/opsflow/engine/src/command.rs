//! Commands and the collaborator seams
//!
//! Every write the engine wants flows out as a [`Command`] — an
//! idempotent upsert or delete keyed by entity id — through a
//! [`CommandSink`]. Alerts go out as plain text through an
//! [`AlertChannel`]. Both are fire-and-forget: the engine logs
//! failures and moves on; the next snapshot reconciles any divergence.

use opsflow_types::{EngineResult, Escalation, Invoice, InvoiceId, Task, TaskId};
use serde::{Deserialize, Serialize};

/// An idempotent write addressed to the storage/sync collaborator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    CreateTask(Task),
    UpdateTask(Task),
    DeleteTask(TaskId),
    CreateInvoice(Invoice),
    UpdateInvoice(Invoice),
    DeleteInvoice(InvoiceId),
    CreateEscalation(Escalation),
    UpdateEscalation(Escalation),
}

impl Command {
    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateTask(_) => "create_task",
            Self::UpdateTask(_) => "update_task",
            Self::DeleteTask(_) => "delete_task",
            Self::CreateInvoice(_) => "create_invoice",
            Self::UpdateInvoice(_) => "update_invoice",
            Self::DeleteInvoice(_) => "delete_invoice",
            Self::CreateEscalation(_) => "create_escalation",
            Self::UpdateEscalation(_) => "update_escalation",
        }
    }
}

/// The storage/sync collaborator's write side
pub trait CommandSink {
    fn submit(&mut self, command: Command) -> EngineResult<()>;
}

/// The external alert channel — best-effort, no return value consumed
pub trait AlertChannel {
    fn send(&mut self, message: &str);
}

/// In-memory sink that records every submitted command
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub commands: Vec<Command>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandSink for RecordingSink {
    fn submit(&mut self, command: Command) -> EngineResult<()> {
        self.commands.push(command);
        Ok(())
    }
}

/// In-memory alert channel that records every message
#[derive(Clone, Debug, Default)]
pub struct RecordingAlerts {
    pub messages: Vec<String>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertChannel for RecordingAlerts {
    fn send(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

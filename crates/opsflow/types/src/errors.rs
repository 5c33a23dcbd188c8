//! Error types for the Opsflow engine

use crate::{EscalationId, InvoiceId, TaskId};

/// Errors that can occur in engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    #[error("Escalation not found: {0}")]
    EscalationNotFound(EscalationId),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Actor is not authorized for this transition")]
    NotAuthorized,

    #[error("Placing a task on hold requires a reason note")]
    HoldReasonRequired,

    #[error("Task {0} has an active escalation and cannot be completed")]
    EscalationActive(TaskId),

    #[error("Task cannot be completed by hand; it is finished automatically from inventory state")]
    AutoCompletedKind,

    #[error("An escalation needs at least one reply before it can be closed")]
    ReplyRequired,

    #[error("Escalation is already closed")]
    EscalationClosed,

    #[error("Completing an invoice requires the final deliverable to be attached")]
    DeliverableMissing,

    #[error("Sync write failed: {0}")]
    SyncWrite(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

//! Invoice lifecycle: PENDING → ASSIGNED → COMPLETED → UPLOADED
//!
//! Strictly linear. ASSIGNED needs an agent and dates, COMPLETED needs
//! the final deliverable attached, UPLOADED needs a manager's
//! confirmation. There is no PENDING → COMPLETED shortcut.

use chrono::{DateTime, Utc};
use opsflow_types::{EngineError, EngineResult, Invoice, InvoiceStatus, Viewer};

/// Caller-supplied preconditions for invoice transitions
#[derive(Clone, Copy, Debug, Default)]
pub struct InvoiceContext {
    /// Whether the final deliverable artifact is attached
    pub deliverable_attached: bool,
}

/// Validate an invoice transition for the given actor
pub fn can_transition(
    invoice: &Invoice,
    to: InvoiceStatus,
    actor: &Viewer,
    ctx: &InvoiceContext,
) -> EngineResult<()> {
    match (invoice.status, to) {
        (InvoiceStatus::Pending, InvoiceStatus::Assigned) => Ok(()),
        (InvoiceStatus::Assigned, InvoiceStatus::Completed) => {
            if !ctx.deliverable_attached {
                return Err(EngineError::DeliverableMissing);
            }
            Ok(())
        }
        (InvoiceStatus::Completed, InvoiceStatus::Uploaded) => {
            if !actor.is_manager() {
                return Err(EngineError::NotAuthorized);
            }
            Ok(())
        }
        (from, to) => Err(EngineError::InvalidTransition(format!(
            "invoice {} cannot move {from:?} -> {to:?}",
            invoice.id
        ))),
    }
}

/// Apply a validated transition, returning the updated invoice
pub fn apply(invoice: &Invoice, to: InvoiceStatus, now: DateTime<Utc>) -> Invoice {
    let mut updated = invoice.clone();
    updated.status = to;
    if to == InvoiceStatus::Completed {
        updated.completed_at = Some(now);
    }
    updated
}

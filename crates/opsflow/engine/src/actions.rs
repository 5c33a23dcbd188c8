//! User-driven operations
//!
//! The call-site API for everything a person does by hand: task
//! transitions, escalation threads, invoice confirmation, deletes.
//! Each operation validates against the current snapshot through the
//! pure lifecycle machines and returns the commands to issue — a
//! rejected guard means no commands and no mutation anywhere.
//!
//! Lookups fail loudly: a dangling id is an error here, unlike in the
//! automation rules, which silently defer instead.

use crate::lifecycle::{escalation, invoice, task};
use crate::{rules, Command, Snapshot};
use chrono::{DateTime, Utc};
use opsflow_types::{
    EngineError, EngineResult, Escalation, EscalationId, Invoice, InvoiceId, InvoiceStatus, Task,
    TaskId, TaskStatus, Viewer,
};

/// Create a task by hand
pub fn create_task(task: Task) -> Vec<Command> {
    vec![Command::CreateTask(task)]
}

/// Transition a task, recording an ON_HOLD reason as a note
pub fn transition_task(
    snapshot: &Snapshot,
    viewer: &Viewer,
    task_id: &TaskId,
    to: TaskStatus,
    hold_reason: Option<&str>,
    now: DateTime<Utc>,
) -> EngineResult<Vec<Command>> {
    let current = snapshot
        .tasks
        .get(task_id)
        .ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;

    let ctx = task::TransitionContext {
        has_active_escalation: snapshot.has_active_escalation(task_id),
        hold_reason,
    };
    task::can_transition(current, to, viewer, &ctx)?;
    let updated = task::apply(current, to, viewer, &ctx, now);
    Ok(vec![Command::UpdateTask(updated)])
}

/// Delete a task
pub fn delete_task(snapshot: &Snapshot, task_id: &TaskId) -> EngineResult<Vec<Command>> {
    if !snapshot.tasks.contains_key(task_id) {
        return Err(EngineError::TaskNotFound(task_id.clone()));
    }
    Ok(vec![Command::DeleteTask(task_id.clone())])
}

/// Raise an escalation on a task. Creates the PENDING thread with the
/// viewer's initial message and flips the task's escalated flag on.
pub fn raise_escalation(
    snapshot: &Snapshot,
    viewer: &Viewer,
    task_id: &TaskId,
    text: impl Into<String>,
) -> EngineResult<Vec<Command>> {
    let target = snapshot
        .tasks
        .get(task_id)
        .ok_or_else(|| EngineError::TaskNotFound(task_id.clone()))?;

    let opened = Escalation::open(task_id.clone(), viewer.id.clone(), text);

    let mut commands = vec![Command::CreateEscalation(opened)];
    if !target.is_escalated {
        let mut flagged = target.clone();
        flagged.is_escalated = true;
        commands.push(Command::UpdateTask(flagged));
    }
    Ok(commands)
}

/// Reply to an open escalation
pub fn reply_to_escalation(
    snapshot: &Snapshot,
    viewer: &Viewer,
    escalation_id: &EscalationId,
    text: impl Into<String>,
    now: DateTime<Utc>,
) -> EngineResult<Vec<Command>> {
    let current = snapshot
        .escalations
        .get(escalation_id)
        .ok_or_else(|| EngineError::EscalationNotFound(escalation_id.clone()))?;

    let updated = escalation::reply(current, &viewer.id, viewer.role, text, now)?;
    Ok(vec![Command::UpdateEscalation(updated)])
}

/// Close an escalation and recompute the linked task's escalated flag
/// against the *other* escalations still open for it. Clearing the
/// flag unconditionally would be wrong when several threads reference
/// one task.
pub fn close_escalation(
    snapshot: &Snapshot,
    viewer: &Viewer,
    escalation_id: &EscalationId,
    now: DateTime<Utc>,
) -> EngineResult<Vec<Command>> {
    let current = snapshot
        .escalations
        .get(escalation_id)
        .ok_or_else(|| EngineError::EscalationNotFound(escalation_id.clone()))?;

    let closed = escalation::close(current, &viewer.id, now)?;

    let still_escalated = snapshot
        .active_escalations_for(&closed.task_id)
        .iter()
        .any(|e| e.id != closed.id);

    let mut commands = vec![Command::UpdateEscalation(closed.clone())];
    // The task reference is weak: a deleted task makes this a no-op
    if let Some(target) = snapshot.tasks.get(&closed.task_id) {
        if target.is_escalated != still_escalated {
            let mut updated = target.clone();
            updated.is_escalated = still_escalated;
            commands.push(Command::UpdateTask(updated));
        }
    }
    Ok(commands)
}

/// Create an invoice. The companion processing task is created
/// synchronously under its deterministic id; the delta-driven rule
/// backstops invoices that arrive through other paths.
pub fn create_invoice(invoice: Invoice) -> Vec<Command> {
    let companion = rules::companion_task(TaskId::invoice_companion(&invoice.id), &invoice);
    vec![
        Command::CreateInvoice(invoice),
        Command::CreateTask(companion),
    ]
}

/// Assign an invoice to an agent with a due date
pub fn assign_invoice(
    snapshot: &Snapshot,
    viewer: &Viewer,
    invoice_id: &InvoiceId,
    assignee: opsflow_types::ActorId,
    due_date: DateTime<Utc>,
) -> EngineResult<Vec<Command>> {
    let current = lookup_invoice(snapshot, invoice_id)?;

    invoice::can_transition(
        current,
        InvoiceStatus::Assigned,
        viewer,
        &invoice::InvoiceContext::default(),
    )?;
    let mut updated = invoice::apply(current, InvoiceStatus::Assigned, Utc::now());
    updated.assignee_id = Some(assignee);
    updated.due_date = Some(due_date);
    Ok(vec![Command::UpdateInvoice(updated)])
}

/// Complete an invoice. The caller attests whether the final
/// deliverable is attached; without it the transition is rejected.
pub fn complete_invoice(
    snapshot: &Snapshot,
    viewer: &Viewer,
    invoice_id: &InvoiceId,
    deliverable_attached: bool,
    now: DateTime<Utc>,
) -> EngineResult<Vec<Command>> {
    let current = lookup_invoice(snapshot, invoice_id)?;

    let ctx = invoice::InvoiceContext {
        deliverable_attached,
    };
    invoice::can_transition(current, InvoiceStatus::Completed, viewer, &ctx)?;
    let updated = invoice::apply(current, InvoiceStatus::Completed, now);
    Ok(vec![Command::UpdateInvoice(updated)])
}

/// Manager confirmation that the deliverable was uploaded
pub fn confirm_upload(
    snapshot: &Snapshot,
    viewer: &Viewer,
    invoice_id: &InvoiceId,
    now: DateTime<Utc>,
) -> EngineResult<Vec<Command>> {
    let current = lookup_invoice(snapshot, invoice_id)?;

    invoice::can_transition(
        current,
        InvoiceStatus::Uploaded,
        viewer,
        &invoice::InvoiceContext::default(),
    )?;
    let updated = invoice::apply(current, InvoiceStatus::Uploaded, now);
    Ok(vec![Command::UpdateInvoice(updated)])
}

/// Delete an invoice together with the derived tasks it owns. A
/// companion or review task that is already gone is skipped, not an
/// error.
pub fn delete_invoice(snapshot: &Snapshot, invoice_id: &InvoiceId) -> EngineResult<Vec<Command>> {
    lookup_invoice(snapshot, invoice_id)?;

    let mut commands = vec![Command::DeleteInvoice(invoice_id.clone())];
    for derived in [
        TaskId::invoice_companion(invoice_id),
        TaskId::manager_review(invoice_id),
    ] {
        if snapshot.tasks.contains_key(&derived) {
            commands.push(Command::DeleteTask(derived));
        }
    }
    Ok(commands)
}

fn lookup_invoice<'a>(snapshot: &'a Snapshot, id: &InvoiceId) -> EngineResult<&'a Invoice> {
    snapshot
        .invoices
        .get(id)
        .ok_or_else(|| EngineError::InvoiceNotFound(id.clone()))
}

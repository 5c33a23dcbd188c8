//! Task lifecycle: TODO ↔ IN_PROGRESS ↔ ON_HOLD → DONE
//!
//! The three working states move freely for an authorized actor.
//! ON_HOLD demands a reason note. DONE is terminal and guarded twice:
//! inventory-driven kinds reach it only through the automation engine,
//! and an active escalation blocks it outright.

use chrono::{DateTime, Utc};
use opsflow_types::{EngineError, EngineResult, Task, TaskNote, TaskStatus, Viewer};

/// Caller-supplied facts the task machine cannot derive on its own
#[derive(Clone, Copy, Debug, Default)]
pub struct TransitionContext<'a> {
    /// Whether any non-CLOSED escalation references the task
    pub has_active_escalation: bool,
    /// Reason for an ON_HOLD transition, recorded as a note
    pub hold_reason: Option<&'a str>,
}

/// Validate a task transition for the given actor
pub fn can_transition(
    task: &Task,
    to: TaskStatus,
    actor: &Viewer,
    ctx: &TransitionContext<'_>,
) -> EngineResult<()> {
    if task.is_done() {
        return Err(EngineError::InvalidTransition(format!(
            "task {} is DONE, which is terminal",
            task.id
        )));
    }

    if !actor.is_manager() && !task.is_assigned_to(&actor.id) {
        return Err(EngineError::NotAuthorized);
    }

    match to {
        TaskStatus::Todo | TaskStatus::InProgress => Ok(()),
        TaskStatus::OnHold => match ctx.hold_reason {
            Some(reason) if !reason.trim().is_empty() => Ok(()),
            _ => Err(EngineError::HoldReasonRequired),
        },
        TaskStatus::Done => {
            if task.kind.auto_completed() {
                return Err(EngineError::AutoCompletedKind);
            }
            if ctx.has_active_escalation {
                return Err(EngineError::EscalationActive(task.id.clone()));
            }
            Ok(())
        }
    }
}

/// Apply a validated transition, returning the updated task.
/// Callers must run [`can_transition`] first; `apply` itself stays
/// total so the automation engine can reuse it.
pub fn apply(
    task: &Task,
    to: TaskStatus,
    actor: &Viewer,
    ctx: &TransitionContext<'_>,
    now: DateTime<Utc>,
) -> Task {
    let mut updated = task.clone();
    updated.status = to;

    match to {
        TaskStatus::Done => updated.completed_at = Some(now),
        TaskStatus::OnHold => {
            if let Some(reason) = ctx.hold_reason {
                updated.add_note(TaskNote::new(actor.id.clone(), reason));
            }
        }
        _ => {}
    }

    updated
}

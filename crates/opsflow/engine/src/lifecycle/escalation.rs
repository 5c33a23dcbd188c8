//! Escalation lifecycle: PENDING ↔ RESPONDED → CLOSED
//!
//! A manager reply moves PENDING to RESPONDED; an agent reply pulls
//! any open thread back to PENDING. Only the raising agent may close,
//! and only once at least one reply exists. Creation lives on
//! [`Escalation::open`]; the linked task's escalated flag is the
//! caller's concern because it depends on sibling escalations.

use chrono::{DateTime, Utc};
use opsflow_types::{
    ActorId, EngineError, EngineResult, Escalation, EscalationMessage, EscalationStatus, Role,
};

/// Append a reply to an open escalation, returning the updated thread
pub fn reply(
    escalation: &Escalation,
    author: &ActorId,
    role: Role,
    text: impl Into<String>,
    now: DateTime<Utc>,
) -> EngineResult<Escalation> {
    if !escalation.is_active() {
        return Err(EngineError::EscalationClosed);
    }

    let mut updated = escalation.clone();
    updated
        .history
        .push(EscalationMessage::new(author.clone(), role, text));
    updated.status = match role {
        Role::Manager => EscalationStatus::Responded,
        Role::Agent => EscalationStatus::Pending,
    };
    updated.updated_at = now;
    Ok(updated)
}

/// Close an escalation. Permitted only for the raising agent and only
/// when the thread holds at least one reply.
pub fn close(
    escalation: &Escalation,
    actor: &ActorId,
    now: DateTime<Utc>,
) -> EngineResult<Escalation> {
    if !escalation.is_active() {
        return Err(EngineError::EscalationClosed);
    }
    if !escalation.raised_by(actor) {
        return Err(EngineError::NotAuthorized);
    }
    if !escalation.has_reply() {
        return Err(EngineError::ReplyRequired);
    }

    let mut updated = escalation.clone();
    updated.status = EscalationStatus::Closed;
    updated.updated_at = now;
    Ok(updated)
}

//! Notification dispatcher: classified deltas → per-viewer messages
//!
//! Each delta is tested against the audience rules for the current
//! viewer; a handful of events additionally forward a plain-text alert
//! to the external channel. Baseline cycles emit nothing at all — the
//! initial load must not read as a wall of news.

use crate::ChangeSet;
use opsflow_types::{Escalation, Invoice, InvoiceStatus, Notification, Role, Task, Viewer};

/// Evaluate every delta for one viewer, producing notifications and
/// outbound alert-channel messages
pub fn dispatch(changes: &ChangeSet, viewer: &Viewer) -> (Vec<Notification>, Vec<String>) {
    let mut notifications = Vec::new();
    let mut alerts = Vec::new();

    if changes.is_baseline() {
        return (notifications, alerts);
    }

    for task in &changes.tasks.created {
        if task_audience(task, viewer) {
            notifications.push(Notification::new(
                "New task",
                format!("Task '{}' was created", task.title),
            ));
        }
    }

    for (before, after) in &changes.tasks.updated {
        if before.status != after.status && task_audience(after, viewer) {
            notifications.push(Notification::new(
                "Task updated",
                format!("Task '{}' moved to {}", after.title, after.status),
            ));
        }
    }

    for invoice in &changes.invoices.created {
        if invoice_audience(invoice, viewer) {
            notifications.push(Notification::new(
                "New invoice",
                format!("Invoice '{}' was created", invoice.reference_name),
            ));
        }
    }

    for (before, after) in &changes.invoices.updated {
        if before.status == after.status {
            continue;
        }
        if after.status == InvoiceStatus::Completed && before.status != InvoiceStatus::Completed {
            // Completion is manager-only and always alerts the channel
            if viewer.is_manager() {
                notifications.push(Notification::new(
                    "Invoice completed",
                    format!("Invoice '{}' is ready for upload review", after.reference_name),
                ));
            }
            alerts.push(format!(
                "Invoice '{}' completed and awaits upload confirmation",
                after.reference_name
            ));
        } else if invoice_audience(after, viewer) {
            notifications.push(Notification::new(
                "Invoice updated",
                format!(
                    "Invoice '{}' moved to {}",
                    after.reference_name, after.status
                ),
            ));
        }
    }

    for escalation in &changes.escalations.created {
        if escalation_audience(escalation, viewer) {
            notifications.push(Notification::new(
                "Escalation raised",
                format!("An escalation was raised on task {}", escalation.task_id),
            ));
        }
        let raised_by_agent = escalation
            .history
            .first()
            .map(|m| m.role == Role::Agent)
            .unwrap_or(false);
        if raised_by_agent {
            alerts.push(format!(
                "Escalation raised on task {} by {}",
                escalation.task_id, escalation.agent_id
            ));
        }
    }

    for (before, after) in &changes.escalations.updated {
        if before.status != after.status && escalation_audience(after, viewer) {
            notifications.push(Notification::new(
                "Escalation updated",
                format!(
                    "The escalation on task {} moved to {}",
                    after.task_id, after.status
                ),
            ));
        }

        if after.history.len() > before.history.len() {
            let authored_by_viewer = after
                .last_message()
                .map(|m| viewer.is(&m.author_id))
                .unwrap_or(false);
            if !authored_by_viewer && escalation_audience(after, viewer) {
                notifications.push(Notification::new(
                    "New escalation message",
                    format!("New message on the escalation for task {}", after.task_id),
                ));
            }
        }
    }

    (notifications, alerts)
}

/// Task traffic goes to the assignee and to managers
fn task_audience(task: &Task, viewer: &Viewer) -> bool {
    viewer.is_manager() || task.is_assigned_to(&viewer.id)
}

/// Invoice traffic goes to the assignee and to managers
fn invoice_audience(invoice: &Invoice, viewer: &Viewer) -> bool {
    viewer.is_manager() || invoice.assignee_id.as_ref() == Some(&viewer.id)
}

/// Escalation traffic goes to managers and the raising agent
fn escalation_audience(escalation: &Escalation, viewer: &Viewer) -> bool {
    viewer.is_manager() || viewer.is(&escalation.agent_id)
}

//! Automation rule engine: cross-entity cascades and auto-completion
//!
//! Evaluated every cycle between delta detection and notification
//! dispatch. Every rule is a guarded, idempotent emission: cascade
//! writes are keyed by deterministic ids, and a rule whose guard is
//! not satisfied simply waits for a later cycle — rules never raise.
//!
//! The cascade-delete rule is not here: deletes arrive as explicit
//! commands, not snapshot deltas, so it lives on
//! [`crate::actions::delete_invoice`].

use crate::{ChangeSet, Command, Snapshot};
use chrono::{DateTime, Utc};
use opsflow_types::{ActorId, Invoice, InvoiceStatus, Task, TaskId, TaskKind, TaskStatus};

/// Static knobs for the automation rules
#[derive(Clone, Debug)]
pub struct AutomationConfig {
    /// The designated manager who receives review tasks
    pub manager_id: ActorId,
}

impl AutomationConfig {
    pub fn new(manager_id: impl Into<String>) -> Self {
        Self {
            manager_id: ActorId::new(manager_id),
        }
    }
}

/// Run every automation rule for one cycle
pub fn evaluate(
    changes: &ChangeSet,
    snapshot: &Snapshot,
    config: &AutomationConfig,
    now: DateTime<Utc>,
) -> Vec<Command> {
    let mut commands = Vec::new();

    auto_complete(snapshot, now, &mut commands);

    for invoice in &changes.invoices.created {
        companion_for_created(invoice, snapshot, &mut commands);
    }

    for (before, after) in &changes.invoices.updated {
        sync_companion(after, snapshot, now, &mut commands);
        review_task_on_completed_edge(before, after, snapshot, config, &mut commands);
        finish_review_on_uploaded_edge(before, after, snapshot, now, &mut commands);
    }

    commands
}

/// Auto-completion: a task whose entire linked item set
/// satisfies the completion predicate for its kind goes to DONE,
/// unless an active escalation blocks it.
fn auto_complete(snapshot: &Snapshot, now: DateTime<Utc>, commands: &mut Vec<Command>) {
    let mut ids: Vec<&TaskId> = snapshot.tasks.keys().collect();
    ids.sort();

    for id in ids {
        let task = &snapshot.tasks[id];
        if task.is_done() || task.inventory_item_ids.is_empty() {
            continue;
        }
        let Some(file_id) = &task.inventory_file_id else {
            continue;
        };
        // A missing file or an empty resolution defers the rule, it
        // never errors
        let Some(file) = snapshot.inventory.get(file_id) else {
            continue;
        };
        let items: Vec<_> = file
            .data
            .iter()
            .filter(|item| task.inventory_item_ids.contains(&item.id))
            .collect();
        if items.is_empty() {
            continue;
        }

        if snapshot.has_active_escalation(&task.id) {
            continue;
        }

        if items.iter().all(|item| item.status.satisfies(task.kind)) {
            let mut done = task.clone();
            done.status = TaskStatus::Done;
            done.completed_at = Some(now);
            commands.push(Command::UpdateTask(done));
        }
    }
}

/// Invoice→task cascade: every new invoice gets a companion
/// processing task under its deterministic id. The existence guard
/// makes baseline replays no-ops.
fn companion_for_created(invoice: &Invoice, snapshot: &Snapshot, commands: &mut Vec<Command>) {
    let companion_id = TaskId::invoice_companion(&invoice.id);
    if snapshot.tasks.contains_key(&companion_id) {
        return;
    }
    commands.push(Command::CreateTask(companion_task(companion_id, invoice)));
}

/// Build the companion task mirroring the invoice's metadata
pub fn companion_task(id: TaskId, invoice: &Invoice) -> Task {
    let mut task = Task::new(
        id,
        format!("Process invoice {}", invoice.reference_name),
        TaskKind::InvoiceProcessing,
    );
    task.assignee_id = invoice.assignee_id.clone();
    task.due_date = invoice.due_date;
    task.attachments = invoice.attachments.clone();
    task
}

/// Invoice→task sync: assignee and due date flow one way into
/// the companion; a processed invoice forces the companion to DONE.
/// Emits nothing when the companion is already in sync.
fn sync_companion(
    invoice: &Invoice,
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    commands: &mut Vec<Command>,
) {
    let companion_id = TaskId::invoice_companion(&invoice.id);
    let Some(companion) = snapshot.tasks.get(&companion_id) else {
        return;
    };

    let mut synced = companion.clone();
    synced.assignee_id = invoice.assignee_id.clone();
    synced.due_date = invoice.due_date;
    if invoice.is_processed() && !synced.is_done() {
        synced.status = TaskStatus::Done;
        synced.completed_at = Some(now);
    }

    if &synced != companion {
        commands.push(Command::UpdateTask(synced));
    }
}

/// Manager review task, edge-triggered: created exactly once,
/// on the transition into COMPLETED, never on the level.
fn review_task_on_completed_edge(
    before: &Invoice,
    after: &Invoice,
    snapshot: &Snapshot,
    config: &AutomationConfig,
    commands: &mut Vec<Command>,
) {
    if before.status == InvoiceStatus::Completed || after.status != InvoiceStatus::Completed {
        return;
    }
    let review_id = TaskId::manager_review(&after.id);
    if snapshot.tasks.contains_key(&review_id) {
        return;
    }

    let mut task = Task::new(
        review_id,
        format!("Review invoice {}", after.reference_name),
        TaskKind::InvoiceProcessing,
    );
    task.assignee_id = Some(config.manager_id.clone());
    task.due_date = after.due_date;
    commands.push(Command::CreateTask(task));
}

/// Upload confirmation: the review task finishes when the
/// invoice transitions to UPLOADED.
fn finish_review_on_uploaded_edge(
    before: &Invoice,
    after: &Invoice,
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    commands: &mut Vec<Command>,
) {
    if before.status == InvoiceStatus::Uploaded || after.status != InvoiceStatus::Uploaded {
        return;
    }
    let review_id = TaskId::manager_review(&after.id);
    let Some(review) = snapshot.tasks.get(&review_id) else {
        return;
    };
    if review.is_done() {
        return;
    }

    let mut done = review.clone();
    done.status = TaskStatus::Done;
    done.completed_at = Some(now);
    commands.push(Command::UpdateTask(done));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CycleKind;
    use opsflow_types::{
        Escalation, InventoryFile, InventoryItem, InventoryItemStatus, InvoiceId,
    };

    fn config() -> AutomationConfig {
        AutomationConfig::new("mgr-1")
    }

    fn qa_task(id: &str, items: &[&str]) -> Task {
        Task::new(TaskId::new(id), format!("QA {id}"), TaskKind::Qa)
            .with_status(TaskStatus::InProgress)
            .with_inventory(
                opsflow_types::InventoryFileId::new("file-1"),
                items.iter().map(|i| opsflow_types::InventoryItemId::new(*i)),
            )
    }

    fn inventory(statuses: &[(&str, InventoryItemStatus)]) -> InventoryFile {
        InventoryFile::new(
            "file-1",
            statuses
                .iter()
                .map(|(id, status)| InventoryItem::new(*id, *status))
                .collect(),
        )
    }

    fn run(changes: &ChangeSet, snapshot: &Snapshot) -> Vec<Command> {
        evaluate(changes, snapshot, &config(), Utc::now())
    }

    fn no_changes(snapshot: &Snapshot) -> ChangeSet {
        ChangeSet::between(CycleKind::Incremental, snapshot, snapshot)
    }

    #[test]
    fn test_auto_complete_finishes_qa_task() {
        let snapshot = Snapshot::new()
            .with_task(qa_task("t1", &["i1", "i2"]))
            .with_inventory_file(inventory(&[
                ("i1", InventoryItemStatus::QaComplete),
                ("i2", InventoryItemStatus::QaComplete),
            ]));

        let commands = run(&no_changes(&snapshot), &snapshot);
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            Command::UpdateTask(task) => {
                assert_eq!(task.id, TaskId::new("t1"));
                assert_eq!(task.status, TaskStatus::Done);
                assert!(task.completed_at.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_auto_complete_qa_needs_qa_complete() {
        let snapshot = Snapshot::new()
            .with_task(qa_task("t1", &["i1"]))
            .with_inventory_file(inventory(&[("i1", InventoryItemStatus::Augmented)]));
        assert!(run(&no_changes(&snapshot), &snapshot).is_empty());
    }

    #[test]
    fn test_auto_complete_augmenting_accepts_qa_complete() {
        let mut task = qa_task("t1", &["i1", "i2"]);
        task.kind = TaskKind::Augmenting;
        let snapshot = Snapshot::new().with_task(task).with_inventory_file(inventory(&[
            ("i1", InventoryItemStatus::Augmented),
            ("i2", InventoryItemStatus::QaComplete),
        ]));

        let commands = run(&no_changes(&snapshot), &snapshot);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn test_auto_complete_blocked_by_active_escalation() {
        let snapshot = Snapshot::new()
            .with_task(qa_task("t1", &["i1"]))
            .with_inventory_file(inventory(&[("i1", InventoryItemStatus::QaComplete)]))
            .with_escalation(Escalation::open(
                TaskId::new("t1"),
                ActorId::new("agent-1"),
                "item looks wrong",
            ));

        assert!(run(&no_changes(&snapshot), &snapshot).is_empty());
    }

    #[test]
    fn test_auto_complete_ignores_closed_escalation() {
        let mut esc = Escalation::open(TaskId::new("t1"), ActorId::new("agent-1"), "was wrong");
        esc.status = opsflow_types::EscalationStatus::Closed;
        let snapshot = Snapshot::new()
            .with_task(qa_task("t1", &["i1"]))
            .with_inventory_file(inventory(&[("i1", InventoryItemStatus::QaComplete)]))
            .with_escalation(esc);

        assert_eq!(run(&no_changes(&snapshot), &snapshot).len(), 1);
    }

    #[test]
    fn test_auto_complete_skips_unresolvable_items() {
        // Item ids that resolve to nothing in the file defer the rule
        let snapshot = Snapshot::new()
            .with_task(qa_task("t1", &["missing-1", "missing-2"]))
            .with_inventory_file(inventory(&[("i1", InventoryItemStatus::QaComplete)]));
        assert!(run(&no_changes(&snapshot), &snapshot).is_empty());
    }

    #[test]
    fn test_auto_complete_skips_missing_file() {
        let snapshot = Snapshot::new().with_task(qa_task("t1", &["i1"]));
        assert!(run(&no_changes(&snapshot), &snapshot).is_empty());
    }

    #[test]
    fn test_auto_complete_skips_done_tasks() {
        let mut task = qa_task("t1", &["i1"]);
        task.status = TaskStatus::Done;
        let snapshot = Snapshot::new()
            .with_task(task)
            .with_inventory_file(inventory(&[("i1", InventoryItemStatus::QaComplete)]));
        assert!(run(&no_changes(&snapshot), &snapshot).is_empty());
    }

    #[test]
    fn test_new_invoice_gets_companion() {
        let invoice = Invoice::new(InvoiceId::new("inv1"), "ACME March")
            .with_assignee(ActorId::new("agent-1"));
        let previous = Snapshot::new();
        let current = Snapshot::new().with_invoice(invoice);
        let changes = ChangeSet::between(CycleKind::Incremental, &previous, &current);

        let commands = run(&changes, &current);
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            Command::CreateTask(task) => {
                assert_eq!(task.id, TaskId::new("task-inv-inv1"));
                assert_eq!(task.kind, TaskKind::InvoiceProcessing);
                assert_eq!(task.assignee_id, Some(ActorId::new("agent-1")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_existing_companion_not_recreated() {
        let invoice = Invoice::new(InvoiceId::new("inv1"), "ACME");
        let companion = companion_task(TaskId::invoice_companion(&invoice.id), &invoice);
        let previous = Snapshot::new();
        let current = Snapshot::new().with_invoice(invoice).with_task(companion);
        let changes = ChangeSet::between(CycleKind::Incremental, &previous, &current);

        assert!(run(&changes, &current).is_empty());
    }

    #[test]
    fn test_companion_syncs_assignee_and_due_date() {
        let invoice = Invoice::new(InvoiceId::new("inv1"), "ACME");
        let companion = companion_task(TaskId::invoice_companion(&invoice.id), &invoice);
        let moved = invoice
            .clone()
            .with_status(InvoiceStatus::Assigned)
            .with_assignee(ActorId::new("agent-2"))
            .with_due_date(Utc::now());

        let previous = Snapshot::new().with_invoice(invoice).with_task(companion.clone());
        let current = Snapshot::new().with_invoice(moved.clone()).with_task(companion);
        let changes = ChangeSet::between(CycleKind::Incremental, &previous, &current);

        let commands = run(&changes, &current);
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            Command::UpdateTask(task) => {
                assert_eq!(task.assignee_id, Some(ActorId::new("agent-2")));
                assert_eq!(task.due_date, moved.due_date);
                assert_ne!(task.status, TaskStatus::Done);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_processed_invoice_forces_companion_done() {
        let before = Invoice::new(InvoiceId::new("inv1"), "ACME").with_status(InvoiceStatus::Assigned);
        let companion = companion_task(TaskId::invoice_companion(&before.id), &before);
        let after = before.clone().with_status(InvoiceStatus::Completed);

        let previous = Snapshot::new().with_invoice(before).with_task(companion.clone());
        let current = Snapshot::new().with_invoice(after).with_task(companion);
        let changes = ChangeSet::between(CycleKind::Incremental, &previous, &current);

        let commands = run(&changes, &current);
        let companion_update = commands.iter().find_map(|cmd| match cmd {
            Command::UpdateTask(task) if task.id == TaskId::new("task-inv-inv1") => Some(task),
            _ => None,
        });
        assert_eq!(companion_update.unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn test_review_task_on_completed_edge() {
        let before = Invoice::new(InvoiceId::new("inv1"), "ACME").with_status(InvoiceStatus::Assigned);
        let after = before.clone().with_status(InvoiceStatus::Completed);

        let previous = Snapshot::new().with_invoice(before);
        let current = Snapshot::new().with_invoice(after);
        let changes = ChangeSet::between(CycleKind::Incremental, &previous, &current);

        let commands = run(&changes, &current);
        let review = commands.iter().find_map(|cmd| match cmd {
            Command::CreateTask(task) if task.id == TaskId::new("task-mgr-inv1") => Some(task),
            _ => None,
        });
        let review = review.expect("review task created");
        assert_eq!(review.assignee_id, Some(ActorId::new("mgr-1")));
    }

    #[test]
    fn test_review_task_not_on_completed_level() {
        // Invoice stays COMPLETED while its due date shifts: a material
        // update, but not the edge
        let before = Invoice::new(InvoiceId::new("inv1"), "ACME").with_status(InvoiceStatus::Completed);
        let after = before.clone().with_due_date(Utc::now());

        let previous = Snapshot::new().with_invoice(before);
        let current = Snapshot::new().with_invoice(after);
        let changes = ChangeSet::between(CycleKind::Incremental, &previous, &current);

        let commands = run(&changes, &current);
        assert!(!commands
            .iter()
            .any(|cmd| matches!(cmd, Command::CreateTask(t) if t.id == TaskId::new("task-mgr-inv1"))));
    }

    #[test]
    fn test_existing_review_task_not_recreated() {
        let before = Invoice::new(InvoiceId::new("inv1"), "ACME").with_status(InvoiceStatus::Assigned);
        let after = before.clone().with_status(InvoiceStatus::Completed);
        let review = Task::new(
            TaskId::manager_review(&after.id),
            "Review invoice ACME",
            TaskKind::InvoiceProcessing,
        );

        let previous = Snapshot::new().with_invoice(before).with_task(review.clone());
        let current = Snapshot::new().with_invoice(after).with_task(review);
        let changes = ChangeSet::between(CycleKind::Incremental, &previous, &current);

        let commands = run(&changes, &current);
        assert!(!commands.iter().any(|cmd| matches!(cmd, Command::CreateTask(_))));
    }

    #[test]
    fn test_upload_finishes_review_task() {
        let before = Invoice::new(InvoiceId::new("inv1"), "ACME").with_status(InvoiceStatus::Completed);
        let after = before.clone().with_status(InvoiceStatus::Uploaded);
        let review = Task::new(
            TaskId::manager_review(&after.id),
            "Review invoice ACME",
            TaskKind::InvoiceProcessing,
        );

        let previous = Snapshot::new().with_invoice(before).with_task(review.clone());
        let current = Snapshot::new().with_invoice(after).with_task(review);
        let changes = ChangeSet::between(CycleKind::Incremental, &previous, &current);

        let commands = run(&changes, &current);
        let review_update = commands.iter().find_map(|cmd| match cmd {
            Command::UpdateTask(task) if task.id == TaskId::new("task-mgr-inv1") => Some(task),
            _ => None,
        });
        assert_eq!(review_update.unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn test_steady_state_emits_nothing() {
        // A fully settled snapshot re-fed to the engine produces zero
        // writes
        let invoice = Invoice::new(InvoiceId::new("inv1"), "ACME").with_status(InvoiceStatus::Assigned);
        let companion = companion_task(TaskId::invoice_companion(&invoice.id), &invoice);
        let snapshot = Snapshot::new().with_invoice(invoice).with_task(companion);

        assert!(run(&no_changes(&snapshot), &snapshot).is_empty());
    }
}

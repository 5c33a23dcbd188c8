//! Snapshot store: the previous/current collection pair
//!
//! One engine instance owns exactly one [`SnapshotStore`]. Snapshots
//! are immutable once captured; `begin_cycle` replaces them, never
//! mutates them in place.

use opsflow_types::{
    Escalation, EscalationId, InventoryFile, InventoryFileId, Invoice, InvoiceId, Task, TaskId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a cycle seeds state or diffs against real history
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleKind {
    /// First non-empty snapshot: rules run, notifications are
    /// suppressed so the initial load does not flood every viewer
    Baseline,
    /// Normal cycle diffed against a non-empty previous snapshot
    Incremental,
}

impl CycleKind {
    pub fn is_baseline(&self) -> bool {
        matches!(self, Self::Baseline)
    }
}

/// The id-indexed collections captured at the start of a cycle
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tasks: HashMap<TaskId, Task>,
    pub invoices: HashMap<InvoiceId, Invoice>,
    pub escalations: HashMap<EscalationId, Escalation>,
    /// Read-only inventory, owned by the ingestion collaborator
    pub inventory: HashMap<InventoryFileId, InventoryFile>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from full-replace collections as pushed by the
    /// storage collaborator
    pub fn from_collections(
        tasks: impl IntoIterator<Item = Task>,
        invoices: impl IntoIterator<Item = Invoice>,
        escalations: impl IntoIterator<Item = Escalation>,
        inventory: impl IntoIterator<Item = InventoryFile>,
    ) -> Self {
        Self {
            tasks: tasks.into_iter().map(|t| (t.id.clone(), t)).collect(),
            invoices: invoices.into_iter().map(|i| (i.id.clone(), i)).collect(),
            escalations: escalations.into_iter().map(|e| (e.id.clone(), e)).collect(),
            inventory: inventory.into_iter().map(|f| (f.id.clone(), f)).collect(),
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.insert(task.id.clone(), task);
        self
    }

    pub fn with_invoice(mut self, invoice: Invoice) -> Self {
        self.invoices.insert(invoice.id.clone(), invoice);
        self
    }

    pub fn with_escalation(mut self, escalation: Escalation) -> Self {
        self.escalations.insert(escalation.id.clone(), escalation);
        self
    }

    pub fn with_inventory_file(mut self, file: InventoryFile) -> Self {
        self.inventory.insert(file.id.clone(), file);
        self
    }

    /// Empty means no workflow entities. Inventory does not count: a
    /// file upload with no tasks yet is still a cold start.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.invoices.is_empty() && self.escalations.is_empty()
    }

    /// All non-CLOSED escalations referencing the given task
    pub fn active_escalations_for(&self, task_id: &TaskId) -> Vec<&Escalation> {
        self.escalations
            .values()
            .filter(|e| &e.task_id == task_id && e.is_active())
            .collect()
    }

    /// Check whether any non-CLOSED escalation references the task
    pub fn has_active_escalation(&self, task_id: &TaskId) -> bool {
        self.escalations
            .values()
            .any(|e| &e.task_id == task_id && e.is_active())
    }
}

/// Owns the previous and current snapshot for one engine instance
#[derive(Clone, Debug, Default)]
pub struct SnapshotStore {
    previous: Snapshot,
    current: Snapshot,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a cycle: the prior current becomes the new previous and
    /// the freshly supplied collections become current. Returns
    /// [`CycleKind::Baseline`] when real state first appears against an
    /// empty previous.
    pub fn begin_cycle(&mut self, incoming: Snapshot) -> CycleKind {
        self.previous = std::mem::replace(&mut self.current, incoming);

        if self.previous.is_empty() && !self.current.is_empty() {
            CycleKind::Baseline
        } else {
            CycleKind::Incremental
        }
    }

    pub fn previous(&self) -> &Snapshot {
        &self.previous
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsflow_types::{ActorId, TaskKind};

    fn make_task(id: &str) -> Task {
        Task::new(TaskId::new(id), format!("Task {id}"), TaskKind::Check404)
    }

    #[test]
    fn test_first_nonempty_cycle_is_baseline() {
        let mut store = SnapshotStore::new();
        let kind = store.begin_cycle(Snapshot::new().with_task(make_task("t1")));
        assert_eq!(kind, CycleKind::Baseline);
    }

    #[test]
    fn test_second_cycle_is_incremental() {
        let mut store = SnapshotStore::new();
        store.begin_cycle(Snapshot::new().with_task(make_task("t1")));
        let kind = store.begin_cycle(Snapshot::new().with_task(make_task("t1")));
        assert_eq!(kind, CycleKind::Incremental);
    }

    #[test]
    fn test_empty_first_push_defers_baseline() {
        let mut store = SnapshotStore::new();
        assert_eq!(store.begin_cycle(Snapshot::new()), CycleKind::Incremental);
        // Data arriving later is still a cold start
        let kind = store.begin_cycle(Snapshot::new().with_task(make_task("t1")));
        assert_eq!(kind, CycleKind::Baseline);
    }

    #[test]
    fn test_begin_cycle_rotates_snapshots() {
        let mut store = SnapshotStore::new();
        let first = Snapshot::new().with_task(make_task("t1"));
        let second = Snapshot::new()
            .with_task(make_task("t1"))
            .with_task(make_task("t2"));

        store.begin_cycle(first.clone());
        store.begin_cycle(second.clone());

        assert_eq!(store.previous(), &first);
        assert_eq!(store.current(), &second);
    }

    #[test]
    fn test_active_escalation_lookup() {
        let task = make_task("t1");
        let esc = Escalation::open(task.id.clone(), ActorId::new("agent-1"), "stuck");
        let snapshot = Snapshot::new().with_task(task).with_escalation(esc.clone());

        assert!(snapshot.has_active_escalation(&TaskId::new("t1")));
        assert!(!snapshot.has_active_escalation(&TaskId::new("t2")));
        assert_eq!(snapshot.active_escalations_for(&TaskId::new("t1")).len(), 1);

        let mut closed = esc;
        closed.status = opsflow_types::EscalationStatus::Closed;
        let snapshot = Snapshot::new().with_escalation(closed);
        assert!(!snapshot.has_active_escalation(&TaskId::new("t1")));
    }

    #[test]
    fn test_inventory_does_not_count_toward_empty() {
        let snapshot =
            Snapshot::new().with_inventory_file(InventoryFile::new("file-1", Vec::new()));
        assert!(snapshot.is_empty());
    }
}

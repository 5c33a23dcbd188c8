//! Delta detector: classifies per-entity changes between snapshots
//!
//! Works on the id-indexed maps of two snapshots in O(n+m). What
//! counts as "materially changed" is field-specific per entity kind;
//! field churn outside those sets lands in `unchanged` and produces no
//! downstream traffic.

use crate::{CycleKind, Snapshot};
use opsflow_types::{Escalation, Invoice, Task};
use std::collections::HashMap;
use std::hash::Hash;

/// Per-kind classification of one cycle's entities
#[derive(Clone, Debug)]
pub struct DeltaSet<T> {
    /// Present now, absent before
    pub created: Vec<T>,
    /// Present in both with a materially changed field set, as
    /// (before, after) pairs
    pub updated: Vec<(T, T)>,
    /// Present in both, no material change
    pub unchanged: Vec<T>,
}

impl<T> Default for DeltaSet<T> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            updated: Vec::new(),
            unchanged: Vec::new(),
        }
    }
}

/// Diff two id-indexed maps. Output is ordered by id so downstream
/// commands and notifications are deterministic.
fn diff<K, T>(
    previous: &HashMap<K, T>,
    current: &HashMap<K, T>,
    changed: impl Fn(&T, &T) -> bool,
) -> DeltaSet<T>
where
    K: Eq + Hash + Ord,
    T: Clone,
{
    let mut keys: Vec<&K> = current.keys().collect();
    keys.sort();

    let mut set = DeltaSet::default();
    for key in keys {
        let entity = &current[key];
        match previous.get(key) {
            None => set.created.push(entity.clone()),
            Some(before) if changed(before, entity) => {
                set.updated.push((before.clone(), entity.clone()));
            }
            Some(_) => set.unchanged.push(entity.clone()),
        }
    }
    set
}

/// A task materially changed if its status or assignee moved
fn task_changed(before: &Task, after: &Task) -> bool {
    before.status != after.status || before.assignee_id != after.assignee_id
}

/// An escalation materially changed if its status moved or its
/// thread grew
fn escalation_changed(before: &Escalation, after: &Escalation) -> bool {
    before.status != after.status || before.history.len() != after.history.len()
}

/// An invoice materially changed if its status moved, or its assignee
/// or due date moved (the companion-task sync rule observes those)
fn invoice_changed(before: &Invoice, after: &Invoice) -> bool {
    before.status != after.status
        || before.assignee_id != after.assignee_id
        || before.due_date != after.due_date
}

/// All classified deltas for one reconciliation cycle
#[derive(Clone, Debug)]
pub struct ChangeSet {
    /// Baseline or incremental — baseline suppresses notifications
    /// downstream while automation rules still run
    pub kind: CycleKind,
    pub tasks: DeltaSet<Task>,
    pub invoices: DeltaSet<Invoice>,
    pub escalations: DeltaSet<Escalation>,
}

impl ChangeSet {
    /// Classify every entity kind between two snapshots
    pub fn between(kind: CycleKind, previous: &Snapshot, current: &Snapshot) -> Self {
        Self {
            kind,
            tasks: diff(&previous.tasks, &current.tasks, task_changed),
            invoices: diff(&previous.invoices, &current.invoices, invoice_changed),
            escalations: diff(&previous.escalations, &current.escalations, escalation_changed),
        }
    }

    pub fn is_baseline(&self) -> bool {
        self.kind.is_baseline()
    }
}

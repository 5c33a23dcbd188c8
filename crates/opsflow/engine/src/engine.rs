//! The reconciliation engine: one cycle per pushed snapshot
//!
//! [`ReconcileEngine::reconcile`] is the pure core — rotate snapshots,
//! classify deltas, evaluate rules, dispatch notifications — returning
//! everything as a [`CycleOutcome`]. [`ReconcileEngine::run_cycle`]
//! wraps it and forwards the outcome through the collaborator seams,
//! logging submit failures rather than surfacing them.

use crate::{
    notify, rules, AlertChannel, AutomationConfig, ChangeSet, Command, CommandSink, CycleKind,
    Snapshot, SnapshotStore,
};
use chrono::Utc;
use opsflow_types::{Notification, Viewer};
use tracing::{info, warn};

/// Everything one reconciliation cycle produced
#[derive(Clone, Debug)]
pub struct CycleOutcome {
    pub kind: CycleKind,
    /// Notifications addressed to the viewer the cycle ran for
    pub notifications: Vec<Notification>,
    /// Writes for the storage collaborator
    pub commands: Vec<Command>,
    /// Plain-text messages for the external alert channel
    pub alerts: Vec<String>,
}

/// Snapshot-driven automation engine
pub struct ReconcileEngine {
    store: SnapshotStore,
    config: AutomationConfig,
}

impl ReconcileEngine {
    pub fn new(config: AutomationConfig) -> Self {
        Self {
            store: SnapshotStore::new(),
            config,
        }
    }

    /// Run one cycle against freshly pushed collections. Pure apart
    /// from the snapshot rotation: all effects are returned, none
    /// performed.
    pub fn reconcile(&mut self, incoming: Snapshot, viewer: &Viewer) -> CycleOutcome {
        let kind = self.store.begin_cycle(incoming);
        let changes = ChangeSet::between(kind, self.store.previous(), self.store.current());

        let commands = rules::evaluate(&changes, self.store.current(), &self.config, Utc::now());
        let (notifications, alerts) = notify::dispatch(&changes, viewer);

        let cycle = if kind.is_baseline() { "baseline" } else { "incremental" };
        info!(
            cycle,
            tasks_created = changes.tasks.created.len(),
            tasks_updated = changes.tasks.updated.len(),
            invoices_created = changes.invoices.created.len(),
            invoices_updated = changes.invoices.updated.len(),
            escalations_created = changes.escalations.created.len(),
            escalations_updated = changes.escalations.updated.len(),
            commands = commands.len(),
            notifications = notifications.len(),
            "reconciliation cycle complete"
        );

        CycleOutcome {
            kind,
            notifications,
            commands,
            alerts,
        }
    }

    /// Reconcile and forward the outcome through the collaborator
    /// seams. Delivery is fire-and-forget: a rejected write is logged
    /// and the next snapshot reconciles the divergence.
    pub fn run_cycle(
        &mut self,
        incoming: Snapshot,
        viewer: &Viewer,
        sink: &mut dyn CommandSink,
        alerts: &mut dyn AlertChannel,
    ) -> CycleOutcome {
        let outcome = self.reconcile(incoming, viewer);

        for command in &outcome.commands {
            if let Err(error) = sink.submit(command.clone()) {
                warn!(kind = command.kind(), %error, "command submit failed");
            }
        }
        for message in &outcome.alerts {
            alerts.send(message);
        }
        outcome
    }

    pub fn current(&self) -> &Snapshot {
        self.store.current()
    }

    pub fn previous(&self) -> &Snapshot {
        self.store.previous()
    }
}

//! Opsflow Reconciliation Engine
//!
//! The engine runs one synchronous pass — a reconciliation cycle —
//! every time the storage collaborator pushes a fresh set of
//! collections. A cycle:
//!
//! 1. Swaps the new collections into the [`SnapshotStore`] (the prior
//!    current becomes the new previous).
//! 2. Classifies per-entity deltas between the two snapshots.
//! 3. Evaluates the automation rules against the deltas and the
//!    current snapshot, producing idempotent upsert/delete commands.
//! 4. Turns the deltas into notifications for the current viewer.
//!
//! # Design Principles
//!
//! 1. `reconcile` is deterministic: same snapshots, same viewer, same
//!    output. All effects flow through the [`CommandSink`] and
//!    [`AlertChannel`] seams, fire-and-forget.
//! 2. Rules never raise user-visible errors. An unsatisfied guard
//!    defers the rule to a later cycle.
//! 3. Cascade writes are keyed by deterministic ids, so re-running a
//!    rule against unchanged input produces no additional writes.
//! 4. The first non-empty snapshot is a baseline cycle: rules run,
//!    notifications stay silent.
//!
//! User-driven operations (transitions, escalation threads, invoice
//! confirmation, cascade deletes) live in [`actions`] and validate
//! through the pure [`lifecycle`] machines before emitting commands.

#![deny(unsafe_code)]

pub mod actions;
pub mod lifecycle;

mod command;
mod delta;
mod engine;
mod notify;
mod rules;
mod snapshot;

pub use command::*;
pub use delta::*;
pub use engine::*;
pub use notify::*;
pub use rules::*;
pub use snapshot::*;

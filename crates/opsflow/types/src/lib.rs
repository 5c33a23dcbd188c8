//! Domain types for the Opsflow workflow engine
//!
//! Opsflow moves units of work — tasks, invoices, escalations — through
//! fixed lifecycles. This crate holds the vocabulary those lifecycles
//! are written in: the entity records, their status enumerations, the
//! typed identifiers that link them, and the error type every
//! validation speaks.
//!
//! # Key Concepts
//!
//! - **Task**: a unit of work with a four-state lifecycle. Some task
//!   kinds are auto-completed by the engine when their linked inventory
//!   items finish; those kinds never reach DONE by hand.
//! - **Escalation**: an issue raised by an agent against a task, with
//!   an append-only message history. An open escalation blocks the
//!   task's automatic completion.
//! - **Invoice**: a billing record that owns up to two derived tasks
//!   with deterministic ids — a companion processing task and a
//!   manager-review task.
//! - **InventoryItem**: read-only input owned by the ingestion side;
//!   the engine only ever inspects item statuses.
//! - **Notification**: an ephemeral, per-viewer message generated from
//!   detected changes. Never persisted.
//!
//! # Design Principles
//!
//! 1. Statuses and roles are closed enums, matched exhaustively.
//!    There is no string-typed fallthrough.
//! 2. Cross-entity links are typed ids. A missing lookup is a loud
//!    `EngineError`, never an empty default.
//! 3. Everything here is pure data. Lifecycle validation and the
//!    automation rules live in `opsflow-engine`.

#![deny(unsafe_code)]

mod actor;
mod errors;
mod escalation;
mod ids;
mod inventory;
mod invoice;
mod notification;
mod task;

pub use actor::*;
pub use errors::*;
pub use escalation::*;
pub use ids::*;
pub use inventory::*;
pub use invoice::*;
pub use notification::*;
pub use task::*;

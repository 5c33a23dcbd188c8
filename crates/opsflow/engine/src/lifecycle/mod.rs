//! Lifecycle state machines: pure transition validation/application
//!
//! Each submodule is a pair of pure functions per entity kind —
//! validate a transition for an actor in context, and apply it to
//! produce the updated entity. No I/O, no side effects; callers decide
//! what to do with the result.

pub mod escalation;
pub mod invoice;
pub mod task;

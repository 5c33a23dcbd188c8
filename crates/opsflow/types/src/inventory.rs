//! Inventory items: read-only input to auto-completion
//!
//! Inventory files arrive from the ingestion side and are never
//! written by this engine. The only thing the engine asks of an item
//! is whether its status counts as finished for a given task kind.

use crate::{ActorId, InventoryFileId, InventoryItemId, TaskKind};
use serde::{Deserialize, Serialize};

/// Where an inventory item sits in the augmentation/QA pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InventoryItemStatus {
    /// Not yet picked up
    #[default]
    Pending,
    /// Handed to an augmentation task
    AssignedAugmentation,
    /// Augmentation finished
    Augmented,
    /// Handed to a QA task
    AssignedQa,
    /// QA finished
    QaComplete,
}

impl InventoryItemStatus {
    /// The auto-completion predicate: what counts as finished
    /// depends on the kind of task watching the item. QA tasks need
    /// QA_COMPLETE; augmentation tasks accept anything at or past
    /// AUGMENTED.
    pub fn satisfies(&self, kind: TaskKind) -> bool {
        match kind {
            TaskKind::Qa => matches!(self, Self::QaComplete),
            _ => matches!(self, Self::Augmented | Self::QaComplete),
        }
    }
}

/// A single unit of inventory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub status: InventoryItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<ActorId>,
}

impl InventoryItem {
    pub fn new(id: impl Into<String>, status: InventoryItemStatus) -> Self {
        Self {
            id: InventoryItemId::new(id),
            status,
            assignee_id: None,
        }
    }
}

/// An uploaded inventory file: an id and its items
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryFile {
    pub id: InventoryFileId,
    pub data: Vec<InventoryItem>,
}

impl InventoryFile {
    pub fn new(id: impl Into<String>, data: Vec<InventoryItem>) -> Self {
        Self {
            id: InventoryFileId::new(id),
            data,
        }
    }

    /// Find an item by id
    pub fn item(&self, id: &InventoryItemId) -> Option<&InventoryItem> {
        self.data.iter().find(|item| &item.id == id)
    }
}

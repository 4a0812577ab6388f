//! Services the authoring layer consumes from the host application.

use std::cell::RefCell;
use std::rc::Rc;

use kinema_animation_core::{GraphId, InstanceId, PropertyId, SlideId};

use crate::pending::PendingValueChange;
use crate::value::{DataType, PropertyValue};

/// Live property values and their types.
pub trait PropertySystem {
    fn instance_property_value(
        &self,
        instance: InstanceId,
        property: PropertyId,
    ) -> Option<PropertyValue>;

    fn data_type(&self, property: PropertyId) -> DataType;
}

/// Slide and time-graph queries.
pub trait SlideSystem {
    /// Slide whose tracks control `property` on `instance`.
    fn applicable_slide(&self, instance: InstanceId, property: PropertyId) -> Option<SlideId>;

    /// Time graph owning `instance`, with the instance's own slide.
    fn associated_graph(&self, instance: InstanceId) -> Option<(GraphId, SlideId)>;

    fn graph_active_slide(&self, graph: GraphId) -> Option<SlideId>;

    /// Current playhead of `slide`, in seconds.
    fn slide_time(&self, slide: SlideId) -> f32;
}

/// Receives staging commits so the host can undo and redo them.
pub trait TransactionSink {
    fn record(&mut self, change: PendingValueChange);
}

/// Drops every change.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullTransactionSink;

impl TransactionSink for NullTransactionSink {
    fn record(&mut self, _change: PendingValueChange) {}
}

/// Shared log of recorded changes. Clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct RecordingTransactionSink {
    changes: Rc<RefCell<Vec<PendingValueChange>>>,
}

impl RecordingTransactionSink {
    pub fn len(&self) -> usize {
        self.changes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.borrow().is_empty()
    }

    pub fn take(&self) -> Vec<PendingValueChange> {
        std::mem::take(&mut *self.changes.borrow_mut())
    }
}

impl TransactionSink for RecordingTransactionSink {
    fn record(&mut self, change: PendingValueChange) {
        self.changes.borrow_mut().push(change);
    }
}

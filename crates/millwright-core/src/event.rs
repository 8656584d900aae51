//! Typed graph notifications.
//!
//! The graph store records one [`GraphEvent`] per topology change, after the
//! change is fully applied, and the balancing pass records one
//! `ValuesUpdated` per update. Events accumulate in an [`EventQueue`] until
//! the embedder drains them; there are no registered callbacks.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventQueue::suppress`], which stops
//! them from being queued. Suppressed events are still counted.

use crate::id::*;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A graph notification.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeAdded {
        node: NodeId,
    },
    NodeDeleted {
        node: NodeId,
    },
    LinkAdded {
        link: LinkId,
        supplier: NodeId,
        consumer: NodeId,
        item: ItemId,
    },
    /// Carries the endpoints because the link id is dead by the time the
    /// event is observed.
    LinkDeleted {
        link: LinkId,
        supplier: NodeId,
        consumer: NodeId,
        item: ItemId,
    },
    /// Emitted after every update pass, even when nothing changed.
    ValuesUpdated,
}

/// Discriminant tag for event types, used for suppression and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NodeAdded,
    NodeDeleted,
    LinkAdded,
    LinkDeleted,
    ValuesUpdated,
}

const EVENT_KIND_COUNT: usize = 5;

impl GraphEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GraphEvent::NodeAdded { .. } => EventKind::NodeAdded,
            GraphEvent::NodeDeleted { .. } => EventKind::NodeDeleted,
            GraphEvent::LinkAdded { .. } => EventKind::LinkAdded,
            GraphEvent::LinkDeleted { .. } => EventKind::LinkDeleted,
            GraphEvent::ValuesUpdated => EventKind::ValuesUpdated,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventQueue
// ---------------------------------------------------------------------------

/// Pending notifications, in emission order.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    pending: Vec<GraphEvent>,
    suppressed: [bool; EVENT_KIND_COUNT],
    total_emitted: [u64; EVENT_KIND_COUNT],
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event unless its kind is suppressed.
    pub fn emit(&mut self, event: GraphEvent) {
        let idx = event.kind().index();
        self.total_emitted[idx] += 1;
        if !self.suppressed[idx] {
            self.pending.push(event);
        }
    }

    /// Stop queueing events of this kind. Already queued events of the kind
    /// are dropped.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.pending.retain(|e| e.kind() != kind);
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[GraphEvent] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Events of this kind ever emitted, including suppressed and drained ones.
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.total_emitted[kind.index()]
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

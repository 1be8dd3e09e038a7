//! Event queue between pollers and the render loop.
//!
//! An unbounded multi-producer, single-consumer FIFO. Producers hold cloned
//! [`EventSender`]s; the render loop owns the only [`EventReceiver`] and never
//! blocks on it. Ordering is FIFO per producer; no order is defined between
//! producers.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::core::events::StatusEvent;

/// Creates a connected sender/receiver pair.
pub fn event_queue() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

/// Producer side of the queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: UnboundedSender<StatusEvent>,
}

impl EventSender {
    /// Enqueues an event without blocking.
    ///
    /// Returns `false` if the consumer is gone; the event is discarded.
    pub fn push(&self, event: StatusEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Consumer side of the queue.
#[derive(Debug)]
pub struct EventReceiver {
    rx: UnboundedReceiver<StatusEvent>,
}

impl EventReceiver {
    /// Pops the oldest queued event, if any. Never blocks.
    pub fn try_pop(&mut self) -> Option<StatusEvent> {
        self.rx.try_recv().ok()
    }

    /// Pops every currently queued event.
    pub fn drain(&mut self) -> Vec<StatusEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_pop() {
            events.push(event);
        }
        events
    }

    /// Number of events waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Returns `true` once every sender has been dropped.
    pub fn producers_gone(&self) -> bool {
        self.rx.is_closed()
    }
}

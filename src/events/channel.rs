//! Progress transport between the engine and whichever UI is attached.
//!
//! The engine only ever holds an `EventSender`; whether anything
//! listens on the other end is the caller's business. Batch workers
//! clone the sender freely, so completion events can be emitted from
//! any thread in a pool.

use crossbeam_channel::{Receiver, Sender};

use super::Event;

/// Open an unbounded event channel.
///
/// The default for a run: events are small and a UI drains them faster
/// than workers produce them.
pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (EventSender { tx }, EventReceiver { rx })
}

/// Open a bounded event channel.
///
/// With a full buffer further events are dropped rather than blocking
/// a worker, so a stalled UI can at worst lose progress ticks.
pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (EventSender { tx }, EventReceiver { rx })
}

/// A sender with nobody listening, for headless runs and tests.
pub fn null_sender() -> EventSender {
    let (sender, _) = channel();
    sender
}

/// The engine's half of the channel.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Emit an event, never blocking the worker that emits it.
    ///
    /// A closed or full channel discards the event; progress reporting
    /// is strictly optional.
    pub fn send(&self, event: Event) {
        let _ = self.tx.try_send(event);
    }
}

/// The UI's half of the channel.
pub struct EventReceiver {
    rx: Receiver<Event>,
}

impl EventReceiver {
    /// Block for the next event; `None` once every sender is gone.
    pub fn recv(&self) -> Option<Event> {
        self.rx.recv().ok()
    }

    /// Poll for an event without blocking.
    pub fn try_recv(&self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Drain events until the channel closes.
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.rx.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BatchEvent, BatchKind, PipelineEvent};
    use std::thread;

    #[test]
    fn completion_events_cross_threads() {
        let (sender, receiver) = channel();

        let handle = thread::spawn(move || {
            sender.send(Event::Batch(BatchEvent::ItemCompleted {
                kind: BatchKind::Copy,
                completed: 7,
            }));
        });
        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Batch(BatchEvent::ItemCompleted { completed, .. }) => {
                assert_eq!(completed, 7)
            }
            _ => panic!("wrong event type"),
        }
    }

    #[test]
    fn null_sender_swallows_events() {
        let sender = null_sender();
        sender.send(Event::Pipeline(PipelineEvent::Started));
        sender.send(Event::Pipeline(PipelineEvent::Started));
    }

    #[test]
    fn full_bounded_channel_drops_instead_of_blocking() {
        let (sender, receiver) = bounded(1);

        sender.send(Event::Pipeline(PipelineEvent::Started));
        // Nothing drained yet, so this one is discarded
        sender.send(Event::Pipeline(PipelineEvent::Started));

        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn receiver_iter_ends_when_senders_drop() {
        let (sender, receiver) = channel();
        sender.send(Event::Pipeline(PipelineEvent::Started));
        drop(sender);

        assert_eq!(receiver.iter().count(), 1);
    }
}

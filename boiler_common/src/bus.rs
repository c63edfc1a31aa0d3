//! In-process message queue.
//!
//! Kept as a seam for wiring components through messages later; the control
//! path does not use it. Unbounded FIFO guarded by a `parking_lot` mutex, with
//! a condition variable for the blocking [`MessageBus::take`].

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;

/// A delivered message: source id, topic and opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sender id.
    pub source: String,
    pub topic: String,
    /// Opaque body.
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(source: impl Into<String>, topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            topic: topic.into(),
            payload,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Msg[from={},topic={},payload={} bytes]",
            self.source,
            self.topic,
            self.payload.len()
        )
    }
}

/// Unbounded multi-producer, multi-consumer message queue.
#[derive(Debug, Default)]
pub struct MessageBus {
    queue: Mutex<VecDeque<Message>>,
    available: Condvar,
}

impl MessageBus {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a message. Never blocks beyond the queue lock.
    pub fn publish(&self, message: Message) {
        self.queue.lock().push_back(message);
        self.available.notify_one();
    }

    /// Dequeue the oldest message, suspending until one is available.
    pub fn take(&self) -> Message {
        let mut queue = self.queue.lock();
        loop {
            if let Some(message) = queue.pop_front() {
                return message;
            }
            self.available.wait(&mut queue);
        }
    }

    /// Dequeue the oldest message if any. Never suspends.
    pub fn poll(&self) -> Option<Message> {
        self.queue.lock().pop_front()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

use glam::{DQuat, DVec3};

use crate::animation::command::CommandKind;
use crate::animation::ObjectHandle;

/// Notifications published by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEvent {
    /// A target state was applied to an object's transform.
    Changed {
        handle: ObjectHandle,
        coordinates: DVec3,
        position: DVec3,
        rotation: DQuat,
        scale: DVec3,
    },
    /// The object's clip playback started or stopped.
    PlayingChanged { handle: ObjectHandle, playing: bool },
    /// A queued command reached its expiration and was removed.
    CommandCompleted { handle: ObjectHandle, kind: CommandKind },
}

/// Fan-out of events to every live subscriber.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<flume::Sender<ObjectEvent>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new unbounded subscription.
    pub fn subscribe(&mut self) -> flume::Receiver<ObjectEvent> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Sends `event` to all subscribers, dropping those whose receiver is gone.
    pub fn emit(&mut self, event: &ObjectEvent) {
        if self.subscribers.is_empty() {
            return;
        }
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

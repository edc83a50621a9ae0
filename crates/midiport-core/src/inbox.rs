//! Inbound message buffer owned by a port.

use crate::message::MidiMessage;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Unbounded FIFO of received messages not yet handed to a caller.
///
/// Clone is cheap and shares the queue, so transports can push from their
/// own input threads. Depth is not limited.
#[derive(Clone, Default)]
pub struct Inbox {
    queue: Arc<Mutex<VecDeque<MidiMessage>>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: MidiMessage) {
        self.queue.lock().push_back(message);
    }

    pub fn pop(&self) -> Option<MidiMessage> {
        self.queue.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl std::fmt::Debug for Inbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inbox").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let inbox = Inbox::new();
        for note in 60..64 {
            inbox.push(MidiMessage::note_on(0, note, 100));
        }
        assert_eq!(inbox.len(), 4);

        for note in 60..64 {
            assert_eq!(inbox.pop(), Some(MidiMessage::note_on(0, note, 100)));
        }
        assert!(inbox.pop().is_none());
    }

    #[test]
    fn test_clones_share_queue() {
        let inbox = Inbox::new();
        let producer = inbox.clone();

        std::thread::spawn(move || producer.push(MidiMessage::all_sound_off(0)))
            .join()
            .unwrap();

        assert!(!inbox.is_empty());
        assert_eq!(inbox.pop(), Some(MidiMessage::all_sound_off(0)));
        assert!(inbox.is_empty());
    }
}

//! Handle-based routing of inbound messages to ports.
//!
//! Transports whose input arrives on a foreign thread (a driver callback or
//! a dispatcher loop) register the port's [`Inbox`] under a stable `u64`
//! handle at open and look it up when data arrives. Unregistration is the
//! transport's job in `close()`; messages for an unknown handle are dropped.

use crate::inbox::Inbox;
use crate::message::MidiMessage;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct InboundRouter {
    inboxes: Arc<DashMap<u64, Inbox>>,
    next_handle: Arc<AtomicU64>,
}

impl InboundRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle never handed out before by this router.
    pub fn register(&self, inbox: Inbox) -> u64 {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed) + 1;
        self.inboxes.insert(handle, inbox);
        tracing::debug!("Registered inbound handle {}", handle);
        handle
    }

    pub fn unregister(&self, handle: u64) -> bool {
        let removed = self.inboxes.remove(&handle).is_some();
        if removed {
            tracing::debug!("Unregistered inbound handle {}", handle);
        }
        removed
    }

    /// Returns false when the handle is not (or no longer) registered.
    pub fn route(&self, handle: u64, message: MidiMessage) -> bool {
        match self.inboxes.get(&handle) {
            Some(inbox) => {
                inbox.push(message);
                true
            }
            None => {
                tracing::debug!("Dropping message for unknown handle {}", handle);
                false
            }
        }
    }

    /// Decode raw bytes and route them. Undecodable input is dropped.
    pub fn route_bytes(&self, handle: u64, bytes: &[u8]) -> bool {
        match MidiMessage::from_bytes(bytes) {
            Ok(message) => self.route(handle, message),
            Err(e) => {
                tracing::debug!("Dropping undecodable input on handle {}: {}", handle, e);
                false
            }
        }
    }

    pub fn is_registered(&self, handle: u64) -> bool {
        self.inboxes.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.inboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inboxes.is_empty()
    }
}

impl std::fmt::Debug for InboundRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundRouter")
            .field("registered", &self.inboxes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_to_registered_inbox() {
        let router = InboundRouter::new();
        let inbox = Inbox::new();
        let handle = router.register(inbox.clone());

        assert!(router.route(handle, MidiMessage::note_on(0, 60, 100)));
        assert_eq!(inbox.pop(), Some(MidiMessage::note_on(0, 60, 100)));
    }

    #[test]
    fn test_handles_are_unique() {
        let router = InboundRouter::new();
        let a = router.register(Inbox::new());
        let b = router.register(Inbox::new());
        assert_ne!(a, b);

        router.unregister(a);
        let c = router.register(Inbox::new());
        assert_ne!(a, c);
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_unregistered_handle_drops() {
        let router = InboundRouter::new();
        let inbox = Inbox::new();
        let handle = router.register(inbox.clone());

        assert!(router.unregister(handle));
        assert!(!router.unregister(handle));
        assert!(!router.route(handle, MidiMessage::all_sound_off(0)));
        assert!(inbox.is_empty());
        assert!(router.is_empty());
    }

    #[test]
    fn test_route_bytes_decodes() {
        let router = InboundRouter::new();
        let inbox = Inbox::new();
        let handle = router.register(inbox.clone());

        assert!(router.route_bytes(handle, &[0x80, 60, 64]));
        assert!(!router.route_bytes(handle, &[]));
        assert_eq!(inbox.pop(), Some(MidiMessage::note_off(0, 60, 64)));
        assert!(inbox.is_empty());
    }
}

//! Contract every transport driver satisfies.

use crate::error::{Error, Result};
use crate::inbox::Inbox;
use crate::message::MidiMessage;
use crate::options::BackendParams;

/// Backend-specific I/O behind a [`Port`](super::Port).
///
/// The port serializes every call under its lock and guarantees `close()`
/// runs at most once, so implementations need neither internal locking
/// for these methods nor idempotent close.
pub trait Transport: Send {
    fn is_input(&self) -> bool;

    fn is_output(&self) -> bool;

    /// Name chosen by the transport during open, e.g. a default device.
    fn resolved_name(&self) -> Option<String> {
        None
    }

    /// Non-blocking receive attempt. Transports that push into the port's
    /// inbox from another thread can keep the default.
    fn poll(&mut self) -> Result<Option<MidiMessage>> {
        Ok(None)
    }

    /// Deliver one message synchronously.
    fn send(&mut self, message: MidiMessage) -> Result<()> {
        let _ = message;
        Err(Error::invalid_operation("transport does not support output"))
    }

    fn close(&mut self) -> Result<()>;
}

/// What a transport sees while it opens.
pub struct OpenContext<'a> {
    pub name: Option<&'a str>,
    pub params: &'a BackendParams,
    /// The port's inbound buffer; clone it to push from other threads.
    pub inbox: &'a Inbox,
}

//! The port contract and its implementations.
//!
//! [`MidiPort`] is the only interface callers need: [`Port`] implements it
//! over a single transport driver, [`MultiPort`] over a set of child ports.

mod base;
mod iter;
mod multi;
mod transport;

pub use base::Port;
pub use iter::{Messages, MidiPortExt, PendingMessages};
pub use multi::MultiPort;
pub use transport::{OpenContext, Transport};

use crate::error::Result;
use crate::message::MidiMessage;
use crate::utils::{panic_messages, reset_messages, DEFAULT_NUM_CHANNELS};

/// Uniform open/send/receive/close contract over any transport.
///
/// Ports are shared across threads; every method takes `&self`.
pub trait MidiPort: Send + Sync {
    fn name(&self) -> Option<&str>;

    fn is_input(&self) -> bool;

    fn is_output(&self) -> bool;

    fn is_closed(&self) -> bool;

    /// Send a copy of `message`.
    ///
    /// Fails with `InvalidOperation` on a closed or non-output port.
    fn send(&self, message: &MidiMessage) -> Result<()>;

    /// Return the next message.
    ///
    /// With `block == false`, returns `Ok(None)` when nothing is available.
    /// A blocking call on a closed port with nothing buffered, or on a port
    /// that closes while waiting, fails with `ClosedPort`.
    fn receive(&self, block: bool) -> Result<Option<MidiMessage>>;

    /// Idempotent.
    fn close(&self) -> Result<()>;

    /// Send "All Notes Off" and "Reset All Controllers" on every channel.
    fn reset(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        for message in reset_messages(DEFAULT_NUM_CHANNELS) {
            self.send(&message)?;
        }
        Ok(())
    }

    /// Send "All Sounds Off" on every channel.
    fn panic(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        for message in panic_messages(DEFAULT_NUM_CHANNELS) {
            self.send(&message)?;
        }
        Ok(())
    }
}

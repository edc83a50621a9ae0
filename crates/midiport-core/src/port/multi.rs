//! Fan-out/fan-in over a set of child ports.

use super::MidiPort;
use crate::error::{Error, Result};
use crate::message::MidiMessage;
use crate::poll::PollInterval;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const MULTI_PORT_NAME: &str = "multi";

/// Presents several ports as one.
///
/// Children are shared: they may be closed by their own owners at any time,
/// and closing the multiport leaves them open. Sends go to every open output
/// child. Receives sweep the open input children in a freshly shuffled order
/// on every poll iteration so no child is starved; no ordering holds across
/// children.
pub struct MultiPort {
    ports: RwLock<Vec<Arc<dyn MidiPort>>>,
    closed: AtomicBool,
}

impl MultiPort {
    pub fn new(ports: Vec<Arc<dyn MidiPort>>) -> Self {
        Self {
            ports: RwLock::new(ports),
            closed: AtomicBool::new(false),
        }
    }

    pub fn add_port(&self, port: Arc<dyn MidiPort>) {
        self.ports.write().push(port);
    }

    /// Remove a child by identity. Returns false if it was not a child.
    pub fn remove_port(&self, port: &Arc<dyn MidiPort>) -> bool {
        let mut ports = self.ports.write();
        let before = ports.len();
        ports.retain(|p| !Arc::ptr_eq(p, port));
        ports.len() != before
    }

    pub fn ports(&self) -> Vec<Arc<dyn MidiPort>> {
        self.ports.read().clone()
    }

    pub fn len(&self) -> usize {
        self.ports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.read().is_empty()
    }

    /// Like [`MidiPort::receive`], also naming the child the message came from.
    pub fn receive_with_port(
        &self,
        block: bool,
    ) -> Result<Option<(Arc<dyn MidiPort>, MidiMessage)>> {
        if !self.is_input() {
            return Err(Error::invalid_operation("not an input port"));
        }
        // A multiport has no buffer of its own, so closed means nothing left.
        if self.is_closed() {
            return if block {
                Err(Error::ClosedPort("receive() called on closed multiport".to_string()))
            } else {
                Ok(None)
            };
        }

        loop {
            // Children are visited from a snapshot; the child list lock is
            // never held across a child's receive.
            let mut ports = self.readable_ports();
            ports.shuffle(&mut rand::thread_rng());

            for port in &ports {
                if let Some(message) = port.receive(false)? {
                    return Ok(Some((port.clone(), message)));
                }
            }

            if !block {
                return Ok(None);
            }
            if self.is_closed() {
                return Err(Error::ClosedPort("multiport closed during receive()".to_string()));
            }
            if ports.is_empty() {
                return Err(Error::ClosedPort("all input ports are closed".to_string()));
            }

            PollInterval::global().sleep();
        }
    }

    /// One exhaustive non-blocking pass: drain everything every open input
    /// child has available right now.
    /// Empty once the multiport is closed.
    pub fn sweep(&self) -> Result<Vec<(Arc<dyn MidiPort>, MidiMessage)>> {
        if self.is_closed() {
            return Ok(Vec::new());
        }
        let mut ports = self.readable_ports();
        ports.shuffle(&mut rand::thread_rng());

        let mut received = Vec::new();
        for port in &ports {
            while let Some(message) = port.receive(false)? {
                received.push((port.clone(), message));
            }
        }
        Ok(received)
    }

    fn readable_ports(&self) -> Vec<Arc<dyn MidiPort>> {
        self.ports
            .read()
            .iter()
            .filter(|p| p.is_input() && !p.is_closed())
            .cloned()
            .collect()
    }
}

impl MidiPort for MultiPort {
    fn name(&self) -> Option<&str> {
        Some(MULTI_PORT_NAME)
    }

    fn is_input(&self) -> bool {
        self.ports.read().iter().any(|p| p.is_input())
    }

    fn is_output(&self) -> bool {
        self.ports.read().iter().any(|p| p.is_output())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Every open output child is attempted even if an earlier one fails;
    /// failures are collected into [`Error::FanOut`].
    fn send(&self, message: &MidiMessage) -> Result<()> {
        if !self.is_output() {
            return Err(Error::invalid_operation("not an output port"));
        }
        if self.is_closed() {
            return Err(Error::invalid_operation("send() called on closed port"));
        }

        let ports = self.ports();
        let mut attempted = 0;
        let mut failures = Vec::new();

        for port in ports.iter().filter(|p| p.is_output() && !p.is_closed()) {
            attempted += 1;
            if let Err(e) = port.send(message) {
                let name = port.name().unwrap_or("<unnamed>").to_string();
                tracing::debug!("Fan-out send to {} failed: {}", name, e);
                failures.push((name, e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::FanOut {
                attempted,
                failures,
            })
        }
    }

    fn receive(&self, block: bool) -> Result<Option<MidiMessage>> {
        Ok(self
            .receive_with_port(block)?
            .map(|(_, message)| message))
    }

    /// Marks the multiport closed. Children are left open.
    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl std::fmt::Debug for MultiPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiPort")
            .field("ports", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

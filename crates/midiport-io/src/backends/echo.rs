//! Loopback backend: every message sent on a port is received on it.

use crate::registry::BackendCandidate;
use midiport_core::{
    Backend, DeviceInfo, Inbox, MidiMessage, OpenContext, Port, PortOptions, Result, Transport,
};
use std::sync::Arc;

pub const ECHO_DEVICE: &str = "Echo";

#[derive(Debug, Default, Clone, Copy)]
pub struct EchoBackend;

impl Backend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        Ok(vec![DeviceInfo::new(ECHO_DEVICE, true, true)])
    }

    fn open_port(&self, options: PortOptions) -> Result<Port> {
        Port::open(options, EchoTransport::open)
    }
}

struct EchoTransport {
    inbox: Inbox,
}

impl EchoTransport {
    fn open(ctx: OpenContext<'_>) -> Result<Self> {
        Ok(Self {
            inbox: ctx.inbox.clone(),
        })
    }
}

impl Transport for EchoTransport {
    fn is_input(&self) -> bool {
        true
    }

    fn is_output(&self) -> bool {
        true
    }

    fn resolved_name(&self) -> Option<String> {
        Some(ECHO_DEVICE.to_string())
    }

    fn send(&mut self, message: MidiMessage) -> Result<()> {
        self.inbox.push(message);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

fn load() -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(EchoBackend))
}

inventory::submit! {
    BackendCandidate::new("echo", load)
}

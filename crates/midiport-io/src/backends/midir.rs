//! System MIDI devices via midir.
//!
//! A device is any port name midir reports for input, output or both. Input
//! arrives on midir's callback thread and is routed into the port's inbox
//! by handle.
//!
//! Port parameters:
//! - `input` (bool, default true): connect the input side if the device has one
//! - `output` (bool, default true): connect the output side if the device has one

use crate::registry::BackendCandidate;
use midiport_core::{
    get_param_or, Backend, DeviceInfo, Error, InboundRouter, MidiMessage, OpenContext, Port,
    PortOptions, Result, Transport,
};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::sync::Arc;
use tracing::debug;

const CLIENT_NAME: &str = "midiport";

#[derive(Debug, Clone, Default)]
pub struct MidirBackend {
    router: InboundRouter,
}

impl MidirBackend {
    /// Fails when the platform MIDI service cannot be reached.
    pub fn new() -> Result<Self> {
        MidiOutput::new(CLIENT_NAME)?;
        Ok(Self::default())
    }
}

fn port_names<T: midir::MidiIO>(io: &T) -> Vec<String> {
    io.ports()
        .iter()
        .filter_map(|port| io.port_name(port).ok())
        .collect()
}

impl Backend for MidirBackend {
    fn name(&self) -> &str {
        "midir"
    }

    fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let inputs = port_names(&MidiInput::new(CLIENT_NAME)?);
        let outputs = port_names(&MidiOutput::new(CLIENT_NAME)?);

        let mut devices: Vec<DeviceInfo> = Vec::new();
        for name in outputs.iter().chain(inputs.iter()) {
            if devices.iter().any(|d| &d.name == name) {
                continue;
            }
            devices.push(DeviceInfo::new(
                name.clone(),
                inputs.contains(name),
                outputs.contains(name),
            ));
        }
        Ok(devices)
    }

    /// Without a name the first output device is used, else the first input.
    fn open_port(&self, options: PortOptions) -> Result<Port> {
        let router = self.router.clone();
        Port::open(options, move |ctx| MidirTransport::open(router, ctx))
    }
}

struct MidirTransport {
    name: String,
    output: Option<MidiOutputConnection>,
    input: Option<MidiInputConnection<u64>>,
    handle: Option<u64>,
    router: InboundRouter,
}

impl MidirTransport {
    fn open(router: InboundRouter, ctx: OpenContext<'_>) -> Result<Self> {
        let want_input = get_param_or(ctx.params, "input", true, |v| v.as_bool());
        let want_output = get_param_or(ctx.params, "output", true, |v| v.as_bool());

        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        let mut midi_in = MidiInput::new(CLIENT_NAME)?;
        midi_in.ignore(Ignore::None);

        let name = match ctx.name {
            Some(name) => name.to_string(),
            None => port_names(&midi_out)
                .into_iter()
                .chain(port_names(&midi_in))
                .next()
                .ok_or_else(|| Error::transport("no MIDI devices available"))?,
        };

        let out_port = midi_out
            .ports()
            .into_iter()
            .find(|p| midi_out.port_name(p).map(|n| n == name).unwrap_or(false));
        let in_port = midi_in
            .ports()
            .into_iter()
            .find(|p| midi_in.port_name(p).map(|n| n == name).unwrap_or(false));
        if out_port.is_none() && in_port.is_none() {
            return Err(Error::transport(format!("unknown MIDI device '{}'", name)));
        }

        let output = match out_port.filter(|_| want_output) {
            Some(port) => Some(midi_out.connect(&port, "midiport-out")?),
            None => None,
        };

        let (input, handle) = match in_port.filter(|_| want_input) {
            Some(port) => {
                let handle = router.register(ctx.inbox.clone());
                let callback_router = router.clone();
                let connection = midi_in.connect(
                    &port,
                    "midiport-in",
                    move |_stamp, bytes, handle| {
                        callback_router.route_bytes(*handle, bytes);
                    },
                    handle,
                );
                match connection {
                    Ok(connection) => (Some(connection), Some(handle)),
                    Err(e) => {
                        router.unregister(handle);
                        return Err(e.into());
                    }
                }
            }
            None => (None, None),
        };

        if input.is_none() && output.is_none() {
            return Err(Error::InvalidConfig(format!(
                "MIDI device '{}' has no requested direction",
                name
            )));
        }

        debug!(
            "Connected MIDI device '{}' (input: {}, output: {})",
            name,
            input.is_some(),
            output.is_some()
        );
        Ok(Self {
            name,
            output,
            input,
            handle,
            router,
        })
    }
}

impl Transport for MidirTransport {
    fn is_input(&self) -> bool {
        self.input.is_some()
    }

    fn is_output(&self) -> bool {
        self.output.is_some()
    }

    fn resolved_name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn send(&mut self, message: MidiMessage) -> Result<()> {
        match self.output.as_mut() {
            Some(connection) => Ok(connection.send(&message.to_bytes())?),
            None => Err(Error::invalid_operation("not an output port")),
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(connection) = self.input.take() {
            connection.close();
        }
        if let Some(handle) = self.handle.take() {
            self.router.unregister(handle);
        }
        if let Some(connection) = self.output.take() {
            connection.close();
        }
        Ok(())
    }
}

fn load() -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(MidirBackend::new()?))
}

inventory::submit! {
    BackendCandidate::new("midir", load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use midiport_core::MidiPort;

    #[test]
    #[ignore] // Requires MIDI hardware or a system MIDI service
    fn test_list_devices() {
        let backend = MidirBackend::new().unwrap();
        for device in backend.list_devices().unwrap() {
            println!("{:?}", device);
        }
    }

    #[test]
    #[ignore] // Requires MIDI hardware or a system MIDI service
    fn test_open_default_and_reset() {
        let backend = MidirBackend::new().unwrap();
        let port = backend
            .open_port(PortOptions::new().autoreset(true))
            .unwrap();
        if port.is_output() {
            port.send(&MidiMessage::note_on(0, 60, 100)).unwrap();
            port.send(&MidiMessage::note_off(0, 60, 0)).unwrap();
        }
        port.close().unwrap();
        assert!(backend.router.is_empty());
    }
}

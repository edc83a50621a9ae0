//! Backends for the midiport MIDI I/O layer.
//!
//! Backends register themselves at link time and are discovered on demand:
//!
//! - `echo`: loopback, every sent message comes back on the same port
//! - `virtual`: in-process bus of named cables shared by all ports
//! - `midir`: system MIDI devices (requires `midi-io` feature)
//!
//! ```ignore
//! use midiport_io::{list_backends, open_device};
//! use midiport_core::{MidiMessage, MidiPort, PortOptions};
//!
//! for name in list_backends().keys() {
//!     println!("{}", name);
//! }
//! let port = open_device("echo", "Echo", PortOptions::new())?;
//! port.send(&MidiMessage::note_on(0, 60, 100))?;
//! ```

pub use midiport_core::{Error, Result};

pub mod registry;
pub use registry::{
    get_backend, list_backends, list_devices, open_device, BackendCandidate, BackendLoader,
};

pub mod backends;
pub use backends::echo::EchoBackend;
pub use backends::virtual_bus::{VirtualBackend, VirtualBus, DEFAULT_CABLE};

#[cfg(feature = "midi-io")]
pub use backends::midir::MidirBackend;

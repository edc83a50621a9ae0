//! # midiport - MIDI port abstraction
//!
//! One contract for opening, sending on, receiving from and closing MIDI
//! ports, whatever moves the bytes.
//!
//! ## Architecture
//!
//! midiport is an umbrella crate over:
//! - **midiport-core** - Port contract, lifecycle, locking, polling receive, MultiPort
//! - **midiport-io** - Backend registry and the built-in backends
//!
//! ## Quick Start
//!
//! ```ignore
//! use midiport::prelude::*;
//!
//! let port = open_device("virtual", "Virtual Cable", PortOptions::new())?;
//! port.send(&MidiMessage::note_on(0, 60, 100))?;
//!
//! for message in port.iter_pending() {
//!     println!("{:?}", message?.to_bytes());
//! }
//! port.close()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Core contract plus `echo` and `virtual` backends
//! - `midi-io` - System MIDI devices via midir

/// Re-export of midiport-core for direct access
pub use midiport_core as core;

/// Re-export of midiport-io for direct access
pub use midiport_io as io;

pub use midiport_core::{
    // Error
    Error,
    Result,

    // Messages
    MidiMessage,
    ALL_NOTES_OFF,
    ALL_SOUND_OFF,
    RESET_ALL_CONTROLLERS,

    // Ports
    MidiPort,
    MidiPortExt,
    MultiPort,
    Port,

    // Backend contract
    Backend,
    Device,
    DeviceInfo,
    InboundRouter,
    Inbox,
    OpenContext,
    Transport,

    // Configuration
    BackendParams,
    LockMode,
    ParamValue,
    PortOptions,
};

pub use midiport_core::{
    panic_messages, poll_interval, reset_messages, reset_poll_interval, set_poll_interval,
    set_poll_interval_secs,
};

pub use midiport_io::{
    get_backend, list_backends, list_devices, open_device, BackendCandidate, EchoBackend,
    VirtualBackend, VirtualBus,
};

#[cfg(feature = "midi-io")]
pub use midiport_io::MidirBackend;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{
        get_backend, list_backends, list_devices, open_device, Device, Error, MidiMessage,
        MidiPort, MidiPortExt, MultiPort, Port, PortOptions, Result,
    };
}

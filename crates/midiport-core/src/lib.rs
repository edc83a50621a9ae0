//! Core of the midiport MIDI I/O layer.
//!
//! Defines the port contract shared by every transport: lifecycle
//! (open once, close once), copy-on-send, polling receive with
//! close-during-wait semantics, and the [`MultiPort`] aggregator. Backends
//! plug in through [`Transport`] (raw I/O) and [`Backend`] (device listing
//! plus port construction).
//!
//! ```ignore
//! use midiport_core::{MidiMessage, MidiPort, MidiPortExt, Port, PortOptions};
//!
//! let port = Port::open(PortOptions::new().name("loop"), |ctx| MyTransport::open(ctx))?;
//! port.send(&MidiMessage::note_on(0, 60, 100))?;
//! for message in port.iter_pending() {
//!     println!("{:?}", message?.to_bytes());
//! }
//! port.close()?;
//! ```

pub mod error;
pub use error::{Error, Result};

mod message;
pub use message::{MidiMessage, ALL_NOTES_OFF, ALL_SOUND_OFF, RESET_ALL_CONTROLLERS};

mod options;
pub use options::{get_param_or, BackendParams, LockMode, ParamValue, PortOptions};

pub mod poll;
pub use poll::{poll_interval, reset_poll_interval, set_poll_interval, set_poll_interval_secs};

mod inbox;
pub use inbox::Inbox;

mod router;
pub use router::InboundRouter;

pub(crate) mod lock;

pub mod port;
pub use port::{
    Messages, MidiPort, MidiPortExt, MultiPort, OpenContext, PendingMessages, Port, Transport,
};

mod backend;
pub use backend::Backend;

mod device;
pub use device::{Device, DeviceInfo};

pub mod utils;
pub use utils::{panic_messages, reset_messages, DEFAULT_NUM_CHANNELS};

// Codec types, so callers do not need to depend on midi-msg directly.
pub use midi_msg::{Channel, ChannelModeMsg, ChannelVoiceMsg, ControlChange, MidiMsg};

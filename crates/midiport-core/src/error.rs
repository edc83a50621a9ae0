//! Error types for the MIDI port core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No discovered backend or device carries the requested name.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Capability or state misuse, e.g. sending on an input-only port.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Port closed: {0}")]
    ClosedPort(String),

    /// Failure surfaced by a transport driver during open/close/send/receive.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("MIDI parse error: {0}")]
    MessageParse(String),

    /// One or more children of a multi-port rejected a broadcast send.
    #[error("Send failed on {} of {attempted} ports", failures.len())]
    FanOut {
        attempted: usize,
        failures: Vec<(String, Error)>,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    pub fn transport(message: impl std::fmt::Display) -> Self {
        Self::Transport(message.to_string())
    }

    /// True for `ClosedPort`, the only error iteration treats as end-of-stream.
    pub fn is_closed_port(&self) -> bool {
        matches!(self, Self::ClosedPort(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::Transport(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiOutput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Error::Transport(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::Transport(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::SendError> for Error {
    fn from(e: midir::SendError) -> Self {
        Error::Transport(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::PortInfoError> for Error {
    fn from(e: midir::PortInfoError) -> Self {
        Error::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

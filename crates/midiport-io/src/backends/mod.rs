//! Built-in backends. Each module submits its own [`BackendCandidate`].
//!
//! [`BackendCandidate`]: crate::registry::BackendCandidate

pub mod echo;
pub mod virtual_bus;

#[cfg(feature = "midi-io")]
pub mod midir;

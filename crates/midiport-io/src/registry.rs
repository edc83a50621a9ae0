//! Backend discovery and device-level conveniences.
//!
//! Backend modules submit a [`BackendCandidate`] at link time. Discovery
//! runs every candidate's loader on each call, so the result reflects the
//! environment at that moment: a backend whose system library or service
//! is unavailable simply does not appear.

use midiport_core::{Backend, Device, Error, Port, PortOptions, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Constructs a backend, failing when its environment is unavailable.
pub type BackendLoader = fn() -> Result<Arc<dyn Backend>>;

/// A backend registered for discovery.
///
/// ```ignore
/// inventory::submit! {
///     BackendCandidate::new("echo", || Ok(Arc::new(EchoBackend)))
/// }
/// ```
pub struct BackendCandidate {
    name: &'static str,
    load: BackendLoader,
}

impl BackendCandidate {
    pub const fn new(name: &'static str, load: BackendLoader) -> Self {
        Self { name, load }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the loader and check the backend answers to its registered name.
    pub fn load(&self) -> Result<Arc<dyn Backend>> {
        let backend = (self.load)()?;
        if backend.name() != self.name {
            return Err(Error::InvalidConfig(format!(
                "backend registered as '{}' reports name '{}'",
                self.name,
                backend.name()
            )));
        }
        Ok(backend)
    }
}

inventory::collect!(BackendCandidate);

/// Every backend whose loader succeeds right now, keyed by name.
pub fn list_backends() -> BTreeMap<String, Arc<dyn Backend>> {
    discover(inventory::iter::<BackendCandidate>())
}

pub(crate) fn discover<'a>(
    candidates: impl IntoIterator<Item = &'a BackendCandidate>,
) -> BTreeMap<String, Arc<dyn Backend>> {
    let mut backends = BTreeMap::new();
    for candidate in candidates {
        match candidate.load() {
            Ok(backend) => {
                if backends
                    .insert(candidate.name.to_string(), backend)
                    .is_some()
                {
                    warn!("Duplicate MIDI backend '{}', keeping the last", candidate.name);
                }
            }
            Err(e) => debug!("Skipping MIDI backend '{}': {}", candidate.name, e),
        }
    }
    backends
}

pub fn get_backend(name: &str) -> Result<Arc<dyn Backend>> {
    list_backends()
        .remove(name)
        .ok_or_else(|| Error::not_found(format!("backend '{}'", name)))
}

/// Devices of every discovered backend. A backend that fails to list is
/// skipped.
pub fn list_devices() -> Vec<Device> {
    let mut devices = Vec::new();
    for (name, backend) in list_backends() {
        match Device::enumerate(&backend) {
            Ok(found) => devices.extend(found),
            Err(e) => warn!("Failed to list devices for backend '{}': {}", name, e),
        }
    }
    devices
}

/// Open `device` on `backend` by name. Backend errors from the open itself
/// are returned unchanged.
pub fn open_device(backend: &str, device: &str, options: PortOptions) -> Result<Port> {
    let backend = get_backend(backend)?;
    let device = Device::enumerate(&backend)?
        .into_iter()
        .find(|d| d.name() == device)
        .ok_or_else(|| {
            Error::not_found(format!("device '{}' on backend '{}'", device, backend.name()))
        })?;
    device.open(options)
}

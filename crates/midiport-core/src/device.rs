//! Device descriptors produced by backend enumeration.

use crate::backend::Backend;
use crate::error::Result;
use crate::options::PortOptions;
use crate::port::Port;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Plain description of one endpoint.
///
/// The name is the only identity and may change between enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub is_input: bool,
    pub is_output: bool,
}

impl DeviceInfo {
    pub fn new(name: impl Into<String>, is_input: bool, is_output: bool) -> Self {
        Self {
            name: name.into(),
            is_input,
            is_output,
        }
    }
}

/// An endpoint paired with the backend that can open it.
#[derive(Clone)]
pub struct Device {
    info: DeviceInfo,
    backend: Arc<dyn Backend>,
}

impl Device {
    pub fn new(info: DeviceInfo, backend: Arc<dyn Backend>) -> Self {
        Self { info, backend }
    }

    /// List `backend`'s devices as openable descriptors.
    pub fn enumerate(backend: &Arc<dyn Backend>) -> Result<Vec<Device>> {
        Ok(backend
            .list_devices()?
            .into_iter()
            .map(|info| Device::new(info, backend.clone()))
            .collect())
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn supports_input(&self) -> bool {
        self.info.is_input
    }

    pub fn supports_output(&self) -> bool {
        self.info.is_output
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Open a port on this device. The device name replaces any name in
    /// `options`; errors from the backend are returned unchanged.
    pub fn open(&self, options: PortOptions) -> Result<Port> {
        self.backend.open_port(PortOptions {
            name: Some(self.info.name.clone()),
            ..options
        })
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.info.name)
            .field("backend", &self.backend.name())
            .field("is_input", &self.info.is_input)
            .field("is_output", &self.info.is_output)
            .finish()
    }
}

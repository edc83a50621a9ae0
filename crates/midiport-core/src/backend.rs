//! Backend contract: device listing plus port construction.

use crate::device::DeviceInfo;
use crate::error::Result;
use crate::options::PortOptions;
use crate::port::Port;

/// A pluggable transport family.
///
/// Both capabilities are required; a type that cannot list devices or open
/// ports is not a backend.
pub trait Backend: Send + Sync {
    /// Registry key, e.g. `"echo"`.
    fn name(&self) -> &str;

    /// Endpoints currently openable through this backend.
    fn list_devices(&self) -> Result<Vec<DeviceInfo>>;

    /// `options.name` selects the endpoint; `None` means the backend's default.
    fn open_port(&self, options: PortOptions) -> Result<Port>;
}

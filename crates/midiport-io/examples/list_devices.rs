//! List every discovered backend and its devices.
//!
//! ```bash
//! cargo run -p midiport-io --example list_devices
//! cargo run -p midiport-io --example list_devices --features midi-io
//! ```

use midiport_core::Device;
use midiport_io::list_backends;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    for (name, backend) in list_backends() {
        println!("{}:", name);
        match Device::enumerate(&backend) {
            Ok(devices) if devices.is_empty() => println!("  (no devices)"),
            Ok(devices) => {
                for device in devices {
                    let direction = match (device.supports_input(), device.supports_output()) {
                        (true, true) => "in/out",
                        (true, false) => "in",
                        (false, true) => "out",
                        (false, false) => "-",
                    };
                    println!("  {:<32} {}", device.name(), direction);
                }
            }
            Err(e) => println!("  failed to list devices: {}", e),
        }
    }
}

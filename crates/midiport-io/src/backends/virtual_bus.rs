//! In-process MIDI bus of named cables.
//!
//! Ports attach to a cable by name. A message sent on one port is delivered
//! to every other input port on the same cable by a dispatcher thread, which
//! reaches the receiving ports through an [`InboundRouter`] handle rather
//! than a reference to the port itself.
//!
//! Port parameters:
//! - `input` (bool, default true): receive from the cable
//! - `output` (bool, default true): send to the cable

use crate::registry::BackendCandidate;
use crossbeam_channel::{unbounded, Receiver, Sender};
use dashmap::DashMap;
use midiport_core::{
    get_param_or, Backend, DeviceInfo, Error, InboundRouter, MidiMessage, OpenContext, Port,
    PortOptions, Result, Transport,
};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Cable present on the process-wide bus from the start.
pub const DEFAULT_CABLE: &str = "Virtual Cable";

static GLOBAL_BUS: OnceCell<Arc<VirtualBus>> = OnceCell::new();

struct Envelope {
    from: u64,
    cable: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
struct Attachment {
    cable: String,
    input: bool,
}

pub struct VirtualBus {
    cables: Arc<RwLock<Vec<String>>>,
    attachments: Arc<DashMap<u64, Attachment>>,
    router: InboundRouter,
    events: Sender<Envelope>,
}

impl VirtualBus {
    /// Start a bus with no cables. The dispatcher thread exits when the
    /// bus is dropped.
    pub fn start() -> Result<Self> {
        let (events, receiver) = unbounded();
        let cables = Arc::new(RwLock::new(Vec::new()));
        let attachments = Arc::new(DashMap::new());
        let router = InboundRouter::new();

        let cables_clone = Arc::clone(&cables);
        let attachments_clone = Arc::clone(&attachments);
        let router_clone = router.clone();
        thread::Builder::new()
            .name("midiport-virtual-bus".to_string())
            .spawn(move || {
                Self::dispatch_thread(receiver, cables_clone, attachments_clone, router_clone)
            })
            .map_err(|e| Error::transport(format!("failed to spawn bus thread: {}", e)))?;

        Ok(Self {
            cables,
            attachments,
            router,
            events,
        })
    }

    /// The process-wide bus, started with [`DEFAULT_CABLE`] on first use.
    pub fn global() -> Result<Arc<VirtualBus>> {
        GLOBAL_BUS
            .get_or_try_init(|| {
                let bus = VirtualBus::start()?;
                bus.create_cable(DEFAULT_CABLE);
                Ok(Arc::new(bus))
            })
            .cloned()
    }

    fn dispatch_thread(
        receiver: Receiver<Envelope>,
        cables: Arc<RwLock<Vec<String>>>,
        attachments: Arc<DashMap<u64, Attachment>>,
        router: InboundRouter,
    ) {
        while let Ok(envelope) = receiver.recv() {
            if !cables.read().contains(&envelope.cable) {
                debug!("Dropping event on removed cable '{}'", envelope.cable);
                continue;
            }

            let targets: Vec<u64> = attachments
                .iter()
                .filter(|entry| {
                    *entry.key() != envelope.from
                        && entry.input
                        && entry.cable == envelope.cable
                })
                .map(|entry| *entry.key())
                .collect();

            for handle in targets {
                router.route_bytes(handle, &envelope.bytes);
            }
        }
        debug!("Virtual bus dispatcher stopped");
    }

    /// Returns false if the cable already exists.
    pub fn create_cable(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        let mut cables = self.cables.write();
        if cables.contains(&name) {
            return false;
        }
        debug!("Created virtual cable '{}'", name);
        cables.push(name);
        true
    }

    /// Ports already attached to the cable stay open but stop receiving;
    /// their sends are dropped by the dispatcher.
    pub fn remove_cable(&self, name: &str) -> bool {
        let mut cables = self.cables.write();
        let before = cables.len();
        cables.retain(|c| c != name);
        cables.len() != before
    }

    /// Cable names in creation order.
    pub fn cables(&self) -> Vec<String> {
        self.cables.read().clone()
    }

    /// Ports currently attached to `cable`.
    pub fn attached(&self, cable: &str) -> usize {
        self.attachments
            .iter()
            .filter(|entry| entry.cable == cable)
            .count()
    }

    fn attach(&self, cable: &str, input: bool, ctx: &OpenContext<'_>) -> u64 {
        let handle = self.router.register(ctx.inbox.clone());
        self.attachments.insert(
            handle,
            Attachment {
                cable: cable.to_string(),
                input,
            },
        );
        handle
    }

    fn detach(&self, handle: u64) {
        self.attachments.remove(&handle);
        self.router.unregister(handle);
    }

    fn publish(&self, from: u64, cable: &str, message: &MidiMessage) -> Result<()> {
        self.events
            .send(Envelope {
                from,
                cable: cable.to_string(),
                bytes: message.to_bytes(),
            })
            .map_err(|_| Error::transport("virtual bus dispatcher not running"))
    }
}

impl std::fmt::Debug for VirtualBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualBus")
            .field("cables", &*self.cables.read())
            .field("attached", &self.attachments.len())
            .finish()
    }
}

/// Backend over a [`VirtualBus`]; one device per cable.
#[derive(Debug, Clone)]
pub struct VirtualBackend {
    bus: Arc<VirtualBus>,
}

impl VirtualBackend {
    pub fn new(bus: Arc<VirtualBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<VirtualBus> {
        &self.bus
    }
}

impl Backend for VirtualBackend {
    fn name(&self) -> &str {
        "virtual"
    }

    fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        Ok(self
            .bus
            .cables()
            .into_iter()
            .map(|cable| DeviceInfo::new(cable, true, true))
            .collect())
    }

    /// Without a name the first cable is used.
    fn open_port(&self, options: PortOptions) -> Result<Port> {
        let bus = Arc::clone(&self.bus);
        Port::open(options, move |ctx| VirtualTransport::open(bus, ctx))
    }
}

struct VirtualTransport {
    bus: Arc<VirtualBus>,
    handle: u64,
    cable: String,
    input: bool,
    output: bool,
}

impl VirtualTransport {
    fn open(bus: Arc<VirtualBus>, ctx: OpenContext<'_>) -> Result<Self> {
        let cables = bus.cables();
        let cable = match ctx.name {
            Some(name) => cables
                .into_iter()
                .find(|c| c == name)
                .ok_or_else(|| Error::transport(format!("unknown virtual cable '{}'", name)))?,
            None => cables
                .into_iter()
                .next()
                .ok_or_else(|| Error::transport("no virtual cables available"))?,
        };

        let input = get_param_or(ctx.params, "input", true, |v| v.as_bool());
        let output = get_param_or(ctx.params, "output", true, |v| v.as_bool());
        if !input && !output {
            return Err(Error::InvalidConfig(
                "virtual port needs input or output".to_string(),
            ));
        }

        let handle = bus.attach(&cable, input, &ctx);
        Ok(Self {
            bus,
            handle,
            cable,
            input,
            output,
        })
    }
}

impl Transport for VirtualTransport {
    fn is_input(&self) -> bool {
        self.input
    }

    fn is_output(&self) -> bool {
        self.output
    }

    fn resolved_name(&self) -> Option<String> {
        Some(self.cable.clone())
    }

    fn send(&mut self, message: MidiMessage) -> Result<()> {
        self.bus.publish(self.handle, &self.cable, &message)
    }

    fn close(&mut self) -> Result<()> {
        self.bus.detach(self.handle);
        Ok(())
    }
}

fn load() -> Result<Arc<dyn Backend>> {
    match VirtualBus::global() {
        Ok(bus) => Ok(Arc::new(VirtualBackend::new(bus))),
        Err(e) => {
            warn!("Virtual MIDI bus unavailable: {}", e);
            Err(e)
        }
    }
}

inventory::submit! {
    BackendCandidate::new("virtual", load)
}

//! Port wrapping one transport driver.

use super::transport::{OpenContext, Transport};
use super::MidiPort;
use crate::error::{Error, Result};
use crate::inbox::Inbox;
use crate::lock::PortLock;
use crate::message::MidiMessage;
use crate::options::{LockMode, PortOptions};
use crate::poll::PollInterval;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lifecycle and concurrency wrapper around a single [`Transport`].
///
/// A port is open from the moment [`Port::open`] returns until [`close`]
/// (or drop). The driver handle lives exactly as long as the port is open;
/// buffered inbound messages outlive it and stay receivable after close.
///
/// [`close`]: MidiPort::close
pub struct Port {
    name: Option<String>,
    autoreset: bool,
    is_input: bool,
    is_output: bool,
    closed: AtomicBool,
    lock: PortLock,
    inbox: Inbox,
    driver: Mutex<Option<Box<dyn Transport>>>,
}

impl Port {
    /// Run the transport-specific `open` and wrap the result.
    ///
    /// `open` is called exactly once. If it fails the error is returned
    /// unchanged and no port (and no driver handle) exists.
    pub fn open<T, F>(options: PortOptions, open: F) -> Result<Self>
    where
        T: Transport + 'static,
        F: FnOnce(OpenContext<'_>) -> Result<T>,
    {
        let PortOptions {
            name,
            autoreset,
            locking,
            params,
        } = options;
        let inbox = Inbox::new();

        let transport = open(OpenContext {
            name: name.as_deref(),
            params: &params,
            inbox: &inbox,
        })?;

        let name = transport.resolved_name().or(name);
        let is_input = transport.is_input();
        let is_output = transport.is_output();
        tracing::debug!(
            "Opened MIDI port {:?} (input: {}, output: {})",
            name,
            is_input,
            is_output
        );

        Ok(Self {
            name,
            autoreset,
            is_input,
            is_output,
            closed: AtomicBool::new(false),
            lock: PortLock::new(locking),
            inbox,
            driver: Mutex::new(Some(Box::new(transport))),
        })
    }

    pub fn autoreset(&self) -> bool {
        self.autoreset
    }

    pub fn lock_mode(&self) -> LockMode {
        self.lock.mode()
    }

    /// Messages received but not yet handed out.
    pub fn pending_count(&self) -> usize {
        self.inbox.len()
    }

    fn poll_driver(&self) -> Result<Option<MidiMessage>> {
        match self.driver.lock().as_mut() {
            Some(driver) => driver.poll(),
            None => Ok(None),
        }
    }
}

impl MidiPort for Port {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn is_input(&self) -> bool {
        self.is_input
    }

    fn is_output(&self) -> bool {
        self.is_output
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// A copy of `message` goes to the transport, never the caller's value.
    fn send(&self, message: &MidiMessage) -> Result<()> {
        if !self.is_output {
            return Err(Error::invalid_operation("not an output port"));
        }
        if self.is_closed() {
            return Err(Error::invalid_operation("send() called on closed port"));
        }

        let _guard = self.lock.lock();
        let mut driver = self.driver.lock();
        match driver.as_mut() {
            Some(driver) => driver.send(message.clone()),
            None => Err(Error::invalid_operation("send() called on closed port")),
        }
    }

    fn receive(&self, block: bool) -> Result<Option<MidiMessage>> {
        if !self.is_input {
            return Err(Error::invalid_operation("not an input port"));
        }

        // Buffered messages are returned even after close.
        {
            let _guard = self.lock.lock();
            if let Some(message) = self.inbox.pop() {
                return Ok(Some(message));
            }
        }

        if self.is_closed() {
            return if block {
                Err(Error::ClosedPort("receive() called on closed port".to_string()))
            } else {
                Ok(None)
            };
        }

        loop {
            {
                let _guard = self.lock.lock();

                if let Some(message) = self.poll_driver()? {
                    return Ok(Some(message));
                }
                // Input threads may have pushed while the driver was polled.
                if let Some(message) = self.inbox.pop() {
                    return Ok(Some(message));
                }
                if !block {
                    return Ok(None);
                }
                if self.is_closed() {
                    return Err(Error::ClosedPort("port closed during receive()".to_string()));
                }
            }

            // Lock released so close() on another thread can get in.
            PollInterval::global().sleep();
        }
    }

    fn close(&self) -> Result<()> {
        let _guard = self.lock.lock();
        if self.is_closed() {
            return Ok(());
        }

        if self.autoreset && self.is_output {
            if let Err(e) = self.reset() {
                tracing::warn!("Ignoring reset failure while closing {:?}: {}", self.name, e);
            }
        }

        let driver = self.driver.lock().take();
        self.closed.store(true, Ordering::Release);
        tracing::debug!("Closed MIDI port {:?}", self.name);

        match driver {
            Some(mut driver) => driver.close(),
            None => Ok(()),
        }
    }
}

impl Drop for Port {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Error closing MIDI port {:?} on drop: {}", self.name, e);
        }
    }
}

impl std::fmt::Debug for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Port")
            .field("name", &self.name)
            .field("is_input", &self.is_input)
            .field("is_output", &self.is_output)
            .field("closed", &self.is_closed())
            .field("pending", &self.inbox.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MidiPortExt;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Records sent bytes, serves scripted input, counts closes.
    #[derive(Default)]
    struct Scripted {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        incoming: Vec<MidiMessage>,
        closes: Arc<Mutex<usize>>,
        input: bool,
        output: bool,
        fail_send: bool,
    }

    impl Transport for Scripted {
        fn is_input(&self) -> bool {
            self.input
        }

        fn is_output(&self) -> bool {
            self.output
        }

        fn poll(&mut self) -> Result<Option<MidiMessage>> {
            if self.incoming.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.incoming.remove(0)))
            }
        }

        fn send(&mut self, message: MidiMessage) -> Result<()> {
            if self.fail_send {
                return Err(Error::transport("device unplugged"));
            }
            self.sent.lock().push(message.to_bytes());
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            *self.closes.lock() += 1;
            Ok(())
        }
    }

    fn duplex(sent: Arc<Mutex<Vec<Vec<u8>>>>, closes: Arc<Mutex<usize>>) -> Scripted {
        Scripted {
            sent,
            closes,
            input: true,
            output: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_open_and_close_lifecycle() {
        let closes = Arc::new(Mutex::new(0));
        let port = Port::open(PortOptions::new().name("dev"), |_| {
            Ok(duplex(Arc::default(), closes.clone()))
        })
        .unwrap();

        assert!(!port.is_closed());
        assert_eq!(port.name(), Some("dev"));

        port.close().unwrap();
        assert!(port.is_closed());
        port.close().unwrap();
        drop(port);
        assert_eq!(*closes.lock(), 1, "driver released exactly once");
    }

    #[test]
    fn test_failed_open_propagates() {
        let result = Port::open(PortOptions::new(), |_| -> Result<Scripted> {
            Err(Error::transport("no such device"))
        });
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[test]
    fn test_open_context_carries_options() {
        let port = Port::open(PortOptions::new().name("a").param("x", 1), |ctx| {
            assert_eq!(ctx.name, Some("a"));
            assert_eq!(ctx.params["x"].as_i64(), Some(1));
            ctx.inbox.push(MidiMessage::note_on(0, 1, 1));
            Ok(duplex(Arc::default(), Arc::default()))
        })
        .unwrap();
        assert_eq!(port.pending_count(), 1);
    }

    #[test]
    fn test_send_delivers_copy() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let port =
            Port::open(PortOptions::new(), |_| Ok(duplex(sent.clone(), Arc::default()))).unwrap();

        let mut message = MidiMessage::note_on(0, 60, 100);
        port.send(&message).unwrap();
        message = MidiMessage::note_off(0, 60, 0);

        assert_eq!(sent.lock().as_slice(), &[vec![0x90, 60, 100]]);
        assert_ne!(message.to_bytes(), sent.lock()[0]);
    }

    #[test]
    fn test_send_rejected_when_not_output_or_closed() {
        let input_only = Port::open(PortOptions::new(), |_| {
            Ok(Scripted {
                input: true,
                ..Default::default()
            })
        })
        .unwrap();
        assert!(matches!(
            input_only.send(&MidiMessage::all_sound_off(0)),
            Err(Error::InvalidOperation(_))
        ));

        let port =
            Port::open(PortOptions::new(), |_| Ok(duplex(Arc::default(), Arc::default()))).unwrap();
        port.close().unwrap();
        assert!(matches!(
            port.send(&MidiMessage::all_sound_off(0)),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_transport_send_error_propagates() {
        let port = Port::open(PortOptions::new(), |_| {
            Ok(Scripted {
                output: true,
                fail_send: true,
                ..Default::default()
            })
        })
        .unwrap();
        assert!(matches!(
            port.send(&MidiMessage::note_on(0, 60, 1)),
            Err(Error::Transport(_))
        ));
    }

    #[test]
    fn test_receive_on_output_only_port() {
        let port = Port::open(PortOptions::new(), |_| {
            Ok(Scripted {
                output: true,
                ..Default::default()
            })
        })
        .unwrap();
        assert!(matches!(port.receive(false), Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_receive_polls_driver_then_inbox() {
        let port = Port::open(PortOptions::new(), |ctx| {
            ctx.inbox.push(MidiMessage::note_on(0, 1, 1));
            Ok(Scripted {
                input: true,
                incoming: vec![MidiMessage::note_on(0, 2, 2)],
                ..Default::default()
            })
        })
        .unwrap();

        assert_eq!(port.receive(false).unwrap(), Some(MidiMessage::note_on(0, 1, 1)));
        assert_eq!(port.receive(false).unwrap(), Some(MidiMessage::note_on(0, 2, 2)));
        assert_eq!(port.receive(false).unwrap(), None);
    }

    #[test]
    fn test_non_blocking_receive_returns_promptly() {
        let port =
            Port::open(PortOptions::new(), |_| Ok(duplex(Arc::default(), Arc::default()))).unwrap();
        let start = Instant::now();
        assert!(port.receive(false).unwrap().is_none());
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_buffered_messages_survive_close() {
        let port = Port::open(PortOptions::new(), |ctx| {
            ctx.inbox.push(MidiMessage::note_on(0, 60, 100));
            Ok(duplex(Arc::default(), Arc::default()))
        })
        .unwrap();
        port.close().unwrap();

        assert_eq!(
            port.receive(true).unwrap(),
            Some(MidiMessage::note_on(0, 60, 100))
        );
        assert_eq!(port.receive(false).unwrap(), None);
        assert!(matches!(port.receive(true), Err(Error::ClosedPort(_))));
    }

    #[test]
    fn test_close_wakes_blocked_receiver() {
        let port = Arc::new(
            Port::open(PortOptions::new(), |_| Ok(duplex(Arc::default(), Arc::default())))
                .unwrap(),
        );

        let receiver = {
            let port = port.clone();
            std::thread::spawn(move || port.receive(true))
        };
        std::thread::sleep(Duration::from_millis(20));
        port.close().unwrap();

        let result = receiver.join().unwrap();
        assert!(matches!(result, Err(Error::ClosedPort(_))));
    }

    #[test]
    fn test_autoreset_sends_reset_on_close() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let port = Port::open(PortOptions::new().autoreset(true), |_| {
            Ok(duplex(sent.clone(), Arc::default()))
        })
        .unwrap();
        port.close().unwrap();

        let sent = sent.lock();
        assert_eq!(sent.len(), 32);
        assert_eq!(sent[0], vec![0xB0, 123, 0]);
        assert_eq!(sent[1], vec![0xB0, 121, 0]);
        assert_eq!(sent[31], vec![0xBF, 121, 0]);
    }

    #[test]
    fn test_autoreset_failure_does_not_block_close() {
        let closes = Arc::new(Mutex::new(0));
        let port = Port::open(PortOptions::new().autoreset(true), |_| {
            Ok(Scripted {
                output: true,
                fail_send: true,
                closes: closes.clone(),
                ..Default::default()
            })
        })
        .unwrap();

        port.close().unwrap();
        assert!(port.is_closed());
        assert_eq!(*closes.lock(), 1);
    }

    #[test]
    fn test_reset_and_panic_noop_when_closed() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let port =
            Port::open(PortOptions::new(), |_| Ok(duplex(sent.clone(), Arc::default()))).unwrap();

        port.panic().unwrap();
        assert_eq!(sent.lock().len(), 16);

        port.close().unwrap();
        port.reset().unwrap();
        port.panic().unwrap();
        assert_eq!(sent.lock().len(), 16);
    }

    #[test]
    fn test_unlocked_port_behaves_the_same_single_threaded() {
        let port = Port::open(PortOptions::new().locking(LockMode::Unlocked), |_| {
            Ok(Scripted {
                input: true,
                output: true,
                incoming: vec![MidiMessage::note_on(0, 5, 5)],
                ..Default::default()
            })
        })
        .unwrap();

        assert_eq!(port.lock_mode(), LockMode::Unlocked);
        let drained: Vec<_> = port.iter_pending().collect::<Result<_>>().unwrap();
        assert_eq!(drained, vec![MidiMessage::note_on(0, 5, 5)]);
    }
}

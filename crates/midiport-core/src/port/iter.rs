//! Iteration over received messages.

use super::MidiPort;
use crate::error::Result;
use crate::message::MidiMessage;

/// Iteration helpers available on every port, including `dyn MidiPort`.
pub trait MidiPortExt: MidiPort {
    /// Messages available right now, without blocking.
    fn iter_pending(&self) -> PendingMessages<'_, Self> {
        PendingMessages {
            port: self,
            done: false,
        }
    }

    /// Blocking stream of messages that ends once the port is closed and
    /// drained. Any other receive error is yielded once and ends the stream.
    fn messages(&self) -> Messages<'_, Self> {
        Messages {
            port: self,
            done: false,
        }
    }
}

impl<P: MidiPort + ?Sized> MidiPortExt for P {}

pub struct PendingMessages<'a, P: ?Sized> {
    port: &'a P,
    done: bool,
}

impl<P: MidiPort + ?Sized> Iterator for PendingMessages<'_, P> {
    type Item = Result<MidiMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.port.receive(false) {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

pub struct Messages<'a, P: ?Sized> {
    port: &'a P,
    done: bool,
}

impl<P: MidiPort + ?Sized> Iterator for Messages<'_, P> {
    type Item = Result<MidiMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.port.receive(true) {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) if e.is_closed_port() => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::options::PortOptions;
    use crate::port::{Port, Transport};
    use std::sync::Arc;
    use std::time::Duration;

    struct Loop;

    impl Transport for Loop {
        fn is_input(&self) -> bool {
            true
        }

        fn is_output(&self) -> bool {
            false
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Transport for Broken {
        fn is_input(&self) -> bool {
            true
        }

        fn is_output(&self) -> bool {
            false
        }

        fn poll(&mut self) -> Result<Option<MidiMessage>> {
            Err(Error::transport("read failed"))
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn port_with(notes: &[u8]) -> Port {
        Port::open(PortOptions::new(), |ctx| {
            for &note in notes {
                ctx.inbox.push(MidiMessage::note_on(0, note, 100));
            }
            Ok(Loop)
        })
        .unwrap()
    }

    #[test]
    fn test_iter_pending_drains_in_order() {
        let port = port_with(&[60, 62, 64]);
        let notes: Vec<_> = port
            .iter_pending()
            .map(|m| m.unwrap().to_bytes()[1])
            .collect();
        assert_eq!(notes, vec![60, 62, 64]);
        assert_eq!(port.iter_pending().count(), 0);
    }

    #[test]
    fn test_messages_ends_after_close() {
        let port = Arc::new(port_with(&[60, 61]));
        let closer = {
            let port = port.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                port.close().unwrap();
            })
        };

        let received: Vec<_> = port.messages().collect::<Result<_>>().unwrap();
        closer.join().unwrap();
        assert_eq!(received.len(), 2);
    }

    #[test]
    fn test_messages_yields_other_errors_once() {
        let port = Port::open(PortOptions::new(), |_| Ok(Broken)).unwrap();
        let mut messages = port.messages();
        assert!(matches!(messages.next(), Some(Err(Error::Transport(_)))));
        assert!(messages.next().is_none());
    }

    #[test]
    fn test_works_through_trait_object() {
        let port: Arc<dyn MidiPort> = Arc::new(port_with(&[70]));
        assert_eq!(port.iter_pending().count(), 1);
    }
}

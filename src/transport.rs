//! Delivery of wire messages. The compiler only ever sees a [`Transport`];
//! what sits behind it (a serial port, a socket bridge, a file) is not its
//! business, and neither is reconnecting.

use super::config::LinkConfig;
use super::control::ControlMessage;
use super::error::{ErrorKind, Result};
use failure::ResultExt;
use std::io::Write;
use tracing::{debug, warn};

pub trait Transport {
    fn is_open(&self) -> bool;

    fn send(&mut self, message: &str) -> Result<()>;
}

/// Writes messages to any byte sink, flushing after each one.
pub struct WriterTransport<W: Write> {
    writer: W,
}

impl<W: Write> WriterTransport<W> {
    pub fn new(writer: W) -> Self {
        WriterTransport { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Transport for WriterTransport<W> {
    fn is_open(&self) -> bool {
        true
    }

    fn send(&mut self, message: &str) -> Result<()> {
        self.writer
            .write_all(message.as_bytes())
            .context(ErrorKind::Transport)?;
        self.writer.flush().context(ErrorKind::Transport)?;
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Debug, Clone)]
pub struct Recorder {
    pub messages: Vec<String>,
    pub open: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Recorder {
            messages: Vec::new(),
            open: true,
        }
    }
}

impl Transport for Recorder {
    fn is_open(&self) -> bool {
        self.open
    }

    fn send(&mut self, message: &str) -> Result<()> {
        self.messages.push(message.to_owned());
        Ok(())
    }
}

/// Frames messages and decides whether they go out at all.
pub struct Link<T: Transport> {
    transport: T,
    config: LinkConfig,
}

impl<T: Transport> Link<T> {
    pub fn new(transport: T, config: LinkConfig) -> Self {
        Link { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn is_available(&self) -> bool {
        self.config.enabled && self.transport.is_open()
    }

    fn status(&self) -> &'static str {
        if !self.config.enabled {
            "(send_disabled)"
        } else if self.transport.is_open() {
            "(open)"
        } else {
            "(closed)"
        }
    }

    /// Sends `message` as-is.
    pub fn send_raw(&mut self, message: &str) -> Result<()> {
        debug!("{} {:?}", self.status(), message);
        if !self.is_available() {
            return Ok(());
        }
        self.transport.send(message)
    }

    /// Sends `message` with the lifespan prefix and a newline.
    pub fn send(&mut self, message: &str) -> Result<()> {
        let framed = format!("{}{}\n", self.config.lifespan, message);
        self.send_raw(&framed)
    }

    pub fn send_batch(&mut self, lines: &[String]) -> Result<()> {
        if !self.is_available() {
            warn!(
                "{} dropping {} message(s)",
                self.status(),
                lines.len()
            );
        }
        for line in lines {
            self.send(line)?;
        }
        Ok(())
    }

    pub fn send_control(&mut self, message: ControlMessage) -> Result<()> {
        self.send(&message.encode())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io;

    #[test]
    fn test_framing() {
        let mut link = Link::new(Recorder::default(), LinkConfig::default());
        link.send("s!+1,2").unwrap();
        link.send_raw("i!").unwrap();
        link.send_control(ControlMessage::ResetTime).unwrap();
        assert_eq!(link.transport().messages, vec!["2s!+1,2\n", "i!", "2t\n"]);
    }

    #[test]
    fn test_lifespan() {
        let config = LinkConfig::new('5', true).unwrap();
        let mut link = Link::new(Recorder::default(), config);
        link.send_batch(&["c!".to_owned(), "c!".to_owned()]).unwrap();
        assert_eq!(link.into_transport().messages, vec!["5c!\n", "5c!\n"]);
    }

    #[test]
    fn test_unavailable() {
        let mut link = Link::new(Recorder::default(), LinkConfig::default());
        link.set_enabled(false);
        link.send("c!").unwrap();
        assert!(link.transport().messages.is_empty());

        let closed = Recorder {
            open: false,
            ..Recorder::default()
        };
        let mut link = Link::new(closed, LinkConfig::default());
        assert!(!link.is_available());
        link.send("c!").unwrap();
        assert!(link.transport().messages.is_empty());
    }

    #[test]
    fn test_batch_dropped_when_unavailable() {
        let lines = vec!["c!".to_owned(), "s!+1,2".to_owned(), "c\"".to_owned()];

        let mut link = Link::new(Recorder::default(), LinkConfig::new('2', false).unwrap());
        link.send_batch(&lines).unwrap();
        assert!(link.transport().messages.is_empty());

        link.set_enabled(true);
        link.transport_mut().open = false;
        link.send_batch(&lines).unwrap();
        assert!(link.transport().messages.is_empty());

        link.transport_mut().open = true;
        link.send_batch(&lines).unwrap();
        assert_eq!(link.transport().messages, vec!["2c!\n", "2s!+1,2\n", "2c\"\n"]);
    }

    #[test]
    fn test_writer() {
        let mut t = WriterTransport::new(Vec::new());
        t.send("2c!\n").unwrap();
        t.send("2c!\n").unwrap();
        assert_eq!(t.into_inner(), b"2c!\n2c!\n".to_vec());
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_error() {
        let mut link = Link::new(WriterTransport::new(Broken), LinkConfig::default());
        let e = link.send("c!").unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::Transport);
    }
}

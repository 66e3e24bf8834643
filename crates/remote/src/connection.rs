use std::{io::Write, time::Duration};

use anyhow::Context as _;
use discobot_protocol::MotionCommand;
use indicatif::ProgressBar;
use tokio::{sync::watch, task::JoinHandle};

use crate::dispatch::PortWriter;
use crate::error::{Error, Result};

/// The robot's firmware listens at 9600 baud.
pub const DEFAULT_BAUD: u32 = 9600;

const WRITE_TIMEOUT: Duration = Duration::from_millis(500);

pub fn list_ports() -> anyhow::Result<Vec<String>> {
    let ports = serialport::available_ports().context("failed to enumerate serial ports")?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// An open serial port.
///
/// Writing a byte only hands it over to a background task that owns the
/// port. The hand-over slot holds a single byte, so if the port is slow a
/// newer command replaces an older one that hasn't been written yet.
pub struct SerialLink {
    name: String,
    slot: watch::Sender<Option<u8>>,
    writer: JoinHandle<()>,
}

impl SerialLink {
    pub async fn open(name: &str, baud: u32, settle: Duration) -> anyhow::Result<SerialLink> {
        let bar = ProgressBar::new_spinner().with_message(format!("Opening {name}..."));
        bar.enable_steady_tick(crate::TICK);

        let port = serialport::new(name, baud)
            .timeout(WRITE_TIMEOUT)
            .open()
            .with_context(|| format!("failed to open {name}"))?;

        // Opening the port resets most Arduino-style boards, and anything we
        // send while they boot is lost.
        bar.set_message("Waiting for the robot to reset...");
        tokio::time::sleep(settle).await;
        bar.finish_with_message("connected!");

        log::info!("opened {name} at {baud} baud");
        Ok(SerialLink::spawn(name, port))
    }

    fn spawn(name: &str, port: impl Write + Send + 'static) -> SerialLink {
        let (slot, rx) = watch::channel(None);
        let writer = tokio::spawn(serial_writer(name.to_owned(), port, rx));
        SerialLink {
            name: name.to_owned(),
            slot,
            writer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Closes the port after writing whatever command is still pending.
    pub async fn close(self) {
        let SerialLink { name, slot, writer } = self;
        drop(slot);
        if let Err(e) = writer.await {
            log::warn!("writer for {name} did not shut down cleanly: {e}");
        }
        log::info!("closed {name}");
    }
}

impl PortWriter for SerialLink {
    fn write_byte(&mut self, code: u8) -> Result<()> {
        self.slot
            .send(Some(code))
            .map_err(|_| Error::link_unavailable(format!("lost connection to {}", self.name)))
    }
}

async fn serial_writer(name: String, mut port: impl Write, mut slot: watch::Receiver<Option<u8>>) {
    while slot.changed().await.is_ok() {
        let Some(code) = *slot.borrow_and_update() else {
            continue;
        };
        let written = tokio::task::block_in_place(|| {
            port.write_all(&[code])?;
            port.flush()
        });
        if let Err(e) = written {
            // Dropping the receiver makes every later write fail, so the
            // user finds out on their next key press.
            log::error!("writing to {name} failed: {e}");
            return;
        }
    }
}

/// Pretends to be a robot, for trying things out without hardware.
pub struct DryRunLink {
    name: String,
}

impl DryRunLink {
    pub fn new(name: &str) -> DryRunLink {
        log::info!("dry run: commands for {name} will only be logged");
        DryRunLink {
            name: name.to_owned(),
        }
    }
}

impl PortWriter for DryRunLink {
    fn write_byte(&mut self, code: u8) -> Result<()> {
        match MotionCommand::from_code(code) {
            Some(cmd) => log::info!("dry run: {} <- {cmd}", self.name),
            None => log::warn!("dry run: {} <- unknown byte {code}", self.name),
        }
        Ok(())
    }
}

pub enum Link {
    Serial(SerialLink),
    DryRun(DryRunLink),
}

impl Link {
    pub fn name(&self) -> &str {
        match self {
            Link::Serial(l) => l.name(),
            Link::DryRun(l) => &l.name,
        }
    }

    pub async fn close(self) {
        match self {
            Link::Serial(l) => l.close().await,
            Link::DryRun(l) => log::info!("dry run: closed {}", l.name),
        }
    }
}

impl PortWriter for Link {
    fn write_byte(&mut self, code: u8) -> Result<()> {
        match self {
            Link::Serial(l) => l.write_byte(code),
            Link::DryRun(l) => l.write_byte(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Unplugged;

    impl Write for Unplugged {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn last_command_is_written() {
        let buf = SharedBuf::default();
        let mut link = SerialLink::spawn("test", buf.clone());
        link.write_byte(MotionCommand::Forward.code()).unwrap();
        link.write_byte(MotionCommand::SpinLeft.code()).unwrap();
        link.write_byte(MotionCommand::Stop.code()).unwrap();
        link.close().await;

        let written = buf.0.lock().unwrap().clone();
        // Older commands may have been overwritten, but nothing arrives out of
        // order and the last one always makes it.
        assert!(!written.is_empty() && written.len() <= 3);
        assert_eq!(written.last(), Some(&MotionCommand::Stop.code()));
        assert!(written.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn write_failure_makes_link_unavailable() {
        let mut link = SerialLink::spawn("test", Unplugged);
        link.write_byte(MotionCommand::Forward.code()).unwrap();
        (&mut link.writer).await.unwrap();

        let err = link.write_byte(MotionCommand::Stop.code()).unwrap_err();
        assert!(matches!(err, Error::LinkUnavailable { .. }));
    }

    #[test]
    fn dry_run_accepts_everything() {
        let mut link = Link::DryRun(DryRunLink::new("nowhere"));
        for cmd in MotionCommand::ALL {
            link.write_byte(cmd.code()).unwrap();
        }
        assert_eq!(link.name(), "nowhere");
    }
}

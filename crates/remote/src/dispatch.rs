use discobot_protocol::MotionCommand;

use crate::error::{Error, Result};

/// Something that can get a command byte to the robot.
pub trait PortWriter {
    fn write_byte(&mut self, code: u8) -> Result<()>;
}

/// A port that might not be open.
impl<W: PortWriter> PortWriter for Option<W> {
    fn write_byte(&mut self, code: u8) -> Result<()> {
        match self {
            Some(w) => w.write_byte(code),
            None => Err(Error::link_unavailable("no port is open")),
        }
    }
}

pub struct Dispatcher<W> {
    writer: W,
}

impl<W: PortWriter> Dispatcher<W> {
    pub fn new(writer: W) -> Self {
        Dispatcher { writer }
    }

    /// Sends a single command. Failures aren't retried: the next change of
    /// direction sends a fresh command anyway.
    pub fn dispatch(&mut self, cmd: MotionCommand) -> Result<()> {
        log::debug!("dispatching {cmd}");
        self.writer.write_byte(cmd.code())
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

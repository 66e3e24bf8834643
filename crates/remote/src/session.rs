use discobot_protocol::{Direction, MotionCommand, SignalState, Toggle};

use crate::dispatch::{Dispatcher, PortWriter};
use crate::error::Result;

/// One person driving one robot: the directions they're holding and the
/// port that their commands go to.
pub struct Session<W> {
    signals: SignalState,
    dispatcher: Dispatcher<W>,
}

impl<W: PortWriter> Session<W> {
    pub fn new(writer: W) -> Self {
        Session {
            signals: SignalState::new(),
            dispatcher: Dispatcher::new(writer),
        }
    }

    pub fn signals(&self) -> &SignalState {
        &self.signals
    }

    /// Toggles a direction and sends whatever command that calls for.
    ///
    /// If sending fails the toggle still stands, because the signals track
    /// what the user is physically holding and not what the robot heard.
    pub fn toggle(&mut self, d: Direction) -> Result<Toggle> {
        let toggle = self.signals.toggle(d);
        if toggle.vetoed {
            log::debug!("ignoring {d}: {} is held", d.opposite());
        }
        if let Some(cmd) = toggle.command {
            self.dispatcher.dispatch(cmd)?;
        }
        Ok(toggle)
    }

    /// Lets go of everything and tells the robot to stop.
    pub fn release_all(&mut self) -> Result<()> {
        self.signals = SignalState::new();
        self.dispatcher.dispatch(MotionCommand::Stop)
    }

    /// Sends a command without touching the signals.
    pub fn send(&mut self, cmd: MotionCommand) -> Result<()> {
        self.dispatcher.dispatch(cmd)
    }
}

impl<W: PortWriter> Session<Option<W>> {
    /// Starts sending to `writer`, returning the previous one if there was one.
    pub fn attach(&mut self, writer: W) -> Option<W> {
        self.dispatcher.writer_mut().replace(writer)
    }

    pub fn detach(&mut self) -> Option<W> {
        self.dispatcher.writer_mut().take()
    }

    pub fn writer(&self) -> Option<&W> {
        self.dispatcher.writer().as_ref()
    }
}

//! Directions, motion commands and the rules that turn held directions into
//! the single command byte the robot understands.
//!
//! The robot's firmware reads one unsigned byte per command from its serial
//! port. There is no framing and no acknowledgement: the most recent byte
//! is what the robot does.
//!
//! This crate supports `no_std` so that the same command table can be
//! compiled into firmware.

#![cfg_attr(not(feature = "std"), no_std)]

use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

mod signal;

pub use signal::{resolve, SignalState, Toggle};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The direction that can't be held at the same time as this one.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The two directions on the other axis. These combine with `self` into
    /// a diagonal.
    pub fn orthogonal(self) -> [Direction; 2] {
        match self {
            Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
            Direction::Left | Direction::Right => [Direction::Up, Direction::Down],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidDirection;

impl fmt::Display for InvalidDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected one of up, down, left, right")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidDirection {}

impl FromStr for Direction {
    type Err = InvalidDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let matches = |long: &str| s.eq_ignore_ascii_case(long) || s.eq_ignore_ascii_case(&long[..1]);
        Direction::ALL
            .into_iter()
            .find(|d| matches(d.name()))
            .ok_or(InvalidDirection)
    }
}

/// What the robot should be doing. The discriminant is the byte that goes
/// over the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MotionCommand {
    Forward = 0,
    Backward = 1,
    ForwardLeft = 2,
    ForwardRight = 3,
    BackLeft = 4,
    BackRight = 5,
    SpinRight = 6,
    SpinLeft = 7,
    Stop = 8,
}

impl MotionCommand {
    /// All commands, in wire-code order.
    pub const ALL: [MotionCommand; 9] = [
        MotionCommand::Forward,
        MotionCommand::Backward,
        MotionCommand::ForwardLeft,
        MotionCommand::ForwardRight,
        MotionCommand::BackLeft,
        MotionCommand::BackRight,
        MotionCommand::SpinRight,
        MotionCommand::SpinLeft,
        MotionCommand::Stop,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<MotionCommand> {
        MotionCommand::ALL.get(usize::from(code)).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            MotionCommand::Forward => "FORWARD",
            MotionCommand::Backward => "BACKWARD",
            MotionCommand::ForwardLeft => "FORWARD_LEFT",
            MotionCommand::ForwardRight => "FORWARD_RIGHT",
            MotionCommand::BackLeft => "BACK_LEFT",
            MotionCommand::BackRight => "BACK_RIGHT",
            MotionCommand::SpinRight => "SPIN_RIGHT",
            MotionCommand::SpinLeft => "SPIN_LEFT",
            MotionCommand::Stop => "STOP",
        }
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnknownCommand(pub u8);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown motion command code {}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownCommand {}

impl TryFrom<u8> for MotionCommand {
    type Error = UnknownCommand;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        MotionCommand::from_code(code).ok_or(UnknownCommand(code))
    }
}

impl From<MotionCommand> for u8 {
    fn from(cmd: MotionCommand) -> u8 {
        cmd.code()
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The serial port isn't open, or the link to it has broken.
    #[error("serial link unavailable: {reason}")]
    LinkUnavailable { reason: String },
    #[error("invalid direction {0:?}: expected one of up, down, left, right")]
    InvalidDirection(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn link_unavailable(reason: impl Into<String>) -> Self {
        Error::LinkUnavailable {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

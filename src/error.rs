//! Renderer error taxonomy

use std::fmt;
use std::io;

use thiserror::Error;

/// Device operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOp {
    Write,
    Flush,
    Read,
    Size,
}

impl fmt::Display for DeviceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceOp::Write => "write",
            DeviceOp::Flush => "flush",
            DeviceOp::Read => "read",
            DeviceOp::Size => "size query",
        };
        f.write_str(name)
    }
}

/// Mode transition that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeOp {
    /// Reading the current line discipline
    Capture,
    /// Applying raw settings
    EnterRaw,
    /// Reapplying the settings captured at raw-mode entry
    Restore,
    /// Screen setup on open
    Open,
    /// Screen teardown on close
    Close,
}

impl fmt::Display for ModeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModeOp::Capture => "capture line discipline",
            ModeOp::EnterRaw => "enter raw mode",
            ModeOp::Restore => "restore line discipline",
            ModeOp::Open => "open session",
            ModeOp::Close => "close session",
        };
        f.write_str(name)
    }
}

/// Contract misuse, reported immediately
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    #[error("renderer is already open")]
    AlreadyOpen,

    #[error("renderer is not open")]
    NotOpen,

    #[error("raw mode is already active")]
    AlreadyRaw,

    #[error("raw mode is not active")]
    NotRaw,

    #[error("cannot close while raw mode is active")]
    RawModeActive,

    #[error("renderer has been closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("device {op} failed: {source}")]
    Device {
        op: DeviceOp,
        #[source]
        source: io::Error,
    },

    #[error("failed to {op}: {source}")]
    ModeTransition {
        op: ModeOp,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl Error {
    pub(crate) fn device(op: DeviceOp) -> impl FnOnce(io::Error) -> Self {
        move |source| Error::Device { op, source }
    }

    pub(crate) fn mode(op: ModeOp) -> impl FnOnce(io::Error) -> Self {
        move |source| Error::ModeTransition { op, source }
    }

    /// The usage error, if this is one
    pub fn usage(&self) -> Option<UsageError> {
        match self {
            Error::Usage(e) => Some(*e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::device(DeviceOp::Write)(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert_eq!(err.to_string(), "device write failed: gone");

        let err = Error::mode(ModeOp::Restore)(io::Error::new(io::ErrorKind::Other, "EIO"));
        assert_eq!(err.to_string(), "failed to restore line discipline: EIO");

        let err = Error::from(UsageError::AlreadyRaw);
        assert_eq!(err.to_string(), "raw mode is already active");
        assert_eq!(err.usage(), Some(UsageError::AlreadyRaw));
    }
}

//! Unified error types for the GateLink firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the top-level wiring's error handling uniform.  Nothing in this core
//! is fatal: link failures are auto-retried on their fixed interval, an
//! unreachable backend drops one read event, malformed responses
//! degrade to partial results, and unrecognised bus payloads fail safe
//! to Off.  The variants here exist for the init path and diagnostics,
//! not for aborting.

use core::fmt;

use crate::app::ports::TransportError;
use crate::gateway::GatewayError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A supervised link is unavailable (transient, auto-retried).
    Link(LinkError),
    /// The backend gateway could not complete a submission.
    Gateway(GatewayError),
    /// The card reader failed to initialise or read.
    Reader(ReaderError),
    /// A transport-level request/bus failure.
    Transport(TransportError),
    /// Peripheral or adapter initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Gateway(e) => write!(f, "gateway: {e}"),
            Self::Reader(e) => write!(f, "reader: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The link is down; the supervisor will retry on its interval.
    Unavailable,
    /// A connect attempt could not even be started.
    ConnectFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
            Self::ConnectFailed => write!(f, "connect failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Reader errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderError {
    /// SPI transaction with the reader IC failed.
    SpiFailed,
    /// The reader reported a UID with an impossible length.
    BadUid,
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpiFailed => write!(f, "SPI transaction failed"),
            Self::BadUid => write!(f, "malformed UID"),
        }
    }
}

impl From<ReaderError> for Error {
    fn from(e: ReaderError) -> Self {
        Self::Reader(e)
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<GatewayError> for Error {
    fn from(e: GatewayError) -> Self {
        Self::Gateway(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

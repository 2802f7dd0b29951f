//! Error taxonomy for the wire protocol, registry, and transport layers.
//!
//! Frame and transport errors use a typed enum so callers (the router, the
//! client session loop) can match on specific failure kinds. I/O and setup
//! errors at the process boundary are propagated with `anyhow`.

use thiserror::Error;

/// Errors that can occur while decoding or validating a wire frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame exceeds maximum size of {max} bytes")]
    TooLarge { max: usize },

    #[error("unknown message id '{0}'")]
    UnknownMessageId(String),

    #[error("malformed id field: expected 2 digits, got '{0}'")]
    MalformedId(String),

    #[error("message '{msgname}' requires field '{field}' to be present")]
    MissingField { msgname: &'static str, field: &'static str },

    #[error("message '{msgname}' does not accept field '{field}'")]
    UnexpectedField { msgname: &'static str, field: &'static str },

    #[error("frame is empty")]
    Empty,
}

/// Errors surfaced by the equipment registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry is at capacity ({max} equipment slots)")]
    Full { max: u8 },
}

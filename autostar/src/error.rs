use bytes::Bytes;
use core::result::Result as CoreResult;
use std::io;
use thiserror::Error;

use crate::io_adapter::LinkError;

pub type Result<T> = CoreResult<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument for {operation} ({param}): {reason}")]
    InvalidArgument {
        operation: &'static str,
        param: &'static str,
        reason: String,
    },
    #[error("Operation {0:?} is not in the catalog")]
    UnsupportedOperation(String),
    #[error("{0}")]
    IOError(#[from] io::Error),
    #[error("{operation} timed out after {attempts} attempt(s)")]
    Timeout {
        operation: &'static str,
        attempts: u8,
    },
    #[error("{operation} received a reply that violates the protocol: {raw:?}")]
    ProtocolViolation { operation: &'static str, raw: Bytes },
    #[error("Could not decode reply to {operation} ({reason}): {raw:?}")]
    DecodeError {
        operation: &'static str,
        reason: &'static str,
        raw: Bytes,
    },
    #[error("Unexpected response to {0}")]
    UnexpectedResponse(&'static str),
    #[error("Mount rejected {0}")]
    Rejected(&'static str),
    #[error("Slew refused: {0}")]
    SlewRefused(String),
    #[error("Invalid descriptor {operation}: {reason}")]
    InvalidCatalog {
        operation: &'static str,
        reason: &'static str,
    },
    #[error("Baud rate is not in range of accepted values: 1200, 2400, 4800, 9600, 14400, 19200, 28800, 38400, 57600")]
    InvalidBaudRate,
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::TimedOut => Error::IOError(io::ErrorKind::TimedOut.into()),
            LinkError::Io(e) => Error::IOError(e),
        }
    }
}

impl Error {
    /// Raw reply bytes, for callers that want to interpret a variant reply themselves
    pub fn raw_reply(&self) -> Option<&Bytes> {
        match self {
            Error::ProtocolViolation { raw, .. } | Error::DecodeError { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

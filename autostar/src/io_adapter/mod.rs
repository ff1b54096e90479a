#[cfg(feature = "serial")]
pub(crate) mod serial;
pub(crate) mod std_io;

use core::time::Duration;
use thiserror::Error;

use crate::{config::SessionConfig, session::Session};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Timed out waiting for a byte from the mount")]
    TimedOut,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Half-duplex byte link to the mount
pub trait Transport {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), LinkError>;

    /// Blocks for at most `timeout` waiting for the next byte
    fn read_byte(&mut self, timeout: Duration) -> Result<u8, LinkError>;

    /// Drops whatever the mount sent that nobody read yet
    fn discard_input(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    /// Starts a session over this link with the standard catalog
    fn open_session(self, config: SessionConfig) -> Session<Self>
    where
        Self: Sized,
    {
        Session::with_config(self, config)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), LinkError> {
        (**self).write_all(buf)
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<u8, LinkError> {
        (**self).read_byte(timeout)
    }

    fn discard_input(&mut self) -> Result<(), LinkError> {
        (**self).discard_input()
    }
}

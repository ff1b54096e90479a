use super::{LinkError, Transport};
use crate::config::SerialConf;
use core::time::Duration;
use num_traits::ToPrimitive;
use serialport::{ClearBuffer, DataBits, Parity, SerialPort, StopBits};
use std::io::{ErrorKind, Read};

/// Serial port transport, applies the requested timeout to every read
pub struct SerialAdapter {
    port: Box<dyn SerialPort>,
}

impl SerialAdapter {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        SerialAdapter { port }
    }

    /// Opens the device at 8N1 with the configured speed
    pub fn open(conf: &SerialConf) -> Result<Self, LinkError> {
        let baud = conf.baud_rate.to_u32().unwrap_or(9600);
        log::debug!("Opening {} at {} baud", conf.serial_path, baud);
        let port = serialport::new(&conf.serial_path, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(conf.timeout)
            .open()
            .map_err(std::io::Error::from)?;
        Ok(SerialAdapter::new(port))
    }

    pub fn into_inner(self) -> Box<dyn SerialPort> {
        self.port
    }
}

impl Transport for SerialAdapter {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), LinkError> {
        std::io::Write::write_all(&mut self.port, buf)?;
        std::io::Write::flush(&mut self.port)?;
        Ok(())
    }

    fn read_byte(&mut self, timeout: Duration) -> Result<u8, LinkError> {
        if self.port.timeout() != timeout {
            self.port
                .set_timeout(timeout)
                .map_err(std::io::Error::from)?;
        }
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(0) => Err(LinkError::TimedOut),
            Ok(_) => Ok(byte[0]),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                Err(LinkError::TimedOut)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn discard_input(&mut self) -> Result<(), LinkError> {
        self.port
            .clear(ClearBuffer::Input)
            .map_err(std::io::Error::from)?;
        Ok(())
    }
}

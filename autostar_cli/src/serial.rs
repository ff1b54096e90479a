use autostar::{
    error::Error, BaudRate, SerialAdapter, SerialConf, Session, SessionConfig, Telescope,
    Transport,
};
use clap::Args;
use num_traits::FromPrimitive;
use simple_eyre::{eyre::eyre, Result};
use std::time::Duration;

#[derive(Args)]
pub struct SerialArgs {
    /// Name of serial port the mount is connected to
    #[clap(short, long, value_parser)]
    pub serial: String,

    /// Speed the mount is currently configured for
    #[clap(long, value_parser = parse_baud_rate, default_value = "9600")]
    pub baud_rate: BaudRate,

    /// Time to wait for a complete reply, in milliseconds
    #[clap(long, value_parser, default_value_t = 1000)]
    pub timeout_ms: u64,
}

fn parse_baud_rate(s: &str) -> Result<BaudRate, Error> {
    s.parse()
        .or(Err(()))
        .and_then(|n| FromPrimitive::from_u32(n).ok_or(()))
        .map_err(|_| Error::InvalidBaudRate)
}

pub type SerialSession = Session<SerialAdapter>;

impl SerialArgs {
    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn open_session(&self) -> Result<SerialSession> {
        let conf = SerialConf {
            serial_path: self.serial.clone(),
            baud_rate: self.baud_rate,
            timeout: self.timeout(),
        };
        let adapter = SerialAdapter::open(&conf)
            .map_err(|e| eyre!("Could not open serial port {}: {}", self.serial, e))?;
        let config = SessionConfig {
            read_timeout: self.timeout(),
            ..Default::default()
        };
        Ok(adapter.open_session(config))
    }

    pub fn open_telescope(&self) -> Result<Telescope<SerialAdapter>> {
        Ok(Telescope::from_session(self.open_session()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baud_rates() {
        assert!(matches!(parse_baud_rate("9600"), Ok(BaudRate::Baud9600)));
        assert!(matches!(parse_baud_rate("57600"), Ok(BaudRate::Baud57600)));
        assert!(parse_baud_rate("56700").is_err());
        assert!(parse_baud_rate("115200").is_err());
        assert!(parse_baud_rate("fast").is_err());
    }
}

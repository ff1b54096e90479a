use core::time::Duration;

use crate::flags::BaudRate;

/// Dispatch policy shared by every operation of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time allowed for a complete reply to arrive
    pub read_timeout: Duration,
    /// Upper bound on reply length, protects against a mount that never sends `#`
    pub max_response_len: usize,
    /// Resend the frame once when the first reply times out
    pub retry_on_timeout: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            read_timeout: Duration::from_secs(1),
            max_response_len: 256,
            retry_on_timeout: true,
        }
    }
}

/// Serial device the mount is attached to, always 8N1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConf {
    pub serial_path: String,
    pub baud_rate: BaudRate,
    pub timeout: Duration,
}

impl SerialConf {
    pub fn new(serial_path: impl Into<String>) -> Self {
        SerialConf {
            serial_path: serial_path.into(),
            baud_rate: BaudRate::default(),
            timeout: Duration::from_secs(1),
        }
    }
}

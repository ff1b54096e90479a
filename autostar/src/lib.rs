//! Dispatch engine for the Meade LX200/Autostar serial command protocol.
//!
//! Operations are data: every command the mount understands is an [`OperationDescriptor`]
//! in a [`Catalog`], and a single [`Session`] encodes, transmits, frames and decodes all of
//! them the same way.

pub mod catalog;
pub mod command;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod flags;
mod io_adapter;
pub mod response;
pub mod session;
pub mod telescope;

pub use catalog::Catalog;
pub use command::{encode, Arg, Frame};
pub use config::{SerialConf, SessionConfig};
pub use descriptor::{OperationDescriptor, ResponseKind, ValueKind};
pub use error::{Error, Result};
pub use flags::BaudRate;
#[cfg(feature = "serial")]
pub use io_adapter::serial::SerialAdapter;
pub use io_adapter::{std_io::StdIoAdapter, LinkError, Transport};
pub use response::{
    decoder::decode, parser::ParseValueError, CalendarDate, FindQuality, RawResponse, Response,
    Sexagesimal, Status, SubMinute,
};
pub use session::Session;
pub use telescope::{Direction, FirmwareInfo, SlewRate, Telescope, TrackingRate};

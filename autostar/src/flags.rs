use crate::error::Error;
use core::{fmt, fmt::Display};
use num_derive::{FromPrimitive, ToPrimitive};
use strum::EnumIter;

/// Serial speeds selectable with `:SBn#`
#[derive(ToPrimitive, FromPrimitive, EnumIter, Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum BaudRate {
    Baud57600 = 57600,
    Baud38400 = 38400,
    Baud28800 = 28800,
    Baud19200 = 19200,
    Baud14400 = 14400,
    #[default]
    Baud9600 = 9600,
    Baud4800 = 4800,
    Baud2400 = 2400,
    Baud1200 = 1200,
}

impl BaudRate {
    pub fn try_from_code(c: u8) -> Result<Self, Error> {
        use BaudRate::*;
        match c {
            1 => Ok(Baud57600),
            2 => Ok(Baud38400),
            3 => Ok(Baud28800),
            4 => Ok(Baud19200),
            5 => Ok(Baud14400),
            6 => Ok(Baud9600),
            7 => Ok(Baud4800),
            8 => Ok(Baud2400),
            9 => Ok(Baud1200),
            _ => Err(Error::InvalidBaudRate),
        }
    }

    /// Digit sent as the argument of `:SBn#`
    pub fn to_code(self) -> u8 {
        use BaudRate::*;
        match self {
            Baud57600 => 1,
            Baud38400 => 2,
            Baud28800 => 3,
            Baud19200 => 4,
            Baud14400 => 5,
            Baud9600 => 6,
            Baud4800 => 7,
            Baud2400 => 8,
            Baud1200 => 9,
        }
    }
}

impl Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}", *self as u32))
    }
}
